//! Error taxonomy of the crate and the per-thread current-error slot.

use std::cell::RefCell;
use std::fmt;

use thiserror::Error as ThisError;

/// Tags the kind of driver object an error originated from, so handlers can inspect context
/// without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Environment,
    Connection,
    Pool,
    Transaction,
    Statement,
    Bind,
    ResultSet,
    Lob,
    File,
    Long,
    Date,
    Timestamp,
    Interval,
    Number,
    Reference,
    Object,
    Collection,
    Vector,
    TypeInfo,
    Message,
    Enqueue,
    Dequeue,
    Subscription,
    DirectPath,
    Unknown,
}

/// Features whose availability depends on the Oracle client version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ScrollableCursors,
    WideLobApi,
    SessionPools,
    ConnectionPools,
    ImplicitResults,
    StatementCaching,
    AdvancedQueuing,
    Subscriptions,
    DirectPathLoading,
    Timestamps,
    Intervals,
    Vectors,
    HighAvailability,
    ExtendedServerInfo,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::ScrollableCursors => "scrollable cursors",
            Feature::WideLobApi => "64 bit LOB API",
            Feature::SessionPools => "session pools",
            Feature::ConnectionPools => "connection pools",
            Feature::ImplicitResults => "implicit result sets",
            Feature::StatementCaching => "statement caching",
            Feature::AdvancedQueuing => "advanced queuing",
            Feature::Subscriptions => "change notification subscriptions",
            Feature::DirectPathLoading => "direct path loading",
            Feature::Timestamps => "timestamps",
            Feature::Intervals => "intervals",
            Feature::Vectors => "vectors",
            Feature::HighAvailability => "high availability events",
            Feature::ExtendedServerInfo => "extended server information",
        };
        f.write_str(name)
    }
}

/// Resource classes reported by the shutdown leak check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeakedResource {
    Handles,
    Descriptors,
    Objects,
}

impl fmt::Display for LeakedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeakedResource::Handles => "handles",
            LeakedResource::Descriptors => "descriptors",
            LeakedResource::Objects => "object instances",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, ThisError)]
/// Error type used to indicate a failed driver operation.
pub enum Error {
    /// The Oracle client reported an error. Code and message are taken from the error handle the
    /// failing call was issued with.
    #[error("Oracle emitted an error calling '{function}':\nORA-{code:05}: {message}")]
    Oracle {
        /// Oracle error code (the `NNNNN` in `ORA-NNNNN`).
        code: i32,
        /// Message text as reported by `OCIErrorGet`.
        message: String,
        /// OCI entry point which produced the error.
        function: &'static str,
    },
    /// The driver detected an inconsistency in its own state.
    #[error("Driver internal error: {0}")]
    Internal(String),
    /// A dequeue or listen operation ran into its wait timeout. Only surfaced if a non-zero wait
    /// has been configured; no-wait dequeues report an empty result instead.
    #[error("The queue operation timed out before a message became available.")]
    QueueTimeout,
    /// The operation needs a feature the loaded Oracle client does not provide.
    #[error("The loaded Oracle client library does not support {feature}.")]
    NotAvailable { feature: Feature },
    /// The environment had not been initialized, or is already cleaned up.
    #[error("The driver environment is not initialized.")]
    NotInitialized,
    /// A required argument has been `NULL` (or an already released handle).
    #[error("Unexpected null pointer or released handle passed as '{argument}'.")]
    NullPointer { argument: &'static str },
    /// A numeric argument lies outside its documented range.
    #[error("Argument '{argument}' is out of range.")]
    OutOfRange { argument: &'static str },
    /// An enum-like argument holds a value outside its documented set.
    #[error("Argument '{argument}' holds an invalid value.")]
    InvalidValue { argument: &'static str },
    /// A value could not be converted between the requested types.
    #[error("Cannot convert between {from} and {to}.")]
    TypeMismatch {
        from: &'static str,
        to: &'static str,
    },
    /// The statement is not in a state permitting the operation, e.g. fetching from a statement
    /// which has not been executed.
    #[error("Statement state does not permit this operation ({details}).")]
    StatementState { details: &'static str },
    /// Random access navigation has been requested on a forward-only result set.
    #[error("The result set is not scrollable.")]
    NotScrollable,
    /// Direct path operations have been called out of order.
    #[error("Direct path state does not permit '{operation}'.")]
    DirectPathState { operation: &'static str },
    /// A bind or column name did not resolve to an index.
    #[error("No item named '{name}' exists.")]
    ItemNotFound { name: String },
    /// The Oracle client shared library could not be opened.
    #[error("Cannot load the Oracle client library from '{path}': {details}")]
    LoadingSharedLib { path: String, details: String },
    /// The shared library was opened, but it does not export the minimal OCI surface.
    #[error("The library does not export the required OCI entry points.")]
    LoadingSymbols,
    /// Cleanup found live vendor resources. Something kept a handle beyond its owner.
    #[error("Cleanup found {count} unfreed {resource}.")]
    UnfreedData {
        resource: LeakedResource,
        count: usize,
    },
    /// Cleanup found bytes the driver allocated and never returned.
    #[error("Cleanup found {0} unfreed driver-allocated bytes.")]
    UnfreedBytes(u64),
    /// The session has been lost, as signalled through a high availability event. The connection
    /// must be recreated.
    #[error("The database session has been lost.")]
    SessionLost,
    /// The in-flight call has been cancelled through `break_execution`.
    #[error("The server call has been interrupted.")]
    Interrupted,
    /// A caller supplied buffer has been handed to a bind registered with driver-owned buffers.
    #[error("Bind '{name}' owns its buffers; rebinding with caller memory is not allowed.")]
    ExternalBindingNotAllowed { name: String },
}

impl Error {
    /// Oracle error code if this is a vendor error, `0` otherwise.
    pub fn oracle_code(&self) -> i32 {
        match self {
            Error::Oracle { code, .. } => *code,
            _ => 0,
        }
    }
}

/// Snapshot of the most recent error on this thread, including its raising context.
#[derive(Debug, Clone)]
pub struct LastError {
    pub error: Error,
    /// Kind of driver object which raised the error.
    pub source: SourceKind,
    /// Short description of the raising object, e.g. the statement text or the LOB kind.
    pub source_description: String,
    /// Row offset within an array DML iteration, if the error occurred inside one.
    pub row_offset: Option<u32>,
    /// Driver function in which the error was raised.
    pub location: &'static str,
}

thread_local! {
    static CURRENT_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Stores `last` as this thread's current error. Called on every failing public operation,
/// before the error is handed to an installed handler.
pub(crate) fn set_last_error(last: LastError) {
    CURRENT_ERROR.with(|slot| *slot.borrow_mut() = Some(last));
}

/// The most recent error raised on the calling thread, if any. Errors raised on other threads
/// are not visible here.
pub fn last_error() -> Option<LastError> {
    CURRENT_ERROR.with(|slot| slot.borrow().clone())
}

/// Clears the calling thread's current error slot.
pub fn clear_last_error() {
    CURRENT_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::{clear_last_error, last_error, set_last_error, Error, LastError, SourceKind};

    #[test]
    fn last_error_is_thread_local() {
        clear_last_error();
        set_last_error(LastError {
            error: Error::NotScrollable,
            source: SourceKind::ResultSet,
            source_description: "SELECT 1 FROM DUAL".to_string(),
            row_offset: None,
            location: "fetch_last",
        });
        assert!(matches!(
            last_error().unwrap().error,
            Error::NotScrollable
        ));

        let seen_on_other_thread =
            std::thread::spawn(|| last_error().is_some()).join().unwrap();
        assert!(!seen_on_other_thread);

        clear_last_error();
        assert!(last_error().is_none());
    }

    #[test]
    fn oracle_errors_format_with_ora_prefix() {
        let error = Error::Oracle {
            code: 1017,
            message: "invalid username/password; logon denied".to_string(),
            function: "OCISessionBegin",
        };
        let displayed = error.to_string();
        assert!(displayed.contains("ORA-01017"));
        assert!(displayed.contains("OCISessionBegin"));
    }
}
