//! # About
//!
//! `oci-api` enables you to write applications which access Oracle databases through the Oracle
//! Call Interface (OCI), the C API of the Oracle client. The client shared library is loaded at
//! runtime; there is no link time dependency on Oracle software.
//!
//! ```no_run
//! use oci_api::Environment;
//!
//! fn main() -> Result<(), oci_api::Error> {
//!     let environment = Environment::new()?;
//!     let connection = environment.connect("//db.example.com/XEPDB1", "scott", "tiger")?;
//!     let mut statement = connection.prepare("SELECT id, name FROM employees WHERE id = :id")?;
//!     statement.bind(":id", Some(42i32))?;
//!     statement.execute(1)?;
//!     if let Some(mut rows) = statement.result_set()? {
//!         while rows.fetch_next()? {
//!             println!("{:?} {:?}", rows.get_i32(1)?, rows.get_string(2)?);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every connection is one serialization domain: use it (and everything created from it) from
//! one thread at a time. Distinct connections work in parallel.

mod bind;
mod connection;
mod define;
mod direct_path;
mod environment;
mod error;
mod lob;
mod long;
mod memory;
mod pool;
mod queue;
mod result_set;
mod statement;
mod subscription;
mod text;
mod type_info;

pub mod handles;
pub mod oci;
pub mod types;

pub use self::{
    bind::{BindAllocMode, BindDirection, BindSpec, FixedSizedBind},
    connection::{Connection, ConnectionState, SessionMode, TraceAttribute, Transaction},
    define::{ColumnDescription, DataKind, FileKind, LobKind},
    direct_path::{DirPath, DirPathResult, DirPathState},
    environment::{
        EnvMode, Environment, EnvironmentBuilder, ErrorHandler, FormatKind, HaEvent, HaHandler,
        VAR_WORKAROUND_UTF16_COLUMN_NAME,
    },
    error::{clear_last_error, last_error, Error, Feature, LastError, LeakedResource, SourceKind},
    lob::{File, Lob, LobOpenMode, LobSeekMode},
    long::{Long, LongKind},
    memory::ResourceUsage,
    pool::{Pool, PoolKind},
    queue::{
        Agent, Dequeue, DequeueMode, Enqueue, Message, MessageState, Navigation, Visibility, Wait,
    },
    result_set::{ResultSet, SeekOrigin},
    statement::{BatchError, ExecMode, Statement, StatementType},
    subscription::{
        ChangeOperation, Event, EventCallback, ReconnectCredentials, Subscription,
        SubscriptionKind,
    },
    type_info::{TypeInfo, TypeInfoKind},
    types::{
        Collection, Date, Interval, IntervalKind, Number, Object, Reference, Timestamp,
        TimestampKind, Vector, VectorFormat,
    },
};
// Reexports
/// Reexports `widestring` to let applications work with the same UTF-16 string types this crate
/// uses in wide mode.
pub use widestring;
