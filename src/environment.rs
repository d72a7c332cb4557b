//! Environment lifecycle: loading the client, creating the OCI environment, process wide
//! defaults.

use std::{
    env,
    path::{Path, PathBuf},
    ptr::null_mut,
    sync::{Arc, Mutex},
};

use log::warn;

use crate::{
    connection::{Connection, SessionMode},
    error::{set_last_error, Error, LastError, SourceKind},
    memory::ResourceCounters,
    oci::{
        self,
        constants::{
            OCI_EVENTS, OCI_HTYPE_ENV, OCI_HTYPE_ERROR, OCI_NCHAR_LITERAL_REPLACE_ON, OCI_OBJECT,
            OCI_SUCCESS, OCI_THREADED, OCI_UTF16ID,
        },
        functions::{LoadError, OciEntryPoints},
        types::{OciEnv, OciError},
        Version,
    },
    pool::{Pool, PoolKind},
    text,
};

/// Environment variable switching on a workaround for an Oracle client defect in UTF-16 column
/// name reporting (Oracle bug 9838993). Recognized values: `TRUE` (case-insensitive) or `1`.
pub const VAR_WORKAROUND_UTF16_COLUMN_NAME: &str = "OCILIB_WORKAROUND_UTF16_COLUMN_NAME";

/// The six caller overridable conversion format strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Date,
    Timestamp,
    TimestampTz,
    Numeric,
    BinaryFloat,
    BinaryDouble,
}

impl FormatKind {
    pub(crate) const COUNT: usize = 6;

    pub(crate) fn index(self) -> usize {
        match self {
            FormatKind::Date => 0,
            FormatKind::Timestamp => 1,
            FormatKind::TimestampTz => 2,
            FormatKind::Numeric => 3,
            FormatKind::BinaryFloat => 4,
            FormatKind::BinaryDouble => 5,
        }
    }

    pub(crate) fn default_value(self) -> &'static str {
        match self {
            FormatKind::Date => "YYYY-MM-DD HH24:MI:SS",
            FormatKind::Timestamp => "YYYY-MM-DD HH24:MI:SS.FF",
            FormatKind::TimestampTz => "YYYY-MM-DD HH24:MI:SS.FF TZR",
            FormatKind::Numeric => "FM99999999999999999999999990.999999999999999999999999",
            FormatKind::BinaryFloat => "%f",
            FormatKind::BinaryDouble => "%lf",
        }
    }
}

pub(crate) fn default_formats() -> [String; FormatKind::COUNT] {
    [
        FormatKind::Date.default_value().to_string(),
        FormatKind::Timestamp.default_value().to_string(),
        FormatKind::TimestampTz.default_value().to_string(),
        FormatKind::Numeric.default_value().to_string(),
        FormatKind::BinaryFloat.default_value().to_string(),
        FormatKind::BinaryDouble.default_value().to_string(),
    ]
}

/// Environment creation flags.
#[derive(Debug, Clone, Copy)]
pub struct EnvMode {
    /// Initialize the client for multithreaded use. Required if connections are used from more
    /// than one thread (each connection still being a single serialization domain).
    pub threaded: bool,
    /// Initialize event support, required for change notification subscriptions and HA events.
    pub events: bool,
    /// Record failing calls in the thread-local current-error slot (see
    /// [`crate::last_error`]). Disabling this only makes sense for applications which exclusively
    /// consume the returned `Result`s.
    pub context_errors: bool,
}

impl Default for EnvMode {
    fn default() -> Self {
        EnvMode {
            threaded: true,
            events: false,
            context_errors: true,
        }
    }
}

/// Callback invoked synchronously with every error before the failing call returns it.
pub type ErrorHandler = Box<dyn Fn(&LastError) + Send + Sync>;

/// High availability event delivered to an installed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaEvent {
    /// The instance backing one or more sessions went down; affected sessions are lost.
    Down,
    /// A previously down instance came back up.
    Up,
}

/// Callback invoked from the client event thread on high availability events.
pub type HaHandler = Box<dyn Fn(HaEvent) + Send + Sync>;

/// Builder for [`Environment`].
pub struct EnvironmentBuilder {
    library_path: Option<PathBuf>,
    mode: EnvMode,
    error_handler: Option<ErrorHandler>,
}

impl EnvironmentBuilder {
    /// Explicit path to the Oracle client shared library. Defaults to the platform specific
    /// library name (`libclntsh.so`, `oci.dll`, `libclntsh.dylib`) resolved through the system
    /// loader search path.
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: EnvMode) -> Self {
        self.mode = mode;
        self
    }

    /// Install a handler receiving every error synchronously, in addition to the `Result` based
    /// reporting.
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<Environment, Error> {
        Environment::initialize(self)
    }
}

/// An OCI environment: the loaded client library, the environment handle, and process wide
/// defaults. Everything else in this crate borrows from an `Environment`.
///
/// Creating more than one environment is possible but rarely useful; each carries its own copy
/// of the loaded entry points and its own counters.
pub struct Environment {
    oci: OciEntryPoints,
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    counters: Arc<ResourceCounters>,
    mode: EnvMode,
    /// Narrow builds only: `NLS_LANG` names a UTF-8 charset, so byte lengths per character
    /// differ from 1.
    nls_utf8: bool,
    utf16_column_name_workaround: bool,
    formats: Mutex<[String; FormatKind::COUNT]>,
    error_handler: Mutex<Option<ErrorHandler>>,
    ha_handler: Mutex<Option<HaHandler>>,
    warnings_enabled: Mutex<bool>,
}

// The environment handle is created in threaded mode; all interior mutability above is mutex
// guarded. The base error handle is only used by environment teardown.
unsafe impl Send for Environment {}
unsafe impl Sync for Environment {}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder {
            library_path: None,
            mode: EnvMode::default(),
            error_handler: None,
        }
    }

    /// Loads the Oracle client from the default location and creates an environment with default
    /// mode (threaded, no events).
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    fn initialize(builder: EnvironmentBuilder) -> Result<Self, Error> {
        let path = builder
            .library_path
            .unwrap_or_else(|| PathBuf::from(oci::default_library_name()));
        let oci = load_entry_points(&path)?;

        let nls_utf8 = !text::is_wide() && nls_lang_is_utf8();
        let utf16_column_name_workaround = env_var_truthy(VAR_WORKAROUND_UTF16_COLUMN_NAME);

        let mut oci_mode = OCI_OBJECT;
        if builder.mode.threaded {
            oci_mode |= OCI_THREADED;
        }
        if builder.mode.events {
            oci_mode |= OCI_EVENTS;
        }
        let charset = if text::is_wide() {
            // N' literal replacement only works from 10.2 on.
            if oci.runtime_version() >= Version::V10_2 {
                oci_mode |= OCI_NCHAR_LITERAL_REPLACE_ON;
            }
            OCI_UTF16ID
        } else {
            0
        };

        let mut envhp = null_mut();
        let status = unsafe {
            (oci.env_nls_create)(
                &mut envhp,
                oci_mode,
                null_mut(),
                None,
                None,
                None,
                0,
                null_mut(),
                charset,
                charset,
            )
        };
        if status != OCI_SUCCESS || envhp.is_null() {
            return Err(Error::Oracle {
                code: 0,
                message: "cannot create the OCI environment".to_string(),
                function: "OCIEnvNlsCreate",
            });
        }

        let counters = Arc::new(ResourceCounters::new());
        let errhp = match counters.alloc_handle(&oci, envhp as *const _, OCI_HTYPE_ERROR) {
            Ok(handle) => handle as *mut OciError,
            Err(error) => {
                unsafe { (oci.handle_free)(envhp as *mut _, OCI_HTYPE_ENV) };
                return Err(error);
            }
        };

        let environment = Environment {
            oci,
            envhp,
            errhp,
            counters,
            mode: builder.mode,
            nls_utf8,
            utf16_column_name_workaround,
            formats: Mutex::new(default_formats()),
            error_handler: Mutex::new(builder.error_handler),
            ha_handler: Mutex::new(None),
            warnings_enabled: Mutex::new(false),
        };
        Ok(environment)
    }

    /// Allocates a connection and establishes a session using username/password credentials.
    pub fn connect(
        &self,
        db: &str,
        user: &str,
        password: &str,
    ) -> Result<Connection<'_>, Error> {
        self.connect_with_mode(db, user, password, SessionMode::Default)
    }

    /// Like [`Self::connect`], with an explicit session mode (e.g. `SYSDBA`).
    pub fn connect_with_mode(
        &self,
        db: &str,
        user: &str,
        password: &str,
        mode: SessionMode,
    ) -> Result<Connection<'_>, Error> {
        Connection::establish(self, db, user, password, mode)
    }

    /// Creates a session or connection pool.
    pub fn create_pool(
        &self,
        kind: PoolKind,
        db: &str,
        user: &str,
        password: &str,
        min: u32,
        max: u32,
        increment: u32,
    ) -> Result<Pool<'_>, Error> {
        Pool::create(self, kind, db, user, password, min, max, increment)
    }

    /// Explicit teardown. Equivalent to dropping the environment, but reports resources which
    /// are still alive instead of merely logging them.
    ///
    /// The borrow checker guarantees no connection, pool or subscription created from this
    /// environment is still alive when this can be called.
    pub fn cleanup(self) -> Result<(), Error> {
        match self.counters.leak_check() {
            // One live handle is expected at this point: the base error handle, disposed by drop.
            Err(Error::UnfreedData { resource, count })
                if resource == crate::error::LeakedResource::Handles && count == 1 =>
            {
                Ok(())
            }
            other => other,
        }
    }

    /// Version of the loaded client library.
    pub fn runtime_version(&self) -> Version {
        self.oci.runtime_version()
    }

    /// `true` if this build talks UTF-16 to the client.
    pub fn is_wide(&self) -> bool {
        text::is_wide()
    }

    /// Narrow builds: `true` if `NLS_LANG` selected a UTF-8 charset at initialization.
    pub fn nls_utf8(&self) -> bool {
        self.nls_utf8
    }

    /// `true` if the UTF-16 column name workaround has been enabled through
    /// [`VAR_WORKAROUND_UTF16_COLUMN_NAME`].
    pub fn utf16_column_name_workaround(&self) -> bool {
        self.utf16_column_name_workaround
    }

    pub fn mode(&self) -> EnvMode {
        self.mode
    }

    /// Current format string for `kind`. Connections may override these individually.
    pub fn format(&self, kind: FormatKind) -> String {
        self.formats.lock().unwrap()[kind.index()].clone()
    }

    /// Overrides the process wide default format for `kind`.
    pub fn set_format(&self, kind: FormatKind, format: &str) {
        self.formats.lock().unwrap()[kind.index()] = format.to_string();
    }

    /// Enables reporting of Oracle warnings (success-with-info) through `log::warn!`.
    pub fn enable_warnings(&self, enabled: bool) {
        *self.warnings_enabled.lock().unwrap() = enabled;
    }

    pub fn warnings_enabled(&self) -> bool {
        *self.warnings_enabled.lock().unwrap()
    }

    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.error_handler.lock().unwrap() = handler;
    }

    /// Installs a handler for high availability events. Requires the environment to be created
    /// with `events` mode.
    pub fn set_ha_handler(&self, handler: Option<HaHandler>) {
        *self.ha_handler.lock().unwrap() = handler;
    }

    pub(crate) fn notify_ha_event(&self, event: HaEvent) {
        if let Some(handler) = self.ha_handler.lock().unwrap().as_ref() {
            handler(event);
        }
    }

    /// Stores `error` in the thread-local slot and delivers it to the installed handler. Called
    /// by every object right before a failing operation returns.
    pub(crate) fn raise(
        &self,
        error: &Error,
        source: SourceKind,
        source_description: &str,
        row_offset: Option<u32>,
        location: &'static str,
    ) {
        if !self.mode.context_errors {
            return;
        }
        let last = LastError {
            error: error.clone(),
            source,
            source_description: source_description.to_string(),
            row_offset,
            location,
        };
        set_last_error(last.clone());
        if let Some(handler) = self.error_handler.lock().unwrap().as_ref() {
            handler(&last);
        }
    }

    pub(crate) fn oci(&self) -> &OciEntryPoints {
        &self.oci
    }

    pub(crate) fn env_ptr(&self) -> *mut OciEnv {
        self.envhp
    }

    pub(crate) fn err_ptr(&self) -> *mut OciError {
        self.errhp
    }

    pub(crate) fn counters(&self) -> &ResourceCounters {
        &self.counters
    }

    /// Shared counter handle for disposal closures which may outlive a borrow of `self`.
    pub(crate) fn counters_arc(&self) -> Arc<ResourceCounters> {
        Arc::clone(&self.counters)
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        unsafe {
            self.counters
                .free_handle(&self.oci, self.errhp as *mut _, OCI_HTYPE_ERROR);
        }
        if let Err(leak) = self.counters.leak_check() {
            warn!("OCI environment torn down with live resources: {leak}");
        }
        unsafe {
            crate::handles::free_handle(&self.oci, self.envhp as *mut _, OCI_HTYPE_ENV);
        }
    }
}

fn load_entry_points(path: &Path) -> Result<OciEntryPoints, Error> {
    unsafe { OciEntryPoints::load(path) }.map_err(|cause| match cause {
        LoadError::Library(details) => Error::LoadingSharedLib {
            path: path.display().to_string(),
            details: details.to_string(),
        },
        LoadError::MissingBaseSymbols => Error::LoadingSymbols,
    })
}

fn nls_lang_is_utf8() -> bool {
    env::var("NLS_LANG")
        .map(|value| value.to_uppercase().contains("UTF8"))
        .unwrap_or(false)
}

fn env_var_truthy(name: &str) -> bool {
    env::var(name).map(|value| is_truthy(&value)).unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("TRUE") || atoi::atoi::<i32>(value.trim().as_bytes()) == Some(1)
}

#[cfg(test)]
mod tests {
    use super::{default_formats, FormatKind};

    #[test]
    fn format_defaults_match_documented_patterns() {
        let formats = default_formats();
        assert_eq!("YYYY-MM-DD HH24:MI:SS", formats[FormatKind::Date.index()]);
        assert_eq!(
            "YYYY-MM-DD HH24:MI:SS.FF",
            formats[FormatKind::Timestamp.index()]
        );
        assert_eq!(
            "YYYY-MM-DD HH24:MI:SS.FF TZR",
            formats[FormatKind::TimestampTz.index()]
        );
    }

    #[test]
    fn truthy_env_values() {
        assert!(super::is_truthy("TRUE"));
        assert!(super::is_truthy("true"));
        assert!(super::is_truthy("1"));
        assert!(!super::is_truthy("0"));
        assert!(!super::is_truthy("yes"));
    }
}
