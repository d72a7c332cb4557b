//! Connection lifecycle: attach, authenticate, transact.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::c_void,
    marker::PhantomData,
    ptr::null_mut,
    rc::Rc,
};

use log::debug;

use crate::{
    environment::{Environment, FormatKind, HaEvent},
    error::{Error, SourceKind},
    handles::{ExtSword, HolderArena, OciResult},
    oci::{
        constants::{
            OCI_ATTR_ACTION, OCI_ATTR_CLIENT_IDENTIFIER, OCI_ATTR_CLIENT_INFO, OCI_ATTR_DBOP,
            OCI_ATTR_MODULE, OCI_ATTR_PASSWORD, OCI_ATTR_SERVER, OCI_ATTR_SESSION,
            OCI_ATTR_TRANS, OCI_ATTR_USERNAME, OCI_ATTR_XID, OCI_CRED_RDBMS, OCI_DEFAULT,
            OCI_HTYPE_SERVER, OCI_HTYPE_SESSION, OCI_HTYPE_SVCCTX, OCI_HTYPE_TRANS, OCI_SESSRLS_DROPSESS,
            OCI_SYSDBA, OCI_SYSOPER, OCI_TRANS_NEW, OCI_TRANS_TWOPHASE,
        },
        types::{OciError, OciServer, OciSession, OciSvcCtx, OciTrans, Xid},
        Version,
    },
    statement::Statement,
    text::{DbText, TextBuffer},
};

/// Session authorization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Default,
    SysDba,
    SysOper,
}

impl SessionMode {
    fn session_flags(self) -> u32 {
        match self {
            SessionMode::Default => OCI_DEFAULT,
            SessionMode::SysDba => OCI_SYSDBA,
            SessionMode::SysOper => OCI_SYSOPER,
        }
    }
}

/// Connection life cycle states, advanced strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Allocated,
    Attached,
    LoggedOn,
    LoggedOff,
    Detached,
    Disposed,
}

/// Trace attributes propagated to the server for monitoring views (`V$SESSION` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceAttribute {
    /// Client identifier (`V$SESSION.CLIENT_IDENTIFIER`).
    Identifier,
    /// Module name (`V$SESSION.MODULE`).
    Module,
    /// Action within the module (`V$SESSION.ACTION`).
    Action,
    /// Client info (`V$SESSION.CLIENT_INFO`).
    ClientInfo,
    /// Database operation for monitoring (12c `DBMS_SQL_MONITOR`).
    Operation,
}

/// The connection references storage of all information about an attached server and an
/// authenticated session, including transaction state and its private error handle.
///
/// A connection is one serialization domain: it is `Send` but deliberately not `Sync`, and every
/// object created from it borrows it.
pub struct Connection<'env> {
    env: &'env Environment,
    srvhp: *mut OciServer,
    svchp: *mut OciSvcCtx,
    seshp: *mut OciSession,
    /// Connections keep their own error handle so concurrent connections never contend on the
    /// environment's.
    errhp: *mut OciError,
    state: Cell<ConnectionState>,
    autocommit: Cell<bool>,
    session_lost: Cell<bool>,
    /// Session obtained from a pool; close releases it back instead of ending it.
    pooled: Option<PooledSession>,
    db: String,
    user: String,
    mode: SessionMode,
    session_tag: RefCell<Option<String>>,
    server_version_banner: RefCell<Option<String>>,
    format_overrides: RefCell<[Option<String>; FormatKind::COUNT]>,
    /// Vendor resources acquired under this connection (statement handles, temporary locators,
    /// descriptors). Disposed transitively when the connection goes away.
    pub(crate) holders: RefCell<HolderArena>,
    /// Describe cache, keyed by kind and normalized object name.
    pub(crate) type_cache: RefCell<HashMap<String, Rc<crate::type_info::TypeInfoShared>>>,
    _not_sync: PhantomData<*mut ()>,
}

pub(crate) struct PooledSession {
    pub tag: Option<String>,
}

// A connection may move between threads; concurrent use is prevented by it not being `Sync`.
unsafe impl Send for Connection<'_> {}

impl<'env> Connection<'env> {
    /// Attach to `db` and begin a session for `user`. Used through
    /// [`Environment::connect`].
    pub(crate) fn establish(
        env: &'env Environment,
        db: &str,
        user: &str,
        password: &str,
        mode: SessionMode,
    ) -> Result<Self, Error> {
        let oci = env.oci();
        let counters = env.counters();
        let envhp = env.env_ptr() as *const c_void;

        let errhp = counters.alloc_handle(oci, envhp, crate::oci::constants::OCI_HTYPE_ERROR)?
            as *mut OciError;
        let mut guard = HandleGuard::new(env);
        guard.push(errhp as *mut c_void, crate::oci::constants::OCI_HTYPE_ERROR);

        let srvhp = match counters.alloc_handle(oci, envhp, OCI_HTYPE_SERVER) {
            Ok(h) => h as *mut OciServer,
            Err(e) => return Err(e),
        };
        guard.push(srvhp as *mut c_void, OCI_HTYPE_SERVER);
        let svchp = counters.alloc_handle(oci, envhp, OCI_HTYPE_SVCCTX)? as *mut OciSvcCtx;
        guard.push(svchp as *mut c_void, OCI_HTYPE_SVCCTX);
        let seshp = counters.alloc_handle(oci, envhp, OCI_HTYPE_SESSION)? as *mut OciSession;
        guard.push(seshp as *mut c_void, OCI_HTYPE_SESSION);

        let connection = Connection {
            env,
            srvhp,
            svchp,
            seshp,
            errhp,
            state: Cell::new(ConnectionState::Allocated),
            autocommit: Cell::new(false),
            session_lost: Cell::new(false),
            pooled: None,
            db: db.to_string(),
            user: user.to_string(),
            mode,
            session_tag: RefCell::new(None),
            server_version_banner: RefCell::new(None),
            format_overrides: RefCell::new(Default::default()),
            holders: RefCell::new(HolderArena::new()),
            type_cache: RefCell::new(HashMap::new()),
            _not_sync: PhantomData,
        };
        // The guard held the handles through the fallible allocations; from here on drop of the
        // connection owns them.
        guard.disarm();

        connection.attach(db)?;
        connection.logon(user, password)?;
        Ok(connection)
    }

    /// Wraps a service context handed out by a session pool. Its session handle is implicit in
    /// the service context; close releases the session back to the pool.
    pub(crate) fn from_pooled_session(
        env: &'env Environment,
        svchp: *mut OciSvcCtx,
        db: &str,
        user: &str,
        tag: Option<String>,
    ) -> Result<Self, Error> {
        let errhp = env.counters().alloc_handle(
            env.oci(),
            env.env_ptr() as *const c_void,
            crate::oci::constants::OCI_HTYPE_ERROR,
        )? as *mut OciError;
        Ok(Connection {
            env,
            srvhp: null_mut(),
            svchp,
            seshp: null_mut(),
            errhp,
            state: Cell::new(ConnectionState::LoggedOn),
            autocommit: Cell::new(false),
            session_lost: Cell::new(false),
            pooled: Some(PooledSession { tag: tag.clone() }),
            db: db.to_string(),
            user: user.to_string(),
            mode: SessionMode::Default,
            session_tag: RefCell::new(tag),
            server_version_banner: RefCell::new(None),
            format_overrides: RefCell::new(Default::default()),
            holders: RefCell::new(HolderArena::new()),
            type_cache: RefCell::new(HashMap::new()),
            _not_sync: PhantomData,
        })
    }

    fn attach(&self, db: &str) -> Result<(), Error> {
        let db_text = DbText::new(db);
        let status = unsafe {
            (self.env.oci().server_attach)(
                self.srvhp,
                self.errhp,
                db_text.ptr(),
                db_text.len_bytes() as i32,
                OCI_DEFAULT,
            )
        };
        self.resolve(
            status.into_oci_result("OCIServerAttach"),
            "attach",
        )?;
        self.state.set(ConnectionState::Attached);
        debug!("Attached to server '{db}'");
        Ok(())
    }

    fn logon(&self, user: &str, password: &str) -> Result<(), Error> {
        let oci = self.env.oci();
        // Wire the server handle into the service context, then credentials into the session.
        self.set_handle_attr(
            self.svchp as *mut c_void,
            OCI_HTYPE_SVCCTX,
            self.srvhp as *mut c_void,
            0,
            OCI_ATTR_SERVER,
            "OCIAttrSet(server)",
        )?;
        self.set_text_attr(
            self.seshp as *mut c_void,
            OCI_HTYPE_SESSION,
            user,
            OCI_ATTR_USERNAME,
            "OCIAttrSet(username)",
        )?;
        self.set_text_attr(
            self.seshp as *mut c_void,
            OCI_HTYPE_SESSION,
            password,
            OCI_ATTR_PASSWORD,
            "OCIAttrSet(password)",
        )?;
        let status = unsafe {
            (oci.session_begin)(
                self.svchp,
                self.errhp,
                self.seshp,
                OCI_CRED_RDBMS,
                self.mode.session_flags(),
            )
        };
        // The password is not retained anywhere in the driver after this point; the session
        // handle keeps what the protocol needs.
        self.resolve(status.into_oci_result("OCISessionBegin"), "logon")?;
        self.set_handle_attr(
            self.svchp as *mut c_void,
            OCI_HTYPE_SVCCTX,
            self.seshp as *mut c_void,
            0,
            OCI_ATTR_SESSION,
            "OCIAttrSet(session)",
        )?;
        self.state.set(ConnectionState::LoggedOn);
        debug!("Session started for user '{user}'");
        Ok(())
    }

    /// Ends the session, detaches from the server and disposes every dependent resource. Errors
    /// on the way down are reported; the teardown continues regardless.
    pub fn close(mut self) -> Result<(), Error> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        if self.state.get() >= ConnectionState::Detached {
            return Ok(());
        }
        // Descendants first: statements, locators and descriptors acquired under this
        // connection.
        self.holders.borrow_mut().release_all();

        let oci = self.env.oci();
        let mut first_failure = None;
        // Objects the client allocated implicitly in its cache for this service context.
        if self.state.get() == ConnectionState::LoggedOn {
            unsafe { (oci.cache_free)(self.env.env_ptr(), self.errhp, self.svchp) };
        }
        if let Some(pooled) = &self.pooled {
            if let Some(session_release) = oci.session_release {
                let tag = pooled.tag.clone().unwrap_or_default();
                let tag_text = DbText::new(&tag);
                let status = unsafe {
                    session_release(
                        self.svchp,
                        self.errhp,
                        tag_text.ptr() as *mut _,
                        tag_text.len_bytes() as u32,
                        if self.session_lost.get() {
                            OCI_SESSRLS_DROPSESS
                        } else {
                            OCI_DEFAULT
                        },
                    )
                };
                if let Err(error) =
                    self.resolve(status.into_oci_result("OCISessionRelease"), "close")
                {
                    first_failure.get_or_insert(error);
                }
            }
            self.state.set(ConnectionState::Detached);
        } else {
            if self.state.get() == ConnectionState::LoggedOn {
                let status = unsafe {
                    (oci.session_end)(self.svchp, self.errhp, self.seshp, OCI_DEFAULT)
                };
                if let Err(error) =
                    self.resolve(status.into_oci_result("OCISessionEnd"), "close")
                {
                    first_failure.get_or_insert(error);
                }
                self.state.set(ConnectionState::LoggedOff);
            }
            if self.state.get() >= ConnectionState::Attached {
                let status =
                    unsafe { (oci.server_detach)(self.srvhp, self.errhp, OCI_DEFAULT) };
                if let Err(error) =
                    self.resolve(status.into_oci_result("OCIServerDetach"), "close")
                {
                    first_failure.get_or_insert(error);
                }
                self.state.set(ConnectionState::Detached);
            }
        }

        let counters = self.env.counters();
        unsafe {
            if !self.seshp.is_null() {
                counters.free_handle(oci, self.seshp as *mut _, OCI_HTYPE_SESSION);
            }
            if !self.svchp.is_null() && self.pooled.is_none() {
                counters.free_handle(oci, self.svchp as *mut _, OCI_HTYPE_SVCCTX);
            }
            if !self.srvhp.is_null() {
                counters.free_handle(oci, self.srvhp as *mut _, OCI_HTYPE_SERVER);
            }
            counters.free_handle(
                oci,
                self.errhp as *mut _,
                crate::oci::constants::OCI_HTYPE_ERROR,
            );
        }
        self.seshp = null_mut();
        self.svchp = null_mut();
        self.srvhp = null_mut();
        self.errhp = null_mut();
        self.state.set(ConnectionState::Disposed);
        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Prepares `sql` into a new statement.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_, 'env>, Error> {
        Statement::prepare(self, sql)
    }

    /// Prepares and executes `sql` in one go, without binds or result processing. Useful for
    /// DDL.
    pub fn execute_immediate(&self, sql: &str) -> Result<(), Error> {
        let mut statement = self.prepare(sql)?;
        statement.execute(1)?;
        statement.close()
    }

    /// To commit the current transaction.
    pub fn commit(&self) -> Result<(), Error> {
        let status = unsafe { (self.env.oci().trans_commit)(self.svchp, self.errhp, OCI_DEFAULT) };
        self.resolve(status.into_oci_result("OCITransCommit"), "commit")
    }

    /// To roll back the current transaction.
    pub fn rollback(&self) -> Result<(), Error> {
        let status =
            unsafe { (self.env.oci().trans_rollback)(self.svchp, self.errhp, OCI_DEFAULT) };
        self.resolve(status.into_oci_result("OCITransRollback"), "rollback")
    }

    /// When autocommit is on, every execute commits on success.
    pub fn set_autocommit(&self, enabled: bool) {
        self.autocommit.set(enabled);
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit.get()
    }

    /// Round trip to the server to verify the connection is alive. On clients older than 10.2 a
    /// cheap no-op statement is executed instead.
    pub fn ping(&self) -> Result<(), Error> {
        self.ensure_usable("ping")?;
        if let Some(ping) = self.env.oci().ping {
            let status = unsafe { ping(self.svchp, self.errhp, OCI_DEFAULT) };
            self.resolve(status.into_oci_result("OCIPing"), "ping")
        } else {
            self.execute_immediate("BEGIN NULL; END;")
        }
    }

    /// Version banner reported by the server, e.g.
    /// `Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production`.
    pub fn server_version(&self) -> Result<String, Error> {
        if let Some(banner) = self.server_version_banner.borrow().as_ref() {
            return Ok(banner.clone());
        }
        let mut buffer = TextBuffer::with_capacity(512);
        let status = unsafe {
            (self.env.oci().server_version)(
                self.svchp as *mut c_void,
                self.errhp,
                buffer.mut_buf_ptr(),
                buffer.capacity_bytes(),
                OCI_HTYPE_SVCCTX as u8,
            )
        };
        self.resolve(status.into_oci_result("OCIServerVersion"), "server_version")?;
        buffer.set_actual_len_bytes(buffer.capacity_bytes());
        let banner = buffer.to_utf8();
        let banner = banner.trim_end_matches('\0').trim_end().to_string();
        *self.server_version_banner.borrow_mut() = Some(banner.clone());
        Ok(banner)
    }

    /// Server version as a numeric triple, parsed out of the banner.
    pub fn server_version_number(&self) -> Result<Version, Error> {
        let banner = self.server_version()?;
        parse_version_banner(&banner).ok_or_else(|| {
            let error = Error::Internal(format!("no version triple in banner '{banner}'"));
            self.raise(&error, "server_version_number");
            error
        })
    }

    /// Changes the password of the connected user. Also usable to log on to an account whose
    /// password has expired.
    pub fn change_password(&self, new_password: &str) -> Result<(), Error> {
        self.ensure_usable("change_password")?;
        let user = DbText::new(&self.user);
        let new_password_text = DbText::new(new_password);
        // The old password is not retained after logon; the server accepts an empty old
        // password for an authenticated session.
        let old = DbText::new("");
        let status = unsafe {
            (self.env.oci().password_change)(
                self.svchp,
                self.errhp,
                user.ptr(),
                user.len_bytes() as u32,
                old.ptr(),
                old.len_bytes() as u32,
                new_password_text.ptr(),
                new_password_text.len_bytes() as u32,
                OCI_DEFAULT,
            )
        };
        self.resolve(status.into_oci_result("OCIPasswordChange"), "change_password")
    }

    /// Sends an out-of-band interrupt for the in-flight call on this connection. The
    /// interrupted call fails with [`Error::Interrupted`]; call [`Self::reset`] before using the
    /// connection again.
    pub fn break_execution(&self) -> Result<(), Error> {
        let status = unsafe { (self.env.oci().break_)(self.svchp as *mut c_void, self.errhp) };
        self.resolve(status.into_oci_result("OCIBreak"), "break_execution")
    }

    /// Completes the protocol exchange a break leaves behind.
    pub fn reset(&self) -> Result<(), Error> {
        let status = unsafe { (self.env.oci().reset)(self.svchp as *mut c_void, self.errhp) };
        self.resolve(status.into_oci_result("OCIReset"), "reset")
    }

    /// Sets one of the server visible trace attributes.
    pub fn set_trace(&self, attribute: TraceAttribute, value: &str) -> Result<(), Error> {
        let (target, target_type, attr, function) = match attribute {
            TraceAttribute::Identifier => (
                self.seshp as *mut c_void,
                OCI_HTYPE_SESSION,
                OCI_ATTR_CLIENT_IDENTIFIER,
                "OCIAttrSet(client identifier)",
            ),
            TraceAttribute::Module => (
                self.seshp as *mut c_void,
                OCI_HTYPE_SESSION,
                OCI_ATTR_MODULE,
                "OCIAttrSet(module)",
            ),
            TraceAttribute::Action => (
                self.seshp as *mut c_void,
                OCI_HTYPE_SESSION,
                OCI_ATTR_ACTION,
                "OCIAttrSet(action)",
            ),
            TraceAttribute::ClientInfo => (
                self.seshp as *mut c_void,
                OCI_HTYPE_SESSION,
                OCI_ATTR_CLIENT_INFO,
                "OCIAttrSet(client info)",
            ),
            TraceAttribute::Operation => (
                self.svchp as *mut c_void,
                OCI_HTYPE_SVCCTX,
                OCI_ATTR_DBOP,
                "OCIAttrSet(db operation)",
            ),
        };
        self.set_text_attr(target, target_type, value, attr, function)
    }

    /// Session tag used when releasing a pooled session.
    pub fn set_session_tag(&self, tag: Option<&str>) {
        *self.session_tag.borrow_mut() = tag.map(str::to_string);
    }

    pub fn session_tag(&self) -> Option<String> {
        self.session_tag.borrow().clone()
    }

    /// Format string for `kind`: the connection override if set, the environment default
    /// otherwise.
    pub fn format(&self, kind: FormatKind) -> String {
        self.format_overrides.borrow()[kind.index()]
            .clone()
            .unwrap_or_else(|| self.env.format(kind))
    }

    pub fn set_format(&self, kind: FormatKind, format: &str) {
        self.format_overrides.borrow_mut()[kind.index()] = Some(format.to_string());
    }

    pub fn database(&self) -> &str {
        &self.db
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// `true` once a high availability event or a fatal protocol error marked the session dead.
    pub fn is_session_lost(&self) -> bool {
        self.session_lost.get()
    }

    // Internal plumbing used by every object created under this connection.

    pub(crate) fn environment(&self) -> &'env Environment {
        self.env
    }

    pub(crate) fn svc_ptr(&self) -> *mut OciSvcCtx {
        self.svchp
    }

    pub(crate) fn err_ptr(&self) -> *mut OciError {
        self.errhp
    }

    pub(crate) fn ensure_usable(&self, location: &'static str) -> Result<(), Error> {
        if self.session_lost.get() {
            let error = Error::SessionLost;
            self.raise(&error, location);
            return Err(error);
        }
        if self.state.get() != ConnectionState::LoggedOn {
            let error = Error::NotInitialized;
            self.raise(&error, location);
            return Err(error);
        }
        Ok(())
    }

    /// Converts an OCI status into a `Result`, translating the error codes with dedicated
    /// meaning and reporting through the error slot and handler.
    pub(crate) fn resolve<T>(
        &self,
        result: OciResult<T>,
        location: &'static str,
    ) -> Result<T, Error> {
        self.resolve_for(result, SourceKind::Connection, &self.db, location)
    }

    pub(crate) fn resolve_for<T>(
        &self,
        result: OciResult<T>,
        source: SourceKind,
        source_description: &str,
        location: &'static str,
    ) -> Result<T, Error> {
        match result.into_result(self.env.oci(), self.errhp) {
            Ok(value) => Ok(value),
            Err(error) => {
                let error = self.translate_oracle_code(error);
                self.env
                    .raise(&error, source, source_description, None, location);
                Err(error)
            }
        }
    }

    /// Variant of [`Self::resolve_for`] treating `NoData` as an empty result.
    pub(crate) fn resolve_opt_for<T>(
        &self,
        result: OciResult<T>,
        source: SourceKind,
        source_description: &str,
        location: &'static str,
    ) -> Result<Option<T>, Error> {
        match result {
            OciResult::NoData => Ok(None),
            other => self
                .resolve_for(other, source, source_description, location)
                .map(Some),
        }
    }

    pub(crate) fn translate_oracle_code(&self, error: Error) -> Error {
        match error.oracle_code() {
            // User requested cancel of current operation.
            1013 => Error::Interrupted,
            // End-of-file on communication channel and friends: the session is gone.
            28 | 3113 | 3114 | 3135 => {
                self.mark_session_lost();
                Error::SessionLost
            }
            _ => error,
        }
    }

    pub(crate) fn mark_session_lost(&self) {
        if !self.session_lost.replace(true) {
            self.env.notify_ha_event(HaEvent::Down);
        }
    }

    pub(crate) fn raise(&self, error: &Error, location: &'static str) {
        self.env
            .raise(error, SourceKind::Connection, &self.db, None, location);
    }

    pub(crate) fn set_text_attr(
        &self,
        target: *mut c_void,
        target_type: u32,
        value: &str,
        attribute: u32,
        function: &'static str,
    ) -> Result<(), Error> {
        let text = DbText::new(value);
        let status = unsafe {
            (self.env.oci().attr_set)(
                target,
                target_type,
                text.ptr() as *mut c_void,
                text.len_bytes() as u32,
                attribute,
                self.errhp,
            )
        };
        self.resolve(status.into_oci_result(function), "set_attribute")
    }

    pub(crate) fn set_handle_attr(
        &self,
        target: *mut c_void,
        target_type: u32,
        value: *mut c_void,
        size: u32,
        attribute: u32,
        function: &'static str,
    ) -> Result<(), Error> {
        let status = unsafe {
            (self.env.oci().attr_set)(target, target_type, value, size, attribute, self.errhp)
        };
        self.resolve(status.into_oci_result(function), "set_attribute")
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        if self.state.get() < ConnectionState::Disposed {
            if let Err(error) = self.shutdown() {
                log::error!("Error during implicit connection shutdown: {error}");
            }
        }
    }
}

/// A transaction with explicit control, needed for read-only, serializable and distributed
/// (two-phase commit) transactions. Plain local transactions do not need this type; they start
/// implicitly with the first DML and end with [`Connection::commit`].
pub struct Transaction<'conn, 'env> {
    conn: &'conn Connection<'env>,
    trans: *mut OciTrans,
    timeout_seconds: u32,
    flags: u32,
    started: bool,
}

impl<'conn, 'env> Transaction<'conn, 'env> {
    /// Creates a transaction object. For a distributed transaction pass a global transaction
    /// id; it switches the start into two-phase mode.
    pub fn new(
        conn: &'conn Connection<'env>,
        timeout_seconds: u32,
        xid: Option<&[u8]>,
    ) -> Result<Self, Error> {
        conn.ensure_usable("transaction")?;
        let env = conn.environment();
        let trans = env.counters().alloc_handle(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_HTYPE_TRANS,
        )? as *mut OciTrans;

        let mut flags = OCI_TRANS_NEW;
        if let Some(global_id) = xid {
            if global_id.len() > 64 {
                let error = Error::OutOfRange {
                    argument: "global transaction id (max 64 bytes)",
                };
                conn.raise(&error, "transaction");
                unsafe {
                    env.counters()
                        .free_handle(env.oci(), trans as *mut _, OCI_HTYPE_TRANS)
                };
                return Err(error);
            }
            let mut xid_value = Xid::default();
            xid_value.gtrid_length = global_id.len() as i64;
            xid_value.data[..global_id.len()].copy_from_slice(global_id);
            let status = unsafe {
                (env.oci().attr_set)(
                    trans as *mut c_void,
                    OCI_HTYPE_TRANS,
                    &mut xid_value as *mut Xid as *mut c_void,
                    std::mem::size_of::<Xid>() as u32,
                    OCI_ATTR_XID,
                    conn.err_ptr(),
                )
            };
            conn.resolve(status.into_oci_result("OCIAttrSet(xid)"), "transaction")?;
            flags |= OCI_TRANS_TWOPHASE;
        }

        // Wire the transaction handle into the service context so subsequent calls run inside
        // it.
        conn.set_handle_attr(
            conn.svc_ptr() as *mut c_void,
            OCI_HTYPE_SVCCTX,
            trans as *mut c_void,
            0,
            OCI_ATTR_TRANS,
            "OCIAttrSet(transaction)",
        )?;

        Ok(Transaction {
            conn,
            trans,
            timeout_seconds,
            flags,
            started: false,
        })
    }

    pub fn start(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().trans_start)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.timeout_seconds,
                self.flags,
            )
        };
        self.conn
            .resolve(status.into_oci_result("OCITransStart"), "transaction_start")?;
        self.started = true;
        Ok(())
    }

    /// First phase of a two-phase commit. Returns `false` if the transaction was read-only and
    /// needs no second phase.
    pub fn prepare(&mut self) -> Result<bool, Error> {
        let status = unsafe {
            (self.conn.environment().oci().trans_prepare)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                OCI_DEFAULT,
            )
        };
        match status.into_oci_result("OCITransPrepare") {
            OciResult::NoData => Ok(false),
            other => self
                .conn
                .resolve(other, "transaction_prepare")
                .map(|()| true),
        }
    }

    pub fn commit(mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().trans_commit)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                OCI_DEFAULT,
            )
        };
        self.started = false;
        self.conn
            .resolve(status.into_oci_result("OCITransCommit"), "transaction_commit")
    }

    pub fn rollback(mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().trans_rollback)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                OCI_DEFAULT,
            )
        };
        self.started = false;
        self.conn.resolve(
            status.into_oci_result("OCITransRollback"),
            "transaction_rollback",
        )
    }

    /// Tells the server to forget a prepared (heuristically completed) transaction.
    pub fn forget(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().trans_forget)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                OCI_DEFAULT,
            )
        };
        self.started = false;
        self.conn
            .resolve(status.into_oci_result("OCITransForget"), "transaction_forget")
    }
}

impl Drop for Transaction<'_, '_> {
    fn drop(&mut self) {
        if self.started {
            let status = unsafe {
                (self.conn.environment().oci().trans_rollback)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    OCI_DEFAULT,
                )
            };
            if status != crate::oci::constants::OCI_SUCCESS {
                log::error!("Implicit rollback of an open transaction failed");
            }
        }
        let env = self.conn.environment();
        unsafe {
            env.counters()
                .free_handle(env.oci(), self.trans as *mut _, OCI_HTYPE_TRANS);
        }
    }
}

/// Frees already allocated handles if connection construction fails halfway.
struct HandleGuard<'env> {
    env: &'env Environment,
    handles: Vec<(*mut c_void, u32)>,
    armed: bool,
}

impl<'env> HandleGuard<'env> {
    fn new(env: &'env Environment) -> Self {
        HandleGuard {
            env,
            handles: Vec::new(),
            armed: true,
        }
    }

    fn push(&mut self, handle: *mut c_void, handle_type: u32) {
        self.handles.push((handle, handle_type));
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for HandleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            for &(handle, handle_type) in self.handles.iter().rev() {
                unsafe {
                    self.env
                        .counters()
                        .free_handle(self.env.oci(), handle, handle_type);
                }
            }
        }
    }
}

fn parse_version_banner(banner: &str) -> Option<Version> {
    // Find the first `N.N.N` digit group in the banner.
    let bytes = banner.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let rest = &bytes[i..];
            let major: i32 = atoi::atoi(rest)?;
            let after_major = rest.iter().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
            if rest.get(after_major) == Some(&b'.') {
                let minor_slice = &rest[after_major + 1..];
                if let Some(minor) = atoi::atoi::<i32>(minor_slice) {
                    let after_minor = minor_slice
                        .iter()
                        .position(|b| !b.is_ascii_digit())
                        .unwrap_or(minor_slice.len());
                    let update = if minor_slice.get(after_minor) == Some(&b'.') {
                        atoi::atoi::<i32>(&minor_slice[after_minor + 1..]).unwrap_or(0)
                    } else {
                        0
                    };
                    return Some(Version::new(major, minor, update));
                }
            }
            // Not a dotted group; skip past this digit run.
            i += after_major.max(1);
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::parse_version_banner;
    use crate::oci::Version;

    #[test]
    fn parses_version_triple_out_of_banner() {
        let banner = "Oracle Database 19c Enterprise Edition Release 19.3.0.0.0 - Production";
        assert_eq!(Some(Version::new(19, 3, 0)), parse_version_banner(banner));
    }

    #[test]
    fn parses_first_dotted_group() {
        assert_eq!(
            Some(Version::new(11, 2, 4)),
            parse_version_banner("Release 11.2.4")
        );
        assert_eq!(None, parse_version_banner("no digits here"));
    }
}
