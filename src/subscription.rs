//! Change notification subscriptions.
//!
//! The client delivers events on its own notification thread, through a dedicated port. The
//! driver parses the change descriptor into an [`Event`] per affected table (and row, if row
//! level detail was requested) and hands it to the registered callback.

use std::ffi::c_void;

use log::warn;

use crate::{
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_CHDES_DBNAME, OCI_ATTR_CHDES_NFYTYPE, OCI_ATTR_CHDES_ROW_CHANGES,
            OCI_ATTR_CHDES_ROW_OPFLAGS, OCI_ATTR_CHDES_ROW_ROWID, OCI_ATTR_CHDES_TABLE_CHANGES,
            OCI_ATTR_CHDES_TABLE_NAME, OCI_ATTR_CHDES_TABLE_OPFLAGS, OCI_ATTR_CHNF_ROWIDS,
            OCI_ATTR_SUBSCR_CALLBACK, OCI_ATTR_SUBSCR_CTX, OCI_ATTR_SUBSCR_NAME,
            OCI_ATTR_SUBSCR_NAMESPACE, OCI_ATTR_SUBSCR_PORTNO, OCI_ATTR_SUBSCR_TIMEOUT,
            OCI_DEFAULT, OCI_DTYPE_CHDES, OCI_DTYPE_ROW_CHDES, OCI_DTYPE_TABLE_CHDES,
            OCI_EVENT_DEREG, OCI_EVENT_OBJCHANGE, OCI_EVENT_SHUTDOWN, OCI_EVENT_SHUTDOWN_ANY,
            OCI_EVENT_STARTUP, OCI_HTYPE_ENV, OCI_HTYPE_SUBSCRIPTION, OCI_OPCODE_ALLROWS,
            OCI_OPCODE_ALTER, OCI_OPCODE_DELETE, OCI_OPCODE_DROP, OCI_OPCODE_INSERT,
            OCI_OPCODE_UPDATE, OCI_SUBSCR_NAMESPACE_DBCHANGE, ORA_SUBSCRIPTION_UTF16_BUG,
        },
        functions::OciEntryPoints,
        types::{OciColl, OciSubscriptionHandle, Ub4},
    },
    text::DbText,
};

/// What a subscription listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    /// Instance wide events: startup, shutdown, deregistration.
    DatabaseEvents,
    /// Object level change notification, with per-row detail (ROWIDs).
    RowChanges,
    /// Object level change notification without row detail.
    ObjectChanges,
}

/// Operation reported by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
    Alter,
    Drop,
    AllRows,
    Startup,
    Shutdown,
    Deregister,
    Other,
}

/// One notification delivered to the callback.
#[derive(Debug, Clone)]
pub struct Event {
    pub operation: ChangeOperation,
    /// Name of the database the event originated from.
    pub database: String,
    /// Affected object (`SCHEMA.TABLE`), empty for instance wide events.
    pub object: String,
    /// ROWID of the affected row, when the subscription asked for row detail.
    pub rowid: Option<String>,
}

/// Callback receiving events on the client's notification thread.
pub type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Credentials the notification machinery may use to re-establish its registration if the
/// originating connection goes away.
#[derive(Clone)]
pub struct ReconnectCredentials {
    pub db: String,
    pub user: String,
    pub password: String,
}

struct SubscriptionState {
    name: String,
    kind: SubscriptionKind,
    callback: EventCallback,
    /// Kept so the notification thread can log who to reconnect as; the password never leaves
    /// this struct.
    reconnect: Option<ReconnectCredentials>,
    oci: *const OciEntryPoints,
    envhp: *mut crate::oci::types::OciEnv,
    errhp: *mut crate::oci::types::OciError,
}

// The state is only touched from the notification thread after registration.
unsafe impl Send for SubscriptionState {}
unsafe impl Sync for SubscriptionState {}

/// A registered change notification subscription. Unregistered when dropped.
pub struct Subscription<'conn, 'env> {
    conn: &'conn Connection<'env>,
    subhp: *mut OciSubscriptionHandle,
    name: String,
    /// Callback context handed to the client; must stay at a stable address.
    state: Box<SubscriptionState>,
}

impl<'conn, 'env> Subscription<'conn, 'env> {
    /// Registers a subscription named `name`. `port` selects the local notification port (zero
    /// lets the client pick), `timeout_seconds` limits the registration lifetime (zero means
    /// unlimited).
    ///
    /// The connection's environment must have been created with `events` mode.
    pub fn register(
        conn: &'conn Connection<'env>,
        name: &str,
        kind: SubscriptionKind,
        port: u32,
        timeout_seconds: u32,
        callback: EventCallback,
        reconnect: Option<ReconnectCredentials>,
    ) -> Result<Self, Error> {
        conn.ensure_usable("subscribe")?;
        let env = conn.environment();
        let oci = env.oci();
        if oci.subscription_register.is_none() || !env.mode().events {
            let error = Error::NotAvailable {
                feature: Feature::Subscriptions,
            };
            env.raise(&error, SourceKind::Subscription, name, None, "subscribe");
            return Err(error);
        }

        let subhp = env.counters().alloc_handle(
            oci,
            env.env_ptr() as *const c_void,
            OCI_HTYPE_SUBSCRIPTION,
        )? as *mut OciSubscriptionHandle;

        let state = Box::new(SubscriptionState {
            name: name.to_string(),
            kind,
            callback,
            reconnect,
            oci: oci as *const OciEntryPoints,
            envhp: env.env_ptr(),
            errhp: conn.err_ptr(),
        });

        let subscription = Subscription {
            conn,
            subhp,
            name: name.to_string(),
            state,
        };
        match subscription.configure(port, timeout_seconds) {
            Ok(()) => Ok(subscription),
            Err(error) if error.oracle_code() == ORA_SUBSCRIPTION_UTF16_BUG => {
                // ORA-24915 is a client defect in UTF-16 registrations; the registration is in
                // fact functional. Suppressed as the original library does, but made visible.
                warn!(
                    "Suppressing ORA-24915 while registering subscription '{name}'; \
                     the registration is expected to work regardless"
                );
                Ok(subscription)
            }
            Err(error) => Err(error),
        }
    }

    fn configure(&self, port: u32, timeout_seconds: u32) -> Result<(), Error> {
        let env = self.conn.environment();
        let oci = env.oci();
        let errhp = self.conn.err_ptr();

        if port != 0 {
            let mut port_value = port;
            let status = unsafe {
                (oci.attr_set)(
                    env.env_ptr() as *mut c_void,
                    OCI_HTYPE_ENV,
                    &mut port_value as *mut u32 as *mut c_void,
                    std::mem::size_of::<u32>() as u32,
                    OCI_ATTR_SUBSCR_PORTNO,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(port)", "subscribe")?;
        }

        let name_text = DbText::new(&self.name);
        let status = unsafe {
            (oci.attr_set)(
                self.subhp as *mut c_void,
                OCI_HTYPE_SUBSCRIPTION,
                name_text.ptr() as *mut c_void,
                name_text.len_bytes() as u32,
                OCI_ATTR_SUBSCR_NAME,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(subscription name)", "subscribe")?;

        let mut namespace = OCI_SUBSCR_NAMESPACE_DBCHANGE;
        let status = unsafe {
            (oci.attr_set)(
                self.subhp as *mut c_void,
                OCI_HTYPE_SUBSCRIPTION,
                &mut namespace as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                OCI_ATTR_SUBSCR_NAMESPACE,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(namespace)", "subscribe")?;

        let callback: crate::oci::types::OciSubscriptionNotify = notify_callback;
        let callback_ptr = callback as *mut c_void;
        let status = unsafe {
            (oci.attr_set)(
                self.subhp as *mut c_void,
                OCI_HTYPE_SUBSCRIPTION,
                callback_ptr,
                0,
                OCI_ATTR_SUBSCR_CALLBACK,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(callback)", "subscribe")?;

        let context_ptr = &*self.state as *const SubscriptionState as *mut c_void;
        let status = unsafe {
            (oci.attr_set)(
                self.subhp as *mut c_void,
                OCI_HTYPE_SUBSCRIPTION,
                context_ptr,
                0,
                OCI_ATTR_SUBSCR_CTX,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(callback context)", "subscribe")?;

        if self.state.kind == SubscriptionKind::RowChanges {
            let mut qos = OCI_ATTR_CHNF_ROWIDS_VALUE;
            let status = unsafe {
                (oci.attr_set)(
                    self.subhp as *mut c_void,
                    OCI_HTYPE_SUBSCRIPTION,
                    &mut qos as *mut Ub4 as *mut c_void,
                    std::mem::size_of::<Ub4>() as u32,
                    OCI_ATTR_CHNF_ROWIDS,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(rowids)", "subscribe")?;
        }

        if timeout_seconds != 0 {
            let mut timeout = timeout_seconds;
            let status = unsafe {
                (oci.attr_set)(
                    self.subhp as *mut c_void,
                    OCI_HTYPE_SUBSCRIPTION,
                    &mut timeout as *mut u32 as *mut c_void,
                    std::mem::size_of::<u32>() as u32,
                    OCI_ATTR_SUBSCR_TIMEOUT,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(timeout)", "subscribe")?;
        }

        let register = oci.subscription_register.unwrap();
        let mut subhp = self.subhp;
        let status =
            unsafe { register(self.conn.svc_ptr(), &mut subhp, 1, errhp, OCI_DEFAULT) };
        self.resolve(status, "OCISubscriptionRegister", "subscribe")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SubscriptionKind {
        self.state.kind
    }

    /// Credentials available for re-registration after a connection loss, if the application
    /// provided them.
    pub fn reconnect_credentials(&self) -> Option<&ReconnectCredentials> {
        self.state.reconnect.as_ref()
    }

    /// Unregisters the subscription explicitly.
    pub fn unregister(mut self) -> Result<(), Error> {
        self.unregister_internal()
    }

    fn unregister_internal(&mut self) -> Result<(), Error> {
        if self.subhp.is_null() {
            return Ok(());
        }
        let env = self.conn.environment();
        let oci = env.oci();
        let mut outcome = Ok(());
        if let Some(unregister) = oci.subscription_unregister {
            let status = unsafe {
                unregister(self.conn.svc_ptr(), self.subhp, self.conn.err_ptr(), OCI_DEFAULT)
            };
            outcome = self.resolve(status, "OCISubscriptionUnRegister", "unsubscribe");
        }
        unsafe {
            env.counters()
                .free_handle(oci, self.subhp as *mut c_void, OCI_HTYPE_SUBSCRIPTION);
        }
        self.subhp = std::ptr::null_mut();
        outcome
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Subscription,
            &self.name,
            location,
        )
    }
}

impl Drop for Subscription<'_, '_> {
    fn drop(&mut self) {
        if let Err(error) = self.unregister_internal() {
            log::error!("Error unregistering subscription: {error}");
        }
    }
}

/// QOS flag requesting per-row detail in notifications.
const OCI_ATTR_CHNF_ROWIDS_VALUE: Ub4 = 1;

fn operation_from_flags(flags: Ub4) -> ChangeOperation {
    if flags & OCI_OPCODE_ALLROWS != 0 {
        ChangeOperation::AllRows
    } else if flags & OCI_OPCODE_INSERT != 0 {
        ChangeOperation::Insert
    } else if flags & OCI_OPCODE_UPDATE != 0 {
        ChangeOperation::Update
    } else if flags & OCI_OPCODE_DELETE != 0 {
        ChangeOperation::Delete
    } else if flags & OCI_OPCODE_ALTER != 0 {
        ChangeOperation::Alter
    } else if flags & OCI_OPCODE_DROP != 0 {
        ChangeOperation::Drop
    } else {
        ChangeOperation::Other
    }
}

/// Entry point the client notification thread calls for every event.
unsafe extern "C" fn notify_callback(
    ctx: *mut c_void,
    _subscrhp: *mut OciSubscriptionHandle,
    _payload: *mut c_void,
    _payload_len: *mut Ub4,
    descriptor: *mut c_void,
    _mode: Ub4,
) -> Ub4 {
    let state = unsafe { &*(ctx as *const SubscriptionState) };
    let oci = unsafe { &*state.oci };
    if descriptor.is_null() {
        return 0;
    }
    log::debug!("Subscription '{}' received a notification", state.name);

    let database = text_attr(oci, state, descriptor, OCI_DTYPE_CHDES, OCI_ATTR_CHDES_DBNAME)
        .unwrap_or_default();
    let mut event_type: Ub4 = 0;
    unsafe {
        (oci.attr_get)(
            descriptor as *const c_void,
            OCI_DTYPE_CHDES,
            &mut event_type as *mut Ub4 as *mut c_void,
            std::ptr::null_mut(),
            OCI_ATTR_CHDES_NFYTYPE,
            state.errhp,
        );
    }

    match event_type {
        OCI_EVENT_STARTUP | OCI_EVENT_SHUTDOWN | OCI_EVENT_SHUTDOWN_ANY | OCI_EVENT_DEREG => {
            let operation = match event_type {
                OCI_EVENT_STARTUP => ChangeOperation::Startup,
                OCI_EVENT_DEREG => ChangeOperation::Deregister,
                _ => ChangeOperation::Shutdown,
            };
            (state.callback)(&Event {
                operation,
                database,
                object: String::new(),
                rowid: None,
            });
        }
        OCI_EVENT_OBJCHANGE => {
            deliver_table_changes(oci, state, descriptor, &database);
        }
        _ => {
            (state.callback)(&Event {
                operation: ChangeOperation::Other,
                database,
                object: String::new(),
                rowid: None,
            });
        }
    }
    0
}

/// Walks the table (and optionally row) change collections of an object-change descriptor.
fn deliver_table_changes(
    oci: &OciEntryPoints,
    state: &SubscriptionState,
    descriptor: *mut c_void,
    database: &str,
) {
    let Some(tables) = collection_attr(oci, state, descriptor, OCI_DTYPE_CHDES,
        OCI_ATTR_CHDES_TABLE_CHANGES) else { return };
    for table in collection_elements(oci, state, tables) {
        let object = text_attr(oci, state, table, OCI_DTYPE_TABLE_CHDES, OCI_ATTR_CHDES_TABLE_NAME)
            .unwrap_or_default();
        let mut flags: Ub4 = 0;
        unsafe {
            (oci.attr_get)(
                table as *const c_void,
                OCI_DTYPE_TABLE_CHDES,
                &mut flags as *mut Ub4 as *mut c_void,
                std::ptr::null_mut(),
                OCI_ATTR_CHDES_TABLE_OPFLAGS,
                state.errhp,
            );
        }

        let rows = if state.kind == SubscriptionKind::RowChanges {
            collection_attr(oci, state, table, OCI_DTYPE_TABLE_CHDES, OCI_ATTR_CHDES_ROW_CHANGES)
        } else {
            None
        };
        match rows {
            Some(rows) => {
                for row in collection_elements(oci, state, rows) {
                    let rowid = text_attr(
                        oci,
                        state,
                        row,
                        OCI_DTYPE_ROW_CHDES,
                        OCI_ATTR_CHDES_ROW_ROWID,
                    );
                    let mut row_flags: Ub4 = 0;
                    unsafe {
                        (oci.attr_get)(
                            row as *const c_void,
                            OCI_DTYPE_ROW_CHDES,
                            &mut row_flags as *mut Ub4 as *mut c_void,
                            std::ptr::null_mut(),
                            OCI_ATTR_CHDES_ROW_OPFLAGS,
                            state.errhp,
                        );
                    }
                    (state.callback)(&Event {
                        operation: operation_from_flags(row_flags),
                        database: database.to_string(),
                        object: object.clone(),
                        rowid,
                    });
                }
            }
            None => {
                (state.callback)(&Event {
                    operation: operation_from_flags(flags),
                    database: database.to_string(),
                    object,
                    rowid: None,
                });
            }
        }
    }
}

fn text_attr(
    oci: &OciEntryPoints,
    state: &SubscriptionState,
    descriptor: *mut c_void,
    descriptor_type: Ub4,
    attribute: Ub4,
) -> Option<String> {
    let mut text_ptr: *mut crate::text::DbChar = std::ptr::null_mut();
    let mut text_len: Ub4 = 0;
    let status = unsafe {
        (oci.attr_get)(
            descriptor as *const c_void,
            descriptor_type,
            &mut text_ptr as *mut *mut crate::text::DbChar as *mut c_void,
            &mut text_len,
            attribute,
            state.errhp,
        )
    };
    if status != crate::oci::constants::OCI_SUCCESS || text_ptr.is_null() {
        return None;
    }
    let units = text_len as usize / std::mem::size_of::<crate::text::DbChar>();
    let slice = unsafe { std::slice::from_raw_parts(text_ptr, units) };
    Some(crate::text::slice_to_cow_utf8(slice).into_owned())
}

fn collection_attr(
    oci: &OciEntryPoints,
    state: &SubscriptionState,
    descriptor: *mut c_void,
    descriptor_type: Ub4,
    attribute: Ub4,
) -> Option<*mut OciColl> {
    let mut coll: *mut OciColl = std::ptr::null_mut();
    let status = unsafe {
        (oci.attr_get)(
            descriptor as *const c_void,
            descriptor_type,
            &mut coll as *mut *mut OciColl as *mut c_void,
            std::ptr::null_mut(),
            attribute,
            state.errhp,
        )
    };
    if status != crate::oci::constants::OCI_SUCCESS || coll.is_null() {
        return None;
    }
    Some(coll)
}

fn collection_elements(
    oci: &OciEntryPoints,
    state: &SubscriptionState,
    coll: *mut OciColl,
) -> Vec<*mut c_void> {
    let mut size: i32 = 0;
    let status = unsafe { (oci.coll_size)(state.envhp, state.errhp, coll, &mut size) };
    if status != crate::oci::constants::OCI_SUCCESS {
        return Vec::new();
    }
    let mut elements = Vec::with_capacity(size.max(0) as usize);
    for index in 0..size.max(0) {
        let mut exists: i32 = 0;
        let mut elem: *mut c_void = std::ptr::null_mut();
        let mut elem_ind: *mut c_void = std::ptr::null_mut();
        let status = unsafe {
            (oci.coll_get_item)(
                state.envhp,
                state.errhp,
                coll,
                index,
                &mut exists,
                &mut elem,
                &mut elem_ind,
            )
        };
        if status == crate::oci::constants::OCI_SUCCESS && exists != 0 && !elem.is_null() {
            // Change collections hold descriptor pointers; the element is a pointer to one.
            elements.push(unsafe { *(elem as *mut *mut c_void) });
        }
    }
    elements
}
