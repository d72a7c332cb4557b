//! Advanced Queuing: message properties, enqueue and dequeue.

use std::{ffi::c_void, ptr::null_mut};

use log::debug;

use crate::{
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_AGENT_ADDRESS, OCI_ATTR_AGENT_NAME, OCI_ATTR_CONSUMER_NAME,
            OCI_ATTR_CORRELATION, OCI_ATTR_DEQ_MODE, OCI_ATTR_ENQ_TIME, OCI_ATTR_EXCEPTION_QUEUE,
            OCI_ATTR_EXPIRATION, OCI_ATTR_MSG_STATE, OCI_ATTR_NAVIGATION, OCI_ATTR_PRIORITY,
            OCI_ATTR_VISIBILITY, OCI_ATTR_WAIT, OCI_DEQ_BROWSE, OCI_DEQ_FIRST_MSG,
            OCI_DEQ_LOCKED, OCI_DEQ_NEXT_MSG, OCI_DEQ_NO_WAIT, OCI_DEQ_REMOVE,
            OCI_DEQ_WAIT_FOREVER, OCI_DTYPE_AQAGENT, OCI_DTYPE_AQDEQ_OPTIONS,
            OCI_DTYPE_AQENQ_OPTIONS, OCI_DTYPE_AQMSG_PROPERTIES, OCI_ENQ_IMMEDIATE,
            OCI_ENQ_ON_COMMIT, OCI_MSG_EXPIRED, OCI_MSG_PROCESSED, OCI_MSG_READY,
            OCI_MSG_WAITING, ORA_AQ_DEQUEUE_TIMEOUT,
        },
        types::{
            OciAqAgent, OciAqDeqOptions, OciAqEnqOptions, OciAqMsgProperties, OciDate, OciInd,
            OciRaw, Sb4, Ub4,
        },
    },
    text::DbText,
    types::date::Date,
};

/// An AQ agent: a named endpoint messages can be addressed to or received from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub address: String,
}

/// Delivery visibility of enqueue and dequeue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// The operation is part of the current transaction.
    #[default]
    OnCommit,
    /// The operation is its own transaction.
    Immediate,
}

impl Visibility {
    fn code(self) -> Ub4 {
        match self {
            Visibility::OnCommit => OCI_ENQ_ON_COMMIT,
            Visibility::Immediate => OCI_ENQ_IMMEDIATE,
        }
    }
}

/// Which message a dequeue targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Retrieve the first message matching the search criteria, refreshing the snapshot.
    FirstMessage,
    /// Retrieve the next message in the current snapshot.
    #[default]
    NextMessage,
}

impl Navigation {
    fn code(self) -> Ub4 {
        match self {
            Navigation::FirstMessage => OCI_DEQ_FIRST_MSG,
            Navigation::NextMessage => OCI_DEQ_NEXT_MSG,
        }
    }
}

/// What a dequeue does with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DequeueMode {
    /// Read without locking or removing.
    Browse,
    /// Read and lock until the transaction ends.
    Locked,
    /// Read and consume.
    #[default]
    Remove,
}

impl DequeueMode {
    fn code(self) -> Ub4 {
        match self {
            DequeueMode::Browse => OCI_DEQ_BROWSE,
            DequeueMode::Locked => OCI_DEQ_LOCKED,
            DequeueMode::Remove => OCI_DEQ_REMOVE,
        }
    }
}

/// How long a dequeue waits for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wait {
    /// Return immediately; an empty queue yields `Ok(None)`.
    NoWait,
    /// Block until a message arrives.
    #[default]
    Forever,
    /// Block up to this many seconds, then report [`Error::QueueTimeout`].
    Seconds(u32),
}

impl Wait {
    fn code(self) -> Sb4 {
        match self {
            Wait::NoWait => OCI_DEQ_NO_WAIT,
            Wait::Forever => OCI_DEQ_WAIT_FOREVER,
            Wait::Seconds(seconds) => seconds as Sb4,
        }
    }
}

/// Delivery state of a dequeued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Ready,
    Waiting,
    Processed,
    Expired,
    Unknown,
}

impl MessageState {
    fn from_code(code: Ub4) -> Self {
        match code {
            OCI_MSG_READY => MessageState::Ready,
            OCI_MSG_WAITING => MessageState::Waiting,
            OCI_MSG_PROCESSED => MessageState::Processed,
            OCI_MSG_EXPIRED => MessageState::Expired,
            _ => MessageState::Unknown,
        }
    }
}

/// A queue message: a raw payload plus its properties descriptor.
pub struct Message<'conn, 'env> {
    conn: &'conn Connection<'env>,
    properties: *mut OciAqMsgProperties,
    payload: Vec<u8>,
    /// Message id assigned by the server at enqueue, or carried by a dequeued message.
    id: Option<Vec<u8>>,
}

impl<'conn, 'env> Message<'conn, 'env> {
    pub fn new(conn: &'conn Connection<'env>) -> Result<Self, Error> {
        conn.ensure_usable("message")?;
        let env = conn.environment();
        let properties = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_AQMSG_PROPERTIES,
        )? as *mut OciAqMsgProperties;
        Ok(Message {
            conn,
            properties,
            payload: Vec::new(),
            id: None,
        })
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.payload = payload.to_vec();
        self.id = None;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Id the server assigned to the message, available after enqueue or dequeue.
    pub fn id(&self) -> Option<&[u8]> {
        self.id.as_deref()
    }

    pub fn set_correlation(&mut self, correlation: &str) -> Result<(), Error> {
        self.set_text_property(OCI_ATTR_CORRELATION, correlation, "set_correlation")
    }

    pub fn correlation(&self) -> Result<String, Error> {
        self.text_property(OCI_ATTR_CORRELATION, "correlation")
    }

    /// Queue the message moves to when it cannot be delivered.
    pub fn set_exception_queue(&mut self, queue: &str) -> Result<(), Error> {
        self.set_text_property(OCI_ATTR_EXCEPTION_QUEUE, queue, "set_exception_queue")
    }

    pub fn exception_queue(&self) -> Result<String, Error> {
        self.text_property(OCI_ATTR_EXCEPTION_QUEUE, "exception_queue")
    }

    pub fn set_priority(&mut self, priority: i32) -> Result<(), Error> {
        let mut value = priority;
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.properties as *mut c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                &mut value as *mut i32 as *mut c_void,
                std::mem::size_of::<i32>() as u32,
                OCI_ATTR_PRIORITY,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(priority)", "set_priority")
    }

    /// Seconds the message stays available before moving to the exception queue; `None` means
    /// it never expires.
    pub fn set_expiration(&mut self, seconds: Option<u32>) -> Result<(), Error> {
        let mut value: Sb4 = seconds.map(|s| s as Sb4).unwrap_or(-1);
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.properties as *mut c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                &mut value as *mut Sb4 as *mut c_void,
                std::mem::size_of::<Sb4>() as u32,
                OCI_ATTR_EXPIRATION,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(expiration)", "set_expiration")
    }

    /// Agent the message claims as its sender.
    pub fn set_sender(&mut self, agent: &Agent) -> Result<(), Error> {
        let env = self.conn.environment();
        let agenthp = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_AQAGENT,
        )? as *mut OciAqAgent;
        let outcome = (|| {
            let name = DbText::new(&agent.name);
            let status = unsafe {
                (env.oci().attr_set)(
                    agenthp as *mut c_void,
                    OCI_DTYPE_AQAGENT,
                    name.ptr() as *mut c_void,
                    name.len_bytes() as u32,
                    OCI_ATTR_AGENT_NAME,
                    self.conn.err_ptr(),
                )
            };
            self.resolve(status, "OCIAttrSet(agent name)", "set_sender")?;
            let address = DbText::new(&agent.address);
            let status = unsafe {
                (env.oci().attr_set)(
                    agenthp as *mut c_void,
                    OCI_DTYPE_AQAGENT,
                    address.ptr() as *mut c_void,
                    address.len_bytes() as u32,
                    OCI_ATTR_AGENT_ADDRESS,
                    self.conn.err_ptr(),
                )
            };
            self.resolve(status, "OCIAttrSet(agent address)", "set_sender")?;
            let status = unsafe {
                (env.oci().attr_set)(
                    self.properties as *mut c_void,
                    OCI_DTYPE_AQMSG_PROPERTIES,
                    agenthp as *mut c_void,
                    0,
                    OCI_ATTR_SENDER_ID,
                    self.conn.err_ptr(),
                )
            };
            self.resolve(status, "OCIAttrSet(sender)", "set_sender")
        })();
        unsafe {
            env.counters()
                .free_descriptor(env.oci(), agenthp as *mut c_void, OCI_DTYPE_AQAGENT);
        }
        outcome
    }

    /// Server time the message was enqueued at; available on dequeued messages.
    pub fn enqueue_time(&self) -> Result<Date<'conn, 'env>, Error> {
        let mut raw = OciDate::default();
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.properties as *const c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                &mut raw as *mut OciDate as *mut c_void,
                null_mut(),
                OCI_ATTR_ENQ_TIME,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(enqueue time)", "enqueue_time")?;
        Ok(Date::from_raw(self.conn, raw))
    }

    pub fn state(&self) -> Result<MessageState, Error> {
        let mut code: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.properties as *const c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                &mut code as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_MSG_STATE,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(message state)", "state")?;
        Ok(MessageState::from_code(code))
    }

    fn set_text_property(
        &mut self,
        attribute: Ub4,
        value: &str,
        location: &'static str,
    ) -> Result<(), Error> {
        let text = DbText::new(value);
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.properties as *mut c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                text.ptr() as *mut c_void,
                text.len_bytes() as u32,
                attribute,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(message property)", location)
    }

    fn text_property(&self, attribute: Ub4, location: &'static str) -> Result<String, Error> {
        let mut text_ptr: *mut crate::text::DbChar = null_mut();
        let mut text_len: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.properties as *const c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
                &mut text_ptr as *mut *mut crate::text::DbChar as *mut c_void,
                &mut text_len,
                attribute,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(message property)", location)?;
        if text_ptr.is_null() {
            return Ok(String::new());
        }
        let units = text_len as usize / std::mem::size_of::<crate::text::DbChar>();
        let slice = unsafe { std::slice::from_raw_parts(text_ptr, units) };
        Ok(crate::text::slice_to_cow_utf8(slice).into_owned())
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Message,
            "message",
            location,
        )
    }
}

impl Drop for Message<'_, '_> {
    fn drop(&mut self) {
        let env = self.conn.environment();
        unsafe {
            env.counters().free_descriptor(
                env.oci(),
                self.properties as *mut c_void,
                OCI_DTYPE_AQMSG_PROPERTIES,
            );
        }
    }
}

/// Sender agent attribute of the message properties descriptor.
const OCI_ATTR_SENDER_ID: Ub4 = 68;

/// Producer side of a queue.
pub struct Enqueue<'conn, 'env> {
    conn: &'conn Connection<'env>,
    queue: String,
    options: *mut OciAqEnqOptions,
}

impl<'conn, 'env> Enqueue<'conn, 'env> {
    pub fn new(conn: &'conn Connection<'env>, queue: &str) -> Result<Self, Error> {
        require_aq(conn)?;
        let env = conn.environment();
        let options = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_AQENQ_OPTIONS,
        )? as *mut OciAqEnqOptions;
        Ok(Enqueue {
            conn,
            queue: queue.to_string(),
            options,
        })
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> Result<(), Error> {
        let mut code = visibility.code();
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.options as *mut c_void,
                OCI_DTYPE_AQENQ_OPTIONS,
                &mut code as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                OCI_ATTR_VISIBILITY,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(visibility)", "set_visibility")
    }

    /// Puts `message` onto the queue and records the id the server assigned into it.
    pub fn put(&self, message: &mut Message<'_, '_>) -> Result<(), Error> {
        let env = self.conn.environment();
        let oci = env.oci();
        let enq = oci.aq_enq.expect("checked at construction");

        // Raw payloads travel as the predefined SYS.RAW type.
        let raw_tdo = crate::type_info::resolve_tdo(self.conn, "SYS", "RAW")?;
        let mut raw: *mut OciRaw = null_mut();
        let status = unsafe {
            (oci.raw_assign_bytes)(
                env.env_ptr(),
                self.conn.err_ptr(),
                message.payload.as_ptr(),
                message.payload.len() as Ub4,
                &mut raw,
            )
        };
        self.resolve(status, "OCIRawAssignBytes", "enqueue")?;

        let mut payload = raw as *mut c_void;
        let mut indicator: OciInd = 0;
        let mut indicator_ptr = &mut indicator as *mut OciInd as *mut c_void;
        let mut message_id: *mut OciRaw = null_mut();
        let queue_text = DbText::new(&self.queue);
        let status = unsafe {
            enq(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                queue_text.ptr(),
                self.options,
                message.properties,
                raw_tdo,
                &mut payload,
                &mut indicator_ptr,
                &mut message_id,
                0,
            )
        };
        self.resolve(status, "OCIAQEnq", "enqueue")?;
        message.id = read_raw(self.conn, message_id);
        Ok(())
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Enqueue,
            &self.queue,
            location,
        )
    }
}

impl Drop for Enqueue<'_, '_> {
    fn drop(&mut self) {
        let env = self.conn.environment();
        unsafe {
            env.counters().free_descriptor(
                env.oci(),
                self.options as *mut c_void,
                OCI_DTYPE_AQENQ_OPTIONS,
            );
        }
    }
}

/// Consumer side of a queue.
pub struct Dequeue<'conn, 'env> {
    conn: &'conn Connection<'env>,
    queue: String,
    options: *mut OciAqDeqOptions,
    wait: Wait,
}

impl<'conn, 'env> Dequeue<'conn, 'env> {
    pub fn new(conn: &'conn Connection<'env>, queue: &str) -> Result<Self, Error> {
        require_aq(conn)?;
        let env = conn.environment();
        let options = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_AQDEQ_OPTIONS,
        )? as *mut OciAqDeqOptions;
        Ok(Dequeue {
            conn,
            queue: queue.to_string(),
            options,
            wait: Wait::default(),
        })
    }

    /// Consumer name, required for multi-consumer queues.
    pub fn set_consumer(&mut self, consumer: &str) -> Result<(), Error> {
        let text = DbText::new(consumer);
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.options as *mut c_void,
                OCI_DTYPE_AQDEQ_OPTIONS,
                text.ptr() as *mut c_void,
                text.len_bytes() as u32,
                OCI_ATTR_CONSUMER_NAME,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(consumer)", "set_consumer")
    }

    pub fn set_navigation(&mut self, navigation: Navigation) -> Result<(), Error> {
        self.set_u32_option(OCI_ATTR_NAVIGATION, navigation.code(), "set_navigation")
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> Result<(), Error> {
        self.set_u32_option(OCI_ATTR_VISIBILITY, visibility.code(), "set_visibility")
    }

    pub fn set_mode(&mut self, mode: DequeueMode) -> Result<(), Error> {
        self.set_u32_option(OCI_ATTR_DEQ_MODE, mode.code(), "set_mode")
    }

    pub fn set_wait(&mut self, wait: Wait) -> Result<(), Error> {
        self.wait = wait;
        let mut code = wait.code();
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.options as *mut c_void,
                OCI_DTYPE_AQDEQ_OPTIONS,
                &mut code as *mut Sb4 as *mut c_void,
                std::mem::size_of::<Sb4>() as u32,
                OCI_ATTR_WAIT,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(wait)", "set_wait")
    }

    /// Takes the next message off the queue.
    ///
    /// Under [`Wait::NoWait`] an empty queue yields `Ok(None)`; under a finite wait the timeout
    /// surfaces as [`Error::QueueTimeout`].
    pub fn get(&self) -> Result<Option<Message<'conn, 'env>>, Error> {
        let env = self.conn.environment();
        let oci = env.oci();
        let deq = oci.aq_deq.expect("checked at construction");

        let raw_tdo = crate::type_info::resolve_tdo(self.conn, "SYS", "RAW")?;
        let message = Message::new(self.conn)?;
        let mut payload: *mut c_void = null_mut();
        let mut indicator: OciInd = 0;
        let mut indicator_ptr = &mut indicator as *mut OciInd as *mut c_void;
        let mut message_id: *mut OciRaw = null_mut();
        let queue_text = DbText::new(&self.queue);
        let status = unsafe {
            deq(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                queue_text.ptr(),
                self.options,
                message.properties,
                raw_tdo,
                &mut payload,
                &mut indicator_ptr,
                &mut message_id,
                0,
            )
        };
        match status.into_oci_result("OCIAQDeq").into_result(oci, self.conn.err_ptr()) {
            Ok(()) => (),
            Err(error) => {
                if error.oracle_code() == ORA_AQ_DEQUEUE_TIMEOUT {
                    if self.wait == Wait::NoWait {
                        // A configured no-wait dequeue hitting an empty queue is a normal
                        // outcome, not an error.
                        debug!("No message available on queue '{}'", self.queue);
                        return Ok(None);
                    }
                    let error = Error::QueueTimeout;
                    env.raise(&error, SourceKind::Dequeue, &self.queue, None, "dequeue");
                    return Err(error);
                }
                let error = self.conn.translate_oracle_code(error);
                env.raise(&error, SourceKind::Dequeue, &self.queue, None, "dequeue");
                return Err(error);
            }
        }

        let mut message = message;
        let raw = payload as *mut OciRaw;
        if !raw.is_null() && indicator != crate::oci::constants::OCI_IND_NULL {
            message.payload = read_raw(self.conn, raw).unwrap_or_default();
        }
        message.id = read_raw(self.conn, message_id);
        Ok(Some(message))
    }

    fn set_u32_option(
        &mut self,
        attribute: Ub4,
        mut code: Ub4,
        location: &'static str,
    ) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.options as *mut c_void,
                OCI_DTYPE_AQDEQ_OPTIONS,
                &mut code as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                attribute,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(dequeue option)", location)
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Dequeue,
            &self.queue,
            location,
        )
    }
}

impl Drop for Dequeue<'_, '_> {
    fn drop(&mut self) {
        let env = self.conn.environment();
        unsafe {
            env.counters().free_descriptor(
                env.oci(),
                self.options as *mut c_void,
                OCI_DTYPE_AQDEQ_OPTIONS,
            );
        }
    }
}

fn require_aq(conn: &Connection<'_>) -> Result<(), Error> {
    conn.ensure_usable("queue")?;
    let oci = conn.environment().oci();
    if oci.aq_enq.is_none() || oci.aq_deq.is_none() {
        let error = Error::NotAvailable {
            feature: Feature::AdvancedQueuing,
        };
        conn.environment()
            .raise(&error, SourceKind::Enqueue, "queue", None, "queue");
        return Err(error);
    }
    Ok(())
}

/// Copies an `OCIRaw` value into driver memory.
fn read_raw(conn: &Connection<'_>, raw: *mut OciRaw) -> Option<Vec<u8>> {
    if raw.is_null() {
        return None;
    }
    let env = conn.environment();
    let oci = env.oci();
    let ptr = unsafe { (oci.raw_ptr)(env.env_ptr(), raw) };
    let len = unsafe { (oci.raw_size)(env.env_ptr(), raw) } as usize;
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
}
