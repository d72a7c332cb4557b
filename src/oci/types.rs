//! Raw types shared with the Oracle client library.
//!
//! Handles and descriptors are opaque to us. We declare them as zero sized types so the pointers
//! to them get their own flavour and cannot be mixed up accidentally.

use std::os::raw::{c_int, c_uchar, c_ushort, c_void};

/// Oracles `sword`. Return type of almost every OCI call.
pub type Sword = c_int;
/// Unsigned byte (`ub1`).
pub type Ub1 = c_uchar;
/// Unsigned 16 bit integer (`ub2`).
pub type Ub2 = c_ushort;
/// Unsigned 32 bit integer (`ub4`).
pub type Ub4 = u32;
/// Unsigned 64 bit integer (`oraub8`). Used by the wide LOB API.
pub type Ub8 = u64;
/// Signed byte (`sb1`).
pub type Sb1 = i8;
/// Signed 16 bit integer (`sb2`). Also the type of NULL indicators (`OCIInd`).
pub type Sb2 = i16;
/// Signed 32 bit integer (`sb4`).
pub type Sb4 = i32;
/// NULL indicator.
pub type OciInd = Sb2;
/// Oracles `OraText`. Byte based even in UTF-16 mode; wide text is cast at the call site.
pub type OraText = c_uchar;
/// Oracles `boolean` (an `int` in disguise).
pub type OciBool = c_int;

// Handle types. One opaque struct each, so `*mut OciStmt` can not be passed where `*mut OciEnv`
// is expected.

#[repr(C)]
pub struct OciEnv {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciError {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciSvcCtx {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciServer {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciSession {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciStmt {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciBindHandle {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDefineHandle {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDescribe {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciTrans {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciCPool {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciSPool {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciAuthInfo {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciSubscriptionHandle {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDirPathCtx {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDirPathColArray {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDirPathStream {
    _private: [u8; 0],
}

// Descriptor types.

#[repr(C)]
pub struct OciParam {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciLobLocator {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciDateTime {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciIntervalDesc {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciRowid {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciType {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciColl {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciIter {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciRefDesc {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciRaw {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciString {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciAqEnqOptions {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciAqDeqOptions {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciAqMsgProperties {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciAqAgent {
    _private: [u8; 0],
}
#[repr(C)]
pub struct OciVectorDesc {
    _private: [u8; 0],
}

/// Oracle `DATE` in its 7 byte client side representation (`OCIDate`). Unlike the descriptor
/// based datetime types this one has a public layout.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct OciDate {
    pub year: Sb2,
    pub month: Ub1,
    pub day: Ub1,
    pub hour: Ub1,
    pub minute: Ub1,
    pub second: Ub1,
}

/// Oracle `NUMBER` in its 22 byte wire representation (`OCINumber`).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OciNumber {
    pub bytes: [u8; 22],
}

impl Default for OciNumber {
    fn default() -> Self {
        // Zero length prefix, i.e. the NULL number.
        OciNumber { bytes: [0; 22] }
    }
}

/// `XID` as defined by the X/Open transaction standard. Identifies a global transaction branch.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Xid {
    pub format_id: i64,
    pub gtrid_length: i64,
    pub bqual_length: i64,
    pub data: [u8; 128],
}

impl Default for Xid {
    fn default() -> Self {
        Xid {
            format_id: 0,
            gtrid_length: 0,
            bqual_length: 0,
            data: [0; 128],
        }
    }
}

/// Callback invoked by the client for every piece of a data-at-execute (IN) bind.
pub type OciCallbackInBind = unsafe extern "C" fn(
    ictxp: *mut c_void,
    bindp: *mut OciBindHandle,
    iter: Ub4,
    index: Ub4,
    bufpp: *mut *mut c_void,
    alenp: *mut Ub4,
    piecep: *mut Ub1,
    indp: *mut *mut c_void,
) -> Sb4;

/// Callback invoked by the client for every piece of a dynamic (OUT) bind.
pub type OciCallbackOutBind = unsafe extern "C" fn(
    octxp: *mut c_void,
    bindp: *mut OciBindHandle,
    iter: Ub4,
    index: Ub4,
    bufpp: *mut *mut c_void,
    alenp: *mut *mut Ub4,
    piecep: *mut Ub1,
    indp: *mut *mut c_void,
    rcodep: *mut *mut Ub2,
) -> Sb4;

/// Callback invoked by the client for every piece of a dynamically defined column.
pub type OciCallbackDefine = unsafe extern "C" fn(
    octxp: *mut c_void,
    defnp: *mut OciDefineHandle,
    iter: Ub4,
    bufpp: *mut *mut c_void,
    alenpp: *mut *mut Ub4,
    piecep: *mut Ub1,
    indpp: *mut *mut c_void,
    rcodep: *mut *mut Ub2,
) -> Sb4;

/// Callback invoked by the client notification thread when a subscribed event arrives.
pub type OciSubscriptionNotify = unsafe extern "C" fn(
    ctx: *mut c_void,
    subscrhp: *mut OciSubscriptionHandle,
    payload: *mut c_void,
    payload_len: *mut Ub4,
    descriptor: *mut c_void,
    mode: Ub4,
) -> Ub4;

/// Callback invoked on high availability events (node down, failover, ...).
pub type OciHaCallback = unsafe extern "C" fn(evtctx: *mut c_void, eventptr: *mut c_void);
