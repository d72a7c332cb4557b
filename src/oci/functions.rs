//! The dynamically loaded entry point table.
//!
//! The Oracle client exports a few hundred functions; this table declares typed pointers for the
//! ones the crate calls. Every pointer is resolved by its ANSI name at environment
//! initialization. A symbol missing from an old client downgrades a capability instead of
//! failing the load; callers observe [`crate::Error::NotAvailable`] when they reach for the
//! corresponding feature.

#![allow(clippy::type_complexity)]

use std::{ffi::c_void, path::Path};

use libloading::Library;
use log::{debug, info};

use super::{
    types::{
        OciAqAgent, OciAqDeqOptions, OciAqEnqOptions, OciAqMsgProperties, OciAuthInfo,
        OciBindHandle, OciBool, OciCPool, OciCallbackDefine, OciCallbackInBind,
        OciCallbackOutBind, OciColl, OciDate, OciDateTime, OciDefineHandle, OciDescribe,
        OciDirPathColArray, OciDirPathCtx, OciDirPathStream, OciEnv, OciError, OciIntervalDesc,
        OciIter, OciLobLocator, OciNumber, OciRaw, OciRefDesc, OciSPool, OciServer, OciSession,
        OciStmt, OciString, OciSubscriptionHandle, OciSvcCtx, OciType, OciVectorDesc, OraText,
        Sb1, Sb2, Sb4, Sword, Ub1, Ub2, Ub4, Ub8,
    },
    Version,
};

// Entry point signatures, named after the Oracle functions they describe.

pub type OciEnvNlsCreateFn = unsafe extern "C" fn(
    envhpp: *mut *mut OciEnv,
    mode: Ub4,
    ctxp: *mut c_void,
    malocfp: Option<unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void>,
    ralocfp: Option<unsafe extern "C" fn(*mut c_void, *mut c_void, usize) -> *mut c_void>,
    mfreefp: Option<unsafe extern "C" fn(*mut c_void, *mut c_void)>,
    xtramem_sz: usize,
    usrmempp: *mut *mut c_void,
    charset: Ub2,
    ncharset: Ub2,
) -> Sword;
pub type OciHandleAllocFn = unsafe extern "C" fn(
    parenth: *const c_void,
    hndlpp: *mut *mut c_void,
    htype: Ub4,
    xtramem_sz: usize,
    usrmempp: *mut *mut c_void,
) -> Sword;
pub type OciHandleFreeFn = unsafe extern "C" fn(hndlp: *mut c_void, htype: Ub4) -> Sword;
pub type OciDescriptorAllocFn = unsafe extern "C" fn(
    parenth: *const c_void,
    descpp: *mut *mut c_void,
    dtype: Ub4,
    xtramem_sz: usize,
    usrmempp: *mut *mut c_void,
) -> Sword;
pub type OciDescriptorFreeFn = unsafe extern "C" fn(descp: *mut c_void, dtype: Ub4) -> Sword;
pub type OciArrayDescriptorAllocFn = unsafe extern "C" fn(
    parenth: *const c_void,
    descpp: *mut *mut c_void,
    dtype: Ub4,
    array_size: Ub4,
    xtramem_sz: usize,
    usrmempp: *mut *mut c_void,
) -> Sword;
pub type OciArrayDescriptorFreeFn =
    unsafe extern "C" fn(descp: *mut *mut c_void, dtype: Ub4) -> Sword;
pub type OciAttrGetFn = unsafe extern "C" fn(
    trgthndlp: *const c_void,
    trghndltyp: Ub4,
    attributep: *mut c_void,
    sizep: *mut Ub4,
    attrtype: Ub4,
    errhp: *mut OciError,
) -> Sword;
pub type OciAttrSetFn = unsafe extern "C" fn(
    trgthndlp: *mut c_void,
    trghndltyp: Ub4,
    attributep: *mut c_void,
    size: Ub4,
    attrtype: Ub4,
    errhp: *mut OciError,
) -> Sword;
pub type OciParamGetFn = unsafe extern "C" fn(
    hndlp: *const c_void,
    htype: Ub4,
    errhp: *mut OciError,
    parmdpp: *mut *mut c_void,
    pos: Ub4,
) -> Sword;
pub type OciErrorGetFn = unsafe extern "C" fn(
    hndlp: *mut c_void,
    recordno: Ub4,
    sqlstate: *mut OraText,
    errcodep: *mut Sb4,
    bufp: *mut OraText,
    bufsiz: Ub4,
    htype: Ub4,
) -> Sword;
pub type OciClientVersionFn = unsafe extern "C" fn(
    major: *mut Sword,
    minor: *mut Sword,
    update: *mut Sword,
    patch: *mut Sword,
    port_update: *mut Sword,
);
pub type OciServerVersionFn = unsafe extern "C" fn(
    hndlp: *mut c_void,
    errhp: *mut OciError,
    bufp: *mut OraText,
    bufsz: Ub4,
    hndltype: Ub1,
) -> Sword;
pub type OciPingFn =
    unsafe extern "C" fn(svchp: *mut OciSvcCtx, errhp: *mut OciError, mode: Ub4) -> Sword;
pub type OciBreakFn = unsafe extern "C" fn(hndlp: *mut c_void, errhp: *mut OciError) -> Sword;
pub type OciResetFn = unsafe extern "C" fn(hndlp: *mut c_void, errhp: *mut OciError) -> Sword;

pub type OciServerAttachFn = unsafe extern "C" fn(
    srvhp: *mut OciServer,
    errhp: *mut OciError,
    dblink: *const OraText,
    dblink_len: Sb4,
    mode: Ub4,
) -> Sword;
pub type OciServerDetachFn =
    unsafe extern "C" fn(srvhp: *mut OciServer, errhp: *mut OciError, mode: Ub4) -> Sword;
pub type OciSessionBeginFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    usrhp: *mut OciSession,
    credt: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciSessionEndFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    usrhp: *mut OciSession,
    mode: Ub4,
) -> Sword;
pub type OciPasswordChangeFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    user_name: *const OraText,
    usernm_len: Ub4,
    opasswd: *const OraText,
    opasswd_len: Ub4,
    npasswd: *const OraText,
    npasswd_len: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciTransStartFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    timeout: u32,
    flags: Ub4,
) -> Sword;
pub type OciTransEndFn =
    unsafe extern "C" fn(svchp: *mut OciSvcCtx, errhp: *mut OciError, flags: Ub4) -> Sword;

pub type OciConnectionPoolCreateFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    poolhp: *mut OciCPool,
    pool_name: *mut *mut OraText,
    pool_name_len: *mut Sb4,
    dblink: *const OraText,
    dblink_len: Sb4,
    conn_min: Ub4,
    conn_max: Ub4,
    conn_incr: Ub4,
    pool_user: *const OraText,
    pool_user_len: Sb4,
    pool_pass: *const OraText,
    pool_pass_len: Sb4,
    mode: Ub4,
) -> Sword;
pub type OciConnectionPoolDestroyFn =
    unsafe extern "C" fn(poolhp: *mut OciCPool, errhp: *mut OciError, mode: Ub4) -> Sword;
pub type OciSessionPoolCreateFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    spoolhp: *mut OciSPool,
    pool_name: *mut *mut OraText,
    pool_name_len: *mut Ub4,
    conn_str: *const OraText,
    conn_str_len: Ub4,
    sess_min: Ub4,
    sess_max: Ub4,
    sess_incr: Ub4,
    userid: *mut OraText,
    userid_len: Ub4,
    password: *mut OraText,
    password_len: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciSessionPoolDestroyFn =
    unsafe extern "C" fn(spoolhp: *mut OciSPool, errhp: *mut OciError, mode: Ub4) -> Sword;
pub type OciSessionGetFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    svchp: *mut *mut OciSvcCtx,
    authhp: *mut OciAuthInfo,
    pool_name: *mut OraText,
    pool_name_len: Ub4,
    tag_info: *const OraText,
    tag_info_len: Ub4,
    ret_tag_info: *mut *mut OraText,
    ret_tag_info_len: *mut Ub4,
    found: *mut OciBool,
    mode: Ub4,
) -> Sword;
pub type OciSessionReleaseFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    tag: *mut OraText,
    tag_len: Ub4,
    mode: Ub4,
) -> Sword;

pub type OciStmtPrepareFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    stmt: *const OraText,
    stmt_len: Ub4,
    language: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciStmtPrepare2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    stmtp: *mut *mut OciStmt,
    errhp: *mut OciError,
    stmt: *const OraText,
    stmt_len: Ub4,
    key: *const OraText,
    key_len: Ub4,
    language: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciStmtReleaseFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    key: *const OraText,
    key_len: Ub4,
    mode: Ub4,
) -> Sword;
pub type OciStmtExecuteFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    iters: Ub4,
    rowoff: Ub4,
    snap_in: *const c_void,
    snap_out: *mut c_void,
    mode: Ub4,
) -> Sword;
pub type OciStmtFetchFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    nrows: Ub4,
    orientation: Ub2,
    mode: Ub4,
) -> Sword;
pub type OciStmtFetch2Fn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    nrows: Ub4,
    orientation: Ub2,
    fetch_offset: Sb4,
    mode: Ub4,
) -> Sword;
pub type OciStmtGetNextResultFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    result: *mut *mut c_void,
    rtype: *mut Ub4,
    mode: Ub4,
) -> Sword;
pub type OciStmtGetPieceInfoFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    errhp: *mut OciError,
    hndlpp: *mut *mut c_void,
    typep: *mut Ub4,
    in_outp: *mut Ub1,
    iterp: *mut Ub4,
    idxp: *mut Ub4,
    piecep: *mut Ub1,
) -> Sword;
pub type OciStmtSetPieceInfoFn = unsafe extern "C" fn(
    hndlp: *mut c_void,
    htype: Ub4,
    errhp: *mut OciError,
    bufp: *const c_void,
    alenp: *mut Ub4,
    piece: Ub1,
    indp: *const c_void,
    rcodep: *mut Ub2,
) -> Sword;
pub type OciBindByPosFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    bindp: *mut *mut OciBindHandle,
    errhp: *mut OciError,
    position: Ub4,
    valuep: *mut c_void,
    value_sz: Sb4,
    dty: Ub2,
    indp: *mut c_void,
    alenp: *mut Ub2,
    rcodep: *mut Ub2,
    maxarr_len: Ub4,
    curelep: *mut Ub4,
    mode: Ub4,
) -> Sword;
pub type OciBindByNameFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    bindp: *mut *mut OciBindHandle,
    errhp: *mut OciError,
    placeholder: *const OraText,
    placeh_len: Sb4,
    valuep: *mut c_void,
    value_sz: Sb4,
    dty: Ub2,
    indp: *mut c_void,
    alenp: *mut Ub2,
    rcodep: *mut Ub2,
    maxarr_len: Ub4,
    curelep: *mut Ub4,
    mode: Ub4,
) -> Sword;
pub type OciBindDynamicFn = unsafe extern "C" fn(
    bindp: *mut OciBindHandle,
    errhp: *mut OciError,
    ictxp: *mut c_void,
    icbfp: Option<OciCallbackInBind>,
    octxp: *mut c_void,
    ocbfp: Option<OciCallbackOutBind>,
) -> Sword;
pub type OciBindObjectFn = unsafe extern "C" fn(
    bindp: *mut OciBindHandle,
    errhp: *mut OciError,
    otype: *const OciType,
    pgvpp: *mut *mut c_void,
    pvszsp: *mut Ub4,
    indpp: *mut *mut c_void,
    indszp: *mut Ub4,
) -> Sword;
pub type OciDefineByPosFn = unsafe extern "C" fn(
    stmtp: *mut OciStmt,
    defnp: *mut *mut OciDefineHandle,
    errhp: *mut OciError,
    position: Ub4,
    valuep: *mut c_void,
    value_sz: Sb4,
    dty: Ub2,
    indp: *mut c_void,
    rlenp: *mut Ub2,
    rcodep: *mut Ub2,
    mode: Ub4,
) -> Sword;
pub type OciDefineDynamicFn = unsafe extern "C" fn(
    defnp: *mut OciDefineHandle,
    errhp: *mut OciError,
    octxp: *mut c_void,
    ocbfp: Option<OciCallbackDefine>,
) -> Sword;
pub type OciDefineObjectFn = unsafe extern "C" fn(
    defnp: *mut OciDefineHandle,
    errhp: *mut OciError,
    otype: *const OciType,
    pgvpp: *mut *mut c_void,
    pvszsp: *mut Ub4,
    indpp: *mut *mut c_void,
    indszp: *mut Ub4,
) -> Sword;
pub type OciDescribeAnyFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    objptr: *mut c_void,
    objnm_len: Ub4,
    objptr_typ: Ub1,
    info_level: Ub1,
    objtyp: Ub1,
    dschp: *mut OciDescribe,
) -> Sword;

pub type OciLobCreateTemporaryFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    csid: Ub2,
    csfrm: Ub1,
    lobtype: Ub1,
    cache: OciBool,
    duration: Ub2,
) -> Sword;
pub type OciLobHandleFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
) -> Sword;
pub type OciLobIsTemporaryFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    is_temporary: *mut OciBool,
) -> Sword;
pub type OciLobReadFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    amtp: *mut Ub4,
    offset: Ub4,
    bufp: *mut c_void,
    bufl: Ub4,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobRead2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    byte_amtp: *mut Ub8,
    char_amtp: *mut Ub8,
    offset: Ub8,
    bufp: *mut c_void,
    bufl: Ub8,
    piece: Ub1,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobWriteFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    amtp: *mut Ub4,
    offset: Ub4,
    bufp: *mut c_void,
    buflen: Ub4,
    piece: Ub1,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobWrite2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    byte_amtp: *mut Ub8,
    char_amtp: *mut Ub8,
    offset: Ub8,
    bufp: *mut c_void,
    buflen: Ub8,
    piece: Ub1,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobWriteAppendFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    lobp: *mut OciLobLocator,
    amtp: *mut Ub4,
    bufp: *mut c_void,
    bufl: Ub4,
    piece: Ub1,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobWriteAppend2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    lobp: *mut OciLobLocator,
    byte_amtp: *mut Ub8,
    char_amtp: *mut Ub8,
    bufp: *mut c_void,
    bufl: Ub8,
    piece: Ub1,
    ctxp: *mut c_void,
    cbfp: *const c_void,
    csid: Ub2,
    csfrm: Ub1,
) -> Sword;
pub type OciLobAppendFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    dst_locp: *mut OciLobLocator,
    src_locp: *mut OciLobLocator,
) -> Sword;
pub type OciLobCopyFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    dst_locp: *mut OciLobLocator,
    src_locp: *mut OciLobLocator,
    amount: Ub4,
    dst_offset: Ub4,
    src_offset: Ub4,
) -> Sword;
pub type OciLobCopy2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    dst_locp: *mut OciLobLocator,
    src_locp: *mut OciLobLocator,
    amount: Ub8,
    dst_offset: Ub8,
    src_offset: Ub8,
) -> Sword;
pub type OciLobTrimFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    newlen: Ub4,
) -> Sword;
pub type OciLobTrim2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    newlen: Ub8,
) -> Sword;
pub type OciLobEraseFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    amount: *mut Ub4,
    offset: Ub4,
) -> Sword;
pub type OciLobErase2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    amount: *mut Ub8,
    offset: Ub8,
) -> Sword;
pub type OciLobGetLengthFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    lenp: *mut Ub4,
) -> Sword;
pub type OciLobGetLength2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    lenp: *mut Ub8,
) -> Sword;
pub type OciLobGetChunkSizeFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    chunksizep: *mut Ub4,
) -> Sword;
pub type OciLobGetStorageLimitFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    lobp: *mut OciLobLocator,
    limitp: *mut Ub8,
) -> Sword;
pub type OciLobOpenFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    mode: Ub1,
) -> Sword;
pub type OciLobFlagQueryFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    flag: *mut OciBool,
) -> Sword;
pub type OciLobIsEqualFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    x: *const OciLobLocator,
    y: *const OciLobLocator,
    is_equal: *mut OciBool,
) -> Sword;
pub type OciLobLocatorAssignFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    src_locp: *const OciLobLocator,
    dst_locpp: *mut *mut OciLobLocator,
) -> Sword;
pub type OciLobAssignFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    src_locp: *const OciLobLocator,
    dst_locpp: *mut *mut OciLobLocator,
) -> Sword;
pub type OciLobLoadFromFileFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    dst_locp: *mut OciLobLocator,
    src_filep: *mut OciLobLocator,
    amount: Ub4,
    dst_offset: Ub4,
    src_offset: Ub4,
) -> Sword;
pub type OciLobLoadFromFile2Fn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    dst_locp: *mut OciLobLocator,
    src_filep: *mut OciLobLocator,
    amount: Ub8,
    dst_offset: Ub8,
    src_offset: Ub8,
) -> Sword;
pub type OciLobFileGetNameFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    filep: *const OciLobLocator,
    dir_alias: *mut OraText,
    d_length: *mut Ub2,
    filename: *mut OraText,
    f_length: *mut Ub2,
) -> Sword;
pub type OciLobFileSetNameFn = unsafe extern "C" fn(
    envhp: *mut OciEnv,
    errhp: *mut OciError,
    filepp: *mut *mut OciLobLocator,
    dir_alias: *const OraText,
    d_length: Ub2,
    filename: *const OraText,
    f_length: Ub2,
) -> Sword;
pub type OciLobFlushBufferFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    locp: *mut OciLobLocator,
    flag: Ub4,
) -> Sword;

pub type OciDateAssignFn =
    unsafe extern "C" fn(err: *mut OciError, from: *const OciDate, to: *mut OciDate) -> Sword;
pub type OciDateToTextFn = unsafe extern "C" fn(
    err: *mut OciError,
    date: *const OciDate,
    fmt: *const OraText,
    fmt_length: Ub1,
    lang_name: *const OraText,
    lang_length: Ub4,
    buf_size: *mut Ub4,
    buf: *mut OraText,
) -> Sword;
pub type OciDateFromTextFn = unsafe extern "C" fn(
    err: *mut OciError,
    date_str: *const OraText,
    d_str_length: Ub4,
    fmt: *const OraText,
    fmt_length: Ub1,
    lang_name: *const OraText,
    lang_length: Ub4,
    date: *mut OciDate,
) -> Sword;
pub type OciDateCompareFn = unsafe extern "C" fn(
    err: *mut OciError,
    date1: *const OciDate,
    date2: *const OciDate,
    result: *mut Sword,
) -> Sword;
pub type OciDateShiftFn = unsafe extern "C" fn(
    err: *mut OciError,
    date: *const OciDate,
    num: Sb4,
    result: *mut OciDate,
) -> Sword;
pub type OciDateLastDayFn = unsafe extern "C" fn(
    err: *mut OciError,
    date: *const OciDate,
    last_day: *mut OciDate,
) -> Sword;
pub type OciDateNextDayFn = unsafe extern "C" fn(
    err: *mut OciError,
    date: *const OciDate,
    day: *const OraText,
    day_length: Ub4,
    next_day: *mut OciDate,
) -> Sword;
pub type OciDateDaysBetweenFn = unsafe extern "C" fn(
    err: *mut OciError,
    date1: *const OciDate,
    date2: *const OciDate,
    num_days: *mut Sb4,
) -> Sword;
pub type OciDateSysDateFn =
    unsafe extern "C" fn(err: *mut OciError, sys_date: *mut OciDate) -> Sword;
pub type OciDateCheckFn =
    unsafe extern "C" fn(err: *mut OciError, date: *const OciDate, valid: *mut u32) -> Sword;

pub type OciNumberToIntFn = unsafe extern "C" fn(
    err: *mut OciError,
    number: *const OciNumber,
    rsl_length: u32,
    rsl_flag: u32,
    rsl: *mut c_void,
) -> Sword;
pub type OciNumberFromIntFn = unsafe extern "C" fn(
    err: *mut OciError,
    inum: *const c_void,
    inum_length: u32,
    inum_s_flag: u32,
    number: *mut OciNumber,
) -> Sword;
pub type OciNumberToRealFn = unsafe extern "C" fn(
    err: *mut OciError,
    number: *const OciNumber,
    rsl_length: u32,
    rsl: *mut c_void,
) -> Sword;
pub type OciNumberFromRealFn = unsafe extern "C" fn(
    err: *mut OciError,
    rnum: *const c_void,
    rnum_length: u32,
    number: *mut OciNumber,
) -> Sword;
pub type OciNumberToTextFn = unsafe extern "C" fn(
    err: *mut OciError,
    number: *const OciNumber,
    fmt: *const OraText,
    fmt_length: Ub4,
    nls_params: *const OraText,
    nls_p_length: Ub4,
    buf_size: *mut Ub4,
    buf: *mut OraText,
) -> Sword;
pub type OciNumberFromTextFn = unsafe extern "C" fn(
    err: *mut OciError,
    str: *const OraText,
    str_length: Ub4,
    fmt: *const OraText,
    fmt_length: Ub4,
    nls_params: *const OraText,
    nls_p_length: Ub4,
    number: *mut OciNumber,
) -> Sword;

pub type OciDateTimeAssignFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    from: *const OciDateTime,
    to: *mut OciDateTime,
) -> Sword;
pub type OciDateTimeCheckFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    date: *const OciDateTime,
    valid: *mut Ub4,
) -> Sword;
pub type OciDateTimeCompareFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    date1: *const OciDateTime,
    date2: *const OciDateTime,
    result: *mut Sword,
) -> Sword;
pub type OciDateTimeConstructFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *mut OciDateTime,
    year: Sb2,
    month: Ub1,
    day: Ub1,
    hour: Ub1,
    min: Ub1,
    sec: Ub1,
    fsec: Ub4,
    timezone: *const OraText,
    timezone_length: usize,
) -> Sword;
pub type OciDateTimeConvertFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    indate: *mut OciDateTime,
    outdate: *mut OciDateTime,
) -> Sword;
pub type OciDateTimeFromTextFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    date_str: *const OraText,
    dstr_length: usize,
    fmt: *const OraText,
    fmt_length: Ub1,
    lang_name: *const OraText,
    lang_length: usize,
    datetime: *mut OciDateTime,
) -> Sword;
pub type OciDateTimeToTextFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    date: *const OciDateTime,
    fmt: *const OraText,
    fmt_length: Ub1,
    fsprec: Ub1,
    lang_name: *const OraText,
    lang_length: usize,
    buf_size: *mut Ub4,
    buf: *mut OraText,
) -> Sword;
pub type OciDateTimeGetDateFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *const OciDateTime,
    year: *mut Sb2,
    month: *mut Ub1,
    day: *mut Ub1,
) -> Sword;
pub type OciDateTimeGetTimeFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *mut OciDateTime,
    hour: *mut Ub1,
    min: *mut Ub1,
    sec: *mut Ub1,
    fsec: *mut Ub4,
) -> Sword;
pub type OciDateTimeGetTimeZoneNameFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *const OciDateTime,
    buf: *mut Ub1,
    buflen: *mut Ub4,
) -> Sword;
pub type OciDateTimeGetTimeZoneOffsetFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *const OciDateTime,
    hour: *mut Sb1,
    min: *mut Sb1,
) -> Sword;
pub type OciDateTimeIntervalOpFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    datetime: *mut OciDateTime,
    inter: *mut OciIntervalDesc,
    outdatetime: *mut OciDateTime,
) -> Sword;
pub type OciDateTimeSubtractFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    indate1: *mut OciDateTime,
    indate2: *mut OciDateTime,
    inter: *mut OciIntervalDesc,
) -> Sword;
pub type OciDateTimeSysTimeStampFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    sys_date: *mut OciDateTime,
) -> Sword;

pub type OciIntervalAssignFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    inpinter: *const OciIntervalDesc,
    outinter: *mut OciIntervalDesc,
) -> Sword;
pub type OciIntervalCheckFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    interval: *const OciIntervalDesc,
    valid: *mut Ub4,
) -> Sword;
pub type OciIntervalCompareFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    inter1: *mut OciIntervalDesc,
    inter2: *mut OciIntervalDesc,
    result: *mut Sword,
) -> Sword;
pub type OciIntervalToTextFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    interval: *const OciIntervalDesc,
    lfprec: Ub1,
    fsprec: Ub1,
    buffer: *mut OraText,
    buflen: usize,
    resultlen: *mut usize,
) -> Sword;
pub type OciIntervalFromTextFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    inpstring: *const OraText,
    str_len: usize,
    result: *mut OciIntervalDesc,
) -> Sword;
pub type OciIntervalGetDaySecondFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    dy: *mut Sb4,
    hr: *mut Sb4,
    mm: *mut Sb4,
    ss: *mut Sb4,
    fsec: *mut Sb4,
    interval: *const OciIntervalDesc,
) -> Sword;
pub type OciIntervalGetYearMonthFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    yr: *mut Sb4,
    mnth: *mut Sb4,
    interval: *const OciIntervalDesc,
) -> Sword;
pub type OciIntervalSetDaySecondFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    dy: Sb4,
    hr: Sb4,
    mm: Sb4,
    ss: Sb4,
    fsec: Sb4,
    result: *mut OciIntervalDesc,
) -> Sword;
pub type OciIntervalSetYearMonthFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    yr: Sb4,
    mnth: Sb4,
    result: *mut OciIntervalDesc,
) -> Sword;
pub type OciIntervalArithFn = unsafe extern "C" fn(
    hndl: *mut c_void,
    err: *mut OciError,
    operand1: *mut OciIntervalDesc,
    operand2: *mut OciIntervalDesc,
    result: *mut OciIntervalDesc,
) -> Sword;

pub type OciTypeByNameFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    svc: *const OciSvcCtx,
    schema_name: *const OraText,
    s_length: Ub4,
    type_name: *const OraText,
    t_length: Ub4,
    version_name: *const OraText,
    v_length: Ub4,
    pin_duration: Ub2,
    get_option: Ub4,
    tdo: *mut *mut OciType,
) -> Sword;
pub type OciObjectNewFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    svc: *const OciSvcCtx,
    typecode: Ub2,
    tdo: *mut OciType,
    table: *mut c_void,
    duration: Ub2,
    value: OciBool,
    instance: *mut *mut c_void,
) -> Sword;
pub type OciObjectFreeFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    instance: *mut c_void,
    flags: Ub2,
) -> Sword;
pub type OciObjectPinFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    object_ref: *mut OciRefDesc,
    corhdl: *mut c_void,
    pin_option: Ub4,
    pin_duration: Ub2,
    lock_option: Ub4,
    object: *mut *mut c_void,
) -> Sword;
pub type OciObjectUnpinFn =
    unsafe extern "C" fn(env: *mut OciEnv, err: *mut OciError, object: *mut c_void) -> Sword;
pub type OciObjectGetAttrFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    instance: *mut c_void,
    null_struct: *mut c_void,
    tdo: *mut OciType,
    names: *mut *const OraText,
    lengths: *const Ub4,
    name_count: Ub4,
    indexes: *const Ub4,
    index_count: Ub4,
    attr_null_status: *mut Sb2,
    attr_null_struct: *mut *mut c_void,
    attr_value: *mut *mut c_void,
    attr_tdo: *mut *mut OciType,
) -> Sword;
pub type OciObjectSetAttrFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    instance: *mut c_void,
    null_struct: *mut c_void,
    tdo: *mut OciType,
    names: *mut *const OraText,
    lengths: *const Ub4,
    name_count: Ub4,
    indexes: *const Ub4,
    index_count: Ub4,
    null_status: Sb2,
    attr_null_struct: *const c_void,
    attr_value: *const c_void,
) -> Sword;
pub type OciObjectGetIndFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    instance: *mut c_void,
    null_struct: *mut *mut c_void,
) -> Sword;
pub type OciObjectCopyFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    svc: *const OciSvcCtx,
    source: *mut c_void,
    null_source: *mut c_void,
    target: *mut c_void,
    null_target: *mut c_void,
    tdo: *mut OciType,
    duration: Ub2,
    option: Ub1,
) -> Sword;
pub type OciObjectGetObjectRefFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    object: *mut c_void,
    object_ref: *mut OciRefDesc,
) -> Sword;
pub type OciRefAssignFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    source: *const OciRefDesc,
    target: *mut *mut OciRefDesc,
) -> Sword;
pub type OciRefIsNullFn =
    unsafe extern "C" fn(env: *mut OciEnv, reference: *const OciRefDesc) -> OciBool;
pub type OciRefClearFn = unsafe extern "C" fn(env: *mut OciEnv, reference: *mut OciRefDesc);
pub type OciRefToHexFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    reference: *const OciRefDesc,
    hex: *mut OraText,
    hex_length: *mut Ub4,
) -> Sword;
pub type OciRefHexSizeFn =
    unsafe extern "C" fn(env: *mut OciEnv, reference: *const OciRefDesc) -> Ub4;

pub type OciCollSizeFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    coll: *const OciColl,
    size: *mut Sb4,
) -> Sword;
pub type OciCollMaxFn = unsafe extern "C" fn(env: *mut OciEnv, coll: *const OciColl) -> Sb4;
pub type OciCollGetItemFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    coll: *const OciColl,
    index: Sb4,
    exists: *mut OciBool,
    elem: *mut *mut c_void,
    elemind: *mut *mut c_void,
) -> Sword;
pub type OciCollAssignElemFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    index: Sb4,
    elem: *const c_void,
    elemind: *const c_void,
    coll: *mut OciColl,
) -> Sword;
pub type OciCollAssignFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    rhs: *const OciColl,
    lhs: *mut OciColl,
) -> Sword;
pub type OciCollAppendFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    elem: *const c_void,
    elemind: *const c_void,
    coll: *mut OciColl,
) -> Sword;
pub type OciCollTrimFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    trim_num: Sb4,
    coll: *mut OciColl,
) -> Sword;
pub type OciIterCreateFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    coll: *const OciColl,
    itr: *mut *mut OciIter,
) -> Sword;
pub type OciIterDeleteFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    itr: *mut *mut OciIter,
) -> Sword;
pub type OciIterNextFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    itr: *mut OciIter,
    elem: *mut *mut c_void,
    elemind: *mut *mut c_void,
    eoc: *mut OciBool,
) -> Sword;
pub type OciStringPtrFn =
    unsafe extern "C" fn(env: *mut OciEnv, vs: *const OciString) -> *mut OraText;
pub type OciStringSizeFn = unsafe extern "C" fn(env: *mut OciEnv, vs: *const OciString) -> Ub4;
pub type OciStringAssignTextFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    rhs: *const OraText,
    rhs_len: Ub4,
    lhs: *mut *mut OciString,
) -> Sword;
pub type OciRawPtrFn = unsafe extern "C" fn(env: *mut OciEnv, raw: *const OciRaw) -> *mut u8;
pub type OciRawSizeFn = unsafe extern "C" fn(env: *mut OciEnv, raw: *const OciRaw) -> Ub4;
pub type OciRawAssignBytesFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    rhs: *const u8,
    rhs_len: Ub4,
    lhs: *mut *mut OciRaw,
) -> Sword;
pub type OciCacheFreeFn = unsafe extern "C" fn(
    env: *mut OciEnv,
    err: *mut OciError,
    svc: *const OciSvcCtx,
) -> Sword;

pub type OciAqEnqFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    queue_name: *const OraText,
    enqopt: *mut OciAqEnqOptions,
    msgprop: *mut OciAqMsgProperties,
    payload_tdo: *mut OciType,
    payload: *mut *mut c_void,
    payload_ind: *mut *mut c_void,
    msgid: *mut *mut OciRaw,
    flags: Ub4,
) -> Sword;
pub type OciAqDeqFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    queue_name: *const OraText,
    deqopt: *mut OciAqDeqOptions,
    msgprop: *mut OciAqMsgProperties,
    payload_tdo: *mut OciType,
    payload: *mut *mut c_void,
    payload_ind: *mut *mut c_void,
    msgid: *mut *mut OciRaw,
    flags: Ub4,
) -> Sword;
pub type OciAqListenFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
    agent_list: *mut *mut OciAqAgent,
    num_agents: Ub4,
    wait: Sb4,
    agent: *mut *mut OciAqAgent,
    flags: Ub4,
) -> Sword;

pub type OciSubscriptionRegisterFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    subscrhpp: *mut *mut OciSubscriptionHandle,
    count: Ub2,
    errhp: *mut OciError,
    mode: Ub4,
) -> Sword;
pub type OciSubscriptionUnRegisterFn = unsafe extern "C" fn(
    svchp: *mut OciSvcCtx,
    subscrhp: *mut OciSubscriptionHandle,
    errhp: *mut OciError,
    mode: Ub4,
) -> Sword;

pub type OciDirPathCtxFn =
    unsafe extern "C" fn(dpctx: *mut OciDirPathCtx, errhp: *mut OciError) -> Sword;
pub type OciDirPathPrepareFn = unsafe extern "C" fn(
    dpctx: *mut OciDirPathCtx,
    svchp: *mut OciSvcCtx,
    errhp: *mut OciError,
) -> Sword;
pub type OciDirPathLoadStreamFn = unsafe extern "C" fn(
    dpctx: *mut OciDirPathCtx,
    dpstr: *mut OciDirPathStream,
    errhp: *mut OciError,
) -> Sword;
pub type OciDirPathColArrayEntrySetFn = unsafe extern "C" fn(
    dpca: *mut OciDirPathColArray,
    errhp: *mut OciError,
    rownum: Ub4,
    col_idx: Ub2,
    cvalp: *mut Ub1,
    clen: Ub4,
    cflg: Ub1,
) -> Sword;
pub type OciDirPathColArrayResetFn =
    unsafe extern "C" fn(dpca: *mut OciDirPathColArray, errhp: *mut OciError) -> Sword;
pub type OciDirPathColArrayToStreamFn = unsafe extern "C" fn(
    dpca: *mut OciDirPathColArray,
    dpctx: *mut OciDirPathCtx,
    dpstr: *mut OciDirPathStream,
    errhp: *mut OciError,
    rowcnt: Ub4,
    rowoff: Ub4,
) -> Sword;
pub type OciDirPathStreamResetFn =
    unsafe extern "C" fn(dpstr: *mut OciDirPathStream, errhp: *mut OciError) -> Sword;
pub type OciDirPathDataSaveFn = unsafe extern "C" fn(
    dpctx: *mut OciDirPathCtx,
    errhp: *mut OciError,
    action: Ub4,
) -> Sword;

pub type OciVectorFromArrayFn = unsafe extern "C" fn(
    vectord: *mut OciVectorDesc,
    errhp: *mut OciError,
    vformat: Ub1,
    vdim: Ub4,
    vecarray: *mut c_void,
    mode: Ub4,
) -> Sword;
pub type OciVectorToArrayFn = unsafe extern "C" fn(
    vectord: *mut OciVectorDesc,
    errhp: *mut OciError,
    vformat: Ub1,
    vdim: *mut Ub4,
    vecarray: *mut c_void,
    mode: Ub4,
) -> Sword;

/// Loading the Oracle client failed before the environment could be created.
#[derive(Debug)]
pub enum LoadError {
    /// The shared library itself could not be opened.
    Library(libloading::Error),
    /// The library was opened, but does not export the minimal OCI 8.0 surface.
    MissingBaseSymbols,
}

/// Typed table of every OCI entry point the crate calls.
///
/// The `Library` is kept inside the table, so the function pointers stay valid for as long as the
/// table lives. Fields which only exist in newer clients are `Option`s; everything else is part
/// of the base surface without which the load fails.
pub struct OciEntryPoints {
    pub env_nls_create: OciEnvNlsCreateFn,
    pub handle_alloc: OciHandleAllocFn,
    pub handle_free: OciHandleFreeFn,
    pub descriptor_alloc: OciDescriptorAllocFn,
    pub descriptor_free: OciDescriptorFreeFn,
    pub array_descriptor_alloc: Option<OciArrayDescriptorAllocFn>,
    pub array_descriptor_free: Option<OciArrayDescriptorFreeFn>,
    pub attr_get: OciAttrGetFn,
    pub attr_set: OciAttrSetFn,
    pub param_get: OciParamGetFn,
    pub error_get: OciErrorGetFn,
    pub client_version: Option<OciClientVersionFn>,
    pub server_version: OciServerVersionFn,
    pub ping: Option<OciPingFn>,
    pub break_: OciBreakFn,
    pub reset: OciResetFn,

    pub server_attach: OciServerAttachFn,
    pub server_detach: OciServerDetachFn,
    pub session_begin: OciSessionBeginFn,
    pub session_end: OciSessionEndFn,
    pub password_change: OciPasswordChangeFn,
    pub trans_start: OciTransStartFn,
    pub trans_commit: OciTransEndFn,
    pub trans_rollback: OciTransEndFn,
    pub trans_detach: OciTransEndFn,
    pub trans_prepare: OciTransEndFn,
    pub trans_forget: OciTransEndFn,

    pub connection_pool_create: Option<OciConnectionPoolCreateFn>,
    pub connection_pool_destroy: Option<OciConnectionPoolDestroyFn>,
    pub session_pool_create: Option<OciSessionPoolCreateFn>,
    pub session_pool_destroy: Option<OciSessionPoolDestroyFn>,
    pub session_get: Option<OciSessionGetFn>,
    pub session_release: Option<OciSessionReleaseFn>,

    pub stmt_prepare: OciStmtPrepareFn,
    pub stmt_prepare2: Option<OciStmtPrepare2Fn>,
    pub stmt_release: Option<OciStmtReleaseFn>,
    pub stmt_execute: OciStmtExecuteFn,
    pub stmt_fetch: OciStmtFetchFn,
    pub stmt_fetch2: Option<OciStmtFetch2Fn>,
    pub stmt_get_next_result: Option<OciStmtGetNextResultFn>,
    pub stmt_get_piece_info: OciStmtGetPieceInfoFn,
    pub stmt_set_piece_info: OciStmtSetPieceInfoFn,
    pub bind_by_pos: OciBindByPosFn,
    pub bind_by_name: OciBindByNameFn,
    pub bind_dynamic: OciBindDynamicFn,
    pub bind_object: OciBindObjectFn,
    pub define_by_pos: OciDefineByPosFn,
    pub define_dynamic: OciDefineDynamicFn,
    pub define_object: OciDefineObjectFn,
    pub describe_any: OciDescribeAnyFn,

    pub lob_create_temporary: OciLobCreateTemporaryFn,
    pub lob_free_temporary: OciLobHandleFn,
    pub lob_is_temporary: OciLobIsTemporaryFn,
    pub lob_read: OciLobReadFn,
    pub lob_read2: Option<OciLobRead2Fn>,
    pub lob_write: OciLobWriteFn,
    pub lob_write2: Option<OciLobWrite2Fn>,
    pub lob_write_append: OciLobWriteAppendFn,
    pub lob_write_append2: Option<OciLobWriteAppend2Fn>,
    pub lob_append: OciLobAppendFn,
    pub lob_copy: OciLobCopyFn,
    pub lob_copy2: Option<OciLobCopy2Fn>,
    pub lob_trim: OciLobTrimFn,
    pub lob_trim2: Option<OciLobTrim2Fn>,
    pub lob_erase: OciLobEraseFn,
    pub lob_erase2: Option<OciLobErase2Fn>,
    pub lob_get_length: OciLobGetLengthFn,
    pub lob_get_length2: Option<OciLobGetLength2Fn>,
    pub lob_get_chunk_size: OciLobGetChunkSizeFn,
    pub lob_get_storage_limit: Option<OciLobGetStorageLimitFn>,
    pub lob_open: OciLobOpenFn,
    pub lob_close: OciLobHandleFn,
    pub lob_is_open: OciLobFlagQueryFn,
    pub lob_is_equal: OciLobIsEqualFn,
    pub lob_locator_assign: OciLobLocatorAssignFn,
    pub lob_assign: OciLobAssignFn,
    pub lob_load_from_file: OciLobLoadFromFileFn,
    pub lob_load_from_file2: Option<OciLobLoadFromFile2Fn>,
    pub lob_file_open: OciLobOpenFn,
    pub lob_file_close: OciLobHandleFn,
    pub lob_file_is_open: OciLobFlagQueryFn,
    pub lob_file_exists: OciLobFlagQueryFn,
    pub lob_file_get_name: OciLobFileGetNameFn,
    pub lob_file_set_name: OciLobFileSetNameFn,
    pub lob_flush_buffer: OciLobFlushBufferFn,

    pub date_assign: OciDateAssignFn,
    pub date_to_text: OciDateToTextFn,
    pub date_from_text: OciDateFromTextFn,
    pub date_compare: OciDateCompareFn,
    pub date_add_days: OciDateShiftFn,
    pub date_add_months: OciDateShiftFn,
    pub date_last_day: OciDateLastDayFn,
    pub date_next_day: OciDateNextDayFn,
    pub date_days_between: OciDateDaysBetweenFn,
    pub date_sys_date: OciDateSysDateFn,
    pub date_check: OciDateCheckFn,

    pub number_to_int: OciNumberToIntFn,
    pub number_from_int: OciNumberFromIntFn,
    pub number_to_real: OciNumberToRealFn,
    pub number_from_real: OciNumberFromRealFn,
    pub number_to_text: OciNumberToTextFn,
    pub number_from_text: OciNumberFromTextFn,

    pub datetime_assign: Option<OciDateTimeAssignFn>,
    pub datetime_check: Option<OciDateTimeCheckFn>,
    pub datetime_compare: Option<OciDateTimeCompareFn>,
    pub datetime_construct: Option<OciDateTimeConstructFn>,
    pub datetime_convert: Option<OciDateTimeConvertFn>,
    pub datetime_from_text: Option<OciDateTimeFromTextFn>,
    pub datetime_to_text: Option<OciDateTimeToTextFn>,
    pub datetime_get_date: Option<OciDateTimeGetDateFn>,
    pub datetime_get_time: Option<OciDateTimeGetTimeFn>,
    pub datetime_get_time_zone_name: Option<OciDateTimeGetTimeZoneNameFn>,
    pub datetime_get_time_zone_offset: Option<OciDateTimeGetTimeZoneOffsetFn>,
    pub datetime_interval_add: Option<OciDateTimeIntervalOpFn>,
    pub datetime_interval_sub: Option<OciDateTimeIntervalOpFn>,
    pub datetime_subtract: Option<OciDateTimeSubtractFn>,
    pub datetime_sys_timestamp: Option<OciDateTimeSysTimeStampFn>,

    pub interval_assign: Option<OciIntervalAssignFn>,
    pub interval_check: Option<OciIntervalCheckFn>,
    pub interval_compare: Option<OciIntervalCompareFn>,
    pub interval_to_text: Option<OciIntervalToTextFn>,
    pub interval_from_text: Option<OciIntervalFromTextFn>,
    pub interval_get_day_second: Option<OciIntervalGetDaySecondFn>,
    pub interval_get_year_month: Option<OciIntervalGetYearMonthFn>,
    pub interval_set_day_second: Option<OciIntervalSetDaySecondFn>,
    pub interval_set_year_month: Option<OciIntervalSetYearMonthFn>,
    pub interval_add: Option<OciIntervalArithFn>,
    pub interval_subtract: Option<OciIntervalArithFn>,

    pub type_by_name: OciTypeByNameFn,
    pub object_new: OciObjectNewFn,
    pub object_free: OciObjectFreeFn,
    pub object_pin: OciObjectPinFn,
    pub object_unpin: OciObjectUnpinFn,
    pub object_get_ind: OciObjectGetIndFn,
    pub object_get_attr: OciObjectGetAttrFn,
    pub object_set_attr: OciObjectSetAttrFn,
    pub object_copy: OciObjectCopyFn,
    pub object_get_object_ref: OciObjectGetObjectRefFn,
    pub ref_assign: OciRefAssignFn,
    pub ref_is_null: OciRefIsNullFn,
    pub ref_clear: OciRefClearFn,
    pub ref_to_hex: OciRefToHexFn,
    pub ref_hex_size: OciRefHexSizeFn,
    pub coll_size: OciCollSizeFn,
    pub coll_max: OciCollMaxFn,
    pub coll_get_item: OciCollGetItemFn,
    pub coll_assign_elem: OciCollAssignElemFn,
    pub coll_assign: OciCollAssignFn,
    pub coll_append: OciCollAppendFn,
    pub coll_trim: OciCollTrimFn,
    pub iter_create: OciIterCreateFn,
    pub iter_delete: OciIterDeleteFn,
    pub iter_next: OciIterNextFn,
    pub string_ptr: OciStringPtrFn,
    pub string_size: OciStringSizeFn,
    pub string_assign_text: OciStringAssignTextFn,
    pub raw_ptr: OciRawPtrFn,
    pub raw_size: OciRawSizeFn,
    pub raw_assign_bytes: OciRawAssignBytesFn,
    pub cache_free: OciCacheFreeFn,

    pub aq_enq: Option<OciAqEnqFn>,
    pub aq_deq: Option<OciAqDeqFn>,
    pub aq_listen: Option<OciAqListenFn>,
    pub subscription_register: Option<OciSubscriptionRegisterFn>,
    pub subscription_unregister: Option<OciSubscriptionUnRegisterFn>,

    pub dir_path_prepare: Option<OciDirPathPrepareFn>,
    pub dir_path_abort: Option<OciDirPathCtxFn>,
    pub dir_path_finish: Option<OciDirPathCtxFn>,
    pub dir_path_load_stream: Option<OciDirPathLoadStreamFn>,
    pub dir_path_col_array_entry_set: Option<OciDirPathColArrayEntrySetFn>,
    pub dir_path_col_array_reset: Option<OciDirPathColArrayResetFn>,
    pub dir_path_col_array_to_stream: Option<OciDirPathColArrayToStreamFn>,
    pub dir_path_stream_reset: Option<OciDirPathStreamResetFn>,
    pub dir_path_data_save: Option<OciDirPathDataSaveFn>,

    pub vector_from_array: Option<OciVectorFromArrayFn>,
    pub vector_to_array: Option<OciVectorToArrayFn>,

    runtime_version: Version,
    /// Keeps the shared library mapped for the lifetime of the function pointers above.
    _library: Library,
}

/// Copies the raw function pointer of type `$ty` for symbol `$name` out of `$lib`, or `None` if
/// the client does not export it.
macro_rules! symbol {
    ($lib:expr, $name:literal, $ty:ty) => {
        unsafe { $lib.get::<$ty>($name).ok().map(|sym| *sym) }
    };
}

/// `true` if the library exports a symbol of the given name. Used for pure version probes whose
/// signature we never call.
fn probe(lib: &Library, name: &[u8]) -> bool {
    unsafe { lib.get::<unsafe extern "C" fn()>(name).is_ok() }
}

impl OciEntryPoints {
    /// Opens the Oracle client at `path` and resolves every entry point.
    ///
    /// # Safety
    ///
    /// The file at `path` must be an Oracle client library (or ABI compatible with one).
    /// Executing arbitrary library initializers is inherent to dynamic loading.
    pub unsafe fn load(path: &Path) -> Result<Self, LoadError> {
        let library = unsafe { Library::new(path) }.map_err(LoadError::Library)?;
        debug!("Loaded Oracle client library from {}", path.display());
        Self::from_library(library)
    }

    fn from_library(library: Library) -> Result<Self, LoadError> {
        // The base surface exists in every client since 8.0. If any of these are missing we are
        // not looking at an Oracle client.
        macro_rules! base {
            ($name:literal, $ty:ty) => {
                symbol!(library, $name, $ty).ok_or(LoadError::MissingBaseSymbols)?
            };
        }

        let client_version = symbol!(library, b"OCIClientVersion\0", OciClientVersionFn);
        let stmt_fetch2 = symbol!(library, b"OCIStmtFetch2\0", OciStmtFetch2Fn);
        let stmt_prepare2 = symbol!(library, b"OCIStmtPrepare2\0", OciStmtPrepare2Fn);
        let stmt_get_next_result =
            symbol!(library, b"OCIStmtGetNextResult\0", OciStmtGetNextResultFn);
        let lob_write2 = symbol!(library, b"OCILobWrite2\0", OciLobWrite2Fn);
        let array_descriptor_free =
            symbol!(library, b"OCIArrayDescriptorFree\0", OciArrayDescriptorFreeFn);
        let vector_to_array = symbol!(library, b"OCIVectorToArray\0", OciVectorToArrayFn);

        let runtime_version = if let Some(version_fn) = client_version {
            let mut triple = [0; 5];
            unsafe {
                version_fn(
                    &mut triple[0],
                    &mut triple[1],
                    &mut triple[2],
                    &mut triple[3],
                    &mut triple[4],
                );
            }
            Version::new(triple[0], triple[1], triple[2])
        } else if vector_to_array.is_some() {
            Version::V23_4
        } else if probe(&library, b"OCIServerDataLengthGet\0") {
            Version::V21_3
        } else if probe(&library, b"OCISodaBulkInsert\0") {
            Version::V19_3
        } else if probe(&library, b"OCISodaOperKeysSet\0") {
            Version::V18_3
        } else if probe(&library, b"OCIServerRelease2\0") {
            Version::V18_1
        } else if stmt_get_next_result.is_some() {
            Version::V12_1
        } else if probe(&library, b"OCILobGetContentType\0") {
            Version::V11_2
        } else if array_descriptor_free.is_some() {
            Version::V11_1
        } else if lob_write2.is_some() {
            Version::V10_1
        } else if stmt_prepare2.is_some() {
            Version::V9_2
        } else if probe(&library, b"OCIDateTimeGetTimeZoneName\0") {
            Version::V9_0
        } else if probe(&library, b"OCIThreadCreate\0") {
            Version::V8_1
        } else if probe(&library, b"OCIEnvInit\0") {
            Version::V8_0
        } else {
            return Err(LoadError::MissingBaseSymbols);
        };
        info!("Oracle client runtime version detected as {runtime_version}");

        let table = OciEntryPoints {
            env_nls_create: base!(b"OCIEnvNlsCreate\0", OciEnvNlsCreateFn),
            handle_alloc: base!(b"OCIHandleAlloc\0", OciHandleAllocFn),
            handle_free: base!(b"OCIHandleFree\0", OciHandleFreeFn),
            descriptor_alloc: base!(b"OCIDescriptorAlloc\0", OciDescriptorAllocFn),
            descriptor_free: base!(b"OCIDescriptorFree\0", OciDescriptorFreeFn),
            array_descriptor_alloc: symbol!(
                library,
                b"OCIArrayDescriptorAlloc\0",
                OciArrayDescriptorAllocFn
            ),
            array_descriptor_free,
            attr_get: base!(b"OCIAttrGet\0", OciAttrGetFn),
            attr_set: base!(b"OCIAttrSet\0", OciAttrSetFn),
            param_get: base!(b"OCIParamGet\0", OciParamGetFn),
            error_get: base!(b"OCIErrorGet\0", OciErrorGetFn),
            client_version,
            server_version: base!(b"OCIServerVersion\0", OciServerVersionFn),
            ping: symbol!(library, b"OCIPing\0", OciPingFn),
            break_: base!(b"OCIBreak\0", OciBreakFn),
            reset: base!(b"OCIReset\0", OciResetFn),

            server_attach: base!(b"OCIServerAttach\0", OciServerAttachFn),
            server_detach: base!(b"OCIServerDetach\0", OciServerDetachFn),
            session_begin: base!(b"OCISessionBegin\0", OciSessionBeginFn),
            session_end: base!(b"OCISessionEnd\0", OciSessionEndFn),
            password_change: base!(b"OCIPasswordChange\0", OciPasswordChangeFn),
            trans_start: base!(b"OCITransStart\0", OciTransStartFn),
            trans_commit: base!(b"OCITransCommit\0", OciTransEndFn),
            trans_rollback: base!(b"OCITransRollback\0", OciTransEndFn),
            trans_detach: base!(b"OCITransDetach\0", OciTransEndFn),
            trans_prepare: base!(b"OCITransPrepare\0", OciTransEndFn),
            trans_forget: base!(b"OCITransForget\0", OciTransEndFn),

            connection_pool_create: symbol!(
                library,
                b"OCIConnectionPoolCreate\0",
                OciConnectionPoolCreateFn
            ),
            connection_pool_destroy: symbol!(
                library,
                b"OCIConnectionPoolDestroy\0",
                OciConnectionPoolDestroyFn
            ),
            session_pool_create: symbol!(library, b"OCISessionPoolCreate\0", OciSessionPoolCreateFn),
            session_pool_destroy: symbol!(
                library,
                b"OCISessionPoolDestroy\0",
                OciSessionPoolDestroyFn
            ),
            session_get: symbol!(library, b"OCISessionGet\0", OciSessionGetFn),
            session_release: symbol!(library, b"OCISessionRelease\0", OciSessionReleaseFn),

            stmt_prepare: base!(b"OCIStmtPrepare\0", OciStmtPrepareFn),
            stmt_prepare2,
            stmt_release: symbol!(library, b"OCIStmtRelease\0", OciStmtReleaseFn),
            stmt_execute: base!(b"OCIStmtExecute\0", OciStmtExecuteFn),
            stmt_fetch: base!(b"OCIStmtFetch\0", OciStmtFetchFn),
            stmt_fetch2,
            stmt_get_next_result,
            stmt_get_piece_info: base!(b"OCIStmtGetPieceInfo\0", OciStmtGetPieceInfoFn),
            stmt_set_piece_info: base!(b"OCIStmtSetPieceInfo\0", OciStmtSetPieceInfoFn),
            bind_by_pos: base!(b"OCIBindByPos\0", OciBindByPosFn),
            bind_by_name: base!(b"OCIBindByName\0", OciBindByNameFn),
            bind_dynamic: base!(b"OCIBindDynamic\0", OciBindDynamicFn),
            bind_object: base!(b"OCIBindObject\0", OciBindObjectFn),
            define_by_pos: base!(b"OCIDefineByPos\0", OciDefineByPosFn),
            define_dynamic: base!(b"OCIDefineDynamic\0", OciDefineDynamicFn),
            define_object: base!(b"OCIDefineObject\0", OciDefineObjectFn),
            describe_any: base!(b"OCIDescribeAny\0", OciDescribeAnyFn),

            lob_create_temporary: base!(b"OCILobCreateTemporary\0", OciLobCreateTemporaryFn),
            lob_free_temporary: base!(b"OCILobFreeTemporary\0", OciLobHandleFn),
            lob_is_temporary: base!(b"OCILobIsTemporary\0", OciLobIsTemporaryFn),
            lob_read: base!(b"OCILobRead\0", OciLobReadFn),
            lob_read2: symbol!(library, b"OCILobRead2\0", OciLobRead2Fn),
            lob_write: base!(b"OCILobWrite\0", OciLobWriteFn),
            lob_write2,
            lob_write_append: base!(b"OCILobWriteAppend\0", OciLobWriteAppendFn),
            lob_write_append2: symbol!(library, b"OCILobWriteAppend2\0", OciLobWriteAppend2Fn),
            lob_append: base!(b"OCILobAppend\0", OciLobAppendFn),
            lob_copy: base!(b"OCILobCopy\0", OciLobCopyFn),
            lob_copy2: symbol!(library, b"OCILobCopy2\0", OciLobCopy2Fn),
            lob_trim: base!(b"OCILobTrim\0", OciLobTrimFn),
            lob_trim2: symbol!(library, b"OCILobTrim2\0", OciLobTrim2Fn),
            lob_erase: base!(b"OCILobErase\0", OciLobEraseFn),
            lob_erase2: symbol!(library, b"OCILobErase2\0", OciLobErase2Fn),
            lob_get_length: base!(b"OCILobGetLength\0", OciLobGetLengthFn),
            lob_get_length2: symbol!(library, b"OCILobGetLength2\0", OciLobGetLength2Fn),
            lob_get_chunk_size: base!(b"OCILobGetChunkSize\0", OciLobGetChunkSizeFn),
            lob_get_storage_limit: symbol!(
                library,
                b"OCILobGetStorageLimit\0",
                OciLobGetStorageLimitFn
            ),
            lob_open: base!(b"OCILobOpen\0", OciLobOpenFn),
            lob_close: base!(b"OCILobClose\0", OciLobHandleFn),
            lob_is_open: base!(b"OCILobIsOpen\0", OciLobFlagQueryFn),
            lob_is_equal: base!(b"OCILobIsEqual\0", OciLobIsEqualFn),
            lob_locator_assign: base!(b"OCILobLocatorAssign\0", OciLobLocatorAssignFn),
            lob_assign: base!(b"OCILobAssign\0", OciLobAssignFn),
            lob_load_from_file: base!(b"OCILobLoadFromFile\0", OciLobLoadFromFileFn),
            lob_load_from_file2: symbol!(library, b"OCILobLoadFromFile2\0", OciLobLoadFromFile2Fn),
            lob_file_open: base!(b"OCILobFileOpen\0", OciLobOpenFn),
            lob_file_close: base!(b"OCILobFileClose\0", OciLobHandleFn),
            lob_file_is_open: base!(b"OCILobFileIsOpen\0", OciLobFlagQueryFn),
            lob_file_exists: base!(b"OCILobFileExists\0", OciLobFlagQueryFn),
            lob_file_get_name: base!(b"OCILobFileGetName\0", OciLobFileGetNameFn),
            lob_file_set_name: base!(b"OCILobFileSetName\0", OciLobFileSetNameFn),
            lob_flush_buffer: base!(b"OCILobFlushBuffer\0", OciLobFlushBufferFn),

            date_assign: base!(b"OCIDateAssign\0", OciDateAssignFn),
            date_to_text: base!(b"OCIDateToText\0", OciDateToTextFn),
            date_from_text: base!(b"OCIDateFromText\0", OciDateFromTextFn),
            date_compare: base!(b"OCIDateCompare\0", OciDateCompareFn),
            date_add_days: base!(b"OCIDateAddDays\0", OciDateShiftFn),
            date_add_months: base!(b"OCIDateAddMonths\0", OciDateShiftFn),
            date_last_day: base!(b"OCIDateLastDay\0", OciDateLastDayFn),
            date_next_day: base!(b"OCIDateNextDay\0", OciDateNextDayFn),
            date_days_between: base!(b"OCIDateDaysBetween\0", OciDateDaysBetweenFn),
            date_sys_date: base!(b"OCIDateSysDate\0", OciDateSysDateFn),
            date_check: base!(b"OCIDateCheck\0", OciDateCheckFn),

            number_to_int: base!(b"OCINumberToInt\0", OciNumberToIntFn),
            number_from_int: base!(b"OCINumberFromInt\0", OciNumberFromIntFn),
            number_to_real: base!(b"OCINumberToReal\0", OciNumberToRealFn),
            number_from_real: base!(b"OCINumberFromReal\0", OciNumberFromRealFn),
            number_to_text: base!(b"OCINumberToText\0", OciNumberToTextFn),
            number_from_text: base!(b"OCINumberFromText\0", OciNumberFromTextFn),

            datetime_assign: symbol!(library, b"OCIDateTimeAssign\0", OciDateTimeAssignFn),
            datetime_check: symbol!(library, b"OCIDateTimeCheck\0", OciDateTimeCheckFn),
            datetime_compare: symbol!(library, b"OCIDateTimeCompare\0", OciDateTimeCompareFn),
            datetime_construct: symbol!(library, b"OCIDateTimeConstruct\0", OciDateTimeConstructFn),
            datetime_convert: symbol!(library, b"OCIDateTimeConvert\0", OciDateTimeConvertFn),
            datetime_from_text: symbol!(library, b"OCIDateTimeFromText\0", OciDateTimeFromTextFn),
            datetime_to_text: symbol!(library, b"OCIDateTimeToText\0", OciDateTimeToTextFn),
            datetime_get_date: symbol!(library, b"OCIDateTimeGetDate\0", OciDateTimeGetDateFn),
            datetime_get_time: symbol!(library, b"OCIDateTimeGetTime\0", OciDateTimeGetTimeFn),
            datetime_get_time_zone_name: symbol!(
                library,
                b"OCIDateTimeGetTimeZoneName\0",
                OciDateTimeGetTimeZoneNameFn
            ),
            datetime_get_time_zone_offset: symbol!(
                library,
                b"OCIDateTimeGetTimeZoneOffset\0",
                OciDateTimeGetTimeZoneOffsetFn
            ),
            datetime_interval_add: symbol!(
                library,
                b"OCIDateTimeIntervalAdd\0",
                OciDateTimeIntervalOpFn
            ),
            datetime_interval_sub: symbol!(
                library,
                b"OCIDateTimeIntervalSub\0",
                OciDateTimeIntervalOpFn
            ),
            datetime_subtract: symbol!(library, b"OCIDateTimeSubtract\0", OciDateTimeSubtractFn),
            datetime_sys_timestamp: symbol!(
                library,
                b"OCIDateTimeSysTimeStamp\0",
                OciDateTimeSysTimeStampFn
            ),

            interval_assign: symbol!(library, b"OCIIntervalAssign\0", OciIntervalAssignFn),
            interval_check: symbol!(library, b"OCIIntervalCheck\0", OciIntervalCheckFn),
            interval_compare: symbol!(library, b"OCIIntervalCompare\0", OciIntervalCompareFn),
            interval_to_text: symbol!(library, b"OCIIntervalToText\0", OciIntervalToTextFn),
            interval_from_text: symbol!(library, b"OCIIntervalFromText\0", OciIntervalFromTextFn),
            interval_get_day_second: symbol!(
                library,
                b"OCIIntervalGetDaySecond\0",
                OciIntervalGetDaySecondFn
            ),
            interval_get_year_month: symbol!(
                library,
                b"OCIIntervalGetYearMonth\0",
                OciIntervalGetYearMonthFn
            ),
            interval_set_day_second: symbol!(
                library,
                b"OCIIntervalSetDaySecond\0",
                OciIntervalSetDaySecondFn
            ),
            interval_set_year_month: symbol!(
                library,
                b"OCIIntervalSetYearMonth\0",
                OciIntervalSetYearMonthFn
            ),
            interval_add: symbol!(library, b"OCIIntervalAdd\0", OciIntervalArithFn),
            interval_subtract: symbol!(library, b"OCIIntervalSubtract\0", OciIntervalArithFn),

            type_by_name: base!(b"OCITypeByName\0", OciTypeByNameFn),
            object_new: base!(b"OCIObjectNew\0", OciObjectNewFn),
            object_free: base!(b"OCIObjectFree\0", OciObjectFreeFn),
            object_pin: base!(b"OCIObjectPin\0", OciObjectPinFn),
            object_unpin: base!(b"OCIObjectUnpin\0", OciObjectUnpinFn),
            object_get_ind: base!(b"OCIObjectGetInd\0", OciObjectGetIndFn),
            object_get_attr: base!(b"OCIObjectGetAttr\0", OciObjectGetAttrFn),
            object_set_attr: base!(b"OCIObjectSetAttr\0", OciObjectSetAttrFn),
            object_copy: base!(b"OCIObjectCopy\0", OciObjectCopyFn),
            object_get_object_ref: base!(b"OCIObjectGetObjectRef\0", OciObjectGetObjectRefFn),
            ref_assign: base!(b"OCIRefAssign\0", OciRefAssignFn),
            ref_is_null: base!(b"OCIRefIsNull\0", OciRefIsNullFn),
            ref_clear: base!(b"OCIRefClear\0", OciRefClearFn),
            ref_to_hex: base!(b"OCIRefToHex\0", OciRefToHexFn),
            ref_hex_size: base!(b"OCIRefHexSize\0", OciRefHexSizeFn),
            coll_size: base!(b"OCICollSize\0", OciCollSizeFn),
            coll_max: base!(b"OCICollMax\0", OciCollMaxFn),
            coll_get_item: base!(b"OCICollGetElem\0", OciCollGetItemFn),
            coll_assign_elem: base!(b"OCICollAssignElem\0", OciCollAssignElemFn),
            coll_assign: base!(b"OCICollAssign\0", OciCollAssignFn),
            coll_append: base!(b"OCICollAppend\0", OciCollAppendFn),
            coll_trim: base!(b"OCICollTrim\0", OciCollTrimFn),
            iter_create: base!(b"OCIIterCreate\0", OciIterCreateFn),
            iter_delete: base!(b"OCIIterDelete\0", OciIterDeleteFn),
            iter_next: base!(b"OCIIterNext\0", OciIterNextFn),
            string_ptr: base!(b"OCIStringPtr\0", OciStringPtrFn),
            string_size: base!(b"OCIStringSize\0", OciStringSizeFn),
            string_assign_text: base!(b"OCIStringAssignText\0", OciStringAssignTextFn),
            raw_ptr: base!(b"OCIRawPtr\0", OciRawPtrFn),
            raw_size: base!(b"OCIRawSize\0", OciRawSizeFn),
            raw_assign_bytes: base!(b"OCIRawAssignBytes\0", OciRawAssignBytesFn),
            cache_free: base!(b"OCICacheFree\0", OciCacheFreeFn),

            aq_enq: symbol!(library, b"OCIAQEnq\0", OciAqEnqFn),
            aq_deq: symbol!(library, b"OCIAQDeq\0", OciAqDeqFn),
            aq_listen: symbol!(library, b"OCIAQListen\0", OciAqListenFn),
            subscription_register: symbol!(
                library,
                b"OCISubscriptionRegister\0",
                OciSubscriptionRegisterFn
            ),
            subscription_unregister: symbol!(
                library,
                b"OCISubscriptionUnRegister\0",
                OciSubscriptionUnRegisterFn
            ),

            dir_path_prepare: symbol!(library, b"OCIDirPathPrepare\0", OciDirPathPrepareFn),
            dir_path_abort: symbol!(library, b"OCIDirPathAbort\0", OciDirPathCtxFn),
            dir_path_finish: symbol!(library, b"OCIDirPathFinish\0", OciDirPathCtxFn),
            dir_path_load_stream: symbol!(
                library,
                b"OCIDirPathLoadStream\0",
                OciDirPathLoadStreamFn
            ),
            dir_path_col_array_entry_set: symbol!(
                library,
                b"OCIDirPathColArrayEntrySet\0",
                OciDirPathColArrayEntrySetFn
            ),
            dir_path_col_array_reset: symbol!(
                library,
                b"OCIDirPathColArrayReset\0",
                OciDirPathColArrayResetFn
            ),
            dir_path_col_array_to_stream: symbol!(
                library,
                b"OCIDirPathColArrayToStream\0",
                OciDirPathColArrayToStreamFn
            ),
            dir_path_stream_reset: symbol!(
                library,
                b"OCIDirPathStreamReset\0",
                OciDirPathStreamResetFn
            ),
            dir_path_data_save: symbol!(library, b"OCIDirPathDataSave\0", OciDirPathDataSaveFn),

            vector_from_array: symbol!(library, b"OCIVectorFromArray\0", OciVectorFromArrayFn),
            vector_to_array,

            runtime_version,
            _library: library,
        };
        Ok(table)
    }

    /// Client version, reported by the library itself or inferred from its exported symbols.
    pub fn runtime_version(&self) -> Version {
        self.runtime_version
    }

    /// `true` if the 64 bit ("wide") LOB API is available. Selected once at load; all LOB
    /// operations route through it when present.
    pub fn has_wide_lob_api(&self) -> bool {
        self.runtime_version >= Version::V10_1 && self.lob_write2.is_some()
    }

    /// `true` if scrollable cursors can be requested for statements.
    pub fn has_scrollable_cursors(&self) -> bool {
        self.runtime_version >= Version::V9_0 && self.stmt_fetch2.is_some()
    }

    /// `true` if statements may surface additional implicit result sets (12c `DBMS_SQL`).
    pub fn has_implicit_results(&self) -> bool {
        self.runtime_version >= Version::V12_1 && self.stmt_get_next_result.is_some()
    }

    /// `true` if the 23ai `VECTOR` datatype can be bound and fetched.
    pub fn has_vector_type(&self) -> bool {
        self.vector_from_array.is_some() && self.vector_to_array.is_some()
    }
}
