//! Numeric constants of the OCI C API.
//!
//! Values are lifted from the public Oracle headers. Only constants the crate actually passes to
//! or receives from the client library are declared here.

#![allow(dead_code)]

use super::types::{Sb2, Sb4, Sword, Ub1, Ub2, Ub4};

// Return codes

pub const OCI_SUCCESS: Sword = 0;
pub const OCI_SUCCESS_WITH_INFO: Sword = 1;
pub const OCI_NEED_DATA: Sword = 99;
pub const OCI_NO_DATA: Sword = 100;
pub const OCI_ERROR: Sword = -1;
pub const OCI_INVALID_HANDLE: Sword = -2;
pub const OCI_STILL_EXECUTING: Sword = -3123;
pub const OCI_CONTINUE: Sword = -24200;

// Handle types

pub const OCI_HTYPE_ENV: Ub4 = 1;
pub const OCI_HTYPE_ERROR: Ub4 = 2;
pub const OCI_HTYPE_SVCCTX: Ub4 = 3;
pub const OCI_HTYPE_STMT: Ub4 = 4;
pub const OCI_HTYPE_BIND: Ub4 = 5;
pub const OCI_HTYPE_DEFINE: Ub4 = 6;
pub const OCI_HTYPE_DESCRIBE: Ub4 = 7;
pub const OCI_HTYPE_SERVER: Ub4 = 8;
pub const OCI_HTYPE_SESSION: Ub4 = 9;
pub const OCI_HTYPE_AUTHINFO: Ub4 = OCI_HTYPE_SESSION;
pub const OCI_HTYPE_TRANS: Ub4 = 10;
pub const OCI_HTYPE_DIRPATH_CTX: Ub4 = 14;
pub const OCI_HTYPE_DIRPATH_COLUMN_ARRAY: Ub4 = 15;
pub const OCI_HTYPE_DIRPATH_STREAM: Ub4 = 16;
pub const OCI_HTYPE_SUBSCRIPTION: Ub4 = 13;
pub const OCI_HTYPE_CPOOL: Ub4 = 26;
pub const OCI_HTYPE_SPOOL: Ub4 = 27;

// Descriptor types

pub const OCI_DTYPE_LOB: Ub4 = 50;
pub const OCI_DTYPE_RSET: Ub4 = 52;
pub const OCI_DTYPE_PARAM: Ub4 = 53;
pub const OCI_DTYPE_ROWID: Ub4 = 54;
pub const OCI_DTYPE_FILE: Ub4 = 56;
pub const OCI_DTYPE_AQENQ_OPTIONS: Ub4 = 57;
pub const OCI_DTYPE_AQDEQ_OPTIONS: Ub4 = 58;
pub const OCI_DTYPE_AQMSG_PROPERTIES: Ub4 = 59;
pub const OCI_DTYPE_AQAGENT: Ub4 = 60;
pub const OCI_DTYPE_INTERVAL_YM: Ub4 = 62;
pub const OCI_DTYPE_INTERVAL_DS: Ub4 = 63;
pub const OCI_DTYPE_DATE: Ub4 = 65;
pub const OCI_DTYPE_TIMESTAMP: Ub4 = 68;
pub const OCI_DTYPE_TIMESTAMP_TZ: Ub4 = 69;
pub const OCI_DTYPE_TIMESTAMP_LTZ: Ub4 = 70;
pub const OCI_DTYPE_CHDES: Ub4 = 77;
pub const OCI_DTYPE_TABLE_CHDES: Ub4 = 78;
pub const OCI_DTYPE_ROW_CHDES: Ub4 = 79;
pub const OCI_DTYPE_VECTOR: Ub4 = 87;

// Environment modes

pub const OCI_DEFAULT: Ub4 = 0;
pub const OCI_THREADED: Ub4 = 0x0000_0001;
pub const OCI_OBJECT: Ub4 = 0x0000_0002;
pub const OCI_EVENTS: Ub4 = 0x0000_0004;
pub const OCI_NCHAR_LITERAL_REPLACE_ON: Ub4 = 0x0040_0000;

// Session modes / credentials

pub const OCI_CRED_RDBMS: Ub4 = 1;
pub const OCI_CRED_EXT: Ub4 = 2;
pub const OCI_SYSDBA: Ub4 = 0x0000_0002;
pub const OCI_SYSOPER: Ub4 = 0x0000_0004;
pub const OCI_PRELIM_AUTH: Ub4 = 0x0000_0008;
pub const OCI_CPOOL: Ub4 = 0x0200;
pub const OCI_SESSGET_SPOOL: Ub4 = 0x0001;
pub const OCI_SESSGET_CPOOL: Ub4 = OCI_CPOOL;
pub const OCI_SESSGET_STMTCACHE: Ub4 = 0x0004;
pub const OCI_SESSGET_SPOOL_MATCHANY: Ub4 = 0x0020;
pub const OCI_SESSRLS_DROPSESS: Ub4 = 0x0001;
pub const OCI_SESSRLS_RETAG: Ub4 = 0x0002;
pub const OCI_SPC_STMTCACHE: Ub4 = 0x0008;
pub const OCI_SPC_HOMOGENEOUS: Ub4 = 0x0001;

// Statement language and execution modes

pub const OCI_NTV_SYNTAX: Ub4 = 1;
pub const OCI_COMMIT_ON_SUCCESS: Ub4 = 0x0000_0020;
pub const OCI_DESCRIBE_ONLY: Ub4 = 0x0000_0010;
pub const OCI_PARSE_ONLY: Ub4 = 0x0000_0100;
pub const OCI_BATCH_ERRORS: Ub4 = 0x0000_0080;
pub const OCI_STMT_SCROLLABLE_READONLY: Ub4 = 0x08;
pub const OCI_DATA_AT_EXEC: Ub4 = 0x0000_0002;
pub const OCI_DYNAMIC_FETCH: Ub4 = 0x0000_0002;

// Statement type codes (OCI_ATTR_STMT_TYPE)

pub const OCI_STMT_UNKNOWN: Ub2 = 0;
pub const OCI_STMT_SELECT: Ub2 = 1;
pub const OCI_STMT_UPDATE: Ub2 = 2;
pub const OCI_STMT_DELETE: Ub2 = 3;
pub const OCI_STMT_INSERT: Ub2 = 4;
pub const OCI_STMT_CREATE: Ub2 = 5;
pub const OCI_STMT_DROP: Ub2 = 6;
pub const OCI_STMT_ALTER: Ub2 = 7;
pub const OCI_STMT_BEGIN: Ub2 = 8;
pub const OCI_STMT_DECLARE: Ub2 = 9;
pub const OCI_STMT_CALL: Ub2 = 10;
pub const OCI_STMT_MERGE: Ub2 = 16;

// Fetch orientations

pub const OCI_FETCH_CURRENT: Ub2 = 0x01;
pub const OCI_FETCH_NEXT: Ub2 = 0x02;
pub const OCI_FETCH_FIRST: Ub2 = 0x04;
pub const OCI_FETCH_LAST: Ub2 = 0x08;
pub const OCI_FETCH_PRIOR: Ub2 = 0x10;
pub const OCI_FETCH_ABSOLUTE: Ub2 = 0x20;
pub const OCI_FETCH_RELATIVE: Ub2 = 0x40;

// Piece codes

pub const OCI_ONE_PIECE: Ub1 = 0;
pub const OCI_FIRST_PIECE: Ub1 = 1;
pub const OCI_NEXT_PIECE: Ub1 = 2;
pub const OCI_LAST_PIECE: Ub1 = 3;

// Attributes

pub const OCI_ATTR_SERVER: Ub4 = 6;
pub const OCI_ATTR_SESSION: Ub4 = 7;
pub const OCI_ATTR_TRANS: Ub4 = 8;
pub const OCI_ATTR_ROW_COUNT: Ub4 = 9;
pub const OCI_ATTR_PREFETCH_ROWS: Ub4 = 11;
pub const OCI_ATTR_PREFETCH_MEMORY: Ub4 = 13;
pub const OCI_ATTR_PARAM_COUNT: Ub4 = 18;
pub const OCI_ATTR_USERNAME: Ub4 = 22;
pub const OCI_ATTR_PASSWORD: Ub4 = 23;
pub const OCI_ATTR_STMT_TYPE: Ub4 = 24;
pub const OCI_ATTR_XID: Ub4 = 27;
pub const OCI_ATTR_CHARSET_ID: Ub4 = 31;
pub const OCI_ATTR_CHARSET_FORM: Ub4 = 32;
pub const OCI_ATTR_LOBEMPTY: Ub4 = 45;
pub const OCI_ATTR_VISIBILITY: Ub4 = 47;
pub const OCI_ATTR_RELATIVE_MSGID: Ub4 = 48;
pub const OCI_ATTR_CONSUMER_NAME: Ub4 = 50;
pub const OCI_ATTR_DEQ_MODE: Ub4 = 51;
pub const OCI_ATTR_NAVIGATION: Ub4 = 52;
pub const OCI_ATTR_WAIT: Ub4 = 53;
pub const OCI_ATTR_DEQ_MSGID: Ub4 = 54;
pub const OCI_ATTR_PRIORITY: Ub4 = 55;
pub const OCI_ATTR_DELAY: Ub4 = 56;
pub const OCI_ATTR_EXPIRATION: Ub4 = 57;
pub const OCI_ATTR_CORRELATION: Ub4 = 58;
pub const OCI_ATTR_ATTEMPTS: Ub4 = 59;
pub const OCI_ATTR_EXCEPTION_QUEUE: Ub4 = 61;
pub const OCI_ATTR_ENQ_TIME: Ub4 = 62;
pub const OCI_ATTR_MSG_STATE: Ub4 = 63;
pub const OCI_ATTR_AGENT_NAME: Ub4 = 64;
pub const OCI_ATTR_AGENT_ADDRESS: Ub4 = 65;
pub const OCI_ATTR_NUM_DML_ERRORS: Ub4 = 73;
pub const OCI_ATTR_DML_ROW_OFFSET: Ub4 = 74;
pub const OCI_ATTR_DATEFORMAT: Ub4 = 75;
pub const OCI_ATTR_BUF_ADDR: Ub4 = 76;
pub const OCI_ATTR_BUF_SIZE: Ub4 = 77;
pub const OCI_ATTR_DIRPATH_NOLOG: Ub4 = 79;
pub const OCI_ATTR_DIRPATH_PARALLEL: Ub4 = 80;
pub const OCI_ATTR_NUM_ROWS: Ub4 = 81;
pub const OCI_ATTR_COL_COUNT: Ub4 = 82;
pub const OCI_ATTR_SUBSCR_NAME: Ub4 = 94;
pub const OCI_ATTR_SUBSCR_CALLBACK: Ub4 = 95;
pub const OCI_ATTR_SUBSCR_CTX: Ub4 = 96;
pub const OCI_ATTR_SUBSCR_NAMESPACE: Ub4 = 98;
pub const OCI_ATTR_NUM_COLS: Ub4 = 102;
pub const OCI_ATTR_LIST_COLUMNS: Ub4 = 103;
pub const OCI_ATTR_PARAM: Ub4 = 124;
pub const OCI_ATTR_PARSE_ERROR_OFFSET: Ub4 = 129;
pub const OCI_ATTR_SERVER_STATUS: Ub4 = 143;
pub const OCI_ATTR_CURRENT_POSITION: Ub4 = 164;
pub const OCI_ATTR_STMT_STATE: Ub4 = 182;
pub const OCI_ATTR_ROWS_FETCHED: Ub4 = 197;
pub const OCI_ATTR_TYPECODE: Ub4 = 216;
pub const OCI_ATTR_COLLECTION_TYPECODE: Ub4 = 217;
pub const OCI_ATTR_COLLECTION_ELEMENT: Ub4 = 227;
pub const OCI_ATTR_NUM_TYPE_ATTRS: Ub4 = 228;
pub const OCI_ATTR_LIST_TYPE_ATTRS: Ub4 = 229;
pub const OCI_ATTR_CHNF_OPERATIONS: Ub4 = 403;
pub const OCI_ATTR_CHDES_TABLE_CHANGES: Ub4 = 404;
pub const OCI_ATTR_CHDES_DBNAME: Ub4 = 405;
pub const OCI_ATTR_CHDES_NFYTYPE: Ub4 = 406;
pub const OCI_ATTR_CLIENT_IDENTIFIER: Ub4 = 278;
pub const OCI_ATTR_CHAR_USED: Ub4 = 285;
pub const OCI_ATTR_CHAR_SIZE: Ub4 = 286;
pub const OCI_ATTR_MODULE: Ub4 = 366;
pub const OCI_ATTR_ACTION: Ub4 = 367;
pub const OCI_ATTR_CLIENT_INFO: Ub4 = 368;
pub const OCI_ATTR_SUBSCR_PORTNO: Ub4 = 390;
pub const OCI_ATTR_CHNF_TABLENAMES: Ub4 = 401;
pub const OCI_ATTR_CHNF_ROWIDS: Ub4 = 402;
pub const OCI_ATTR_CHDES_TABLE_NAME: Ub4 = 407;
pub const OCI_ATTR_CHDES_TABLE_OPFLAGS: Ub4 = 408;
pub const OCI_ATTR_CHDES_ROW_ROWID: Ub4 = 409;
pub const OCI_ATTR_CHDES_ROW_OPFLAGS: Ub4 = 410;
pub const OCI_ATTR_CHDES_ROW_CHANGES: Ub4 = 411;
pub const OCI_ATTR_SUBSCR_TIMEOUT: Ub4 = 432;
pub const OCI_ATTR_DRIVER_NAME: Ub4 = 424;
pub const OCI_ATTR_LOBPREFETCH_LENGTH: Ub4 = 440;
pub const OCI_ATTR_DBOP: Ub4 = 485;
pub const OCI_ATTR_SPOOL_STMTCACHESIZE: Ub4 = 208;
pub const OCI_ATTR_VECTOR_DIMENSION: Ub4 = 682;
pub const OCI_ATTR_VECTOR_DATA_FORMAT: Ub4 = 683;

// Parameter (column) attributes, valid on OCI_DTYPE_PARAM

pub const OCI_ATTR_DATA_SIZE: Ub4 = 1;
pub const OCI_ATTR_DATA_TYPE: Ub4 = 2;
pub const OCI_ATTR_DISP_SIZE: Ub4 = 3;
pub const OCI_ATTR_NAME: Ub4 = 4;
pub const OCI_ATTR_PRECISION: Ub4 = 5;
pub const OCI_ATTR_SCALE: Ub4 = 6;
pub const OCI_ATTR_IS_NULL: Ub4 = 7;
pub const OCI_ATTR_TYPE_NAME: Ub4 = 8;
pub const OCI_ATTR_SCHEMA_NAME: Ub4 = 9;

// Describe targets

pub const OCI_OTYPE_NAME: Ub1 = 1;
pub const OCI_PTYPE_UNK: Ub1 = 0;
pub const OCI_PTYPE_TABLE: Ub1 = 1;
pub const OCI_PTYPE_VIEW: Ub1 = 2;
pub const OCI_PTYPE_TYPE: Ub1 = 6;
pub const OCI_PTYPE_SYN: Ub1 = 7;

// Transaction flags

pub const OCI_TRANS_NEW: Ub4 = 0x0000_0001;
pub const OCI_TRANS_JOIN: Ub4 = 0x0000_0002;
pub const OCI_TRANS_RESUME: Ub4 = 0x0000_0004;
pub const OCI_TRANS_READONLY: Ub4 = 0x0000_0100;
pub const OCI_TRANS_SERIALIZABLE: Ub4 = 0x0000_0400;
pub const OCI_TRANS_LOOSE: Ub4 = 0x0001_0000;
pub const OCI_TRANS_TWOPHASE: Ub4 = 0x0100_0000;

// SQL type codes (external datatypes)

pub const SQLT_CHR: Ub2 = 1;
pub const SQLT_NUM: Ub2 = 2;
pub const SQLT_INT: Ub2 = 3;
pub const SQLT_FLT: Ub2 = 4;
pub const SQLT_STR: Ub2 = 5;
pub const SQLT_VNU: Ub2 = 6;
pub const SQLT_LNG: Ub2 = 8;
pub const SQLT_VCS: Ub2 = 9;
pub const SQLT_RID: Ub2 = 11;
pub const SQLT_DAT: Ub2 = 12;
pub const SQLT_BFLOAT: Ub2 = 21;
pub const SQLT_BDOUBLE: Ub2 = 22;
pub const SQLT_BIN: Ub2 = 23;
pub const SQLT_LBI: Ub2 = 24;
pub const SQLT_UIN: Ub2 = 68;
pub const SQLT_LVC: Ub2 = 94;
pub const SQLT_LVB: Ub2 = 95;
pub const SQLT_AFC: Ub2 = 96;
pub const SQLT_AVC: Ub2 = 97;
pub const SQLT_IBFLOAT: Ub2 = 100;
pub const SQLT_IBDOUBLE: Ub2 = 101;
pub const SQLT_CUR: Ub2 = 102;
pub const SQLT_RDD: Ub2 = 104;
pub const SQLT_NTY: Ub2 = 108;
pub const SQLT_REF: Ub2 = 110;
pub const SQLT_CLOB: Ub2 = 112;
pub const SQLT_BLOB: Ub2 = 113;
pub const SQLT_BFILE: Ub2 = 114;
pub const SQLT_CFILE: Ub2 = 115;
pub const SQLT_RSET: Ub2 = 116;
pub const SQLT_VST: Ub2 = 155;
pub const SQLT_ODT: Ub2 = 156;
pub const SQLT_DATE: Ub2 = 184;
pub const SQLT_TIMESTAMP: Ub2 = 187;
pub const SQLT_TIMESTAMP_TZ: Ub2 = 188;
pub const SQLT_INTERVAL_YM: Ub2 = 189;
pub const SQLT_INTERVAL_DS: Ub2 = 190;
pub const SQLT_TIMESTAMP_LTZ: Ub2 = 232;
pub const SQLT_REC: Ub2 = 250;
pub const SQLT_BOL: Ub2 = 252;
pub const SQLT_VEC: Ub2 = 127;

// NULL indicator values

pub const OCI_IND_NOTNULL: Sb2 = 0;
pub const OCI_IND_NULL: Sb2 = -1;

// Charset forms and ids

pub const SQLCS_IMPLICIT: Ub1 = 1;
pub const SQLCS_NCHAR: Ub1 = 2;
pub const OCI_UTF16ID: Ub2 = 1000;

// LOB specifics

pub const OCI_TEMP_BLOB: Ub1 = 1;
pub const OCI_TEMP_CLOB: Ub1 = 2;
pub const OCI_LOB_READONLY: Ub1 = 1;
pub const OCI_LOB_READWRITE: Ub1 = 2;
pub const OCI_FILE_READONLY: Ub1 = 1;
pub const OCI_DURATION_SESSION: Ub2 = 10;
pub const OCI_DURATION_STATEMENT: Ub2 = 13;

// Number conversion flags

pub const OCI_NUMBER_UNSIGNED: u32 = 0;
pub const OCI_NUMBER_SIGNED: u32 = 2;
pub const OCI_NUMBER_SIZE: usize = 22;

// Object pin / free options

pub const OCI_PIN_DEFAULT: Ub4 = 2;
pub const OCI_PIN_ANY: Ub4 = 3;
pub const OCI_LOCK_NONE: Ub4 = 1;
pub const OCI_OBJECTFREE_FORCE: Ub2 = 0x0001;
pub const OCI_TYPEGET_ALL: Ub4 = 1;
pub const OCI_DURATION_SESSION_U4: Ub4 = 10;

// Advanced queuing

pub const OCI_DEQ_BROWSE: Ub4 = 1;
pub const OCI_DEQ_LOCKED: Ub4 = 2;
pub const OCI_DEQ_REMOVE: Ub4 = 3;
pub const OCI_DEQ_FIRST_MSG: Ub4 = 1;
pub const OCI_DEQ_NEXT_TRANSACTION: Ub4 = 2;
pub const OCI_DEQ_NEXT_MSG: Ub4 = 3;
pub const OCI_DEQ_NO_WAIT: Sb4 = 0;
pub const OCI_DEQ_WAIT_FOREVER: Sb4 = -1;
pub const OCI_ENQ_ON_COMMIT: Ub4 = 1;
pub const OCI_ENQ_IMMEDIATE: Ub4 = 2;
pub const OCI_MSG_READY: Ub4 = 0;
pub const OCI_MSG_WAITING: Ub4 = 1;
pub const OCI_MSG_PROCESSED: Ub4 = 2;
pub const OCI_MSG_EXPIRED: Ub4 = 3;

// Subscription namespaces and change notification opcodes

pub const OCI_SUBSCR_NAMESPACE_AQ: Ub4 = 1;
pub const OCI_SUBSCR_NAMESPACE_DBCHANGE: Ub4 = 2;
pub const OCI_SUBSCR_CQ_QOS_QUERY: Ub4 = 0x01;
pub const OCI_SUBSCR_QOS_ROWIDS: Ub4 = 0x01;
pub const OCI_OPCODE_ALLOPS: Ub4 = 0x0;
pub const OCI_OPCODE_ALLROWS: Ub4 = 0x1;
pub const OCI_OPCODE_INSERT: Ub4 = 0x2;
pub const OCI_OPCODE_UPDATE: Ub4 = 0x4;
pub const OCI_OPCODE_DELETE: Ub4 = 0x8;
pub const OCI_OPCODE_ALTER: Ub4 = 0x10;
pub const OCI_OPCODE_DROP: Ub4 = 0x20;
pub const OCI_EVENT_NONE: Ub4 = 0x0;
pub const OCI_EVENT_STARTUP: Ub4 = 0x1;
pub const OCI_EVENT_SHUTDOWN: Ub4 = 0x2;
pub const OCI_EVENT_SHUTDOWN_ANY: Ub4 = 0x3;
pub const OCI_EVENT_DEREG: Ub4 = 0x5;
pub const OCI_EVENT_OBJCHANGE: Ub4 = 0x6;
pub const OCI_EVENT_QUERYCHANGE: Ub4 = 0x7;

// Direct path

pub const OCI_DIRPATH_COL_COMPLETE: Ub1 = 0;
pub const OCI_DIRPATH_COL_NULL: Ub1 = 1;
pub const OCI_DIRPATH_COL_PARTIAL: Ub1 = 2;
pub const OCI_ATTR_DIRPATH_MODE: Ub4 = 78;
pub const OCI_ATTR_SCHEMA_NAME_DIRPATH: Ub4 = 9;

// Vector formats (23ai)

pub const OCI_VECTOR_FORMAT_FLOAT32: Ub1 = 2;
pub const OCI_VECTOR_FORMAT_FLOAT64: Ub1 = 3;
pub const OCI_VECTOR_FORMAT_INT8: Ub1 = 4;
pub const OCI_VECTOR_FORMAT_BINARY: Ub1 = 5;

// Oracle error codes with dedicated handling

pub const ORA_AQ_DEQUEUE_TIMEOUT: Sb4 = 25228;
pub const ORA_AQ_LISTEN_TIMEOUT: Sb4 = 25254;
pub const ORA_SUBSCRIPTION_UTF16_BUG: Sb4 = 24915;
