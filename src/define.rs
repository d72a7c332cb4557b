//! Column metadata and define buffers.
//!
//! During describe every column of a result set gets a [`ColumnDescription`] and a define
//! buffer sized for one fetch batch: a flat array for scalar columns, a descriptor array for
//! descriptor backed ones, and a dynamic (piecewise) define for LONG columns.

use std::{
    ffi::c_void,
    mem::size_of,
    ptr::null_mut,
};

use crate::{
    connection::Connection,
    error::{Error, SourceKind},
    handles::ExtSword,
    long::{Long, LongKind},
    oci::{
        constants::{
            OCI_ATTR_CHAR_SIZE, OCI_ATTR_CHAR_USED, OCI_ATTR_CHARSET_FORM, OCI_ATTR_DATA_SIZE,
            OCI_ATTR_DATA_TYPE, OCI_ATTR_IS_NULL, OCI_ATTR_LOBPREFETCH_LENGTH, OCI_ATTR_NAME,
            OCI_ATTR_PARAM_COUNT, OCI_ATTR_PRECISION, OCI_ATTR_SCALE, OCI_ATTR_SCHEMA_NAME,
            OCI_ATTR_TYPE_NAME, OCI_DEFAULT, OCI_DTYPE_FILE, OCI_DTYPE_INTERVAL_DS,
            OCI_DTYPE_INTERVAL_YM, OCI_DTYPE_LOB, OCI_DTYPE_PARAM, OCI_DTYPE_TIMESTAMP,
            OCI_DTYPE_TIMESTAMP_LTZ, OCI_DTYPE_TIMESTAMP_TZ, OCI_DTYPE_VECTOR, OCI_DYNAMIC_FETCH,
            OCI_HTYPE_DEFINE, OCI_HTYPE_STMT, SQLCS_NCHAR, SQLT_AFC, SQLT_AVC, SQLT_BDOUBLE,
            SQLT_BFILE, SQLT_BFLOAT, SQLT_BIN, SQLT_BLOB, SQLT_BOL, SQLT_CFILE, SQLT_CHR,
            SQLT_CLOB, SQLT_CUR, SQLT_DAT, SQLT_DATE, SQLT_FLT, SQLT_IBDOUBLE, SQLT_IBFLOAT,
            SQLT_INT, SQLT_INTERVAL_DS, SQLT_INTERVAL_YM, SQLT_LBI, SQLT_LNG, SQLT_NTY,
            SQLT_NUM, SQLT_ODT, SQLT_REF, SQLT_RSET, SQLT_STR, SQLT_TIMESTAMP,
            SQLT_TIMESTAMP_LTZ, SQLT_TIMESTAMP_TZ, SQLT_UIN, SQLT_VEC, SQLT_VNU,
        },
        types::{OciDefineHandle, OciParam, OciStmt, Sb1, Sb2, Ub1, Ub2, Ub4},
        Version,
    },
    text::{slice_to_cow_utf8, DbChar},
    types::timestamp::TimestampKind,
    types::interval::IntervalKind,
};

/// Flavour of a LOB column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Blob,
    Clob,
    NClob,
}

/// Flavour of a BFILE column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Binary,
    Character,
}

/// Internal category of a column, translated from the Oracle SQL type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Numeric,
    Text,
    Raw,
    Date,
    Timestamp(TimestampKind),
    Interval(IntervalKind),
    Lob(LobKind),
    File(FileKind),
    Long(LongKind),
    Cursor,
    Object,
    Reference,
    Boolean,
    Vector,
}

/// Metadata of one result set column.
#[derive(Debug, Clone)]
pub struct ColumnDescription {
    pub name: String,
    /// Oracle SQL type code as reported by describe.
    pub sql_code: Ub2,
    /// Translated internal category.
    pub kind: DataKind,
    pub precision: i16,
    pub scale: i8,
    /// Size in bytes.
    pub size: u32,
    /// Size in characters, if character length semantics apply.
    pub char_size: u32,
    pub char_used: bool,
    pub nullable: bool,
    pub charset_form: u8,
    /// Schema and name of the user defined type, for object and reference columns.
    pub type_schema: Option<String>,
    pub type_name: Option<String>,
}

impl ColumnDescription {
    /// Translates the Oracle SQL code (plus charset form) into the internal category.
    fn translate(sql_code: Ub2, charset_form: u8) -> DataKind {
        match sql_code {
            SQLT_NUM | SQLT_VNU | SQLT_INT | SQLT_UIN | SQLT_FLT | SQLT_BFLOAT | SQLT_BDOUBLE
            | SQLT_IBFLOAT | SQLT_IBDOUBLE => DataKind::Numeric,
            SQLT_CHR | SQLT_STR | SQLT_AFC | SQLT_AVC => DataKind::Text,
            SQLT_BIN => DataKind::Raw,
            SQLT_DAT | SQLT_ODT | SQLT_DATE => DataKind::Date,
            SQLT_TIMESTAMP => DataKind::Timestamp(TimestampKind::Plain),
            SQLT_TIMESTAMP_TZ => DataKind::Timestamp(TimestampKind::WithTimeZone),
            SQLT_TIMESTAMP_LTZ => DataKind::Timestamp(TimestampKind::WithLocalTimeZone),
            SQLT_INTERVAL_YM => DataKind::Interval(IntervalKind::YearToMonth),
            SQLT_INTERVAL_DS => DataKind::Interval(IntervalKind::DayToSecond),
            SQLT_CLOB if charset_form == SQLCS_NCHAR => DataKind::Lob(LobKind::NClob),
            SQLT_CLOB => DataKind::Lob(LobKind::Clob),
            SQLT_BLOB => DataKind::Lob(LobKind::Blob),
            SQLT_BFILE => DataKind::File(FileKind::Binary),
            SQLT_CFILE => DataKind::File(FileKind::Character),
            SQLT_LNG => DataKind::Long(LongKind::Text),
            SQLT_LBI => DataKind::Long(LongKind::Binary),
            SQLT_RSET | SQLT_CUR => DataKind::Cursor,
            SQLT_NTY => DataKind::Object,
            SQLT_REF => DataKind::Reference,
            SQLT_BOL => DataKind::Boolean,
            SQLT_VEC => DataKind::Vector,
            _ => DataKind::Raw,
        }
    }

    /// Descriptor type backing this column, if it is descriptor based.
    pub(crate) fn descriptor_type(&self) -> Option<Ub4> {
        match self.kind {
            DataKind::Timestamp(TimestampKind::Plain) => Some(OCI_DTYPE_TIMESTAMP),
            DataKind::Timestamp(TimestampKind::WithTimeZone) => Some(OCI_DTYPE_TIMESTAMP_TZ),
            DataKind::Timestamp(TimestampKind::WithLocalTimeZone) => {
                Some(OCI_DTYPE_TIMESTAMP_LTZ)
            }
            DataKind::Interval(IntervalKind::YearToMonth) => Some(OCI_DTYPE_INTERVAL_YM),
            DataKind::Interval(IntervalKind::DayToSecond) => Some(OCI_DTYPE_INTERVAL_DS),
            DataKind::Lob(_) => Some(OCI_DTYPE_LOB),
            DataKind::File(_) => Some(OCI_DTYPE_FILE),
            DataKind::Vector => Some(OCI_DTYPE_VECTOR),
            _ => None,
        }
    }
}

/// Reads the column descriptions of an executed or described statement.
pub(crate) fn describe_columns(
    conn: &Connection<'_>,
    stmt: *mut OciStmt,
    sql: &str,
) -> Result<Vec<ColumnDescription>, Error> {
    let oci = conn.environment().oci();
    let errhp = conn.err_ptr();

    let mut count: Ub4 = 0;
    let status = unsafe {
        (oci.attr_get)(
            stmt as *const c_void,
            OCI_HTYPE_STMT,
            &mut count as *mut Ub4 as *mut c_void,
            null_mut(),
            OCI_ATTR_PARAM_COUNT,
            errhp,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCIAttrGet(column count)"),
        SourceKind::ResultSet,
        sql,
        "describe",
    )?;

    let mut columns = Vec::with_capacity(count as usize);
    for position in 1..=count {
        let mut param: *mut c_void = null_mut();
        let status = unsafe {
            (oci.param_get)(
                stmt as *const c_void,
                OCI_HTYPE_STMT,
                errhp,
                &mut param,
                position,
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIParamGet"),
            SourceKind::ResultSet,
            sql,
            "describe",
        )?;
        let param = param as *mut OciParam;
        let column = read_column_description(conn, param, sql);
        unsafe {
            (oci.descriptor_free)(param as *mut c_void, OCI_DTYPE_PARAM);
        }
        columns.push(column?);
    }
    Ok(columns)
}

pub(crate) fn read_column_description(
    conn: &Connection<'_>,
    param: *mut OciParam,
    sql: &str,
) -> Result<ColumnDescription, Error> {
    let sql_code: Ub2 = param_attr(conn, param, OCI_ATTR_DATA_TYPE, sql)?;
    let size: Ub2 = param_attr(conn, param, OCI_ATTR_DATA_SIZE, sql)?;
    let precision: Sb2 = param_attr(conn, param, OCI_ATTR_PRECISION, sql)?;
    let scale: Sb1 = param_attr(conn, param, OCI_ATTR_SCALE, sql)?;
    let nullable: Ub1 = param_attr(conn, param, OCI_ATTR_IS_NULL, sql)?;
    let charset_form: Ub1 = param_attr(conn, param, OCI_ATTR_CHARSET_FORM, sql).unwrap_or(0);
    let char_used: Ub1 = param_attr(conn, param, OCI_ATTR_CHAR_USED, sql).unwrap_or(0);
    let char_size: Ub2 = param_attr(conn, param, OCI_ATTR_CHAR_SIZE, sql).unwrap_or(0);
    let name = param_text_attr(conn, param, OCI_ATTR_NAME, sql)?;

    let kind = ColumnDescription::translate(sql_code, charset_form);
    let (type_schema, type_name) = if matches!(kind, DataKind::Object | DataKind::Reference) {
        (
            param_text_attr(conn, param, OCI_ATTR_SCHEMA_NAME, sql).ok(),
            param_text_attr(conn, param, OCI_ATTR_TYPE_NAME, sql).ok(),
        )
    } else {
        (None, None)
    };

    Ok(ColumnDescription {
        name,
        sql_code,
        kind,
        precision,
        scale,
        size: size as u32,
        char_size: char_size as u32,
        char_used: char_used != 0,
        nullable: nullable != 0,
        charset_form,
        type_schema,
        type_name,
    })
}

fn param_attr<T: Default>(
    conn: &Connection<'_>,
    param: *mut OciParam,
    attribute: Ub4,
    sql: &str,
) -> Result<T, Error> {
    let oci = conn.environment().oci();
    let mut value = T::default();
    let status = unsafe {
        (oci.attr_get)(
            param as *const c_void,
            OCI_DTYPE_PARAM,
            &mut value as *mut T as *mut c_void,
            null_mut(),
            attribute,
            conn.err_ptr(),
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCIAttrGet(column attribute)"),
        SourceKind::ResultSet,
        sql,
        "describe",
    )
    .map(|()| value)
}

fn param_text_attr(
    conn: &Connection<'_>,
    param: *mut OciParam,
    attribute: Ub4,
    sql: &str,
) -> Result<String, Error> {
    let oci = conn.environment().oci();
    let mut text_ptr: *mut DbChar = null_mut();
    let mut text_len: Ub4 = 0;
    let status = unsafe {
        (oci.attr_get)(
            param as *const c_void,
            OCI_DTYPE_PARAM,
            &mut text_ptr as *mut *mut DbChar as *mut c_void,
            &mut text_len,
            attribute,
            conn.err_ptr(),
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCIAttrGet(column name)"),
        SourceKind::ResultSet,
        sql,
        "describe",
    )?;
    if text_ptr.is_null() {
        return Ok(String::new());
    }
    // Length is reported in bytes; the buffer is owned by the parameter descriptor.
    let units = text_len as usize / size_of::<DbChar>();
    let slice = unsafe { std::slice::from_raw_parts(text_ptr, units) };
    Ok(slice_to_cow_utf8(slice).into_owned())
}

/// Length array of a define; LONG columns use a four byte stride, everything else two bytes.
pub(crate) enum LengthArray {
    U16(Vec<Ub2>),
    U32(Vec<Ub4>),
}

impl LengthArray {
    pub(crate) fn get(&self, index: usize) -> usize {
        match self {
            LengthArray::U16(values) => values[index] as usize,
            LengthArray::U32(values) => values[index] as usize,
        }
    }
}

/// Define buffer of one column, sized for one fetch batch.
pub(crate) enum DefineBuffer {
    /// Flat array with a fixed stride per row: numerics (as `OCINumber`), text, raw, dates,
    /// booleans.
    Bytes { data: Vec<u8>, elem_size: usize },
    /// Array of descriptors: LOBs, files, timestamps, intervals, vectors.
    Descriptors { ptrs: Vec<*mut c_void>, dtype: Ub4 },
    /// Array of statement handles for cursor columns.
    Cursors { ptrs: Vec<*mut OciStmt> },
    /// Dynamic define collecting LONG pieces; batch size is forced to one row.
    Long(Box<LongFetchState>),
}

/// Callback context of a dynamic LONG define.
pub(crate) struct LongFetchState {
    pub long: Long,
    pub piece_size: usize,
    pub max_size: usize,
    /// Piece byte count as written back by the client.
    pub piece_len: Ub4,
    pub indicator: Sb2,
    pub return_code: Ub2,
}

impl LongFetchState {
    /// Folds the piece left in flight once the fetch call returned.
    pub(crate) fn finish_row(&mut self) {
        let actual = self.piece_len as usize;
        self.long.commit_piece(actual);
        self.piece_len = 0;
    }

    /// Clears the buffer before the next row is fetched.
    pub(crate) fn reset_row(&mut self) {
        self.long.reset();
        self.piece_len = 0;
    }
}

/// One column's define: description, buffers, indicators and lengths.
pub(crate) struct Define {
    pub column: ColumnDescription,
    pub buffer: DefineBuffer,
    pub indicators: Vec<Sb2>,
    pub lengths: LengthArray,
    /// Object columns: one pointer per row to the client side indicator struct. NULL-ness of
    /// the whole instance is its leading atomic indicator.
    pub object_indicators: Vec<*mut c_void>,
    pub defnp: *mut OciDefineHandle,
}

impl Define {
    pub(crate) fn is_null(&self, row: usize) -> bool {
        if !self.object_indicators.is_empty() {
            let ind = self.object_indicators[row] as *const Sb2;
            return ind.is_null()
                || unsafe { *ind } == crate::oci::constants::OCI_IND_NULL;
        }
        self.indicators[row] == crate::oci::constants::OCI_IND_NULL
    }
}

/// Allocates the define buffers for `columns` and issues the `OCIDefineByPos` calls.
///
/// `batch_rows` is the number of rows fetched per round trip; the caller must force it to one
/// if any LONG column is present.
pub(crate) fn allocate_defines(
    conn: &Connection<'_>,
    stmt: *mut OciStmt,
    sql: &str,
    columns: Vec<ColumnDescription>,
    batch_rows: usize,
    long_max_size: usize,
    piece_size: usize,
) -> Result<Vec<Define>, Error> {
    let env = conn.environment();
    let oci = env.oci();
    let mut defines = Vec::with_capacity(columns.len());

    for (index, column) in columns.into_iter().enumerate() {
        let position = index as u32 + 1;
        let mut lengths = LengthArray::U16(vec![0; batch_rows]);
        let (mut buffer, sqlt, elem_size) = match column.kind {
            DataKind::Numeric => (
                DefineBuffer::Bytes {
                    data: vec![0; size_of::<crate::oci::types::OciNumber>() * batch_rows],
                    elem_size: size_of::<crate::oci::types::OciNumber>(),
                },
                SQLT_VNU,
                size_of::<crate::oci::types::OciNumber>(),
            ),
            DataKind::Text => {
                let chars = if column.char_used && column.char_size > 0 {
                    column.char_size as usize
                } else {
                    column.size as usize
                };
                let elem_size = (chars + 1) * size_of::<DbChar>();
                (
                    DefineBuffer::Bytes {
                        data: vec![0; elem_size * batch_rows],
                        elem_size,
                    },
                    SQLT_STR,
                    elem_size,
                )
            }
            DataKind::Raw => {
                let elem_size = column.size as usize;
                (
                    DefineBuffer::Bytes {
                        data: vec![0; elem_size.max(1) * batch_rows],
                        elem_size: elem_size.max(1),
                    },
                    SQLT_BIN,
                    elem_size.max(1),
                )
            }
            DataKind::Date => (
                DefineBuffer::Bytes {
                    data: vec![0; size_of::<crate::oci::types::OciDate>() * batch_rows],
                    elem_size: size_of::<crate::oci::types::OciDate>(),
                },
                SQLT_ODT,
                size_of::<crate::oci::types::OciDate>(),
            ),
            DataKind::Boolean => (
                DefineBuffer::Bytes {
                    data: vec![0; size_of::<i32>() * batch_rows],
                    elem_size: size_of::<i32>(),
                },
                SQLT_BOL,
                size_of::<i32>(),
            ),
            DataKind::Timestamp(_)
            | DataKind::Interval(_)
            | DataKind::Lob(_)
            | DataKind::File(_)
            | DataKind::Vector => {
                let dtype = column.descriptor_type().unwrap();
                let ptrs = env.counters().alloc_descriptor_array(
                    oci,
                    env.env_ptr() as *const c_void,
                    dtype,
                    batch_rows as u32,
                )?;
                (
                    DefineBuffer::Descriptors { ptrs, dtype },
                    column.sql_code,
                    size_of::<*mut c_void>(),
                )
            }
            DataKind::Cursor => {
                let mut ptrs = Vec::with_capacity(batch_rows);
                for _ in 0..batch_rows {
                    let handle = env.counters().alloc_handle(
                        oci,
                        env.env_ptr() as *const c_void,
                        OCI_HTYPE_STMT,
                    )? as *mut OciStmt;
                    ptrs.push(handle);
                }
                (
                    DefineBuffer::Cursors { ptrs },
                    SQLT_RSET,
                    size_of::<*mut c_void>(),
                )
            }
            DataKind::Long(kind) => {
                lengths = LengthArray::U32(vec![0; batch_rows]);
                let state = Box::new(LongFetchState {
                    long: Long::new(kind, env.nls_utf8()),
                    piece_size,
                    max_size: long_max_size,
                    piece_len: 0,
                    indicator: 0,
                    return_code: 0,
                });
                (
                    DefineBuffer::Long(state),
                    if kind == LongKind::Binary { SQLT_LBI } else { SQLT_LNG },
                    long_max_size,
                )
            }
            DataKind::Object | DataKind::Reference => (
                // Instance pointers stay null; the client allocates the instances in its object
                // cache during fetch. They are released with the cache when the connection
                // closes.
                DefineBuffer::Descriptors {
                    ptrs: vec![null_mut(); batch_rows],
                    dtype: 0,
                },
                column.sql_code,
                0,
            ),
        };

        let is_long = matches!(buffer, DefineBuffer::Long(_));
        let is_object = matches!(column.kind, DataKind::Object | DataKind::Reference);
        let mut object_indicators: Vec<*mut c_void> =
            if is_object { vec![null_mut(); batch_rows] } else { Vec::new() };
        let mut indicators = vec![0 as Sb2; batch_rows];
        let mut defnp: *mut OciDefineHandle = null_mut();
        let value_ptr = match &mut buffer {
            DefineBuffer::Bytes { data, .. } => data.as_mut_ptr() as *mut c_void,
            DefineBuffer::Descriptors { ptrs, .. } => ptrs.as_mut_ptr() as *mut c_void,
            DefineBuffer::Cursors { ptrs } => ptrs.as_mut_ptr() as *mut c_void,
            DefineBuffer::Long(_) => null_mut(),
        };
        let len_ptr = match &mut lengths {
            LengthArray::U16(values) => values.as_mut_ptr() as *mut Ub2,
            LengthArray::U32(_) => null_mut(),
        };
        let mode = if is_long { OCI_DYNAMIC_FETCH } else { OCI_DEFAULT };

        let status = unsafe {
            (oci.define_by_pos)(
                stmt,
                &mut defnp,
                conn.err_ptr(),
                position,
                value_ptr,
                elem_size as i32,
                sqlt,
                indicators.as_mut_ptr() as *mut c_void,
                len_ptr,
                null_mut(),
                mode,
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIDefineByPos"),
            SourceKind::ResultSet,
            sql,
            "define",
        )?;

        if is_object {
            // Wire the type descriptor and the per-row instance and indicator pointer arrays.
            let type_name = column.type_name.clone().unwrap_or_default();
            let type_schema = column.type_schema.clone().unwrap_or_default();
            let tdo = crate::type_info::resolve_tdo(conn, &type_schema, &type_name)?;
            let instance_ptrs = match &mut buffer {
                DefineBuffer::Descriptors { ptrs, .. } => ptrs.as_mut_ptr(),
                _ => unreachable!(),
            };
            let status = unsafe {
                (oci.define_object)(
                    defnp,
                    conn.err_ptr(),
                    tdo,
                    instance_ptrs,
                    null_mut(),
                    object_indicators.as_mut_ptr(),
                    null_mut(),
                )
            };
            conn.resolve_for(
                status.into_oci_result("OCIDefineObject"),
                SourceKind::ResultSet,
                sql,
                "define",
            )?;
        }

        if is_long {
            let state_ptr = match &mut buffer {
                DefineBuffer::Long(state) => state.as_mut() as *mut LongFetchState,
                _ => unreachable!(),
            };
            let status = unsafe {
                (oci.define_dynamic)(
                    defnp,
                    conn.err_ptr(),
                    state_ptr as *mut c_void,
                    Some(define_dynamic_callback),
                )
            };
            conn.resolve_for(
                status.into_oci_result("OCIDefineDynamic"),
                SourceKind::ResultSet,
                sql,
                "define",
            )?;
        }

        // 11g and later can report LOB lengths along with the locators, sparing a round trip
        // per value. The attribute is a one byte toggle on the define handle.
        if matches!(column.kind, DataKind::Lob(_))
            && env.runtime_version() >= Version::V11_1
        {
            let mut enabled: Ub1 = 1;
            let status = unsafe {
                (oci.attr_set)(
                    defnp as *mut c_void,
                    OCI_HTYPE_DEFINE,
                    &mut enabled as *mut Ub1 as *mut c_void,
                    size_of::<Ub1>() as u32,
                    OCI_ATTR_LOBPREFETCH_LENGTH,
                    conn.err_ptr(),
                )
            };
            // Prefetch is an optimization; a client refusing it is not an error.
            if status.into_oci_result("OCIAttrSet(lob prefetch)").is_err() {
                log::debug!("LOB length prefetch not accepted for column {}", column.name);
            }
        }

        defines.push(Define {
            column,
            buffer,
            indicators,
            lengths,
            object_indicators,
            defnp,
        });
    }
    Ok(defines)
}

/// Frees the vendor resources held by define buffers. Called when the result set goes away.
pub(crate) fn release_defines(conn: &Connection<'_>, defines: &mut [Define]) {
    let env = conn.environment();
    let oci = env.oci();
    for define in defines {
        match &mut define.buffer {
            DefineBuffer::Descriptors { ptrs, dtype } if *dtype != 0 => unsafe {
                env.counters().free_descriptor_array(oci, ptrs, *dtype);
            },
            DefineBuffer::Cursors { ptrs } => {
                for &mut ptr in ptrs {
                    unsafe {
                        env.counters()
                            .free_handle(oci, ptr as *mut c_void, OCI_HTYPE_STMT);
                    }
                }
            }
            _ => (),
        }
    }
}

/// Callback the client drives a dynamic LONG define through: one invocation per piece.
pub(crate) unsafe extern "C" fn define_dynamic_callback(
    octxp: *mut c_void,
    _defnp: *mut OciDefineHandle,
    _iter: Ub4,
    bufpp: *mut *mut c_void,
    alenpp: *mut *mut Ub4,
    piecep: *mut Ub1,
    indpp: *mut *mut c_void,
    rcodep: *mut *mut Ub2,
) -> i32 {
    let state = unsafe { &mut *(octxp as *mut LongFetchState) };
    // Fold the piece the client finished before handing out the next window.
    if state.piece_len > 0 {
        let actual = state.piece_len as usize;
        state.long.commit_piece(actual);
    }
    let remaining = state.max_size.saturating_sub(state.long.as_bytes().len());
    let len = state.piece_size.min(remaining.max(1));
    let target = state.long.reserve_piece(len);
    state.piece_len = len as Ub4;
    unsafe {
        *bufpp = target as *mut c_void;
        *alenpp = &mut state.piece_len;
        *piecep = crate::oci::constants::OCI_NEXT_PIECE;
        *indpp = &mut state.indicator as *mut Sb2 as *mut c_void;
        *rcodep = &mut state.return_code;
    }
    crate::oci::constants::OCI_CONTINUE
}

#[cfg(test)]
mod tests {
    use super::{ColumnDescription, DataKind, LobKind};
    use crate::{
        long::LongKind,
        oci::constants::{
            SQLCS_IMPLICIT, SQLCS_NCHAR, SQLT_BLOB, SQLT_CHR, SQLT_CLOB, SQLT_LBI, SQLT_LNG,
            SQLT_NUM, SQLT_TIMESTAMP_TZ,
        },
        types::timestamp::TimestampKind,
    };

    #[test]
    fn sql_codes_translate_to_internal_categories() {
        assert_eq!(
            DataKind::Numeric,
            ColumnDescription::translate(SQLT_NUM, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Text,
            ColumnDescription::translate(SQLT_CHR, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Lob(LobKind::Clob),
            ColumnDescription::translate(SQLT_CLOB, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Lob(LobKind::NClob),
            ColumnDescription::translate(SQLT_CLOB, SQLCS_NCHAR)
        );
        assert_eq!(
            DataKind::Lob(LobKind::Blob),
            ColumnDescription::translate(SQLT_BLOB, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Timestamp(TimestampKind::WithTimeZone),
            ColumnDescription::translate(SQLT_TIMESTAMP_TZ, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Long(LongKind::Text),
            ColumnDescription::translate(SQLT_LNG, SQLCS_IMPLICIT)
        );
        assert_eq!(
            DataKind::Long(LongKind::Binary),
            ColumnDescription::translate(SQLT_LBI, SQLCS_IMPLICIT)
        );
    }
}
