//! Direct path loading: bulk writes bypassing the SQL layer.

use std::{ffi::c_void, ptr::null_mut};

use crate::{
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_BUF_SIZE, OCI_ATTR_DATA_SIZE, OCI_ATTR_DATA_TYPE, OCI_ATTR_DATEFORMAT,
            OCI_ATTR_LIST_COLUMNS, OCI_ATTR_NAME, OCI_ATTR_NUM_COLS, OCI_ATTR_NUM_ROWS,
            OCI_ATTR_ROW_COUNT, OCI_ATTR_SCHEMA_NAME, OCI_CONTINUE,
            OCI_DIRPATH_COL_COMPLETE, OCI_DIRPATH_COL_NULL, OCI_DTYPE_PARAM, OCI_ERROR,
            OCI_HTYPE_DIRPATH_COLUMN_ARRAY, OCI_HTYPE_DIRPATH_CTX, OCI_HTYPE_DIRPATH_STREAM,
            OCI_NEED_DATA, OCI_NO_DATA, OCI_SUCCESS, OCI_SUCCESS_WITH_INFO, SQLT_CHR,
        },
        types::{OciDirPathColArray, OciDirPathCtx, OciDirPathStream, Ub2, Ub4},
    },
    text::DbText,
    type_info::TypeInfo,
};

/// Loader state machine. Operations are only valid in the states the methods document;
/// violations report [`Error::DirectPathState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirPathState {
    NotPrepared,
    Prepared,
    Converted,
    Terminated,
}

/// Outcome of a convert or load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirPathResult {
    /// Every row of the batch went through.
    Completed,
    /// Some rows erred; their 0-based offsets within the batch are listed.
    Partial { error_rows: Vec<u32> },
    /// The stream is unusable; abort the load.
    Fatal,
}

struct DirPathColumn {
    name: String,
    max_size: u32,
    /// Conversion format, e.g. a date format for date columns.
    format: Option<String>,
}

/// A direct path load into one table.
///
/// Lifecycle: configure columns, [`Self::prepare`], then per batch [`Self::set_entry`] +
/// [`Self::convert`] + [`Self::load`], and finally [`Self::finish`] or [`Self::abort`].
pub struct DirPath<'conn, 'env> {
    conn: &'conn Connection<'env>,
    ctx: *mut OciDirPathCtx,
    col_array: *mut OciDirPathColArray,
    stream: *mut OciDirPathStream,
    state: DirPathState,
    table: String,
    schema: String,
    columns: Vec<DirPathColumn>,
    /// Maximum rows per batch.
    max_rows: u32,
    /// Rows filled into the column array since the last convert.
    pending_rows: u32,
    converted_rows: u64,
    loaded_rows: u64,
}

impl<'conn, 'env> DirPath<'conn, 'env> {
    /// Creates a loader for the table described by `type_info`, with batches of up to
    /// `max_rows` rows.
    pub fn new(
        conn: &'conn Connection<'env>,
        type_info: &TypeInfo,
        max_rows: u32,
    ) -> Result<Self, Error> {
        conn.ensure_usable("direct_path")?;
        let env = conn.environment();
        let oci = env.oci();
        if oci.dir_path_prepare.is_none() {
            let error = Error::NotAvailable {
                feature: Feature::DirectPathLoading,
            };
            env.raise(&error, SourceKind::DirectPath, type_info.name(), None, "direct_path");
            return Err(error);
        }
        if max_rows == 0 {
            let error = Error::OutOfRange {
                argument: "max_rows",
            };
            env.raise(&error, SourceKind::DirectPath, type_info.name(), None, "direct_path");
            return Err(error);
        }

        let ctx = env.counters().alloc_handle(
            oci,
            env.env_ptr() as *const c_void,
            OCI_HTYPE_DIRPATH_CTX,
        )? as *mut OciDirPathCtx;

        Ok(DirPath {
            conn,
            ctx,
            col_array: null_mut(),
            stream: null_mut(),
            state: DirPathState::NotPrepared,
            table: type_info.name().to_string(),
            schema: type_info.schema().to_string(),
            columns: Vec::new(),
            max_rows,
            pending_rows: 0,
            converted_rows: 0,
            loaded_rows: 0,
        })
    }

    /// Declares the next column to load, in table column order. `format` carries a conversion
    /// format (e.g. a date picture) where the column needs one.
    pub fn add_column(
        &mut self,
        name: &str,
        max_size: u32,
        format: Option<&str>,
    ) -> Result<(), Error> {
        self.expect_state(DirPathState::NotPrepared, "add_column")?;
        self.columns.push(DirPathColumn {
            name: name.to_string(),
            max_size,
            format: format.map(str::to_string),
        });
        Ok(())
    }

    pub fn state(&self) -> DirPathState {
        self.state
    }

    /// Rows converted over the whole load.
    pub fn converted_rows(&self) -> u64 {
        self.converted_rows
    }

    /// Rows shipped to the server over the whole load.
    pub fn loaded_rows(&self) -> u64 {
        self.loaded_rows
    }

    /// Fixes the column layout and allocates the column array and stream. Transition
    /// `NotPrepared -> Prepared`.
    pub fn prepare(&mut self) -> Result<(), Error> {
        self.expect_state(DirPathState::NotPrepared, "prepare")?;
        if self.columns.is_empty() {
            let error = Error::DirectPathState {
                operation: "prepare without columns",
            };
            self.raise(&error, "prepare");
            return Err(error);
        }
        let env = self.conn.environment();
        let oci = env.oci();
        let errhp = self.conn.err_ptr();

        self.set_ctx_text_attr(OCI_ATTR_NAME, &self.table.clone(), "prepare")?;
        if !self.schema.is_empty() {
            self.set_ctx_text_attr(OCI_ATTR_SCHEMA_NAME, &self.schema.clone(), "prepare")?;
        }
        let mut num_cols = self.columns.len() as Ub2;
        let status = unsafe {
            (oci.attr_set)(
                self.ctx as *mut c_void,
                OCI_HTYPE_DIRPATH_CTX,
                &mut num_cols as *mut Ub2 as *mut c_void,
                std::mem::size_of::<Ub2>() as u32,
                OCI_ATTR_NUM_COLS,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(column count)", "prepare")?;
        let mut num_rows = self.max_rows;
        let status = unsafe {
            (oci.attr_set)(
                self.ctx as *mut c_void,
                OCI_HTYPE_DIRPATH_CTX,
                &mut num_rows as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                OCI_ATTR_NUM_ROWS,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(row count)", "prepare")?;

        // Describe each column to the loader through the context's column list parameters.
        let mut columns_list: *mut c_void = null_mut();
        let status = unsafe {
            (oci.attr_get)(
                self.ctx as *const c_void,
                OCI_HTYPE_DIRPATH_CTX,
                &mut columns_list as *mut *mut c_void as *mut c_void,
                null_mut(),
                OCI_ATTR_LIST_COLUMNS,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrGet(column list)", "prepare")?;
        for (index, column) in self.columns.iter().enumerate() {
            let mut param: *mut c_void = null_mut();
            let status = unsafe {
                (oci.param_get)(
                    columns_list as *const c_void,
                    OCI_DTYPE_PARAM,
                    errhp,
                    &mut param,
                    index as Ub4 + 1,
                )
            };
            self.conn.resolve_for(
                status.into_oci_result("OCIParamGet(direct path column)"),
                SourceKind::DirectPath,
                &self.table,
                "prepare",
            )?;

            let name = DbText::new(&column.name);
            let status = unsafe {
                (oci.attr_set)(
                    param,
                    OCI_DTYPE_PARAM,
                    name.ptr() as *mut c_void,
                    name.len_bytes() as u32,
                    OCI_ATTR_NAME,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(column name)", "prepare")?;
            // Entries arrive as text and are converted server side; external type is CHR.
            let mut data_type: Ub2 = SQLT_CHR;
            let status = unsafe {
                (oci.attr_set)(
                    param,
                    OCI_DTYPE_PARAM,
                    &mut data_type as *mut Ub2 as *mut c_void,
                    std::mem::size_of::<Ub2>() as u32,
                    OCI_ATTR_DATA_TYPE,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(column type)", "prepare")?;
            let mut size = column.max_size;
            let status = unsafe {
                (oci.attr_set)(
                    param,
                    OCI_DTYPE_PARAM,
                    &mut size as *mut Ub4 as *mut c_void,
                    std::mem::size_of::<Ub4>() as u32,
                    OCI_ATTR_DATA_SIZE,
                    errhp,
                )
            };
            self.resolve(status, "OCIAttrSet(column size)", "prepare")?;
            if let Some(format) = &column.format {
                let format_text = DbText::new(format);
                let status = unsafe {
                    (oci.attr_set)(
                        param,
                        OCI_DTYPE_PARAM,
                        format_text.ptr() as *mut c_void,
                        format_text.len_bytes() as u32,
                        OCI_ATTR_DATEFORMAT,
                        errhp,
                    )
                };
                self.resolve(status, "OCIAttrSet(column format)", "prepare")?;
            }
        }

        // Bigger stream buffers keep round trips down; sized generously relative to the batch.
        let mut buffer_size: Ub4 = 64 * 1024;
        let status = unsafe {
            (oci.attr_set)(
                self.ctx as *mut c_void,
                OCI_HTYPE_DIRPATH_CTX,
                &mut buffer_size as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                OCI_ATTR_BUF_SIZE,
                errhp,
            )
        };
        self.resolve(status, "OCIAttrSet(buffer size)", "prepare")?;

        let prepare = oci.dir_path_prepare.unwrap();
        let status = unsafe { prepare(self.ctx, self.conn.svc_ptr(), errhp) };
        self.resolve(status, "OCIDirPathPrepare", "prepare")?;

        // Column array and stream are children of the prepared context.
        self.col_array = env.counters().alloc_handle(
            oci,
            self.ctx as *const c_void,
            OCI_HTYPE_DIRPATH_COLUMN_ARRAY,
        )? as *mut OciDirPathColArray;
        self.stream = env.counters().alloc_handle(
            oci,
            self.ctx as *const c_void,
            OCI_HTYPE_DIRPATH_STREAM,
        )? as *mut OciDirPathStream;

        self.state = DirPathState::Prepared;
        Ok(())
    }

    /// Fills one cell of the batch. `row` and `column` are 0-based; `value` is the textual
    /// representation, `None` loads NULL. Valid in `Prepared`.
    pub fn set_entry(
        &mut self,
        row: u32,
        column: u16,
        value: Option<&[u8]>,
    ) -> Result<(), Error> {
        self.expect_state(DirPathState::Prepared, "set_entry")?;
        if row >= self.max_rows || column as usize >= self.columns.len() {
            let error = Error::OutOfRange {
                argument: "direct path entry position",
            };
            self.raise(&error, "set_entry");
            return Err(error);
        }
        let entry_set = self.require_fn(self.conn.environment().oci().dir_path_col_array_entry_set)?;
        let (ptr, len, flag) = match value {
            Some(value) => (
                value.as_ptr() as *mut u8,
                value.len() as Ub4,
                OCI_DIRPATH_COL_COMPLETE,
            ),
            None => (null_mut(), 0, OCI_DIRPATH_COL_NULL),
        };
        let status = unsafe {
            entry_set(
                self.col_array,
                self.conn.err_ptr(),
                row,
                column,
                ptr,
                len,
                flag,
            )
        };
        self.resolve(status, "OCIDirPathColArrayEntrySet", "set_entry")?;
        self.pending_rows = self.pending_rows.max(row + 1);
        Ok(())
    }

    /// Converts the filled batch into stream format. Transition `Prepared -> Converted`.
    pub fn convert(&mut self) -> Result<DirPathResult, Error> {
        self.expect_state(DirPathState::Prepared, "convert")?;
        let to_stream = self.require_fn(
            self.conn
                .environment()
                .oci()
                .dir_path_col_array_to_stream,
        )?;
        let stream_reset = self.require_fn(self.conn.environment().oci().dir_path_stream_reset)?;
        unsafe { stream_reset(self.stream, self.conn.err_ptr()) };

        let mut error_rows = Vec::new();
        let mut row_offset = 0;
        let result = loop {
            let status = unsafe {
                to_stream(
                    self.col_array,
                    self.ctx,
                    self.stream,
                    self.conn.err_ptr(),
                    self.pending_rows,
                    row_offset,
                )
            };
            match status {
                OCI_SUCCESS | OCI_SUCCESS_WITH_INFO => {
                    break if error_rows.is_empty() {
                        DirPathResult::Completed
                    } else {
                        DirPathResult::Partial {
                            error_rows: error_rows.clone(),
                        }
                    };
                }
                // The row at the current offset cannot be converted; record it and continue
                // with the remainder of the batch.
                OCI_ERROR | OCI_NEED_DATA | OCI_CONTINUE => {
                    let processed = self.col_array_row_count()?;
                    if status == OCI_ERROR && processed == 0 && error_rows.is_empty() {
                        // Nothing converted at all; treat as fatal after reporting.
                        break DirPathResult::Fatal;
                    }
                    error_rows.push(processed);
                    row_offset = processed + 1;
                    if row_offset >= self.pending_rows {
                        break DirPathResult::Partial {
                            error_rows: error_rows.clone(),
                        };
                    }
                }
                OCI_NO_DATA => break DirPathResult::Completed,
                _ => break DirPathResult::Fatal,
            }
        };

        if matches!(result, DirPathResult::Fatal) {
            let error = Error::DirectPathState {
                operation: "convert (stream conversion failed)",
            };
            self.raise(&error, "convert");
            return Err(error);
        }
        let converted = self.pending_rows as u64 - error_rows.len() as u64;
        self.converted_rows += converted;
        self.state = DirPathState::Converted;
        Ok(result)
    }

    /// Ships the converted stream to the server. Transition `Converted -> Prepared` (the next
    /// batch can be filled).
    pub fn load(&mut self) -> Result<DirPathResult, Error> {
        self.expect_state(DirPathState::Converted, "load")?;
        let load_stream = self.require_fn(self.conn.environment().oci().dir_path_load_stream)?;
        let array_reset = self.require_fn(
            self.conn
                .environment()
                .oci()
                .dir_path_col_array_reset,
        )?;

        let status = unsafe { load_stream(self.ctx, self.stream, self.conn.err_ptr()) };
        let result = match status {
            OCI_SUCCESS | OCI_SUCCESS_WITH_INFO | OCI_NO_DATA => DirPathResult::Completed,
            OCI_NEED_DATA => DirPathResult::Partial {
                error_rows: Vec::new(),
            },
            _ => DirPathResult::Fatal,
        };
        if matches!(result, DirPathResult::Fatal) {
            self.resolve(status, "OCIDirPathLoadStream", "load")?;
        }
        self.loaded_rows += self.pending_rows as u64;
        self.pending_rows = 0;
        unsafe { array_reset(self.col_array, self.conn.err_ptr()) };
        self.state = DirPathState::Prepared;
        Ok(result)
    }

    /// Commits the load. Transition `* -> Terminated`.
    pub fn finish(mut self) -> Result<(), Error> {
        if !matches!(self.state, DirPathState::Prepared | DirPathState::Converted) {
            let error = Error::DirectPathState {
                operation: "finish",
            };
            self.raise(&error, "finish");
            return Err(error);
        }
        let finish = self.require_fn(self.conn.environment().oci().dir_path_finish)?;
        let status = unsafe { finish(self.ctx, self.conn.err_ptr()) };
        self.state = DirPathState::Terminated;
        self.resolve(status, "OCIDirPathFinish", "finish")
    }

    /// Discards the load. Transition `* -> Terminated`.
    pub fn abort(mut self) -> Result<(), Error> {
        let abort = self.require_fn(self.conn.environment().oci().dir_path_abort)?;
        let status = unsafe { abort(self.ctx, self.conn.err_ptr()) };
        self.state = DirPathState::Terminated;
        self.resolve(status, "OCIDirPathAbort", "abort")
    }

    fn col_array_row_count(&self) -> Result<u32, Error> {
        let mut rows: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.col_array as *const c_void,
                OCI_HTYPE_DIRPATH_COLUMN_ARRAY,
                &mut rows as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_ROW_COUNT,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(processed rows)", "convert")?;
        Ok(rows)
    }

    fn set_ctx_text_attr(
        &self,
        attribute: Ub4,
        value: &str,
        location: &'static str,
    ) -> Result<(), Error> {
        let text = DbText::new(value);
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.ctx as *mut c_void,
                OCI_HTYPE_DIRPATH_CTX,
                text.ptr() as *mut c_void,
                text.len_bytes() as u32,
                attribute,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrSet(direct path)", location)
    }

    fn expect_state(&self, expected: DirPathState, operation: &'static str) -> Result<(), Error> {
        if self.state != expected {
            let error = Error::DirectPathState { operation };
            self.raise(&error, operation);
            return Err(error);
        }
        Ok(())
    }

    fn require_fn<T>(&self, entry: Option<T>) -> Result<T, Error> {
        entry.ok_or_else(|| {
            let error = Error::NotAvailable {
                feature: Feature::DirectPathLoading,
            };
            self.raise(&error, "direct_path");
            error
        })
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::DirectPath,
            &self.table,
            location,
        )
    }

    fn raise(&self, error: &Error, location: &'static str) {
        self.conn
            .environment()
            .raise(error, SourceKind::DirectPath, &self.table, None, location);
    }
}

impl Drop for DirPath<'_, '_> {
    fn drop(&mut self) {
        let env = self.conn.environment();
        let oci = env.oci();
        if self.state != DirPathState::Terminated {
            if let Some(abort) = oci.dir_path_abort {
                unsafe { abort(self.ctx, self.conn.err_ptr()) };
            }
        }
        unsafe {
            if !self.stream.is_null() {
                env.counters().free_handle(
                    oci,
                    self.stream as *mut c_void,
                    OCI_HTYPE_DIRPATH_STREAM,
                );
            }
            if !self.col_array.is_null() {
                env.counters().free_handle(
                    oci,
                    self.col_array as *mut c_void,
                    OCI_HTYPE_DIRPATH_COLUMN_ARRAY,
                );
            }
            env.counters()
                .free_handle(oci, self.ctx as *mut c_void, OCI_HTYPE_DIRPATH_CTX);
        }
    }
}
