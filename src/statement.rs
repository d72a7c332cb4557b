//! Statement preparation and execution.

use std::{
    cell::Cell,
    ffi::c_void,
    ptr::null_mut,
};

use log::debug;

use crate::{
    bind::{
        binary_data, dynamic_sink, fixed_data, in_bind_callback, out_bind_callback,
        piecewise_sqlt, text_data, BindAllocMode, BindData, BindDirection, BindRegistry,
        BindSpec, FixedSizedBind, PiecewiseSource,
    },
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::{AllocState, ExtSword, HolderId, Record},
    long::LongKind,
    oci::{
        constants::{
            OCI_ATTR_DML_ROW_OFFSET, OCI_ATTR_NUM_DML_ERRORS, OCI_ATTR_PARSE_ERROR_OFFSET,
            OCI_ATTR_PREFETCH_MEMORY, OCI_ATTR_PREFETCH_ROWS, OCI_ATTR_ROW_COUNT,
            OCI_ATTR_STMT_TYPE, OCI_BATCH_ERRORS, OCI_COMMIT_ON_SUCCESS, OCI_DATA_AT_EXEC,
            OCI_DEFAULT, OCI_DESCRIBE_ONLY, OCI_HTYPE_ERROR, OCI_HTYPE_STMT, OCI_NTV_SYNTAX,
            OCI_PARSE_ONLY, OCI_STMT_ALTER, OCI_STMT_BEGIN, OCI_STMT_CALL, OCI_STMT_CREATE,
            OCI_STMT_DECLARE, OCI_STMT_DELETE, OCI_STMT_DROP, OCI_STMT_INSERT, OCI_STMT_MERGE,
            OCI_STMT_SCROLLABLE_READONLY, OCI_STMT_SELECT, OCI_STMT_UPDATE, SQLT_BIN, SQLT_STR,
        },
        types::{OciBindHandle, OciError, OciStmt, Sb4, Ub2, Ub4},
    },
    result_set::ResultSet,
    text::DbText,
};

/// Default number of rows transferred per fetch round trip.
pub const DEFAULT_FETCH_SIZE: u32 = 20;
/// Default ceiling for LONG column buffers in bytes.
pub const DEFAULT_LONG_MAX_SIZE: u32 = 64512;
/// Default transfer unit for piecewise operations in bytes.
pub const DEFAULT_PIECE_SIZE: u32 = 64 * 1024;

/// Statement execution modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    #[default]
    Default,
    /// Run the describe phase only: column metadata becomes available, nothing executes.
    DescribeOnly,
    /// Ask the server to parse without executing. Useful for syntax validation.
    ParseOnly,
    /// Open the result set as a scrollable, read-only server cursor.
    ScrollableReadOnly,
}

/// Kind of SQL statement, as derived by the server during prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Update,
    Delete,
    Insert,
    Create,
    Drop,
    Alter,
    Begin,
    Declare,
    Call,
    Merge,
    Unknown,
}

impl StatementType {
    fn from_code(code: Ub2) -> Self {
        match code {
            OCI_STMT_SELECT => StatementType::Select,
            OCI_STMT_UPDATE => StatementType::Update,
            OCI_STMT_DELETE => StatementType::Delete,
            OCI_STMT_INSERT => StatementType::Insert,
            OCI_STMT_CREATE => StatementType::Create,
            OCI_STMT_DROP => StatementType::Drop,
            OCI_STMT_ALTER => StatementType::Alter,
            OCI_STMT_BEGIN => StatementType::Begin,
            OCI_STMT_DECLARE => StatementType::Declare,
            OCI_STMT_CALL => StatementType::Call,
            OCI_STMT_MERGE => StatementType::Merge,
            _ => StatementType::Unknown,
        }
    }
}

/// One per-row error of an array DML execution in batch error mode.
#[derive(Debug, Clone)]
pub struct BatchError {
    /// Zero based row offset within the iteration the error occurred at.
    pub row_offset: u32,
    /// Oracle error code.
    pub code: i32,
    pub message: String,
}

// Statement status bits. Transitions are monotonic except close, which resets.
mod status {
    pub const CLOSED: u8 = 1;
    pub const PARSED: u8 = 2;
    pub const PREPARED: u8 = 4;
    pub const DESCRIBED: u8 = 8;
    pub const EXECUTED: u8 = 16;
}

/// A prepared SQL or PL/SQL statement.
///
/// Binds may be added in any order between prepare and execute; named placeholders use `:name`,
/// positional ones are addressed by their 1-based position. Execution with an iteration count
/// above one turns every bound array into array DML.
pub struct Statement<'conn, 'env> {
    conn: &'conn Connection<'env>,
    stmt: *mut OciStmt,
    holder: Option<HolderId>,
    sql: String,
    status: Cell<u8>,
    stmt_type: StatementType,
    exec_mode: ExecMode,
    fetch_size: u32,
    prefetch_rows: u32,
    prefetch_memory: u32,
    long_max_size: u32,
    piece_size: u32,
    batch_errors_enabled: bool,
    batch: Vec<BatchError>,
    binds: BindRegistry,
    /// Handle obtained through `OCIStmtPrepare2`, to be returned through `OCIStmtRelease`.
    from_cache: bool,
    /// Driver owned bind buffer bytes currently on the environment's books.
    counted_buffer_bytes: u64,
}

impl<'conn, 'env> Statement<'conn, 'env> {
    pub(crate) fn prepare(conn: &'conn Connection<'env>, sql: &str) -> Result<Self, Error> {
        conn.ensure_usable("prepare")?;
        let env = conn.environment();
        let oci = env.oci();
        let sql_text = DbText::new(sql);

        let (stmt, from_cache) = if let Some(prepare2) = oci.stmt_prepare2 {
            let mut stmt: *mut OciStmt = null_mut();
            let status = unsafe {
                prepare2(
                    conn.svc_ptr(),
                    &mut stmt,
                    conn.err_ptr(),
                    sql_text.ptr(),
                    sql_text.len_bytes() as Ub4,
                    std::ptr::null(),
                    0,
                    OCI_NTV_SYNTAX,
                    OCI_DEFAULT,
                )
            };
            conn.resolve_for(
                status.into_oci_result("OCIStmtPrepare2"),
                SourceKind::Statement,
                sql,
                "prepare",
            )?;
            (stmt, true)
        } else {
            let stmt = env.counters().alloc_handle(
                oci,
                env.env_ptr() as *const c_void,
                OCI_HTYPE_STMT,
            )? as *mut OciStmt;
            let status = unsafe {
                (oci.stmt_prepare)(
                    stmt,
                    conn.err_ptr(),
                    sql_text.ptr(),
                    sql_text.len_bytes() as Ub4,
                    OCI_NTV_SYNTAX,
                    OCI_DEFAULT,
                )
            };
            if let Err(error) = conn.resolve_for(
                status.into_oci_result("OCIStmtPrepare"),
                SourceKind::Statement,
                sql,
                "prepare",
            ) {
                unsafe {
                    env.counters().free_handle(oci, stmt as *mut c_void, OCI_HTYPE_STMT);
                }
                return Err(error);
            }
            (stmt, false)
        };

        // Ownership of the handle goes to the connection's holder arena, so a leaked statement
        // is still disposed when the connection goes away. The free closure captures only
        // `'static` copies: the entry points themselves and the raw error handle.
        let release = oci.stmt_release;
        let handle_free = oci.handle_free;
        let errhp = conn.err_ptr();
        let counters = env.counters_arc();
        let holder = conn.holders.borrow_mut().acquire(
            stmt as *mut c_void,
            AllocState::Allocated,
            None,
            Some(Box::new(move |raw| {
                if from_cache {
                    if let Some(release) = release {
                        unsafe {
                            release(raw as *mut OciStmt, errhp, std::ptr::null(), 0, OCI_DEFAULT)
                        };
                    }
                } else {
                    unsafe { handle_free(raw, OCI_HTYPE_STMT) };
                    counters.forget_handle();
                }
            })),
        )?;

        let mut stmt_type_code: Ub2 = 0;
        let status = unsafe {
            (oci.attr_get)(
                stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut stmt_type_code as *mut Ub2 as *mut c_void,
                null_mut(),
                OCI_ATTR_STMT_TYPE,
                conn.err_ptr(),
            )
        };
        let stmt_type = match conn.resolve_for(
            status.into_oci_result("OCIAttrGet(statement type)"),
            SourceKind::Statement,
            sql,
            "prepare",
        ) {
            Ok(()) => StatementType::from_code(stmt_type_code),
            Err(error) => {
                let _ = conn.holders.borrow_mut().release(holder);
                return Err(error);
            }
        };

        debug!("Prepared statement ({stmt_type:?}): {sql}");
        Ok(Statement {
            conn,
            stmt,
            holder: Some(holder),
            sql: sql.to_string(),
            status: Cell::new(status::PREPARED),
            stmt_type,
            exec_mode: ExecMode::Default,
            fetch_size: DEFAULT_FETCH_SIZE,
            prefetch_rows: DEFAULT_FETCH_SIZE,
            prefetch_memory: 0,
            long_max_size: DEFAULT_LONG_MAX_SIZE,
            piece_size: DEFAULT_PIECE_SIZE,
            batch_errors_enabled: false,
            batch: Vec::new(),
            binds: BindRegistry::default(),
            from_cache,
            counted_buffer_bytes: 0,
        })
    }

    /// The statement kind the server derived during prepare.
    pub fn statement_type(&self) -> StatementType {
        self.stmt_type
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Selects the execution mode. Must be called before the first execute.
    pub fn set_exec_mode(&mut self, mode: ExecMode) -> Result<(), Error> {
        if self.status.get() & status::EXECUTED != 0 {
            return Err(self.raise(
                Error::StatementState {
                    details: "execution mode cannot change after execute",
                },
                "set_exec_mode",
            ));
        }
        if mode == ExecMode::ScrollableReadOnly
            && !self.conn.environment().oci().has_scrollable_cursors()
        {
            return Err(self.raise(
                Error::NotAvailable {
                    feature: Feature::ScrollableCursors,
                },
                "set_exec_mode",
            ));
        }
        self.exec_mode = mode;
        Ok(())
    }

    pub fn exec_mode(&self) -> ExecMode {
        self.exec_mode
    }

    /// Number of rows fetched per round trip by result sets of this statement.
    pub fn set_fetch_size(&mut self, rows: u32) -> Result<(), Error> {
        if rows == 0 {
            return Err(self.raise(
                Error::OutOfRange {
                    argument: "fetch size",
                },
                "set_fetch_size",
            ));
        }
        self.fetch_size = rows;
        Ok(())
    }

    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    /// Rows the client prefetches transparently during fetch round trips.
    pub fn set_prefetch_rows(&mut self, rows: u32) {
        self.prefetch_rows = rows;
    }

    /// Memory ceiling for transparent prefetch, in bytes. Zero leaves the decision to the rows
    /// setting alone.
    pub fn set_prefetch_memory(&mut self, bytes: u32) {
        self.prefetch_memory = bytes;
    }

    /// Ceiling for buffered LONG column data in bytes.
    pub fn set_long_max_size(&mut self, bytes: u32) {
        self.long_max_size = bytes;
    }

    pub fn long_max_size(&self) -> u32 {
        self.long_max_size
    }

    /// Transfer unit for piecewise binds and fetches.
    pub fn set_piece_size(&mut self, bytes: u32) {
        self.piece_size = bytes.max(1);
    }

    pub fn piece_size(&self) -> u32 {
        self.piece_size
    }

    /// In batch error mode per-row errors of an array DML execution are collected into
    /// [`Self::batch_errors`] instead of failing the whole batch.
    pub fn set_batch_errors(&mut self, enabled: bool) {
        self.batch_errors_enabled = enabled;
    }

    /// Per-row errors collected by the last array DML execution.
    pub fn batch_errors(&self) -> &[BatchError] {
        &self.batch
    }

    // Typed bind surface. All of these copy into driver owned buffers (internal allocation
    // mode).

    /// Binds a nullable scalar.
    pub fn bind<T: FixedSizedBind>(
        &mut self,
        spec: impl Into<BindSpec>,
        value: Option<T>,
    ) -> Result<(), Error> {
        let (data, indicators) = fixed_data(&[value]);
        self.apply_bind(
            &spec.into(),
            BindDirection::In,
            T::SQLT,
            data,
            indicators,
            vec![0],
            1,
            false,
        )
    }

    /// Binds an array of nullable scalars for array DML.
    pub fn bind_array<T: FixedSizedBind>(
        &mut self,
        spec: impl Into<BindSpec>,
        values: &[Option<T>],
    ) -> Result<(), Error> {
        let (data, indicators) = fixed_data(values);
        self.apply_bind(
            &spec.into(),
            BindDirection::In,
            T::SQLT,
            data,
            indicators,
            vec![0; values.len().max(1)],
            values.len() as u32,
            true,
        )
    }

    /// Binds a nullable string. The declared size is the value's own length; use
    /// [`Self::bind_text_sized`] if the bind is re-executed with longer values.
    pub fn bind_text(
        &mut self,
        spec: impl Into<BindSpec>,
        value: Option<&str>,
    ) -> Result<(), Error> {
        let max_chars = value.map(|v| v.chars().count()).unwrap_or(0).max(1);
        self.bind_text_sized(spec, value, max_chars)
    }

    pub fn bind_text_sized(
        &mut self,
        spec: impl Into<BindSpec>,
        value: Option<&str>,
        max_chars: usize,
    ) -> Result<(), Error> {
        let spec = spec.into();
        let (data, indicators, lengths) =
            text_data(&[value], max_chars).map_err(|e| self.raise(e, "bind_text"))?;
        self.apply_bind(
            &spec,
            BindDirection::In,
            SQLT_STR,
            data,
            indicators,
            lengths,
            1,
            false,
        )
    }

    /// Binds an array of nullable strings for array DML.
    pub fn bind_text_array(
        &mut self,
        spec: impl Into<BindSpec>,
        values: &[Option<&str>],
        max_chars: usize,
    ) -> Result<(), Error> {
        let spec = spec.into();
        let (data, indicators, lengths) =
            text_data(values, max_chars).map_err(|e| self.raise(e, "bind_text_array"))?;
        self.apply_bind(
            &spec,
            BindDirection::In,
            SQLT_STR,
            data,
            indicators,
            lengths,
            values.len() as u32,
            true,
        )
    }

    /// Binds a nullable byte string.
    pub fn bind_bytes(
        &mut self,
        spec: impl Into<BindSpec>,
        value: Option<&[u8]>,
    ) -> Result<(), Error> {
        let max_len = value.map(|v| v.len()).unwrap_or(0).max(1);
        let spec = spec.into();
        let (data, indicators, lengths) =
            binary_data(&[value], max_len).map_err(|e| self.raise(e, "bind_bytes"))?;
        self.apply_bind(
            &spec,
            BindDirection::In,
            SQLT_BIN,
            data,
            indicators,
            lengths,
            1,
            false,
        )
    }

    /// Binds an array of nullable byte strings for array DML.
    pub fn bind_bytes_array(
        &mut self,
        spec: impl Into<BindSpec>,
        values: &[Option<&[u8]>],
        max_len: usize,
    ) -> Result<(), Error> {
        let spec = spec.into();
        let (data, indicators, lengths) =
            binary_data(values, max_len).map_err(|e| self.raise(e, "bind_bytes_array"))?;
        self.apply_bind(
            &spec,
            BindDirection::In,
            SQLT_BIN,
            data,
            indicators,
            lengths,
            values.len() as u32,
            true,
        )
    }

    /// Binds a large value as a piecewise (data at execute) LONG bind. The value is streamed to
    /// the server in [`Self::piece_size`] units during execute.
    pub fn bind_long(
        &mut self,
        spec: impl Into<BindSpec>,
        value: &[u8],
        kind: LongKind,
    ) -> Result<(), Error> {
        let source = Box::new(PiecewiseSource {
            data: value.to_vec(),
            piece_size: self.piece_size as usize,
            position: 0,
            total_len: value.len(),
        });
        self.apply_bind(
            &spec.into(),
            BindDirection::In,
            piecewise_sqlt(kind == LongKind::Binary),
            BindData::Piecewise(source),
            vec![0],
            vec![0],
            1,
            false,
        )
    }

    /// Registers an OUT bind for a scalar, e.g. for PL/SQL OUT parameters or DML RETURNING.
    pub fn register_out<T: FixedSizedBind>(
        &mut self,
        spec: impl Into<BindSpec>,
    ) -> Result<(), Error> {
        self.register_out_many::<T>(spec, 1)
    }

    /// Registers an OUT bind holding one scalar per iteration.
    pub fn register_out_many<T: FixedSizedBind>(
        &mut self,
        spec: impl Into<BindSpec>,
        count: u32,
    ) -> Result<(), Error> {
        let values = vec![None::<T>; count.max(1) as usize];
        let (data, indicators) = fixed_data(&values);
        self.apply_bind(
            &spec.into(),
            BindDirection::Out,
            T::SQLT,
            data,
            indicators,
            vec![0; count.max(1) as usize],
            count.max(1),
            count > 1,
        )
    }

    /// Registers an OUT bind for a string of up to `max_chars` characters.
    pub fn register_out_text(
        &mut self,
        spec: impl Into<BindSpec>,
        max_chars: usize,
    ) -> Result<(), Error> {
        let spec = spec.into();
        let (data, indicators, lengths) =
            text_data(&[None], max_chars).map_err(|e| self.raise(e, "register_out_text"))?;
        self.apply_bind(
            &spec,
            BindDirection::Out,
            SQLT_STR,
            data,
            indicators,
            lengths,
            1,
            false,
        )
    }

    /// Registers a dynamic OUT bind: the value is collected piecewise through a callback, with
    /// no size ceiling.
    pub fn register_out_long(
        &mut self,
        spec: impl Into<BindSpec>,
        kind: LongKind,
    ) -> Result<(), Error> {
        let spec = spec.into();
        let sqlt = piecewise_sqlt(kind == LongKind::Binary);
        let sink = dynamic_sink(self.piece_size as usize);
        let (index, _) = self
            .binds
            .upsert(
                &spec,
                BindDirection::Out,
                sqlt,
                BindAllocMode::Internal,
                BindData::External {
                    ptr: null_mut(),
                    elem_size: self.long_max_size as usize,
                },
                vec![0],
                vec![0],
                1,
                false,
            )
            .map_err(|e| self.raise(e, "register_out_long"))?;
        self.binds.get_mut(index).unwrap().sink = Some(sink);
        self.vendor_bind_dynamic_out(index)?;
        self.sync_buffer_accounting();
        Ok(())
    }

    /// Binds caller owned memory directly.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `elem_size * elem_count` bytes laid out as `sqlt` describes,
    /// and stay valid until the statement is re-prepared or closed.
    pub unsafe fn bind_external(
        &mut self,
        spec: impl Into<BindSpec>,
        ptr: *mut c_void,
        elem_size: usize,
        sqlt: Ub2,
        direction: BindDirection,
        elem_count: u32,
    ) -> Result<(), Error> {
        if ptr.is_null() {
            return Err(self.raise(
                Error::NullPointer { argument: "ptr" },
                "bind_external",
            ));
        }
        self.apply_bind(
            &spec.into(),
            direction,
            sqlt,
            BindData::External { ptr, elem_size },
            vec![0; elem_count.max(1) as usize],
            vec![0; elem_count.max(1) as usize],
            elem_count.max(1),
            elem_count > 1,
        )
    }

    fn apply_bind(
        &mut self,
        spec: &BindSpec,
        direction: BindDirection,
        sqlt: Ub2,
        data: BindData,
        indicators: Vec<i16>,
        lengths: Vec<Ub2>,
        elem_count: u32,
        is_array: bool,
    ) -> Result<(), Error> {
        let alloc_mode = match &data {
            BindData::External { .. } => BindAllocMode::External,
            _ => BindAllocMode::Internal,
        };
        let piecewise = matches!(&data, BindData::Piecewise(_));
        let (index, needs_vendor_bind) = self
            .binds
            .upsert(
                spec, direction, sqlt, alloc_mode, data, indicators, lengths, elem_count,
                is_array,
            )
            .map_err(|e| self.raise(e, "bind"))?;
        if needs_vendor_bind {
            self.vendor_bind(index, piecewise)?;
        }
        self.sync_buffer_accounting();
        Ok(())
    }

    /// Issues the actual `OCIBindByName`/`OCIBindByPos` call for the bind at `index`.
    fn vendor_bind(&mut self, index: usize, piecewise: bool) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        let errhp = self.conn.err_ptr();
        let stmt = self.stmt;
        let bind = self.binds.get_mut(index).unwrap();

        let mode = if piecewise { OCI_DATA_AT_EXEC } else { OCI_DEFAULT };
        let value_ptr = if piecewise { null_mut() } else { bind.value_ptr() };
        let value_size = bind.elem_size() as Sb4;
        let ind_ptr = bind.indicators.as_mut_ptr() as *mut c_void;
        let len_ptr = if piecewise {
            null_mut()
        } else {
            bind.lengths.as_mut_ptr()
        };
        let rcode_ptr = if piecewise {
            null_mut()
        } else {
            bind.return_codes.as_mut_ptr()
        };

        let mut bindp: *mut OciBindHandle = null_mut();
        let status = match &bind.name {
            Some(name) => {
                let name_text = DbText::new(name);
                unsafe {
                    (oci.bind_by_name)(
                        stmt,
                        &mut bindp,
                        errhp,
                        name_text.ptr(),
                        name_text.len_bytes() as Sb4,
                        value_ptr,
                        value_size,
                        bind.sqlt,
                        ind_ptr,
                        len_ptr,
                        rcode_ptr,
                        0,
                        null_mut(),
                        mode,
                    )
                }
            }
            None => unsafe {
                (oci.bind_by_pos)(
                    stmt,
                    &mut bindp,
                    errhp,
                    bind.position,
                    value_ptr,
                    value_size,
                    bind.sqlt,
                    ind_ptr,
                    len_ptr,
                    rcode_ptr,
                    0,
                    null_mut(),
                    mode,
                )
            },
        };
        bind.bindp = bindp;
        let function = if bind.name.is_some() {
            "OCIBindByName"
        } else {
            "OCIBindByPos"
        };
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Bind,
            &self.sql,
            "bind",
        )?;

        if piecewise {
            let bind = self.binds.get_mut(index).unwrap();
            let source_ptr = match &mut bind.data {
                BindData::Piecewise(source) => source.as_mut() as *mut PiecewiseSource,
                _ => unreachable!(),
            };
            let status = unsafe {
                (oci.bind_dynamic)(
                    bind.bindp,
                    errhp,
                    source_ptr as *mut c_void,
                    Some(in_bind_callback),
                    null_mut(),
                    None,
                )
            };
            self.conn.resolve_for(
                status.into_oci_result("OCIBindDynamic"),
                SourceKind::Bind,
                &self.sql,
                "bind",
            )?;
        }
        Ok(())
    }

    fn vendor_bind_dynamic_out(&mut self, index: usize) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        let errhp = self.conn.err_ptr();
        let stmt = self.stmt;
        let bind = self.binds.get_mut(index).unwrap();

        let mut bindp: *mut OciBindHandle = null_mut();
        let value_size = bind.elem_size() as Sb4;
        let status = match &bind.name {
            Some(name) => {
                let name_text = DbText::new(name);
                unsafe {
                    (oci.bind_by_name)(
                        stmt,
                        &mut bindp,
                        errhp,
                        name_text.ptr(),
                        name_text.len_bytes() as Sb4,
                        null_mut(),
                        value_size,
                        bind.sqlt,
                        null_mut(),
                        null_mut(),
                        null_mut(),
                        0,
                        null_mut(),
                        OCI_DATA_AT_EXEC,
                    )
                }
            }
            None => unsafe {
                (oci.bind_by_pos)(
                    stmt,
                    &mut bindp,
                    errhp,
                    bind.position,
                    null_mut(),
                    value_size,
                    bind.sqlt,
                    null_mut(),
                    null_mut(),
                    null_mut(),
                    0,
                    null_mut(),
                    OCI_DATA_AT_EXEC,
                )
            },
        };
        bind.bindp = bindp;
        self.conn.resolve_for(
            status.into_oci_result("OCIBindByName"),
            SourceKind::Bind,
            &self.sql,
            "register_out_long",
        )?;

        let bind = self.binds.get_mut(index).unwrap();
        let sink_ptr = bind.sink.as_mut().unwrap().as_mut() as *mut _ as *mut c_void;
        let status = unsafe {
            (oci.bind_dynamic)(
                bind.bindp,
                errhp,
                null_mut(),
                None,
                sink_ptr,
                Some(out_bind_callback),
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIBindDynamic"),
            SourceKind::Bind,
            &self.sql,
            "register_out_long",
        )
    }

    /// Runs the statement with `iterations` rows of bind data. One is the common case; larger
    /// counts turn bound arrays into array DML. Zero iterations on a non-query statement is a
    /// no-op.
    ///
    /// For queries, executing runs the describe phase; use [`Self::result_set`] to read rows
    /// afterwards.
    pub fn execute(&mut self, iterations: u32) -> Result<(), Error> {
        self.conn.ensure_usable("execute")?;
        if self.status.get() & status::CLOSED != 0 {
            return Err(self.raise(
                Error::StatementState {
                    details: "statement is closed",
                },
                "execute",
            ));
        }
        let is_query = self.stmt_type == StatementType::Select;
        if iterations == 0 && !is_query {
            return Ok(());
        }

        let oci = self.conn.environment().oci();
        self.set_u32_attr(OCI_ATTR_PREFETCH_ROWS, self.prefetch_rows)?;
        if self.prefetch_memory > 0 {
            self.set_u32_attr(OCI_ATTR_PREFETCH_MEMORY, self.prefetch_memory)?;
        }

        let mut mode = match self.exec_mode {
            ExecMode::Default => OCI_DEFAULT,
            ExecMode::DescribeOnly => OCI_DESCRIBE_ONLY,
            ExecMode::ParseOnly => OCI_PARSE_ONLY,
            ExecMode::ScrollableReadOnly => OCI_STMT_SCROLLABLE_READONLY,
        };
        if self.conn.autocommit() && self.exec_mode == ExecMode::Default {
            mode |= OCI_COMMIT_ON_SUCCESS;
        }
        if self.batch_errors_enabled {
            mode |= OCI_BATCH_ERRORS;
        }

        let iters = if is_query { 0 } else { iterations };
        self.batch.clear();
        let status = unsafe {
            (oci.stmt_execute)(
                self.conn.svc_ptr(),
                self.stmt,
                self.conn.err_ptr(),
                iters,
                0,
                std::ptr::null(),
                null_mut(),
                mode,
            )
        };
        let result = status.into_oci_result("OCIStmtExecute");
        let failed = result.is_err();
        let outcome = self.conn.resolve_for(result, SourceKind::Statement, &self.sql, "execute");
        if self.batch_errors_enabled {
            // In batch mode per-row failures surface as success-with-info; collect them either
            // way so callers can inspect partial outcomes.
            self.collect_batch_errors()?;
        }
        if failed {
            return outcome;
        }

        self.binds.pin();
        for bind in self.binds.iter_mut() {
            if let Some(sink) = bind.sink.as_mut() {
                sink.finish();
            }
        }

        let mut new_status = self.status.get() | status::EXECUTED;
        match self.exec_mode {
            ExecMode::DescribeOnly => new_status = (self.status.get()) | status::DESCRIBED,
            ExecMode::ParseOnly => new_status = (self.status.get()) | status::PARSED,
            _ => new_status |= status::DESCRIBED | status::PARSED,
        }
        self.status.set(new_status);
        Ok(())
    }

    /// Runs the describe phase without executing, populating column metadata for
    /// [`Self::result_set`].
    pub fn describe(&mut self) -> Result<(), Error> {
        let previous = self.exec_mode;
        self.exec_mode = ExecMode::DescribeOnly;
        let outcome = self.execute(1);
        self.exec_mode = previous;
        outcome
    }

    /// Rows affected by the last execution.
    pub fn row_count(&self) -> Result<u64, Error> {
        let mut rows: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut rows as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_ROW_COUNT,
                self.conn.err_ptr(),
            )
        };
        self.conn
            .resolve_for(
                status.into_oci_result("OCIAttrGet(row count)"),
                SourceKind::Statement,
                &self.sql,
                "row_count",
            )
            .map(|()| rows as u64)
    }

    /// Offset into the SQL text of the token the parser stopped at, after a parse error.
    pub fn parse_error_offset(&self) -> Result<u16, Error> {
        let mut offset: Ub2 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut offset as *mut Ub2 as *mut c_void,
                null_mut(),
                OCI_ATTR_PARSE_ERROR_OFFSET,
                self.conn.err_ptr(),
            )
        };
        self.conn
            .resolve_for(
                status.into_oci_result("OCIAttrGet(parse error offset)"),
                SourceKind::Statement,
                &self.sql,
                "parse_error_offset",
            )
            .map(|()| offset)
    }

    /// The result set of an executed query. `None` for non-query statements.
    pub fn result_set(&self) -> Result<Option<ResultSet<'_, 'env>>, Error> {
        if self.stmt_type != StatementType::Select {
            return Ok(None);
        }
        if self.status.get() & (status::EXECUTED | status::DESCRIBED) == 0 {
            return Err(self.raise(
                Error::StatementState {
                    details: "execute or describe the statement before reading results",
                },
                "result_set",
            ));
        }
        ResultSet::open(self, self.stmt).map(Some)
    }

    /// Next implicit result set returned by the server (12c `DBMS_SQL.RETURN_RESULT`), if any.
    pub fn next_result(&self) -> Result<Option<ResultSet<'_, 'env>>, Error> {
        let Some(get_next_result) = self.conn.environment().oci().stmt_get_next_result else {
            return Err(self.raise(
                Error::NotAvailable {
                    feature: Feature::ImplicitResults,
                },
                "next_result",
            ));
        };
        let mut child: *mut c_void = null_mut();
        let mut rtype: Ub4 = 0;
        let status = unsafe {
            get_next_result(self.stmt, self.conn.err_ptr(), &mut child, &mut rtype, OCI_DEFAULT)
        };
        let found = self.conn.resolve_opt_for(
            status.into_oci_result("OCIStmtGetNextResult"),
            SourceKind::Statement,
            &self.sql,
            "next_result",
        )?;
        match found {
            // The child statement handle is owned by this statement; the client releases it
            // together with it.
            Some(()) => ResultSet::open(self, child as *mut OciStmt).map(Some),
            None => Ok(None),
        }
    }

    /// Reads back a scalar OUT bind after execute.
    pub fn out_value<T: FixedSizedBind>(
        &self,
        spec: impl Into<BindSpec>,
    ) -> Result<Option<T>, Error> {
        self.out_value_at(spec, 0)
    }

    /// Reads back one element of an array OUT bind.
    pub fn out_value_at<T: FixedSizedBind>(
        &self,
        spec: impl Into<BindSpec>,
        index: u32,
    ) -> Result<Option<T>, Error> {
        let spec = spec.into();
        let bind_index = self
            .binds
            .require(&spec)
            .map_err(|e| self.raise(e, "out_value"))?;
        let bind = self.binds.get(bind_index).unwrap();
        if bind.direction == BindDirection::In {
            return Err(self.raise(
                Error::TypeMismatch {
                    from: "IN bind",
                    to: "OUT value",
                },
                "out_value",
            ));
        }
        if index >= bind.elem_count {
            return Err(self.raise(
                Error::OutOfRange {
                    argument: "OUT bind element index",
                },
                "out_value",
            ));
        }
        if bind.indicators[index as usize] == crate::oci::constants::OCI_IND_NULL {
            return Ok(None);
        }
        match &bind.data {
            BindData::Fixed { bytes, elem_size } if *elem_size == std::mem::size_of::<T>() => {
                let mut value = T::default();
                unsafe {
                    std::ptr::copy_nonoverlapping(
                        bytes.as_ptr().add(index as usize * elem_size),
                        &mut value as *mut T as *mut u8,
                        *elem_size,
                    );
                }
                Ok(Some(value))
            }
            _ => Err(self.raise(
                Error::TypeMismatch {
                    from: "bind buffer",
                    to: std::any::type_name::<T>(),
                },
                "out_value",
            )),
        }
    }

    /// Reads back a text OUT bind after execute.
    pub fn out_text(&self, spec: impl Into<BindSpec>) -> Result<Option<String>, Error> {
        let spec = spec.into();
        let bind_index = self
            .binds
            .require(&spec)
            .map_err(|e| self.raise(e, "out_text"))?;
        let bind = self.binds.get(bind_index).unwrap();
        if bind.indicators[0] == crate::oci::constants::OCI_IND_NULL {
            return Ok(None);
        }
        match &bind.data {
            BindData::Text { units, max_chars } => {
                let stride = max_chars + 1;
                let slice = &units[..stride.min(units.len())];
                let terminator = slice.iter().position(|&c| c == 0).unwrap_or(slice.len());
                Ok(Some(
                    crate::text::slice_to_cow_utf8(&slice[..terminator]).into_owned(),
                ))
            }
            _ => Err(self.raise(
                Error::TypeMismatch {
                    from: "bind buffer",
                    to: "text",
                },
                "out_text",
            )),
        }
    }

    /// Accumulated bytes of a dynamic OUT bind, one value per iteration.
    pub fn out_long(&self, spec: impl Into<BindSpec>) -> Result<Vec<Vec<u8>>, Error> {
        let spec = spec.into();
        let bind_index = self
            .binds
            .require(&spec)
            .map_err(|e| self.raise(e, "out_long"))?;
        let bind = self.binds.get(bind_index).unwrap();
        match &bind.sink {
            Some(sink) => Ok(sink.pieces.clone()),
            None => Err(self.raise(
                Error::TypeMismatch {
                    from: "plain bind",
                    to: "dynamic OUT value",
                },
                "out_long",
            )),
        }
    }

    /// Releases the statement handle (back into the statement cache where available) and drops
    /// all binds.
    pub fn close(mut self) -> Result<(), Error> {
        self.close_internal()
    }

    fn close_internal(&mut self) -> Result<(), Error> {
        let counters = self.conn.environment().counters();
        counters.uncount_buffer_bytes(self.counted_buffer_bytes);
        self.counted_buffer_bytes = 0;
        if let Some(holder) = self.holder.take() {
            self.conn
                .holders
                .borrow_mut()
                .release(holder)
                .map_err(|e| self.raise(e, "close"))?;
        }
        self.binds.clear();
        self.batch.clear();
        self.status.set(status::CLOSED);
        self.stmt = null_mut();
        Ok(())
    }

    fn collect_batch_errors(&mut self) -> Result<(), Error> {
        let env = self.conn.environment();
        let oci = env.oci();
        let mut count: Ub4 = 0;
        let status = unsafe {
            (oci.attr_get)(
                self.stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut count as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_NUM_DML_ERRORS,
                self.conn.err_ptr(),
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIAttrGet(batch error count)"),
            SourceKind::Statement,
            &self.sql,
            "execute",
        )?;
        if count == 0 {
            return Ok(());
        }

        // One scratch error handle receives each per-row record in turn.
        let row_errhp = env.counters().alloc_handle(
            oci,
            env.env_ptr() as *const c_void,
            OCI_HTYPE_ERROR,
        )? as *mut OciError;
        for i in 0..count {
            let mut param = row_errhp as *mut c_void;
            let status = unsafe {
                (oci.param_get)(
                    self.conn.err_ptr() as *const c_void,
                    OCI_HTYPE_ERROR,
                    row_errhp,
                    &mut param,
                    i,
                )
            };
            if status.into_oci_result("OCIParamGet").is_err() {
                break;
            }
            let row_err = param as *mut OciError;
            let mut row_offset: Ub4 = 0;
            unsafe {
                (oci.attr_get)(
                    row_err as *const c_void,
                    OCI_HTYPE_ERROR,
                    &mut row_offset as *mut Ub4 as *mut c_void,
                    null_mut(),
                    OCI_ATTR_DML_ROW_OFFSET,
                    row_errhp,
                );
            }
            let mut record = Record::default();
            record.fill_from(oci, row_err, 1);
            self.batch.push(BatchError {
                row_offset,
                code: record.code,
                message: record.message,
            });
        }
        unsafe {
            env.counters()
                .free_handle(oci, row_errhp as *mut c_void, OCI_HTYPE_ERROR);
        }
        Ok(())
    }

    fn set_u32_attr(&self, attribute: Ub4, mut value: u32) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().attr_set)(
                self.stmt as *mut c_void,
                OCI_HTYPE_STMT,
                &mut value as *mut u32 as *mut c_void,
                std::mem::size_of::<u32>() as u32,
                attribute,
                self.conn.err_ptr(),
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIAttrSet"),
            SourceKind::Statement,
            &self.sql,
            "set_attribute",
        )
    }

    /// Keeps the environment's byte counter in sync with the driver owned bind buffers.
    fn sync_buffer_accounting(&mut self) {
        let current = self.binds.buffer_bytes();
        let counters = self.conn.environment().counters();
        if current > self.counted_buffer_bytes {
            counters.count_buffer_bytes(current - self.counted_buffer_bytes);
        } else {
            counters.uncount_buffer_bytes(self.counted_buffer_bytes - current);
        }
        self.counted_buffer_bytes = current;
    }

    fn raise(&self, error: Error, location: &'static str) -> Error {
        self.conn.environment().raise(
            &error,
            SourceKind::Statement,
            &self.sql,
            None,
            location,
        );
        error
    }

    pub(crate) fn connection(&self) -> &'conn Connection<'env> {
        self.conn
    }

    pub(crate) fn is_scrollable(&self) -> bool {
        self.exec_mode == ExecMode::ScrollableReadOnly
    }
}

impl Drop for Statement<'_, '_> {
    fn drop(&mut self) {
        if self.holder.is_some() {
            if let Err(error) = self.close_internal() {
                log::error!("Error during implicit statement close: {error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StatementType;
    use crate::oci::constants::{OCI_STMT_MERGE, OCI_STMT_SELECT};

    #[test]
    fn statement_type_from_code() {
        assert_eq!(StatementType::Select, StatementType::from_code(OCI_STMT_SELECT));
        assert_eq!(StatementType::Merge, StatementType::from_code(OCI_STMT_MERGE));
        assert_eq!(StatementType::Unknown, StatementType::from_code(999));
    }
}
