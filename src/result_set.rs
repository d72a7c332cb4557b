//! Result sets: row navigation and per-column value extraction.

use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::c_void,
    marker::PhantomData,
    mem::size_of,
    ptr::null_mut,
};

use crate::{
    bind::normalize_bind_name,
    connection::Connection,
    define::{
        allocate_defines, describe_columns, release_defines, ColumnDescription, DataKind, Define,
        DefineBuffer,
    },
    error::{Error, SourceKind},
    handles::ExtSword,
    lob::{File, Lob},
    long::Long,
    oci::{
        constants::{
            OCI_ATTR_CURRENT_POSITION, OCI_ATTR_ROWS_FETCHED, OCI_DEFAULT, OCI_FETCH_ABSOLUTE,
            OCI_FETCH_FIRST, OCI_FETCH_LAST, OCI_FETCH_NEXT, OCI_FETCH_PRIOR, OCI_FETCH_RELATIVE,
            OCI_HTYPE_STMT,
        },
        types::{
            OciDate, OciDateTime, OciIntervalDesc, OciLobLocator, OciNumber, OciRefDesc, OciStmt,
            OciVectorDesc, Sb4, Ub2, Ub4,
        },
    },
    statement::Statement,
    text::{slice_to_cow_utf8, DbChar},
    types::{
        date::Date,
        interval::Interval,
        number,
        object::Object,
        reference::Reference,
        timestamp::Timestamp,
        vector::Vector,
    },
};

/// Origin of a [`ResultSet::fetch_seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Absolute position, 1-based from the first row.
    Start,
    /// Relative to the current row.
    Current,
    /// Backwards from the last row; offset zero is the last row itself.
    End,
}

/// Rows produced by an executed query.
///
/// Forward iteration works on every statement; random access navigation requires the statement
/// to be executed in scrollable read-only mode.
pub struct ResultSet<'s, 'env> {
    conn: &'s Connection<'env>,
    stmt: *mut OciStmt,
    sql: String,
    scrollable: bool,
    batch_rows: usize,
    defines: Vec<Define>,
    name_map: RefCell<Option<HashMap<String, usize>>>,
    /// Absolute 1-based position of the current row; zero before the first fetch.
    row_abs: u64,
    /// 1-based position of the current row within the fetched batch; zero if none.
    row_cur: usize,
    /// Rows in the fetched batch.
    row_fetched: usize,
    /// Raw status of the last fetch call.
    fetch_status: Sb4,
    eof: bool,
    bof: bool,
    /// Keeps the statement (and with it the define buffers' vendor side) borrowed.
    _stmt: PhantomData<&'s Statement<'s, 'env>>,
}

impl<'s, 'env> ResultSet<'s, 'env> {
    pub(crate) fn open(
        statement: &'s Statement<'_, 'env>,
        stmt: *mut OciStmt,
    ) -> Result<Self, Error> {
        let conn = statement.connection();
        let sql = statement.sql().to_string();
        let columns = describe_columns(conn, stmt, &sql)?;

        // LONG columns stream piecewise; their dynamic define supports a single row in flight.
        let has_long = columns
            .iter()
            .any(|c| matches!(c.kind, DataKind::Long(_)));
        let batch_rows = if has_long || statement.is_scrollable() {
            1
        } else {
            statement.fetch_size() as usize
        };
        let defines = allocate_defines(
            conn,
            stmt,
            &sql,
            columns,
            batch_rows,
            statement.long_max_size() as usize,
            statement.piece_size() as usize,
        )?;

        Ok(ResultSet {
            conn,
            stmt,
            sql,
            scrollable: statement.is_scrollable(),
            batch_rows,
            defines,
            name_map: RefCell::new(None),
            row_abs: 0,
            row_cur: 0,
            row_fetched: 0,
            fetch_status: 0,
            eof: false,
            bof: true,
            _stmt: PhantomData,
        })
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.defines.len()
    }

    /// Metadata of the column at the 1-based `index`.
    pub fn column(&self, index: usize) -> Result<&ColumnDescription, Error> {
        self.defines
            .get(index.wrapping_sub(1))
            .map(|d| &d.column)
            .ok_or_else(|| {
                self.raise(
                    Error::OutOfRange {
                        argument: "column index",
                    },
                    "column",
                )
            })
    }

    /// 1-based index of the column named `name` (matched the way the server reports names).
    pub fn column_index(&self, name: &str) -> Result<usize, Error> {
        let mut map = self.name_map.borrow_mut();
        let map = map.get_or_insert_with(|| {
            self.defines
                .iter()
                .enumerate()
                .map(|(i, d)| (d.column.name.to_uppercase(), i + 1))
                .collect()
        });
        map.get(&normalize_bind_name(name)).copied().ok_or_else(|| {
            self.raise(
                Error::ItemNotFound {
                    name: name.to_string(),
                },
                "column_index",
            )
        })
    }

    /// Absolute 1-based number of the current row, zero before the first fetch.
    pub fn row_number(&self) -> u64 {
        self.row_abs
    }

    /// Advances to the next row. `false` once the result set is exhausted.
    pub fn fetch_next(&mut self) -> Result<bool, Error> {
        if self.row_cur < self.row_fetched {
            self.row_cur += 1;
            self.row_abs += 1;
            self.bof = false;
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        let fetched = self.vendor_fetch(OCI_FETCH_NEXT, 0, self.batch_rows)?;
        if fetched == 0 {
            self.eof = true;
            self.row_cur = self.row_fetched;
            return Ok(false);
        }
        self.row_fetched = fetched;
        self.row_cur = 1;
        self.row_abs += 1;
        self.bof = false;
        Ok(true)
    }

    /// Moves to the first row. Requires a scrollable result set.
    pub fn fetch_first(&mut self) -> Result<bool, Error> {
        self.ensure_scrollable("fetch_first")?;
        self.scroll(OCI_FETCH_FIRST, 0)
    }

    /// Moves to the last row. Requires a scrollable result set.
    pub fn fetch_last(&mut self) -> Result<bool, Error> {
        self.ensure_scrollable("fetch_last")?;
        self.scroll(OCI_FETCH_LAST, 0)
    }

    /// Moves to the previous row. Requires a scrollable result set.
    pub fn fetch_prev(&mut self) -> Result<bool, Error> {
        self.ensure_scrollable("fetch_prev")?;
        self.scroll(OCI_FETCH_PRIOR, 0)
    }

    /// Random access navigation. Requires a scrollable result set.
    pub fn fetch_seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<bool, Error> {
        self.ensure_scrollable("fetch_seek")?;
        match origin {
            SeekOrigin::Start => self.scroll(OCI_FETCH_ABSOLUTE, offset),
            SeekOrigin::Current => self.scroll(OCI_FETCH_RELATIVE, offset),
            SeekOrigin::End => {
                if !self.scroll(OCI_FETCH_LAST, 0)? {
                    return Ok(false);
                }
                if offset == 0 {
                    return Ok(true);
                }
                self.scroll(OCI_FETCH_RELATIVE, -offset)
            }
        }
    }

    /// `true` once forward navigation has consumed the last row.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// `true` while no row has been fetched yet (or navigation moved before the first row).
    pub fn is_bof(&self) -> bool {
        self.bof
    }

    /// Raw OCI status of the last fetch call, for diagnosing odd server behavior.
    pub fn last_fetch_status(&self) -> i32 {
        self.fetch_status
    }

    fn ensure_scrollable(&self, location: &'static str) -> Result<(), Error> {
        if !self.scrollable {
            return Err(self.raise(Error::NotScrollable, location));
        }
        Ok(())
    }

    fn scroll(&mut self, orientation: Ub2, offset: i64) -> Result<bool, Error> {
        let fetched = self.vendor_fetch(orientation, offset, 1)?;
        if fetched == 0 {
            match orientation {
                OCI_FETCH_PRIOR => self.bof = true,
                _ => self.eof = true,
            }
            return Ok(false);
        }
        self.row_fetched = fetched;
        self.row_cur = 1;
        self.eof = false;
        self.bof = false;
        self.row_abs = self.current_position()?;
        Ok(true)
    }

    fn vendor_fetch(
        &mut self,
        orientation: Ub2,
        offset: i64,
        rows: usize,
    ) -> Result<usize, Error> {
        for define in &mut self.defines {
            if let DefineBuffer::Long(state) = &mut define.buffer {
                state.reset_row();
            }
        }
        let oci = self.conn.environment().oci();
        let status = if let Some(fetch2) = oci.stmt_fetch2 {
            unsafe {
                fetch2(
                    self.stmt,
                    self.conn.err_ptr(),
                    rows as Ub4,
                    orientation,
                    offset as Sb4,
                    OCI_DEFAULT,
                )
            }
        } else {
            unsafe {
                (oci.stmt_fetch)(
                    self.stmt,
                    self.conn.err_ptr(),
                    rows as Ub4,
                    orientation,
                    OCI_DEFAULT,
                )
            }
        };
        self.fetch_status = status;
        for define in &mut self.defines {
            if let DefineBuffer::Long(state) = &mut define.buffer {
                state.finish_row();
            }
        }
        let outcome = self.conn.resolve_opt_for(
            status.into_oci_result("OCIStmtFetch2"),
            SourceKind::ResultSet,
            &self.sql,
            "fetch",
        )?;
        let rows_fetched = self.rows_fetched_attr()?;
        if outcome.is_none() {
            // NoData still transfers the final partial batch.
            self.eof = true;
        }
        Ok(rows_fetched)
    }

    fn rows_fetched_attr(&self) -> Result<usize, Error> {
        let mut rows: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut rows as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_ROWS_FETCHED,
                self.conn.err_ptr(),
            )
        };
        self.conn
            .resolve_for(
                status.into_oci_result("OCIAttrGet(rows fetched)"),
                SourceKind::ResultSet,
                &self.sql,
                "fetch",
            )
            .map(|()| rows as usize)
    }

    fn current_position(&self) -> Result<u64, Error> {
        let mut position: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.stmt as *const c_void,
                OCI_HTYPE_STMT,
                &mut position as *mut Ub4 as *mut c_void,
                null_mut(),
                OCI_ATTR_CURRENT_POSITION,
                self.conn.err_ptr(),
            )
        };
        self.conn
            .resolve_for(
                status.into_oci_result("OCIAttrGet(current position)"),
                SourceKind::ResultSet,
                &self.sql,
                "fetch",
            )
            .map(|()| position as u64)
    }

    // Value extraction for the current row.

    /// `true` if the column holds SQL NULL in the current row. Object columns are NULL when the
    /// leading atomic indicator of their indicator struct says so.
    pub fn is_null(&self, index: usize) -> Result<bool, Error> {
        let (define, row) = self.define_at(index)?;
        Ok(define.is_null(row))
    }

    pub fn get_i32(&self, index: usize) -> Result<Option<i32>, Error> {
        self.get_i64(index)?
            .map(|v| {
                v.try_into().map_err(|_| {
                    self.raise(
                        Error::OutOfRange {
                            argument: "value does not fit into i32",
                        },
                        "get_i32",
                    )
                })
            })
            .transpose()
    }

    pub fn get_i64(&self, index: usize) -> Result<Option<i64>, Error> {
        match self.numeric_at(index)? {
            Some(value) => number::to_i64(self.conn, &value).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_u64(&self, index: usize) -> Result<Option<u64>, Error> {
        match self.numeric_at(index)? {
            Some(value) => number::to_u64(self.conn, &value).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_f64(&self, index: usize) -> Result<Option<f64>, Error> {
        match self.numeric_at(index)? {
            Some(value) => number::to_f64(self.conn, &value).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_f32(&self, index: usize) -> Result<Option<f32>, Error> {
        Ok(self.get_f64(index)?.map(|v| v as f32))
    }

    pub fn get_bool(&self, index: usize) -> Result<Option<bool>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Boolean, DefineBuffer::Bytes { data, elem_size }) => {
                let mut value = 0i32;
                unsafe {
                    std::ptr::copy_nonoverlapping(
                        data.as_ptr().add(row * elem_size),
                        &mut value as *mut i32 as *mut u8,
                        size_of::<i32>(),
                    );
                }
                Ok(Some(value != 0))
            }
            _ => Err(self.type_mismatch(index, "boolean")),
        }
    }

    /// Value converted to text: character, numeric, date and timestamp columns.
    pub fn get_string(&self, index: usize) -> Result<Option<String>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Text, DefineBuffer::Bytes { data, elem_size }) => {
                let start = row * elem_size;
                let bytes = &data[start..start + elem_size];
                let units: &[DbChar] = unsafe {
                    std::slice::from_raw_parts(
                        bytes.as_ptr() as *const DbChar,
                        elem_size / size_of::<DbChar>(),
                    )
                };
                let terminator = units.iter().position(|&c| c == 0).unwrap_or(units.len());
                Ok(Some(slice_to_cow_utf8(&units[..terminator]).into_owned()))
            }
            (DataKind::Numeric, _) => {
                let value = self.numeric_at(index)?.unwrap();
                number::to_text(self.conn, &value).map(Some)
            }
            (DataKind::Date, _) => {
                let date = self.get_date(index)?.unwrap();
                date.to_text().map(Some)
            }
            (DataKind::Timestamp(_), _) => {
                let timestamp = self.get_timestamp(index)?.unwrap();
                timestamp.to_text().map(Some)
            }
            _ => Err(self.type_mismatch(index, "text")),
        }
    }

    /// Raw bytes of a RAW column.
    pub fn get_bytes(&self, index: usize) -> Result<Option<Vec<u8>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Raw, DefineBuffer::Bytes { data, elem_size }) => {
                let len = define.lengths.get(row).min(*elem_size);
                let start = row * elem_size;
                Ok(Some(data[start..start + len].to_vec()))
            }
            _ => Err(self.type_mismatch(index, "raw bytes")),
        }
    }

    pub fn get_date(&self, index: usize) -> Result<Option<Date<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Date, DefineBuffer::Bytes { data, elem_size }) => {
                let mut raw = OciDate::default();
                unsafe {
                    std::ptr::copy_nonoverlapping(
                        data.as_ptr().add(row * elem_size),
                        &mut raw as *mut OciDate as *mut u8,
                        size_of::<OciDate>(),
                    );
                }
                Ok(Some(Date::from_raw(self.conn, raw)))
            }
            _ => Err(self.type_mismatch(index, "date")),
        }
    }

    pub fn get_timestamp(&self, index: usize) -> Result<Option<Timestamp<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Timestamp(kind), DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                Timestamp::fetched(self.conn, ptrs[row] as *mut OciDateTime, *kind),
            )),
            _ => Err(self.type_mismatch(index, "timestamp")),
        }
    }

    pub fn get_interval(&self, index: usize) -> Result<Option<Interval<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Interval(kind), DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                Interval::fetched(self.conn, ptrs[row] as *mut OciIntervalDesc, *kind),
            )),
            _ => Err(self.type_mismatch(index, "interval")),
        }
    }

    /// LOB locator of the current row. The locator is owned by the result set's define buffers;
    /// the returned handle borrows it.
    pub fn get_lob(&self, index: usize) -> Result<Option<Lob<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Lob(kind), DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                Lob::fetched(self.conn, ptrs[row] as *mut OciLobLocator, *kind),
            )),
            _ => Err(self.type_mismatch(index, "lob")),
        }
    }

    pub fn get_file(&self, index: usize) -> Result<Option<File<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::File(kind), DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                File::fetched(self.conn, ptrs[row] as *mut OciLobLocator, *kind),
            )),
            _ => Err(self.type_mismatch(index, "file")),
        }
    }

    /// Buffered LONG column content of the current row.
    pub fn get_long(&mut self, index: usize) -> Result<&mut Long, Error> {
        let row_cur = self.row_cur;
        if row_cur == 0 {
            return Err(self.raise(
                Error::StatementState {
                    details: "no current row; call fetch_next first",
                },
                "get_long",
            ));
        }
        let sql = self.sql.clone();
        let conn = self.conn;
        match self.defines.get_mut(index.wrapping_sub(1)) {
            Some(define) => match &mut define.buffer {
                DefineBuffer::Long(state) => Ok(&mut state.long),
                _ => {
                    let error = Error::TypeMismatch {
                        from: "column",
                        to: "long",
                    };
                    conn.environment().raise(
                        &error,
                        SourceKind::ResultSet,
                        &sql,
                        None,
                        "get_long",
                    );
                    Err(error)
                }
            },
            None => {
                let error = Error::OutOfRange {
                    argument: "column index",
                };
                conn.environment()
                    .raise(&error, SourceKind::ResultSet, &sql, None, "get_long");
                Err(error)
            }
        }
    }

    /// Nested cursor of the current row, opened as its own result set.
    pub fn get_cursor(&self, index: usize) -> Result<Option<ResultSet<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Cursor, DefineBuffer::Cursors { ptrs }) => {
                let child = ptrs[row];
                let columns = describe_columns(self.conn, child, &self.sql)?;
                let defines = allocate_defines(
                    self.conn,
                    child,
                    &self.sql,
                    columns,
                    1,
                    crate::statement::DEFAULT_LONG_MAX_SIZE as usize,
                    crate::statement::DEFAULT_PIECE_SIZE as usize,
                )?;
                Ok(Some(ResultSet {
                    conn: self.conn,
                    stmt: child,
                    sql: self.sql.clone(),
                    scrollable: false,
                    batch_rows: 1,
                    defines,
                    name_map: RefCell::new(None),
                    row_abs: 0,
                    row_cur: 0,
                    row_fetched: 0,
                    fetch_status: 0,
                    eof: false,
                    bof: true,
                    _stmt: PhantomData,
                }))
            }
            _ => Err(self.type_mismatch(index, "cursor")),
        }
    }

    pub fn get_reference(&self, index: usize) -> Result<Option<Reference<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Reference, DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                Reference::fetched(self.conn, ptrs[row] as *mut OciRefDesc),
            )),
            _ => Err(self.type_mismatch(index, "reference")),
        }
    }

    pub fn get_object(&self, index: usize) -> Result<Option<Object<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Object, DefineBuffer::Descriptors { ptrs, .. }) => {
                let instance = ptrs[row];
                if instance.is_null() {
                    return Ok(None);
                }
                Ok(Some(Object::fetched(
                    self.conn,
                    instance,
                    define.object_indicators.get(row).copied().unwrap_or(null_mut()),
                    define.column.type_schema.clone().unwrap_or_default(),
                    define.column.type_name.clone().unwrap_or_default(),
                )))
            }
            _ => Err(self.type_mismatch(index, "object")),
        }
    }

    pub fn get_vector(&self, index: usize) -> Result<Option<Vector<'_, 'env>>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Vector, DefineBuffer::Descriptors { ptrs, .. }) => Ok(Some(
                Vector::fetched(self.conn, ptrs[row] as *mut OciVectorDesc),
            )),
            _ => Err(self.type_mismatch(index, "vector")),
        }
    }

    fn numeric_at(&self, index: usize) -> Result<Option<OciNumber>, Error> {
        let (define, row) = self.define_at(index)?;
        if define.is_null(row) {
            return Ok(None);
        }
        match (&define.column.kind, &define.buffer) {
            (DataKind::Numeric, DefineBuffer::Bytes { data, elem_size }) => {
                let mut value = OciNumber::default();
                unsafe {
                    std::ptr::copy_nonoverlapping(
                        data.as_ptr().add(row * elem_size),
                        value.bytes.as_mut_ptr(),
                        size_of::<OciNumber>(),
                    );
                }
                Ok(Some(value))
            }
            _ => Err(self.type_mismatch(index, "numeric")),
        }
    }

    /// Define and 0-based row index of the current row, after bounds checks.
    fn define_at(&self, index: usize) -> Result<(&Define, usize), Error> {
        if self.row_cur == 0 {
            return Err(self.raise(
                Error::StatementState {
                    details: "no current row; call fetch_next first",
                },
                "get",
            ));
        }
        let define = self.defines.get(index.wrapping_sub(1)).ok_or_else(|| {
            self.raise(
                Error::OutOfRange {
                    argument: "column index",
                },
                "get",
            )
        })?;
        Ok((define, self.row_cur - 1))
    }

    fn type_mismatch(&self, index: usize, target: &'static str) -> Error {
        let from = self
            .defines
            .get(index.wrapping_sub(1))
            .map(|d| match d.column.kind {
                DataKind::Numeric => "numeric column",
                DataKind::Text => "text column",
                DataKind::Raw => "raw column",
                DataKind::Date => "date column",
                DataKind::Timestamp(_) => "timestamp column",
                DataKind::Interval(_) => "interval column",
                DataKind::Lob(_) => "lob column",
                DataKind::File(_) => "file column",
                DataKind::Long(_) => "long column",
                DataKind::Cursor => "cursor column",
                DataKind::Object => "object column",
                DataKind::Reference => "reference column",
                DataKind::Boolean => "boolean column",
                DataKind::Vector => "vector column",
            })
            .unwrap_or("column");
        self.raise(Error::TypeMismatch { from, to: target }, "get")
    }

    fn raise(&self, error: Error, location: &'static str) -> Error {
        self.conn.environment().raise(
            &error,
            SourceKind::ResultSet,
            &self.sql,
            None,
            location,
        );
        error
    }
}

impl Drop for ResultSet<'_, '_> {
    fn drop(&mut self) {
        release_defines(self.conn, &mut self.defines);
    }
}
