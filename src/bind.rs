//! Bind registry and bind buffers.
//!
//! Binds come in two allocation modes. *Internal* binds copy the value into driver owned
//! buffers, which keeps the unsafe address pinning entirely inside this module. *External*
//! binds hand a caller pointer straight to the client and are exposed as `unsafe`. A bind's
//! mode is fixed at first registration; mixing them on one placeholder is refused.

use std::{
    collections::HashMap,
    ffi::c_void,
    mem::size_of,
    ptr::null_mut,
};

use crate::{
    error::Error,
    oci::{
        constants::{
            OCI_IND_NOTNULL, OCI_IND_NULL, SQLT_BDOUBLE, SQLT_BFLOAT, SQLT_INT, SQLT_LBI,
            SQLT_LNG, SQLT_ODT, SQLT_VNU,
        },
        types::{OciBindHandle, OciDate, OciNumber, Ub1, Ub2, Ub4},
    },
    text::{DbChar, DbText},
};

/// Direction of a bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindDirection {
    #[default]
    In,
    Out,
    InOut,
}

/// Who owns the bound memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindAllocMode {
    /// Buffers are allocated and owned by the driver; values are copied in and out.
    Internal,
    /// The caller owns the memory; the driver only forwards the address.
    External,
}

/// Addresses a bind either by placeholder name or by position (1-based, in registration order).
#[derive(Debug, Clone)]
pub enum BindSpec {
    Named(String),
    Positional(u32),
}

impl From<&str> for BindSpec {
    fn from(name: &str) -> Self {
        BindSpec::Named(name.to_string())
    }
}

impl From<u32> for BindSpec {
    fn from(position: u32) -> Self {
        BindSpec::Positional(position)
    }
}

/// Normalizes a placeholder the way the server reports it: leading colon stripped, undelimited
/// identifiers upper cased.
pub(crate) fn normalize_bind_name(name: &str) -> String {
    let name = name.strip_prefix(':').unwrap_or(name);
    if name.starts_with('"') && name.ends_with('"') && name.len() >= 2 {
        name[1..name.len() - 1].to_string()
    } else {
        name.to_uppercase()
    }
}

/// Scalar types which can be bound by copying them into a fixed stride buffer.
///
/// # Safety
///
/// `SQLT` must describe the memory layout of `Self` exactly; the client reads and writes the
/// buffer through it.
pub unsafe trait FixedSizedBind: Copy + Default {
    const SQLT: Ub2;
}

unsafe impl FixedSizedBind for i16 {
    const SQLT: Ub2 = SQLT_INT;
}
unsafe impl FixedSizedBind for i32 {
    const SQLT: Ub2 = SQLT_INT;
}
unsafe impl FixedSizedBind for i64 {
    const SQLT: Ub2 = SQLT_INT;
}
unsafe impl FixedSizedBind for f32 {
    const SQLT: Ub2 = SQLT_BFLOAT;
}
unsafe impl FixedSizedBind for f64 {
    const SQLT: Ub2 = SQLT_BDOUBLE;
}
unsafe impl FixedSizedBind for OciDate {
    const SQLT: Ub2 = SQLT_ODT;
}
unsafe impl FixedSizedBind for OciNumber {
    const SQLT: Ub2 = SQLT_VNU;
}

/// Driver owned value storage of one bind.
pub(crate) enum BindData {
    /// Fixed stride scalars (integers, floats, dates, numbers).
    Fixed {
        bytes: Vec<u8>,
        elem_size: usize,
    },
    /// Zero terminated strings in database text form, fixed stride of `max_chars + 1` units.
    Text {
        units: Vec<DbChar>,
        max_chars: usize,
    },
    /// Raw byte strings, fixed stride.
    Binary {
        bytes: Vec<u8>,
        max_len: usize,
    },
    /// Caller owned memory.
    External {
        ptr: *mut c_void,
        elem_size: usize,
    },
    /// Data at execute: the value is streamed through a piecewise callback.
    Piecewise(Box<PiecewiseSource>),
}

impl BindData {
    fn ptr(&mut self) -> *mut c_void {
        match self {
            BindData::Fixed { bytes, .. } => bytes.as_mut_ptr() as *mut c_void,
            BindData::Text { units, .. } => units.as_mut_ptr() as *mut c_void,
            BindData::Binary { bytes, .. } => bytes.as_mut_ptr() as *mut c_void,
            BindData::External { ptr, .. } => *ptr,
            BindData::Piecewise(_) => null_mut(),
        }
    }

    fn elem_size(&self) -> usize {
        match self {
            BindData::Fixed { elem_size, .. } => *elem_size,
            BindData::Text { max_chars, .. } => (max_chars + 1) * size_of::<DbChar>(),
            BindData::Binary { max_len, .. } => *max_len,
            BindData::External { elem_size, .. } => *elem_size,
            BindData::Piecewise(source) => source.total_len,
        }
    }
}

/// State driving a data-at-execute (piecewise) IN bind. The client pulls the value in pieces
/// through [`in_bind_callback`].
pub(crate) struct PiecewiseSource {
    pub data: Vec<u8>,
    pub piece_size: usize,
    pub position: usize,
    /// Total length the bind was declared with. The last piece is recognized when the cumulative
    /// length reaches it, or when the source runs dry.
    pub total_len: usize,
}

impl PiecewiseSource {
    /// Piece label and slice for the next transfer. Mirrors the first/next/last protocol.
    pub(crate) fn next_piece(&mut self) -> (Ub1, &[u8]) {
        use crate::oci::constants::{OCI_FIRST_PIECE, OCI_LAST_PIECE, OCI_NEXT_PIECE, OCI_ONE_PIECE};
        let remaining = self.data.len().saturating_sub(self.position);
        let len = remaining.min(self.piece_size);
        let first = self.position == 0;
        let last = len == remaining || self.position + len >= self.total_len;
        let piece = match (first, last) {
            (true, true) => OCI_ONE_PIECE,
            (true, false) => OCI_FIRST_PIECE,
            (false, false) => OCI_NEXT_PIECE,
            (false, true) => OCI_LAST_PIECE,
        };
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        (piece, slice)
    }
}

/// Accumulator filled by a dynamic OUT bind, one buffer per iteration.
pub(crate) struct DynamicSink {
    pub pieces: Vec<Vec<u8>>,
    pub piece_size: usize,
    /// Scratch buffer handed to the client for the piece in flight.
    pub scratch: Vec<u8>,
    pub scratch_len: Ub4,
    /// A handed out scratch buffer has not been folded into `pieces` yet.
    pub pending: bool,
    /// Iteration the piece in flight belongs to.
    pub last_iter: usize,
    pub indicator: i16,
    pub return_code: Ub2,
}

impl DynamicSink {
    fn new(piece_size: usize) -> Self {
        DynamicSink {
            pieces: Vec::new(),
            piece_size,
            scratch: vec![0; piece_size],
            scratch_len: piece_size as Ub4,
            pending: false,
            last_iter: 0,
            indicator: 0,
            return_code: 0,
        }
    }

    /// Folds the scratch buffer of the finished piece into the accumulated value for `iter`.
    pub(crate) fn absorb_piece(&mut self, iter: usize) {
        while self.pieces.len() <= iter {
            self.pieces.push(Vec::new());
        }
        let len = self.scratch_len as usize;
        self.pieces[iter].extend_from_slice(&self.scratch[..len.min(self.scratch.len())]);
        self.scratch_len = self.piece_size as Ub4;
        self.pending = false;
    }

    /// Folds the final piece after execution completed.
    pub(crate) fn finish(&mut self) {
        if self.pending {
            let iter = self.last_iter;
            self.absorb_piece(iter);
        }
    }
}

/// One bind of a statement.
pub(crate) struct Bind {
    pub name: Option<String>,
    pub position: u32,
    pub direction: BindDirection,
    pub sqlt: Ub2,
    pub alloc_mode: BindAllocMode,
    pub data: BindData,
    pub indicators: Vec<i16>,
    /// Actual value lengths per element; `SQLT_STR` binds leave it to the terminator.
    pub lengths: Vec<Ub2>,
    pub return_codes: Vec<Ub2>,
    pub elem_count: u32,
    pub is_array: bool,
    /// Sink of a dynamic OUT bind.
    pub sink: Option<Box<DynamicSink>>,
    /// Vendor bind handle. Owned by the statement handle, not freed individually.
    pub bindp: *mut OciBindHandle,
}

impl Bind {
    pub(crate) fn value_ptr(&mut self) -> *mut c_void {
        self.data.ptr()
    }

    pub(crate) fn elem_size(&self) -> usize {
        self.data.elem_size()
    }

    /// `true` if the replacement value fits the existing layout, so the buffer address stays
    /// pinned.
    fn layout_matches(&self, sqlt: Ub2, elem_size: usize, elem_count: u32) -> bool {
        self.sqlt == sqlt && self.elem_size() == elem_size && self.elem_count == elem_count
    }

    /// Copies the contents of a layout compatible replacement into the existing buffers.
    fn copy_data_from(&mut self, replacement: &BindData) -> Result<(), Error> {
        match (&mut self.data, replacement) {
            (BindData::Fixed { bytes: old, .. }, BindData::Fixed { bytes: new, .. })
                if old.len() == new.len() =>
            {
                old.copy_from_slice(new);
                Ok(())
            }
            (BindData::Text { units: old, .. }, BindData::Text { units: new, .. })
                if old.len() == new.len() =>
            {
                old.copy_from_slice(new);
                Ok(())
            }
            (BindData::Binary { bytes: old, .. }, BindData::Binary { bytes: new, .. })
                if old.len() == new.len() =>
            {
                old.copy_from_slice(new);
                Ok(())
            }
            // The caller owns external memory; a pinned external bind must keep its address.
            (
                BindData::External { ptr: old, .. },
                BindData::External { ptr: new, .. },
            ) if *old == *new => Ok(()),
            // Piecewise sources are pulled through the callback; the address the client pinned
            // is the callback context, which stays put.
            (BindData::Piecewise(old), BindData::Piecewise(new)) => {
                old.data = new.data.clone();
                old.piece_size = new.piece_size;
                old.position = 0;
                old.total_len = new.total_len;
                Ok(())
            }
            _ => Err(Error::StatementState {
                details: "bind buffers are pinned after execute; rebind with the same layout",
            }),
        }
    }
}

fn copy_into<T: Copy>(target: &mut [T], source: &[T]) {
    let len = target.len().min(source.len());
    target[..len].copy_from_slice(&source[..len]);
}

/// Growth granularity of the bind array; registrations reserve in blocks rather than one by
/// one.
const BIND_BLOCK: usize = 16;

/// Registry of the binds of one statement: the bind array plus a name to index map.
#[derive(Default)]
pub(crate) struct BindRegistry {
    binds: Vec<Bind>,
    by_name: HashMap<String, usize>,
    /// Once the statement executed, buffer addresses are pinned until re-prepare or close.
    pinned: bool,
}

impl BindRegistry {
    pub fn clear(&mut self) {
        self.binds.clear();
        self.by_name.clear();
        self.pinned = false;
    }

    pub fn pin(&mut self) {
        self.pinned = true;
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bind> {
        self.binds.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Bind> {
        self.binds.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bind> {
        self.binds.get_mut(index)
    }

    /// Index of `spec`, if a bind has been registered under it.
    pub fn lookup(&self, spec: &BindSpec) -> Option<usize> {
        match spec {
            BindSpec::Named(name) => self.by_name.get(&normalize_bind_name(name)).copied(),
            BindSpec::Positional(position) => {
                let index = position.checked_sub(1)? as usize;
                (index < self.binds.len()).then_some(index)
            }
        }
    }

    /// Registers a new bind or replaces the value of an existing one. Returns the bind index
    /// and whether the statement has to (re)issue the vendor bind call: once the statement
    /// executed, buffer addresses are pinned and compatible values are copied in place instead.
    ///
    /// Replacement enforces two invariants: the allocation mode is fixed at first registration,
    /// and once the statement executed, only layout compatible values are accepted (the client
    /// captured the buffer addresses).
    pub fn upsert(
        &mut self,
        spec: &BindSpec,
        direction: BindDirection,
        sqlt: Ub2,
        alloc_mode: BindAllocMode,
        data: BindData,
        indicators: Vec<i16>,
        lengths: Vec<Ub2>,
        elem_count: u32,
        is_array: bool,
    ) -> Result<(usize, bool), Error> {
        if let Some(index) = self.lookup(spec) {
            let elem_size = data.elem_size();
            let bind = &mut self.binds[index];
            if bind.alloc_mode != alloc_mode {
                return Err(match alloc_mode {
                    BindAllocMode::External => Error::ExternalBindingNotAllowed {
                        name: bind_display_name(bind),
                    },
                    BindAllocMode::Internal => Error::InvalidValue {
                        argument: "bind allocation mode (bind is externally allocated)",
                    },
                });
            }
            if self.pinned {
                if !bind.layout_matches(sqlt, elem_size, elem_count) {
                    return Err(Error::StatementState {
                        details:
                            "bind buffers are pinned after execute; rebind with the same layout",
                    });
                }
                // Same layout: refresh the contents without moving the buffers the client has
                // captured.
                bind.copy_data_from(&data)?;
                copy_into(&mut bind.indicators, &indicators);
                copy_into(&mut bind.lengths, &lengths);
                bind.direction = direction;
                return Ok((index, false));
            }
            bind.direction = direction;
            bind.sqlt = sqlt;
            bind.data = data;
            bind.elem_count = elem_count;
            bind.is_array = is_array;
            bind.indicators = indicators;
            bind.lengths = lengths;
            ensure_aux_arrays(bind);
            return Ok((index, true));
        }

        if self.binds.len() == self.binds.capacity() {
            self.binds.reserve(BIND_BLOCK);
        }
        let position = self.binds.len() as u32 + 1;
        let name = match spec {
            BindSpec::Named(name) => Some(normalize_bind_name(name)),
            BindSpec::Positional(_) => None,
        };
        let mut bind = Bind {
            name: name.clone(),
            position,
            direction,
            sqlt,
            alloc_mode,
            data,
            indicators,
            lengths,
            return_codes: Vec::new(),
            elem_count,
            is_array,
            sink: None,
            bindp: null_mut(),
        };
        ensure_aux_arrays(&mut bind);
        let index = self.binds.len();
        self.binds.push(bind);
        if let Some(name) = name {
            self.by_name.insert(name, index);
        }
        Ok((index, true))
    }

    /// Bytes of driver owned buffer memory currently held by the binds.
    pub fn buffer_bytes(&self) -> u64 {
        self.binds
            .iter()
            .map(|bind| match &bind.data {
                BindData::Fixed { bytes, .. } => bytes.len() as u64,
                BindData::Text { units, .. } => (units.len() * size_of::<DbChar>()) as u64,
                BindData::Binary { bytes, .. } => bytes.len() as u64,
                BindData::External { .. } => 0,
                BindData::Piecewise(source) => source.data.len() as u64,
            })
            .sum()
    }

    /// Resolves `spec` or reports which name was missing.
    pub fn require(&self, spec: &BindSpec) -> Result<usize, Error> {
        self.lookup(spec).ok_or_else(|| Error::ItemNotFound {
            name: match spec {
                BindSpec::Named(name) => normalize_bind_name(name),
                BindSpec::Positional(position) => format!("bind #{position}"),
            },
        })
    }
}

fn bind_display_name(bind: &Bind) -> String {
    bind.name
        .clone()
        .unwrap_or_else(|| format!("bind #{}", bind.position))
}

fn ensure_aux_arrays(bind: &mut Bind) {
    let count = bind.elem_count.max(1) as usize;
    bind.indicators.resize(count, OCI_IND_NOTNULL);
    bind.lengths.resize(count, 0);
    bind.return_codes.resize(count, 0);
}

// Helpers building driver owned buffers out of safe values.

pub(crate) fn fixed_data<T: FixedSizedBind>(values: &[Option<T>]) -> (BindData, Vec<i16>) {
    let elem_size = size_of::<T>();
    let mut bytes = vec![0u8; elem_size * values.len().max(1)];
    let mut indicators = vec![OCI_IND_NOTNULL; values.len().max(1)];
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(value) => unsafe {
                std::ptr::copy_nonoverlapping(
                    value as *const T as *const u8,
                    bytes.as_mut_ptr().add(i * elem_size),
                    elem_size,
                );
            },
            None => indicators[i] = OCI_IND_NULL,
        }
    }
    (BindData::Fixed { bytes, elem_size }, indicators)
}

pub(crate) fn text_data(
    values: &[Option<&str>],
    max_chars: usize,
) -> Result<(BindData, Vec<i16>, Vec<Ub2>), Error> {
    let stride = max_chars + 1;
    let mut units = vec![0 as DbChar; stride * values.len().max(1)];
    let mut indicators = vec![OCI_IND_NOTNULL; values.len().max(1)];
    let mut lengths = vec![0 as Ub2; values.len().max(1)];
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(value) => {
                let encoded = DbText::new(value);
                if encoded.len_char() > max_chars {
                    return Err(Error::OutOfRange {
                        argument: "string exceeds the declared bind size",
                    });
                }
                let target = &mut units[i * stride..];
                copy_db_text(&encoded, target);
                lengths[i] = ((encoded.len_char() + 1) * size_of::<DbChar>()) as Ub2;
            }
            None => indicators[i] = OCI_IND_NULL,
        }
    }
    Ok((BindData::Text { units, max_chars }, indicators, lengths))
}

fn copy_db_text(text: &DbText<'_>, target: &mut [DbChar]) {
    // DbText exposes its units through the raw pointer only; length is in characters.
    let len = text.len_char();
    unsafe {
        std::ptr::copy_nonoverlapping(text.ptr() as *const DbChar, target.as_mut_ptr(), len);
    }
    target[len] = 0;
}

pub(crate) fn binary_data(
    values: &[Option<&[u8]>],
    max_len: usize,
) -> Result<(BindData, Vec<i16>, Vec<Ub2>), Error> {
    let mut bytes = vec![0u8; max_len * values.len().max(1)];
    let mut indicators = vec![OCI_IND_NOTNULL; values.len().max(1)];
    let mut lengths = vec![0 as Ub2; values.len().max(1)];
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(value) => {
                if value.len() > max_len {
                    return Err(Error::OutOfRange {
                        argument: "byte string exceeds the declared bind size",
                    });
                }
                bytes[i * max_len..i * max_len + value.len()].copy_from_slice(value);
                lengths[i] = value.len() as Ub2;
            }
            None => indicators[i] = OCI_IND_NULL,
        }
    }
    Ok((BindData::Binary { bytes, max_len }, indicators, lengths))
}

/// SQL type code used for a piecewise (LONG) bind of the given flavour.
pub(crate) fn piecewise_sqlt(binary: bool) -> Ub2 {
    if binary {
        SQLT_LBI
    } else {
        SQLT_LNG
    }
}

pub(crate) fn dynamic_sink(piece_size: usize) -> Box<DynamicSink> {
    Box::new(DynamicSink::new(piece_size))
}

// The extern callbacks the client drives piecewise and dynamic binds through. The context
// pointers are the boxed state structs above, owned by the bind they belong to.

pub(crate) unsafe extern "C" fn in_bind_callback(
    ictxp: *mut c_void,
    _bindp: *mut OciBindHandle,
    _iter: Ub4,
    _index: Ub4,
    bufpp: *mut *mut c_void,
    alenp: *mut Ub4,
    piecep: *mut Ub1,
    indp: *mut *mut c_void,
) -> i32 {
    let source = unsafe { &mut *(ictxp as *mut PiecewiseSource) };
    let (piece, slice) = source.next_piece();
    unsafe {
        *bufpp = slice.as_ptr() as *mut c_void;
        *alenp = slice.len() as Ub4;
        *piecep = piece;
        *indp = null_mut();
    }
    crate::oci::constants::OCI_CONTINUE
}

pub(crate) unsafe extern "C" fn out_bind_callback(
    octxp: *mut c_void,
    _bindp: *mut OciBindHandle,
    iter: Ub4,
    index: Ub4,
    bufpp: *mut *mut c_void,
    alenp: *mut *mut Ub4,
    piecep: *mut Ub1,
    indp: *mut *mut c_void,
    rcodep: *mut *mut Ub2,
) -> i32 {
    let sink = unsafe { &mut *(octxp as *mut DynamicSink) };
    let _ = index;
    if sink.pending {
        let finished = sink.last_iter;
        sink.absorb_piece(finished);
    }
    sink.last_iter = iter as usize;
    sink.pending = true;
    unsafe {
        *bufpp = sink.scratch.as_mut_ptr() as *mut c_void;
        sink.scratch_len = sink.piece_size as Ub4;
        *alenp = &mut sink.scratch_len;
        *piecep = crate::oci::constants::OCI_NEXT_PIECE;
        *indp = &mut sink.indicator as *mut i16 as *mut c_void;
        *rcodep = &mut sink.return_code;
    }
    crate::oci::constants::OCI_CONTINUE
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_bind_name, BindAllocMode, BindDirection, BindRegistry, BindSpec, PiecewiseSource,
        fixed_data,
    };
    use crate::oci::constants::{
        OCI_FIRST_PIECE, OCI_IND_NULL, OCI_LAST_PIECE, OCI_NEXT_PIECE, OCI_ONE_PIECE, SQLT_INT,
    };

    #[test]
    fn bind_names_normalize_like_the_server() {
        assert_eq!("ID", normalize_bind_name(":id"));
        assert_eq!("ID", normalize_bind_name("Id"));
        assert_eq!("lower", normalize_bind_name("\"lower\""));
    }

    #[test]
    fn named_binds_resolve_case_insensitively() {
        let mut registry = BindRegistry::default();
        let (data, indicators) = fixed_data(&[Some(42i32)]);
        registry
            .upsert(
                &BindSpec::from(":count"),
                BindDirection::In,
                SQLT_INT,
                BindAllocMode::Internal,
                data,
                indicators,
                vec![0],
                1,
                false,
            )
            .unwrap();
        assert_eq!(Some(0), registry.lookup(&BindSpec::from(":COUNT")));
        assert_eq!(Some(0), registry.lookup(&BindSpec::from(1u32)));
        assert_eq!(None, registry.lookup(&BindSpec::from(":other")));
    }

    #[test]
    fn rebinding_externally_over_internal_is_refused() {
        let mut registry = BindRegistry::default();
        let (data, indicators) = fixed_data(&[Some(1i32)]);
        registry
            .upsert(
                &BindSpec::from(":v"),
                BindDirection::In,
                SQLT_INT,
                BindAllocMode::Internal,
                data,
                indicators,
                vec![0],
                1,
                false,
            )
            .unwrap();
        let mut value = 7i32;
        let result = registry.upsert(
            &BindSpec::from(":v"),
            BindDirection::In,
            SQLT_INT,
            BindAllocMode::External,
            super::BindData::External {
                ptr: &mut value as *mut i32 as *mut std::ffi::c_void,
                elem_size: 4,
            },
            vec![0],
            vec![0],
            1,
            false,
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::ExternalBindingNotAllowed { .. })
        ));

        // Rebinding internally with the same layout stays fine, even once pinned. The buffer is
        // refreshed in place; no new vendor bind call is needed.
        registry.pin();
        let (data, indicators) = fixed_data(&[Some(8i32)]);
        let (index, needs_bind) = registry
            .upsert(
                &BindSpec::from(":v"),
                BindDirection::In,
                SQLT_INT,
                BindAllocMode::Internal,
                data,
                indicators,
                vec![0],
                1,
                false,
            )
            .unwrap();
        assert_eq!(0, index);
        assert!(!needs_bind);
    }

    #[test]
    fn pinned_binds_refuse_layout_changes() {
        let mut registry = BindRegistry::default();
        let (data, indicators) = fixed_data(&[Some(1i32)]);
        registry
            .upsert(
                &BindSpec::from(":v"),
                BindDirection::In,
                SQLT_INT,
                BindAllocMode::Internal,
                data,
                indicators,
                vec![0],
                1,
                false,
            )
            .unwrap();
        registry.pin();
        let (data, indicators) = fixed_data(&[Some(1i64)]);
        let result = registry.upsert(
            &BindSpec::from(":v"),
            BindDirection::In,
            SQLT_INT,
            BindAllocMode::Internal,
            data,
            indicators,
            vec![0],
            1,
            false,
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::StatementState { .. })
        ));
    }

    #[test]
    fn null_values_set_the_indicator() {
        let (_, indicators) = fixed_data(&[Some(1i32), None, Some(3)]);
        assert_eq!(vec![0, OCI_IND_NULL, 0], indicators);
    }

    #[test]
    fn piecewise_source_labels_pieces() {
        let mut source = PiecewiseSource {
            data: vec![0u8; 10],
            piece_size: 4,
            position: 0,
            total_len: 10,
        };
        let labels: Vec<u8> = std::iter::from_fn(|| {
            (source.position < source.data.len()).then(|| source.next_piece().0)
        })
        .collect();
        assert_eq!(vec![OCI_FIRST_PIECE, OCI_NEXT_PIECE, OCI_LAST_PIECE], labels);

        let mut one_shot = PiecewiseSource {
            data: vec![0u8; 3],
            piece_size: 4,
            position: 0,
            total_len: 3,
        };
        assert_eq!(OCI_ONE_PIECE, one_shot.next_piece().0);
    }
}
