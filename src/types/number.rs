//! Oracle `NUMBER` values and the unified numeric translation.
//!
//! Conversions between Rust integers/floats and `OCINumber` all funnel through the client's
//! `OCINumberFromInt`/`ToInt`/`FromReal`/`ToReal` quartet; the conversion is the identity when
//! source and target kind match. The two non-numeric `NUMBER` encodings (positive and negative
//! infinity) round-trip through the strings `~` and `-~`.

use std::{ffi::c_void, mem::size_of};

use crate::{
    connection::Connection,
    environment::FormatKind,
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_NUMBER_SIGNED, OCI_NUMBER_UNSIGNED},
        types::{OciNumber, Ub4},
    },
    text::{DbText, TextBuffer},
};

/// Leading bytes of the `NUMBER` encoding of positive infinity.
const POSITIVE_INFINITY: [u8; 3] = [2, 255, 101];
/// Leading bytes of the `NUMBER` encoding of negative infinity.
const NEGATIVE_INFINITY: [u8; 3] = [1, 0, 0];

/// `Some(true)` for positive infinity, `Some(false)` for negative, `None` for finite values.
pub(crate) fn infinity_sign(raw: &OciNumber) -> Option<bool> {
    if raw.bytes[..3] == POSITIVE_INFINITY {
        Some(true)
    } else if raw.bytes[..3] == NEGATIVE_INFINITY {
        Some(false)
    } else {
        None
    }
}

fn infinity_raw(positive: bool) -> OciNumber {
    let mut raw = OciNumber::default();
    raw.bytes[..3].copy_from_slice(if positive {
        &POSITIVE_INFINITY
    } else {
        &NEGATIVE_INFINITY
    });
    raw
}

pub(crate) fn to_i64(conn: &Connection<'_>, raw: &OciNumber) -> Result<i64, Error> {
    let mut value: i64 = 0;
    let status = unsafe {
        (conn.environment().oci().number_to_int)(
            conn.err_ptr(),
            raw,
            size_of::<i64>() as u32,
            OCI_NUMBER_SIGNED,
            &mut value as *mut i64 as *mut c_void,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberToInt"),
        SourceKind::Number,
        "number",
        "to_i64",
    )
    .map(|()| value)
}

pub(crate) fn to_u64(conn: &Connection<'_>, raw: &OciNumber) -> Result<u64, Error> {
    let mut value: u64 = 0;
    let status = unsafe {
        (conn.environment().oci().number_to_int)(
            conn.err_ptr(),
            raw,
            size_of::<u64>() as u32,
            OCI_NUMBER_UNSIGNED,
            &mut value as *mut u64 as *mut c_void,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberToInt"),
        SourceKind::Number,
        "number",
        "to_u64",
    )
    .map(|()| value)
}

pub(crate) fn to_f64(conn: &Connection<'_>, raw: &OciNumber) -> Result<f64, Error> {
    match infinity_sign(raw) {
        Some(true) => return Ok(f64::INFINITY),
        Some(false) => return Ok(f64::NEG_INFINITY),
        None => (),
    }
    let mut value: f64 = 0.0;
    let status = unsafe {
        (conn.environment().oci().number_to_real)(
            conn.err_ptr(),
            raw,
            size_of::<f64>() as u32,
            &mut value as *mut f64 as *mut c_void,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberToReal"),
        SourceKind::Number,
        "number",
        "to_f64",
    )
    .map(|()| value)
}

pub(crate) fn from_i64(conn: &Connection<'_>, value: i64) -> Result<OciNumber, Error> {
    let mut raw = OciNumber::default();
    let status = unsafe {
        (conn.environment().oci().number_from_int)(
            conn.err_ptr(),
            &value as *const i64 as *const c_void,
            size_of::<i64>() as u32,
            OCI_NUMBER_SIGNED,
            &mut raw,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberFromInt"),
        SourceKind::Number,
        "number",
        "from_i64",
    )
    .map(|()| raw)
}

pub(crate) fn from_u64(conn: &Connection<'_>, value: u64) -> Result<OciNumber, Error> {
    let mut raw = OciNumber::default();
    let status = unsafe {
        (conn.environment().oci().number_from_int)(
            conn.err_ptr(),
            &value as *const u64 as *const c_void,
            size_of::<u64>() as u32,
            OCI_NUMBER_UNSIGNED,
            &mut raw,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberFromInt"),
        SourceKind::Number,
        "number",
        "from_u64",
    )
    .map(|()| raw)
}

pub(crate) fn from_f64(conn: &Connection<'_>, value: f64) -> Result<OciNumber, Error> {
    if value.is_infinite() {
        return Ok(infinity_raw(value.is_sign_positive()));
    }
    let mut raw = OciNumber::default();
    let status = unsafe {
        (conn.environment().oci().number_from_real)(
            conn.err_ptr(),
            &value as *const f64 as *const c_void,
            size_of::<f64>() as u32,
            &mut raw,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberFromReal"),
        SourceKind::Number,
        "number",
        "from_f64",
    )
    .map(|()| raw)
}

pub(crate) fn to_text(conn: &Connection<'_>, raw: &OciNumber) -> Result<String, Error> {
    match infinity_sign(raw) {
        Some(true) => return Ok("~".to_string()),
        Some(false) => return Ok("-~".to_string()),
        None => (),
    }
    let format = conn.format(FormatKind::Numeric);
    let format_text = DbText::new(&format);
    let mut buffer = TextBuffer::with_capacity(128);
    let mut buf_size: Ub4 = buffer.capacity_bytes();
    let status = unsafe {
        (conn.environment().oci().number_to_text)(
            conn.err_ptr(),
            raw,
            format_text.ptr(),
            format_text.len_bytes() as Ub4,
            std::ptr::null(),
            0,
            &mut buf_size,
            buffer.mut_buf_ptr(),
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberToText"),
        SourceKind::Number,
        "number",
        "to_text",
    )?;
    buffer.set_actual_len_bytes(buf_size);
    Ok(buffer.to_utf8().trim().to_string())
}

pub(crate) fn from_text(
    conn: &Connection<'_>,
    text: &str,
    format: Option<&str>,
) -> Result<OciNumber, Error> {
    match text.trim() {
        "~" => return Ok(infinity_raw(true)),
        "-~" => return Ok(infinity_raw(false)),
        _ => (),
    }
    let format = format
        .map(str::to_string)
        .unwrap_or_else(|| conn.format(FormatKind::Numeric));
    let format_text = DbText::new(&format);
    let value_text = DbText::new(text);
    let mut raw = OciNumber::default();
    let status = unsafe {
        (conn.environment().oci().number_from_text)(
            conn.err_ptr(),
            value_text.ptr(),
            value_text.len_bytes() as Ub4,
            format_text.ptr(),
            format_text.len_bytes() as Ub4,
            std::ptr::null(),
            0,
            &mut raw,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCINumberFromText"),
        SourceKind::Number,
        "number",
        "from_text",
    )
    .map(|()| raw)
}

/// An Oracle `NUMBER` value tied to a connection for conversions.
pub struct Number<'conn, 'env> {
    conn: &'conn Connection<'env>,
    raw: OciNumber,
}

impl<'conn, 'env> Number<'conn, 'env> {
    pub fn from_i64(conn: &'conn Connection<'env>, value: i64) -> Result<Self, Error> {
        Ok(Number {
            conn,
            raw: from_i64(conn, value)?,
        })
    }

    pub fn from_u64(conn: &'conn Connection<'env>, value: u64) -> Result<Self, Error> {
        Ok(Number {
            conn,
            raw: from_u64(conn, value)?,
        })
    }

    pub fn from_f64(conn: &'conn Connection<'env>, value: f64) -> Result<Self, Error> {
        Ok(Number {
            conn,
            raw: from_f64(conn, value)?,
        })
    }

    /// Parses `text` using the connection's numeric format (or `format` if given). The strings
    /// `~` and `-~` produce the two infinity encodings.
    pub fn from_text(
        conn: &'conn Connection<'env>,
        text: &str,
        format: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Number {
            conn,
            raw: from_text(conn, text, format)?,
        })
    }

    pub(crate) fn from_raw(conn: &'conn Connection<'env>, raw: OciNumber) -> Self {
        Number { conn, raw }
    }

    pub fn to_i64(&self) -> Result<i64, Error> {
        to_i64(self.conn, &self.raw)
    }

    pub fn to_u64(&self) -> Result<u64, Error> {
        to_u64(self.conn, &self.raw)
    }

    pub fn to_f64(&self) -> Result<f64, Error> {
        to_f64(self.conn, &self.raw)
    }

    /// Formats the value using the connection's numeric format. Infinities come out as `~` and
    /// `-~`.
    pub fn to_text(&self) -> Result<String, Error> {
        to_text(self.conn, &self.raw)
    }

    pub fn is_infinite(&self) -> bool {
        infinity_sign(&self.raw).is_some()
    }

    pub fn assign(&mut self, other: &Number<'_, '_>) {
        self.raw = other.raw;
    }

    pub(crate) fn raw(&self) -> &OciNumber {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::{infinity_raw, infinity_sign};

    #[test]
    fn infinity_encodings_are_recognized() {
        assert_eq!(Some(true), infinity_sign(&infinity_raw(true)));
        assert_eq!(Some(false), infinity_sign(&infinity_raw(false)));
        assert_eq!(None, infinity_sign(&Default::default()));
    }
}
