//! The idea is to handle most of the conditional compilation around the two database text forms
//! in this module, so the rest of the crate doesn't have to.
//!
//! Oracle clients can be talked to in two text forms: "wide" (UTF-16, selected by creating the
//! environment with the UTF-16 charset id) and "narrow" (bytes interpreted according to
//! `NLS_LANG`, typically UTF-8 these days). We default to wide on windows and narrow elsewhere,
//! overridable through the `wide` and `narrow` cargo features.

use std::{
    borrow::Cow,
    mem::{size_of, size_of_val},
};

use crate::oci::types::OraText;

#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
use std::{char::decode_utf16, marker::PhantomData};

#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
use widestring::U16String;

/// Unit of database side text. `u16` for wide builds, `u8` for narrow ones.
#[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
pub type DbChar = u8;
#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
pub type DbChar = u16;

/// `true` if this build talks UTF-16 to the client.
pub const fn is_wide() -> bool {
    cfg!(any(
        feature = "wide",
        all(not(feature = "narrow"), target_os = "windows")
    ))
}

#[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
pub fn slice_to_cow_utf8(text: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(text)
}
#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
pub fn slice_to_cow_utf8(text: &[u16]) -> Cow<'_, str> {
    let text: String = decode_utf16(text.iter().copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    text.into()
}

/// Buffer length in bytes, not characters.
pub fn binary_length(buffer: &[DbChar]) -> usize {
    size_of_val(buffer)
}

/// Bytes a single character can occupy in the database text form. Used to derive byte counts
/// from character counts for character LOB transfers.
///
/// * wide build: UTF-16, two bytes per code unit
/// * narrow build with a UTF-8 `NLS_LANG`: up to four bytes
/// * narrow build otherwise: single byte charset
pub fn max_bytes_per_char(nls_utf8: bool) -> usize {
    if is_wide() {
        2
    } else if nls_utf8 {
        4
    } else {
        1
    }
}

/// Handles conversion from UTF-8 string slices to the database text form. In wide builds the
/// UTF-8 input is re-encoded to UTF-16 and the buffer owned here; in narrow builds the string
/// slice is forwarded unchanged.
pub struct DbText<'a> {
    #[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
    text: U16String,
    /// We include the lifetime in the declaration of the type still, so the borrow checker
    /// complains, if we would mess up the compilation for narrow builds.
    #[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
    _ref: PhantomData<&'a str>,
    #[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
    text: &'a str,
}

impl<'a> DbText<'a> {
    #[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
    /// Create a database text buffer from an UTF-8 string slice
    pub fn new(text: &'a str) -> Self {
        Self {
            text: U16String::from_str(text),
            _ref: PhantomData,
        }
    }
    #[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
    /// Create a database text buffer from an UTF-8 string slice
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    #[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
    fn as_slice(&self) -> &[DbChar] {
        self.text.as_slice()
    }
    #[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
    fn as_slice(&self) -> &[DbChar] {
        self.text.as_bytes()
    }

    /// Pointer in the byte based form every OCI text argument has, independent of build mode.
    pub fn ptr(&self) -> *const OraText {
        self.as_slice().as_ptr() as *const OraText
    }

    /// Length in characters (database text units).
    pub fn len_char(&self) -> usize {
        self.as_slice().len()
    }

    /// Length in bytes. This is the unit most OCI length arguments are expressed in.
    pub fn len_bytes(&self) -> usize {
        binary_length(self.as_slice())
    }
}

/// Output buffer for text filled in by the client. Tracks the filled length in bytes, which is
/// how OCI reports it.
pub struct TextBuffer {
    buffer: Vec<DbChar>,
    /// Filled portion of `buffer` in bytes.
    actual_len_bytes: u32,
}

impl TextBuffer {
    /// Creates a buffer which can hold at least `capacity` characters, excluding the terminating
    /// zero some OCI calls insist on writing.
    pub fn with_capacity(capacity: usize) -> Self {
        TextBuffer {
            buffer: vec![0; capacity + 1],
            actual_len_bytes: 0,
        }
    }

    pub fn mut_buf_ptr(&mut self) -> *mut OraText {
        self.buffer.as_mut_ptr() as *mut OraText
    }

    /// Capacity in bytes, the unit OCI buffer size arguments are expressed in.
    pub fn capacity_bytes(&self) -> u32 {
        binary_length(&self.buffer).try_into().unwrap()
    }

    /// Tell the buffer how many bytes the client wrote, for calls reporting the length through a
    /// return value rather than an out parameter.
    pub fn set_actual_len_bytes(&mut self, len: u32) {
        self.actual_len_bytes = len;
    }

    /// Extract the filled portion as UTF-8.
    pub fn to_utf8(&self) -> String {
        let chars = self.actual_len_bytes as usize / size_of::<DbChar>();
        let chars = chars.min(self.buffer.len());
        slice_to_cow_utf8(&self.buffer[..chars]).into_owned()
    }
}

/// Decodes a byte buffer containing database side text into UTF-8. `nls_utf8` only matters for
/// narrow builds, where it decides between UTF-8 and lossy single byte interpretation.
pub fn decode_db_bytes(bytes: &[u8], nls_utf8: bool) -> String {
    if is_wide() {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
            .collect();
        let mut text = String::with_capacity(units.len());
        for c in std::char::decode_utf16(units.into_iter()) {
            text.push(c.unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        text
    } else if nls_utf8 {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        // Single byte session charset. Interpreting it as latin-1 keeps every byte addressable.
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Encodes UTF-8 into the database byte form used by [`decode_db_bytes`].
pub fn encode_db_bytes(text: &str, nls_utf8: bool) -> Vec<u8> {
    if is_wide() {
        text.encode_utf16()
            .flat_map(|unit| unit.to_ne_bytes())
            .collect()
    } else if nls_utf8 {
        text.as_bytes().to_owned()
    } else {
        text.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_db_bytes, encode_db_bytes, max_bytes_per_char, DbText};

    #[test]
    fn db_text_reports_byte_and_char_length() {
        let text = DbText::new("abc");
        assert_eq!(3, text.len_char());
        assert_eq!(3 * std::mem::size_of::<super::DbChar>(), text.len_bytes());
    }

    #[test]
    fn db_bytes_round_trip() {
        let bytes = encode_db_bytes("héllo", true);
        assert_eq!("héllo", decode_db_bytes(&bytes, true));
    }

    #[test]
    fn bytes_per_char_depends_on_charset() {
        if super::is_wide() {
            assert_eq!(2, max_bytes_per_char(false));
        } else {
            assert_eq!(4, max_bytes_per_char(true));
            assert_eq!(1, max_bytes_per_char(false));
        }
    }
}
