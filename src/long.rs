//! Piecewise streaming for unbounded LONG and LONG RAW columns.
//!
//! The server returns LONG data in pieces; the driver concatenates them into a growing buffer.
//! Internal accounting is in database text bytes for character LONGs; the caller facing `read`
//! and `size` convert to host characters at the edge.

use std::mem::size_of;

use crate::{
    error::Error,
    text::{decode_db_bytes, DbChar},
};

/// Flavour of a LONG column or bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongKind {
    /// `LONG`: character data in the session charset.
    Text,
    /// `LONG RAW`: uninterpreted bytes.
    Binary,
}

/// Buffered content of a LONG column, filled piecewise during fetch.
pub struct Long {
    kind: LongKind,
    /// Accumulated data in database text bytes (character kind) or plain bytes (binary kind).
    buffer: Vec<u8>,
    /// Bytes of the piece currently in flight, not yet folded into `size`.
    piece_size: usize,
    /// Logical size accumulated so far, in database text bytes.
    size: usize,
    /// Read offset in database text bytes.
    offset: usize,
    /// Narrow builds: session charset is UTF-8, characters are variable width.
    nls_utf8: bool,
}

impl Long {
    pub(crate) fn new(kind: LongKind, nls_utf8: bool) -> Self {
        Long {
            kind,
            buffer: Vec::new(),
            piece_size: 0,
            size: 0,
            offset: 0,
            nls_utf8,
        }
    }

    pub fn kind(&self) -> LongKind {
        self.kind
    }

    /// Grows the buffer for an incoming piece of up to `len` bytes and returns where the client
    /// should write it.
    pub(crate) fn reserve_piece(&mut self, len: usize) -> *mut u8 {
        self.buffer.resize(self.size + len, 0);
        self.piece_size = len;
        unsafe { self.buffer.as_mut_ptr().add(self.size) }
    }

    /// Folds the piece in flight into the accumulated size. `actual` is the byte count the
    /// client reported for the piece.
    pub(crate) fn commit_piece(&mut self, actual: usize) {
        let actual = actual.min(self.piece_size);
        self.buffer.truncate(self.size + actual);
        self.size += actual;
        self.piece_size = 0;
    }

    /// Discards buffered content, for re-use across rows.
    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.size = 0;
        self.piece_size = 0;
        self.offset = 0;
    }

    /// Logical size in host units: characters for character LONGs, bytes for binary ones.
    pub fn size(&self) -> usize {
        match self.kind {
            LongKind::Binary => self.size,
            LongKind::Text => {
                if self.nls_utf8 {
                    decode_db_bytes(&self.buffer[..self.size], true).chars().count()
                } else {
                    self.size / size_of::<DbChar>()
                }
            }
        }
    }

    /// Reads up to `len` units (characters or bytes, by kind) from the current offset. Returns
    /// the data actually read; a short or empty result signals the remaining length.
    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        let byte_len = match self.kind {
            LongKind::Binary => len,
            LongKind::Text => {
                if self.nls_utf8 {
                    // Variable width: resolve the character count against the buffered text.
                    let tail = &self.buffer[self.offset..self.size];
                    let text = std::str::from_utf8(tail)
                        .map_err(|_| Error::Internal("LONG buffer holds invalid UTF-8".into()))?;
                    text.char_indices()
                        .nth(len)
                        .map(|(idx, _)| idx)
                        .unwrap_or(tail.len())
                }
                else {
                    len * size_of::<DbChar>()
                }
            }
        };
        let available = self.size.saturating_sub(self.offset);
        let byte_len = byte_len.min(available);
        let data = self.buffer[self.offset..self.offset + byte_len].to_vec();
        self.offset += byte_len;
        Ok(data)
    }

    /// Like [`Self::read`], but decodes character LONG data to UTF-8.
    pub fn read_text(&mut self, len: usize) -> Result<String, Error> {
        if self.kind != LongKind::Text {
            return Err(Error::TypeMismatch {
                from: "LONG RAW",
                to: "text",
            });
        }
        let bytes = self.read(len)?;
        Ok(decode_db_bytes(&bytes, self.nls_utf8))
    }

    /// The whole buffered value as raw database bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.size]
    }
}

#[cfg(test)]
mod tests {
    use super::{Long, LongKind};

    fn fill(long: &mut Long, pieces: &[&[u8]]) {
        for piece in pieces {
            let target = long.reserve_piece(piece.len());
            unsafe { std::ptr::copy_nonoverlapping(piece.as_ptr(), target, piece.len()) };
            long.commit_piece(piece.len());
        }
    }

    #[test]
    fn pieces_concatenate_in_order() {
        let mut long = Long::new(LongKind::Binary, false);
        fill(&mut long, &[b"abc", b"def", b"g"]);
        assert_eq!(7, long.size());
        assert_eq!(b"abcdefg", long.as_bytes());
    }

    #[test]
    fn short_pieces_shrink_to_actual_length() {
        let mut long = Long::new(LongKind::Binary, false);
        let target = long.reserve_piece(8);
        unsafe { std::ptr::copy_nonoverlapping(b"xy".as_ptr(), target, 2) };
        long.commit_piece(2);
        assert_eq!(2, long.size());
        assert_eq!(b"xy", long.as_bytes());
    }

    #[test]
    fn read_clamps_to_remaining_and_advances() {
        let mut long = Long::new(LongKind::Binary, false);
        fill(&mut long, &[b"0123456789"]);
        assert_eq!(b"0123".to_vec(), long.read(4).unwrap());
        assert_eq!(b"456789".to_vec(), long.read(100).unwrap());
        assert!(long.read(1).unwrap().is_empty());
    }

    #[test]
    #[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
    fn character_long_counts_in_characters() {
        // Database text bytes for "héllo" in UTF-8.
        let mut long = Long::new(LongKind::Text, true);
        fill(&mut long, &["héllo".as_bytes()]);
        assert_eq!(5, long.size());
        assert_eq!("hé", long.read_text(2).unwrap());
        assert_eq!("llo", long.read_text(10).unwrap());
    }

    #[test]
    fn reset_clears_accumulated_state() {
        let mut long = Long::new(LongKind::Binary, false);
        fill(&mut long, &[b"abc"]);
        long.reset();
        assert_eq!(0, long.size());
        assert!(long.as_bytes().is_empty());
    }
}
