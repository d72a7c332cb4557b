//! LOB and BFILE locators with streamed, chunked I/O.
//!
//! Character LOB offsets and lengths are expressed in characters, binary ones in bytes. The
//! driver selects the 64 bit LOB API once at environment load and silently falls back to the
//! 32 bit calls on clients older than 10.1. Transfers larger than the server advertised chunk
//! size are split into multiple round trips; the caller observes one atomic operation.

use std::ffi::c_void;

use crate::{
    connection::Connection,
    define::{FileKind, LobKind},
    error::{Error, Feature, SourceKind},
    handles::{AllocState, ExtSword, HolderId},
    oci::{
        constants::{
            OCI_ATTR_LOBEMPTY, OCI_DEFAULT, OCI_DTYPE_FILE, OCI_DTYPE_LOB, OCI_DURATION_SESSION,
            OCI_LOB_READONLY, OCI_LOB_READWRITE, OCI_ONE_PIECE, OCI_TEMP_BLOB, OCI_TEMP_CLOB,
            SQLCS_IMPLICIT, SQLCS_NCHAR,
        },
        types::{OciBool, OciLobLocator, Sword, Ub1, Ub2, Ub4, Ub8},
    },
    text::{decode_db_bytes, encode_db_bytes, max_bytes_per_char, TextBuffer},
};

/// Origin of a [`Lob::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobSeekMode {
    /// From the start of the value.
    Set,
    /// Relative to the current offset.
    Current,
    /// Backwards from the end; offset zero lands on the after-end position.
    End,
}

/// How a LOB is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobOpenMode {
    ReadOnly,
    ReadWrite,
}

/// A LOB locator. Temporary LOBs created through [`Lob::create_temporary`] own their locator
/// and their server side value (session duration); locators fetched from result sets borrow
/// the define buffer's descriptor.
pub struct Lob<'conn, 'env> {
    conn: &'conn Connection<'env>,
    locator: *mut OciLobLocator,
    kind: LobKind,
    /// 1-based position of the next read or write: characters for character LOBs, bytes for
    /// binary ones. Always within `[1, length + 1]`.
    offset: u64,
    holder: Option<HolderId>,
}

impl<'conn, 'env> Lob<'conn, 'env> {
    /// Creates a temporary LOB of session duration. It is freed when this handle goes away, at
    /// the latest when the connection closes.
    pub fn create_temporary(conn: &'conn Connection<'env>, kind: LobKind) -> Result<Self, Error> {
        conn.ensure_usable("create_temporary")?;
        let env = conn.environment();
        let oci = env.oci();
        let locator = env.counters().alloc_descriptor(
            oci,
            env.env_ptr() as *const c_void,
            OCI_DTYPE_LOB,
        )? as *mut OciLobLocator;

        // Track the locator under the connection before the fallible calls, so every exit path
        // disposes it.
        let free_temporary = oci.lob_free_temporary;
        let descriptor_free = oci.descriptor_free;
        let svchp = conn.svc_ptr();
        let errhp = conn.err_ptr();
        let counters = env.counters_arc();
        let holder = conn.holders.borrow_mut().acquire(
            locator as *mut c_void,
            AllocState::Allocated,
            None,
            Some(Box::new(move |raw| {
                let locator = raw as *mut OciLobLocator;
                unsafe {
                    free_temporary(svchp, errhp, locator);
                    descriptor_free(raw, OCI_DTYPE_LOB);
                }
                counters.forget_descriptors(1);
            })),
        )?;

        let lob = Lob {
            conn,
            locator,
            kind,
            offset: 1,
            holder: Some(holder),
        };

        let mut empty: Ub4 = 0;
        let status = unsafe {
            (oci.attr_set)(
                locator as *mut c_void,
                OCI_DTYPE_LOB,
                &mut empty as *mut Ub4 as *mut c_void,
                std::mem::size_of::<Ub4>() as u32,
                OCI_ATTR_LOBEMPTY,
                errhp,
            )
        };
        lob.resolve(status, "OCIAttrSet(empty lob)", "create_temporary")?;

        let (charset_form, temp_kind) = match kind {
            LobKind::NClob => (SQLCS_NCHAR, OCI_TEMP_CLOB),
            LobKind::Clob => (SQLCS_IMPLICIT, OCI_TEMP_CLOB),
            LobKind::Blob => (SQLCS_IMPLICIT, OCI_TEMP_BLOB),
        };
        let status = unsafe {
            (oci.lob_create_temporary)(
                svchp,
                errhp,
                locator,
                0,
                charset_form,
                temp_kind,
                0,
                OCI_DURATION_SESSION,
            )
        };
        lob.resolve(status, "OCILobCreateTemporary", "create_temporary")?;
        Ok(lob)
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        locator: *mut OciLobLocator,
        kind: LobKind,
    ) -> Self {
        Lob {
            conn,
            locator,
            kind,
            offset: 1,
            holder: None,
        }
    }

    pub fn kind(&self) -> LobKind {
        self.kind
    }

    fn is_character(&self) -> bool {
        !matches!(self.kind, LobKind::Blob)
    }

    /// Current 0-based read/write position: characters for character LOBs, bytes for binary
    /// ones.
    pub fn offset(&self) -> u64 {
        self.offset - 1
    }

    /// Value length: characters for character LOBs, bytes for binary ones.
    pub fn length(&self) -> Result<u64, Error> {
        let oci = self.conn.environment().oci();
        if let Some(get_length2) = oci.lob_get_length2 {
            let mut length: Ub8 = 0;
            let status = unsafe {
                get_length2(self.conn.svc_ptr(), self.conn.err_ptr(), self.locator, &mut length)
            };
            self.resolve(status, "OCILobGetLength2", "length")?;
            Ok(length)
        } else {
            let mut length: Ub4 = 0;
            let status = unsafe {
                (oci.lob_get_length)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut length,
                )
            };
            self.resolve(status, "OCILobGetLength", "length")?;
            Ok(length as u64)
        }
    }

    /// Server advertised optimal transfer unit in bytes.
    pub fn chunk_size(&self) -> Result<u32, Error> {
        let mut size: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().lob_get_chunk_size)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                &mut size,
            )
        };
        self.resolve(status, "OCILobGetChunkSize", "chunk_size")?;
        Ok(size)
    }

    /// Maximum size the value can grow to. Requires the 64 bit LOB API.
    pub fn storage_limit(&self) -> Result<u64, Error> {
        let Some(get_limit) = self.conn.environment().oci().lob_get_storage_limit else {
            let error = Error::NotAvailable {
                feature: Feature::WideLobApi,
            };
            self.raise(&error, "storage_limit");
            return Err(error);
        };
        let mut limit: Ub8 = 0;
        let status = unsafe {
            get_limit(self.conn.svc_ptr(), self.conn.err_ptr(), self.locator, &mut limit)
        };
        self.resolve(status, "OCILobGetStorageLimit", "storage_limit")?;
        Ok(limit)
    }

    /// Moves the read/write position. Offsets are characters for character LOBs and bytes for
    /// binary ones. Seeking exactly to the end parks the position one past the last unit;
    /// anything further is refused.
    pub fn seek(&mut self, offset: u64, mode: LobSeekMode) -> Result<(), Error> {
        let size = self.length()?;
        let target = match mode {
            LobSeekMode::Set if offset <= size => offset + 1,
            LobSeekMode::Current if self.offset + offset - 1 <= size => self.offset + offset,
            LobSeekMode::End if offset <= size => size - offset + 1,
            _ => {
                let error = Error::OutOfRange {
                    argument: "seek offset",
                };
                self.raise(&error, "seek");
                return Err(error);
            }
        };
        self.offset = target;
        Ok(())
    }

    /// Reads up to `char_count` characters from the current position of a character LOB. A
    /// shorter result means the end of the value was reached; the position ends up one past
    /// the last unit then.
    pub fn read_text(&mut self, char_count: u64) -> Result<String, Error> {
        if !self.is_character() {
            let error = Error::TypeMismatch {
                from: "BLOB",
                to: "text",
            };
            self.raise(&error, "read_text");
            return Err(error);
        }
        let bytes = self.read_units(char_count)?;
        Ok(decode_db_bytes(&bytes, self.conn.environment().nls_utf8()))
    }

    /// Reads up to `byte_count` bytes from the current position of a binary LOB.
    pub fn read_bytes(&mut self, byte_count: u64) -> Result<Vec<u8>, Error> {
        if self.is_character() {
            let error = Error::TypeMismatch {
                from: "character LOB",
                to: "raw bytes",
            };
            self.raise(&error, "read_bytes");
            return Err(error);
        }
        self.read_units(byte_count)
    }

    /// Reads `count` units (characters or bytes by kind), honoring the chunk size: larger
    /// transfers run as multiple round trips while the position advances piece by piece.
    fn read_units(&mut self, count: u64) -> Result<Vec<u8>, Error> {
        let chunk = self.transfer_unit()?;
        let mut collected = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            let piece = remaining.min(chunk);
            let (bytes, units) = self.read_piece(piece)?;
            remaining -= units.min(remaining);
            self.offset += units;
            let done = units < piece;
            collected.extend_from_slice(&bytes);
            if done {
                break;
            }
        }
        Ok(collected)
    }

    /// One read round trip of up to `units` characters/bytes. Returns the raw database bytes
    /// and the number of units transferred.
    fn read_piece(&mut self, units: u64) -> Result<(Vec<u8>, u64), Error> {
        let env = self.conn.environment();
        let oci = env.oci();
        let bytes_per_char = if self.is_character() {
            max_bytes_per_char(env.nls_utf8()) as u64
        } else {
            1
        };
        let buffer_len = (units * bytes_per_char) as usize;
        let mut buffer = vec![0u8; buffer_len.max(1)];
        let (charset_id, charset_form) = self.charset_args();

        if let Some(read2) = oci.lob_read2 {
            let mut byte_amt: Ub8 = 0;
            let mut char_amt: Ub8 = if self.is_character() { units } else { 0 };
            if !self.is_character() {
                byte_amt = units;
            }
            let status = unsafe {
                read2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut byte_amt,
                    &mut char_amt,
                    self.offset,
                    buffer.as_mut_ptr() as *mut c_void,
                    buffer.len() as Ub8,
                    OCI_ONE_PIECE,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    charset_id,
                    charset_form,
                )
            };
            // Reading the tail of the value reports no-data together with the transferred
            // amounts.
            if !matches!(
                status.into_oci_result("OCILobRead2"),
                crate::handles::OciResult::NoData
            ) {
                self.resolve(status, "OCILobRead2", "read")?;
            }
            let transferred = if self.is_character() { char_amt } else { byte_amt };
            buffer.truncate(byte_amt as usize);
            Ok((buffer, transferred))
        } else {
            let mut amount: Ub4 = units as Ub4;
            let status = unsafe {
                (oci.lob_read)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut amount,
                    self.offset as Ub4,
                    buffer.as_mut_ptr() as *mut c_void,
                    buffer.len() as Ub4,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    charset_id,
                    charset_form,
                )
            };
            if !matches!(
                status.into_oci_result("OCILobRead"),
                crate::handles::OciResult::NoData
            ) {
                self.resolve(status, "OCILobRead", "read")?;
            }
            let transferred = amount as u64;
            buffer.truncate((transferred * bytes_per_char) as usize);
            if self.is_character() && self.conn.environment().nls_utf8() {
                // Variable width text reports characters, not bytes; drop the zero padding the
                // client left behind the actual content. (UTF-16 buffers are exact already and
                // may contain legitimate zero bytes.)
                while buffer.last() == Some(&0) {
                    buffer.pop();
                }
            }
            Ok((buffer, transferred))
        }
    }

    /// Writes `text` at the current position of a character LOB and advances it by the number
    /// of characters written. Writing past the current end extends the value.
    pub fn write_text(&mut self, text: &str) -> Result<u64, Error> {
        if !self.is_character() {
            let error = Error::TypeMismatch {
                from: "BLOB",
                to: "text",
            };
            self.raise(&error, "write_text");
            return Err(error);
        }
        let char_count = text.chars().count() as u64;
        let bytes = encode_db_bytes(text, self.conn.environment().nls_utf8());
        self.write_units(&bytes, char_count)
    }

    /// Writes `data` at the current position of a binary LOB and advances it by the number of
    /// bytes written.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<u64, Error> {
        if self.is_character() {
            let error = Error::TypeMismatch {
                from: "character LOB",
                to: "raw bytes",
            };
            self.raise(&error, "write_bytes");
            return Err(error);
        }
        self.write_units(data, data.len() as u64)
    }

    fn write_units(&mut self, bytes: &[u8], total_units: u64) -> Result<u64, Error> {
        if total_units == 0 {
            return Ok(0);
        }
        // Variable width text cannot be split at fixed byte strides without cutting through a
        // character; hand it to the client in one piece.
        let chunk = if self.is_character() && self.conn.environment().nls_utf8() {
            total_units
        } else {
            self.transfer_unit()?
        };
        let bytes_per_unit = (bytes.len() as u64).div_ceil(total_units);
        let mut written_units = 0;
        while written_units < total_units {
            let piece_units = (total_units - written_units).min(chunk);
            let start = (written_units * bytes_per_unit) as usize;
            let end = ((written_units + piece_units) * bytes_per_unit).min(bytes.len() as u64);
            let piece = &bytes[start..end as usize];
            let units = self.write_piece(piece, piece_units)?;
            self.offset += units;
            written_units += units;
            if units == 0 {
                break;
            }
        }
        Ok(written_units)
    }

    fn write_piece(&mut self, bytes: &[u8], units: u64) -> Result<u64, Error> {
        let oci = self.conn.environment().oci();
        let (charset_id, charset_form) = self.charset_args();
        if let Some(write2) = oci.lob_write2 {
            let mut byte_amt: Ub8 = bytes.len() as Ub8;
            let mut char_amt: Ub8 = if self.is_character() { units } else { 0 };
            let status = unsafe {
                write2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut byte_amt,
                    &mut char_amt,
                    self.offset,
                    bytes.as_ptr() as *mut c_void,
                    bytes.len() as Ub8,
                    OCI_ONE_PIECE,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    charset_id,
                    charset_form,
                )
            };
            self.resolve(status, "OCILobWrite2", "write")?;
            Ok(if self.is_character() { char_amt } else { byte_amt })
        } else {
            let mut amount: Ub4 = units as Ub4;
            let status = unsafe {
                (oci.lob_write)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut amount,
                    self.offset as Ub4,
                    bytes.as_ptr() as *mut c_void,
                    bytes.len() as Ub4,
                    OCI_ONE_PIECE,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    charset_id,
                    charset_form,
                )
            };
            self.resolve(status, "OCILobWrite", "write")?;
            Ok(amount as u64)
        }
    }

    /// Appends `text` to a character LOB. On clients older than 10.1 the native append call is
    /// missing; the driver then seeks to the end and writes, with identical semantics.
    pub fn append_text(&mut self, text: &str) -> Result<u64, Error> {
        if !self.is_character() {
            let error = Error::TypeMismatch {
                from: "BLOB",
                to: "text",
            };
            self.raise(&error, "append_text");
            return Err(error);
        }
        let char_count = text.chars().count() as u64;
        let bytes = encode_db_bytes(text, self.conn.environment().nls_utf8());
        self.append_units(&bytes, char_count)
    }

    /// Appends `data` to a binary LOB, with the same version fallback as [`Self::append_text`].
    pub fn append_bytes(&mut self, data: &[u8]) -> Result<u64, Error> {
        if self.is_character() {
            let error = Error::TypeMismatch {
                from: "character LOB",
                to: "raw bytes",
            };
            self.raise(&error, "append_bytes");
            return Err(error);
        }
        self.append_units(data, data.len() as u64)
    }

    fn append_units(&mut self, bytes: &[u8], units: u64) -> Result<u64, Error> {
        let oci = self.conn.environment().oci();
        let Some(write_append2) = oci.lob_write_append2 else {
            // OCILobWriteAppend misbehaves on 8.1/9.x clients (Oracle bug 886191); seek plus
            // write observes the same semantics on every version.
            let length = self.length()?;
            self.seek(length, LobSeekMode::Set)?;
            return self.write_units(bytes, units);
        };
        let (charset_id, charset_form) = self.charset_args();
        let mut byte_amt: Ub8 = bytes.len() as Ub8;
        let mut char_amt: Ub8 = if self.is_character() { units } else { 0 };
        let status = unsafe {
            write_append2(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                &mut byte_amt,
                &mut char_amt,
                bytes.as_ptr() as *mut c_void,
                bytes.len() as Ub8,
                OCI_ONE_PIECE,
                std::ptr::null_mut(),
                std::ptr::null(),
                charset_id,
                charset_form,
            )
        };
        self.resolve(status, "OCILobWriteAppend2", "append")?;
        let written = if self.is_character() { char_amt } else { byte_amt };
        self.offset += written;
        Ok(written)
    }

    /// Appends the whole content of `other`.
    pub fn append_lob(&mut self, other: &Lob<'_, '_>) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().lob_append)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                other.locator,
            )
        };
        self.resolve(status, "OCILobAppend", "append_lob")?;
        self.offset += other.length()?;
        Ok(())
    }

    /// Shrinks the value to `new_len` units. If the position pointed past the new end it is
    /// reset to one past the new end.
    pub fn truncate(&mut self, new_len: u64) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        if let Some(trim2) = oci.lob_trim2 {
            let status = unsafe {
                trim2(self.conn.svc_ptr(), self.conn.err_ptr(), self.locator, new_len)
            };
            self.resolve(status, "OCILobTrim2", "truncate")?;
        } else {
            let status = unsafe {
                (oci.lob_trim)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    new_len as Ub4,
                )
            };
            self.resolve(status, "OCILobTrim", "truncate")?;
        }
        if self.offset > new_len {
            self.offset = self.length()? + 1;
        }
        Ok(())
    }

    /// Zero-fills (binary) or blank-fills (character) `count` units starting at the 0-based
    /// `offset`. Returns the number of units actually erased.
    pub fn erase(&mut self, offset: u64, count: u64) -> Result<u64, Error> {
        if count == 0 {
            let error = Error::OutOfRange {
                argument: "erase count",
            };
            self.raise(&error, "erase");
            return Err(error);
        }
        let oci = self.conn.environment().oci();
        if let Some(erase2) = oci.lob_erase2 {
            let mut amount: Ub8 = count;
            let status = unsafe {
                erase2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut amount,
                    offset + 1,
                )
            };
            self.resolve(status, "OCILobErase2", "erase")?;
            Ok(amount)
        } else {
            let mut amount: Ub4 = count as Ub4;
            let status = unsafe {
                (oci.lob_erase)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut amount,
                    offset as Ub4 + 1,
                )
            };
            self.resolve(status, "OCILobErase", "erase")?;
            Ok(amount as u64)
        }
    }

    /// Copies `count` units of `src` into `self` at the given 0-based offsets.
    pub fn copy_from(
        &mut self,
        src: &Lob<'_, '_>,
        dst_offset: u64,
        src_offset: u64,
        count: u64,
    ) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        if let Some(copy2) = oci.lob_copy2 {
            let status = unsafe {
                copy2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    src.locator,
                    count,
                    dst_offset + 1,
                    src_offset + 1,
                )
            };
            self.resolve(status, "OCILobCopy2", "copy_from")
        } else {
            let status = unsafe {
                (oci.lob_copy)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    src.locator,
                    count as Ub4,
                    dst_offset as Ub4 + 1,
                    src_offset as Ub4 + 1,
                )
            };
            self.resolve(status, "OCILobCopy", "copy_from")
        }
    }

    /// Loads `count` bytes of a BFILE into this LOB.
    pub fn load_from_file(
        &mut self,
        file: &File<'_, '_>,
        dst_offset: u64,
        src_offset: u64,
        count: u64,
    ) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        if let Some(load2) = oci.lob_load_from_file2 {
            let status = unsafe {
                load2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    file.locator,
                    count,
                    dst_offset + 1,
                    src_offset + 1,
                )
            };
            self.resolve(status, "OCILobLoadFromFile2", "load_from_file")
        } else {
            let status = unsafe {
                (oci.lob_load_from_file)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    file.locator,
                    count as Ub4,
                    dst_offset as Ub4 + 1,
                    src_offset as Ub4 + 1,
                )
            };
            self.resolve(status, "OCILobLoadFromFile", "load_from_file")
        }
    }

    pub fn is_temporary(&self) -> Result<bool, Error> {
        let mut flag: OciBool = 0;
        let status = unsafe {
            (self.conn.environment().oci().lob_is_temporary)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                self.locator,
                &mut flag,
            )
        };
        self.resolve(status, "OCILobIsTemporary", "is_temporary")?;
        Ok(flag != 0)
    }

    pub fn is_equal(&self, other: &Lob<'_, '_>) -> Result<bool, Error> {
        let mut flag: OciBool = 0;
        let status = unsafe {
            (self.conn.environment().oci().lob_is_equal)(
                self.conn.environment().env_ptr(),
                self.locator,
                other.locator,
                &mut flag,
            )
        };
        self.resolve(status, "OCILobIsEqual", "is_equal")?;
        Ok(flag != 0)
    }

    /// Opens the LOB explicitly, batching index updates until [`Self::close`].
    pub fn open(&mut self, mode: LobOpenMode) -> Result<(), Error> {
        let mode = match mode {
            LobOpenMode::ReadOnly => OCI_LOB_READONLY,
            LobOpenMode::ReadWrite => OCI_LOB_READWRITE,
        };
        let status = unsafe {
            (self.conn.environment().oci().lob_open)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                mode,
            )
        };
        self.resolve(status, "OCILobOpen", "open")
    }

    pub fn close(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().lob_close)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
            )
        };
        self.resolve(status, "OCILobClose", "close")
    }

    /// Flushes buffered writes to the server.
    pub fn flush(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().lob_flush_buffer)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                OCI_DEFAULT,
            )
        };
        self.resolve(status, "OCILobFlushBuffer", "flush")
    }

    /// Copies the locator of `other` into this handle. Both point at the same value
    /// afterwards.
    pub fn assign(&mut self, other: &Lob<'_, '_>) -> Result<(), Error> {
        let oci = self.conn.environment().oci();
        let status = if self.holder.is_some() {
            unsafe {
                (oci.lob_locator_assign)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    other.locator,
                    &mut self.locator,
                )
            }
        } else {
            unsafe {
                (oci.lob_assign)(
                    self.conn.environment().env_ptr(),
                    self.conn.err_ptr(),
                    other.locator,
                    &mut self.locator,
                )
            }
        };
        self.resolve(status, "OCILobLocatorAssign", "assign")
    }

    /// Frees a temporary LOB explicitly. Fetched locators are owned by their result set and
    /// refuse this.
    pub fn free(mut self) -> Result<(), Error> {
        match self.holder.take() {
            Some(holder) => self
                .conn
                .holders
                .borrow_mut()
                .release(holder)
                .map_err(|e| {
                    self.raise(&e, "free");
                    e
                }),
            None => {
                let error = Error::InvalidValue {
                    argument: "fetched LOB (owned by its result set)",
                };
                self.raise(&error, "free");
                Err(error)
            }
        }
    }

    /// Transfer unit per round trip in characters/bytes, derived from the server chunk size.
    fn transfer_unit(&self) -> Result<u64, Error> {
        let chunk_bytes = self.chunk_size()?.max(1) as u64;
        let unit = if self.is_character() {
            chunk_bytes / max_bytes_per_char(self.conn.environment().nls_utf8()) as u64
        } else {
            chunk_bytes
        };
        Ok(unit.max(1))
    }

    fn charset_args(&self) -> (Ub2, Ub1) {
        let charset_id = if self.is_character() && crate::text::is_wide() {
            crate::oci::constants::OCI_UTF16ID
        } else {
            0
        };
        let charset_form = if matches!(self.kind, LobKind::NClob) {
            SQLCS_NCHAR
        } else {
            SQLCS_IMPLICIT
        };
        (charset_id, charset_form)
    }

    fn resolve(
        &self,
        status: Sword,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Lob,
            "lob",
            location,
        )
    }

    fn raise(&self, error: &Error, location: &'static str) {
        self.conn
            .environment()
            .raise(error, SourceKind::Lob, "lob", None, location);
    }
}

impl Drop for Lob<'_, '_> {
    fn drop(&mut self) {
        if let Some(holder) = self.holder.take() {
            if let Err(error) = self.conn.holders.borrow_mut().release(holder) {
                log::error!("Error freeing temporary LOB: {error}");
            }
        }
    }
}

/// A read-only BFILE locator pointing at a file in a server directory.
pub struct File<'conn, 'env> {
    conn: &'conn Connection<'env>,
    locator: *mut OciLobLocator,
    kind: FileKind,
    /// 1-based byte position of the next read.
    offset: u64,
    /// Directory alias and file name, retrieved lazily from the locator.
    name: std::cell::RefCell<Option<(String, String)>>,
    holder: Option<HolderId>,
}

impl<'conn, 'env> File<'conn, 'env> {
    /// Creates an unattached file locator; point it somewhere with [`Self::set_name`].
    pub fn create(conn: &'conn Connection<'env>, kind: FileKind) -> Result<Self, Error> {
        conn.ensure_usable("create_file")?;
        let env = conn.environment();
        let locator = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_FILE,
        )? as *mut OciLobLocator;
        let descriptor_free = env.oci().descriptor_free;
        let counters = env.counters_arc();
        let holder = conn.holders.borrow_mut().acquire(
            locator as *mut c_void,
            AllocState::Allocated,
            None,
            Some(Box::new(move |raw| {
                unsafe { descriptor_free(raw, OCI_DTYPE_FILE) };
                counters.forget_descriptors(1);
            })),
        )?;
        Ok(File {
            conn,
            locator,
            kind,
            offset: 1,
            name: std::cell::RefCell::new(None),
            holder: Some(holder),
        })
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        locator: *mut OciLobLocator,
        kind: FileKind,
    ) -> Self {
        File {
            conn,
            locator,
            kind,
            offset: 1,
            name: std::cell::RefCell::new(None),
            holder: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Points the locator at `file_name` within the server directory alias `directory`.
    pub fn set_name(&mut self, directory: &str, file_name: &str) -> Result<(), Error> {
        let env = self.conn.environment();
        let dir_text = crate::text::DbText::new(directory);
        let name_text = crate::text::DbText::new(file_name);
        let status = unsafe {
            (env.oci().lob_file_set_name)(
                env.env_ptr(),
                self.conn.err_ptr(),
                &mut self.locator,
                dir_text.ptr(),
                dir_text.len_bytes() as Ub2,
                name_text.ptr(),
                name_text.len_bytes() as Ub2,
            )
        };
        self.resolve(status, "OCILobFileSetName", "set_name")?;
        *self.name.borrow_mut() = Some((directory.to_string(), file_name.to_string()));
        Ok(())
    }

    /// Directory alias the locator points into.
    pub fn directory(&self) -> Result<String, Error> {
        self.fetch_name()?;
        Ok(self.name.borrow().as_ref().unwrap().0.clone())
    }

    /// File name the locator points at.
    pub fn name(&self) -> Result<String, Error> {
        self.fetch_name()?;
        Ok(self.name.borrow().as_ref().unwrap().1.clone())
    }

    fn fetch_name(&self) -> Result<(), Error> {
        if self.name.borrow().is_some() {
            return Ok(());
        }
        let env = self.conn.environment();
        let mut dir_buffer = TextBuffer::with_capacity(30);
        let mut name_buffer = TextBuffer::with_capacity(255);
        let mut dir_len: Ub2 = dir_buffer.capacity_bytes() as Ub2;
        let mut name_len: Ub2 = name_buffer.capacity_bytes() as Ub2;
        let status = unsafe {
            (env.oci().lob_file_get_name)(
                env.env_ptr(),
                self.conn.err_ptr(),
                self.locator,
                dir_buffer.mut_buf_ptr(),
                &mut dir_len,
                name_buffer.mut_buf_ptr(),
                &mut name_len,
            )
        };
        self.resolve(status, "OCILobFileGetName", "name")?;
        dir_buffer.set_actual_len_bytes(dir_len as u32);
        name_buffer.set_actual_len_bytes(name_len as u32);
        *self.name.borrow_mut() = Some((dir_buffer.to_utf8(), name_buffer.to_utf8()));
        Ok(())
    }

    /// `true` if the file exists in the server directory.
    pub fn exists(&self) -> Result<bool, Error> {
        let mut flag: OciBool = 0;
        let status = unsafe {
            (self.conn.environment().oci().lob_file_exists)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                &mut flag,
            )
        };
        self.resolve(status, "OCILobFileExists", "exists")?;
        Ok(flag != 0)
    }

    pub fn open(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().lob_file_open)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                crate::oci::constants::OCI_FILE_READONLY,
            )
        };
        self.resolve(status, "OCILobFileOpen", "open")
    }

    pub fn is_open(&self) -> Result<bool, Error> {
        let mut flag: OciBool = 0;
        let status = unsafe {
            (self.conn.environment().oci().lob_file_is_open)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
                &mut flag,
            )
        };
        self.resolve(status, "OCILobFileIsOpen", "is_open")?;
        Ok(flag != 0)
    }

    pub fn close(&mut self) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().lob_file_close)(
                self.conn.svc_ptr(),
                self.conn.err_ptr(),
                self.locator,
            )
        };
        self.resolve(status, "OCILobFileClose", "close")
    }

    /// File length in bytes.
    pub fn length(&self) -> Result<u64, Error> {
        let oci = self.conn.environment().oci();
        if let Some(get_length2) = oci.lob_get_length2 {
            let mut length: Ub8 = 0;
            let status = unsafe {
                get_length2(self.conn.svc_ptr(), self.conn.err_ptr(), self.locator, &mut length)
            };
            self.resolve(status, "OCILobGetLength2", "length")?;
            Ok(length)
        } else {
            let mut length: Ub4 = 0;
            let status = unsafe {
                (oci.lob_get_length)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut length,
                )
            };
            self.resolve(status, "OCILobGetLength", "length")?;
            Ok(length as u64)
        }
    }

    /// Current 0-based read position in bytes.
    pub fn offset(&self) -> u64 {
        self.offset - 1
    }

    /// Moves the read position, with the same clamp discipline as [`Lob::seek`].
    pub fn seek(&mut self, offset: u64, mode: LobSeekMode) -> Result<(), Error> {
        let size = self.length()?;
        let target = match mode {
            LobSeekMode::Set if offset <= size => offset + 1,
            LobSeekMode::Current if self.offset + offset - 1 <= size => self.offset + offset,
            LobSeekMode::End if offset <= size => size - offset + 1,
            _ => {
                let error = Error::OutOfRange {
                    argument: "seek offset",
                };
                self.conn
                    .environment()
                    .raise(&error, SourceKind::File, "file", None, "seek");
                return Err(error);
            }
        };
        self.offset = target;
        Ok(())
    }

    /// Reads up to `byte_count` bytes from the current position.
    pub fn read_bytes(&mut self, byte_count: u64) -> Result<Vec<u8>, Error> {
        let oci = self.conn.environment().oci();
        let mut buffer = vec![0u8; byte_count.max(1) as usize];
        let transferred = if let Some(read2) = oci.lob_read2 {
            let mut byte_amt: Ub8 = byte_count;
            let mut char_amt: Ub8 = 0;
            let status = unsafe {
                read2(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut byte_amt,
                    &mut char_amt,
                    self.offset,
                    buffer.as_mut_ptr() as *mut c_void,
                    buffer.len() as Ub8,
                    OCI_ONE_PIECE,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    0,
                    SQLCS_IMPLICIT,
                )
            };
            if !matches!(
                status.into_oci_result("OCILobRead2"),
                crate::handles::OciResult::NoData
            ) {
                self.resolve(status, "OCILobRead2", "read")?;
            }
            byte_amt
        } else {
            let mut amount: Ub4 = byte_count as Ub4;
            let status = unsafe {
                (oci.lob_read)(
                    self.conn.svc_ptr(),
                    self.conn.err_ptr(),
                    self.locator,
                    &mut amount,
                    self.offset as Ub4,
                    buffer.as_mut_ptr() as *mut c_void,
                    buffer.len() as Ub4,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    0,
                    SQLCS_IMPLICIT,
                )
            };
            if !matches!(
                status.into_oci_result("OCILobRead"),
                crate::handles::OciResult::NoData
            ) {
                self.resolve(status, "OCILobRead", "read")?;
            }
            amount as u64
        };
        buffer.truncate(transferred as usize);
        self.offset += transferred;
        Ok(buffer)
    }

    fn resolve(
        &self,
        status: Sword,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::File,
            "file",
            location,
        )
    }
}

impl Drop for File<'_, '_> {
    fn drop(&mut self) {
        if let Some(holder) = self.holder.take() {
            if let Err(error) = self.conn.holders.borrow_mut().release(holder) {
                log::error!("Error freeing file locator: {error}");
            }
        }
    }
}
