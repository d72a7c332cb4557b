use std::fmt;

use log::warn;

use crate::{
    oci::{
        constants::{OCI_HTYPE_ERROR, OCI_NO_DATA, OCI_SUCCESS, OCI_SUCCESS_WITH_INFO},
        functions::OciEntryPoints,
        types::{OciError, OraText, Sb4},
    },
    text::{slice_to_cow_utf8, DbChar},
};

/// Longest diagnostic message we expect, in characters. Oracle messages cap out at 3024 bytes.
const MAX_MESSAGE_LEN: usize = 3072;

/// Oracle diagnostic record, as fetched from an error handle after a failing or warning call.
#[derive(Default)]
pub struct Record {
    /// Oracle error code (`ORA-NNNNN`).
    pub code: Sb4,
    /// Message text, decoded to UTF-8.
    pub message: String,
}

impl Record {
    /// Fill this diagnostic record from an OCI error handle.
    ///
    /// # Return
    ///
    /// `true` if a record has been found, `false` if not.
    pub fn fill_from(
        &mut self,
        oci: &OciEntryPoints,
        errhp: *mut OciError,
        record_number: u32,
    ) -> bool {
        // Diagnostic records in OCI are indexed starting with 1.
        assert!(record_number > 0);

        let mut buffer = vec![0 as DbChar; MAX_MESSAGE_LEN];
        let mut code: Sb4 = 0;
        let status = unsafe {
            (oci.error_get)(
                errhp as *mut _,
                record_number,
                std::ptr::null_mut(),
                &mut code,
                buffer.as_mut_ptr() as *mut OraText,
                crate::text::binary_length(&buffer) as u32,
                OCI_HTYPE_ERROR,
            )
        };

        match status {
            OCI_SUCCESS | OCI_SUCCESS_WITH_INFO => {
                let terminator = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
                let mut message = slice_to_cow_utf8(&buffer[..terminator]).into_owned();
                // Oracle terminates its messages with a newline.
                while message.ends_with(['\n', '\r']) {
                    message.pop();
                }
                self.code = code;
                self.message = message;
                true
            }
            OCI_NO_DATA => false,
            unexpected => panic!("OCIErrorGet returned: {unexpected}"),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORA-{:05}: {}", self.code, self.message)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Fetches and logs every diagnostic record on `errhp`. Called for calls returning
/// success-with-info, so warnings reach the application through the `log` infrastructure.
pub fn log_diagnostics(oci: &OciEntryPoints, errhp: *mut OciError) {
    let mut record = Record::default();
    let mut record_number = 1;
    while record.fill_from(oci, errhp, record_number) {
        warn!("{record}");
        record_number += 1;
    }
}
