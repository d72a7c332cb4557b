use crate::{
    error::Error,
    oci::{
        constants::{
            OCI_ERROR, OCI_INVALID_HANDLE, OCI_NEED_DATA, OCI_NO_DATA, OCI_SUCCESS,
            OCI_SUCCESS_WITH_INFO,
        },
        functions::OciEntryPoints,
        types::{OciError, Sword},
    },
};

use super::diagnostics::{log_diagnostics, Record};

/// Result of an OCI function call. Variants hold the same meaning as the status constants the
/// client returns. This type may hold results, but it is still the responsibility of the caller
/// to fetch the diagnostics in case of an error.
#[derive(Debug)]
pub enum OciResult<T> {
    /// The function has been executed successfully.
    Success(T),
    /// The function has been executed successfully. There have been warnings.
    SuccessWithInfo(T),
    /// A piecewise operation wants the next piece before it can make progress.
    NeedData,
    /// No (more) data available, e.g. a fetch past the last row.
    NoData,
    /// Function returned error state. Check diagnostics.
    Error {
        /// Name of the OCI call which caused the error. Helps interpreting the associated
        /// diagnostics if the error is bubbled all the way up to the end users output, where the
        /// context is lost.
        function: &'static str,
    },
}

impl OciResult<()> {
    /// Append a return value to a successful result.
    pub fn on_success<F, T>(self, f: F) -> OciResult<T>
    where
        F: FnOnce() -> T,
    {
        self.map(|()| f())
    }
}

impl<T> OciResult<T> {
    /// Applies `f` to any value wrapped in `Success` or `SuccessWithInfo`.
    pub fn map<U, F>(self, f: F) -> OciResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            OciResult::Success(v) => OciResult::Success(f(v)),
            OciResult::SuccessWithInfo(v) => OciResult::SuccessWithInfo(f(v)),
            OciResult::NeedData => OciResult::NeedData,
            OciResult::NoData => OciResult::NoData,
            OciResult::Error { function } => OciResult::Error { function },
        }
    }

    /// `true` if the variant is [`OciResult::Error`].
    pub fn is_err(&self) -> bool {
        matches!(self, OciResult::Error { .. })
    }

    /// Converts into a `Result`, fetching the Oracle diagnostic record on error and logging
    /// warnings on `SuccessWithInfo`. `NoData` and `NeedData` are protocol states, not errors;
    /// callers which can encounter them must match on the variant instead.
    pub fn into_result(
        self,
        oci: &OciEntryPoints,
        errhp: *mut OciError,
    ) -> Result<T, Error> {
        match self {
            OciResult::Success(value) => Ok(value),
            OciResult::SuccessWithInfo(value) => {
                log_diagnostics(oci, errhp);
                Ok(value)
            }
            OciResult::NeedData | OciResult::NoData => Err(Error::Internal(
                "NoData/NeedData reached a call site which cannot handle it".to_string(),
            )),
            OciResult::Error { function } => {
                let mut record = Record::default();
                if record.fill_from(oci, errhp, 1) {
                    Err(Error::Oracle {
                        code: record.code,
                        message: record.message,
                        function,
                    })
                } else {
                    Err(Error::Oracle {
                        code: 0,
                        message: "No diagnostics available.".to_string(),
                        function,
                    })
                }
            }
        }
    }

    /// Variant of [`Self::into_result`] translating `NoData` into `None`.
    pub fn into_result_opt(
        self,
        oci: &OciEntryPoints,
        errhp: *mut OciError,
    ) -> Result<Option<T>, Error> {
        match self {
            OciResult::NoData => Ok(None),
            other => other.into_result(oci, errhp).map(Some),
        }
    }
}

pub trait ExtSword {
    /// Translates the raw status word into an [`OciResult`].
    fn into_oci_result(self, function: &'static str) -> OciResult<()>;
}

impl ExtSword for Sword {
    fn into_oci_result(self, function: &'static str) -> OciResult<()> {
        match self {
            OCI_SUCCESS => OciResult::Success(()),
            OCI_SUCCESS_WITH_INFO => OciResult::SuccessWithInfo(()),
            OCI_NEED_DATA => OciResult::NeedData,
            OCI_NO_DATA => OciResult::NoData,
            OCI_ERROR => OciResult::Error { function },
            OCI_INVALID_HANDLE => panic!("Invalid handle passed to OCI function '{function}'"),
            other => panic!("Unexpected return value '{other}' for OCI function '{function}'"),
        }
    }
}
