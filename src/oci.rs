//! Raw surface of the Oracle Call Interface.
//!
//! This module plays the role a `-sys` crate would play for a statically linked client library.
//! Since the Oracle client is loaded at runtime there is no link time dependency; instead
//! [`functions::OciEntryPoints`] resolves every entry point by name when the environment is
//! initialized.

pub mod constants;
pub mod functions;
pub mod types;

use std::fmt;

/// Version of the Oracle client library, either reported by `OCIClientVersion` or inferred from
/// the set of symbols the shared library exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub update: i32,
}

impl Version {
    pub const V8_0: Version = Version::minor(8, 0);
    pub const V8_1: Version = Version::minor(8, 1);
    pub const V9_0: Version = Version::minor(9, 0);
    pub const V9_2: Version = Version::minor(9, 2);
    pub const V10_1: Version = Version::minor(10, 1);
    pub const V10_2: Version = Version::minor(10, 2);
    pub const V11_1: Version = Version::minor(11, 1);
    pub const V11_2: Version = Version::minor(11, 2);
    pub const V12_1: Version = Version::minor(12, 1);
    pub const V12_2: Version = Version::minor(12, 2);
    pub const V18_1: Version = Version::minor(18, 1);
    pub const V18_3: Version = Version::minor(18, 3);
    pub const V19_3: Version = Version::minor(19, 3);
    pub const V21_3: Version = Version::minor(21, 3);
    pub const V23_4: Version = Version::minor(23, 4);

    pub const fn new(major: i32, minor: i32, update: i32) -> Self {
        Version {
            major,
            minor,
            update,
        }
    }

    pub const fn minor(major: i32, minor: i32) -> Self {
        Version::new(major, minor, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.update)
    }
}

/// Default file name of the Oracle client shared library on this platform.
pub fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "oci.dll"
    } else if cfg!(target_os = "macos") {
        "libclntsh.dylib"
    } else {
        "libclntsh.so"
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn version_tiers_are_ordered() {
        assert!(Version::V8_0 < Version::V9_2);
        assert!(Version::V11_2 < Version::V12_1);
        assert!(Version::V19_3 < Version::V23_4);
        assert!(Version::new(19, 3, 7) > Version::V19_3);
    }

    #[test]
    fn version_displays_as_triple() {
        assert_eq!("21.3.0", Version::V21_3.to_string());
    }
}
