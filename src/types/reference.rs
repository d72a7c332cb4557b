//! `REF` values pointing at object table rows.

use std::ffi::c_void;

use crate::{
    connection::Connection,
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_DURATION_SESSION, OCI_OBJECTFREE_FORCE, SQLT_REF},
        types::{OciRefDesc, Sword, Ub4},
    },
    type_info::TypeInfo,
};

/// A reference to a persistent object instance. Created values own the `OCIRef`; fetched ones
/// borrow it from the result set.
pub struct Reference<'conn, 'env> {
    conn: &'conn Connection<'env>,
    handle: *mut OciRefDesc,
    allocated: bool,
}

impl<'conn, 'env> Reference<'conn, 'env> {
    /// Creates an empty (null) reference of the given object type.
    pub fn create(
        conn: &'conn Connection<'env>,
        type_info: &TypeInfo,
    ) -> Result<Self, Error> {
        let env = conn.environment();
        let mut instance: *mut c_void = std::ptr::null_mut();
        let status = unsafe {
            (env.oci().object_new)(
                env.env_ptr(),
                conn.err_ptr(),
                conn.svc_ptr(),
                SQLT_REF,
                type_info.tdo(),
                std::ptr::null_mut(),
                OCI_DURATION_SESSION,
                1,
                &mut instance,
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIObjectNew"),
            SourceKind::Reference,
            type_info.name(),
            "create",
        )?;
        env.counters().count_object();
        Ok(Reference {
            conn,
            handle: instance as *mut OciRefDesc,
            allocated: true,
        })
    }

    pub(crate) fn fetched(conn: &'conn Connection<'env>, handle: *mut OciRefDesc) -> Self {
        Reference {
            conn,
            handle,
            allocated: false,
        }
    }

    /// `true` if the reference does not point anywhere.
    pub fn is_null(&self) -> bool {
        unsafe {
            (self.conn.environment().oci().ref_is_null)(
                self.conn.environment().env_ptr(),
                self.handle,
            ) != 0
        }
    }

    /// Clears the reference back to null.
    pub fn clear(&mut self) {
        unsafe {
            (self.conn.environment().oci().ref_clear)(
                self.conn.environment().env_ptr(),
                self.handle,
            );
        }
    }

    pub fn assign(&mut self, other: &Reference<'_, '_>) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().ref_assign)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                other.handle,
                &mut self.handle,
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIRefAssign"),
            SourceKind::Reference,
            "ref",
            "assign",
        )
    }

    /// Length of the hexadecimal representation in characters.
    pub fn hex_size(&self) -> u32 {
        unsafe {
            (self.conn.environment().oci().ref_hex_size)(
                self.conn.environment().env_ptr(),
                self.handle,
            )
        }
    }

    /// Hexadecimal representation (lower case hex digits).
    pub fn to_hex_string(&self) -> Result<String, Error> {
        let size = self.hex_size() as usize;
        if size == 0 || self.is_null() {
            return Ok(String::new());
        }
        let mut buffer = vec![0u8; size];
        let mut len: Ub4 = buffer.len() as Ub4;
        let status: Sword = unsafe {
            (self.conn.environment().oci().ref_to_hex)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                self.handle,
                buffer.as_mut_ptr(),
                &mut len,
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIRefToHex"),
            SourceKind::Reference,
            "ref",
            "to_hex_string",
        )?;
        buffer.truncate(len as usize);
        Ok(String::from_utf8_lossy(&buffer).to_lowercase())
    }
}

impl Drop for Reference<'_, '_> {
    fn drop(&mut self) {
        if self.allocated {
            let env = self.conn.environment();
            unsafe {
                (env.oci().object_free)(
                    env.env_ptr(),
                    self.conn.err_ptr(),
                    self.handle as *mut c_void,
                    OCI_OBJECTFREE_FORCE,
                );
            }
            env.counters().uncount_object();
        }
    }
}
