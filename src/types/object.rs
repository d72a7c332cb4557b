//! Instances of named SQL types (`CREATE TYPE ... AS OBJECT`).

use std::ffi::c_void;

use crate::{
    connection::Connection,
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_DURATION_SESSION, OCI_IND_NULL, OCI_OBJECTFREE_FORCE},
        types::{OciNumber, OciType, OraText, Sb2, Ub4},
    },
    text::DbText,
    type_info::TypeInfo,
    types::number::Number,
};

/// Oracle type code of object types, for `OCIObjectNew`.
const OCI_TYPECODE_OBJECT: u16 = 108;

/// An object instance. Created values own the instance; fetched ones live in the client's
/// object cache, released together with the connection.
pub struct Object<'conn, 'env> {
    conn: &'conn Connection<'env>,
    instance: *mut c_void,
    /// Client side indicator struct; its leading atomic indicator tells NULL-ness of the whole
    /// instance.
    indicator: *mut c_void,
    tdo: *mut OciType,
    type_schema: String,
    type_name: String,
    allocated: bool,
}

impl<'conn, 'env> Object<'conn, 'env> {
    /// Creates a new, atomically null instance of the described type.
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
                OCI_TYPECODE_OBJECT,
                type_info.tdo(),
                std::ptr::null_mut(),
                OCI_DURATION_SESSION,
                1,
                &mut instance,
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIObjectNew"),
            SourceKind::Object,
            type_info.name(),
            "create",
        )?;
        env.counters().count_object();

        let mut indicator: *mut c_void = std::ptr::null_mut();
        let status = unsafe {
            (env.oci().object_get_ind)(env.env_ptr(), conn.err_ptr(), instance, &mut indicator)
        };
        conn.resolve_for(
            status.into_oci_result("OCIObjectGetInd"),
            SourceKind::Object,
            type_info.name(),
            "create",
        )?;

        Ok(Object {
            conn,
            instance,
            indicator,
            tdo: type_info.tdo(),
            type_schema: type_info.schema().to_string(),
            type_name: type_info.name().to_string(),
            allocated: true,
        })
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        instance: *mut c_void,
        indicator: *mut c_void,
        type_schema: String,
        type_name: String,
    ) -> Self {
        Object {
            conn,
            instance,
            indicator,
            tdo: std::ptr::null_mut(),
            type_schema,
            type_name,
            allocated: false,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn type_schema(&self) -> &str {
        &self.type_schema
    }

    /// `true` if the whole instance is atomically null.
    pub fn is_null(&self) -> bool {
        let ind = self.indicator as *const Sb2;
        ind.is_null() || unsafe { *ind } == OCI_IND_NULL
    }

    /// Value of a `NUMBER` attribute.
    pub fn attribute_number(&self, name: &str) -> Result<Option<Number<'conn, 'env>>, Error> {
        let (value, null) = self.attribute_raw(name)?;
        if null || value.is_null() {
            return Ok(None);
        }
        let raw = unsafe { *(value as *const OciNumber) };
        Ok(Some(Number::from_raw(self.conn, raw)))
    }

    /// Value of a character attribute.
    pub fn attribute_string(&self, name: &str) -> Result<Option<String>, Error> {
        let (value, null) = self.attribute_raw(name)?;
        if null || value.is_null() {
            return Ok(None);
        }
        let env = self.conn.environment();
        // Character attributes are OCIString values; length is in bytes.
        let string = unsafe { *(value as *const *mut crate::oci::types::OciString) };
        if string.is_null() {
            return Ok(None);
        }
        let text = unsafe { (env.oci().string_ptr)(env.env_ptr(), string) };
        let len = unsafe { (env.oci().string_size)(env.env_ptr(), string) } as usize;
        let units = len / std::mem::size_of::<crate::text::DbChar>();
        let slice = unsafe {
            std::slice::from_raw_parts(text as *const crate::text::DbChar, units)
        };
        Ok(Some(crate::text::slice_to_cow_utf8(slice).into_owned()))
    }

    /// Sets a character attribute.
    pub fn set_attribute_string(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let env = self.conn.environment();
        let text = DbText::new(value);
        let mut string: *mut crate::oci::types::OciString = std::ptr::null_mut();
        let status = unsafe {
            (env.oci().string_assign_text)(
                env.env_ptr(),
                self.conn.err_ptr(),
                text.ptr(),
                text.len_bytes() as Ub4,
                &mut string,
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIStringAssignText"),
            SourceKind::Object,
            &self.type_name,
            "set_attribute",
        )?;
        self.set_attribute_raw(name, string as *const c_void)
    }

    /// Sets a `NUMBER` attribute.
    pub fn set_attribute_number(&mut self, name: &str, value: &Number<'_, '_>) -> Result<(), Error> {
        self.set_attribute_raw(name, value.raw() as *const OciNumber as *const c_void)
    }

    fn attribute_raw(&self, name: &str) -> Result<(*mut c_void, bool), Error> {
        let env = self.conn.environment();
        let name_text = DbText::new(name);
        let mut names: [*const OraText; 1] = [name_text.ptr()];
        let lengths: [Ub4; 1] = [name_text.len_bytes() as Ub4];
        let mut null_status: Sb2 = 0;
        let mut attr_null: *mut c_void = std::ptr::null_mut();
        let mut attr_value: *mut c_void = std::ptr::null_mut();
        let mut attr_tdo: *mut OciType = std::ptr::null_mut();
        let status = unsafe {
            (env.oci().object_get_attr)(
                env.env_ptr(),
                self.conn.err_ptr(),
                self.instance,
                self.indicator,
                self.tdo,
                names.as_mut_ptr(),
                lengths.as_ptr(),
                1,
                std::ptr::null(),
                0,
                &mut null_status,
                &mut attr_null,
                &mut attr_value,
                &mut attr_tdo,
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIObjectGetAttr"),
            SourceKind::Object,
            &self.type_name,
            "attribute",
        )?;
        Ok((attr_value, null_status == OCI_IND_NULL))
    }

    fn set_attribute_raw(&mut self, name: &str, value: *const c_void) -> Result<(), Error> {
        let env = self.conn.environment();
        let name_text = DbText::new(name);
        let mut names: [*const OraText; 1] = [name_text.ptr()];
        let lengths: [Ub4; 1] = [name_text.len_bytes() as Ub4];
        let status = unsafe {
            (env.oci().object_set_attr)(
                env.env_ptr(),
                self.conn.err_ptr(),
                self.instance,
                self.indicator,
                self.tdo,
                names.as_mut_ptr(),
                lengths.as_ptr(),
                1,
                std::ptr::null(),
                0,
                0,
                std::ptr::null(),
                value,
            )
        };
        self.conn.resolve_for(
            status.into_oci_result("OCIObjectSetAttr"),
            SourceKind::Object,
            &self.type_name,
            "set_attribute",
        )
    }
}

impl Drop for Object<'_, '_> {
    fn drop(&mut self) {
        if self.allocated {
            let env = self.conn.environment();
            unsafe {
                (env.oci().object_free)(
                    env.env_ptr(),
                    self.conn.err_ptr(),
                    self.instance,
                    OCI_OBJECTFREE_FORCE,
                );
            }
            env.counters().uncount_object();
        }
    }
}
