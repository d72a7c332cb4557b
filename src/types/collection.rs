//! Instances of collection types (varrays and nested tables).

use std::ffi::c_void;

use crate::{
    connection::Connection,
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{OCI_DURATION_SESSION, OCI_IND_NOTNULL, OCI_IND_NULL, OCI_OBJECTFREE_FORCE},
        types::{OciBool, OciColl, OciInd, OciNumber, Sb4},
    },
    type_info::TypeInfo,
    types::number::Number,
};

/// Oracle type code of named collection types, for `OCIObjectNew`.
const OCI_TYPECODE_NAMEDCOLLECTION: u16 = 122;

/// A collection instance. Element access goes through the client's generic element pointers;
/// typed accessors are provided for the common `NUMBER` element case.
pub struct Collection<'conn, 'env> {
    conn: &'conn Connection<'env>,
    handle: *mut OciColl,
    type_name: String,
    allocated: bool,
}

impl<'conn, 'env> Collection<'conn, 'env> {
    /// Creates an empty collection of the described type.
    pub fn create(
        conn: &'conn Connection<'env>,
        type_info: &TypeInfo,
    ) -> Result<Self, Error> {
        if !type_info.is_collection() {
            let error = Error::TypeMismatch {
                from: "object type",
                to: "collection",
            };
            conn.environment().raise(
                &error,
                SourceKind::Collection,
                type_info.name(),
                None,
                "create",
            );
            return Err(error);
        }
        let env = conn.environment();
        let mut instance: *mut c_void = std::ptr::null_mut();
        let status = unsafe {
            (env.oci().object_new)(
                env.env_ptr(),
                conn.err_ptr(),
                conn.svc_ptr(),
                OCI_TYPECODE_NAMEDCOLLECTION,
                type_info.tdo(),
                std::ptr::null_mut(),
                OCI_DURATION_SESSION,
                1,
                &mut instance,
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIObjectNew"),
            SourceKind::Collection,
            type_info.name(),
            "create",
        )?;
        env.counters().count_object();
        Ok(Collection {
            conn,
            handle: instance as *mut OciColl,
            type_name: type_info.name().to_string(),
            allocated: true,
        })
    }

    pub(crate) fn fetched(
        conn: &'conn Connection<'env>,
        handle: *mut OciColl,
        type_name: String,
    ) -> Self {
        Collection {
            conn,
            handle,
            type_name,
            allocated: false,
        }
    }

    /// Number of elements.
    pub fn size(&self) -> Result<usize, Error> {
        let mut size: Sb4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().coll_size)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                self.handle,
                &mut size,
            )
        };
        self.resolve(status, "OCICollSize", "size")?;
        Ok(size as usize)
    }

    /// Upper bound of a varray; zero for nested tables.
    pub fn max_size(&self) -> usize {
        let max = unsafe {
            (self.conn.environment().oci().coll_max)(
                self.conn.environment().env_ptr(),
                self.handle,
            )
        };
        max.max(0) as usize
    }

    /// Removes the last `count` elements.
    pub fn trim(&mut self, count: usize) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().coll_trim)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                count as Sb4,
                self.handle,
            )
        };
        self.resolve(status, "OCICollTrim", "trim")
    }

    /// Copies the contents of `other` into `self`.
    pub fn assign(&mut self, other: &Collection<'_, '_>) -> Result<(), Error> {
        let status = unsafe {
            (self.conn.environment().oci().coll_assign)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                other.handle,
                self.handle,
            )
        };
        self.resolve(status, "OCICollAssign", "assign")
    }

    /// Appends a `NUMBER` element, or NULL.
    pub fn append_number(&mut self, value: Option<&Number<'_, '_>>) -> Result<(), Error> {
        let null_number = OciNumber::default();
        let (elem, indicator): (*const c_void, OciInd) = match value {
            Some(number) => (number.raw() as *const OciNumber as *const c_void, OCI_IND_NOTNULL),
            None => (&null_number as *const OciNumber as *const c_void, OCI_IND_NULL),
        };
        let status = unsafe {
            (self.conn.environment().oci().coll_append)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                elem,
                &indicator as *const OciInd as *const c_void,
                self.handle,
            )
        };
        self.resolve(status, "OCICollAppend", "append")
    }

    /// `NUMBER` element at the 0-based `index`. `Ok(None)` for NULL elements; an error if the
    /// index does not exist.
    pub fn number_at(&self, index: usize) -> Result<Option<Number<'conn, 'env>>, Error> {
        let mut exists: OciBool = 0;
        let mut elem: *mut c_void = std::ptr::null_mut();
        let mut elem_ind: *mut c_void = std::ptr::null_mut();
        let status = unsafe {
            (self.conn.environment().oci().coll_get_item)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                self.handle,
                index as Sb4,
                &mut exists,
                &mut elem,
                &mut elem_ind,
            )
        };
        self.resolve(status, "OCICollGetElem", "element")?;
        if exists == 0 {
            let error = Error::OutOfRange {
                argument: "collection index",
            };
            self.conn.environment().raise(
                &error,
                SourceKind::Collection,
                &self.type_name,
                None,
                "element",
            );
            return Err(error);
        }
        let indicator = elem_ind as *const OciInd;
        if !indicator.is_null() && unsafe { *indicator } == OCI_IND_NULL {
            return Ok(None);
        }
        let raw = unsafe { *(elem as *const OciNumber) };
        Ok(Some(Number::from_raw(self.conn, raw)))
    }

    /// Replaces the element at the 0-based `index` with a `NUMBER`.
    pub fn set_number_at(
        &mut self,
        index: usize,
        value: Option<&Number<'_, '_>>,
    ) -> Result<(), Error> {
        let null_number = OciNumber::default();
        let (elem, indicator): (*const c_void, OciInd) = match value {
            Some(number) => (number.raw() as *const OciNumber as *const c_void, OCI_IND_NOTNULL),
            None => (&null_number as *const OciNumber as *const c_void, OCI_IND_NULL),
        };
        let status = unsafe {
            (self.conn.environment().oci().coll_assign_elem)(
                self.conn.environment().env_ptr(),
                self.conn.err_ptr(),
                index as Sb4,
                elem,
                &indicator as *const OciInd as *const c_void,
                self.handle,
            )
        };
        self.resolve(status, "OCICollAssignElem", "set_element")
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Collection,
            &self.type_name,
            location,
        )
    }
}

impl Drop for Collection<'_, '_> {
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
