//! Describe cache for tables, views and user defined types.
//!
//! Describing is expensive (a round trip plus descriptor walking), so results are cached per
//! connection, keyed by the normalized object name. Entries are shared; dropping a `TypeInfo`
//! leaves the cache entry alive for the next lookup.

use std::{
    ffi::c_void,
    ptr::null_mut,
    rc::Rc,
};

use crate::{
    bind::normalize_bind_name,
    connection::Connection,
    define::{read_column_description, ColumnDescription},
    error::{Error, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_COLLECTION_TYPECODE, OCI_ATTR_LIST_COLUMNS, OCI_ATTR_NUM_COLS,
            OCI_ATTR_PARAM, OCI_ATTR_TYPECODE, OCI_DTYPE_PARAM, OCI_DURATION_SESSION,
            OCI_HTYPE_DESCRIBE, OCI_OTYPE_NAME, OCI_PTYPE_TABLE, OCI_PTYPE_TYPE, OCI_PTYPE_VIEW,
            OCI_TYPEGET_ALL,
        },
        types::{OciDescribe, OciParam, OciType, Ub1, Ub2, Ub4},
    },
    text::DbText,
};

/// What kind of schema object a [`TypeInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInfoKind {
    Table,
    View,
    Type,
}

impl TypeInfoKind {
    fn describe_code(self) -> Ub1 {
        match self {
            TypeInfoKind::Table => OCI_PTYPE_TABLE,
            TypeInfoKind::View => OCI_PTYPE_VIEW,
            TypeInfoKind::Type => OCI_PTYPE_TYPE,
        }
    }
}

pub(crate) struct TypeInfoShared {
    pub name: String,
    pub schema: String,
    pub kind: TypeInfoKind,
    /// Type descriptor object, resolved for user defined types only.
    pub tdo: *mut OciType,
    pub typecode: Ub2,
    pub collection_typecode: Ub2,
    pub columns: Vec<ColumnDescription>,
}

/// Cached description of a table, view or type.
pub struct TypeInfo {
    shared: Rc<TypeInfoShared>,
}

impl TypeInfo {
    /// Describes `name` (optionally `schema.name`) of the given kind, serving repeated lookups
    /// from the connection's cache.
    pub fn describe(
        conn: &Connection<'_>,
        name: &str,
        kind: TypeInfoKind,
    ) -> Result<TypeInfo, Error> {
        conn.ensure_usable("describe_type")?;
        let (schema, object) = split_qualified_name(name);
        let key = format!("{:?}:{schema}.{object}", kind);
        if let Some(shared) = conn.type_cache.borrow().get(&key) {
            return Ok(TypeInfo {
                shared: Rc::clone(shared),
            });
        }

        let shared = Rc::new(describe_uncached(conn, &schema, &object, kind)?);
        conn.type_cache
            .borrow_mut()
            .insert(key, Rc::clone(&shared));
        Ok(TypeInfo { shared })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn schema(&self) -> &str {
        &self.shared.schema
    }

    pub fn kind(&self) -> TypeInfoKind {
        self.shared.kind
    }

    pub fn columns(&self) -> &[ColumnDescription] {
        &self.shared.columns
    }

    /// `true` if this describes a collection type (varray or nested table).
    pub fn is_collection(&self) -> bool {
        self.shared.collection_typecode != 0
    }

    /// Oracle type code of a described user defined type; zero for tables and views.
    pub fn type_code(&self) -> u16 {
        self.shared.typecode
    }

    pub(crate) fn tdo(&self) -> *mut OciType {
        self.shared.tdo
    }
}

fn split_qualified_name(name: &str) -> (String, String) {
    match name.split_once('.') {
        Some((schema, object)) => (
            normalize_bind_name(schema),
            normalize_bind_name(object),
        ),
        None => (String::new(), normalize_bind_name(name)),
    }
}

fn describe_uncached(
    conn: &Connection<'_>,
    schema: &str,
    object: &str,
    kind: TypeInfoKind,
) -> Result<TypeInfoShared, Error> {
    let env = conn.environment();
    let oci = env.oci();

    let dschp = env.counters().alloc_handle(
        oci,
        env.env_ptr() as *const c_void,
        OCI_HTYPE_DESCRIBE,
    )? as *mut OciDescribe;

    let qualified = if schema.is_empty() {
        object.to_string()
    } else {
        format!("{schema}.{object}")
    };
    let name_text = DbText::new(&qualified);
    let status = unsafe {
        (oci.describe_any)(
            conn.svc_ptr(),
            conn.err_ptr(),
            name_text.ptr() as *mut c_void,
            name_text.len_bytes() as Ub4,
            OCI_OTYPE_NAME,
            0,
            kind.describe_code(),
            dschp,
        )
    };
    let outcome = conn.resolve_for(
        status.into_oci_result("OCIDescribeAny"),
        SourceKind::TypeInfo,
        &qualified,
        "describe_type",
    );
    if let Err(error) = outcome {
        unsafe {
            env.counters()
                .free_handle(oci, dschp as *mut c_void, OCI_HTYPE_DESCRIBE);
        }
        return Err(error);
    }

    let result = walk_description(conn, dschp, schema, object, kind, &qualified);
    unsafe {
        env.counters()
            .free_handle(oci, dschp as *mut c_void, OCI_HTYPE_DESCRIBE);
    }
    result
}

fn walk_description(
    conn: &Connection<'_>,
    dschp: *mut OciDescribe,
    schema: &str,
    object: &str,
    kind: TypeInfoKind,
    qualified: &str,
) -> Result<TypeInfoShared, Error> {
    let oci = conn.environment().oci();

    // The top level parameter of the describe handle.
    let mut param: *mut c_void = null_mut();
    let status = unsafe {
        (oci.attr_get)(
            dschp as *const c_void,
            OCI_HTYPE_DESCRIBE,
            &mut param as *mut *mut c_void as *mut c_void,
            null_mut(),
            OCI_ATTR_PARAM,
            conn.err_ptr(),
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCIAttrGet(describe parameter)"),
        SourceKind::TypeInfo,
        qualified,
        "describe_type",
    )?;
    let param = param as *mut OciParam;

    let mut typecode: Ub2 = 0;
    let mut collection_typecode: Ub2 = 0;
    let mut tdo: *mut OciType = null_mut();
    if kind == TypeInfoKind::Type {
        typecode = describe_attr(conn, param, OCI_ATTR_TYPECODE, qualified).unwrap_or(0);
        collection_typecode =
            describe_attr(conn, param, OCI_ATTR_COLLECTION_TYPECODE, qualified).unwrap_or(0);
        tdo = resolve_tdo(conn, schema, object)?;
    }

    // Column list: table/view columns, or type attributes.
    let mut columns = Vec::new();
    let mut column_count: Ub2 = describe_attr(conn, param, OCI_ATTR_NUM_COLS, qualified)
        .unwrap_or(0);
    if kind == TypeInfoKind::Type {
        let attr_count: Ub2 = describe_attr(
            conn,
            param,
            crate::oci::constants::OCI_ATTR_NUM_TYPE_ATTRS,
            qualified,
        )
        .unwrap_or(0);
        column_count = attr_count;
    }
    if column_count > 0 {
        let list_attr = if kind == TypeInfoKind::Type {
            crate::oci::constants::OCI_ATTR_LIST_TYPE_ATTRS
        } else {
            OCI_ATTR_LIST_COLUMNS
        };
        let mut list: *mut c_void = null_mut();
        let status = unsafe {
            (oci.attr_get)(
                param as *const c_void,
                OCI_DTYPE_PARAM,
                &mut list as *mut *mut c_void as *mut c_void,
                null_mut(),
                list_attr,
                conn.err_ptr(),
            )
        };
        conn.resolve_for(
            status.into_oci_result("OCIAttrGet(column list)"),
            SourceKind::TypeInfo,
            qualified,
            "describe_type",
        )?;

        for position in 1..=column_count as u32 {
            let mut col_param: *mut c_void = null_mut();
            let status = unsafe {
                (oci.param_get)(
                    list as *const c_void,
                    OCI_DTYPE_PARAM,
                    conn.err_ptr(),
                    &mut col_param,
                    position,
                )
            };
            conn.resolve_for(
                status.into_oci_result("OCIParamGet(column)"),
                SourceKind::TypeInfo,
                qualified,
                "describe_type",
            )?;
            let col_param = col_param as *mut OciParam;
            let column = read_column_description(conn, col_param, qualified);
            unsafe {
                (oci.descriptor_free)(col_param as *mut c_void, OCI_DTYPE_PARAM);
            }
            columns.push(column?);
        }
    }

    Ok(TypeInfoShared {
        name: object.to_string(),
        schema: schema.to_string(),
        kind,
        tdo,
        typecode,
        collection_typecode,
        columns,
    })
}

fn describe_attr<T: Default>(
    conn: &Connection<'_>,
    param: *mut OciParam,
    attribute: Ub4,
    qualified: &str,
) -> Result<T, Error> {
    let oci = conn.environment().oci();
    let mut value = T::default();
    let status = unsafe {
        (oci.attr_get)(
            param as *const c_void,
            OCI_DTYPE_PARAM,
            &mut value as *mut T as *mut c_void,
            null_mut(),
            attribute,
            conn.err_ptr(),
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCIAttrGet(describe attribute)"),
        SourceKind::TypeInfo,
        qualified,
        "describe_type",
    )
    .map(|()| value)
}

/// Type descriptor (`OCIType`) of a user defined type, pinned for the session duration.
pub(crate) fn resolve_tdo(
    conn: &Connection<'_>,
    schema: &str,
    name: &str,
) -> Result<*mut OciType, Error> {
    let env = conn.environment();
    let oci = env.oci();
    let schema_text = DbText::new(schema);
    let name_text = DbText::new(name);
    let mut tdo: *mut OciType = null_mut();
    let status = unsafe {
        (oci.type_by_name)(
            env.env_ptr(),
            conn.err_ptr(),
            conn.svc_ptr(),
            if schema.is_empty() {
                std::ptr::null()
            } else {
                schema_text.ptr()
            },
            schema_text.len_bytes() as Ub4,
            name_text.ptr(),
            name_text.len_bytes() as Ub4,
            std::ptr::null(),
            0,
            OCI_DURATION_SESSION,
            OCI_TYPEGET_ALL,
            &mut tdo,
        )
    };
    conn.resolve_for(
        status.into_oci_result("OCITypeByName"),
        SourceKind::TypeInfo,
        name,
        "resolve_type",
    )?;
    Ok(tdo)
}

#[cfg(test)]
mod tests {
    use super::split_qualified_name;

    #[test]
    fn qualified_names_split_and_normalize() {
        assert_eq!(
            ("HR".to_string(), "EMPLOYEES".to_string()),
            split_qualified_name("hr.employees")
        );
        assert_eq!(
            (String::new(), "EMPLOYEES".to_string()),
            split_qualified_name("employees")
        );
        assert_eq!(
            (String::new(), "mixedCase".to_string()),
            split_qualified_name("\"mixedCase\"")
        );
    }
}
