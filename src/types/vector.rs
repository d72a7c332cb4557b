//! `VECTOR` values (Oracle 23ai).

use std::ffi::c_void;

use crate::{
    connection::Connection,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_VECTOR_DATA_FORMAT, OCI_ATTR_VECTOR_DIMENSION, OCI_DEFAULT,
            OCI_DTYPE_VECTOR, OCI_VECTOR_FORMAT_BINARY, OCI_VECTOR_FORMAT_FLOAT32,
            OCI_VECTOR_FORMAT_FLOAT64, OCI_VECTOR_FORMAT_INT8,
        },
        types::{OciVectorDesc, Ub1, Ub4},
    },
};

/// Storage format of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    Float32,
    Float64,
    Int8,
    /// Bit vector, packed eight dimensions per byte.
    Binary,
}

impl VectorFormat {
    fn code(self) -> Ub1 {
        match self {
            VectorFormat::Float32 => OCI_VECTOR_FORMAT_FLOAT32,
            VectorFormat::Float64 => OCI_VECTOR_FORMAT_FLOAT64,
            VectorFormat::Int8 => OCI_VECTOR_FORMAT_INT8,
            VectorFormat::Binary => OCI_VECTOR_FORMAT_BINARY,
        }
    }

    fn from_code(code: Ub1) -> Option<Self> {
        match code {
            OCI_VECTOR_FORMAT_FLOAT32 => Some(VectorFormat::Float32),
            OCI_VECTOR_FORMAT_FLOAT64 => Some(VectorFormat::Float64),
            OCI_VECTOR_FORMAT_INT8 => Some(VectorFormat::Int8),
            OCI_VECTOR_FORMAT_BINARY => Some(VectorFormat::Binary),
            _ => None,
        }
    }
}

/// A vector descriptor. Created values own it; fetched ones borrow it from the result set.
pub struct Vector<'conn, 'env> {
    conn: &'conn Connection<'env>,
    handle: *mut OciVectorDesc,
    allocated: bool,
}

impl<'conn, 'env> Vector<'conn, 'env> {
    /// Allocates an empty vector descriptor. Requires a 23.4 or newer client.
    pub fn create(conn: &'conn Connection<'env>) -> Result<Self, Error> {
        conn.environment()
            .oci()
            .vector_from_array
            .ok_or_else(|| not_available(conn))?;
        let env = conn.environment();
        let handle = env.counters().alloc_descriptor(
            env.oci(),
            env.env_ptr() as *const c_void,
            OCI_DTYPE_VECTOR,
        )? as *mut OciVectorDesc;
        Ok(Vector {
            conn,
            handle,
            allocated: true,
        })
    }

    pub(crate) fn fetched(conn: &'conn Connection<'env>, handle: *mut OciVectorDesc) -> Self {
        Vector {
            conn,
            handle,
            allocated: false,
        }
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> Result<u32, Error> {
        let mut dimensions: Ub4 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.handle as *const c_void,
                OCI_DTYPE_VECTOR,
                &mut dimensions as *mut Ub4 as *mut c_void,
                std::ptr::null_mut(),
                OCI_ATTR_VECTOR_DIMENSION,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(vector dimension)", "dimensions")?;
        Ok(dimensions)
    }

    /// Storage format.
    pub fn format(&self) -> Result<VectorFormat, Error> {
        let mut code: Ub1 = 0;
        let status = unsafe {
            (self.conn.environment().oci().attr_get)(
                self.handle as *const c_void,
                OCI_DTYPE_VECTOR,
                &mut code as *mut Ub1 as *mut c_void,
                std::ptr::null_mut(),
                OCI_ATTR_VECTOR_DATA_FORMAT,
                self.conn.err_ptr(),
            )
        };
        self.resolve(status, "OCIAttrGet(vector format)", "format")?;
        VectorFormat::from_code(code).ok_or_else(|| {
            let error = Error::Internal(format!("unknown vector format code {code}"));
            self.conn.environment().raise(
                &error,
                SourceKind::Vector,
                "vector",
                None,
                "format",
            );
            error
        })
    }

    /// Fills the vector from an `f32` slice.
    pub fn load_f32(&mut self, values: &[f32]) -> Result<(), Error> {
        self.load_raw(VectorFormat::Float32, values.len() as u32, values.as_ptr() as *mut c_void)
    }

    /// Fills the vector from an `f64` slice.
    pub fn load_f64(&mut self, values: &[f64]) -> Result<(), Error> {
        self.load_raw(VectorFormat::Float64, values.len() as u32, values.as_ptr() as *mut c_void)
    }

    /// Fills the vector from an `i8` slice.
    pub fn load_i8(&mut self, values: &[i8]) -> Result<(), Error> {
        self.load_raw(VectorFormat::Int8, values.len() as u32, values.as_ptr() as *mut c_void)
    }

    /// Fills a binary vector; each byte packs eight dimensions.
    pub fn load_binary(&mut self, packed: &[u8]) -> Result<(), Error> {
        self.load_raw(
            VectorFormat::Binary,
            packed.len() as u32 * 8,
            packed.as_ptr() as *mut c_void,
        )
    }

    /// Reads the vector out as `f32` values.
    pub fn to_f32(&self) -> Result<Vec<f32>, Error> {
        let mut values = vec![0f32; self.dimensions()? as usize];
        let mut dimensions = values.len() as Ub4;
        self.unload_raw(
            VectorFormat::Float32,
            &mut dimensions,
            values.as_mut_ptr() as *mut c_void,
        )?;
        values.truncate(dimensions as usize);
        Ok(values)
    }

    /// Reads the vector out as `f64` values.
    pub fn to_f64(&self) -> Result<Vec<f64>, Error> {
        let mut values = vec![0f64; self.dimensions()? as usize];
        let mut dimensions = values.len() as Ub4;
        self.unload_raw(
            VectorFormat::Float64,
            &mut dimensions,
            values.as_mut_ptr() as *mut c_void,
        )?;
        values.truncate(dimensions as usize);
        Ok(values)
    }

    /// Reads the vector out as `i8` values.
    pub fn to_i8(&self) -> Result<Vec<i8>, Error> {
        let mut values = vec![0i8; self.dimensions()? as usize];
        let mut dimensions = values.len() as Ub4;
        self.unload_raw(
            VectorFormat::Int8,
            &mut dimensions,
            values.as_mut_ptr() as *mut c_void,
        )?;
        values.truncate(dimensions as usize);
        Ok(values)
    }

    fn load_raw(
        &mut self,
        format: VectorFormat,
        dimensions: u32,
        data: *mut c_void,
    ) -> Result<(), Error> {
        let from_array = self
            .conn
            .environment()
            .oci()
            .vector_from_array
            .ok_or_else(|| not_available(self.conn))?;
        let status = unsafe {
            from_array(
                self.handle,
                self.conn.err_ptr(),
                format.code(),
                dimensions,
                data,
                OCI_DEFAULT,
            )
        };
        self.resolve(status, "OCIVectorFromArray", "load")
    }

    fn unload_raw(
        &self,
        format: VectorFormat,
        dimensions: &mut Ub4,
        data: *mut c_void,
    ) -> Result<(), Error> {
        let to_array = self
            .conn
            .environment()
            .oci()
            .vector_to_array
            .ok_or_else(|| not_available(self.conn))?;
        let status = unsafe {
            to_array(
                self.handle,
                self.conn.err_ptr(),
                format.code(),
                dimensions,
                data,
                OCI_DEFAULT,
            )
        };
        self.resolve(status, "OCIVectorToArray", "unload")
    }

    fn resolve(
        &self,
        status: i32,
        function: &'static str,
        location: &'static str,
    ) -> Result<(), Error> {
        self.conn.resolve_for(
            status.into_oci_result(function),
            SourceKind::Vector,
            "vector",
            location,
        )
    }
}

fn not_available(conn: &Connection<'_>) -> Error {
    let error = Error::NotAvailable {
        feature: Feature::Vectors,
    };
    conn.environment()
        .raise(&error, SourceKind::Vector, "vector", None, "vector");
    error
}

impl Drop for Vector<'_, '_> {
    fn drop(&mut self) {
        if self.allocated {
            let env = self.conn.environment();
            unsafe {
                env.counters().free_descriptor(
                    env.oci(),
                    self.handle as *mut c_void,
                    OCI_DTYPE_VECTOR,
                );
            }
        }
    }
}
