//! Connection and session pools.

use std::{ffi::c_void, marker::PhantomData, ptr::null_mut};

use crate::{
    connection::Connection,
    environment::Environment,
    error::{Error, Feature, SourceKind},
    handles::ExtSword,
    oci::{
        constants::{
            OCI_ATTR_SPOOL_STMTCACHESIZE, OCI_DEFAULT, OCI_HTYPE_AUTHINFO, OCI_HTYPE_CPOOL,
            OCI_HTYPE_ERROR, OCI_HTYPE_SPOOL, OCI_SESSGET_CPOOL, OCI_SESSGET_SPOOL,
            OCI_SESSGET_SPOOL_MATCHANY, OCI_SPC_HOMOGENEOUS, OCI_SPC_STMTCACHE,
        },
        types::{OciAuthInfo, OciBool, OciError, OciSvcCtx, OraText, Ub4},
    },
    text::{slice_to_cow_utf8, DbChar, DbText},
};

/// Kind of pool: both hand out connections through [`Pool::get`]; they differ in what is kept
/// alive between uses (physical connections vs authenticated sessions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Connection,
    Session,
}

/// A pool of connections or sessions.
pub struct Pool<'env> {
    env: &'env Environment,
    handle: *mut c_void,
    errhp: *mut OciError,
    kind: PoolKind,
    /// Name the client assigned the pool; sessions are requested with it.
    pool_name: Vec<DbChar>,
    db: String,
    user: String,
    min: u32,
    max: u32,
    increment: u32,
    _not_sync: PhantomData<*mut ()>,
}

impl<'env> Pool<'env> {
    pub(crate) fn create(
        env: &'env Environment,
        kind: PoolKind,
        db: &str,
        user: &str,
        password: &str,
        min: u32,
        max: u32,
        increment: u32,
    ) -> Result<Self, Error> {
        let oci = env.oci();
        let (create_missing, handle_type) = match kind {
            PoolKind::Connection => (oci.connection_pool_create.is_none(), OCI_HTYPE_CPOOL),
            PoolKind::Session => (oci.session_pool_create.is_none(), OCI_HTYPE_SPOOL),
        };
        if create_missing || oci.session_get.is_none() {
            let error = Error::NotAvailable {
                feature: match kind {
                    PoolKind::Connection => Feature::ConnectionPools,
                    PoolKind::Session => Feature::SessionPools,
                },
            };
            env.raise(&error, SourceKind::Pool, db, None, "create_pool");
            return Err(error);
        }

        let handle = env
            .counters()
            .alloc_handle(oci, env.env_ptr() as *const c_void, handle_type)?;
        let errhp = env.counters().alloc_handle(
            oci,
            env.env_ptr() as *const c_void,
            OCI_HTYPE_ERROR,
        )? as *mut OciError;

        let db_text = DbText::new(db);
        let user_text = DbText::new(user);
        let password_text = DbText::new(password);
        let mut name_ptr: *mut OraText = null_mut();
        let mut name_len_b: i32 = 0;
        let mut name_len_u: Ub4 = 0;

        let status = match kind {
            PoolKind::Connection => unsafe {
                (oci.connection_pool_create.unwrap())(
                    env.env_ptr(),
                    errhp,
                    handle as *mut _,
                    &mut name_ptr,
                    &mut name_len_b,
                    db_text.ptr(),
                    db_text.len_bytes() as i32,
                    min,
                    max,
                    increment,
                    user_text.ptr(),
                    user_text.len_bytes() as i32,
                    password_text.ptr(),
                    password_text.len_bytes() as i32,
                    OCI_DEFAULT,
                )
            },
            PoolKind::Session => unsafe {
                (oci.session_pool_create.unwrap())(
                    env.env_ptr(),
                    errhp,
                    handle as *mut _,
                    &mut name_ptr,
                    &mut name_len_u,
                    db_text.ptr(),
                    db_text.len_bytes() as Ub4,
                    min,
                    max,
                    increment,
                    user_text.ptr() as *mut OraText,
                    user_text.len_bytes() as Ub4,
                    password_text.ptr() as *mut OraText,
                    password_text.len_bytes() as Ub4,
                    OCI_SPC_HOMOGENEOUS | OCI_SPC_STMTCACHE,
                )
            },
        };
        let pool = Pool {
            env,
            handle,
            errhp,
            kind,
            pool_name: Vec::new(),
            db: db.to_string(),
            user: user.to_string(),
            min,
            max,
            increment,
            _not_sync: PhantomData,
        };
        let function = match kind {
            PoolKind::Connection => "OCIConnectionPoolCreate",
            PoolKind::Session => "OCISessionPoolCreate",
        };
        pool.resolve(status.into_oci_result(function), "create_pool")?;

        // The client owns the name buffer; copy it while it is valid.
        let name_bytes = match kind {
            PoolKind::Connection => name_len_b as usize,
            PoolKind::Session => name_len_u as usize,
        };
        let name_units = name_bytes / std::mem::size_of::<DbChar>();
        let mut pool = pool;
        pool.pool_name = unsafe {
            std::slice::from_raw_parts(name_ptr as *const DbChar, name_units).to_vec()
        };
        Ok(pool)
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn name(&self) -> String {
        slice_to_cow_utf8(&self.pool_name).into_owned()
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Sets the statement cache size of the pooled sessions.
    pub fn set_statement_cache_size(&self, size: u32) -> Result<(), Error> {
        let mut value = size;
        let status = unsafe {
            (self.env.oci().attr_set)(
                self.handle,
                match self.kind {
                    PoolKind::Connection => OCI_HTYPE_CPOOL,
                    PoolKind::Session => OCI_HTYPE_SPOOL,
                },
                &mut value as *mut u32 as *mut c_void,
                std::mem::size_of::<u32>() as u32,
                OCI_ATTR_SPOOL_STMTCACHESIZE,
                self.errhp,
            )
        };
        self.resolve(status.into_oci_result("OCIAttrSet(statement cache)"), "set_cache_size")
    }

    /// Borrows a connection from the pool. Closing the returned connection gives the session
    /// back instead of tearing it down.
    pub fn get(&self) -> Result<Connection<'env>, Error> {
        self.get_tagged(None).map(|(conn, _)| conn)
    }

    /// Borrows a connection, preferring a session previously released under `tag`. Returns the
    /// connection and whether a tagged session was found.
    pub fn get_tagged(&self, tag: Option<&str>) -> Result<(Connection<'env>, bool), Error> {
        let oci = self.env.oci();
        let session_get = oci.session_get.unwrap();

        let authhp = self.env.counters().alloc_handle(
            oci,
            self.env.env_ptr() as *const c_void,
            OCI_HTYPE_AUTHINFO,
        )? as *mut OciAuthInfo;

        let mode = match self.kind {
            PoolKind::Connection => OCI_SESSGET_CPOOL,
            PoolKind::Session => OCI_SESSGET_SPOOL | OCI_SESSGET_SPOOL_MATCHANY,
        };
        let tag_text = DbText::new(tag.unwrap_or(""));
        let mut svchp: *mut OciSvcCtx = null_mut();
        let mut ret_tag: *mut OraText = null_mut();
        let mut ret_tag_len: Ub4 = 0;
        let mut found: OciBool = 0;
        let status = unsafe {
            session_get(
                self.env.env_ptr(),
                self.errhp,
                &mut svchp,
                authhp,
                self.pool_name.as_ptr() as *mut OraText,
                crate::text::binary_length(&self.pool_name) as Ub4,
                if tag.is_some() { tag_text.ptr() } else { std::ptr::null() },
                tag_text.len_bytes() as Ub4,
                &mut ret_tag,
                &mut ret_tag_len,
                &mut found,
                mode,
            )
        };
        let outcome = self.resolve(status.into_oci_result("OCISessionGet"), "session_get");
        unsafe {
            self.env
                .counters()
                .free_handle(oci, authhp as *mut c_void, OCI_HTYPE_AUTHINFO);
        }
        outcome?;

        let connection = Connection::from_pooled_session(
            self.env,
            svchp,
            &self.db,
            &self.user,
            tag.map(str::to_string),
        )?;
        Ok((connection, found != 0))
    }

    /// Destroys the pool. Outstanding sessions must have been released.
    pub fn destroy(mut self) -> Result<(), Error> {
        self.destroy_internal()
    }

    fn destroy_internal(&mut self) -> Result<(), Error> {
        if self.handle.is_null() {
            return Ok(());
        }
        let oci = self.env.oci();
        let status = match self.kind {
            PoolKind::Connection => unsafe {
                (oci.connection_pool_destroy.unwrap())(self.handle as *mut _, self.errhp, OCI_DEFAULT)
            },
            PoolKind::Session => unsafe {
                (oci.session_pool_destroy.unwrap())(self.handle as *mut _, self.errhp, OCI_DEFAULT)
            },
        };
        let function = match self.kind {
            PoolKind::Connection => "OCIConnectionPoolDestroy",
            PoolKind::Session => "OCISessionPoolDestroy",
        };
        let outcome = self.resolve(status.into_oci_result(function), "destroy_pool");
        unsafe {
            self.env.counters().free_handle(
                oci,
                self.handle,
                match self.kind {
                    PoolKind::Connection => OCI_HTYPE_CPOOL,
                    PoolKind::Session => OCI_HTYPE_SPOOL,
                },
            );
            self.env
                .counters()
                .free_handle(oci, self.errhp as *mut c_void, OCI_HTYPE_ERROR);
        }
        self.handle = null_mut();
        self.errhp = null_mut();
        outcome
    }

    fn resolve<T>(
        &self,
        result: crate::handles::OciResult<T>,
        location: &'static str,
    ) -> Result<T, Error> {
        match result.into_result(self.env.oci(), self.errhp) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.env
                    .raise(&error, SourceKind::Pool, &self.db, None, location);
                Err(error)
            }
        }
    }
}

impl Drop for Pool<'_> {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            if let Err(error) = self.destroy_internal() {
                log::error!("Error during implicit pool destruction: {error}");
            }
        }
    }
}
