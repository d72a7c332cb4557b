//! Counted allocation of vendor handles and descriptors.
//!
//! Every handle and descriptor the driver obtains from the client passes through here, so the
//! environment can tell at cleanup whether anything is still alive. The counters share one mutex;
//! they are touched on allocation paths only, never per row.

use std::{
    ffi::c_void,
    ptr::null_mut,
    sync::Mutex,
};

use crate::{
    error::Error,
    oci::{constants::OCI_SUCCESS, functions::OciEntryPoints, types::Ub4},
};

/// Live resource counts, reported at cleanup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub handles: usize,
    pub descriptors: usize,
    pub objects: usize,
    /// Bytes of auxiliary memory the driver allocated on behalf of the application (bind and
    /// define buffers under internal allocation mode).
    pub buffer_bytes: u64,
}

#[derive(Debug, Default)]
pub struct ResourceCounters {
    usage: Mutex<ResourceUsage>,
}

impl ResourceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usage(&self) -> ResourceUsage {
        *self.usage.lock().unwrap()
    }

    /// Allocates a handle of `handle_type` under `parent` and counts it.
    pub fn alloc_handle(
        &self,
        oci: &OciEntryPoints,
        parent: *const c_void,
        handle_type: Ub4,
    ) -> Result<*mut c_void, Error> {
        let mut handle = null_mut();
        let status =
            unsafe { (oci.handle_alloc)(parent, &mut handle, handle_type, 0, null_mut()) };
        // Handle allocation failures carry no diagnostics; there is no error handle to ask.
        if status != OCI_SUCCESS {
            return Err(Error::Oracle {
                code: 0,
                message: format!("cannot allocate handle of type {handle_type}"),
                function: "OCIHandleAlloc",
            });
        }
        self.usage.lock().unwrap().handles += 1;
        Ok(handle)
    }

    /// Frees a handle previously obtained through [`Self::alloc_handle`].
    ///
    /// # Safety
    ///
    /// `handle` must be a valid handle of `handle_type` and not be used afterwards.
    pub unsafe fn free_handle(&self, oci: &OciEntryPoints, handle: *mut c_void, handle_type: Ub4) {
        unsafe { crate::handles::free_handle(oci, handle, handle_type) };
        let mut usage = self.usage.lock().unwrap();
        usage.handles = usage.handles.saturating_sub(1);
    }

    /// Allocates a descriptor of `descriptor_type` under the environment handle and counts it.
    pub fn alloc_descriptor(
        &self,
        oci: &OciEntryPoints,
        environment: *const c_void,
        descriptor_type: Ub4,
    ) -> Result<*mut c_void, Error> {
        let mut descriptor = null_mut();
        let status = unsafe {
            (oci.descriptor_alloc)(environment, &mut descriptor, descriptor_type, 0, null_mut())
        };
        if status != OCI_SUCCESS {
            return Err(Error::Oracle {
                code: 0,
                message: format!("cannot allocate descriptor of type {descriptor_type}"),
                function: "OCIDescriptorAlloc",
            });
        }
        self.usage.lock().unwrap().descriptors += 1;
        Ok(descriptor)
    }

    /// Frees a descriptor previously obtained through [`Self::alloc_descriptor`].
    ///
    /// # Safety
    ///
    /// `descriptor` must be a valid descriptor of `descriptor_type` and not be used afterwards.
    pub unsafe fn free_descriptor(
        &self,
        oci: &OciEntryPoints,
        descriptor: *mut c_void,
        descriptor_type: Ub4,
    ) {
        unsafe { crate::handles::free_descriptor(oci, descriptor, descriptor_type) };
        let mut usage = self.usage.lock().unwrap();
        usage.descriptors = usage.descriptors.saturating_sub(1);
    }

    /// Allocates `count` descriptors of `descriptor_type` in one client call (11.1 and later),
    /// falling back to element-wise allocation on older clients. All elements are freed together
    /// through [`Self::free_descriptor_array`].
    pub fn alloc_descriptor_array(
        &self,
        oci: &OciEntryPoints,
        environment: *const c_void,
        descriptor_type: Ub4,
        count: u32,
    ) -> Result<Vec<*mut c_void>, Error> {
        let Some(alloc) = oci.array_descriptor_alloc else {
            let mut descriptors = Vec::with_capacity(count as usize);
            for _ in 0..count {
                descriptors.push(self.alloc_descriptor(oci, environment, descriptor_type)?);
            }
            return Ok(descriptors);
        };
        let mut descriptors: Vec<*mut c_void> = vec![null_mut(); count as usize];
        let status = unsafe {
            alloc(
                environment,
                descriptors.as_mut_ptr(),
                descriptor_type,
                count,
                0,
                null_mut(),
            )
        };
        if status != OCI_SUCCESS {
            return Err(Error::Oracle {
                code: 0,
                message: format!("cannot allocate descriptor array of type {descriptor_type}"),
                function: "OCIArrayDescriptorAlloc",
            });
        }
        self.usage.lock().unwrap().descriptors += count as usize;
        Ok(descriptors)
    }

    /// Frees a descriptor array allocated through [`Self::alloc_descriptor_array`].
    ///
    /// # Safety
    ///
    /// `descriptors` must originate from `alloc_descriptor_array` with the same type.
    pub unsafe fn free_descriptor_array(
        &self,
        oci: &OciEntryPoints,
        descriptors: &mut [*mut c_void],
        descriptor_type: Ub4,
    ) {
        if descriptors.is_empty() {
            return;
        }
        if let Some(free) = oci.array_descriptor_free {
            unsafe { free(descriptors.as_mut_ptr(), descriptor_type) };
        } else {
            for &mut descriptor in descriptors.iter_mut() {
                unsafe { (oci.descriptor_free)(descriptor, descriptor_type) };
            }
        }
        let mut usage = self.usage.lock().unwrap();
        usage.descriptors = usage.descriptors.saturating_sub(descriptors.len());
    }

    /// Drops a handle from the books without freeing it, for disposal paths which run the
    /// vendor free themselves (e.g. statement release into the cache).
    pub fn forget_handle(&self) {
        let mut usage = self.usage.lock().unwrap();
        usage.handles = usage.handles.saturating_sub(1);
    }

    /// Counterpart of [`Self::forget_handle`] for descriptors disposed out of band.
    pub fn forget_descriptors(&self, count: usize) {
        let mut usage = self.usage.lock().unwrap();
        usage.descriptors = usage.descriptors.saturating_sub(count);
    }

    /// Counts an object instance created through `OCIObjectNew`.
    pub fn count_object(&self) {
        self.usage.lock().unwrap().objects += 1;
    }

    /// Uncounts an object instance freed through `OCIObjectFree`.
    pub fn uncount_object(&self) {
        let mut usage = self.usage.lock().unwrap();
        usage.objects = usage.objects.saturating_sub(1);
    }

    /// Records `bytes` of driver allocated buffer memory.
    pub fn count_buffer_bytes(&self, bytes: u64) {
        self.usage.lock().unwrap().buffer_bytes += bytes;
    }

    /// Releases `bytes` of driver allocated buffer memory.
    pub fn uncount_buffer_bytes(&self, bytes: u64) {
        let mut usage = self.usage.lock().unwrap();
        usage.buffer_bytes = usage.buffer_bytes.saturating_sub(bytes);
    }

    /// Leak report for cleanup: the first class of resource still alive, if any.
    pub fn leak_check(&self) -> Result<(), Error> {
        use crate::error::LeakedResource;
        let usage = self.usage();
        if usage.handles > 0 {
            return Err(Error::UnfreedData {
                resource: LeakedResource::Handles,
                count: usage.handles,
            });
        }
        if usage.descriptors > 0 {
            return Err(Error::UnfreedData {
                resource: LeakedResource::Descriptors,
                count: usage.descriptors,
            });
        }
        if usage.objects > 0 {
            return Err(Error::UnfreedData {
                resource: LeakedResource::Objects,
                count: usage.objects,
            });
        }
        if usage.buffer_bytes > 0 {
            return Err(Error::UnfreedBytes(usage.buffer_bytes));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceCounters;
    use crate::error::Error;

    #[test]
    fn buffer_bytes_balance_out() {
        let counters = ResourceCounters::new();
        counters.count_buffer_bytes(1024);
        counters.count_buffer_bytes(512);
        assert!(matches!(
            counters.leak_check(),
            Err(Error::UnfreedBytes(1536))
        ));
        counters.uncount_buffer_bytes(1536);
        assert!(counters.leak_check().is_ok());
    }

    #[test]
    fn object_counts_do_not_underflow() {
        let counters = ResourceCounters::new();
        counters.uncount_object();
        assert!(counters.leak_check().is_ok());
        counters.count_object();
        assert!(counters.leak_check().is_err());
    }
}
