//! Provides basic abstraction over valid (i.e. allocated) OCI handles and descriptors.
//!
//! Two decisions are already baked into this module:
//!
//! * Treat warnings by logging them with `log`.
//! * Vendor resources are owned by a [`holder::HolderArena`], so disposing a parent disposes
//!   every dependent resource, in reverse acquisition order.

mod diagnostics;
pub mod holder;
mod oci_result;

pub use self::{
    diagnostics::{log_diagnostics, Record},
    holder::{AllocState, HolderArena, HolderId},
    oci_result::{ExtSword, OciResult},
};

use std::ffi::c_void;

use log::debug;

use crate::oci::{constants::OCI_SUCCESS, functions::OciEntryPoints, types::Ub4};

/// Helper function freeing a handle. Failure to free is logged rather than escalated; it happens
/// during unwinding and the original error matters more.
///
/// # Safety
///
/// `handle` must be a valid OCI handle and `handle_type` must match its type.
pub unsafe fn free_handle(oci: &OciEntryPoints, handle: *mut c_void, handle_type: Ub4) {
    let status = unsafe { (oci.handle_free)(handle, handle_type) };
    if status == OCI_SUCCESS {
        debug!("OCIHandleFree dropped {handle:?} of type {handle_type}.");
    } else {
        log::error!("OCIHandleFree failed with status {status} for handle type {handle_type}.");
    }
}

/// Helper function freeing a descriptor, logging failures.
///
/// # Safety
///
/// `descriptor` must be a valid OCI descriptor and `descriptor_type` must match its type.
pub unsafe fn free_descriptor(oci: &OciEntryPoints, descriptor: *mut c_void, descriptor_type: Ub4) {
    let status = unsafe { (oci.descriptor_free)(descriptor, descriptor_type) };
    if status == OCI_SUCCESS {
        debug!("OCIDescriptorFree dropped {descriptor:?} of type {descriptor_type}.");
    } else {
        log::error!(
            "OCIDescriptorFree failed with status {status} for descriptor type {descriptor_type}."
        );
    }
}
