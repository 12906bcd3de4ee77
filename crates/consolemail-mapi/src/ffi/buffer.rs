//! Ownership of provider-allocated memory.

use std::ptr;

use tracing::warn;

use super::FreeBufferFn;
use crate::error::{MapiError, check};

/// One allocation handed out by the provider.
///
/// The buffer is released through `MAPIFreeBuffer` exactly once: either by an
/// explicit [`MapiBuffer::release`] or on drop. Releasing a null or already
/// released buffer does nothing.
pub struct MapiBuffer<T> {
    ptr: *mut T,
    free: FreeBufferFn,
}

impl<T> MapiBuffer<T> {
    /// Creates an empty buffer to receive an OUT parameter.
    #[must_use]
    pub const fn null(free: FreeBufferFn) -> Self {
        Self {
            ptr: ptr::null_mut(),
            free,
        }
    }

    /// Takes ownership of an existing provider allocation.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live allocation that `free` can release, and
    /// nothing else may release it.
    #[must_use]
    pub const unsafe fn from_raw(ptr: *mut T, free: FreeBufferFn) -> Self {
        Self { ptr, free }
    }

    /// Slot for the provider to write the allocation into.
    pub const fn out_ptr(&mut self) -> *mut *mut T {
        &raw mut self.ptr
    }

    /// Returns the raw pointer without giving up ownership.
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr
    }

    /// Returns true if nothing is owned.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Borrows the allocation.
    ///
    /// # Safety
    ///
    /// A non-null pointer must point to a valid, initialised `T`.
    #[must_use]
    pub const unsafe fn as_ref(&self) -> Option<&T> {
        // SAFETY: upheld by the caller.
        unsafe { self.ptr.as_ref() }
    }

    /// Releases the allocation now.
    ///
    /// # Errors
    ///
    /// Returns the code `MAPIFreeBuffer` reported. The buffer is considered
    /// released either way.
    pub fn release(&mut self) -> Result<(), MapiError> {
        if self.ptr.is_null() {
            return Ok(());
        }
        let ptr = std::mem::replace(&mut self.ptr, ptr::null_mut());
        // SAFETY: `ptr` came from the provider and is released only here.
        check(unsafe { (self.free)(ptr.cast()) })
    }
}

impl<T> Drop for MapiBuffer<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(?e, "MAPIFreeBuffer failed");
        }
    }
}

impl<T> std::fmt::Debug for MapiBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapiBuffer").field("ptr", &self.ptr).finish()
    }
}
