use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::{Error, Result};

/// The allocation strategy behind a [`SequenceBuffer`](crate::SequenceBuffer).
///
/// The buffer only ever asks for non-zero-sized array layouts of its element
/// type; zero-sized stores never reach the allocator.
///
/// # Safety
///
/// Memory returned by `allocate` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must stay valid
/// until it is passed to `deallocate` on the same allocator or a clone of it.
pub unsafe trait RawAlloc {
    /// Allocates a block fitting `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator (or a
    /// clone of it) for the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator, through `std::alloc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards to the registered global allocator.
unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: the layout is non-zero-sized.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(Error::AllocationFailure { layout })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: upheld by the caller.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: forwards to `A`, which upholds the contract itself.
unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: upheld by the caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
