use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use tracing::trace;

use crate::alloc::RawAlloc;
use crate::error::{Error, Result};

/// Single-owner backing store of `cap` slots of `T`.
///
/// `RawStore` allocates and releases memory and moves slots bitwise during
/// relocation; it never constructs or drops a `T`. Which slots are live is
/// tracked by the owner.
pub(crate) struct RawStore<T, A: RawAlloc> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: the store exclusively owns its allocation, like a `Box<[T]>`.
unsafe impl<T: Send, A: RawAlloc + Send> Send for RawStore<T, A> {}
// SAFETY: shared access only hands out shared pointers to the slots.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for RawStore<T, A> {}

impl<T, A: RawAlloc> RawStore<T, A> {
    /// A store with no slots and no allocation.
    pub(crate) const fn dangling(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    pub(crate) fn try_allocate(cap: usize, alloc: A) -> Result<Self> {
        let ptr = Self::allocate_slots(&alloc, cap)?;
        Ok(Self {
            ptr,
            cap,
            alloc,
            _marker: PhantomData,
        })
    }

    pub(crate) fn allocate(cap: usize, alloc: A) -> Self {
        handle_reserve(Self::try_allocate(cap, alloc))
    }

    #[inline]
    pub(crate) const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Moves the first `len` slots into a fresh allocation of `new_cap`
    /// slots, then releases the old one.
    ///
    /// With `gap = Some(at)`, slot `at` of the new store is left vacant and
    /// slots `[at, len)` land one position to the right.
    ///
    /// The old store is untouched if allocating the new one fails.
    ///
    /// # Safety
    ///
    /// Slots `[0, len)` must be initialised, `gap` must be `<= len`, and the
    /// new store must have room: `len + gap.is_some() as usize <= new_cap`.
    pub(crate) unsafe fn try_relocate(
        &mut self,
        new_cap: usize,
        len: usize,
        gap: Option<usize>,
    ) -> Result<()> {
        debug_assert!(len + usize::from(gap.is_some()) <= new_cap);
        let fresh = Self::allocate_slots(&self.alloc, new_cap)?;

        let src = self.ptr.as_ptr();
        let dst = fresh.as_ptr();
        // SAFETY: both regions are valid for `len` slots (plus the gap in
        // `dst`) and belong to different allocations.
        unsafe {
            match gap {
                None => ptr::copy_nonoverlapping(src, dst, len),
                Some(at) => {
                    debug_assert!(at <= len);
                    ptr::copy_nonoverlapping(src, dst, at);
                    ptr::copy_nonoverlapping(src.add(at), dst.add(at + 1), len - at);
                }
            }
            self.release();
        }

        trace!(
            old_capacity = self.cap,
            new_capacity = new_cap,
            len,
            "relocated backing store"
        );
        self.ptr = fresh;
        self.cap = new_cap;
        Ok(())
    }

    fn layout(cap: usize) -> Result<Layout> {
        // `Layout::array` rejects sizes above `isize::MAX`.
        Layout::array::<T>(cap).map_err(|_| Error::CapacityOverflow)
    }

    fn allocate_slots(alloc: &A, cap: usize) -> Result<NonNull<T>> {
        let layout = Self::layout(cap)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        Ok(alloc.allocate(layout)?.cast())
    }

    /// Hands the allocation back to the allocator.
    ///
    /// # Safety
    ///
    /// The store must not be used again until `ptr` and `cap` are replaced.
    unsafe fn release(&mut self) {
        if self.cap == 0 || mem::size_of::<T>() == 0 {
            return;
        }
        // SAFETY: the layout was valid when the store was allocated.
        let layout = unsafe { Layout::array::<T>(self.cap).unwrap_unchecked() };
        // SAFETY: `ptr` came from `allocate` with this layout.
        unsafe { self.alloc.deallocate(self.ptr.cast(), layout) }
    }
}

impl<T, A: RawAlloc> Drop for RawStore<T, A> {
    fn drop(&mut self) {
        // SAFETY: the store is going away.
        unsafe { self.release() }
    }
}

/// Unwraps the result of an infallible growth path the way `Vec` does:
/// allocator failure aborts through `handle_alloc_error`, overflow panics.
pub(crate) fn handle_reserve<R>(result: Result<R>) -> R {
    match result {
        Ok(value) => value,
        Err(Error::AllocationFailure { layout }) => alloc::handle_alloc_error(layout),
        Err(err) => panic!("{err}"),
    }
}
