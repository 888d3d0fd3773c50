use std::fmt;
use std::iter::FusedIterator;
use std::mem;
use std::ptr;
use std::slice;

use crate::alloc::{Global, RawAlloc};
use crate::raw::RawStore;

/// Owning iterator over the elements of a
/// [`SequenceBuffer`](crate::SequenceBuffer).
///
/// Elements not yet yielded are dropped together with the iterator, and the
/// store is released once.
pub struct IntoIter<T, A: RawAlloc = Global> {
    store: RawStore<T, A>,
    // Live slots are `[head, tail)`.
    head: usize,
    tail: usize,
}

impl<T, A: RawAlloc> IntoIter<T, A> {
    pub(crate) fn new(store: RawStore<T, A>, len: usize) -> Self {
        Self {
            store,
            head: 0,
            tail: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[head, tail)` is initialised.
        unsafe { slice::from_raw_parts(self.store.ptr().add(self.head), self.tail - self.head) }
    }
}

impl<T, A: RawAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let index = self.head;
        self.head += 1;
        // SAFETY: the slot was live and is no longer counted.
        Some(unsafe { ptr::read(self.store.ptr().add(index)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T, A: RawAlloc> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: the slot was live and is no longer counted.
        Some(unsafe { ptr::read(self.store.ptr().add(self.tail)) })
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: RawAlloc> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            // SAFETY: `[head, tail)` is initialised; the store is released
            // by its own drop afterwards.
            unsafe {
                let first = self.store.ptr().add(self.head);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, self.tail - self.head));
            }
        }
    }
}
