use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Rev;
use std::mem::{self, ManuallyDrop};
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr;
use std::slice;

use crate::alloc::{Global, RawAlloc};
use crate::error::{Error, Result};
use crate::iter::IntoIter;
use crate::raw::{RawStore, handle_reserve};

/// A contiguous, growable sequence with explicit control over its storage.
///
/// The buffer owns a single allocation of `capacity()` slots. Slots
/// `[0, len())` hold live values; the rest are uninitialised and are never
/// read or dropped. Capacity only changes through reallocation, which happens
/// when an append finds the buffer full (capacity doubles), on
/// [`reserve`](Self::reserve), or when [`insert`](Self::insert) runs out of
/// room. Nothing ever shrinks the store: [`erase`](Self::erase) and
/// [`clear`](Self::clear) keep the freed slots reserved until the buffer is
/// dropped or reallocated.
///
/// Every reallocation builds the new store completely before the old one is
/// retired, so a failed allocation leaves the buffer exactly as it was.
///
/// ```
/// use sequence_buffer::SequenceBuffer;
///
/// let mut buf = SequenceBuffer::new();
/// for i in 0..5 {
///     buf.push_back(i);
/// }
/// buf.erase(1);
/// buf.insert(1, 9);
/// assert_eq!(buf, [0, 9, 2, 3, 4]);
/// assert!(buf.at(5).is_err());
/// ```
pub struct SequenceBuffer<T, A: RawAlloc = Global> {
    store: RawStore<T, A>,
    len: usize,
}

impl<T> SequenceBuffer<T> {
    /// An empty buffer with room for one element.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// An empty buffer with room for `max(1, capacity)` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// `len` default values, with room for `max(1, 2 * len)` elements.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut buf = Self::with_capacity(sized_capacity(len));
        for _ in 0..len {
            // SAFETY: capacity is at least twice `len`.
            unsafe { buf.write_next(T::default()) };
        }
        buf
    }

    /// `len` clones of `value`, with room for `max(1, 2 * len)` elements.
    pub fn from_elem(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        let mut buf = Self::with_capacity(sized_capacity(len));
        for _ in 0..len {
            // SAFETY: capacity is at least twice `len`.
            unsafe { buf.write_next(value.clone()) };
        }
        buf
    }
}

impl<T, A: RawAlloc> SequenceBuffer<T, A> {
    /// An empty buffer using `alloc`, with room for one element.
    pub fn new_in(alloc: A) -> Self {
        Self::with_capacity_in(1, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::from_store(RawStore::allocate(capacity.max(1), alloc))
    }

    /// Like [`new_in`](Self::new_in) but reports allocation failure.
    pub fn try_new_in(alloc: A) -> Result<Self> {
        RawStore::try_allocate(1, alloc).map(Self::from_store)
    }

    const fn from_store(store: RawStore<T, A>) -> Self {
        Self { store, len: 0 }
    }

    /// Number of live elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of reserved slots, live or not.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.store.capacity()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when the next append has to reallocate.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == self.store.capacity()
    }

    pub const fn allocator(&self) -> &A {
        self.store.allocator()
    }

    #[inline]
    pub const fn as_ptr(&self) -> *const T {
        self.store.ptr()
    }

    #[inline]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.store.ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialised and the pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Unchecked access.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        unsafe { &*self.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Grows the store to exactly `capacity` slots if it is smaller.
    ///
    /// Unlike `Vec::reserve`, the argument is the total capacity wanted, not
    /// the additional room. `len` is unchanged.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            handle_reserve(self.try_reserve(capacity));
        }
    }

    /// Like [`reserve`](Self::reserve) but reports failure, leaving the
    /// buffer untouched.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        // SAFETY: `[0, len)` is initialised and `len <= capacity`.
        unsafe { self.store.try_relocate(capacity, self.len, None) }
    }

    #[inline]
    pub fn push_back(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }
        // SAFETY: there is a free slot after growing.
        unsafe { self.write_next(value) };
    }

    /// Like [`push_back`](Self::push_back) but reports allocation failure.
    /// On failure `value` is dropped and the buffer is untouched.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        if self.is_full() {
            self.try_grow()?;
        }
        // SAFETY: there is a free slot after growing.
        unsafe { self.write_next(value) };
        Ok(())
    }

    /// Makes room for one more element, then constructs it in place with
    /// `make`.
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.is_full() {
            self.grow();
        }
        let index = self.len;
        // SAFETY: there is a free slot after growing.
        unsafe {
            self.write_next(make());
            &mut *self.as_mut_ptr().add(index)
        }
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is empty.
    pub fn pop_back(&mut self) {
        assert!(!self.is_empty(), "pop_back on an empty SequenceBuffer");
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted.
        unsafe { ptr::drop_in_place(self.as_mut_ptr().add(self.len)) };
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted.
        Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
    }

    /// Inserts `value` at `index`, shifting everything after it one slot to
    /// the right.
    ///
    /// When the buffer is full the elements are moved straight into their
    /// final slots of a store twice the size, so nothing is moved twice.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        if index == len {
            self.push_back(value);
            return;
        }

        if self.is_full() {
            let new_cap = handle_reserve(self.grown_capacity());
            // SAFETY: `[0, len)` is initialised, `index < len` and the new
            // store has room for `len + 1` slots.
            handle_reserve(unsafe { self.store.try_relocate(new_cap, len, Some(index)) });
        } else {
            // SAFETY: `len < capacity`, so `[index + 1, len + 1)` is in
            // bounds; `ptr::copy` handles the overlap.
            unsafe {
                let slot = self.as_mut_ptr().add(index);
                ptr::copy(slot, slot.add(1), len - index);
            }
        }
        // SAFETY: slot `index` is vacant in both paths.
        unsafe { ptr::write(self.as_mut_ptr().add(index), value) };
        self.len = len + 1;
    }

    /// Drops the element at `index`, shifting the tail one slot to the left.
    /// Capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) {
        drop(self.remove(index));
    }

    /// Removes and returns the element at `index`, shifting the tail one
    /// slot to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        // SAFETY: `index < len`; the tail moves into the slot being read out.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let removed = ptr::read(slot);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.len = len - 1;
            removed
        }
    }

    /// Drops the elements in `range` and closes the gap. Capacity is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the range starts after it ends or ends past `len`.
    pub fn erase_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        let len = self.len;
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        };
        assert!(start <= end, "erase range starts at {start} but ends at {end}");
        assert!(end <= len, "erase range end (is {end}) should be <= len (is {len})");
        if start == end {
            return;
        }

        // Until the guard runs only `[0, start)` counts as live, so a
        // panicking destructor cannot cause a double drop.
        self.len = start;
        // SAFETY: `start < end <= len`.
        let first = unsafe { self.as_mut_ptr().add(start) };
        let guard = CloseGap {
            buf: self,
            start,
            end,
            old_len: len,
        };
        if mem::needs_drop::<T>() {
            // SAFETY: `[start, end)` is initialised and no longer counted.
            unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, end - start)) };
        }
        drop(guard);
    }

    /// Drops every element. The store is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements in `[len, self.len())`; no-op if `len` is not
    /// smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        if mem::needs_drop::<T>() {
            // SAFETY: the tail was initialised and is no longer counted.
            unsafe {
                let first = self.as_mut_ptr().add(len);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, tail));
            }
        }
    }

    /// Resizes to `new_len`, appending values produced by `fill` through the
    /// regular append path.
    pub fn resize_with<F>(&mut self, new_len: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        while self.len < new_len {
            self.push_back(fill());
        }
    }

    /// Resizes to `new_len`, appending clones of `fill`.
    pub fn resize(&mut self, new_len: usize, fill: T)
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        while self.len + 1 < new_len {
            self.push_back(fill.clone());
        }
        self.push_back(fill);
    }

    /// Resizes to `new_len`, appending default values.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Back-to-front traversal of the live elements.
    #[inline]
    pub fn iter_rev(&self) -> Rev<slice::Iter<'_, T>> {
        self.iter().rev()
    }

    /// Moves the contents out, leaving `self` empty with no store.
    ///
    /// This is move-assignment's source side: `*dst = src.take()` drops the
    /// old contents of `dst` and adopts those of `src` without touching a
    /// single element. The emptied buffer stays usable; its next append
    /// allocates a one-slot store.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::from_store(RawStore::dangling(self.allocator().clone()));
        mem::replace(self, empty)
    }

    /// Bulk copy for plain-data elements: one `memcpy` of the live range
    /// into a store of the same capacity.
    pub fn duplicate(&self) -> Self
    where
        T: Copy,
        A: Clone,
    {
        let mut copy = Self::from_store(RawStore::allocate(
            self.capacity(),
            self.allocator().clone(),
        ));
        // SAFETY: both stores have `capacity >= len` slots and are distinct.
        unsafe { ptr::copy_nonoverlapping(self.as_ptr(), copy.as_mut_ptr(), self.len) };
        copy.len = self.len;
        copy
    }

    /// Copy assignment for plain-data elements. The replacement store is
    /// filled with [`duplicate`](Self::duplicate) before the old one is
    /// released.
    pub fn assign_from(&mut self, source: &Self)
    where
        T: Copy,
        A: Clone,
    {
        *self = source.duplicate();
    }

    /// Writes `value` into slot `len` and counts it.
    ///
    /// # Safety
    ///
    /// `len < capacity`.
    #[inline]
    unsafe fn write_next(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        // SAFETY: upheld by the caller.
        unsafe { ptr::write(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
    }

    fn grown_capacity(&self) -> Result<usize> {
        self.capacity()
            .checked_mul(2)
            .map(|cap| cap.max(1))
            .ok_or(Error::CapacityOverflow)
    }

    fn try_grow(&mut self) -> Result<()> {
        let new_cap = self.grown_capacity()?;
        // SAFETY: `[0, len)` is initialised and `len < new_cap`.
        unsafe { self.store.try_relocate(new_cap, self.len, None) }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        handle_reserve(self.try_grow());
    }
}

/// `max(1, 2 * len)`, the capacity given to pre-sized buffers.
fn sized_capacity(len: usize) -> usize {
    handle_reserve(len.checked_mul(2).ok_or(Error::CapacityOverflow)).max(1)
}

/// Moves the tail left over an erased range when dropped, even if an element
/// destructor panicked.
struct CloseGap<'a, T, A: RawAlloc> {
    buf: &'a mut SequenceBuffer<T, A>,
    start: usize,
    end: usize,
    old_len: usize,
}

impl<T, A: RawAlloc> Drop for CloseGap<'_, T, A> {
    fn drop(&mut self) {
        let tail = self.old_len - self.end;
        // SAFETY: `[end, old_len)` is initialised and `[start, end)` is dead.
        unsafe {
            let base = self.buf.as_mut_ptr();
            ptr::copy(base.add(self.end), base.add(self.start), tail);
        }
        self.buf.len = self.start + tail;
    }
}

impl<T, A: RawAlloc> Drop for SequenceBuffer<T, A> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            // SAFETY: `[0, len)` is initialised; the store is released by
            // `RawStore`'s own drop afterwards.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.as_mut_ptr(),
                    self.len,
                ))
            }
        }
    }
}

impl<T> Default for SequenceBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for SequenceBuffer<T, A> {
    /// Element-wise copy into a store of the same capacity.
    fn clone(&self) -> Self {
        let mut copy = Self::from_store(RawStore::allocate(
            self.capacity(),
            self.allocator().clone(),
        ));
        for item in self.iter() {
            // SAFETY: the copy has as many slots as `self`.
            unsafe { copy.write_next(item.clone()) };
        }
        copy
    }

    /// The replacement is built completely before the old contents are
    /// dropped, so a panicking `clone` leaves `self` as it was.
    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<T, A: RawAlloc> Deref for SequenceBuffer<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAlloc> DerefMut for SequenceBuffer<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: RawAlloc> AsRef<[T]> for SequenceBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAlloc> AsMut<[T]> for SequenceBuffer<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for SequenceBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, A1, A2> PartialEq<SequenceBuffer<U, A2>> for SequenceBuffer<T, A1>
where
    T: PartialEq<U>,
    A1: RawAlloc,
    A2: RawAlloc,
{
    fn eq(&self, other: &SequenceBuffer<U, A2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAlloc> Eq for SequenceBuffer<T, A> {}

impl<T: PartialEq<U>, U, A: RawAlloc> PartialEq<[U]> for SequenceBuffer<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: RawAlloc> PartialEq<&[U]> for SequenceBuffer<T, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, A: RawAlloc, const N: usize> PartialEq<[U; N]> for SequenceBuffer<T, A> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A: RawAlloc> PartialEq<Vec<U>> for SequenceBuffer<T, A> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Hash, A: RawAlloc> Hash for SequenceBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, const N: usize> From<[T; N]> for SequenceBuffer<T> {
    /// Moves the elements in, with room for `max(1, 2 * N)`.
    fn from(items: [T; N]) -> Self {
        let mut buf = Self::with_capacity(sized_capacity(N));
        for item in items {
            // SAFETY: capacity is at least twice `N`.
            unsafe { buf.write_next(item) };
        }
        buf
    }
}

impl<T: Clone> From<&[T]> for SequenceBuffer<T> {
    /// Clones the elements in, with room for `max(1, 2 * len)`.
    fn from(items: &[T]) -> Self {
        let mut buf = Self::with_capacity(sized_capacity(items.len()));
        for item in items {
            // SAFETY: capacity is at least twice `items.len()`.
            unsafe { buf.write_next(item.clone()) };
        }
        buf
    }
}

impl<T> FromIterator<T> for SequenceBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = Self::new();
        buf.extend(iter);
        buf
    }
}

impl<T, A: RawAlloc> Extend<T> for SequenceBuffer<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a, A: RawAlloc> Extend<&'a T> for SequenceBuffer<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &item in iter {
            self.push_back(item);
        }
    }
}

impl<T, A: RawAlloc> IntoIterator for SequenceBuffer<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the store is moved out exactly
        // once and the iterator takes over the live range.
        let store = unsafe { ptr::read(&this.store) };
        IntoIter::new(store, this.len)
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a SequenceBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut SequenceBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
