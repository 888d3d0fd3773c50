//! A from-scratch contiguous growable sequence.
//!
//! [`SequenceBuffer`] keeps its capacity independent of its length and
//! manages element lifetimes by hand: slots past `len()` are raw memory, and
//! every reallocation finishes building the new store before the old one is
//! released. Allocation goes through a single swappable [`RawAlloc`]
//! strategy, [`Global`] by default.
//!
//! ```
//! use sequence_buffer::seqbuf;
//!
//! let mut buf = seqbuf![0, 1, 2, 3, 4];
//! assert_eq!(buf.capacity(), 10);
//! buf.erase_range(1..3);
//! assert_eq!(buf, [0, 3, 4]);
//! assert_eq!(buf.capacity(), 10);
//! ```

mod alloc;
mod buffer;
mod error;
mod iter;
mod raw;

pub use alloc::{Global, RawAlloc};
pub use buffer::SequenceBuffer;
pub use error::{Error, Result};
pub use iter::IntoIter;

/// Builds a [`SequenceBuffer`] from a literal list, like `vec!`.
///
/// - `seqbuf![]` is an empty buffer;
/// - `seqbuf![a, b, c]` moves the values in, capacity `max(1, 2 * len)`;
/// - `seqbuf![value; n]` holds `n` clones of `value`.
#[macro_export]
macro_rules! seqbuf {
    () => {
        $crate::SequenceBuffer::<_>::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::SequenceBuffer::<_>::from_elem($n, &$elem)
    };
    ($($item:expr),+ $(,)?) => {
        $crate::SequenceBuffer::<_>::from([$($item),+])
    };
}

#[cfg(test)]
mod tests;
