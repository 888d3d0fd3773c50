//! Error types for sequence_buffer.

use std::alloc::Layout;
use thiserror::Error;

/// Result type for fallible buffer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the checked and `try_*` operations.
///
/// Contract violations (popping an empty buffer, inserting past the end,
/// inverted erase ranges) are not represented here; they panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Checked access with an index outside `[0, len)`.
    #[error("index {index} is out of range for a buffer of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// The requested capacity does not fit in `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocation strategy could not satisfy the request.
    #[error("allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
    AllocationFailure { layout: Layout },
}
