pub mod battery;
pub mod cli;
pub mod logging;
pub mod report;
// The container crate, for callers that only depend on the harness.
pub use sequence_buffer;
