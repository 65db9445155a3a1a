//! Progressive, batch-ordered frame loading.

/// Batch planning.
pub mod batch;
/// Async loader and its callbacks.
pub mod progressive;
