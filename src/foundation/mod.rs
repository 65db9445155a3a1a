//! Shared value types, error taxonomy and small numeric helpers.

/// Core value types (ranges, rates, colors) and geometry re-exports.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
pub(crate) mod math;
