//! JSON-facing configuration for sequences and engines.

/// Sequence and engine configuration.
pub mod sequence;
/// Frame path templates.
pub mod template;
