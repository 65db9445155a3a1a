//! Progress-to-frame mapping across one or more sequence segments.

/// Segment resolution and frame indexing.
pub mod sequence;
