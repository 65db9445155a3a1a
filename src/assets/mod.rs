//! Frame bytes: where they come from, how they are decoded and where decoded frames live.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// Frame byte sources (filesystem, HTTP).
pub mod source;
/// Per-sequence frame slot store.
pub mod store;
