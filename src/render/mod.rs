//! Frame composition and the continuous render loop.
//!
//! [`compositor::Compositor`] owns the per-tick [`compositor::RenderState`]; the
//! [`render_loop::RenderLoop`] ticks it on a tokio interval.

/// Scroll-driven composition onto a surface.
pub mod compositor;
/// Cover-fit placement.
pub mod fit;
/// Continuous tick driver.
pub mod render_loop;
/// Output surfaces.
pub mod surface;
/// Segment-exit zoom-through.
pub mod transition;
