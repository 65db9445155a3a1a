//! Scroll position publishing and scroll-bound progress.
//!
//! A page owns one [`bus::ScrollBus`]; consumers subscribe explicitly and derive progress
//! through a [`region::ScrollRegion`].

/// Scroll publisher and scoped listeners.
pub mod bus;
/// Scroll-bound container geometry.
pub mod region;
/// Raw and smoothed progress.
pub mod source;
/// Eased document scrolling driven by wheel/touch input.
pub mod wheel;
