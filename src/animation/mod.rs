//! Easing curves and the damped spring used to smooth scroll progress.

/// Easing curves.
pub mod ease;
/// Mass/damping/stiffness spring.
pub mod spring;
