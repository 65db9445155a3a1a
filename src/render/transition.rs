use crate::{
    animation::ease::Ease,
    foundation::error::{ReelError, ReelResult},
    foundation::math::lerp,
};

/// Segment-exit "zoom-through" effect.
///
/// Below `threshold` (in segment-local progress) the frame is drawn at rest. Above it, the
/// scale and opacity move toward their exit values along an accelerating ease, so the outgoing
/// frame rushes past the viewer as the next segment takes over. Output depends only on local
/// progress, so scrolling backward replays the effect in reverse.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoomThrough {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_exit_scale")]
    pub exit_scale: f64,
    #[serde(default)]
    pub exit_opacity: f64,
    #[serde(default = "default_ease")]
    pub ease: Ease,
}

fn default_threshold() -> f64 {
    0.75
}

fn default_exit_scale() -> f64 {
    3.0
}

fn default_ease() -> Ease {
    Ease::InQuart
}

impl Default for ZoomThrough {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            exit_scale: default_exit_scale(),
            exit_opacity: 0.0,
            ease: default_ease(),
        }
    }
}

/// Per-tick transform parameters applied on top of the cover fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionParams {
    pub scale: f64,
    pub opacity: f64,
}

impl TransitionParams {
    pub const REST: Self = Self {
        scale: 1.0,
        opacity: 1.0,
    };
}

impl Default for TransitionParams {
    fn default() -> Self {
        Self::REST
    }
}

impl ZoomThrough {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.threshold.is_finite() || !(0.0..1.0).contains(&self.threshold) {
            return Err(ReelError::config("transition threshold must be within [0, 1)"));
        }
        if !self.exit_scale.is_finite() || self.exit_scale <= 0.0 {
            return Err(ReelError::config("transition exit_scale must be finite and > 0"));
        }
        if !self.exit_opacity.is_finite() || !(0.0..=1.0).contains(&self.exit_opacity) {
            return Err(ReelError::config("transition exit_opacity must be within [0, 1]"));
        }
        Ok(())
    }

    pub fn params(&self, local_progress: f64) -> TransitionParams {
        let p = local_progress.clamp(0.0, 1.0);
        if p <= self.threshold {
            return TransitionParams::REST;
        }
        let t = self.ease.apply((p - self.threshold) / (1.0 - self.threshold));
        TransitionParams {
            scale: lerp(1.0, self.exit_scale, t),
            opacity: lerp(1.0, self.exit_opacity, t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/transition.rs"]
mod tests;
