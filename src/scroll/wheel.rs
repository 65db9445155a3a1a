use crate::animation::ease::Ease;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::lerp;
use crate::scroll::bus::ScrollBus;

/// Tuning of [`SmoothWheel`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothWheelConfig {
    /// Seconds to reach a new target.
    pub duration_secs: f64,
    pub ease: Ease,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
}

impl Default for SmoothWheelConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.5,
            ease: Ease::OutExpo,
            wheel_multiplier: 0.85,
            touch_multiplier: 1.5,
        }
    }
}

impl SmoothWheelConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ReelError::config("wheel duration must be finite and > 0"));
        }
        for (name, v) in [
            ("wheel_multiplier", self.wheel_multiplier),
            ("touch_multiplier", self.touch_multiplier),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::config(format!("{name} must be finite and > 0")));
            }
        }
        Ok(())
    }
}

/// Eased document scrolling.
///
/// Input deltas move a target offset; every tick eases the published offset from where the
/// current animation started toward that target. Vertical only, clamped to `[0, limit]`.
#[derive(Clone, Debug)]
pub struct SmoothWheel {
    cfg: SmoothWheelConfig,
    limit: f64,
    current: f64,
    from: f64,
    target: f64,
    elapsed: f64,
    animating: bool,
}

impl SmoothWheel {
    pub fn new(cfg: SmoothWheelConfig, limit: f64) -> ReelResult<Self> {
        cfg.validate()?;
        if !limit.is_finite() || limit < 0.0 {
            return Err(ReelError::config("scroll limit must be finite and >= 0"));
        }
        Ok(Self {
            cfg,
            limit,
            current: 0.0,
            from: 0.0,
            target: 0.0,
            elapsed: 0.0,
            animating: false,
        })
    }

    pub fn offset(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.push(delta_y * self.cfg.wheel_multiplier);
    }

    pub fn on_touch(&mut self, delta_y: f64) {
        self.push(delta_y * self.cfg.touch_multiplier);
    }

    /// Animate (or jump, when `immediate`) to an absolute offset.
    pub fn scroll_to(&mut self, offset: f64, immediate: bool) {
        if !offset.is_finite() {
            return;
        }
        let offset = offset.clamp(0.0, self.limit);
        if immediate {
            self.current = offset;
            self.target = offset;
            self.animating = false;
            return;
        }
        self.retarget(offset);
    }

    /// New document limit after a layout change. Offsets beyond it are pulled back.
    pub fn set_limit(&mut self, limit: f64) {
        if !limit.is_finite() || limit < 0.0 {
            return;
        }
        self.limit = limit;
        self.target = self.target.min(limit);
        self.from = self.from.min(limit);
        self.current = self.current.min(limit);
    }

    /// Advance by `dt_secs` and publish the resulting offset.
    pub fn tick(&mut self, dt_secs: f64, bus: &ScrollBus) -> f64 {
        if self.animating {
            let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
            self.elapsed += dt;
            let t = (self.elapsed / self.cfg.duration_secs).min(1.0);
            self.current = lerp(self.from, self.target, self.cfg.ease.apply(t));
            if t >= 1.0 {
                self.current = self.target;
                self.animating = false;
            }
        }
        bus.publish_offset(self.current);
        self.current
    }

    fn push(&mut self, delta: f64) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        let target = (self.target + delta).clamp(0.0, self.limit);
        self.retarget(target);
    }

    fn retarget(&mut self, target: f64) {
        self.from = self.current;
        self.target = target;
        self.elapsed = 0.0;
        self.animating = self.from != self.target;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/wheel.rs"]
mod tests;
