use crate::foundation::error::{ReelError, ReelResult};

/// Largest integration sub-step. Stiff presets have a fast pole near 200/s, so explicit
/// integration needs steps well below 10 ms to stay stable.
const MAX_SUBSTEP_SECS: f64 = 0.001;
/// Upper bound for a single `step` (a stalled loop must not launch the value).
const MAX_STEP_SECS: f64 = 0.1;

/// Mass/damping/stiffness parameters of a damped spring.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpringConfig {
    pub mass: f64,
    pub damping: f64,
    pub stiffness: f64,
    /// Distance to target below which the spring may come to rest.
    pub rest_delta: f64,
    /// Speed below which the spring may come to rest.
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f64,
}

fn default_rest_speed() -> f64 {
    0.01
}

impl SpringConfig {
    /// Responsive tuning used for the hero sequence.
    pub fn hero() -> Self {
        Self {
            mass: 0.1,
            damping: 20.0,
            stiffness: 100.0,
            rest_delta: 0.001,
            rest_speed: default_rest_speed(),
        }
    }

    /// Heavier, slower tuning used for the outro sequence.
    pub fn outro() -> Self {
        Self {
            mass: 0.5,
            damping: 20.0,
            stiffness: 45.0,
            rest_delta: 0.0001,
            rest_speed: default_rest_speed(),
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        for (name, v) in [
            ("mass", self.mass),
            ("damping", self.damping),
            ("stiffness", self.stiffness),
            ("rest_delta", self.rest_delta),
            ("rest_speed", self.rest_speed),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::config(format!(
                    "spring {name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::hero()
    }
}

/// Damped spring following a moving target.
///
/// Once within `rest_delta` of the target and slower than `rest_speed` the spring snaps onto
/// the target, so a held input converges exactly instead of leaving a residual offset.
#[derive(Clone, Debug)]
pub struct Spring {
    cfg: SpringConfig,
    position: f64,
    velocity: f64,
    at_rest: bool,
}

impl Spring {
    pub fn new(cfg: SpringConfig, initial: f64) -> Self {
        Self {
            cfg,
            position: initial,
            velocity: 0.0,
            at_rest: true,
        }
    }

    pub fn config(&self) -> SpringConfig {
        self.cfg
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Teleport to `value` with zero velocity.
    pub fn jump(&mut self, value: f64) {
        self.position = value;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Advance by `dt_secs` toward `target`, returning the new position.
    pub fn step(&mut self, target: f64, dt_secs: f64) -> f64 {
        if !target.is_finite() {
            return self.position;
        }
        if self.at_rest && self.position == target {
            return self.position;
        }
        self.at_rest = false;

        let dt = if dt_secs.is_finite() {
            dt_secs.clamp(0.0, MAX_STEP_SECS)
        } else {
            0.0
        };
        let steps = (dt / MAX_SUBSTEP_SECS).ceil().max(1.0) as u32;
        let h = dt / f64::from(steps);

        let SpringConfig {
            mass,
            damping,
            stiffness,
            ..
        } = self.cfg;
        for _ in 0..steps {
            let force = -stiffness * (self.position - target) - damping * self.velocity;
            self.velocity += (force / mass) * h;
            self.position += self.velocity * h;
        }

        if (self.position - target).abs() < self.cfg.rest_delta
            && self.velocity.abs() < self.cfg.rest_speed
        {
            self.position = target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
        self.position
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
