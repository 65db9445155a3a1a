use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Sub-interval of global scroll progress over which one sequence is active.
///
/// Serialized as a two-element array `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct PlaybackRange {
    pub start: f64,
    pub end: f64,
}

impl PlaybackRange {
    pub const FULL: Self = Self {
        start: 0.0,
        end: 1.0,
    };

    pub fn new(start: f64, end: f64) -> ReelResult<Self> {
        let r = Self { start, end };
        r.validate()?;
        Ok(r)
    }

    pub fn validate(self) -> ReelResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ReelError::config("playback range bounds must be finite"));
        }
        if self.start < 0.0 || self.end > 1.0 {
            return Err(ReelError::config(
                "playback range must lie within [0, 1]",
            ));
        }
        if self.start >= self.end {
            return Err(ReelError::config("playback range start must be < end"));
        }
        Ok(())
    }

    pub fn len(self) -> f64 {
        self.end - self.start
    }

    pub fn contains(self, p: f64) -> bool {
        self.start <= p && p <= self.end
    }

    /// Distance from `p` to the closest point of the range (0 when inside).
    pub fn distance_to(self, p: f64) -> f64 {
        if p < self.start {
            self.start - p
        } else if p > self.end {
            p - self.end
        } else {
            0.0
        }
    }

    /// Rescale global progress into this range's own `[0, 1]`.
    pub fn local(self, p: f64) -> f64 {
        ((p - self.start) / self.len()).clamp(0.0, 1.0)
    }
}

impl Default for PlaybackRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<[f64; 2]> for PlaybackRange {
    fn from(v: [f64; 2]) -> Self {
        Self {
            start: v[0],
            end: v[1],
        }
    }
}

impl From<PlaybackRange> for [f64; 2] {
    fn from(r: PlaybackRange) -> Self {
        [r.start, r.end]
    }
}

/// Display refresh rate driving the render loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::config("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::config("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
