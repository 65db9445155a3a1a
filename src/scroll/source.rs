use crate::animation::spring::{Spring, SpringConfig};
use crate::foundation::math::clamp01;
use crate::scroll::bus::ScrollListener;
use crate::scroll::region::ScrollRegion;

/// Raw and spring-smoothed scroll progress through one [`ScrollRegion`].
///
/// Holds a [`ScrollListener`] for as long as it lives.
#[derive(Debug)]
pub struct ScrollProgressSource {
    listener: ScrollListener,
    region: ScrollRegion,
    spring: Spring,
    raw: f64,
}

impl ScrollProgressSource {
    /// Starts at rest on the current raw progress, so a page opened mid-scroll does not sweep
    /// in from zero.
    pub fn new(
        mut listener: ScrollListener,
        mut region: ScrollRegion,
        smoothing: SpringConfig,
    ) -> Self {
        let (sample, _) = listener.latest();
        region.set_viewport_height(sample.viewport_height);
        let raw = region.raw_progress(sample.offset);
        Self {
            listener,
            region,
            spring: Spring::new(smoothing, raw),
            raw,
        }
    }

    pub fn region(&self) -> ScrollRegion {
        self.region
    }

    pub fn raw_progress(&self) -> f64 {
        self.raw
    }

    pub fn smoothed_progress(&self) -> f64 {
        clamp01(self.spring.position())
    }

    /// True once the smoothed value has come to rest on the raw value.
    pub fn is_settled(&self) -> bool {
        self.spring.is_at_rest() && self.spring.position() == self.raw
    }

    /// Pull the latest scroll sample and advance smoothing by `dt_secs`.
    pub fn tick(&mut self, dt_secs: f64) -> f64 {
        let (sample, changed) = self.listener.latest();
        if changed {
            if self.region.set_viewport_height(sample.viewport_height) {
                tracing::debug!(
                    viewport_height = sample.viewport_height,
                    "scroll region bounds recomputed"
                );
            }
            self.raw = self.region.raw_progress(sample.offset);
        }
        self.spring.step(self.raw, dt_secs);
        self.smoothed_progress()
    }

    /// Skip smoothing and sit on the current raw value.
    pub fn jump_to_raw(&mut self) {
        let (sample, _) = self.listener.latest();
        self.region.set_viewport_height(sample.viewport_height);
        self.raw = self.region.raw_progress(sample.offset);
        self.spring.jump(self.raw);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/source.rs"]
mod tests;
