use crate::foundation::error::{ReelError, ReelResult};

/// Scroll-bound container measured in document pixels.
///
/// Progress runs from "container top reaches viewport top" to "container bottom reaches
/// viewport bottom", i.e. over `height - viewport_height` pixels of scrolling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRegion {
    top: f64,
    height_multiple: f64,
    viewport_height: f64,
}

impl ScrollRegion {
    /// Region whose container is `height_multiple` viewports tall, starting `top` pixels into
    /// the document.
    pub fn new(top: f64, height_multiple: f64, viewport_height: f64) -> ReelResult<Self> {
        if !top.is_finite() || top < 0.0 {
            return Err(ReelError::config("scroll region top must be finite and >= 0"));
        }
        if !height_multiple.is_finite() || height_multiple < 1.0 {
            return Err(ReelError::config(
                "scroll region height multiple must be finite and >= 1",
            ));
        }
        if !viewport_height.is_finite() || viewport_height <= 0.0 {
            return Err(ReelError::config("viewport height must be finite and > 0"));
        }
        Ok(Self {
            top,
            height_multiple,
            viewport_height,
        })
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Container height in pixels.
    pub fn height(&self) -> f64 {
        self.height_multiple * self.viewport_height
    }

    pub fn start_offset(&self) -> f64 {
        self.top
    }

    pub fn end_offset(&self) -> f64 {
        self.top + self.height() - self.viewport_height
    }

    /// Largest scroll offset of a page made of this region alone.
    pub fn document_limit(&self) -> f64 {
        self.end_offset()
    }

    /// Linear progress of `offset` through the region, clamped to `[0, 1]`.
    pub fn raw_progress(&self, offset: f64) -> f64 {
        let start = self.start_offset();
        let end = self.end_offset();
        if !offset.is_finite() {
            return 0.0;
        }
        if end <= start {
            return if offset >= start { 1.0 } else { 0.0 };
        }
        ((offset - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// Copy of this region with bounds recomputed for a new viewport height.
    pub fn resized(mut self, viewport_height: f64) -> Self {
        self.set_viewport_height(viewport_height);
        self
    }

    /// Recompute bounds in place. Invalid readings keep the previous bounds.
    pub fn set_viewport_height(&mut self, viewport_height: f64) -> bool {
        if !viewport_height.is_finite() || viewport_height <= 0.0 {
            return false;
        }
        if viewport_height == self.viewport_height {
            return false;
        }
        self.viewport_height = viewport_height;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/region.rs"]
mod tests;
