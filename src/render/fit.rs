use crate::foundation::core::{Rect, Size};

/// Placement of a source image that covers a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale from source pixels to viewport pixels.
    pub scale: f64,
    /// Destination rectangle in viewport coordinates; may extend past the viewport on one axis.
    pub rect: Rect,
}

impl CoverFit {
    pub const EMPTY: Self = Self {
        scale: 0.0,
        rect: Rect::ZERO,
    };

    pub fn is_empty(&self) -> bool {
        self.scale <= 0.0
    }
}

/// Scale `source` so it fills `viewport` on both axes, preserving aspect ratio and centring
/// the overflow. Degenerate sizes produce [`CoverFit::EMPTY`].
pub fn cover_fit(source: Size, viewport: Size) -> CoverFit {
    if !is_drawable(source) || !is_drawable(viewport) {
        return CoverFit::EMPTY;
    }

    let src_aspect = source.width / source.height;
    let view_aspect = viewport.width / viewport.height;
    // Wider than the viewport: match height. Otherwise match width.
    let (w, h) = if src_aspect > view_aspect {
        (viewport.height * src_aspect, viewport.height)
    } else {
        (viewport.width, viewport.width / src_aspect)
    };
    let x = (viewport.width - w) / 2.0;
    let y = (viewport.height - h) / 2.0;

    CoverFit {
        scale: w / source.width,
        rect: Rect::new(x, y, x + w, y + h),
    }
}

/// Finite and non-empty on both axes.
pub fn is_drawable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
