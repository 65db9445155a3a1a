use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;

use crate::assets::decode::DecodedFrame;
use crate::foundation::core::{Affine, Point, Rgba8Premul, Size};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// How one frame is placed on a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Frame pixel space to surface pixel space.
    pub transform: Affine,
    pub opacity: f64,
}

/// Output target of the compositor.
pub trait Surface: Send {
    /// Current size in pixels.
    fn viewport(&self) -> Size;

    fn resize(&mut self, viewport: Size) -> ReelResult<()>;

    /// Clear to the background color.
    fn clear(&mut self);

    /// Composite `frame` with `params` over the current contents.
    fn overlay(&mut self, frame: &DecodedFrame, params: &DrawParams) -> ReelResult<()>;

    /// Clear, then composite `frame` with `params`.
    fn draw(&mut self, frame: &DecodedFrame, params: &DrawParams) -> ReelResult<()> {
        self.clear();
        self.overlay(frame, params)
    }
}

/// CPU raster surface holding premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct CpuSurface {
    width: u32,
    height: u32,
    background: Rgba8Premul,
    data: Vec<u8>,
    draws: u64,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32, background: Rgba8Premul) -> ReelResult<Self> {
        check_dims(width, height)?;
        let mut s = Self {
            width,
            height,
            background,
            data: Vec::new(),
            draws: 0,
        };
        s.fill_background();
        Ok(s)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of `draw` calls so far.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.data[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> ReelResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| ReelError::render("surface buffer does not match its dimensions"))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write surface png '{}'", path.display()))?;
        Ok(())
    }

    fn fill_background(&mut self) {
        let px = (self.width as usize) * (self.height as usize);
        self.data = self.background.to_array().repeat(px);
    }
}

impl Surface for CpuSurface {
    fn viewport(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    fn resize(&mut self, viewport: Size) -> ReelResult<()> {
        if !viewport.width.is_finite() || !viewport.height.is_finite() {
            return Err(ReelError::render("viewport size must be finite"));
        }
        let width = viewport.width.round().max(0.0) as u32;
        let height = viewport.height.round().max(0.0) as u32;
        check_dims(width, height)?;
        self.width = width;
        self.height = height;
        self.fill_background();
        Ok(())
    }

    fn clear(&mut self) {
        self.fill_background();
    }

    fn overlay(&mut self, frame: &DecodedFrame, params: &DrawParams) -> ReelResult<()> {
        let opacity = (params.opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
        let det = params.transform.determinant();
        if opacity == 0 || !det.is_finite() || det.abs() < 1e-12 {
            return Ok(());
        }

        // Nearest-neighbour sampling through the inverse transform, one row per task.
        let inv = params.transform.inverse();
        let stride = (self.width as usize) * 4;
        let (fw, fh) = (f64::from(frame.width), f64::from(frame.height));
        self.data
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let p = inv * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    if p.x >= 0.0 && p.y >= 0.0 && p.x < fw && p.y < fh {
                        let dst = [px[0], px[1], px[2], px[3]];
                        let out = over(dst, frame.pixel(p.x as u32, p.y as u32), opacity);
                        px.copy_from_slice(&out);
                    }
                }
            });
        Ok(())
    }

    fn draw(&mut self, frame: &DecodedFrame, params: &DrawParams) -> ReelResult<()> {
        self.draws += 1;
        self.fill_background();
        self.overlay(frame, params)
    }
}

fn check_dims(width: u32, height: u32) -> ReelResult<()> {
    if width == 0 || height == 0 {
        return Err(ReelError::render("surface dimensions must be non-zero"));
    }
    Ok(())
}

/// Premultiplied source-over with an extra 0..=255 opacity.
fn over(dst: [u8; 4], src: [u8; 4], opacity: u16) -> [u8; 4] {
    let sa = mul_div255_u16(u16::from(src[3]), opacity);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let sc = mul_div255_u16(u16::from(src[i]), opacity);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (sc + dc).min(255) as u8;
    }
    out
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
