use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{
    core::Size,
    error::{ReelError, ReelResult},
    math::mul_div255_u8,
};

/// Fully decoded raster frame in premultiplied RGBA8 form.
///
/// Decoding happens once, off the render loop, so drawing never pays for decompression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedFrame {
    /// Wrap an existing premultiplied buffer, checking its length.
    pub fn from_rgba8_premul(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::asset("frame dimensions must be non-zero"));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(ReelError::asset(format!(
                "frame buffer is {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        })
    }

    /// Uniformly colored frame; handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, rgba_premul: [u8; 4]) -> ReelResult<Self> {
        let px = (width as usize) * (height as usize);
        Self::from_rgba8_premul(width, height, rgba_premul.repeat(px))
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Pixel at `(x, y)`; callers guarantee bounds.
    #[inline]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        [p[0], p[1], p[2], p[3]]
    }
}

/// Decode encoded image bytes (PNG, WebP, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_frame(bytes: &[u8]) -> ReelResult<DecodedFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    DecodedFrame::from_rgba8_premul(width, height, rgba8_premul)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
