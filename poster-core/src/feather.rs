//! Edge feathering: Gaussian blur composited back through a luminance mask.

use crate::rows::for_each_row;
use crate::{Canvas, PosterError, Result};

/// Softens band edges on a rendered canvas.
///
/// The sharp canvas is blurred, then each output pixel blends sharp and
/// blurred by the sharp pixel's own luminance: bright regions keep their
/// sharp colour, dark background takes the blur, so the glow spills
/// outward from band edges.
#[derive(Debug, Clone, Copy)]
pub struct FeatherCompositor {
    /// Gaussian sigma in pixels; 0 leaves the canvas untouched
    pub radius: f32,
}

impl FeatherCompositor {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn apply(&self, sharp: &Canvas) -> Result<Canvas> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(PosterError::invalid_config(format!(
                "feather radius must be >= 0 (got {})",
                self.radius
            )));
        }
        if self.radius == 0.0 {
            return Ok(sharp.clone());
        }

        let blurred = self.blur(sharp)?;
        let (width, height) = sharp.dimensions();
        let row_len = width as usize * 3;
        let sharp_raw = sharp.as_raw();
        let blurred_raw = blurred.as_raw();
        let mut out = vec![0u8; sharp_raw.len()];

        for_each_row(&mut out, row_len, |y, row| {
            let offset = y * row_len;
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let i = offset + x * 3;
                let s = &sharp_raw[i..i + 3];
                let b = &blurred_raw[i..i + 3];
                let m = luma(s) as u32;
                for c in 0..3 {
                    let v = s[c] as u32 * m + b[c] as u32 * (255 - m);
                    px[c] = ((v + 127) / 255) as u8;
                }
            }
        });

        tracing::debug!(radius = self.radius, width, height, "feathered canvas");
        Canvas::from_raw(width, height, out)
            .ok_or_else(|| PosterError::invalid_input("feather buffer size mismatch"))
    }

    /// Separable Gaussian blur with clamped edges
    pub fn blur(&self, src: &Canvas) -> Result<Canvas> {
        let kernel = gaussian_kernel_q16(self.radius)?;
        let (width, height) = src.dimensions();
        let mut tmp = vec![0u8; src.as_raw().len()];
        let mut out = vec![0u8; tmp.len()];

        horizontal_pass(src.as_raw(), &mut tmp, width, &kernel);
        vertical_pass(&tmp, &mut out, width, height, &kernel);

        Canvas::from_raw(width, height, out)
            .ok_or_else(|| PosterError::invalid_input("blur buffer size mismatch"))
    }
}

/// ITU-R 601 luma, as an 8-bit greyscale conversion computes it
fn luma(px: &[u8]) -> u8 {
    ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114 + 500) / 1000) as u8
}

/// Normalised Gaussian weights in Q16 fixed point, spanning three sigma
fn gaussian_kernel_q16(sigma: f32) -> Result<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PosterError::invalid_config("blur sigma must be > 0"));
    }
    let r = (3.0 * sigma).ceil().max(1.0) as i32;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|&wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Fold rounding drift into the centre tap so weights sum to exactly 1.0
    let acc: i64 = weights.iter().map(|&w| w as i64).sum();
    let mid = weights.len() / 2;
    weights[mid] = (weights[mid] as i64 + 65536 - acc).clamp(0, 65536) as u32;
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = width as i64;
    let row_len = width as usize * 3;
    for_each_row(dst, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1) as usize;
                for c in 0..3 {
                    acc[c] += kw as u64 * src_row[sx * 3 + c] as u64;
                }
            }
            let o = x as usize * 3;
            for c in 0..3 {
                row[o + c] = q16_to_u8(acc[c]);
            }
        }
    });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let h = height as i64;
    let row_len = width as usize * 3;
    for_each_row(dst, row_len, |y, row| {
        let mut acc = vec![0u64; row_len];
        for (ki, &kw) in k.iter().enumerate() {
            let sy = (y as i64 + ki as i64 - radius).clamp(0, h - 1) as usize;
            let src_row = &src[sy * row_len..(sy + 1) * row_len];
            for (a, &s) in acc.iter_mut().zip(src_row) {
                *a += kw as u64 * s as u64;
            }
        }
        for (px, a) in row.iter_mut().zip(acc) {
            *px = q16_to_u8(a);
        }
    });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
