//! Flat strip composition: one solid stripe per frame.

use image::imageops::{self, FilterType};

use crate::{Canvas, FrameSeries, PosterError, ResizeFilter, Result};

/// Axis along which frames advance in a strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Frames advance left to right
    Horizontal,
    /// Frames advance top to bottom
    Vertical,
}

/// Builds strip bitmaps with a fixed stripe size per frame
#[derive(Debug, Clone, Copy)]
pub struct StripComposer {
    pub orientation: Orientation,
    /// Stripe extent along the time axis, in pixels
    pub stripe: u32,
    /// Strip extent across the time axis, in pixels
    pub thickness: u32,
}

impl StripComposer {
    pub fn horizontal(stripe_width: u32, height: u32) -> Self {
        Self { orientation: Orientation::Horizontal, stripe: stripe_width, thickness: height }
    }

    pub fn vertical(stripe_height: u32, width: u32) -> Self {
        Self { orientation: Orientation::Vertical, stripe: stripe_height, thickness: width }
    }

    /// Compose the strip at its native size (`n * stripe` along the time axis).
    pub fn compose(&self, series: &FrameSeries) -> Result<Canvas> {
        if series.is_empty() {
            return Err(PosterError::invalid_input("cannot compose a strip from an empty series"));
        }
        if self.stripe == 0 || self.thickness == 0 {
            return Err(PosterError::invalid_config("stripe size and strip thickness must be > 0"));
        }
        let length = u32::try_from(series.len())
            .ok()
            .and_then(|n| n.checked_mul(self.stripe))
            .ok_or_else(|| PosterError::invalid_input("strip length overflows the canvas"))?;

        let colors = series.colors();
        let (width, height) = match self.orientation {
            Orientation::Horizontal => (length, self.thickness),
            Orientation::Vertical => (self.thickness, length),
        };
        let stripe = self.stripe as usize;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

        match self.orientation {
            Orientation::Horizontal => {
                // Every row is identical
                let mut row = Vec::with_capacity(width as usize * 3);
                for color in &colors {
                    for _ in 0..stripe {
                        row.extend_from_slice(color);
                    }
                }
                for _ in 0..height {
                    pixels.extend_from_slice(&row);
                }
            }
            Orientation::Vertical => {
                for color in &colors {
                    for _ in 0..stripe * width as usize {
                        pixels.extend_from_slice(color);
                    }
                }
            }
        }

        tracing::debug!(frames = colors.len(), width, height, "composed strip");
        Canvas::from_raw(width, height, pixels)
            .ok_or_else(|| PosterError::invalid_input("strip buffer size mismatch"))
    }

    /// Compose, then fit to `width x height` with the given filter.
    ///
    /// [`ResizeFilter::None`] returns the native strip unchanged.
    pub fn compose_to(
        &self,
        series: &FrameSeries,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> Result<Canvas> {
        let strip = self.compose(series)?;
        Ok(fit(strip, width, height, filter))
    }
}

/// Fit a canvas to a target size
pub(crate) fn fit(canvas: Canvas, width: u32, height: u32, filter: ResizeFilter) -> Canvas {
    match filter {
        ResizeFilter::None => canvas,
        ResizeFilter::Smooth if canvas.dimensions() == (width, height) => canvas,
        ResizeFilter::Smooth => imageops::resize(&canvas, width, height, FilterType::Lanczos3),
    }
}

/// Split `total` pixels among `count` consecutive stripes as `(start, len)`.
///
/// Each stripe gets `total / count` pixels and the final stripe absorbs the
/// remainder, so the stripes cover `total` exactly. When there are more
/// stripes than pixels, each gets one pixel and stripes past the end get
/// zero length.
pub fn stripe_spans(count: usize, total: u32) -> Vec<(u32, u32)> {
    if count == 0 {
        return Vec::new();
    }
    let total_px = total as usize;
    if total_px < count {
        return (0..count)
            .map(|i| if i < total_px { (i as u32, 1) } else { (total, 0) })
            .collect();
    }
    let base = (total_px / count) as u32;
    let remainder = (total_px % count) as u32;
    (0..count)
        .map(|i| {
            let start = i as u32 * base;
            let len = if i + 1 == count { base + remainder } else { base };
            (start, len)
        })
        .collect()
}
