//! Stripe width modulation from a per-band or per-frame metric.

use std::str::FromStr;

use serde::Deserialize;

use crate::{Band, FrameSeries, Result};

/// Metric driving stripe width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidthDriver {
    /// Frame count of each band
    BandSize,
    /// Brightness of each frame
    Brightness,
}

impl WidthDriver {
    /// Collect the driving metric: one value per band, or one per frame.
    pub fn metrics(self, series: &FrameSeries, bands: &[Band]) -> Result<Vec<f64>> {
        match self {
            Self::BandSize => Ok(bands.iter().map(|b| b.frame_count as f64).collect()),
            Self::Brightness => series.brightness(),
        }
    }
}

impl FromStr for WidthDriver {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "band-size" | "size" => Ok(Self::BandSize),
            "brightness" => Ok(Self::Brightness),
            _ => Err(format!("unknown width driver '{}' (expected: band-size, brightness)", s)),
        }
    }
}

/// Maps a metric stream linearly onto `[min_ratio * W, max_ratio * W]`.
///
/// Normalisation is `(m - min) / (max - min + epsilon)`. A constant metric
/// therefore normalises to 0 everywhere and every stripe takes the minimum
/// width.
#[derive(Debug, Clone, Copy)]
pub struct WidthModulator {
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub epsilon: f64,
}

impl WidthModulator {
    pub fn new(min_ratio: f64, max_ratio: f64, epsilon: f64) -> Self {
        Self { min_ratio, max_ratio, epsilon }
    }

    /// Normalise each metric into `[0, 1)` against the stream's own range.
    pub fn normalize(&self, metrics: &[f64]) -> Vec<f64> {
        let min = metrics.iter().copied().fold(f64::INFINITY, f64::min);
        let max = metrics.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min + self.epsilon;
        metrics.iter().map(|&m| (m - min) / range).collect()
    }

    /// Width for one normalised metric on a canvas `canvas_width` wide
    pub fn width_for(&self, normalized: f64, canvas_width: u32) -> f64 {
        let w = canvas_width as f64;
        let n = normalized.clamp(0.0, 1.0);
        self.min_ratio * w + n * (self.max_ratio - self.min_ratio) * w
    }

    /// Stripe width for every element of the metric stream
    pub fn widths(&self, metrics: &[f64], canvas_width: u32) -> Vec<f64> {
        self.normalize(metrics)
            .into_iter()
            .map(|n| self.width_for(n, canvas_width))
            .collect()
    }

    /// Horizontal pixel span `[x0, x1)` of a stripe centred on the canvas
    pub fn centered_span(width: f64, canvas_width: u32) -> (u32, u32) {
        let w = (width.round() as u32).min(canvas_width);
        let x0 = (canvas_width - w) / 2;
        (x0, x0 + w)
    }
}
