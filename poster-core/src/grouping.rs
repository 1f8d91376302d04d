//! Temporal grouping of adjacent, similarly coloured frames into bands.

use crate::{FrameSeries, Rgb};

/// Maximal run of adjacent frames merged by colour similarity
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Elementwise mean of the member colours
    pub mean_color: [f64; 3],
    pub frame_count: usize,
    /// Index of the first member frame
    pub start_index: usize,
    /// Index of the last member frame (inclusive)
    pub end_index: usize,
}

impl Band {
    /// Mean colour rounded toward zero, matching how bands are painted
    pub fn color(&self) -> Rgb {
        self.mean_color.map(|c| c.clamp(0.0, 255.0) as u8)
    }
}

/// Euclidean distance between two colours
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Single forward pass grouping frames into [`Band`]s.
///
/// A frame joins the open band when its distance to the band's most
/// recently added frame is strictly below the threshold. The comparison is
/// strict, so a threshold of 0 never merges, not even identical colours.
#[derive(Debug, Clone, Copy)]
pub struct TemporalGrouper {
    pub threshold: f64,
}

/// Running sums for the band being built
struct BandAccum {
    sums: [f64; 3],
    count: usize,
    start_index: usize,
    last: Rgb,
    last_index: usize,
}

impl BandAccum {
    fn start(index: usize, color: Rgb) -> Self {
        Self {
            sums: color.map(f64::from),
            count: 1,
            start_index: index,
            last: color,
            last_index: index,
        }
    }

    fn push(&mut self, index: usize, color: Rgb) {
        for (sum, &c) in self.sums.iter_mut().zip(color.iter()) {
            *sum += c as f64;
        }
        self.count += 1;
        self.last = color;
        self.last_index = index;
    }

    fn close(self) -> Band {
        let n = self.count as f64;
        Band {
            mean_color: self.sums.map(|s| s / n),
            frame_count: self.count,
            start_index: self.start_index,
            end_index: self.last_index,
        }
    }
}

impl TemporalGrouper {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Partition the series into bands, in series order.
    pub fn group(&self, series: &FrameSeries) -> Vec<Band> {
        let frames = series.frames();
        let mut bands = Vec::new();
        let mut current = BandAccum::start(frames[0].index, frames[0].color);

        for frame in &frames[1..] {
            if color_distance(frame.color, current.last) < self.threshold {
                current.push(frame.index, frame.color);
            } else {
                let done = std::mem::replace(&mut current, BandAccum::start(frame.index, frame.color));
                bands.push(done.close());
            }
        }
        bands.push(current.close());

        tracing::debug!(frames = frames.len(), bands = bands.len(), threshold = self.threshold, "grouped frames");
        bands
    }
}
