//! Frame summary types: the ordered, immutable input to every render.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::{PosterError, Result, Rgb};

/// Colour summary of one sampled video frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub index: usize,
    pub color: Rgb,
    pub brightness: Option<f64>,
    pub saturation: Option<f64>,
}

impl FrameSample {
    pub fn new(index: usize, color: Rgb) -> Self {
        Self {
            index,
            color,
            brightness: None,
            saturation: None,
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = Some(saturation);
        self
    }
}

/// One record of a frame-summary file, as written by the ingestion stage.
///
/// ```json
/// [{"file": "frame_0001.jpg", "average_color": [12, 40, 77], "brightness": 0.16}]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    #[serde(alias = "average_color")]
    pub color: [f64; 3],
    pub brightness: Option<f64>,
    pub saturation: Option<f64>,
    /// Position in the series; records without one are numbered by order
    pub index: Option<usize>,
    /// Source frame file name (informational only)
    pub file: Option<String>,
}

/// Ordered, non-empty sequence of frame samples with contiguous indices.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSeries {
    frames: Vec<FrameSample>,
}

impl FrameSeries {
    /// Build a series, rejecting empty input and gaps or reordering in the indices.
    pub fn new(frames: Vec<FrameSample>) -> Result<Self> {
        if frames.is_empty() {
            return Err(PosterError::invalid_input("frame series is empty"));
        }
        for pair in frames.windows(2) {
            if pair[0].index.checked_add(1) != Some(pair[1].index) {
                return Err(PosterError::invalid_input(format!(
                    "frame indices must be contiguous and increasing: {} followed by {}",
                    pair[0].index, pair[1].index
                )));
            }
        }
        Ok(Self { frames })
    }

    pub fn from_colors(colors: &[Rgb]) -> Result<Self> {
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(i, &c)| FrameSample::new(i, c))
                .collect(),
        )
    }

    pub fn from_records(records: Vec<FrameRecord>) -> Result<Self> {
        let frames = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let mut color = [0u8; 3];
                for (dst, &v) in color.iter_mut().zip(record.color.iter()) {
                    if !v.is_finite() {
                        return Err(PosterError::invalid_input(format!(
                            "frame {}: non-finite colour channel",
                            position
                        )));
                    }
                    *dst = v.round().clamp(0.0, 255.0) as u8;
                }
                Ok(FrameSample {
                    index: record.index.unwrap_or(position),
                    color,
                    brightness: record.brightness,
                    saturation: record.saturation,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(frames)
    }

    /// Parse a JSON array of [`FrameRecord`]s.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<FrameRecord> = serde_json::from_str(json)
            .map_err(|e| PosterError::invalid_input(format!("malformed frame records: {}", e)))?;
        Self::from_records(records)
    }

    /// Deterministic random-walk series with occasional hard cuts, for
    /// benchmarks and demos. Brightness and saturation are filled in.
    pub fn synthetic(count: usize, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut current = [rng.gen::<f64>() * 255.0, rng.gen::<f64>() * 255.0, rng.gen::<f64>() * 255.0];
        let frames = (0..count)
            .map(|i| {
                if rng.gen_bool(0.05) {
                    // Scene cut
                    for c in current.iter_mut() {
                        *c = rng.gen::<f64>() * 255.0;
                    }
                } else {
                    for c in current.iter_mut() {
                        *c = (*c + rng.gen_range(-8.0..8.0)).clamp(0.0, 255.0);
                    }
                }
                let color = current.map(|c| c.round() as u8);
                let max = color.iter().copied().max().unwrap_or(0) as f64;
                let min = color.iter().copied().min().unwrap_or(0) as f64;
                let brightness = color.iter().map(|&c| c as f64).sum::<f64>() / (3.0 * 255.0);
                let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };
                FrameSample::new(i, color)
                    .with_brightness(brightness)
                    .with_saturation(saturation)
            })
            .collect();
        Self::new(frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: a constructed series holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FrameSample] {
        &self.frames
    }

    pub fn first(&self) -> &FrameSample {
        &self.frames[0]
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.frames.iter().map(|f| f.color).collect()
    }

    /// Per-frame brightness; every frame must carry one.
    pub fn brightness(&self) -> Result<Vec<f64>> {
        self.frames
            .iter()
            .map(|f| {
                f.brightness.ok_or_else(|| {
                    PosterError::invalid_input(format!("frame {} has no brightness value", f.index))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(FrameSeries::new(vec![]), Err(PosterError::InvalidInput(_))));
        assert!(matches!(FrameSeries::from_colors(&[]), Err(PosterError::InvalidInput(_))));
    }

    #[test]
    fn test_non_contiguous_indices_rejected() {
        let frames = vec![FrameSample::new(0, [0, 0, 0]), FrameSample::new(2, [0, 0, 0])];
        assert!(matches!(FrameSeries::new(frames), Err(PosterError::InvalidInput(_))));

        let frames = vec![FrameSample::new(3, [0, 0, 0]), FrameSample::new(2, [0, 0, 0])];
        assert!(FrameSeries::new(frames).is_err());
    }

    #[test]
    fn test_series_may_start_at_any_index() {
        let frames = vec![FrameSample::new(7, [1, 2, 3]), FrameSample::new(8, [4, 5, 6])];
        let series = FrameSeries::new(frames).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().index, 7);
    }

    #[test]
    fn test_from_json_accepts_average_color_alias() {
        let json = r#"[
            {"file": "frame_0001.jpg", "average_color": [10, 20, 30]},
            {"color": [40.4, 50.6, 300], "brightness": 0.5, "saturation": 0.1}
        ]"#;
        let series = FrameSeries::from_json(json).unwrap();
        assert_eq!(series.colors(), vec![[10, 20, 30], [40, 51, 255]]);
        assert_eq!(series.frames()[1].brightness, Some(0.5));
        assert_eq!(series.frames()[1].index, 1);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            FrameSeries::from_json("{not json"),
            Err(PosterError::InvalidInput(_))
        ));
        assert!(matches!(FrameSeries::from_json("[]"), Err(PosterError::InvalidInput(_))));
    }

    #[test]
    fn test_from_json_index_overflow_rejected() {
        let json = r#"[
            {"color": [1, 2, 3], "index": 18446744073709551615},
            {"color": [1, 2, 3], "index": 0}
        ]"#;
        assert!(matches!(FrameSeries::from_json(json), Err(PosterError::InvalidInput(_))));

        let last = FrameSeries::new(vec![FrameSample::new(usize::MAX, [0, 0, 0])]);
        assert!(last.is_ok());
    }

    #[test]
    fn test_missing_brightness_reported() {
        let series = FrameSeries::new(vec![
            FrameSample::new(0, [0, 0, 0]).with_brightness(0.3),
            FrameSample::new(1, [0, 0, 0]),
        ])
        .unwrap();
        let err = series.brightness().unwrap_err();
        assert!(err.to_string().contains("frame 1"));
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = FrameSeries::synthetic(500, 42).unwrap();
        let b = FrameSeries::synthetic(500, 42).unwrap();
        let c = FrameSeries::synthetic(500, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.brightness().unwrap().len(), 500);
        assert!(FrameSeries::synthetic(0, 42).is_err());
    }
}
