//! Render configuration: every tunable of a render call, with the
//! documented per-variant defaults.

use std::str::FromStr;

use serde::Deserialize;

use crate::poster::PosterVariant;
use crate::{PosterError, Result, Rgb};

/// Resampling applied when fitting a composed strip to its target canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// High-quality Lanczos resampling to the exact target size
    Smooth,
    /// Keep the strip at its native size
    None,
}

impl FromStr for ResizeFilter {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "smooth" => Ok(Self::Smooth),
            "none" => Ok(Self::None),
            _ => Err(format!("unknown resize filter '{}' (expected: smooth, none)", s)),
        }
    }
}

/// Clockwise quarter-turn applied to polar posters after warping.
///
/// Angle zero of the warp points east (3 o'clock); `Deg270` therefore
/// puts the first frame at 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(PosterError::invalid_config(format!(
                "rotation must be one of 0, 90, 180, 270 (got {})",
                degrees
            ))),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Rotate a finished canvas clockwise by this amount
    pub fn apply(self, canvas: crate::Canvas) -> crate::Canvas {
        use image::imageops;
        match self {
            Self::Deg0 => canvas,
            Self::Deg90 => imageops::rotate90(&canvas),
            Self::Deg180 => imageops::rotate180(&canvas),
            Self::Deg270 => imageops::rotate270(&canvas),
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = PosterError;
    fn try_from(degrees: u32) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

impl FromStr for Rotation {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let degrees: u32 = s
            .trim_end_matches("deg")
            .parse()
            .map_err(|_| format!("invalid rotation '{}'", s))?;
        Self::from_degrees(degrees).map_err(|e| e.to_string())
    }
}

/// Origin of the radial rasterizer's distance field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadialOrigin {
    /// Top-left pixel; normalised by the canvas diagonal
    Corner,
    /// Canvas centre; normalised by the centre-to-corner distance
    Center,
}

impl FromStr for RadialOrigin {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "corner" => Ok(Self::Corner),
            "center" | "centre" => Ok(Self::Center),
            _ => Err(format!("unknown radial origin '{}' (expected: corner, center)", s)),
        }
    }
}

/// Explicit tunables for one render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Canvas width for linear and vertical posters
    pub width: u32,
    /// Canvas height for linear and vertical posters
    pub height: u32,
    /// Side length of square polar posters
    pub resolution: u32,
    /// Pixels per frame in horizontal strips
    pub stripe_width: u32,
    /// Pixels per frame in vertical strips
    pub stripe_height: u32,
    /// Base height of one band in the grouped cinematic poster
    pub band_height: u32,
    pub resize: ResizeFilter,
    /// Colour distance below which adjacent frames share a band
    pub similarity_threshold: f64,
    pub min_width_ratio: f64,
    pub max_width_ratio: f64,
    /// Guards width normalisation against a zero metric range
    pub width_epsilon: f64,
    /// Gaussian sigma of the edge feather, in pixels (0 disables it)
    pub feather_radius: f32,
    pub rotation: Rotation,
    pub radial_origin: RadialOrigin,
    /// Scale on the radial normalisation distance; below 1 exposes the sentinel
    pub radial_reach: f64,
    /// Hollow centre of the pie-circle poster, as a fraction of its radius
    pub inner_radius_ratio: f64,
    /// Fill for pixels no frame covers
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 4000,
            height: 1000,
            resolution: 3000,
            stripe_width: 4,
            stripe_height: 100,
            band_height: 5,
            resize: ResizeFilter::Smooth,
            similarity_threshold: 25.0,
            min_width_ratio: 0.2,
            max_width_ratio: 0.9,
            width_epsilon: 1e-5,
            feather_radius: 2.0,
            rotation: Rotation::Deg270,
            radial_origin: RadialOrigin::Corner,
            radial_reach: 1.0,
            inner_radius_ratio: 0.25,
            background: [0, 0, 0],
        }
    }
}

impl RenderConfig {
    /// Documented defaults for a poster variant
    pub fn for_variant(variant: PosterVariant) -> Self {
        let base = Self::default();
        match variant {
            PosterVariant::Linear => base,
            PosterVariant::VerticalClassic => Self {
                width: 1600,
                height: 20000,
                ..base
            },
            PosterVariant::VerticalCinematic => Self {
                width: 3000,
                height: 5000,
                min_width_ratio: 0.25,
                max_width_ratio: 0.35,
                ..base
            },
            PosterVariant::VerticalCinematicBrightness => Self {
                width: 3000,
                height: 5000,
                ..base
            },
            PosterVariant::Donut => Self {
                resolution: 6000,
                ..base
            },
            PosterVariant::Radial => Self {
                resolution: 3000,
                ..base
            },
            PosterVariant::Circle => Self {
                resolution: 6000,
                rotation: Rotation::Deg0,
                background: [255, 255, 255],
                ..base
            },
        }
    }

    /// Check every tunable against its documented domain
    pub fn validate(&self) -> Result<()> {
        if self.similarity_threshold.is_nan() || self.similarity_threshold <= 0.0 {
            return Err(PosterError::invalid_config(format!(
                "similarity threshold must be > 0 (got {})",
                self.similarity_threshold
            )));
        }
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("resolution", self.resolution),
            ("stripe width", self.stripe_width),
            ("stripe height", self.stripe_height),
            ("band height", self.band_height),
        ] {
            if value == 0 {
                return Err(PosterError::invalid_config(format!("{} must be > 0", name)));
            }
        }
        let ratio_ok = |r: f64| (0.0..=1.0).contains(&r);
        if !ratio_ok(self.min_width_ratio) || !ratio_ok(self.max_width_ratio) {
            return Err(PosterError::invalid_config(format!(
                "width ratios must lie in [0, 1] (got {}..{})",
                self.min_width_ratio, self.max_width_ratio
            )));
        }
        if self.min_width_ratio > self.max_width_ratio {
            return Err(PosterError::invalid_config(format!(
                "min width ratio {} exceeds max width ratio {}",
                self.min_width_ratio, self.max_width_ratio
            )));
        }
        if !self.width_epsilon.is_finite() || self.width_epsilon <= 0.0 {
            return Err(PosterError::invalid_config("width epsilon must be a small positive number"));
        }
        if !self.feather_radius.is_finite() || self.feather_radius < 0.0 {
            return Err(PosterError::invalid_config(format!(
                "feather radius must be >= 0 (got {})",
                self.feather_radius
            )));
        }
        if !self.radial_reach.is_finite() || self.radial_reach <= 0.0 {
            return Err(PosterError::invalid_config(format!(
                "radial reach must be > 0 (got {})",
                self.radial_reach
            )));
        }
        if !ratio_ok(self.inner_radius_ratio) {
            return Err(PosterError::invalid_config(format!(
                "inner radius ratio must lie in [0, 1] (got {})",
                self.inner_radius_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults_are_valid() {
        for variant in PosterVariant::ALL {
            RenderConfig::for_variant(variant).validate().unwrap();
        }
    }

    #[test]
    fn test_cinematic_defaults() {
        let c = RenderConfig::for_variant(PosterVariant::VerticalCinematic);
        assert_eq!((c.width, c.height), (3000, 5000));
        assert_eq!((c.min_width_ratio, c.max_width_ratio), (0.25, 0.35));
        assert_eq!(c.similarity_threshold, 25.0);
        let b = RenderConfig::for_variant(PosterVariant::VerticalCinematicBrightness);
        assert_eq!((b.min_width_ratio, b.max_width_ratio), (0.2, 0.9));
    }

    #[test]
    fn test_invalid_threshold() {
        for t in [0.0, -1.0, f64::NAN] {
            let c = RenderConfig { similarity_threshold: t, ..RenderConfig::default() };
            assert!(matches!(c.validate(), Err(PosterError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_ratios() {
        let c = RenderConfig { min_width_ratio: 0.6, max_width_ratio: 0.5, ..RenderConfig::default() };
        assert!(matches!(c.validate(), Err(PosterError::InvalidConfig(_))));
        let c = RenderConfig { max_width_ratio: 1.5, ..RenderConfig::default() };
        assert!(matches!(c.validate(), Err(PosterError::InvalidConfig(_))));
        let c = RenderConfig { min_width_ratio: -0.1, ..RenderConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let c = RenderConfig { resolution: 0, ..RenderConfig::default() };
        assert!(matches!(c.validate(), Err(PosterError::InvalidConfig(_))));
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!("270".parse::<Rotation>().unwrap(), Rotation::Deg270);
        assert_eq!("90deg".parse::<Rotation>().unwrap(), Rotation::Deg90);
        assert!("45".parse::<Rotation>().is_err());
        assert!(matches!(Rotation::from_degrees(45), Err(PosterError::InvalidConfig(_))));
        assert_eq!(Rotation::Deg180.degrees(), 180);
    }

    #[test]
    fn test_rotation_moves_east_to_north() {
        let mut canvas = crate::Canvas::new(5, 5);
        canvas.put_pixel(4, 2, image::Rgb([255, 0, 0]));
        let rotated = Rotation::Deg270.apply(canvas);
        assert_eq!(rotated.get_pixel(2, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_enums_deserialize() {
        let r: Rotation = serde_yaml::from_str("180").unwrap();
        assert_eq!(r, Rotation::Deg180);
        assert!(serde_yaml::from_str::<Rotation>("45").is_err());
        let f: ResizeFilter = serde_yaml::from_str("none").unwrap();
        assert_eq!(f, ResizeFilter::None);
        let o: RadialOrigin = serde_yaml::from_str("center").unwrap();
        assert_eq!(o, RadialOrigin::Center);
    }
}
