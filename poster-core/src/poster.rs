//! Poster assembly: one entry point, a closed set of named variants.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::polar::{CircleRenderer, DonutProjector, RadialProjector};
use crate::strip::{fit, stripe_spans};
use crate::{
    Canvas, FeatherCompositor, FrameSeries, PosterError, RenderConfig, Result, Rgb,
    StripComposer, TemporalGrouper, WidthDriver, WidthModulator,
};

/// Named poster styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PosterVariant {
    /// Horizontal barcode, one stripe per frame
    Linear,
    /// Vertical barcode, one stripe per frame
    VerticalClassic,
    /// Centred column of colour bands, width by band size, feathered
    VerticalCinematic,
    /// Centred column of frame stripes, width by brightness, feathered
    VerticalCinematicBrightness,
    /// Polar warp with time running around the circle
    Donut,
    /// Radial gradient sampled from the linear strip
    Radial,
    /// Pie-slice circle with a hollow centre
    Circle,
}

impl PosterVariant {
    pub const ALL: [PosterVariant; 7] = [
        Self::Linear,
        Self::VerticalClassic,
        Self::VerticalCinematic,
        Self::VerticalCinematicBrightness,
        Self::Donut,
        Self::Radial,
        Self::Circle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::VerticalClassic => "vertical-classic",
            Self::VerticalCinematic => "vertical-cinematic",
            Self::VerticalCinematicBrightness => "vertical-cinematic-brightness",
            Self::Donut => "donut",
            Self::Radial => "radial",
            Self::Circle => "circle",
        }
    }

    /// Conventional output file name
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Linear => "linear.png",
            Self::VerticalClassic => "vertical_classic.png",
            Self::VerticalCinematic => "vertical_cinematic.png",
            Self::VerticalCinematicBrightness => "vertical_cinematic_brightness.png",
            Self::Donut => "circle_donut_poster.png",
            Self::Radial => "radial.png",
            Self::Circle => "circle_full.png",
        }
    }

    /// Whether the variant resamples a linear strip (and so can use a companion)
    pub fn is_polar(self) -> bool {
        matches!(self, Self::Donut | Self::Radial)
    }
}

impl fmt::Display for PosterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PosterVariant {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|v| v.name()).collect();
                format!("unknown poster variant '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Source strip for the polar variants
#[derive(Debug, Clone, Default)]
pub enum Companion {
    /// Compose a one-pixel-per-frame strip from the series
    #[default]
    Compose,
    /// A previously rendered linear poster
    Provided(Canvas),
    /// The caller expected a linear poster but could not read it
    Unreadable(String),
}

/// A rendered poster and any warnings raised while producing it
#[derive(Debug)]
pub struct Poster {
    pub variant: PosterVariant,
    pub canvas: Canvas,
    /// Non-fatal problems, e.g. a [`PosterError::SourceReadFailure`] that
    /// was answered with a fallback source
    pub warnings: Vec<PosterError>,
}

/// Renders poster variants from a frame series.
///
/// Holds no state between calls beyond the caller-chosen companion source;
/// every canvas is created fresh by the call that returns it.
#[derive(Debug, Clone, Default)]
pub struct PosterAssembler {
    companion: Companion,
}

impl PosterAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_companion(mut self, companion: Companion) -> Self {
        self.companion = companion;
        self
    }

    /// Render with the variant's documented defaults
    pub fn render_default(&self, series: &FrameSeries, variant: PosterVariant) -> Result<Poster> {
        self.render(series, variant, &RenderConfig::for_variant(variant))
    }

    /// Render each variant with its defaults; one failure never affects another.
    pub fn render_all(
        &self,
        series: &FrameSeries,
        variants: &[PosterVariant],
    ) -> Vec<(PosterVariant, Result<Poster>)> {
        variants
            .iter()
            .map(|&v| (v, self.render_default(series, v)))
            .collect()
    }

    #[tracing::instrument(skip(self, series, config), fields(frames = series.len()))]
    pub fn render(
        &self,
        series: &FrameSeries,
        variant: PosterVariant,
        config: &RenderConfig,
    ) -> Result<Poster> {
        config.validate()?;
        if series.is_empty() {
            return Err(PosterError::invalid_input("frame series is empty"));
        }
        let mut warnings = Vec::new();

        let canvas = match variant {
            PosterVariant::Linear => StripComposer::horizontal(config.stripe_width, config.height)
                .compose_to(series, config.width, config.height, config.resize)?,
            PosterVariant::VerticalClassic => {
                let stripe = (config.height / series.len() as u32).max(1);
                StripComposer::vertical(stripe, config.width)
                    .compose_to(series, config.width, config.height, config.resize)?
            }
            PosterVariant::VerticalCinematic => {
                cinematic(series, config, WidthDriver::BandSize)?
            }
            PosterVariant::VerticalCinematicBrightness => {
                cinematic(series, config, WidthDriver::Brightness)?
            }
            PosterVariant::Donut => {
                let source = self.polar_source(series, &mut warnings)?;
                DonutProjector {
                    resolution: config.resolution,
                    rotation: config.rotation,
                    background: config.background,
                }
                .project(&source)?
            }
            PosterVariant::Radial => {
                let source = self.polar_source(series, &mut warnings)?;
                RadialProjector {
                    resolution: config.resolution,
                    origin: config.radial_origin,
                    reach: config.radial_reach,
                }
                .project(&source)?
            }
            PosterVariant::Circle => CircleRenderer {
                resolution: config.resolution,
                inner_radius_ratio: config.inner_radius_ratio,
                rotation: config.rotation,
                background: config.background,
            }
            .render(&series.colors())?,
        };

        tracing::debug!(width = canvas.width(), height = canvas.height(), warnings = warnings.len(), "rendered");
        Ok(Poster { variant, canvas, warnings })
    }

    /// Strip the polar projectors resample. An unreadable companion falls
    /// back to the first frame and is reported as a warning.
    fn polar_source(&self, series: &FrameSeries, warnings: &mut Vec<PosterError>) -> Result<Cow<'_, Canvas>> {
        let failure = match &self.companion {
            Companion::Compose => {
                return Ok(Cow::Owned(StripComposer::horizontal(1, 1).compose(series)?));
            }
            Companion::Provided(image) if image.width() > 0 && image.height() > 0 => {
                return Ok(Cow::Borrowed(image));
            }
            Companion::Provided(_) => PosterError::source_read_failure("companion image is empty"),
            Companion::Unreadable(reason) => PosterError::source_read_failure(reason.clone()),
        };

        tracing::warn!(error = %failure, "no usable linear poster, using first frame as source");
        warnings.push(failure);
        let first = series.first().color;
        Ok(Cow::Owned(Canvas::from_pixel(1, 1, image::Rgb(first))))
    }
}

/// Vertical cinematic poster: a centred column whose stripe widths follow
/// the chosen driver, on a background canvas, then feathered.
fn cinematic(series: &FrameSeries, config: &RenderConfig, driver: WidthDriver) -> Result<Canvas> {
    let modulator = WidthModulator::new(config.min_width_ratio, config.max_width_ratio, config.width_epsilon);
    let (width, height) = (config.width, config.height);

    // A lone frame has nothing to modulate against and fills the poster
    if let [only] = series.frames() {
        driver.metrics(series, &[])?;
        return Ok(Canvas::from_pixel(width, height, image::Rgb(only.color)));
    }

    // (y, rows, stripe width, colour) per stripe, top to bottom
    let stripes: Vec<(u32, u32, f64, Rgb)> = match driver {
        WidthDriver::BandSize => {
            let bands = TemporalGrouper::new(config.similarity_threshold).group(series);
            let widths = modulator.widths(&driver.metrics(series, &bands)?, width);
            let mut y = 0u32;
            let mut stripes = Vec::with_capacity(bands.len());
            for (band, w) in bands.iter().zip(widths) {
                if y >= height {
                    break;
                }
                let rows = config
                    .band_height
                    .saturating_mul((band.frame_count as u32 / 2).max(1))
                    .min(height - y);
                stripes.push((y, rows, w, band.color()));
                y += rows;
            }
            stripes
        }
        WidthDriver::Brightness => {
            let widths = modulator.widths(&driver.metrics(series, &[])?, width);
            stripe_spans(series.len(), height)
                .into_iter()
                .zip(widths)
                .zip(series.frames())
                .map(|(((y, rows), w), frame)| (y, rows, w, frame.color))
                .collect()
        }
    };

    let mut canvas = Canvas::from_pixel(width, height, image::Rgb(config.background));
    for &(y, rows, w, color) in &stripes {
        let (x0, x1) = WidthModulator::centered_span(w, width);
        for yy in y..y + rows {
            for x in x0..x1 {
                canvas.put_pixel(x, yy, image::Rgb(color));
            }
        }
    }
    tracing::debug!(stripes = stripes.len(), ?driver, "painted cinematic column");

    let canvas = FeatherCompositor::new(config.feather_radius).apply(&canvas)?;
    Ok(fit(canvas, width, height, config.resize))
}
