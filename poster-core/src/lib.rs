//! Core rendering engine for colour-of-motion posters.
//!
//! Takes an ordered series of per-frame colour summaries (produced
//! elsewhere by sampling a video) and synthesises poster rasters from it:
//! flat strips, banded vertical posters with feathered edges, and polar
//! "donut", "radial" and pie-circle posters.
//!
//! Every render is a pure function of `(FrameSeries, RenderConfig)`; the
//! engine performs no I/O and holds no state between calls.

mod config;
mod feather;
mod frame;
mod grouping;
mod polar;
mod poster;
mod rows;
mod strip;
mod width;

pub use config::{RadialOrigin, RenderConfig, ResizeFilter, Rotation};
pub use feather::FeatherCompositor;
pub use frame::{FrameRecord, FrameSample, FrameSeries};
pub use grouping::{color_distance, Band, TemporalGrouper};
pub use polar::{
    donut_source_column, CircleRenderer, DonutMapping, DonutProjector, RadialMapping,
    RadialProjector, SENTINEL,
};
pub use poster::{Companion, Poster, PosterAssembler, PosterVariant};
pub use strip::{stripe_spans, Orientation, StripComposer};
pub use width::{WidthDriver, WidthModulator};

/// RGB color tuple
pub type Rgb = [u8; 3];

/// A finished poster raster: 8 bits per channel, RGB.
pub type Canvas = image::RgbImage;

/// Error type for poster rendering
#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("source read failure: {0}")]
    SourceReadFailure(String),
}

impl PosterError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn source_read_failure(msg: impl Into<String>) -> Self {
        Self::SourceReadFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PosterError>;
