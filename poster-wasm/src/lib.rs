//! WASM bindings for poster-core.
//!
//! Exposes a stateful `PosterEngine` that holds a frame series and renders
//! posters on demand, returning flat typed arrays for efficient JS interop.

use wasm_bindgen::prelude::*;
use poster_core::{
    Companion, FrameSample, FrameSeries, Poster, PosterAssembler, PosterError, PosterVariant,
    RenderConfig, Rotation,
};

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Convert RGBA pixel data to an `image::RgbImage`.
fn rgba_to_rgb_image(rgba: &[u8], width: u32, height: u32) -> Result<image::RgbImage, JsError> {
    let rgb: Vec<u8> = rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| JsError::new("RGBA buffer does not match width * height * 4"))
}

/// A rendered poster.
/// Pixels are exposed as a flat RGBA array, ready for `ImageData`.
#[wasm_bindgen]
pub struct PosterFrame {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl PosterFrame {
    /// Row-major RGBA pixels (length = width*height*4)
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.rgba.as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Non-fatal problems raised while rendering, as messages
    #[wasm_bindgen(getter)]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }
}

impl PosterFrame {
    fn from_poster(poster: Poster) -> Self {
        let (width, height) = poster.canvas.dimensions();
        let rgba = poster.canvas.pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2], 255])
            .collect();
        Self {
            rgba,
            width,
            height,
            warnings: poster.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Stateful poster engine.
/// Holds the frame series and an optional linear poster used as the
/// polar source.
#[wasm_bindgen]
pub struct PosterEngine {
    series: FrameSeries,
    assembler: PosterAssembler,
}

#[wasm_bindgen]
impl PosterEngine {
    /// Create an engine from flat [r0,g0,b0, r1,g1,b1, ...] frame colours
    /// and optional per-frame brightness.
    #[wasm_bindgen(constructor)]
    pub fn new(colors: &[u8], brightness: Option<Vec<f64>>) -> Result<PosterEngine, JsError> {
        let series = build_series(colors, brightness.as_deref())?;
        Ok(Self { series, assembler: PosterAssembler::new() })
    }

    /// Create an engine from a JSON array of frame records.
    pub fn from_json(json: &str) -> Result<PosterEngine, JsError> {
        let series = FrameSeries::from_json(json)?;
        Ok(Self { series, assembler: PosterAssembler::new() })
    }

    /// Create an engine over a seeded synthetic series.
    pub fn synthetic(frames: usize, seed: u32) -> Result<PosterEngine, JsError> {
        let series = FrameSeries::synthetic(frames, seed as u64)?;
        Ok(Self { series, assembler: PosterAssembler::new() })
    }

    /// Use a previously rendered linear poster (RGBA) as the polar source.
    pub fn set_companion(&mut self, rgba_data: &[u8], width: u32, height: u32) -> Result<(), JsError> {
        let image = rgba_to_rgb_image(rgba_data, width, height)?;
        self.assembler = PosterAssembler::new().with_companion(Companion::Provided(image));
        Ok(())
    }

    /// Go back to composing the polar source from the series.
    pub fn clear_companion(&mut self) {
        self.assembler = PosterAssembler::new();
    }

    /// Render a poster variant by name (e.g. "donut").
    /// Zero sizes keep the variant's defaults.
    pub fn render(
        &self,
        variant: &str,
        width: u32,
        height: u32,
        resolution: u32,
        rotation: Option<u32>,
    ) -> Result<PosterFrame, JsError> {
        let variant: PosterVariant = variant.parse().map_err(|e: String| JsError::new(&e))?;
        let mut config = RenderConfig::for_variant(variant);
        if width > 0 {
            config.width = width;
        }
        if height > 0 {
            config.height = height;
        }
        if resolution > 0 {
            config.resolution = resolution;
        }
        if let Some(degrees) = rotation {
            config.rotation = Rotation::from_degrees(degrees)?;
        }
        let poster = self.assembler.render(&self.series, variant, &config)?;
        Ok(PosterFrame::from_poster(poster))
    }

    /// Names of all poster variants.
    pub fn variants() -> Vec<String> {
        PosterVariant::ALL.iter().map(|v| v.name().to_string()).collect()
    }

    /// Get current frame count.
    pub fn frame_count(&self) -> usize {
        self.series.len()
    }
}

fn build_series(colors: &[u8], brightness: Option<&[f64]>) -> poster_core::Result<FrameSeries> {
    if colors.len() % 3 != 0 {
        return Err(PosterError::invalid_input("colour buffer length must be a multiple of 3"));
    }
    let count = colors.len() / 3;
    if let Some(b) = brightness {
        if b.len() != count {
            return Err(PosterError::invalid_input(format!(
                "brightness length {} does not match frame count {}",
                b.len(),
                count
            )));
        }
    }
    let frames = colors.chunks_exact(3)
        .enumerate()
        .map(|(i, c)| {
            let frame = FrameSample::new(i, [c[0], c[1], c[2]]);
            match brightness {
                Some(b) => frame.with_brightness(b[i]),
                None => frame,
            }
        })
        .collect();
    FrameSeries::new(frames)
}
