//! Polar resampling of composed strips.
//!
//! Two independent algorithms live here and are deliberately kept apart:
//!
//! - [`DonutProjector`]: a full-circle polar warp. Angle encodes time (the
//!   strip's x axis), radius encodes the strip's y axis.
//! - [`RadialProjector`]: a coarse radial gradient. Each output pixel looks
//!   up a single column of the strip's middle row by its distance from an
//!   origin. Pixels beyond the normalisation distance get [`SENTINEL`].
//!
//! [`CircleRenderer`] draws the pie-slice circle poster straight from the
//! frame colours, one equal-angle slice per frame.
//!
//! Every output pixel depends only on the immutable source and config, so
//! rows are filled in parallel (see the `parallel` feature).

use std::f64::consts::TAU;

use crate::rows::for_each_row;
use crate::{Canvas, PosterError, RadialOrigin, Result, Rgb, Rotation};

/// Fill for radial samples outside the source domain
pub const SENTINEL: Rgb = [50, 50, 50];

/// Source column for a polar angle, wrapping so that `theta` and
/// `theta + 2π` land on the same column.
pub fn donut_source_column(theta: f64, source_width: u32) -> u32 {
    let turn = theta.rem_euclid(TAU) / TAU;
    ((turn * source_width as f64) as u32).min(source_width.saturating_sub(1))
}

fn check_source(source: &Canvas) -> Result<()> {
    if source.width() == 0 || source.height() == 0 {
        return Err(PosterError::invalid_input("polar source strip is empty"));
    }
    Ok(())
}

fn check_resolution(resolution: u32) -> Result<()> {
    if resolution == 0 {
        return Err(PosterError::invalid_config("resolution must be > 0"));
    }
    Ok(())
}

/// Sample `map(x, y)` for every pixel of a square canvas
fn rasterize<F>(resolution: u32, map: F) -> Result<Canvas>
where
    F: Fn(u32, u32) -> Rgb + Send + Sync,
{
    let row_len = resolution as usize * 3;
    let mut pixels = vec![0u8; row_len * resolution as usize];
    for_each_row(&mut pixels, row_len, |y, row| {
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            px.copy_from_slice(&map(x as u32, y as u32));
        }
    });
    Canvas::from_raw(resolution, resolution, pixels)
        .ok_or_else(|| PosterError::invalid_input("polar buffer size mismatch"))
}

fn source_pixel(source: &Canvas, col: u32, row: u32) -> Rgb {
    source.get_pixel(col, row).0
}

/// Output pixel to strip coordinate for the donut warp (before rotation)
#[derive(Debug, Clone, Copy)]
pub struct DonutMapping {
    pub resolution: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl DonutMapping {
    pub fn new(resolution: u32, source_width: u32, source_height: u32) -> Self {
        Self { resolution, source_width, source_height }
    }

    /// `(column, row)` of the strip sampled at output pixel `(x, y)`, or
    /// `None` outside the circle.
    pub fn sample(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let half = self.resolution as f64 / 2.0;
        let dx = x as f64 + 0.5 - half;
        let dy = y as f64 + 0.5 - half;
        let r = (dx * dx + dy * dy).sqrt();
        if r > half {
            return None;
        }
        let col = donut_source_column(dy.atan2(dx), self.source_width);
        let row = (((r / half) * self.source_height as f64) as u32).min(self.source_height - 1);
        Some((col, row))
    }
}

/// Full-circle polar warp ("donut poster")
#[derive(Debug, Clone, Copy)]
pub struct DonutProjector {
    pub resolution: u32,
    pub rotation: Rotation,
    pub background: Rgb,
}

impl DonutProjector {
    pub fn project(&self, source: &Canvas) -> Result<Canvas> {
        check_resolution(self.resolution)?;
        check_source(source)?;
        let mapping = DonutMapping::new(self.resolution, source.width(), source.height());
        let background = self.background;

        let warped = rasterize(self.resolution, |x, y| match mapping.sample(x, y) {
            Some((col, row)) => source_pixel(source, col, row),
            None => background,
        })?;

        tracing::debug!(
            resolution = self.resolution,
            source_width = source.width(),
            source_height = source.height(),
            rotation = self.rotation.degrees(),
            "donut warp"
        );
        Ok(self.rotation.apply(warped))
    }
}

/// Output pixel to strip coordinate for the radial rasterizer
#[derive(Debug, Clone, Copy)]
pub struct RadialMapping {
    pub resolution: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub origin: RadialOrigin,
    pub reach: f64,
}

impl RadialMapping {
    /// Distance of `(x, y)` from the origin over the normalisation distance
    pub fn normalized_distance(&self, x: u32, y: u32) -> f64 {
        let r = self.resolution as f64;
        let (ox, oy, max_dist) = match self.origin {
            RadialOrigin::Corner => (0.0, 0.0, (r * r + r * r).sqrt()),
            RadialOrigin::Center => {
                let half = r / 2.0;
                (half, half, (half * half + half * half).sqrt())
            }
        };
        let dx = x as f64 - ox;
        let dy = y as f64 - oy;
        (dx * dx + dy * dy).sqrt() / (max_dist * self.reach)
    }

    /// `(column, row)` on the strip's middle row, or `None` past the
    /// normalisation distance. The column is truncated, never rounded.
    pub fn sample(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let d = self.normalized_distance(x, y);
        if d <= 1.0 {
            let col = (d * (self.source_width - 1) as f64) as u32;
            Some((col, self.source_height / 2))
        } else {
            None
        }
    }
}

/// Direct inverse-mapped radial rasterizer ("radial/swirl")
#[derive(Debug, Clone, Copy)]
pub struct RadialProjector {
    pub resolution: u32,
    pub origin: RadialOrigin,
    pub reach: f64,
}

impl RadialProjector {
    pub fn project(&self, source: &Canvas) -> Result<Canvas> {
        check_resolution(self.resolution)?;
        check_source(source)?;
        if !self.reach.is_finite() || self.reach <= 0.0 {
            return Err(PosterError::invalid_config("radial reach must be > 0"));
        }
        let mapping = RadialMapping {
            resolution: self.resolution,
            source_width: source.width(),
            source_height: source.height(),
            origin: self.origin,
            reach: self.reach,
        };

        let canvas = rasterize(self.resolution, |x, y| match mapping.sample(x, y) {
            Some((col, row)) => source_pixel(source, col, row),
            None => SENTINEL,
        })?;

        tracing::debug!(resolution = self.resolution, origin = ?self.origin, "radial raster");
        Ok(canvas)
    }
}

/// Pie-slice circle poster: one equal-angle slice per frame, clockwise,
/// around a hollow centre
#[derive(Debug, Clone, Copy)]
pub struct CircleRenderer {
    pub resolution: u32,
    /// Radius of the hollow centre over the outer radius
    pub inner_radius_ratio: f64,
    pub rotation: Rotation,
    pub background: Rgb,
}

impl CircleRenderer {
    pub fn render(&self, colors: &[Rgb]) -> Result<Canvas> {
        check_resolution(self.resolution)?;
        if colors.is_empty() {
            return Err(PosterError::invalid_input("circle poster needs at least one frame"));
        }
        let n = colors.len();
        let half = self.resolution as f64 / 2.0;
        let inner = half * self.inner_radius_ratio;
        let background = self.background;

        let canvas = rasterize(self.resolution, |x, y| {
            let dx = x as f64 + 0.5 - half;
            let dy = y as f64 + 0.5 - half;
            let r = (dx * dx + dy * dy).sqrt();
            if r > half || r < inner {
                return background;
            }
            let turn = dy.atan2(dx).rem_euclid(TAU) / TAU;
            colors[((turn * n as f64) as usize).min(n - 1)]
        })?;

        tracing::debug!(resolution = self.resolution, slices = n, "pie circle");
        Ok(self.rotation.apply(canvas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrameSeries, StripComposer};

    fn strip(colors: &[Rgb]) -> Canvas {
        let series = FrameSeries::from_colors(colors).unwrap();
        StripComposer::horizontal(1, 1).compose(&series).unwrap()
    }

    fn gradient(width: u32) -> Canvas {
        Canvas::from_fn(width, 3, |x, _| image::Rgb([x as u8, 0, 255 - x as u8]))
    }

    const QUAD: [Rgb; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];

    #[test]
    fn test_rasterizers_match_sequential_loop() {
        let source = gradient(200);
        let resolution = 41;

        let donut = DonutProjector { resolution, rotation: Rotation::Deg0, background: [9, 9, 9] }
            .project(&source)
            .unwrap();
        let mapping = DonutMapping::new(resolution, source.width(), source.height());
        for y in 0..resolution {
            for x in 0..resolution {
                let expected = match mapping.sample(x, y) {
                    Some((col, row)) => source.get_pixel(col, row).0,
                    None => [9, 9, 9],
                };
                assert_eq!(donut.get_pixel(x, y).0, expected, "donut ({}, {})", x, y);
            }
        }

        for origin in [RadialOrigin::Corner, RadialOrigin::Center] {
            let radial = RadialProjector { resolution, origin, reach: 0.8 }.project(&source).unwrap();
            let mapping = RadialMapping {
                resolution,
                source_width: source.width(),
                source_height: source.height(),
                origin,
                reach: 0.8,
            };
            for y in 0..resolution {
                for x in 0..resolution {
                    let expected = match mapping.sample(x, y) {
                        Some((col, row)) => source.get_pixel(col, row).0,
                        None => SENTINEL,
                    };
                    assert_eq!(radial.get_pixel(x, y).0, expected, "{:?} ({}, {})", origin, x, y);
                }
            }
        }
    }

    #[test]
    fn test_wrap_continuity() {
        for width in [1, 2, 7, 1000, 4321] {
            assert_eq!(donut_source_column(0.0, width), donut_source_column(TAU, width));
            assert_eq!(donut_source_column(-TAU, width), 0);
            assert!(donut_source_column(TAU - 1e-9, width) < width);
        }
        assert_eq!(donut_source_column(std::f64::consts::PI, 10), 5);
    }

    #[test]
    fn test_donut_dimensions() {
        let projector = DonutProjector { resolution: 100, rotation: Rotation::Deg270, background: [0, 0, 0] };
        let donut = projector.project(&strip(&QUAD)).unwrap();
        assert_eq!(donut.dimensions(), (100, 100));
    }

    #[test]
    fn test_donut_deterministic() {
        let projector = DonutProjector { resolution: 257, rotation: Rotation::Deg90, background: [1, 2, 3] };
        let source = gradient(200);
        let a = projector.project(&source).unwrap();
        let b = projector.project(&source).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_donut_outside_circle_is_background() {
        let projector = DonutProjector { resolution: 64, rotation: Rotation::Deg0, background: [9, 8, 7] };
        let donut = projector.project(&strip(&QUAD)).unwrap();
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(donut.get_pixel(x, y).0, [9, 8, 7]);
        }
    }

    #[test]
    fn test_donut_start_at_twelve_oclock() {
        let projector = DonutProjector { resolution: 100, rotation: Rotation::Deg270, background: [0, 0, 0] };
        let donut = projector.project(&strip(&QUAD)).unwrap();
        // Just clockwise of north is the first frame, just anticlockwise the last
        assert_eq!(donut.get_pixel(52, 10).0, QUAD[0]);
        assert_eq!(donut.get_pixel(47, 10).0, QUAD[3]);
        // East (3 o'clock) is a quarter turn in
        assert_eq!(donut.get_pixel(90, 52).0, QUAD[1]);
    }

    #[test]
    fn test_donut_radius_maps_to_rows() {
        let source = Canvas::from_fn(1, 2, |_, y| if y == 0 { image::Rgb([10, 10, 10]) } else { image::Rgb([200, 200, 200]) });
        let projector = DonutProjector { resolution: 40, rotation: Rotation::Deg0, background: [0, 0, 0] };
        let donut = projector.project(&source).unwrap();
        assert_eq!(donut.get_pixel(20, 20).0, [10, 10, 10]);
        assert_eq!(donut.get_pixel(38, 20).0, [200, 200, 200]);
    }

    #[test]
    fn test_donut_single_frame_uniform_disc() {
        let projector = DonutProjector { resolution: 50, rotation: Rotation::Deg270, background: [0, 0, 0] };
        let donut = projector.project(&strip(&[[70, 80, 90]])).unwrap();
        let mapping = DonutMapping::new(50, 1, 1);
        for (x, y, px) in donut.enumerate_pixels() {
            if mapping.sample(x, y).is_some() {
                assert_eq!(px.0, [70, 80, 90]);
            }
        }
    }

    #[test]
    fn test_radial_sentinel_exact() {
        let projector = RadialProjector { resolution: 60, origin: RadialOrigin::Center, reach: 0.5 };
        let source = gradient(200);
        let canvas = projector.project(&source).unwrap();
        let mapping = RadialMapping {
            resolution: 60,
            source_width: 200,
            source_height: 3,
            origin: RadialOrigin::Center,
            reach: 0.5,
        };
        let mut outside = 0;
        for (x, y, px) in canvas.enumerate_pixels() {
            if mapping.normalized_distance(x, y) > 1.0 {
                assert_eq!(px.0, SENTINEL);
                outside += 1;
            }
        }
        assert!(outside > 0);
    }

    #[test]
    fn test_radial_truncates_column() {
        let source = gradient(11);
        let projector = RadialProjector { resolution: 10, origin: RadialOrigin::Corner, reach: 1.0 };
        let canvas = projector.project(&source).unwrap();
        // d = 7 / (10 * sqrt 2) ~ 0.495, times 10 = 4.95 -> column 4
        assert_eq!(canvas.get_pixel(7, 0).0, [4, 0, 251]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_radial_samples_middle_row() {
        let source = Canvas::from_fn(4, 5, |_, y| image::Rgb([y as u8 * 10, 0, 0]));
        let projector = RadialProjector { resolution: 8, origin: RadialOrigin::Corner, reach: 1.0 };
        let canvas = projector.project(&source).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [20, 0, 0]));
    }

    #[test]
    fn test_radial_single_frame_fills_canvas() {
        for origin in [RadialOrigin::Corner, RadialOrigin::Center] {
            let projector = RadialProjector { resolution: 32, origin, reach: 1.0 };
            let canvas = projector.project(&strip(&[[5, 6, 7]])).unwrap();
            assert!(canvas.pixels().all(|p| p.0 == [5, 6, 7]));
        }
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let projector = RadialProjector { resolution: 0, origin: RadialOrigin::Corner, reach: 1.0 };
        assert!(matches!(projector.project(&gradient(4)), Err(PosterError::InvalidConfig(_))));
        let projector = DonutProjector { resolution: 0, rotation: Rotation::Deg0, background: [0, 0, 0] };
        assert!(matches!(projector.project(&gradient(4)), Err(PosterError::InvalidConfig(_))));
    }

    #[test]
    fn test_circle_slices_and_hole() {
        let renderer = CircleRenderer {
            resolution: 100,
            inner_radius_ratio: 0.25,
            rotation: Rotation::Deg0,
            background: [255, 255, 255],
        };
        let canvas = renderer.render(&QUAD).unwrap();
        assert_eq!(canvas.get_pixel(50, 50).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255]);
        // Slices run clockwise from 3 o'clock
        assert_eq!(canvas.get_pixel(90, 52).0, QUAD[0]);
        assert_eq!(canvas.get_pixel(48, 90).0, QUAD[1]);
        assert_eq!(canvas.get_pixel(10, 48).0, QUAD[2]);
        assert_eq!(canvas.get_pixel(52, 10).0, QUAD[3]);
    }
}
