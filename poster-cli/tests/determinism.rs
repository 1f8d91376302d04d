//! End-to-end tests verifying deterministic poster output.
//!
//! These tests ensure that the same frame series and config always
//! produce byte-identical posters, and that one failing poster does not
//! affect the others.

use poster_core::{
    Companion, FrameSeries, PosterAssembler, PosterError, PosterVariant, RenderConfig,
};

/// Variant defaults shrunk so the full set renders quickly
fn small_config(variant: PosterVariant) -> RenderConfig {
    let mut config = RenderConfig::for_variant(variant);
    config.width = 120;
    config.height = 90;
    config.resolution = 64;
    config.band_height = 2;
    config
}

fn render(assembler: &PosterAssembler, series: &FrameSeries, variant: PosterVariant) -> image::RgbImage {
    assembler
        .render(series, variant, &small_config(variant))
        .unwrap_or_else(|e| panic!("{} failed: {}", variant, e))
        .canvas
}

fn assert_images_equal(expected: &image::RgbImage, actual: &image::RgbImage, name: &str) {
    assert_eq!(
        expected.dimensions(),
        actual.dimensions(),
        "{}: dimensions mismatch",
        name
    );

    let expected_bytes = expected.as_raw();
    let actual_bytes = actual.as_raw();

    assert_eq!(
        expected_bytes, actual_bytes,
        "{}: pixel data mismatch",
        name
    );
}

#[test]
fn test_every_variant_is_deterministic() {
    let series = FrameSeries::synthetic(150, 7).unwrap();
    let assembler = PosterAssembler::new();
    for variant in PosterVariant::ALL {
        let a = render(&assembler, &series, variant);
        let b = render(&assembler, &series, variant);
        assert_images_equal(&a, &b, variant.name());
    }
}

#[test]
fn test_synthetic_series_is_seeded() {
    let a = FrameSeries::synthetic(80, 42).unwrap();
    let b = FrameSeries::synthetic(80, 42).unwrap();
    let c = FrameSeries::synthetic(80, 43).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);

    let assembler = PosterAssembler::new();
    let pa = render(&assembler, &a, PosterVariant::VerticalCinematic);
    let pb = render(&assembler, &b, PosterVariant::VerticalCinematic);
    assert_images_equal(&pa, &pb, "vertical_cinematic_seed42");
}

#[test]
fn test_output_dimensions() {
    let series = FrameSeries::synthetic(60, 1).unwrap();
    let assembler = PosterAssembler::new();
    for variant in PosterVariant::ALL {
        let canvas = render(&assembler, &series, variant);
        let expected = match variant {
            PosterVariant::Donut | PosterVariant::Radial | PosterVariant::Circle => (64, 64),
            _ => (120, 90),
        };
        assert_eq!(canvas.dimensions(), expected, "{}", variant);
    }
}

#[test]
fn test_render_all_isolates_failures() {
    // Plain colours: no brightness, so only the brightness poster fails
    let series = FrameSeries::from_colors(&[[255, 0, 0], [0, 255, 0], [0, 0, 255]]).unwrap();
    let assembler = PosterAssembler::new();
    let results = assembler.render_all(&series, &[
        PosterVariant::VerticalCinematicBrightness,
        PosterVariant::Linear,
    ]);

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0].1, Err(PosterError::InvalidInput(_))));
    let linear = results[1].1.as_ref().unwrap();
    assert_eq!(linear.canvas.dimensions(), (4000, 1000));
}

#[test]
fn test_unreadable_companion_matches_single_frame_source() {
    let series = FrameSeries::synthetic(40, 3).unwrap();
    let broken = PosterAssembler::new()
        .with_companion(Companion::Unreadable("missing.png".into()));
    let first = image::RgbImage::from_pixel(1, 1, image::Rgb(series.first().color));
    let provided = PosterAssembler::new().with_companion(Companion::Provided(first));

    let config = small_config(PosterVariant::Donut);
    let fallback = broken.render(&series, PosterVariant::Donut, &config).unwrap();
    let explicit = provided.render(&series, PosterVariant::Donut, &config).unwrap();

    assert_eq!(fallback.warnings.len(), 1);
    assert!(explicit.warnings.is_empty());
    assert_images_equal(&explicit.canvas, &fallback.canvas, "donut_fallback");
}

#[test]
fn test_json_input_renders() {
    let json = r#"[
        {"average_color": [10.4, 20.6, 30.0], "brightness": 0.1},
        {"average_color": [200, 100, 50], "brightness": 0.9},
        {"average_color": [201, 101, 51], "brightness": 0.5}
    ]"#;
    let series = FrameSeries::from_json(json).unwrap();
    assert_eq!(series.first().color, [10, 21, 30]);

    let assembler = PosterAssembler::new();
    for variant in PosterVariant::ALL {
        assert!(assembler.render(&series, variant, &small_config(variant)).is_ok(), "{}", variant);
    }
}
