//! Colour-of-motion poster CLI
//!
//! Renders poster images from a frame-summary file (a JSON array of
//! `{"average_color": [r, g, b], "brightness": ...}` records produced by
//! the frame-sampling stage).
//!
//! ## YAML config file
//!
//! ```yaml
//! posters: [vertical-cinematic, donut]
//! resolution: 4000
//! similarity_threshold: 30
//! feather_radius: 3
//! rotation: 270
//! ```
//!
//! Run with: `motion-poster -i frames/data.json -o outputs/film --config poster.yaml`
//!
//! ## Inline selection
//!
//!   motion-poster -i data.json -o out -p donut -p radial --resolution 3000
//!
//! Values are layered: variant defaults, then the config file, then flags.
//!
//! ## Graceful interruption
//!
//! Each poster is written as soon as it renders. Press Ctrl+C to stop after
//! the current poster; finished files are kept.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use poster_core::{
    Companion, FrameSeries, PosterAssembler, PosterVariant, RadialOrigin, RenderConfig,
    ResizeFilter, Rgb, Rotation,
};

/// YAML config file format; every field is optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    posters: Vec<PosterVariant>,
    #[serde(flatten)]
    overrides: ConfigOverrides,
}

/// Partial [`RenderConfig`], layered over a variant's defaults
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigOverrides {
    width: Option<u32>,
    height: Option<u32>,
    resolution: Option<u32>,
    stripe_width: Option<u32>,
    stripe_height: Option<u32>,
    band_height: Option<u32>,
    resize: Option<ResizeFilter>,
    similarity_threshold: Option<f64>,
    min_width_ratio: Option<f64>,
    max_width_ratio: Option<f64>,
    feather_radius: Option<f32>,
    rotation: Option<Rotation>,
    radial_origin: Option<RadialOrigin>,
    radial_reach: Option<f64>,
    inner_radius_ratio: Option<f64>,
    background: Option<Rgb>,
}

impl ConfigOverrides {
    /// Fields set in `other` win
    fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            resolution: other.resolution.or(self.resolution),
            stripe_width: other.stripe_width.or(self.stripe_width),
            stripe_height: other.stripe_height.or(self.stripe_height),
            band_height: other.band_height.or(self.band_height),
            resize: other.resize.or(self.resize),
            similarity_threshold: other.similarity_threshold.or(self.similarity_threshold),
            min_width_ratio: other.min_width_ratio.or(self.min_width_ratio),
            max_width_ratio: other.max_width_ratio.or(self.max_width_ratio),
            feather_radius: other.feather_radius.or(self.feather_radius),
            rotation: other.rotation.or(self.rotation),
            radial_origin: other.radial_origin.or(self.radial_origin),
            radial_reach: other.radial_reach.or(self.radial_reach),
            inner_radius_ratio: other.inner_radius_ratio.or(self.inner_radius_ratio),
            background: other.background.or(self.background),
        }
    }

    fn apply(&self, variant: PosterVariant) -> RenderConfig {
        let mut c = RenderConfig::for_variant(variant);
        if let Some(v) = self.width { c.width = v; }
        if let Some(v) = self.height { c.height = v; }
        if let Some(v) = self.resolution { c.resolution = v; }
        if let Some(v) = self.stripe_width { c.stripe_width = v; }
        if let Some(v) = self.stripe_height { c.stripe_height = v; }
        if let Some(v) = self.band_height { c.band_height = v; }
        if let Some(v) = self.resize { c.resize = v; }
        if let Some(v) = self.similarity_threshold { c.similarity_threshold = v; }
        if let Some(v) = self.min_width_ratio { c.min_width_ratio = v; }
        if let Some(v) = self.max_width_ratio { c.max_width_ratio = v; }
        if let Some(v) = self.feather_radius { c.feather_radius = v; }
        if let Some(v) = self.rotation { c.rotation = v; }
        if let Some(v) = self.radial_origin { c.radial_origin = v; }
        if let Some(v) = self.radial_reach { c.radial_reach = v; }
        if let Some(v) = self.inner_radius_ratio { c.inner_radius_ratio = v; }
        if let Some(v) = self.background { c.background = v; }
        c
    }
}

fn load_config_file(path: &PathBuf) -> anyhow::Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {:?}", path))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {:?}", path))
}

fn load_series(path: &Path) -> anyhow::Result<FrameSeries> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read frame summaries: {:?}", path))?;
    FrameSeries::from_json(&contents)
        .with_context(|| format!("failed to load frame summaries: {:?}", path))
}

/// Load a previously rendered linear poster. Read failures are handed to
/// the core, which falls back to a single frame and reports a warning.
fn load_companion(path: &Path) -> Companion {
    match image::open(path) {
        Ok(img) => Companion::Provided(img.to_rgb8()),
        Err(e) => Companion::Unreadable(format!("{}: {}", path.display(), e)),
    }
}

#[derive(Parser, Debug)]
#[command(name = "motion-poster")]
#[command(about = "Render colour-of-motion posters from frame colour summaries", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Frame-summary JSON file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "outputs")]
    output: PathBuf,

    /// Poster variant to render (repeatable)
    #[arg(short = 'p', long = "poster")]
    posters: Vec<PosterVariant>,

    /// Render every poster variant
    #[arg(long)]
    all: bool,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width for linear and vertical posters
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height for linear and vertical posters
    #[arg(long)]
    height: Option<u32>,

    /// Side length of polar posters
    #[arg(long)]
    resolution: Option<u32>,

    /// Colour distance below which adjacent frames merge into one band
    #[arg(long)]
    threshold: Option<f64>,

    /// Edge feather radius in pixels (0 disables)
    #[arg(long)]
    feather_radius: Option<f32>,

    /// Clockwise rotation of polar posters: 0 | 90 | 180 | 270
    #[arg(long)]
    rotation: Option<Rotation>,

    /// Strip resampling: smooth | none
    #[arg(long)]
    resize: Option<ResizeFilter>,

    /// Radial poster origin: corner | center
    #[arg(long)]
    radial_origin: Option<RadialOrigin>,

    /// Previously rendered linear poster to use as the polar source
    #[arg(long)]
    companion: Option<PathBuf>,

    /// Render every variant from a synthetic series and report timings
    #[arg(long)]
    benchmark: bool,

    /// Number of frames in the benchmark series
    #[arg(long, default_value = "2000")]
    bench_frames: usize,

    /// Seed for the benchmark series
    #[arg(long, default_value = "0")]
    seed: u64,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            width: self.width,
            height: self.height,
            resolution: self.resolution,
            similarity_threshold: self.threshold,
            feather_radius: self.feather_radius,
            rotation: self.rotation,
            resize: self.resize,
            radial_origin: self.radial_origin,
            ..ConfigOverrides::default()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    // Config file first, so flags can override it
    let file = args.config.as_ref().map(load_config_file).transpose()?.unwrap_or_default();
    let overrides = file.overrides.merge(args.overrides());

    if args.benchmark {
        return run_benchmark(&args, &overrides);
    }

    let input = args.input.as_ref()
        .ok_or_else(|| anyhow::anyhow!("Input file required (use -i/--input)"))?;

    let posters = if args.all {
        PosterVariant::ALL.to_vec()
    } else if !args.posters.is_empty() {
        args.posters.clone()
    } else if !file.posters.is_empty() {
        file.posters.clone()
    } else {
        anyhow::bail!("no posters selected (use -p/--poster, --all, or `posters` in the config file)");
    };

    tracing::info!(input = %input.display(), "loading frame summaries");
    let series = load_series(input)?;
    tracing::info!(frames = series.len(), "loaded frame summaries");

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory: {:?}", args.output))?;

    let assembler = match &args.companion {
        Some(path) => {
            if !posters.iter().any(|v| v.is_polar()) {
                tracing::warn!(companion = %path.display(), "no donut or radial poster selected, companion unused");
            }
            PosterAssembler::new().with_companion(load_companion(path))
        }
        None => PosterAssembler::new(),
    };

    let progress = ProgressBar::new(posters.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = 0usize;
    let mut failed = Vec::new();

    for &variant in &posters {
        if interrupted.load(Ordering::Relaxed) {
            progress.abandon_with_message("Interrupted");
            tracing::warn!(written, total = posters.len(), "interrupted, keeping finished posters");
            break;
        }
        progress.set_message(variant.name());

        match render_one(&assembler, &series, variant, &overrides.apply(variant), &args.output) {
            Ok(path) => {
                written += 1;
                tracing::info!(poster = %variant, path = %path.display(), "saved poster");
            }
            Err(e) => {
                // One failed poster must not stop the rest
                tracing::error!(poster = %variant, "{:#}", e);
                failed.push(variant);
            }
        }
        progress.inc(1);
    }

    if !interrupted.load(Ordering::Relaxed) {
        progress.finish_with_message("done");
    }

    if written == 0 && !failed.is_empty() {
        anyhow::bail!("every poster failed to render");
    }
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|v| v.name()).collect();
        tracing::warn!("{} poster(s) failed: {}", failed.len(), names.join(", "));
    }
    Ok(())
}

/// Render a single poster and write it into `output_dir`
fn render_one(
    assembler: &PosterAssembler,
    series: &FrameSeries,
    variant: PosterVariant,
    config: &RenderConfig,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let poster = assembler.render(series, variant, config)?;
    for warning in &poster.warnings {
        tracing::warn!(poster = %variant, "{}", warning);
    }
    let path = output_dir.join(variant.file_name());
    poster.canvas.save(&path)
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(path)
}

/// Render every variant from a synthetic series and print timings
fn run_benchmark(args: &Args, overrides: &ConfigOverrides) -> anyhow::Result<()> {
    let series = FrameSeries::synthetic(args.bench_frames, args.seed)?;
    let assembler = PosterAssembler::new();

    println!("\n=== Poster Benchmark ===");
    println!("Frames: {}", series.len());
    println!("Seed: {}", args.seed);
    println!();
    println!("{:>30} {:>12} {:>10}", "poster", "size", "ms");

    let mut total = Duration::ZERO;
    for variant in PosterVariant::ALL {
        let config = overrides.apply(variant);
        let start = Instant::now();
        let poster = assembler.render(&series, variant, &config)?;
        let elapsed = start.elapsed();
        total += elapsed;
        let (w, h) = poster.canvas.dimensions();
        println!(
            "{:>30} {:>12} {:>10.1}",
            variant.name(),
            format!("{}x{}", w, h),
            elapsed.as_secs_f64() * 1000.0,
        );
    }
    println!();
    println!("Total: {:.1} ms", total.as_secs_f64() * 1000.0);
    Ok(())
}
