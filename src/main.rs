// this_file: src/main.rs
//! imgdiff CLI - image difference detection and visualization tool

use anyhow::{bail, Result};
use clap::Parser;
use imgdiff::{imageio, logging, DiffConfig, Offset, Rect};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

/// Compare two images, align them, and highlight the differences
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First image path (reference)
    first: PathBuf,

    /// Second image path (target; the output is rendered on top of it)
    second: PathBuf,

    /// Output diff image path (.png, .jpg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum pixel offset to search for alignment
    #[arg(short = 'm', long, default_value_t = 10)]
    max_offset: i32,

    /// Color difference threshold (0-255)
    #[arg(short = 'd', long, default_value_t = 30)]
    threshold: u32,

    /// Number of worker threads for the offset search
    #[arg(short = 'c', long, default_value_t = default_workers())]
    workers: usize,

    /// Sampling rate for pixel comparison (1=all pixels, 2=every other pixel, ...)
    #[arg(short = 's', long, default_value_t = 4)]
    sampling: u32,

    /// Precise mode: disable the default progressive fast mode
    #[arg(short = 'p', long)]
    precise: bool,

    /// Disable the transparent overlay of the first image in diff areas
    #[arg(long)]
    no_overlay: bool,

    /// Overlay transparency (0.0=opaque, 1.0=transparent)
    #[arg(long, default_value_t = 0.95)]
    overlay_transparency: f64,

    /// Disable the color tint on the overlay
    #[arg(long)]
    no_tint: bool,

    /// Tint color as R,G,B (0-255 each)
    #[arg(long, default_value = "255,0,0")]
    tint_color: String,

    /// Tint strength (0.0=no tint, 1.0=full tint)
    #[arg(long, default_value_t = 0.05)]
    tint_strength: f64,

    /// Tint transparency (0.0=opaque, 1.0=transparent)
    #[arg(long, default_value_t = 0.2)]
    tint_transparency: f64,

    /// Exit with status code 1 if differences are found (skips the diff image)
    #[arg(short = 'e', long)]
    exit_on_diff: bool,

    /// Write a JSON comparison report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, conflicts_with = "log_level")]
    quiet: bool,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(4, |n| n.get())
}

/// Machine-readable summary of one comparison.
#[derive(Serialize)]
struct Report {
    first: String,
    second: String,
    offset: Offset,
    alignment_score: f64,
    differences_found: bool,
    regions: Vec<Rect>,
    config: DiffConfig,
}

fn build_config(cli: &Cli) -> DiffConfig {
    DiffConfig {
        max_offset: cli.max_offset,
        threshold: cli.threshold,
        workers: cli.workers,
        sampling_rate: cli.sampling,
        fast_mode: !cli.precise,
        overlay_enabled: !cli.no_overlay,
        overlay_transparency: cli.overlay_transparency,
        tint: imgdiff::parse_tint_color(&cli.tint_color),
        tint_enabled: !cli.no_tint,
        tint_strength: cli.tint_strength,
        tint_transparency: cli.tint_transparency,
    }
    .clamped()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.quiet);

    if cli.output.is_none() && !cli.exit_on_diff && cli.report.is_none() {
        bail!("either --output, --report or --exit-on-diff is required");
    }

    let total = logging::Timer::new("total processing");
    let cfg = build_config(&cli);

    info!("Loading images");
    let img_a = imageio::load_image(&cli.first)?;
    let img_b = imageio::load_image(&cli.second)?;

    info!("Image A: {} ({}x{})", cli.first.display(), img_a.width(), img_a.height());
    info!("Image B: {} ({}x{})", cli.second.display(), img_b.width(), img_b.height());
    if img_a.dimensions() != img_b.dimensions() {
        warn!("Image dimensions do not match");
    }

    let offset = imgdiff::find_best_alignment(&img_a, &img_b, &cfg)?;
    println!("Detected offset: ({}, {})", offset.dx, offset.dy);

    let has_diff = imgdiff::has_differences(&img_a, &img_b, offset, &cfg);
    if has_diff {
        info!("Differences detected at the chosen offset");
    } else {
        info!("No differences detected at the chosen offset");
    }

    let needs_regions = cli.report.is_some() || (cli.output.is_some() && !cli.exit_on_diff);
    let regions = if needs_regions {
        imgdiff::detect_diff_regions(&img_a, &img_b, offset, &cfg)
    } else {
        Vec::new()
    };

    if let Some(report_path) = &cli.report {
        let report = Report {
            first: cli.first.display().to_string(),
            second: cli.second.display().to_string(),
            offset,
            alignment_score: imgdiff::similarity_score(
                &img_a,
                &img_b,
                offset.dx,
                offset.dy,
                cfg.sampling_rate,
                cfg.threshold,
            ),
            differences_found: has_diff,
            regions: regions.clone(),
            config: cfg.clone(),
        };
        std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
        info!("Report written to {}", report_path.display());
    }

    if cli.exit_on_diff {
        if has_diff {
            info!("Differences detected. Exiting with status code 1.");
            std::process::exit(1);
        }
        total.log_elapsed(log::Level::Info);
        return Ok(());
    }

    if let Some(output) = &cli.output {
        let diff_image = imgdiff::render_diff_image(&img_a, &img_b, offset, &regions, &cfg);
        imageio::save_image(&diff_image, output)?;
        println!("Diff image saved to {}", output.display());
    }

    total.log_elapsed(log::Level::Info);
    Ok(())
}
