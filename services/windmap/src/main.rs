//! Wind map generator.
//!
//! Builds a synthetic wind field over a lon/lat box, traces evenly spaced
//! streamlines through it and animates dashes flowing along them on a
//! Lambert conformal map. Writes:
//! - `quiver.png`: arrows of the raw field
//! - `wind.mp4`: the animation through ffmpeg
//! - `wind.gif`: the animation through ImageMagick or the native encoder

mod config;
mod encoder;
mod export;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{GifBackend, Overrides, WindmapConfig};
use encoder::{FfmpegEncoder, FrameEncoder, ImageMagickEncoder, NativeGifEncoder};
use export::{export_all, render_frames, ExportJob, ProgressTracker};
use renderer::{render_quiver, Coastline, MapCanvas, WindAnimation};
use wind_field::{Grid, StreamlineExtractor, VectorField};

#[derive(Parser, Debug)]
#[command(name = "windmap")]
#[command(about = "Animated streamline wind map renderer")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "WINDMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for quiver.png, wind.mp4 and wind.gif
    #[arg(short, long, env = "WINDMAP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of animation frames (at most 300)
    #[arg(long)]
    frames: Option<usize>,

    /// Seed for the streamline phase offsets
    #[arg(long, env = "WINDMAP_SEED")]
    seed: Option<u64>,

    /// GIF encoder
    #[arg(long, value_enum)]
    gif_backend: Option<GifBackend>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = WindmapConfig::load_or_default(args.config.as_deref())?;
    config.apply(Overrides {
        output_dir: args.output_dir,
        frames: args.frames,
        seed: args.seed,
        gif_backend: args.gif_backend,
    });
    config.validate()?;

    run(&config)
}

fn run(config: &WindmapConfig) -> Result<()> {
    let bbox = config.region.bbox();
    info!(
        lon_min = bbox.min_x,
        lon_max = bbox.max_x,
        lat_min = bbox.min_y,
        lat_max = bbox.max_y,
        rows = config.grid.rows,
        cols = config.grid.cols,
        "Starting wind map"
    );

    std::fs::create_dir_all(&config.output.dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output.dir.display()
        )
    })?;

    // Field
    let grid = Grid::meshgrid(&bbox, config.grid.rows, config.grid.cols)?;
    let field = VectorField::synthetic(&grid, &bbox);
    info!(max_speed = field.max_speed(), "Generated wind field");

    let quiver_path = config.output.quiver_path();
    match render_quiver(&field, &config.quiver).and_then(|frame| frame.write_png(&quiver_path)) {
        Ok(()) => info!(path = %quiver_path.display(), "Wrote quiver plot"),
        Err(e) => warn!(path = %quiver_path.display(), error = %e, "Quiver plot failed"),
    }

    // Streamlines
    let streamlines = config
        .streamlines
        .extract(&grid, &field)
        .context("Streamline extraction failed")?;
    if streamlines.is_empty() {
        warn!("No streamlines extracted; the animation will show an empty map");
    }

    let canvas = build_canvas(config)?;

    // Animation
    let mut rng = match config.animation.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut animation = WindAnimation::new(canvas, &config.animation);
    animation.add_streamlines(&streamlines, &mut rng);
    info!(
        frames = config.animation.frames,
        interval_ms = config.animation.interval_ms,
        lines = animation.line_count(),
        segments = animation.segment_count(),
        "Rendering animation"
    );

    // Closed after both exports, or on drop if rendering fails
    let mut progress = ProgressTracker::new("animation", config.animation.frames);
    let frames = render_frames(&mut animation, config.animation.frames, &mut progress)?;

    // Export
    let gif_encoder: Box<dyn FrameEncoder> = match config.encoders.gif_backend {
        GifBackend::Imagemagick => Box::new(ImageMagickEncoder::new(&config.encoders.convert)),
        GifBackend::Native => Box::new(NativeGifEncoder),
    };
    let jobs = vec![
        ExportJob::new(
            Box::new(FfmpegEncoder::new(&config.encoders.ffmpeg)),
            config.encoders.video_fps,
            config.output.video_path(),
        ),
        ExportJob::new(gif_encoder, config.encoders.gif_fps, config.output.gif_path()),
    ];
    let outcomes = export_all(&frames, &jobs);
    progress.finish();

    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
    if !failed.is_empty() {
        let names: Vec<String> = failed
            .iter()
            .map(|o| format!("{} ({})", o.path.display(), o.encoder))
            .collect();
        bail!("{} of {} exports failed: {}", failed.len(), outcomes.len(), names.join(", "));
    }

    info!(dir = %config.output.dir.display(), "Wind map complete");
    Ok(())
}

/// Projected map background with graticule and coastline.
///
/// A configured coastline file replaces the bundled outline. If the file
/// cannot be read the map is drawn without a coastline.
fn build_canvas(config: &WindmapConfig) -> Result<MapCanvas> {
    let bbox = config.region.bbox();
    let mut canvas = MapCanvas::lambert(&bbox, config.canvas.clone())?;
    if let Some(step) = config.canvas.graticule_step {
        canvas.draw_graticule(&bbox, step)?;
    }
    let coastline = match &config.region.coastline {
        Some(path) => Coastline::load(path),
        None => Coastline::bundled(),
    };
    match coastline {
        Ok(coastline) => canvas.draw_coastline(&coastline)?,
        Err(e) => warn!(error = %e, "Skipping coastline"),
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::Frame;

    fn small_config() -> WindmapConfig {
        let mut config = WindmapConfig::default();
        config.canvas.width = 400;
        config.canvas.height = 300;
        config
    }

    fn background(canvas: &MapCanvas) -> Frame {
        Frame::from_pixmap(&canvas.blank_frame())
    }

    fn graticule_only(config: &WindmapConfig) -> Frame {
        let bbox = config.region.bbox();
        let mut canvas = MapCanvas::lambert(&bbox, config.canvas.clone()).unwrap();
        if let Some(step) = config.canvas.graticule_step {
            canvas.draw_graticule(&bbox, step).unwrap();
        }
        background(&canvas)
    }

    #[test]
    fn test_default_canvas_draws_coastline() {
        let config = small_config();
        let canvas = build_canvas(&config).unwrap();
        assert_ne!(background(&canvas), graticule_only(&config));
    }

    #[test]
    fn test_coastline_file_overrides_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coast.geojson");
        std::fs::write(&path, test_utils::COASTLINE_GEOJSON).unwrap();

        let default = build_canvas(&small_config()).unwrap();
        let mut config = small_config();
        config.region.coastline = Some(path);
        let custom = build_canvas(&config).unwrap();

        assert_ne!(background(&custom), background(&default));
        assert_ne!(background(&custom), graticule_only(&config));
    }

    #[test]
    fn test_unreadable_coastline_is_skipped() {
        let mut config = small_config();
        config.region.coastline = Some(PathBuf::from("/nonexistent/coast.geojson"));
        let canvas = build_canvas(&config).unwrap();
        assert_eq!(background(&canvas), graticule_only(&config));
    }
}
