//! Run configuration.
//!
//! Everything has a default, so an empty (or absent) YAML file reproduces
//! the standard wind map. CLI flags are applied on top.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use renderer::{AnimationConfig, CanvasConfig, QuiverConfig};
use serde::Deserialize;
use tracing::debug;
use wind_field::{BoundingBox, EvenlySpacedStreamlines};

/// Upper bound on animation frames. Every frame is held in memory until
/// both exports finish, about 2.4 MB each at the default canvas size.
pub const MAX_FRAMES: usize = 300;

/// Root configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindmapConfig {
    pub region: RegionConfig,
    pub grid: GridConfig,
    pub streamlines: EvenlySpacedStreamlines,
    pub animation: AnimationConfig,
    pub canvas: CanvasConfig,
    pub quiver: QuiverConfig,
    pub output: OutputConfig,
    pub encoders: EncoderConfig,
}

/// Geographic region and overlays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    /// GeoJSON coastline drawn under the streamlines
    pub coastline: Option<PathBuf>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            lon_min: 120.0,
            lon_max: 160.0,
            lat_min: 20.0,
            lat_max: 45.0,
            coastline: None,
        }
    }
}

impl RegionConfig {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_extent(self.lon_min, self.lon_max, self.lat_min, self.lat_max)
    }
}

/// Sampling grid size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 100, cols: 100 }
    }
}

/// Output file locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub video: String,
    pub gif: String,
    pub quiver: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            video: "wind.mp4".to_string(),
            gif: "wind.gif".to_string(),
            quiver: "quiver.png".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn video_path(&self) -> PathBuf {
        self.dir.join(&self.video)
    }

    pub fn gif_path(&self) -> PathBuf {
        self.dir.join(&self.gif)
    }

    pub fn quiver_path(&self) -> PathBuf {
        self.dir.join(&self.quiver)
    }
}

/// Which encoder writes the GIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GifBackend {
    /// ImageMagick `convert`
    Imagemagick,
    /// In-process encoder
    Native,
}

/// External programs and frame rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg: PathBuf,
    pub convert: PathBuf,
    pub video_fps: u32,
    pub gif_fps: u32,
    pub gif_backend: GifBackend,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            convert: PathBuf::from("convert"),
            video_fps: 60,
            gif_fps: 30,
            gif_backend: GifBackend::Imagemagick,
        }
    }
}

/// Values given on the command line; `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub frames: Option<usize>,
    pub seed: Option<u64>,
    pub gif_backend: Option<GifBackend>,
}

impl WindmapConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded windmap config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.output_dir {
            self.output.dir = dir;
        }
        if let Some(frames) = overrides.frames {
            self.animation.frames = frames;
        }
        if let Some(seed) = overrides.seed {
            self.animation.seed = Some(seed);
        }
        if let Some(backend) = overrides.gif_backend {
            self.encoders.gif_backend = backend;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.region
            .bbox()
            .validate()
            .context("Invalid region")?;
        if self.grid.rows < 2 || self.grid.cols < 2 {
            bail!(
                "grid must be at least 2x2, got {}x{}",
                self.grid.rows,
                self.grid.cols
            );
        }
        if self.animation.frames > MAX_FRAMES {
            bail!(
                "at most {} frames can be rendered, got {}",
                MAX_FRAMES,
                self.animation.frames
            );
        }
        if self.encoders.video_fps == 0 || self.encoders.gif_fps == 0 {
            bail!("frame rates must be positive");
        }
        Ok(())
    }
}
