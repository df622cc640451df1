//! Animated streamlines on a map canvas.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use wind_field::Streamline;

use crate::canvas::MapCanvas;
use crate::dash::{Rgb, SegmentSet, DEFAULT_DASH_DENSITY, DEFAULT_LENGTH_STEP};
use crate::error::RenderError;
use crate::frame::Frame;

/// Animation timing and dash styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of frames to render
    pub frames: usize,
    /// Nominal delay between frames in milliseconds (informational; encoders
    /// use their own frame rates)
    pub interval_ms: u64,
    /// Colour cycles per unit arc length
    pub dash_density: f64,
    /// Arc length added per frame
    pub length_step: f64,
    /// Streamline stroke width in points
    pub line_width: f32,
    /// Seed for the per-streamline phase offsets; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 27,
            interval_ms: 20,
            dash_density: DEFAULT_DASH_DENSITY,
            length_step: DEFAULT_LENGTH_STEP,
            line_width: 0.5,
            seed: None,
        }
    }
}

/// One registered streamline: its dash state plus its segments in pixels.
#[derive(Debug)]
struct AnimatedLine {
    segments: SegmentSet,
    pixels: Vec<((f32, f32), (f32, f32))>,
}

/// Streamlines registered on a canvas, advanced one frame at a time.
#[derive(Debug)]
pub struct WindAnimation {
    canvas: MapCanvas,
    lines: Vec<AnimatedLine>,
    dash_density: f64,
    length_step: f64,
    line_width_px: f32,
    frames_advanced: usize,
}

impl WindAnimation {
    pub fn new(canvas: MapCanvas, config: &AnimationConfig) -> Self {
        let line_width_px = canvas.config().points_to_pixels(config.line_width);
        Self {
            canvas,
            lines: Vec::new(),
            dash_density: config.dash_density,
            length_step: config.length_step,
            line_width_px,
            frames_advanced: 0,
        }
    }

    /// Register a streamline given in lon/lat, drawing its phase from `rng`.
    pub fn add_streamline<R: Rng + ?Sized>(
        &mut self,
        streamline: &Streamline,
        rng: &mut R,
    ) -> &SegmentSet {
        let segments = SegmentSet::from_streamline(streamline, self.dash_density, rng);
        self.push(segments)
    }

    /// Register a streamline with an explicit phase offset.
    pub fn add_streamline_with_phase(&mut self, streamline: &Streamline, phase: f64) -> &SegmentSet {
        let segments = SegmentSet::with_phase(streamline, self.dash_density, phase);
        self.push(segments)
    }

    pub fn add_streamlines<R: Rng + ?Sized>(&mut self, streamlines: &[Streamline], rng: &mut R) {
        for streamline in streamlines {
            self.add_streamline(streamline, rng);
        }
        debug!(
            lines = self.lines.len(),
            segments = self.segment_count(),
            "Registered streamlines"
        );
    }

    fn push(&mut self, segments: SegmentSet) -> &SegmentSet {
        let pixels = segments
            .segments()
            .iter()
            .map(|[a, b]| (self.canvas.geo_to_pixel(a.x, a.y), self.canvas.geo_to_pixel(b.x, b.y)))
            .collect();
        self.lines.push(AnimatedLine { segments, pixels });
        let last = self.lines.len() - 1;
        &self.lines[last].segments
    }

    /// Per-frame update: shift every streamline's dashes by one step.
    pub fn update(&mut self, frame_no: usize) {
        for line in &mut self.lines {
            line.segments.advance(self.length_step);
        }
        self.frames_advanced += 1;
        trace!(frame = frame_no, "Advanced dashes");
    }

    /// Draw the current state.
    pub fn render(&self) -> Result<Frame, RenderError> {
        let mut pixmap = self.canvas.blank_frame();

        for line in &self.lines {
            for (&(from, to), color) in line.pixels.iter().zip(line.segments.colors()) {
                self.canvas
                    .stroke_segment(&mut pixmap, from, to, rgb_to_rgba8(color), self.line_width_px);
            }
        }

        self.canvas.draw_frame_border(&mut pixmap)?;
        Ok(Frame::from_pixmap(&pixmap))
    }

    pub fn canvas(&self) -> &MapCanvas {
        &self.canvas
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(|l| l.segments.len()).sum()
    }

    pub fn segment_sets(&self) -> impl Iterator<Item = &SegmentSet> {
        self.lines.iter().map(|l| &l.segments)
    }

    /// How many times [`update`](Self::update) has run.
    pub fn frames_advanced(&self) -> usize {
        self.frames_advanced
    }

    pub fn length_step(&self) -> f64 {
        self.length_step
    }
}

fn rgb_to_rgba8(color: &Rgb) -> [u8; 4] {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color[0]), channel(color[1]), channel(color[2]), 255]
}
