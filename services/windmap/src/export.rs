//! Frame production and export.
//!
//! Frames are rendered once and then handed to every export job in turn.
//! Jobs are independent: each reports its own result.

use std::path::PathBuf;
use std::time::Instant;

use renderer::{Frame, RenderError, WindAnimation};
use tracing::{debug, error, info};

use crate::encoder::{EncodeError, FrameEncoder};

/// Frame progress for one rendering pass.
///
/// Closed explicitly with [`finish`](Self::finish) or implicitly on drop.
#[derive(Debug)]
pub struct ProgressTracker {
    label: String,
    total: usize,
    current: usize,
    started_at: Instant,
    closed: bool,
}

impl ProgressTracker {
    pub fn new(label: impl Into<String>, total: usize) -> Self {
        let label = label.into();
        info!(task = %label, total, "Started");
        Self {
            label,
            total,
            current: 0,
            started_at: Instant::now(),
            closed: false,
        }
    }

    pub fn advance(&mut self) {
        self.current += 1;
        debug!(
            task = %self.label,
            current = self.current,
            total = self.total,
            percent = ?self.percent_complete(),
            "Progress"
        );
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn percent_complete(&self) -> Option<f64> {
        (self.total > 0).then(|| self.current as f64 / self.total as f64 * 100.0)
    }

    pub fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!(
            task = %self.label,
            completed = self.current,
            total = self.total,
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "Finished"
        );
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Run the animation for `frames` frames and collect the rendered images.
///
/// Each frame applies the update rule and then renders. With zero frames
/// the update rule never runs and the initial state is the only frame.
pub fn render_frames(
    animation: &mut WindAnimation,
    frames: usize,
    progress: &mut ProgressTracker,
) -> Result<Vec<Frame>, RenderError> {
    if frames == 0 {
        return Ok(vec![animation.render()?]);
    }

    let mut rendered = Vec::with_capacity(frames);
    for frame_no in 0..frames {
        animation.update(frame_no);
        progress.advance();
        rendered.push(animation.render()?);
    }
    Ok(rendered)
}

/// One output file to produce from the frame sequence.
pub struct ExportJob {
    pub encoder: Box<dyn FrameEncoder>,
    pub fps: u32,
    pub path: PathBuf,
}

impl ExportJob {
    pub fn new(encoder: Box<dyn FrameEncoder>, fps: u32, path: PathBuf) -> Self {
        Self { encoder, fps, path }
    }
}

/// Result of one export job.
#[derive(Debug)]
pub struct ExportOutcome {
    pub encoder: String,
    pub path: PathBuf,
    pub result: Result<(), EncodeError>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every job on the same frames. A failing job is logged and does not
/// stop the others.
pub fn export_all(frames: &[Frame], jobs: &[ExportJob]) -> Vec<ExportOutcome> {
    jobs.iter()
        .map(|job| {
            let encoder = job.encoder.name().to_string();
            info!(
                encoder = %encoder,
                path = %job.path.display(),
                fps = job.fps,
                frames = frames.len(),
                "Exporting"
            );
            let result = job.encoder.encode(frames, job.fps, &job.path);
            if let Err(e) = &result {
                error!(encoder = %encoder, path = %job.path.display(), error = %e, "Export failed");
            }
            ExportOutcome {
                encoder,
                path: job.path.clone(),
                result,
            }
        })
        .collect()
}
