//! Quiver plots of a vector field.
//!
//! A diagnostic view: arrows on a plain index-space plot, every `stride`-th
//! grid sample on both axes, with row 0 at the bottom. Arrow length is
//! `|(u, v)| / scale` plot widths, so a vector of magnitude `scale` spans
//! the whole plot.

use serde::{Deserialize, Serialize};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::debug;
use wind_field::VectorField;

use crate::canvas::parse_hex_color;
use crate::error::RenderError;
use crate::frame::Frame;

/// Shaft width as a fraction of the plot width.
const SHAFT_WIDTH_FRACTION: f32 = 0.005;
/// Head length in shaft widths.
const HEAD_LENGTH: f32 = 5.0;
/// Head width in shaft widths.
const HEAD_WIDTH: f32 = 3.0;

/// Configuration for quiver rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuiverConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Plot inset from the image edge in pixels
    pub margin: f32,
    /// Sample every `stride`-th grid point on both axes
    pub stride: usize,
    /// Data units per plot width
    pub scale: f64,
    /// Arrow colour (hex)
    pub color: String,
    /// Background colour (hex)
    pub background: String,
}

impl Default for QuiverConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            margin: 40.0,
            stride: 4,
            scale: 100.0,
            color: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

/// Render the decimated field as arrows.
pub fn render_quiver(field: &VectorField, config: &QuiverConfig) -> Result<Frame, RenderError> {
    if !(config.scale.is_finite() && config.scale > 0.0) {
        return Err(RenderError::InvalidCanvas(format!(
            "quiver scale must be positive, got {}",
            config.scale
        )));
    }

    let mut pixmap = Pixmap::new(config.width, config.height).ok_or(
        RenderError::CanvasAllocation {
            width: config.width,
            height: config.height,
        },
    )?;
    let [r, g, b, a] = parse_hex_color(&config.background)?;
    pixmap.fill(Color::from_rgba8(r, g, b, a));

    let plot_w = config.width as f32 - 2.0 * config.margin;
    let plot_h = config.height as f32 - 2.0 * config.margin;
    if plot_w <= 0.0 || plot_h <= 0.0 {
        return Err(RenderError::InvalidCanvas(format!(
            "{}x{} quiver leaves no room inside a {} px margin",
            config.width, config.height, config.margin
        )));
    }

    let stride = config.stride.max(1);
    let samples = field.decimated(stride);
    let n_cols = field.cols().div_ceil(stride);
    let n_rows = field.rows().div_ceil(stride);

    // Index space padded by one cell on each side
    let to_pixel = |col: usize, row: usize| -> (f32, f32) {
        let fx = (col / stride) as f32 + 1.0;
        let fy = (row / stride) as f32 + 1.0;
        let x = config.margin + fx / (n_cols as f32 + 1.0) * plot_w;
        let y = config.margin + plot_h - fy / (n_rows as f32 + 1.0) * plot_h;
        (x, y)
    };

    let mut paint = Paint::default();
    let [r, g, b, a] = parse_hex_color(&config.color)?;
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let shaft = SHAFT_WIDTH_FRACTION * plot_w;
    let mut drawn = 0usize;
    for (row, col, u, v) in samples {
        let length = (u.hypot(v) / config.scale) as f32 * plot_w;
        if !(length.is_finite() && length > 0.0) {
            continue;
        }
        let (x, y) = to_pixel(col, row);
        // Screen y grows downward
        let angle = (-v).atan2(u) as f32;
        if let Some(path) = arrow_path(length, shaft) {
            let transform = Transform::from_translate(x, y).pre_concat(Transform::from_rotate(
                angle.to_degrees(),
            ));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            drawn += 1;
        }
    }

    debug!(arrows = drawn, stride, scale = config.scale, "Rendered quiver plot");
    Ok(Frame::from_pixmap(&pixmap))
}

/// Arrow along +x from the origin with its tip at `(length, 0)`.
///
/// Arrows shorter than the head keep their proportions, scaled down.
fn arrow_path(length: f32, shaft: f32) -> Option<tiny_skia::Path> {
    let natural_head = HEAD_LENGTH * shaft;
    let shrink = (length / natural_head).min(1.0);
    let head_len = natural_head * shrink;
    let half_head = HEAD_WIDTH * shaft * shrink / 2.0;
    let half_shaft = shaft * shrink / 2.0;
    let neck = length - head_len;

    let mut pb = PathBuilder::new();
    pb.move_to(0.0, -half_shaft);
    pb.line_to(neck, -half_shaft);
    pb.line_to(neck, -half_head);
    pb.line_to(length, 0.0);
    pb.line_to(neck, half_head);
    pb.line_to(neck, half_shaft);
    pb.line_to(0.0, half_shaft);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wind_field::{BoundingBox, Grid};

    fn uniform_field(u: f64, v: f64) -> VectorField {
        let grid = Grid::meshgrid(&BoundingBox::default(), 9, 9).unwrap();
        VectorField::from_fn(&grid, |_, _| (u, v))
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn small_config() -> QuiverConfig {
        QuiverConfig {
            width: 200,
            height: 200,
            margin: 0.0,
            stride: 4,
            scale: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_eastward_arrows_draw_right_of_tail() {
        // Samples at index 0, 4, 8 put tails at 50, 100 and 150 px.
        // Magnitude 2 at scale 10 is a fifth of the plot: 40 px.
        let frame = render_quiver(&uniform_field(2.0, 0.0), &small_config()).unwrap();

        assert_ne!(frame.pixel(120, 100), WHITE);
        assert_eq!(frame.pixel(95, 100), WHITE);
        assert_eq!(frame.pixel(45, 100), WHITE);
    }

    #[test]
    fn test_northward_arrows_point_up() {
        let frame = render_quiver(&uniform_field(0.0, 2.0), &small_config()).unwrap();

        // Arrow from (100, 100) reaches up to y = 60
        assert_ne!(frame.pixel(100, 80), WHITE);
        // Gap between the tip of the row-0 arrow (y = 110) and the next tail
        assert_eq!(frame.pixel(100, 105), WHITE);
    }

    #[test]
    fn test_calm_field_is_blank() {
        let frame = render_quiver(&uniform_field(0.0, 0.0), &QuiverConfig::default()).unwrap();
        assert!(frame.pixels.chunks_exact(4).all(|p| p == WHITE));
    }

    #[test]
    fn test_rejects_bad_scale() {
        let config = QuiverConfig {
            scale: 0.0,
            ..Default::default()
        };
        assert!(render_quiver(&uniform_field(1.0, 0.0), &config).is_err());
    }
}
