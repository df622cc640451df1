//! Map canvas: projection, extent fitting and static overlays.
//!
//! The canvas owns a pre-rendered background layer (fill colour, graticule,
//! coastlines). Animation frames start from a copy of that layer, so the
//! overlays are drawn once per run rather than once per frame.

use projection::{LambertConformal, MapProjection, ProjectedExtent};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use tracing::{debug, warn};
use wind_field::BoundingBox;

use crate::coastline::Coastline;
use crate::error::RenderError;

/// Typographic points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Maximum lon/lat span of one straight piece when drawing geographic lines.
const DENSIFY_DEGREES: f64 = 0.5;

/// Canvas layout and overlay styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Pixels per inch, used to convert point line widths
    pub dpi: f64,
    /// Blank border around the map in pixels
    pub margin: f32,
    /// Background colour (hex)
    pub background: String,
    /// Map frame colour (hex)
    pub frame_color: String,
    /// Map frame width in points
    pub frame_width: f32,
    /// Coastline colour (hex)
    pub coastline_color: String,
    /// Coastline width in points
    pub coastline_width: f32,
    /// Graticule spacing in degrees; `None` disables it
    pub graticule_step: Option<f64>,
    /// Graticule colour (hex)
    pub graticule_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            dpi: 100.0,
            margin: 10.0,
            background: "#ffffff".to_string(),
            frame_color: "#000000".to_string(),
            frame_width: 0.8,
            coastline_color: "#000000".to_string(),
            coastline_width: 0.75,
            graticule_step: Some(5.0),
            graticule_color: "#d0d0d0".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Convert a width in points to pixels.
    pub fn points_to_pixels(&self, points: f32) -> f32 {
        (points as f64 * self.dpi / POINTS_PER_INCH) as f32
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(hex: &str) -> Result<[u8; 4], RenderError> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return Err(RenderError::InvalidCanvas(format!("invalid colour {}", hex)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| RenderError::InvalidCanvas(format!("invalid colour {}", hex)))
    };
    match digits.len() {
        6 => Ok([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Ok([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => Err(RenderError::InvalidCanvas(format!("invalid colour {}", hex))),
    }
}

/// Pixel rectangle the map extent is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Pixels per projected unit
    pub scale: f64,
}

/// A projected map drawing surface.
pub struct MapCanvas {
    projection: Box<dyn MapProjection>,
    extent: ProjectedExtent,
    config: CanvasConfig,
    plot: PlotArea,
    background: Pixmap,
    clip: Mask,
}

impl std::fmt::Debug for MapCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapCanvas")
            .field("extent", &self.extent)
            .field("plot", &self.plot)
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .finish()
    }
}

impl MapCanvas {
    /// Create a canvas that shows `extent` of `projection`.
    pub fn new(
        projection: Box<dyn MapProjection>,
        extent: ProjectedExtent,
        config: CanvasConfig,
    ) -> Result<Self, RenderError> {
        let plot = fit_extent(&extent, &config)?;

        let mut background = Pixmap::new(config.width, config.height).ok_or(
            RenderError::CanvasAllocation {
                width: config.width,
                height: config.height,
            },
        )?;
        let [r, g, b, a] = parse_hex_color(&config.background)?;
        background.fill(Color::from_rgba8(r, g, b, a));

        let mut clip = Mask::new(config.width, config.height).ok_or(
            RenderError::CanvasAllocation {
                width: config.width,
                height: config.height,
            },
        )?;
        let plot_rect = Rect::from_xywh(plot.x, plot.y, plot.width, plot.height)
            .ok_or_else(|| RenderError::InvalidCanvas(format!("degenerate plot area {:?}", plot)))?;
        clip.fill_path(
            &PathBuilder::from_rect(plot_rect),
            FillRule::Winding,
            false,
            Transform::identity(),
        );

        debug!(
            width = config.width,
            height = config.height,
            plot_x = plot.x,
            plot_y = plot.y,
            plot_width = plot.width,
            plot_height = plot.height,
            "Created map canvas"
        );

        Ok(Self {
            projection,
            extent,
            config,
            plot,
            background,
            clip,
        })
    }

    /// Lambert conformal canvas centred on `bbox`, showing exactly `bbox`.
    pub fn lambert(bbox: &BoundingBox, config: CanvasConfig) -> Result<Self, RenderError> {
        let (lon_mid, lat_mid) = bbox.center();
        let projection = LambertConformal::centered(lon_mid, lat_mid)?;
        let extent = ProjectedExtent::from_geographic(
            &projection,
            bbox.min_x,
            bbox.max_x,
            bbox.min_y,
            bbox.max_y,
        )?;
        Self::new(Box::new(projection), extent, config)
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn plot_area(&self) -> PlotArea {
        self.plot
    }

    pub fn extent(&self) -> &ProjectedExtent {
        &self.extent
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Pixel position of a geographic point.
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> (f32, f32) {
        let (x, y) = self.projection.forward(lon, lat);
        self.projected_to_pixel(x, y)
    }

    /// Pixel position of a projected point; y grows downward.
    pub fn projected_to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = self.plot.x as f64 + (x - self.extent.min_x) * self.plot.scale;
        let py = self.plot.y as f64 + (self.extent.max_y - y) * self.plot.scale;
        (px as f32, py as f32)
    }

    /// Draw a geographic polyline onto the background layer.
    ///
    /// Each leg is split into pieces no longer than half a degree so it
    /// follows the projection's curvature.
    pub fn draw_geo_polyline(&mut self, points: &[(f64, f64)], color: [u8; 4], width_px: f32) {
        if points.len() < 2 {
            return;
        }

        let mut pb = PathBuilder::new();
        let (x0, y0) = self.geo_to_pixel(points[0].0, points[0].1);
        pb.move_to(x0, y0);

        for pair in points.windows(2) {
            let (lon_a, lat_a) = pair[0];
            let (lon_b, lat_b) = pair[1];
            let span = (lon_b - lon_a).abs().max((lat_b - lat_a).abs());
            let pieces = ((span / DENSIFY_DEGREES).ceil() as usize).max(1);
            for k in 1..=pieces {
                let t = k as f64 / pieces as f64;
                let (x, y) =
                    self.geo_to_pixel(lon_a + t * (lon_b - lon_a), lat_a + t * (lat_b - lat_a));
                pb.line_to(x, y);
            }
        }

        if let Some(path) = pb.finish() {
            let paint = solid_paint(color);
            let stroke = round_stroke(width_px);
            self.background
                .stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&self.clip));
        }
    }

    /// Draw meridians and parallels every `step` degrees across `bbox`.
    pub fn draw_graticule(&mut self, bbox: &BoundingBox, step: f64) -> Result<(), RenderError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(RenderError::InvalidCanvas(format!(
                "graticule step must be positive, got {}",
                step
            )));
        }
        let color = parse_hex_color(&self.config.graticule_color)?;
        let width = self.config.points_to_pixels(0.5);

        let mut lon = (bbox.min_x / step).ceil() * step;
        while lon <= bbox.max_x {
            self.draw_geo_polyline(&[(lon, bbox.min_y), (lon, bbox.max_y)], color, width);
            lon += step;
        }
        let mut lat = (bbox.min_y / step).ceil() * step;
        while lat <= bbox.max_y {
            self.draw_geo_polyline(&[(bbox.min_x, lat), (bbox.max_x, lat)], color, width);
            lat += step;
        }
        Ok(())
    }

    /// Draw every coastline polyline onto the background layer.
    pub fn draw_coastline(&mut self, coastline: &Coastline) -> Result<(), RenderError> {
        if coastline.is_empty() {
            warn!("Coastline has no lines to draw");
            return Ok(());
        }
        let color = parse_hex_color(&self.config.coastline_color)?;
        let width = self.config.points_to_pixels(self.config.coastline_width);
        for line in coastline.lines() {
            self.draw_geo_polyline(line, color, width);
        }
        Ok(())
    }

    /// A fresh frame: a copy of the background layer.
    pub fn blank_frame(&self) -> Pixmap {
        self.background.clone()
    }

    /// Stroke one straight pixel-space segment, clipped to the map.
    pub fn stroke_segment(
        &self,
        pixmap: &mut Pixmap,
        from: (f32, f32),
        to: (f32, f32),
        color: [u8; 4],
        width_px: f32,
    ) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let paint = solid_paint(color);
            let mut stroke = Stroke::default();
            stroke.width = width_px;
            stroke.line_cap = LineCap::Butt;
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&self.clip));
        }
    }

    /// Outline the map area.
    pub fn draw_frame_border(&self, pixmap: &mut Pixmap) -> Result<(), RenderError> {
        let color = parse_hex_color(&self.config.frame_color)?;
        let width = self.config.points_to_pixels(self.config.frame_width);
        if let Some(rect) = Rect::from_xywh(self.plot.x, self.plot.y, self.plot.width, self.plot.height)
        {
            let path = PathBuilder::from_rect(rect);
            let mut stroke = Stroke::default();
            stroke.width = width;
            stroke.line_join = LineJoin::Miter;
            pixmap.stroke_path(&path, &solid_paint(color), &stroke, Transform::identity(), None);
        }
        Ok(())
    }
}

/// Fit `extent` into the canvas minus margins, keeping its aspect ratio and
/// centring it.
fn fit_extent(extent: &ProjectedExtent, config: &CanvasConfig) -> Result<PlotArea, RenderError> {
    let avail_w = config.width as f64 - 2.0 * config.margin as f64;
    let avail_h = config.height as f64 - 2.0 * config.margin as f64;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return Err(RenderError::InvalidCanvas(format!(
            "{}x{} canvas leaves no room inside a {} px margin",
            config.width, config.height, config.margin
        )));
    }
    if !(extent.width() > 0.0 && extent.height() > 0.0) {
        return Err(RenderError::InvalidCanvas(format!(
            "empty map extent {:?}",
            extent
        )));
    }

    let scale = (avail_w / extent.width()).min(avail_h / extent.height());
    let width = extent.width() * scale;
    let height = extent.height() * scale;
    let x = (config.width as f64 - width) / 2.0;
    let y = (config.height as f64 - height) / 2.0;

    Ok(PlotArea {
        x: x as f32,
        y: y as f32,
        width: width as f32,
        height: height as f32,
        scale,
    })
}

fn solid_paint(color: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    let mut stroke = Stroke::default();
    stroke.width = width;
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Round;
    stroke
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::PlateCarree;

    fn plate_carree_canvas(width: u32, height: u32) -> MapCanvas {
        let extent = ProjectedExtent::from_geographic(&PlateCarree, 0.0, 20.0, 0.0, 10.0).unwrap();
        let config = CanvasConfig {
            width,
            height,
            margin: 0.0,
            ..Default::default()
        };
        MapCanvas::new(Box::new(PlateCarree), extent, config).unwrap()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_hex_color("00000080").unwrap(), [0, 0, 0, 128]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_fit_extent_letterboxes() {
        // 2:1 extent on a square canvas: full width, half height, centred
        let canvas = plate_carree_canvas(200, 200);
        let plot = canvas.plot_area();
        assert_eq!(plot.width, 200.0);
        assert_eq!(plot.height, 100.0);
        assert_eq!(plot.y, 50.0);
        assert_eq!(canvas.geo_to_pixel(0.0, 10.0), (0.0, 50.0));
        assert_eq!(canvas.geo_to_pixel(20.0, 0.0), (200.0, 150.0));
    }

    #[test]
    fn test_points_to_pixels() {
        let config = CanvasConfig::default();
        assert!((config.points_to_pixels(0.5) - 0.5 * 100.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn test_lines_are_clipped_to_map() {
        let mut canvas = plate_carree_canvas(200, 200);
        // Vertical line through the whole canvas at lon 10
        canvas.draw_geo_polyline(&[(10.0, -50.0), (10.0, 50.0)], [255, 0, 0, 255], 3.0);
        let frame = crate::frame::Frame::from_pixmap(&canvas.blank_frame());

        // Inside the plot area the line is drawn, in the letterbox it is not
        assert_eq!(frame.pixel(100, 100), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(100, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn test_margin_too_large() {
        let extent = ProjectedExtent::from_geographic(&PlateCarree, 0.0, 1.0, 0.0, 1.0).unwrap();
        let config = CanvasConfig {
            width: 20,
            height: 20,
            margin: 10.0,
            ..Default::default()
        };
        assert!(MapCanvas::new(Box::new(PlateCarree), extent, config).is_err());
    }
}
