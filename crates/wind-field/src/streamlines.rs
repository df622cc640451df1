//! Evenly spaced streamline extraction.
//!
//! Streamlines are traced through the field with fixed-length steps along the
//! interpolated flow direction. An occupancy mask over the grid keeps lines
//! apart: every interpolation marks a `spacing x spacing` block of cells as
//! used, and new seeds are only placed in unused cells. Extraction ends once
//! every cell is used.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FieldError, FieldResult};
use crate::field::VectorField;
use crate::grid::Grid;

/// A point in geographic coordinates (`x` = longitude, `y` = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// An ordered polyline approximating one integral curve of the field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Streamline {
    pub points: Vec<Point>,
}

impl Streamline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Anything that can turn a sampled vector field into streamlines.
pub trait StreamlineExtractor {
    /// Trace streamlines through `field` sampled on `grid`.
    ///
    /// The result may be empty. Every returned streamline has at least one point.
    fn extract(&self, grid: &Grid, field: &VectorField) -> FieldResult<Vec<Streamline>>;
}

/// Evenly spaced streamlines seeded from an occupancy mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvenlySpacedStreamlines {
    /// Step length as a fraction of the geometric mean grid spacing
    pub resolution: f64,
    /// Side length (in grid cells) of the block marked used per step
    pub spacing: usize,
    /// Maximum number of points per streamline (split between both halves)
    pub max_length: usize,
    /// Stop a half-streamline when it returns close to its own path
    pub detect_loops: bool,
}

impl Default for EvenlySpacedStreamlines {
    fn default() -> Self {
        Self {
            resolution: 0.125,
            spacing: 2,
            max_length: 2500,
            detect_loops: false,
        }
    }
}

impl EvenlySpacedStreamlines {
    fn validate(&self) -> FieldResult<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(FieldError::InvalidParameters(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.spacing == 0 {
            return Err(FieldError::InvalidParameters(
                "spacing must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl StreamlineExtractor for EvenlySpacedStreamlines {
    fn extract(&self, grid: &Grid, field: &VectorField) -> FieldResult<Vec<Streamline>> {
        self.validate()?;
        field.ensure_matches(grid)?;

        let mut tracer = Tracer::new(self, grid, field);
        let mut streamlines = Vec::new();
        let mut cursor = 0;

        while let Some(seed) = tracer.next_unused(cursor) {
            cursor = seed;
            let row = seed / tracer.cols;
            let col = seed % tracer.cols;
            let streamline = tracer.trace(tracer.x[col], tracer.y[row], row, col);
            streamlines.push(streamline);
        }

        info!(
            count = streamlines.len(),
            points = streamlines.iter().map(Streamline::len).sum::<usize>(),
            "Extracted streamlines"
        );
        Ok(streamlines)
    }
}

/// Working state for one extraction run.
struct Tracer<'a> {
    params: &'a EvenlySpacedStreamlines,
    field: &'a VectorField,
    x: Vec<f64>,
    y: Vec<f64>,
    rows: usize,
    cols: usize,
    dx: f64,
    dy: f64,
    dr: f64,
    used: Vec<bool>,
}

impl<'a> Tracer<'a> {
    fn new(params: &'a EvenlySpacedStreamlines, grid: &'a Grid, field: &'a VectorField) -> Self {
        let x = grid.lon_axis().to_vec();
        let y = grid.lat_axis();
        let rows = grid.rows();
        let cols = grid.cols();

        let dx = (x[cols - 1] - x[0]) / (cols - 1) as f64;
        let dy = (y[rows - 1] - y[0]) / (rows - 1) as f64;
        let dr = params.resolution * (dx * dy).sqrt();

        let mut used = vec![false; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let boundary = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
                let (u, v) = field.at(row, col);
                // No flow to follow where the field vanishes
                if boundary || (u == 0.0 && v == 0.0) {
                    used[row * cols + col] = true;
                }
            }
        }

        debug!(dx, dy, dr, "Streamline tracer initialised");

        Self {
            params,
            field,
            x,
            y,
            rows,
            cols,
            dx,
            dy,
            dr,
            used,
        }
    }

    /// First unused cell at or after `from`, row-major.
    fn next_unused(&self, from: usize) -> Option<usize> {
        self.used[from..]
            .iter()
            .position(|used| !used)
            .map(|offset| from + offset)
    }

    fn trace(&mut self, x0: f64, y0: f64, row: usize, col: usize) -> Streamline {
        self.used[row * self.cols + col] = true;

        let forward = self.trace_half(x0, y0, 1.0);
        let backward = self.trace_half(x0, y0, -1.0);

        let mut points = Vec::with_capacity(forward.len() + backward.len() + 1);
        points.extend(backward.into_iter().rev());
        points.push(Point::new(x0, y0));
        points.extend(forward);
        Streamline::new(points)
    }

    fn trace_half(&mut self, x0: f64, y0: f64, sign: f64) -> Vec<Point> {
        let (xmin, xmax) = (self.x[0], self.x[self.cols - 1]);
        let (ymin, ymax) = (self.y[0], self.y[self.rows - 1]);
        let max_steps = self.params.max_length / 2;

        let mut points = Vec::new();
        let (mut x, mut y) = (x0, y0);
        let mut steps = 0;

        while xmin < x && x < xmax && ymin < y && y < ymax {
            let (u, v) = self.interpolate(x, y);
            let theta = v.atan2(u);
            x += sign * self.dr * theta.cos();
            y += sign * self.dr * theta.sin();
            points.push(Point::new(x, y));
            steps += 1;

            if self.params.detect_loops && steps % 10 == 0 && self.closes_loop(&points) {
                break;
            }
            if steps > max_steps {
                break;
            }
        }

        points
    }

    /// Bilinear interpolation of the field at `(x, y)`; marks the
    /// surrounding block as used.
    fn interpolate(&mut self, x: f64, y: f64) -> (f64, f64) {
        let fi = (x - self.x[0]) / self.dx;
        let fj = (y - self.y[0]) / self.dy;
        let i = (fi.floor().max(0.0) as usize).min(self.cols - 2);
        let j = (fj.floor().max(0.0) as usize).min(self.rows - 2);
        let ai = (fi - i as f64).clamp(0.0, 1.0);
        let aj = (fj - j as f64).clamp(0.0, 1.0);

        let (u00, v00) = self.field.at(j, i);
        let (u01, v01) = self.field.at(j, i + 1);
        let (u10, v10) = self.field.at(j + 1, i);
        let (u11, v11) = self.field.at(j + 1, i + 1);

        let w00 = (1.0 - ai) * (1.0 - aj);
        let w01 = ai * (1.0 - aj);
        let w10 = (1.0 - ai) * aj;
        let w11 = ai * aj;

        let u = u00 * w00 + u01 * w01 + u10 * w10 + u11 * w11;
        let v = v00 * w00 + v01 * w01 + v10 * w10 + v11 * w11;

        let spacing = self.params.spacing;
        for row in j..(j + spacing).min(self.rows) {
            let start = row * self.cols + i;
            let end = row * self.cols + (i + spacing).min(self.cols);
            self.used[start..end].fill(true);
        }

        (u, v)
    }

    fn closes_loop(&self, points: &[Point]) -> bool {
        let Some((last, earlier)) = points.split_last() else {
            return false;
        };
        let threshold = 0.9 * self.dr;
        earlier.iter().any(|p| p.distance(last) < threshold)
    }
}
