//! Vector fields sampled on a grid.

use tracing::debug;

use crate::bbox::BoundingBox;
use crate::error::{FieldError, FieldResult};
use crate::grid::Grid;

/// Multiplier applied to the normalised grid coordinates before evaluating
/// the synthetic formula; maps each axis onto roughly `[-3, 3]`.
const NORMALISED_SPAN: f64 = 6.0;

/// U/V wind components on a grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    rows: usize,
    cols: usize,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl VectorField {
    /// Wrap pre-computed component arrays.
    pub fn new(rows: usize, cols: usize, u: Vec<f64>, v: Vec<f64>) -> FieldResult<Self> {
        for component in [&u, &v] {
            if component.len() != rows * cols {
                return Err(FieldError::DimensionMismatch {
                    expected_rows: rows,
                    expected_cols: cols,
                    rows: component.len() / cols.max(1),
                    cols,
                });
            }
        }
        Ok(Self { rows, cols, u, v })
    }

    /// Evaluate `f(lon, lat) -> (u, v)` at every grid point.
    pub fn from_fn<F>(grid: &Grid, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        let n = grid.rows() * grid.cols();
        let mut u = Vec::with_capacity(n);
        let mut v = Vec::with_capacity(n);
        for (&lon, &lat) in grid.lon().iter().zip(grid.lat()) {
            let (cu, cv) = f(lon, lat);
            u.push(cu);
            v.push(cv);
        }
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            u,
            v,
        }
    }

    /// The synthetic wind used for the wind map.
    ///
    /// With `xx`, `yy` the grid coordinates centred on the box midpoint and
    /// scaled to a span of 6:
    /// `U = 1 + xx² - yy`, `V = -1 - xx + xx·yy²`.
    pub fn synthetic(grid: &Grid, bbox: &BoundingBox) -> Self {
        let (lon_mid, lat_mid) = bbox.center();
        let width = bbox.width();
        let height = bbox.height();

        let field = Self::from_fn(grid, |lon, lat| {
            let xx = (lon - lon_mid) / width * NORMALISED_SPAN;
            let yy = (lat - lat_mid) / height * NORMALISED_SPAN;
            synthetic_wind(xx, yy)
        });

        debug!(
            rows = field.rows,
            cols = field.cols,
            max_speed = field.max_speed(),
            "Evaluated synthetic wind field"
        );
        field
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn u(&self) -> &[f64] {
        &self.u
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    /// Components at a grid index.
    pub fn at(&self, row: usize, col: usize) -> (f64, f64) {
        let idx = row * self.cols + col;
        (self.u[idx], self.v[idx])
    }

    /// Largest vector magnitude in the field.
    pub fn max_speed(&self) -> f64 {
        self.u
            .iter()
            .zip(&self.v)
            .map(|(u, v)| u.hypot(*v))
            .fold(0.0, f64::max)
    }

    /// Fail unless the field has the same shape as `grid`.
    pub fn ensure_matches(&self, grid: &Grid) -> FieldResult<()> {
        if self.shape() != grid.shape() {
            return Err(FieldError::DimensionMismatch {
                expected_rows: grid.rows(),
                expected_cols: grid.cols(),
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Every `stride`-th sample on both axes, as `(row, col, u, v)`.
    pub fn decimated(&self, stride: usize) -> Vec<(usize, usize, f64, f64)> {
        let stride = stride.max(1);
        let mut samples = Vec::new();
        for row in (0..self.rows).step_by(stride) {
            for col in (0..self.cols).step_by(stride) {
                let (u, v) = self.at(row, col);
                samples.push((row, col, u, v));
            }
        }
        samples
    }
}

/// Closed-form synthetic wind at normalised coordinates.
pub fn synthetic_wind(xx: f64, yy: f64) -> (f64, f64) {
    let u = 1.0 + xx * xx - yy;
    let v = -1.0 - xx + xx * yy * yy;
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_wind_origin() {
        assert_eq!(synthetic_wind(0.0, 0.0), (1.0, -1.0));
        assert_eq!(synthetic_wind(1.0, 2.0), (0.0, 2.0));
    }

    #[test]
    fn test_new_rejects_mismatched_components() {
        let err = VectorField::new(2, 2, vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, FieldError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_decimated_stride() {
        let grid = Grid::meshgrid(&BoundingBox::default(), 10, 10).unwrap();
        let field = VectorField::synthetic(&grid, &BoundingBox::default());
        let samples = field.decimated(4);
        // rows/cols 0, 4, 8
        assert_eq!(samples.len(), 9);
        assert_eq!((samples[4].0, samples[4].1), (4, 4));
    }

    #[test]
    fn test_ensure_matches() {
        let bbox = BoundingBox::default();
        let grid = Grid::meshgrid(&bbox, 5, 5).unwrap();
        let other = Grid::meshgrid(&bbox, 5, 6).unwrap();
        let field = VectorField::synthetic(&grid, &bbox);
        assert!(field.ensure_matches(&grid).is_ok());
        assert!(field.ensure_matches(&other).is_err());
    }
}
