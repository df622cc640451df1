//! Regular lat/lon grids.

use crate::bbox::BoundingBox;
use crate::error::{FieldError, FieldResult};

/// A regular lat/lon mesh stored row-major.
///
/// Rows run along latitude and columns along longitude, so
/// `lon(row, col)` depends only on `col` and `lat(row, col)` only on `row`.
/// Both axes include the bounding box edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl Grid {
    /// Evenly subdivide `bbox` into a `rows x cols` mesh.
    pub fn meshgrid(bbox: &BoundingBox, rows: usize, cols: usize) -> FieldResult<Self> {
        bbox.validate()?;
        if rows < 2 || cols < 2 {
            return Err(FieldError::InvalidGrid(format!(
                "grid must be at least 2x2, got {}x{}",
                rows, cols
            )));
        }

        let lons = linspace(bbox.min_x, bbox.max_x, cols);
        let lats = linspace(bbox.min_y, bbox.max_y, rows);

        let mut lon = Vec::with_capacity(rows * cols);
        let mut lat = Vec::with_capacity(rows * cols);
        for &y in &lats {
            for &x in &lons {
                lon.push(x);
                lat.push(y);
            }
        }

        Ok(Self {
            rows,
            cols,
            lon,
            lat,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Longitude values, row-major.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Latitude values, row-major.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude at a grid index.
    pub fn lon_at(&self, row: usize, col: usize) -> f64 {
        self.lon[row * self.cols + col]
    }

    /// Latitude at a grid index.
    pub fn lat_at(&self, row: usize, col: usize) -> f64 {
        self.lat[row * self.cols + col]
    }

    /// The longitude axis (first row).
    pub fn lon_axis(&self) -> &[f64] {
        &self.lon[..self.cols]
    }

    /// The latitude axis (first column).
    pub fn lat_axis(&self) -> Vec<f64> {
        (0..self.rows).map(|r| self.lat_at(r, 0)).collect()
    }

    /// Index of the grid point closest to `(lon, lat)`.
    pub fn nearest_index(&self, lon: f64, lat: f64) -> (usize, usize) {
        let col = nearest(self.lon_axis(), lon);
        let row = nearest(&self.lat_axis(), lat);
        (row, col)
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

fn nearest(axis: &[f64], value: f64) -> usize {
    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .partial_cmp(&(*b - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_inclusive() {
        let values = linspace(120.0, 160.0, 5);
        assert_eq!(values, vec![120.0, 130.0, 140.0, 150.0, 160.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn test_meshgrid_shape_and_axes() {
        let grid = Grid::meshgrid(&BoundingBox::default(), 4, 3).unwrap();
        assert_eq!(grid.shape(), (4, 3));
        assert_eq!(grid.lon().len(), 12);
        assert_eq!(grid.lat().len(), 12);
        assert_eq!(grid.lon_axis(), &[120.0, 140.0, 160.0]);
        assert_eq!(grid.lat_at(0, 2), 20.0);
        assert_eq!(grid.lat_at(3, 0), 45.0);
        assert_eq!(grid.lon_at(2, 1), 140.0);
    }

    #[test]
    fn test_meshgrid_rejects_tiny_grid() {
        let err = Grid::meshgrid(&BoundingBox::default(), 1, 10).unwrap_err();
        assert!(matches!(err, FieldError::InvalidGrid(_)));
    }

    #[test]
    fn test_nearest_index() {
        let grid = Grid::meshgrid(&BoundingBox::default(), 6, 5).unwrap();
        assert_eq!(grid.nearest_index(140.0, 20.1), (0, 2));
        assert_eq!(grid.nearest_index(500.0, 500.0), (5, 4));
    }
}
