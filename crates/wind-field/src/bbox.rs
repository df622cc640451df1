//! Geographic bounding box.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a bounding box from the `lonmin, lonmax, latmin, latmax` order
    /// used for map extents.
    pub fn from_extent(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self::new(lon_min, lat_min, lon_max, lat_max)
    }

    /// Check that the box is finite and non-empty on both axes.
    pub fn validate(&self) -> FieldResult<()> {
        let values = [self.min_x, self.min_y, self.max_x, self.max_y];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FieldError::InvalidBbox(format!(
                "non-finite coordinate in {:?}",
                values
            )));
        }
        if self.max_x <= self.min_x {
            return Err(FieldError::InvalidBbox(format!(
                "max longitude {} must exceed min longitude {}",
                self.max_x, self.min_x
            )));
        }
        if self.max_y <= self.min_y {
            return Err(FieldError::InvalidBbox(format!(
                "max latitude {} must exceed min latitude {}",
                self.max_y, self.min_y
            )));
        }
        Ok(())
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Midpoint `(lon, lat)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl Default for BoundingBox {
    /// The north-west Pacific box the wind map is drawn over.
    fn default() -> Self {
        Self::from_extent(120.0, 160.0, 20.0, 45.0)
    }
}
