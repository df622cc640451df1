//! Projected map extents.

use crate::{MapProjection, ProjectionError};

/// Edge samples per side when projecting a geographic rectangle.
const DEFAULT_EDGE_SAMPLES: usize = 64;

/// Axis-aligned rectangle in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ProjectedExtent {
    /// Bounds of a geographic rectangle after projection.
    ///
    /// Under a conic projection the edges of a lon/lat box are curved, so
    /// each edge is densified and the bounds enclose every sample.
    pub fn from_geographic<P: MapProjection + ?Sized>(
        projection: &P,
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
    ) -> Result<Self, ProjectionError> {
        Self::from_geographic_sampled(
            projection,
            lon_min,
            lon_max,
            lat_min,
            lat_max,
            DEFAULT_EDGE_SAMPLES,
        )
    }

    pub fn from_geographic_sampled<P: MapProjection + ?Sized>(
        projection: &P,
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
        samples: usize,
    ) -> Result<Self, ProjectionError> {
        if !(lon_max > lon_min && lat_max > lat_min) {
            return Err(ProjectionError::InvalidExtent(format!(
                "[{}, {}, {}, {}] is empty",
                lon_min, lon_max, lat_min, lat_max
            )));
        }

        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;

        let samples = samples.max(1);
        for t in 0..=samples {
            let frac = t as f64 / samples as f64;
            let lon = lon_min + frac * (lon_max - lon_min);
            let lat = lat_min + frac * (lat_max - lat_min);

            for (plon, plat) in [(lon, lat_min), (lon, lat_max), (lon_min, lat), (lon_max, lat)] {
                let (x, y) = projection.forward(plon, plat);
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }

        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return Err(ProjectionError::InvalidExtent(
                "projected bounds are not finite".to_string(),
            ));
        }

        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
