//! Equirectangular (plate carrée) coordinates.

use crate::MapProjection;

/// Longitude/latitude used directly as planar coordinates.
///
/// Streamline points live in this space before they are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlateCarree;

impl MapProjection for PlateCarree {
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        (lon, lat)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }
}
