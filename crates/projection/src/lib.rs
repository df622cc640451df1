//! Coordinate reference system transformations.
//!
//! Implements the map projections the wind map draws on, with spherical
//! formulas and no PROJ dependency.

pub mod extent;
pub mod geographic;
pub mod lambert;

pub use extent::ProjectedExtent;
pub use geographic::PlateCarree;
pub use lambert::LambertConformal;

use thiserror::Error;

/// A forward map projection from geographic degrees to planar coordinates.
pub trait MapProjection {
    /// Project `(lon, lat)` in degrees to planar `(x, y)`.
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64);

    /// Inverse of [`forward`](Self::forward), returning `(lon, lat)` in degrees.
    fn inverse(&self, x: f64, y: f64) -> (f64, f64);
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid standard parallels: {0}")]
    InvalidParallels(String),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),
}
