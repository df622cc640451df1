//! Lambert Conformal Conic projection.
//!
//! Maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! Angles are preserved locally, which keeps streamline directions true on
//! the rendered map.
//!
//! The projection parameters include:
//! - Central meridian (lon0) and latitude of origin (lat0)
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//!
//! The earth is a sphere of radius [`EARTH_RADIUS`], an approximation of the
//! WGS84 ellipsoid that geodetic libraries usually project. At map scale the
//! difference is a small pixel offset. Output coordinates are metres with the
//! origin at (lon0, lat0), x growing east and y growing north.

use std::f64::consts::PI;

use crate::{MapProjection, ProjectionError};

/// Mean earth radius used for the spherical model (metres).
pub const EARTH_RADIUS: f64 = 6371229.0;

/// Default standard parallels, degrees.
pub const DEFAULT_STANDARD_PARALLELS: (f64, f64) = (33.0, 45.0);

/// Lambert Conformal projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection centred on `(central_lon, central_lat)` with the
    /// given standard parallels, all in degrees.
    pub fn new(
        central_lon_deg: f64,
        central_lat_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
    ) -> Result<Self, ProjectionError> {
        Self::with_earth_radius(
            central_lon_deg,
            central_lat_deg,
            latin1_deg,
            latin2_deg,
            EARTH_RADIUS,
        )
    }

    /// Create a projection centred on `(central_lon, central_lat)` using the
    /// default 33°/45° standard parallels.
    pub fn centered(central_lon_deg: f64, central_lat_deg: f64) -> Result<Self, ProjectionError> {
        let (latin1, latin2) = DEFAULT_STANDARD_PARALLELS;
        Self::new(central_lon_deg, central_lat_deg, latin1, latin2)
    }

    /// Like [`new`](Self::new) with an explicit sphere radius in metres.
    pub fn with_earth_radius(
        central_lon_deg: f64,
        central_lat_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        earth_radius: f64,
    ) -> Result<Self, ProjectionError> {
        let to_rad = PI / 180.0;

        for lat in [latin1_deg, latin2_deg, central_lat_deg] {
            if !lat.is_finite() || lat.abs() >= 90.0 {
                return Err(ProjectionError::InvalidParallels(format!(
                    "latitude {} must lie strictly between the poles",
                    lat
                )));
            }
        }

        let lon0 = central_lon_deg * to_rad;
        let lat0 = central_lat_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if !n.is_finite() || n.abs() < 1e-10 {
            return Err(ProjectionError::InvalidParallels(format!(
                "standard parallels {} and {} give a degenerate cone",
                latin1_deg, latin2_deg
            )));
        }

        // Compute F constant
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;

        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Central meridian and latitude of origin in degrees.
    pub fn center_deg(&self) -> (f64, f64) {
        (self.lon0.to_degrees(), self.lat0.to_degrees())
    }

    fn rho(&self, lat: f64) -> f64 {
        self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n)
    }
}

impl MapProjection for LambertConformal {
    /// Convert geographic coordinates (degrees) to projected metres.
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.rho(lat);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Convert projected metres back to geographic coordinates (degrees).
    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let sign = self.n.signum();
        let dy = self.rho0 - y;

        let rho = sign * (x * x + dy * dy).sqrt();
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * PI / 2.0
        } else {
            2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0
        };
        let lon = self.lon0 + theta / self.n;

        (lon.to_degrees(), lat.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        let proj = LambertConformal::centered(140.0, 32.5).unwrap();
        let (x, y) = proj.forward(140.0, 32.5);
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = LambertConformal::centered(140.0, 32.5).unwrap();

        for (lon, lat) in [(120.0, 20.0), (160.0, 45.0), (133.3, 41.7), (151.0, 22.5)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-9, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_orientation() {
        let proj = LambertConformal::centered(140.0, 32.5).unwrap();

        let (east, _) = proj.forward(150.0, 32.5);
        let (_, north) = proj.forward(140.0, 40.0);
        assert!(east > 0.0, "east should have positive x, got {}", east);
        assert!(north > 0.0, "north should have positive y, got {}", north);
    }

    #[test]
    fn test_one_degree_of_latitude_near_center() {
        let proj = LambertConformal::centered(140.0, 32.5).unwrap();
        let (_, y1) = proj.forward(140.0, 32.0);
        let (_, y2) = proj.forward(140.0, 33.0);
        let km = (y2 - y1) / 1000.0;
        // ~111 km per degree on the sphere, scale factor close to 1 between the parallels
        assert!(km > 105.0 && km < 115.0, "got {} km", km);
    }

    #[test]
    fn test_true_scale_on_standard_parallel() {
        let proj = LambertConformal::centered(140.0, 32.5).unwrap();
        let (lat1, _) = DEFAULT_STANDARD_PARALLELS;
        let dlon: f64 = 0.01;

        let (x1, y1) = proj.forward(140.0, lat1);
        let (x2, y2) = proj.forward(140.0 + dlon, lat1);
        let measured = (x2 - x1).hypot(y2 - y1);
        let expected = EARTH_RADIUS * lat1.to_radians().cos() * dlon.to_radians();

        assert!(
            (measured / expected - 1.0).abs() < 1e-6,
            "{} m vs {} m",
            measured,
            expected
        );
    }

    #[test]
    fn test_tangent_cone() {
        let proj = LambertConformal::new(-97.5, 38.5, 38.5, 38.5).unwrap();
        assert!((proj.cone_constant() - 38.5_f64.to_radians().sin()).abs() < 1e-12);
    }

    #[test]
    fn test_southern_hemisphere_roundtrip() {
        let proj = LambertConformal::new(135.0, -30.0, -20.0, -40.0).unwrap();
        assert!(proj.cone_constant() < 0.0);
        let (x, y) = proj.forward(140.0, -25.0);
        let (lon, lat) = proj.inverse(x, y);
        assert!((lon - 140.0).abs() < 1e-9);
        assert!((lat + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_degenerate_parallels() {
        assert!(LambertConformal::new(0.0, 0.0, 30.0, -30.0).is_err());
        assert!(LambertConformal::new(0.0, 0.0, 90.0, 45.0).is_err());
    }
}
