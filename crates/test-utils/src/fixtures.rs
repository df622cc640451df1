//! Common test fixtures for wind map tests.

/// Bounding boxes as `(lon_min, lon_max, lat_min, lat_max)`.
pub mod extent {
    /// The north-west Pacific box the wind map is drawn over
    pub const WIND_MAP: (f64, f64, f64, f64) = (120.0, 160.0, 20.0, 45.0);

    /// Invalid extent (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 5.0, 10.0, 5.0);
}

/// Animation constants used by the wind map.
pub mod animation {
    /// Frames rendered per export
    pub const FRAMES: usize = 27;

    /// Arc length added to every streamline per frame
    pub const LENGTH_STEP: f64 = 0.05;

    /// Colour cycles per unit arc length
    pub const DASH_DENSITY: f64 = 1.5;
}

/// A minimal GeoJSON coastline: one line string and one small island polygon.
pub const COASTLINE_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "shore"},
      "geometry": {
        "type": "LineString",
        "coordinates": [[130.0, 31.0], [132.0, 33.5], [135.0, 34.5], [140.0, 35.5]]
      }
    },
    {
      "type": "Feature",
      "properties": {"name": "island"},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[145.0, 40.0], [146.0, 40.0], [146.0, 41.0], [145.0, 40.0]]]
      }
    }
  ]
}"#;
