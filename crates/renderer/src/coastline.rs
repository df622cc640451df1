//! Coastline overlays loaded from GeoJSON.
//!
//! Only geometry is read. Polygon rings and line strings all become plain
//! polylines in lon/lat degrees; properties are ignored.
//!
//! A coarse hand-digitised outline of the north-west Pacific (eastern China,
//! Korea, Primorye, Taiwan and the main Japanese islands, about half a degree
//! resolution) is embedded as [`BUNDLED_COASTLINE`].

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::RenderError;

/// Approximate north-west Pacific coastline used when no file is configured.
pub const BUNDLED_COASTLINE: &str = include_str!("../assets/coastline.geojson");

/// A set of coastline polylines in `(lon, lat)` degrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coastline {
    lines: Vec<Vec<(f64, f64)>>,
}

impl Coastline {
    pub fn new(lines: Vec<Vec<(f64, f64)>>) -> Self {
        Self { lines }
    }

    /// Load a GeoJSON file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::CoastlineIo {
            path: path.to_path_buf(),
            source,
        })?;
        let coastline = Self::from_geojson_str(&text)?;
        info!(
            path = %path.display(),
            lines = coastline.lines.len(),
            "Loaded coastline"
        );
        Ok(coastline)
    }

    /// The embedded north-west Pacific outline.
    pub fn bundled() -> Result<Self, RenderError> {
        let coastline = Self::from_geojson_str(BUNDLED_COASTLINE)?;
        debug!(lines = coastline.lines.len(), "Using bundled coastline");
        Ok(coastline)
    }

    /// Parse a GeoJSON document (geometry, feature or feature collection).
    pub fn from_geojson_str(text: &str) -> Result<Self, RenderError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| RenderError::CoastlineParse(e.to_string()))?;
        let mut lines = Vec::new();
        collect_object(&value, &mut lines)?;
        debug!(lines = lines.len(), "Parsed coastline GeoJSON");
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Vec<(f64, f64)>] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn collect_object(value: &Value, lines: &mut Vec<Vec<(f64, f64)>>) -> Result<(), RenderError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::CoastlineParse("object without a \"type\"".to_string()))?;

    match kind {
        "FeatureCollection" => {
            for feature in array_field(value, "features")? {
                collect_object(feature, lines)?;
            }
        }
        "Feature" => match value.get("geometry") {
            Some(Value::Null) | None => {}
            Some(geometry) => collect_object(geometry, lines)?,
        },
        "GeometryCollection" => {
            for geometry in array_field(value, "geometries")? {
                collect_object(geometry, lines)?;
            }
        }
        "LineString" => lines.push(positions(coordinates(value)?)?),
        "MultiLineString" | "Polygon" => {
            for ring in as_array(coordinates(value)?)? {
                lines.push(positions(ring)?);
            }
        }
        "MultiPolygon" => {
            for polygon in as_array(coordinates(value)?)? {
                for ring in as_array(polygon)? {
                    lines.push(positions(ring)?);
                }
            }
        }
        // Points carry no outline to draw
        "Point" | "MultiPoint" => {}
        other => {
            return Err(RenderError::CoastlineParse(format!(
                "unsupported geometry type {}",
                other
            )))
        }
    }
    Ok(())
}

fn coordinates(value: &Value) -> Result<&Value, RenderError> {
    value
        .get("coordinates")
        .ok_or_else(|| RenderError::CoastlineParse("geometry without coordinates".to_string()))
}

fn array_field<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, RenderError> {
    value
        .get(key)
        .ok_or_else(|| RenderError::CoastlineParse(format!("missing \"{}\"", key)))
        .and_then(as_array)
}

fn as_array(value: &Value) -> Result<&Vec<Value>, RenderError> {
    value
        .as_array()
        .ok_or_else(|| RenderError::CoastlineParse(format!("expected an array, got {}", value)))
}

fn positions(value: &Value) -> Result<Vec<(f64, f64)>, RenderError> {
    as_array(value)?
        .iter()
        .map(|position| {
            let pair = as_array(position)?;
            match (
                pair.first().and_then(Value::as_f64),
                pair.get(1).and_then(Value::as_f64),
            ) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(RenderError::CoastlineParse(format!(
                    "invalid position {}",
                    position
                ))),
            }
        })
        .collect()
}
