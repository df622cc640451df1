//! Error types for rendering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },

    #[error("Invalid canvas configuration: {0}")]
    InvalidCanvas(String),

    #[error("Projection error: {0}")]
    Projection(#[from] projection::ProjectionError),

    #[error("Failed to read coastline {path}: {source}")]
    CoastlineIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid coastline GeoJSON: {0}")]
    CoastlineParse(String),

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
