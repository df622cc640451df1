//! Wind field primitives for the wind map pipeline.
//!
//! - Regular lat/lon grids over a geographic bounding box
//! - Synthetic vector fields evaluated on those grids
//! - Evenly spaced streamline extraction

pub mod bbox;
pub mod error;
pub mod field;
pub mod grid;
pub mod streamlines;

pub use bbox::BoundingBox;
pub use error::{FieldError, FieldResult};
pub use field::VectorField;
pub use grid::Grid;
pub use streamlines::{EvenlySpacedStreamlines, Point, Streamline, StreamlineExtractor};
