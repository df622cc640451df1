//! Map rendering for the wind map.
//!
//! Provides:
//! - A projected map canvas with graticule, coastline and frame border
//! - Flowing-dash streamline animation
//! - Quiver plots of the raw field
//! - PNG encoding of rendered frames

pub mod animation;
pub mod canvas;
pub mod coastline;
pub mod dash;
pub mod error;
pub mod frame;
pub mod png;
pub mod quiver;

pub use animation::{AnimationConfig, WindAnimation};
pub use canvas::{parse_hex_color, CanvasConfig, MapCanvas, PlotArea};
pub use coastline::Coastline;
pub use dash::{dash_colors, AnimationState, Rgb, SegmentSet};
pub use error::RenderError;
pub use frame::Frame;
pub use quiver::{render_quiver, QuiverConfig};
