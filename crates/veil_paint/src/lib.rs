//! Veil Paint API
//!
//! The drawable surface the erasable mask lives on.
//!
//! # Features
//!
//! - Surface trait with normal and subtractive composite modes
//! - Shape primitives (rect, circle, two-half cubic oval)
//! - Solid and radial gradient fills, repeating image fills
//! - Best-effort pixel alpha reads with edge-aware sampling
//! - `PixmapSurface`: tiny-skia raster backend with PNG I/O
//! - `RecordingSurface`: command log for hosts that rasterize elsewhere

pub mod color;
pub mod context;
pub mod gradient;
pub mod path;
pub mod pixmap;
pub mod primitives;
pub mod surface;

pub use color::Color;
pub use context::{CommandLog, PaintCommand, RecordingSurface};
pub use gradient::{GradientStop, RadialGradient};
pub use path::{Path, PathBuilder, PathCommand, Point};
pub use pixmap::PixmapSurface;
pub use primitives::*;
pub use surface::{
    CompositeMode, FillStyle, MaskImage, Result, Surface, SurfaceError, Transform2D,
};
