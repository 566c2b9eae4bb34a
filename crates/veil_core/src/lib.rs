//! Veil Core
//!
//! The erasable mask engine: an overlay surface the user scratches off with
//! pointer input.
//!
//! - **Checkpoint grid**: fixed lattice of sample points over the mask
//! - **Erase tracking**: `Idle`/`Erasing` gesture state machine painting the brush
//! - **Percentage estimation**: pixel sampling, or stroke-distance replay when
//!   pixels cannot be read
//! - **Controller**: lifecycle, thresholds, fade-out and brush animations
//!
//! # Example
//!
//! ```rust
//! use veil_core::{InputEvent, MaskCallbacks, MaskConfig, MaskController, PixmapHost};
//! use veil_paint::Rect;
//!
//! let mut mask = MaskController::new(
//!     PixmapHost::new(Rect::new(0.0, 0.0, 200.0, 100.0)),
//!     MaskConfig::default(),
//!     MaskCallbacks::new().on_percent(|percent, x, y| {
//!         println!("{percent:.0}% erased, last at ({x}, {y})");
//!     }),
//! )
//! .unwrap();
//!
//! mask.start().unwrap();
//! mask.handle_event(InputEvent::PointerDown { x: 100.0, y: 50.0 }).unwrap();
//! mask.handle_event(InputEvent::PointerMove { x: 100.0, y: 50.0 }).unwrap();
//! mask.handle_event(InputEvent::PointerUp { x: 100.0, y: 50.0 }).unwrap();
//! assert!(mask.percent() > 0.0);
//! ```

pub mod brush;
pub mod config;
pub mod controller;
pub mod error;
pub mod estimator;
pub mod events;
pub mod grid;
pub mod host;
pub mod stage;
pub mod tracker;

pub use brush::{Brush, BrushShape};
pub use config::{AutoClear, BrushTarget, MaskCallbacks, MaskConfig, MaskOptions, RainRule};
pub use controller::MaskController;
pub use error::{MaskError, Result};
pub use estimator::{PercentageEstimator, Strategy};
pub use events::{GestureEvent, InputEvent};
pub use grid::{CheckpointGrid, CheckpointPoint};
pub use host::{PixmapHost, RecordingHost, SurfaceHost};
pub use stage::{DropId, SharedStage, Stage};
pub use tracker::{EraseState, EraseTracker, StrokeRecord};
