//! Veil Animation System
//!
//! Easing curves, frame-scheduled tweens, and completion barriers.
//!
//! # Features
//!
//! - **Bezier easing**: CSS-compatible cubic curves and higher-order splines
//! - **Named presets**: `ease*`, `easeIn/Out/InOut/OutIn` families, custom registrations
//! - **Tweens**: Opacity, position, size and rotation driven per frame
//! - **Barriers**: Run teardown once several animations have all finished

pub mod barrier;
pub mod easing;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod tween;

pub use barrier::CompletionBarrier;
pub use easing::{Bezier, Easing, Fragment};
pub use error::{EasingError, Result};
pub use registry::{CurveSpec, EasingRegistry};
pub use scheduler::{
    Animation, AnimationScheduler, CancelToken, FixedFrames, FrameSource, TimerFrames, TweenId,
    FALLBACK_FRAME_MS,
};
pub use tween::{Tween, TweenFrame, TweenProps};
