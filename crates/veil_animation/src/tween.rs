//! Property tweens
//!
//! A tween interpolates a set of optional properties from a start value to
//! an end value over a fixed duration, shaped by an [`Easing`].

use crate::easing::Easing;

/// Properties that a tween can drive
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenProps {
    /// Opacity (0.0 to 1.0)
    pub opacity: Option<f32>,
    /// X position in pixels
    pub x: Option<f32>,
    /// Y position in pixels
    pub y: Option<f32>,
    /// Width in pixels
    pub width: Option<f32>,
    /// Height in pixels
    pub height: Option<f32>,
    /// Rotation in degrees
    pub rotate: Option<f32>,
}

impl TweenProps {
    /// Create properties with only opacity set
    pub fn opacity(value: f32) -> Self {
        Self {
            opacity: Some(value),
            ..Default::default()
        }
    }

    /// Create properties with only a position set
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Create properties with only rotation set
    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotate: Some(degrees),
            ..Default::default()
        }
    }

    /// Builder: set opacity
    pub fn with_opacity(mut self, value: f32) -> Self {
        self.opacity = Some(value);
        self
    }

    /// Builder: set position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Builder: set size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder: set rotation
    pub fn with_rotate(mut self, degrees: f32) -> Self {
        self.rotate = Some(degrees);
        self
    }

    /// Interpolate between two property sets
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: lerp_opt(self.opacity, other.opacity, t),
            x: lerp_opt(self.x, other.x, t),
            y: lerp_opt(self.y, other.y, t),
            width: lerp_opt(self.width, other.width, t),
            height: lerp_opt(self.height, other.height, t),
            rotate: lerp_opt(self.rotate, other.rotate, t),
        }
    }
}

fn lerp_opt(a: Option<f32>, b: Option<f32>, t: f32) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Result of advancing a tween by one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenFrame {
    /// Interpolated properties for this frame
    pub props: TweenProps,
    /// Set on the frame that reaches the end value
    pub finished: bool,
}

/// A single from/to tween
#[derive(Clone, Debug)]
pub struct Tween {
    from: TweenProps,
    to: TweenProps,
    duration_ms: f64,
    delay_ms: f64,
    easing: Easing,
    elapsed_ms: f64,
}

impl Tween {
    pub fn new(from: TweenProps, to: TweenProps, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            delay_ms: 0.0,
            easing: Easing::Linear,
            elapsed_ms: 0.0,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Hold the start value for `delay_ms` before the clock starts
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Raw progress `elapsed / duration`, not clamped
    pub fn progress(&self) -> f64 {
        let active = (self.elapsed_ms - self.delay_ms).max(0.0);
        if self.duration_ms <= 0.0 {
            return if self.elapsed_ms >= self.delay_ms { f64::INFINITY } else { 0.0 };
        }
        active / self.duration_ms
    }

    /// Advance by `dt_ms` and return the properties for this frame.
    ///
    /// Once progress exceeds 1 the end value is written exactly and the frame
    /// is flagged as finished.
    pub fn advance(&mut self, dt_ms: f64) -> TweenFrame {
        self.elapsed_ms += dt_ms.max(0.0);
        let p = self.progress();
        if p > 1.0 {
            return TweenFrame {
                props: self.to,
                finished: true,
            };
        }
        let eased = self.easing.apply(p) as f32;
        TweenFrame {
            props: self.from.lerp(&self.to, eased),
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fade() {
        let mut tween = Tween::new(TweenProps::opacity(1.0), TweenProps::opacity(0.0), 100.0);
        let frame = tween.advance(25.0);
        assert!(!frame.finished);
        assert!((frame.props.opacity.unwrap() - 0.75).abs() < 1e-6);

        let frame = tween.advance(50.0);
        assert!((frame.props.opacity.unwrap() - 0.25).abs() < 1e-6);

        let frame = tween.advance(50.0);
        assert!(frame.finished);
        assert_eq!(frame.props.opacity, Some(0.0));
    }

    #[test]
    fn test_delay_holds_start_value() {
        let mut tween = Tween::new(
            TweenProps::position(0.0, 0.0),
            TweenProps::position(0.0, 40.0),
            100.0,
        )
        .with_delay(50.0);
        let frame = tween.advance(40.0);
        assert_eq!(frame.props.y, Some(0.0));
        let frame = tween.advance(60.0);
        assert!((frame.props.y.unwrap() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut tween = Tween::new(TweenProps::rotation(0.0), TweenProps::rotation(90.0), 0.0);
        let frame = tween.advance(0.0);
        assert!(frame.finished);
        assert_eq!(frame.props.rotate, Some(90.0));
    }

    #[test]
    fn test_easing_shapes_progress() {
        let mut tween = Tween::new(TweenProps::opacity(0.0), TweenProps::opacity(1.0), 100.0)
            .with_easing(Easing::custom(|p| p * p));
        let frame = tween.advance(50.0);
        assert!((frame.props.opacity.unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_keeps_one_sided_values() {
        let a = TweenProps::opacity(1.0).with_position(0.0, 0.0);
        let b = TweenProps::rotation(45.0).with_position(10.0, 20.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.opacity, Some(1.0));
        assert_eq!(mid.rotate, Some(45.0));
        assert_eq!(mid.x, Some(5.0));
        assert_eq!(mid.y, Some(10.0));
        assert_eq!(mid.width, None);
    }
}
