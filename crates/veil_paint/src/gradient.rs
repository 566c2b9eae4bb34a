//! Gradient fills

use crate::color::Color;
use crate::path::Point;

/// A gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32, // 0.0 to 1.0
    pub color: Color,
}

/// Radial gradient centered on a single point
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    /// Create a simple radial gradient between two colors
    pub fn simple(center: Point, radius: f32, from: Color, to: Color) -> Self {
        Self {
            center,
            radius,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }

    /// Ring fading from opaque `color` at `inner` to transparent at `outer`.
    ///
    /// Everything inside `inner` is fully opaque.
    pub fn feather_ring(center: Point, inner: f32, outer: f32, color: Color) -> Self {
        let split = if outer > 0.0 {
            (inner / outer).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            center,
            radius: outer,
            stops: vec![
                GradientStop {
                    offset: split,
                    color: color.with_alpha(1.0),
                },
                GradientStop {
                    offset: 1.0,
                    color: color.with_alpha(0.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feather_ring_stops() {
        let ring = RadialGradient::feather_ring(Point::ZERO, 20.0, 30.0, Color::BLACK);
        assert_eq!(ring.radius, 30.0);
        assert!((ring.stops[0].offset - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(ring.stops[0].color.a, 1.0);
        assert_eq!(ring.stops[1].color.a, 0.0);
    }
}
