//! Erase brush
//!
//! Paints one erase contact onto a surface that is already in subtractive
//! composite mode.

use veil_paint::{
    Circle, Color, FillStyle, PathBuilder, Point, RadialGradient, Surface, Transform2D,
};

use crate::config::MaskConfig;

/// Footprint of one erase contact
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BrushShape {
    Circle {
        radius: f32,
    },
    /// Oval rotated counter-clockwise by `angle` degrees about its center
    Oval {
        width: f32,
        height: f32,
        angle: f32,
    },
}

/// Erase brush with an optional feathered edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub shape: BrushShape,
    /// Width of the edge fading from full erase to none
    pub feather: f32,
}

impl Brush {
    pub fn from_config(config: &MaskConfig) -> Self {
        let shape = match config.oval() {
            Some((width, height)) => BrushShape::Oval {
                width,
                height,
                angle: config.angle,
            },
            None => BrushShape::Circle {
                radius: config.radius,
            },
        };
        Self {
            shape,
            feather: config.alpha_radius.max(0.0),
        }
    }

    pub fn is_oval(&self) -> bool {
        matches!(self.shape, BrushShape::Oval { .. })
    }

    /// Paint one contact centered on `(x, y)`
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S, x: f32, y: f32) {
        let center = Point::new(x, y);
        let solid = FillStyle::Color(Color::BLACK);

        match self.shape {
            BrushShape::Circle { radius } => {
                if self.feather > 0.0 {
                    let outer = radius + self.feather;
                    let ring = RadialGradient::feather_ring(center, radius, outer, Color::BLACK);
                    surface.fill_circle(Circle::new(center, outer), &ring.into());
                }
                surface.fill_circle(Circle::new(center, radius), &solid);
            }
            BrushShape::Oval {
                width,
                height,
                angle,
            } => {
                let transform = Transform2D::rotate_ccw_about(angle, x, y);
                // Feathering only extends the oval along its height
                if self.feather > 0.0 {
                    let half = height / 2.0;
                    let ring = RadialGradient::feather_ring(
                        center,
                        half,
                        half + self.feather,
                        Color::BLACK,
                    );
                    let outer = PathBuilder::oval(x, y, width, height + 2.0 * self.feather);
                    surface.fill_path(&outer, &ring.into(), transform);
                }
                let core = PathBuilder::oval(x, y, width, height);
                surface.fill_path(&core, &solid, transform);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaskOptions;
    use veil_paint::{CompositeMode, PaintCommand, RecordingSurface};

    #[test]
    fn test_circle_with_feather_paints_ring_then_core() {
        let brush = Brush::from_config(&MaskConfig::default());
        let mut surface = RecordingSurface::new(100, 100);
        surface.set_composite_mode(CompositeMode::DestinationOut);
        let log = surface.log();
        log.take_commands();

        brush.paint(&mut surface, 50.0, 40.0);
        let commands = log.commands();
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            PaintCommand::FillCircle {
                circle,
                style: FillStyle::Radial(ring),
                mode: CompositeMode::DestinationOut,
            } => {
                assert_eq!(circle.radius, 30.0);
                assert_eq!(ring.radius, 30.0);
            }
            other => panic!("expected feather ring, got {other:?}"),
        }
        match &commands[1] {
            PaintCommand::FillCircle {
                circle,
                style: FillStyle::Color(_),
                ..
            } => assert_eq!(circle.radius, 20.0),
            other => panic!("expected solid core, got {other:?}"),
        }
    }

    #[test]
    fn test_circle_without_feather_paints_core_only() {
        let config = MaskConfig::from(MaskOptions {
            alpha_radius: Some(0.0),
            ..Default::default()
        });
        let mut surface = RecordingSurface::new(100, 100);
        Brush::from_config(&config).paint(&mut surface, 10.0, 10.0);
        assert_eq!(surface.log().len(), 1);
    }

    #[test]
    fn test_oval_feather_extends_height_only() {
        let config = MaskConfig::from(MaskOptions {
            erase_width: Some(50.0),
            erase_height: Some(140.0),
            angle: Some(45.0),
            ..Default::default()
        });
        let brush = Brush::from_config(&config);
        assert!(brush.is_oval());

        let mut surface = RecordingSurface::new(300, 300);
        brush.paint(&mut surface, 150.0, 150.0);
        let commands = surface.log().commands();
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            PaintCommand::FillPath {
                path, transform, ..
            } => {
                assert_eq!(
                    path,
                    &PathBuilder::oval(150.0, 150.0, 50.0, 160.0)
                );
                assert_eq!(transform, &Transform2D::rotate_ccw_about(45.0, 150.0, 150.0));
            }
            other => panic!("expected oval feather, got {other:?}"),
        }
    }
}
