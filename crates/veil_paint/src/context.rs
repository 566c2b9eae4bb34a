//! Recording surface - logs paint commands instead of rasterizing

use std::cell::RefCell;
use std::rc::Rc;

use crate::path::Path;
use crate::primitives::{Circle, Rect};
use crate::surface::{
    CompositeMode, FillStyle, MaskImage, Result, Surface, SurfaceError, Transform2D,
};

/// A paint command recorded by [`RecordingSurface`]
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    SetCompositeMode(CompositeMode),
    SetOpacity(f32),
    FillRect {
        rect: Rect,
        style: FillStyle,
        mode: CompositeMode,
    },
    FillImage {
        rect: Rect,
        image_width: u32,
        image_height: u32,
        mode: CompositeMode,
    },
    FillCircle {
        circle: Circle,
        style: FillStyle,
        mode: CompositeMode,
    },
    FillPath {
        path: Path,
        style: FillStyle,
        transform: Transform2D,
        mode: CompositeMode,
    },
}

/// Shared handle to a recording surface's command log.
///
/// Stays readable after the surface itself has been dropped.
#[derive(Clone, Debug, Default)]
pub struct CommandLog {
    commands: Rc<RefCell<Vec<PaintCommand>>>,
}

impl CommandLog {
    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    /// Snapshot of recorded commands
    pub fn commands(&self) -> Vec<PaintCommand> {
        self.commands.borrow().clone()
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&self) -> Vec<PaintCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    fn push(&self, command: PaintCommand) {
        self.commands.borrow_mut().push(command);
    }
}

/// Surface that records every paint call and has no readable pixels.
///
/// Pixel reads always fail with [`SurfaceError::PixelsUnavailable`], so an
/// estimator running on it falls back to distance reconstruction.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    mode: CompositeMode,
    opacity: f32,
    log: CommandLog,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_log(width, height, CommandLog::default())
    }

    /// Record into an existing log
    pub fn with_log(width: u32, height: u32, log: CommandLog) -> Self {
        Self {
            width,
            height,
            mode: CompositeMode::SourceOver,
            opacity: 1.0,
            log,
        }
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn composite_mode(&self) -> CompositeMode {
        self.mode
    }

    fn set_composite_mode(&mut self, mode: CompositeMode) {
        self.mode = mode;
        self.log.push(PaintCommand::SetCompositeMode(mode));
    }

    fn fill_rect(&mut self, rect: Rect, style: &FillStyle) {
        self.log.push(PaintCommand::FillRect {
            rect,
            style: style.clone(),
            mode: self.mode,
        });
    }

    fn fill_image(&mut self, rect: Rect, image: &MaskImage) {
        self.log.push(PaintCommand::FillImage {
            rect,
            image_width: image.width,
            image_height: image.height,
            mode: self.mode,
        });
    }

    fn fill_circle(&mut self, circle: Circle, style: &FillStyle) {
        self.log.push(PaintCommand::FillCircle {
            circle,
            style: style.clone(),
            mode: self.mode,
        });
    }

    fn fill_path(&mut self, path: &Path, style: &FillStyle, transform: Transform2D) {
        self.log.push(PaintCommand::FillPath {
            path: path.clone(),
            style: style.clone(),
            transform,
            mode: self.mode,
        });
    }

    fn read_alpha(&self, _x: u32, _y: u32) -> Result<u8> {
        Err(SurfaceError::PixelsUnavailable)
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.log.push(PaintCommand::SetOpacity(opacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::path::Point;

    #[test]
    fn test_records_mode_with_each_fill() {
        let mut surface = RecordingSurface::new(100, 50);
        let log = surface.log();

        surface.fill_rect(Rect::new(0.0, 0.0, 100.0, 50.0), &Color::BLACK.into());
        surface.set_composite_mode(CompositeMode::DestinationOut);
        surface.fill_circle(Circle::new(Point::new(10.0, 10.0), 5.0), &Color::BLACK.into());

        let commands = log.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            PaintCommand::FillRect {
                mode: CompositeMode::SourceOver,
                ..
            }
        ));
        assert!(matches!(
            commands[2],
            PaintCommand::FillCircle {
                mode: CompositeMode::DestinationOut,
                ..
            }
        ));
    }

    #[test]
    fn test_log_outlives_surface() {
        let log = {
            let mut surface = RecordingSurface::new(10, 10);
            surface.set_opacity(0.5);
            surface.log()
        };
        assert_eq!(log.take_commands(), vec![PaintCommand::SetOpacity(0.5)]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_pixels_unavailable() {
        let surface = RecordingSurface::new(10, 10);
        assert_eq!(
            surface.sample_alpha(5.5, 5.5),
            Err(SurfaceError::PixelsUnavailable)
        );
    }
}
