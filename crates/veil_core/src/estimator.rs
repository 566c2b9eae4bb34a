//! Erased-percentage estimation
//!
//! Two strategies measure how much of the checkpoint grid has been uncovered:
//!
//! - **Pixel sampling** reads the surface alpha under each checkpoint.
//! - **Distance reconstruction** replays recorded stroke centers against the
//!   grid, for surfaces whose pixels cannot be read.
//!
//! The strategy is chosen once per surface by probing a pixel read.

use veil_paint::{Circle, Color, CompositeMode, FillStyle, Point, Surface};

use crate::error::Result;
use crate::grid::{CheckpointGrid, CheckpointPoint};
use crate::tracker::StrokeRecord;

/// Radius of the dots drawn in debug mode
const DEBUG_DOT_RADIUS: f32 = 2.0;

/// How coverage is measured
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    PixelSampling,
    DistanceReconstruction,
}

/// Tracks covered checkpoints for one surface lifetime
#[derive(Debug)]
pub struct PercentageEstimator {
    grid: CheckpointGrid,
    covered: Vec<bool>,
    covered_count: usize,
    strategy: Strategy,
    radius: f32,
    oval_brush: bool,
    oval_warned: bool,
}

impl PercentageEstimator {
    /// Estimator over `grid`; strokes cover points within `radius`
    pub fn new(grid: CheckpointGrid, radius: f32) -> Self {
        let covered = vec![false; grid.len()];
        Self {
            grid,
            covered,
            covered_count: 0,
            strategy: Strategy::PixelSampling,
            radius,
            oval_brush: false,
            oval_warned: false,
        }
    }

    /// Note that strokes are painted with an oval brush
    pub fn with_oval_brush(mut self, oval: bool) -> Self {
        self.oval_brush = oval;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn grid(&self) -> &CheckpointGrid {
        &self.grid
    }

    /// Pick the strategy for a freshly filled surface
    pub fn probe<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<Strategy> {
        self.strategy = match surface.read_alpha(0, 0) {
            Ok(_) => {
                tracing::debug!("Pixel reads available; estimating by pixel sampling");
                Strategy::PixelSampling
            }
            Err(e) if e.is_read_blocked() => {
                tracing::debug!("Pixel reads blocked ({}); estimating by stroke distance", e);
                Strategy::DistanceReconstruction
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.strategy)
    }

    /// Update coverage after a gesture and return the erased fraction.
    ///
    /// `strokes` is only consulted by distance reconstruction. A pixel read
    /// blocked mid-way switches the strategy and replays `strokes`.
    pub fn estimate<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        strokes: &[StrokeRecord],
    ) -> Result<f32> {
        if self.strategy == Strategy::PixelSampling {
            match self.sample_pixels(surface) {
                Ok(()) => return Ok(self.fraction()),
                Err(e) if e.is_read_blocked() => {
                    tracing::debug!("Pixel reads blocked ({}); switching to stroke distance", e);
                    self.strategy = Strategy::DistanceReconstruction;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.oval_brush && !self.oval_warned {
            tracing::warn!(
                "Oval brush on an unreadable surface; coverage is estimated with the circular radius"
            );
            self.oval_warned = true;
        }
        self.replay_strokes(strokes);
        Ok(self.fraction())
    }

    fn sample_pixels<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
    ) -> std::result::Result<(), veil_paint::SurfaceError> {
        for (point, covered) in self.grid.points().iter().zip(self.covered.iter_mut()) {
            if *covered {
                continue;
            }
            if surface.sample_alpha(point.x, point.y)? == Some(0) {
                *covered = true;
                self.covered_count += 1;
            }
        }
        Ok(())
    }

    fn replay_strokes(&mut self, strokes: &[StrokeRecord]) {
        let radius_sq = self.radius * self.radius;
        for stroke in strokes {
            let center = Point::new(stroke.x, stroke.y);
            for (point, covered) in self.grid.points().iter().zip(self.covered.iter_mut()) {
                if !*covered && center.distance_squared(Point::new(point.x, point.y)) <= radius_sq {
                    *covered = true;
                    self.covered_count += 1;
                }
            }
        }
    }

    /// Erased fraction in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.covered.is_empty() {
            return 0.0;
        }
        self.covered_count as f32 / self.covered.len() as f32
    }

    pub fn covered_count(&self) -> usize {
        self.covered_count
    }

    /// Grid points with their current coverage
    pub fn checkpoints(&self) -> Vec<CheckpointPoint> {
        self.grid
            .points()
            .iter()
            .zip(&self.covered)
            .map(|(point, &covered)| CheckpointPoint { covered, ..*point })
            .collect()
    }

    /// Draw the uncovered checkpoints, leaving the surface in subtractive mode
    pub fn paint_debug<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_composite_mode(CompositeMode::SourceOver);
        let dot = FillStyle::Color(Color::RED);
        for (point, covered) in self.grid.points().iter().zip(&self.covered) {
            if !covered {
                surface.fill_circle(
                    Circle::new(Point::new(point.x, point.y), DEBUG_DOT_RADIUS),
                    &dot,
                );
            }
        }
        surface.set_composite_mode(CompositeMode::DestinationOut);
    }
}
