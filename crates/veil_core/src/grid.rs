//! Checkpoint grid
//!
//! A fixed lattice of sample points over the mask. The erased percentage is
//! the share of these points that have been uncovered.

use crate::error::{MaskError, Result};

/// One sample point of the grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointPoint {
    pub x: f32,
    pub y: f32,
    pub covered: bool,
}

/// Row-major lattice of checkpoints, immutable once built
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointGrid {
    columns: usize,
    rows: usize,
    step: f32,
    points: Vec<CheckpointPoint>,
}

impl CheckpointGrid {
    /// Build a grid covering `width` x `height` with `step` spacing.
    ///
    /// Points sit at `step/2 + i*step`; the last column and row are centered
    /// between the previous point and the far edge.
    pub fn build(width: f32, height: f32, step: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !valid(step) {
            return Err(MaskError::InvalidGrid {
                width,
                height,
                step,
            });
        }

        let columns = (width / step).ceil() as usize;
        let rows = (height / step).ceil() as usize;
        let coordinate = |i: usize, count: usize, dimension: f32| {
            if i + 1 == count {
                dimension / 2.0 + (count - 1) as f32 * step / 2.0
            } else {
                step / 2.0 + i as f32 * step
            }
        };

        let mut points = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            let y = coordinate(row, rows, height);
            for column in 0..columns {
                points.push(CheckpointPoint {
                    x: coordinate(column, columns, width),
                    y,
                    covered: false,
                });
            }
        }

        tracing::debug!(
            "Built {}x{} checkpoint grid ({} points, step {})",
            columns,
            rows,
            points.len(),
            step
        );
        Ok(Self {
            columns,
            rows,
            step,
            points,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn points(&self) -> &[CheckpointPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count_is_ceil_product() {
        let grid = CheckpointGrid::build(200.0, 100.0, 20.0).unwrap();
        assert_eq!(grid.len(), 50);
        assert_eq!((grid.columns(), grid.rows()), (10, 5));

        let grid = CheckpointGrid::build(210.0, 95.0, 20.0).unwrap();
        assert_eq!(grid.len(), 11 * 5);
    }

    #[test]
    fn test_all_points_start_uncovered() {
        let grid = CheckpointGrid::build(200.0, 100.0, 20.0).unwrap();
        assert!(grid.points().iter().all(|p| !p.covered));
    }

    #[test]
    fn test_row_major_coordinates() {
        let grid = CheckpointGrid::build(200.0, 100.0, 20.0).unwrap();
        let points = grid.points();
        assert_eq!((points[0].x, points[0].y), (10.0, 10.0));
        assert_eq!((points[1].x, points[1].y), (30.0, 10.0));
        assert_eq!((points[10].x, points[10].y), (10.0, 30.0));
        assert_eq!((points[49].x, points[49].y), (190.0, 90.0));
    }

    #[test]
    fn test_last_column_recentered() {
        let grid = CheckpointGrid::build(210.0, 20.0, 20.0).unwrap();
        let last = grid.points()[grid.columns() - 1];
        // 210/2 + 10*20/2
        assert_eq!(last.x, 205.0);
        let single = CheckpointGrid::build(7.0, 7.0, 20.0).unwrap();
        assert_eq!(single.points()[0].x, 3.5);
    }

    #[test]
    fn test_deterministic() {
        let a = CheckpointGrid::build(123.0, 77.0, 9.0).unwrap();
        let b = CheckpointGrid::build(123.0, 77.0, 9.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(matches!(
            CheckpointGrid::build(200.0, 100.0, 0.0),
            Err(MaskError::InvalidGrid { .. })
        ));
        assert!(CheckpointGrid::build(0.0, 100.0, 20.0).is_err());
        assert!(CheckpointGrid::build(200.0, -1.0, 20.0).is_err());
        assert!(CheckpointGrid::build(f32::NAN, 100.0, 20.0).is_err());
    }
}
