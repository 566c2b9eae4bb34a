//! Erase gesture tracking
//!
//! A two-state machine: `Idle --down--> Erasing --up/cancel--> Idle`. Moves
//! while erasing paint the brush; everything else is ignored.

use veil_paint::{Point, Surface};

use crate::brush::Brush;
use crate::events::{GestureEvent, InputEvent};

/// Tracker state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EraseState {
    #[default]
    Idle,
    Erasing,
}

/// Center of one erase contact, kept for distance reconstruction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeRecord {
    pub x: f32,
    pub y: f32,
}

/// Turns pointer input into brush contacts and gesture events
#[derive(Debug)]
pub struct EraseTracker {
    state: EraseState,
    brush: Brush,
    /// Client position of the surface's top-left corner
    offset: Point,
    strokes: Vec<StrokeRecord>,
    last: Point,
    start_fired: bool,
    record_strokes: bool,
    /// (from, to) pairs, for debugging
    history: Vec<(EraseState, EraseState)>,
}

impl EraseTracker {
    pub fn new(brush: Brush, offset: Point) -> Self {
        Self {
            state: EraseState::Idle,
            brush,
            offset,
            strokes: Vec::new(),
            last: Point::ZERO,
            start_fired: false,
            record_strokes: false,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> EraseState {
        self.state
    }

    pub fn is_erasing(&self) -> bool {
        self.state == EraseState::Erasing
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Last erase position in surface coordinates
    pub fn last_position(&self) -> Point {
        self.last
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Keep stroke centers for estimators that cannot read pixels
    pub fn set_recording(&mut self, record: bool) {
        self.record_strokes = record;
    }

    pub fn strokes(&self) -> &[StrokeRecord] {
        &self.strokes
    }

    /// Hand over the recorded strokes, leaving the list empty
    pub fn take_strokes(&mut self) -> Vec<StrokeRecord> {
        std::mem::take(&mut self.strokes)
    }

    pub fn history(&self) -> &[(EraseState, EraseState)] {
        &self.history
    }

    /// Back to idle with no strokes, without emitting anything
    pub fn reset(&mut self) {
        self.state = EraseState::Idle;
        self.strokes.clear();
        self.start_fired = false;
    }

    /// Feed one input event, painting on `surface` as needed
    pub fn handle<S: Surface + ?Sized>(
        &mut self,
        event: InputEvent,
        surface: &mut S,
    ) -> Option<GestureEvent> {
        match (self.state, event) {
            (EraseState::Idle, InputEvent::PointerDown { x, y }) => {
                self.strokes.clear();
                self.last = self.local(x, y);
                self.transition(EraseState::Erasing);
                if self.start_fired {
                    return None;
                }
                self.start_fired = true;
                tracing::trace!("Gesture started at ({}, {})", self.last.x, self.last.y);
                Some(GestureEvent::Started {
                    x: self.last.x,
                    y: self.last.y,
                })
            }
            (EraseState::Erasing, InputEvent::PointerMove { x, y }) => {
                let point = self.local(x, y);
                self.brush.paint(surface, point.x, point.y);
                if self.record_strokes {
                    self.strokes.push(StrokeRecord {
                        x: point.x,
                        y: point.y,
                    });
                }
                self.last = point;
                None
            }
            (EraseState::Erasing, InputEvent::PointerUp { .. } | InputEvent::PointerCancel) => {
                self.transition(EraseState::Idle);
                self.start_fired = false;
                Some(GestureEvent::Ended {
                    x: self.last.x,
                    y: self.last.y,
                })
            }
            // Down while erasing, moves and ups while idle
            _ => None,
        }
    }

    fn local(&self, x: f32, y: f32) -> Point {
        Point::new(x - self.offset.x, y - self.offset.y)
    }

    fn transition(&mut self, to: EraseState) {
        self.history.push((self.state, to));
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaskConfig;
    use veil_paint::RecordingSurface;

    fn tracker() -> EraseTracker {
        EraseTracker::new(
            Brush::from_config(&MaskConfig::default()),
            Point::new(10.0, 20.0),
        )
    }

    #[test]
    fn test_gesture_lifecycle() {
        let mut tracker = tracker();
        let mut surface = RecordingSurface::new(100, 100);

        let started = tracker.handle(InputEvent::PointerDown { x: 30.0, y: 40.0 }, &mut surface);
        assert_eq!(started, Some(GestureEvent::Started { x: 20.0, y: 20.0 }));
        assert!(tracker.is_erasing());

        tracker.handle(InputEvent::PointerMove { x: 50.0, y: 60.0 }, &mut surface);
        let ended = tracker.handle(InputEvent::PointerUp { x: 0.0, y: 0.0 }, &mut surface);
        assert_eq!(ended, Some(GestureEvent::Ended { x: 40.0, y: 40.0 }));
        assert_eq!(tracker.state(), EraseState::Idle);
        assert_eq!(
            tracker.history(),
            &[
                (EraseState::Idle, EraseState::Erasing),
                (EraseState::Erasing, EraseState::Idle)
            ]
        );
    }

    #[test]
    fn test_down_while_erasing_is_noop() {
        let mut tracker = tracker();
        let mut surface = RecordingSurface::new(100, 100);
        tracker.handle(InputEvent::PointerDown { x: 10.0, y: 20.0 }, &mut surface);
        tracker.set_recording(true);
        tracker.handle(InputEvent::PointerMove { x: 15.0, y: 25.0 }, &mut surface);

        let again = tracker.handle(InputEvent::PointerDown { x: 90.0, y: 90.0 }, &mut surface);
        assert_eq!(again, None);
        assert_eq!(tracker.strokes().len(), 1);
        assert_eq!(tracker.last_position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_idle_moves_and_ups_ignored() {
        let mut tracker = tracker();
        let mut surface = RecordingSurface::new(100, 100);
        let log = surface.log();
        assert_eq!(
            tracker.handle(InputEvent::PointerMove { x: 50.0, y: 50.0 }, &mut surface),
            None
        );
        assert_eq!(
            tracker.handle(InputEvent::PointerUp { x: 50.0, y: 50.0 }, &mut surface),
            None
        );
        assert_eq!(tracker.handle(InputEvent::PointerCancel, &mut surface), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_strokes_recorded_only_when_enabled() {
        let mut tracker = tracker();
        let mut surface = RecordingSurface::new(100, 100);
        tracker.handle(InputEvent::PointerDown { x: 10.0, y: 20.0 }, &mut surface);
        tracker.handle(InputEvent::PointerMove { x: 20.0, y: 30.0 }, &mut surface);
        assert!(tracker.strokes().is_empty());

        tracker.set_recording(true);
        tracker.handle(InputEvent::PointerMove { x: 30.0, y: 40.0 }, &mut surface);
        assert_eq!(tracker.take_strokes(), vec![StrokeRecord { x: 20.0, y: 20.0 }]);
        assert!(tracker.strokes().is_empty());
    }

    #[test]
    fn test_cancel_ends_gesture_and_new_down_clears_strokes() {
        let mut tracker = tracker();
        tracker.set_recording(true);
        let mut surface = RecordingSurface::new(100, 100);
        tracker.handle(InputEvent::PointerDown { x: 10.0, y: 20.0 }, &mut surface);
        tracker.handle(InputEvent::PointerMove { x: 20.0, y: 30.0 }, &mut surface);
        assert!(matches!(
            tracker.handle(InputEvent::PointerCancel, &mut surface),
            Some(GestureEvent::Ended { .. })
        ));

        let started = tracker.handle(InputEvent::PointerDown { x: 10.0, y: 20.0 }, &mut surface);
        assert!(matches!(started, Some(GestureEvent::Started { .. })));
        assert!(tracker.strokes().is_empty());
    }
}
