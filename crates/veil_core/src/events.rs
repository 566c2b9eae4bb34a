//! Input and gesture events

/// Pointer input delivered by the host, in client coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    /// The pointer left the surface or the touch was interrupted
    PointerCancel,
}

impl InputEvent {
    /// Client position carried by the event, if any
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y } => Some((x, y)),
            InputEvent::PointerCancel => None,
        }
    }
}

/// Gesture lifecycle reported by the tracker, in surface coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Started { x: f32, y: f32 },
    Ended { x: f32, y: f32 },
}
