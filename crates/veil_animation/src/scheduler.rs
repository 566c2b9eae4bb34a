//! Animation scheduler
//!
//! Owns every running tween and advances them once per frame. Frames come from
//! a [`FrameSource`]: the host's "next repaint" hook when it has one, or a
//! fixed 16 ms timer otherwise.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::tween::{Tween, TweenProps};

new_key_type! {
    pub struct TweenId;
}

/// Frame interval used when no repaint hook is available
pub const FALLBACK_FRAME_MS: f64 = 16.0;

/// A clock that yields one frame at a time
pub trait FrameSource {
    /// Wait for the next frame and return the milliseconds elapsed since the
    /// previous one.
    fn next_frame(&mut self) -> f64;
}

/// Wall-clock source sleeping a fixed interval between frames
pub struct TimerFrames {
    interval: Duration,
    last: Instant,
}

impl TimerFrames {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }
}

impl Default for TimerFrames {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(FALLBACK_FRAME_MS / 1000.0))
    }
}

impl FrameSource for TimerFrames {
    fn next_frame(&mut self) -> f64 {
        std::thread::sleep(self.interval);
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f64() * 1000.0;
        self.last = now;
        dt
    }
}

/// Virtual clock advancing a constant step per frame, without sleeping
#[derive(Clone, Copy, Debug)]
pub struct FixedFrames {
    step_ms: f64,
}

impl FixedFrames {
    pub fn new(step_ms: f64) -> Self {
        Self { step_ms }
    }
}

impl Default for FixedFrames {
    fn default() -> Self {
        Self::new(FALLBACK_FRAME_MS)
    }
}

impl FrameSource for FixedFrames {
    fn next_frame(&mut self) -> f64 {
        self.step_ms
    }
}

/// Cooperative cancellation flag shared between an owner and its animations
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

type FrameFn = Box<dyn FnMut(&TweenProps)>;
type CompleteFn = Box<dyn FnOnce()>;

/// A tween together with the callbacks it drives
pub struct Animation {
    tween: Tween,
    on_frame: Option<FrameFn>,
    on_complete: Option<CompleteFn>,
    cancel: Option<CancelToken>,
}

impl Animation {
    pub fn new(tween: Tween) -> Self {
        Self {
            tween,
            on_frame: None,
            on_complete: None,
            cancel: None,
        }
    }

    /// Called every frame with the interpolated properties
    pub fn on_frame<F: FnMut(&TweenProps) + 'static>(mut self, f: F) -> Self {
        self.on_frame = Some(Box::new(f));
        self
    }

    /// Called once after the final frame
    pub fn on_complete<F: FnOnce() + 'static>(mut self, f: F) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Drop this animation silently once the token is cancelled
    pub fn cancel_with(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// The animation scheduler that ticks all active tweens
pub struct AnimationScheduler {
    animations: SlotMap<TweenId, Animation>,
    frames: u64,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            animations: SlotMap::with_key(),
            frames: 0,
        }
    }

    pub fn add(&mut self, animation: Animation) -> TweenId {
        self.animations.insert(animation)
    }

    /// Remove an animation without running its completion callback
    pub fn remove(&mut self, id: TweenId) -> bool {
        self.animations.remove(id).is_some()
    }

    /// Drop every animation without running any callback
    pub fn clear(&mut self) {
        if !self.animations.is_empty() {
            tracing::debug!("dropping {} running animations", self.animations.len());
        }
        self.animations.clear();
    }

    /// Advance every animation by `dt_ms`.
    ///
    /// Frame callbacks run in insertion order; completion callbacks run after
    /// all frame callbacks of this tick.
    pub fn tick(&mut self, dt_ms: f64) {
        self.frames += 1;

        let mut cancelled = Vec::new();
        let mut finished = Vec::new();
        for (id, animation) in self.animations.iter_mut() {
            if animation.is_cancelled() {
                cancelled.push(id);
                continue;
            }
            let frame = animation.tween.advance(dt_ms);
            if let Some(on_frame) = animation.on_frame.as_mut() {
                on_frame(&frame.props);
            }
            if frame.finished {
                finished.push(id);
            }
        }

        for id in cancelled {
            self.animations.remove(id);
        }
        for id in finished {
            if let Some(done) = self.animations.remove(id).and_then(|a| a.on_complete) {
                done();
            }
        }
    }

    /// Drive frames from `source` until no animation is left. Falls back to
    /// a [`TimerFrames`] source when the host provides none.
    ///
    /// Returns the number of frames run.
    pub fn run(&mut self, source: Option<&mut dyn FrameSource>) -> u64 {
        let mut fallback;
        let source: &mut dyn FrameSource = match source {
            Some(source) => source,
            None => {
                fallback = TimerFrames::default();
                &mut fallback
            }
        };

        let start = self.frames;
        while self.has_active_animations() {
            let dt = source.next_frame();
            self.tick(dt);
        }
        self.frames - start
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Get the number of animations in the scheduler
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Total frames ticked since creation
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
