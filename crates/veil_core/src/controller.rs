//! Mask controller
//!
//! Owns the surface, the gesture tracker and the estimator for one masked
//! target, and drives the follow-on animations once erase thresholds are
//! crossed.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► start ──► handle_event* ──► clear(ms) ──► (fade + brush rotate) ──► teardown
//!           │                            │
//!           └─ None if target missing    └─ 0 ms: teardown immediately
//! ```
//!
//! `stop()` may be called at any point; it releases the surface and drops
//! every scheduled animation.

use std::cell::RefCell;
use std::rc::Rc;

use veil_animation::{
    Animation, AnimationScheduler, CancelToken, CompletionBarrier, Easing, EasingRegistry,
    FrameSource, TimerFrames, Tween, TweenProps,
};
use veil_paint::{Color, CompositeMode, Point, Rect, Surface};

use crate::brush::Brush;
use crate::config::{MaskCallbacks, MaskConfig, RainRule};
use crate::error::{MaskError, Result};
use crate::estimator::{PercentageEstimator, Strategy};
use crate::events::{GestureEvent, InputEvent};
use crate::grid::{CheckpointGrid, CheckpointPoint};
use crate::host::SurfaceHost;
use crate::stage::{SharedStage, Stage};
use crate::tracker::EraseTracker;

/// Fade and brush rotation both report to the teardown barrier
const CLEAR_PARTICIPANTS: u32 = 2;

enum Outcome {
    Started { x: f32, y: f32 },
    Ended { fraction: f32, x: f32, y: f32 },
}

/// Erasable mask over one target
pub struct MaskController<H: SurfaceHost> {
    host: H,
    config: MaskConfig,
    callbacks: MaskCallbacks,
    fill: Color,
    fade_easing: Easing,
    rotate_easing: Easing,
    drop_easing: Easing,
    stage: SharedStage<H::Surface>,
    tracker: EraseTracker,
    estimator: Option<PercentageEstimator>,
    scheduler: AnimationScheduler,
    cancel: CancelToken,
    mask_rect: Option<Rect>,
    clearing: bool,
}

impl<H: SurfaceHost> MaskController<H> {
    /// Controller using the built-in easing presets
    pub fn new(host: H, config: MaskConfig, callbacks: MaskCallbacks) -> Result<Self> {
        Self::with_registry(host, config, callbacks, &EasingRegistry::new())
    }

    /// Controller resolving the configured easing names against `registry`
    pub fn with_registry(
        host: H,
        config: MaskConfig,
        callbacks: MaskCallbacks,
        registry: &EasingRegistry,
    ) -> Result<Self> {
        let color = Color::parse_css(&config.color)
            .ok_or_else(|| MaskError::InvalidColor(config.color.clone()))?;
        let fill = color.with_alpha(color.a * (config.alpha_percent / 100.0).clamp(0.0, 1.0));

        let step = config.check_distance;
        if !(step.is_finite() && step > 0.0) {
            let bounds = host.bounds().unwrap_or_default();
            return Err(MaskError::InvalidGrid {
                width: bounds.width,
                height: bounds.height,
                step,
            });
        }

        let fade_easing = registry.get(&config.fade_easing)?;
        let rotate_easing = registry.get(&config.rotate_easing)?;
        let drop_easing = registry.get(&config.drop_easing)?;
        let tracker = EraseTracker::new(Brush::from_config(&config), Point::ZERO);

        Ok(Self {
            host,
            config,
            callbacks,
            fill,
            fade_easing,
            rotate_easing,
            drop_easing,
            stage: Rc::new(RefCell::new(Stage::new())),
            tracker,
            estimator: None,
            scheduler: AnimationScheduler::new(),
            cancel: CancelToken::new(),
            mask_rect: None,
            clearing: false,
        })
    }

    /// Create and fill the surface and start accepting input.
    ///
    /// Returns `None` when the host has no target or the surface cannot be
    /// built. Starting an already started mask does nothing.
    pub fn start(&mut self) -> Option<&mut Self> {
        if self.is_started() {
            return Some(self);
        }
        let Some(bounds) = self.host.bounds() else {
            tracing::warn!("Mask target missing; controller stays inactive");
            return None;
        };
        if let Err(e) = self.build_surface(bounds) {
            tracing::error!("Cannot build mask surface: {}", e);
            return None;
        }

        self.stage.borrow_mut().listening = true;
        if let Some(rect) = self.mask_rect {
            tracing::info!(
                "Mask started: {}x{} at ({}, {})",
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
        }
        Some(self)
    }

    /// Stop input, release the surface and drop every animation
    pub fn stop(&mut self) -> &mut Self {
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.scheduler.clear();

        let released = {
            let mut stage = self.stage.borrow_mut();
            let had_surface = stage.has_surface();
            stage.release();
            stage.torn_down = false;
            had_surface
        };
        self.estimator = None;
        self.tracker.reset();
        self.mask_rect = None;
        self.clearing = false;

        if released {
            tracing::info!("Mask stopped; surface released");
        }
        self
    }

    /// Fade the mask out while the brush sprite rotates to its target, then
    /// tear down and call `on_done`.
    ///
    /// A non-positive duration tears down immediately. Does nothing if the
    /// mask is not started or already clearing.
    pub fn clear<F: FnOnce() + 'static>(&mut self, duration_ms: f64, on_done: F) -> &mut Self {
        if self.clearing || !self.is_started() {
            return self;
        }
        self.clearing = true;
        let target = self.brush_target();

        if duration_ms <= 0.0 {
            tracing::debug!("Clearing mask immediately");
            {
                let mut stage = self.stage.borrow_mut();
                if let Some(surface) = stage.surface.as_mut() {
                    surface.set_opacity(0.0);
                }
                stage.brush = target;
            }
            self.stop();
            on_done();
            return self;
        }

        tracing::debug!("Clearing mask over {} ms", duration_ms);
        let opacity = {
            let mut stage = self.stage.borrow_mut();
            stage.listening = false;
            stage.surface.as_ref().map_or(1.0, |s| s.opacity())
        };

        let mut on_done = Some(on_done);
        let barrier_stage = Rc::clone(&self.stage);
        let barrier = CompletionBarrier::new(CLEAR_PARTICIPANTS, move || {
            {
                let mut stage = barrier_stage.borrow_mut();
                stage.release();
                stage.torn_down = true;
            }
            tracing::debug!("Clear animations finished; mask torn down");
            if let Some(done) = on_done.take() {
                done();
            }
        });

        let fade = Tween::new(
            TweenProps::opacity(opacity),
            TweenProps::opacity(0.0),
            duration_ms,
        )
        .with_easing(self.fade_easing.clone());
        let fade_stage = Rc::clone(&self.stage);
        let fade_barrier = barrier.clone();
        self.scheduler.add(
            Animation::new(fade)
                .on_frame(move |props| {
                    let mut stage = fade_stage.borrow_mut();
                    let Some(surface) = stage.surface.as_mut() else {
                        return;
                    };
                    surface.set_opacity(props.opacity.unwrap_or(0.0));
                })
                .on_complete(move || {
                    fade_barrier.arrive();
                })
                .cancel_with(self.cancel.clone()),
        );

        let from = self.stage.borrow().brush;
        let rotate = Tween::new(from, target, duration_ms).with_easing(self.rotate_easing.clone());
        let rotate_stage = Rc::clone(&self.stage);
        self.scheduler.add(
            Animation::new(rotate)
                .on_frame(move |props| {
                    let mut stage = rotate_stage.borrow_mut();
                    if !stage.has_surface() {
                        return;
                    }
                    stage.brush = *props;
                })
                .on_complete(move || {
                    barrier.arrive();
                })
                .cancel_with(self.cancel.clone()),
        );
        self
    }

    /// Tear down immediately
    pub fn close(&mut self) -> &mut Self {
        self.clear(0.0, || {})
    }

    /// Re-read the target bounds and rebuild surface and grid.
    ///
    /// Erase progress starts over on the new surface.
    pub fn refresh_size(&mut self) -> &mut Self {
        if !self.is_started() || self.clearing {
            return self;
        }
        let Some(bounds) = self.host.bounds() else {
            tracing::warn!("Mask target gone during resize; stopping");
            return self.stop();
        };

        let listening = {
            let mut stage = self.stage.borrow_mut();
            stage.surface = None;
            stage.listening
        };
        if let Err(e) = self.build_surface(bounds) {
            tracing::error!("Cannot rebuild mask surface: {}", e);
            return self.stop();
        }
        self.stage.borrow_mut().listening = listening;
        tracing::debug!("Mask resized to {}x{}", bounds.width, bounds.height);
        self
    }

    /// Feed one pointer event.
    ///
    /// Fails with [`MaskError::MissingCallback`] when a gesture completes and
    /// no percent callback is registered.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        let outcome = {
            let mut guard = self.stage.borrow_mut();
            let stage = &mut *guard;
            if !stage.listening {
                return Ok(());
            }
            let Some(surface) = stage.surface.as_mut() else {
                return Ok(());
            };

            let gesture = self.tracker.handle(event, surface);
            if self.tracker.is_erasing() {
                let last = self.tracker.last_position();
                stage.brush = stage.brush.with_position(last.x, last.y);
            }

            match gesture {
                None => return Ok(()),
                Some(GestureEvent::Started { x, y }) => Outcome::Started { x, y },
                Some(GestureEvent::Ended { x, y }) => {
                    let Some(estimator) = self.estimator.as_mut() else {
                        return Ok(());
                    };
                    let strokes = self.tracker.take_strokes();
                    let fraction = estimator.estimate(&*surface, &strokes)?;
                    if self.config.debug {
                        estimator.paint_debug(surface);
                    }
                    Outcome::Ended { fraction, x, y }
                }
            }
        };

        match outcome {
            Outcome::Started { x, y } => {
                if let Some(callback) = self.callbacks.gesture_start.as_mut() {
                    callback(x, y);
                }
                let percent = self.percent();
                let rules = matching_rules(&self.config.start_rain, percent);
                self.spawn_drops(&rules, x, y);
            }
            Outcome::Ended { fraction, x, y } => {
                let percent = fraction * 100.0;
                tracing::debug!("Gesture ended at ({}, {}): {:.1}% erased", x, y, percent);
                let callback = self
                    .callbacks
                    .percent
                    .as_mut()
                    .ok_or(MaskError::MissingCallback)?;
                callback(percent, x, y);

                let rules = matching_rules(&self.config.rain, percent);
                self.spawn_drops(&rules, x, y);

                if let Some(auto_clear) = self.config.auto_clear.clone() {
                    if percent >= auto_clear.percent && !self.clearing {
                        tracing::info!(
                            "{:.1}% erased crosses the {}% clear threshold",
                            percent,
                            auto_clear.percent
                        );
                        self.clear(auto_clear.duration_ms, || {});
                    }
                }
            }
        }
        Ok(())
    }

    /// Advance animations by `dt_ms`
    pub fn tick(&mut self, dt_ms: f64) {
        self.scheduler.tick(dt_ms);
        let torn_down = self.stage.borrow().torn_down;
        if torn_down {
            self.stop();
        }
    }

    /// Run frames until no animation is left, from `source` or a 16 ms
    /// timer. Returns the number of frames run.
    pub fn run_frames(&mut self, source: Option<&mut dyn FrameSource>) -> u64 {
        let mut fallback;
        let source: &mut dyn FrameSource = match source {
            Some(source) => source,
            None => {
                fallback = TimerFrames::default();
                &mut fallback
            }
        };

        let mut frames = 0;
        while self.scheduler.has_active_animations() {
            let dt = source.next_frame();
            self.tick(dt);
            frames += 1;
        }
        frames
    }

    fn build_surface(&mut self, bounds: Rect) -> Result<()> {
        let rect = Rect::new(
            bounds.x + self.config.left,
            bounds.y + self.config.top,
            self.config.width.unwrap_or(bounds.width),
            self.config.height.unwrap_or(bounds.height),
        );
        let grid = CheckpointGrid::build(rect.width, rect.height, self.config.check_distance)?;
        let mut surface = self
            .host
            .create_surface(rect.width.ceil() as u32, rect.height.ceil() as u32)?;
        tracing::debug!(
            "Created {}x{} mask surface",
            surface.width(),
            surface.height()
        );

        self.fill_surface(&mut surface);
        surface.set_composite_mode(CompositeMode::DestinationOut);

        let mut estimator = PercentageEstimator::new(grid, self.config.radius)
            .with_oval_brush(self.tracker.brush().is_oval());
        let strategy = estimator.probe(&surface)?;
        if self.config.debug {
            estimator.paint_debug(&mut surface);
        }

        self.tracker.reset();
        self.tracker.set_offset(rect.origin());
        self.tracker
            .set_recording(strategy == Strategy::DistanceReconstruction);

        {
            let mut stage = self.stage.borrow_mut();
            let center = Point::new(rect.width / 2.0, rect.height / 2.0);
            stage.surface = Some(surface);
            stage.brush = TweenProps::position(center.x, center.y).with_rotate(0.0);
        }
        self.estimator = Some(estimator);
        self.mask_rect = Some(rect);
        Ok(())
    }

    fn fill_surface(&mut self, surface: &mut H::Surface) {
        let full = Rect::new(0.0, 0.0, surface.width() as f32, surface.height() as f32);
        let image = match self.config.mask_image.as_deref() {
            Some(source) => {
                let image = self.host.mask_image(source);
                if image.is_none() {
                    tracing::warn!("Mask image {} unavailable; filling with color", source);
                }
                image
            }
            None => None,
        };
        match image {
            Some(image) => surface.fill_image(full, &image),
            None => surface.fill_rect(full, &self.fill.into()),
        }
    }

    fn brush_target(&self) -> TweenProps {
        let current = self.stage.borrow().brush;
        match self.config.brush_target {
            Some(target) => TweenProps::position(target.x, target.y).with_rotate(target.angle),
            None => current,
        }
    }

    fn spawn_drops(&mut self, rules: &[RainRule], x: f32, y: f32) {
        for rule in rules {
            self.spawn_drop(rule, x, y);
        }
    }

    fn spawn_drop(&mut self, rule: &RainRule, x: f32, y: f32) {
        let from = TweenProps::position(x + rule.dx, y + rule.dy)
            .with_size(rule.size, rule.size)
            .with_opacity(1.0);
        let id = {
            let mut stage = self.stage.borrow_mut();
            if stage.drops_spawned >= self.config.max_drops {
                tracing::trace!("Drop limit {} reached", self.config.max_drops);
                return;
            }
            stage.drops_spawned += 1;
            stage.drops.insert(from)
        };

        let to = from
            .with_position(x + rule.dx, y + rule.dy + rule.distance)
            .with_opacity(0.0);
        let tween = Tween::new(from, to, rule.duration_ms)
            .with_delay(rule.delay_ms)
            .with_easing(self.drop_easing.clone());
        let frame_stage = Rc::clone(&self.stage);
        let done_stage = Rc::clone(&self.stage);
        self.scheduler.add(
            Animation::new(tween)
                .on_frame(move |props| {
                    let mut stage = frame_stage.borrow_mut();
                    if !stage.has_surface() {
                        return;
                    }
                    if let Some(drop) = stage.drops.get_mut(id) {
                        *drop = *props;
                    }
                })
                .on_complete(move || {
                    done_stage.borrow_mut().drops.remove(id);
                })
                .cancel_with(self.cancel.clone()),
        );
    }

    // === Inspection ===

    /// Whether a surface exists
    pub fn is_started(&self) -> bool {
        self.stage.borrow().has_surface()
    }

    pub fn is_listening(&self) -> bool {
        self.stage.borrow().listening
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    /// Erased percentage, 0-100
    pub fn percent(&self) -> f32 {
        self.estimator
            .as_ref()
            .map_or(0.0, |estimator| estimator.fraction() * 100.0)
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.estimator.as_ref().map(PercentageEstimator::strategy)
    }

    pub fn checkpoints(&self) -> Vec<CheckpointPoint> {
        self.estimator
            .as_ref()
            .map(PercentageEstimator::checkpoints)
            .unwrap_or_default()
    }

    /// Mask rectangle in client coordinates
    pub fn mask_rect(&self) -> Option<Rect> {
        self.mask_rect
    }

    pub fn brush(&self) -> TweenProps {
        self.stage.borrow().brush
    }

    /// Drops currently on stage
    pub fn drops(&self) -> Vec<TweenProps> {
        self.stage.borrow().drops.values().copied().collect()
    }

    pub fn drops_spawned(&self) -> u32 {
        self.stage.borrow().drops_spawned
    }

    pub fn surface_opacity(&self) -> Option<f32> {
        self.stage.borrow().surface.as_ref().map(|s| s.opacity())
    }

    /// Run `f` against the surface, if there is one
    pub fn with_surface<R>(&self, f: impl FnOnce(&H::Surface) -> R) -> Option<R> {
        self.stage.borrow().surface.as_ref().map(f)
    }

    pub fn animation_count(&self) -> usize {
        self.scheduler.animation_count()
    }

    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

fn matching_rules(rules: &[RainRule], percent: f32) -> Vec<RainRule> {
    rules
        .iter()
        .filter(|rule| percent >= rule.percent)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaskOptions;
    use crate::host::{PixmapHost, RecordingHost};
    use std::cell::Cell;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 200.0, 100.0)
    }

    fn recording(config: MaskConfig) -> MaskController<RecordingHost> {
        MaskController::new(
            RecordingHost::new(bounds()),
            config,
            MaskCallbacks::new().on_percent(|_, _, _| {}),
        )
        .unwrap()
    }

    fn swipe(controller: &mut MaskController<impl SurfaceHost>, points: &[(f32, f32)]) {
        let (x, y) = points[0];
        controller
            .handle_event(InputEvent::PointerDown { x, y })
            .unwrap();
        for &(x, y) in points {
            controller
                .handle_event(InputEvent::PointerMove { x, y })
                .unwrap();
        }
        controller
            .handle_event(InputEvent::PointerUp { x, y })
            .unwrap();
    }

    #[test]
    fn test_invalid_color_rejected() {
        let config = MaskConfig::from(MaskOptions {
            color: Some("grey".into()),
            ..Default::default()
        });
        let result =
            MaskController::new(RecordingHost::new(bounds()), config, MaskCallbacks::new());
        assert!(matches!(result, Err(MaskError::InvalidColor(_))));
    }

    #[test]
    fn test_unknown_easing_rejected() {
        let config = MaskConfig::from(MaskOptions {
            fade_easing: Some("wobble".into()),
            ..Default::default()
        });
        let result =
            MaskController::new(RecordingHost::new(bounds()), config, MaskCallbacks::new());
        assert!(matches!(result, Err(MaskError::Easing(_))));
    }

    #[test]
    fn test_custom_registry_curve() {
        let mut registry = EasingRegistry::new();
        registry.register("wobble", [0.3, 0.0, 0.7, 1.0]).unwrap();
        let config = MaskConfig::from(MaskOptions {
            fade_easing: Some("wobble".into()),
            ..Default::default()
        });
        let result = MaskController::with_registry(
            RecordingHost::new(bounds()),
            config,
            MaskCallbacks::new(),
            &registry,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = MaskConfig::from(MaskOptions {
            check_distance: Some(0.0),
            ..Default::default()
        });
        let result =
            MaskController::new(RecordingHost::new(bounds()), config, MaskCallbacks::new());
        assert!(matches!(result, Err(MaskError::InvalidGrid { .. })));
    }

    #[test]
    fn test_start_without_target() {
        let mut controller = MaskController::new(
            PixmapHost::detached(),
            MaskConfig::default(),
            MaskCallbacks::new(),
        )
        .unwrap();
        assert!(controller.start().is_none());
        assert!(!controller.is_started());
        // Everything else is a no-op
        controller
            .handle_event(InputEvent::PointerDown { x: 1.0, y: 1.0 })
            .unwrap();
        controller.clear(100.0, || panic!("nothing to clear"));
        controller.refresh_size().stop();
        assert_eq!(controller.animation_count(), 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut controller = recording(MaskConfig::default());
        let log = controller.host().log();
        controller.start().unwrap();
        let after_first = log.len();
        assert!(controller.start().is_some());
        assert_eq!(log.len(), after_first);
    }

    #[test]
    fn test_mask_rect_applies_offsets_and_overrides() {
        let config = MaskConfig::from(MaskOptions {
            left: Some(10.0),
            top: Some(5.0),
            width: Some(80.0),
            ..Default::default()
        });
        let mut controller = MaskController::new(
            PixmapHost::new(Rect::new(100.0, 50.0, 200.0, 100.0)),
            config,
            MaskCallbacks::new(),
        )
        .unwrap();
        controller.start().unwrap();
        assert_eq!(
            controller.mask_rect(),
            Some(Rect::new(110.0, 55.0, 80.0, 100.0))
        );
        assert_eq!(controller.with_surface(|s| s.width()), Some(80));
        assert_eq!(controller.checkpoints().len(), 4 * 5);
    }

    #[test]
    fn test_alpha_percent_scales_fill() {
        let config = MaskConfig::from(MaskOptions {
            alpha_percent: Some(50.0),
            ..Default::default()
        });
        let mut controller = MaskController::new(
            PixmapHost::new(bounds()),
            config,
            MaskCallbacks::new(),
        )
        .unwrap();
        controller.start().unwrap();
        let alpha = controller.with_surface(|s| s.read_alpha(5, 5)).unwrap().unwrap();
        assert!((alpha as i32 - 128).abs() <= 1, "alpha {alpha}");
    }

    #[test]
    fn test_mask_image_fill() {
        let image = veil_paint::MaskImage::new(1, 1, vec![1, 2, 3, 255], true).unwrap();
        let config = MaskConfig::from(MaskOptions {
            mask_image: Some("fog.png".into()),
            ..Default::default()
        });
        let mut controller = MaskController::new(
            PixmapHost::new(bounds()).with_image("fog.png", image),
            config,
            MaskCallbacks::new(),
        )
        .unwrap();
        controller.start().unwrap();
        // A cross-origin image blocks pixel reads
        assert_eq!(
            controller.strategy(),
            Some(Strategy::DistanceReconstruction)
        );
    }

    #[test]
    fn test_missing_callback_is_an_error() {
        let mut controller = MaskController::new(
            RecordingHost::new(bounds()),
            MaskConfig::default(),
            MaskCallbacks::new(),
        )
        .unwrap();
        controller.start().unwrap();
        controller
            .handle_event(InputEvent::PointerDown { x: 50.0, y: 50.0 })
            .unwrap();
        let result = controller.handle_event(InputEvent::PointerUp { x: 50.0, y: 50.0 });
        assert_eq!(result, Err(MaskError::MissingCallback));
    }

    #[test]
    fn test_gesture_start_fires_once_per_gesture() {
        let starts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&starts);
        let mut controller = MaskController::new(
            RecordingHost::new(bounds()),
            MaskConfig::default(),
            MaskCallbacks::new()
                .on_percent(|_, _, _| {})
                .on_gesture_start(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();
        controller.start().unwrap();

        controller
            .handle_event(InputEvent::PointerDown { x: 10.0, y: 10.0 })
            .unwrap();
        controller
            .handle_event(InputEvent::PointerDown { x: 20.0, y: 20.0 })
            .unwrap();
        assert_eq!(starts.get(), 1);
        controller.handle_event(InputEvent::PointerCancel).unwrap();
        swipe(&mut controller, &[(30.0, 30.0)]);
        assert_eq!(starts.get(), 2);
    }

    #[test]
    fn test_clear_zero_tears_down_immediately() {
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        let mut controller = recording(MaskConfig::default());
        controller.start().unwrap();
        controller.clear(0.0, move || flag.set(true));
        assert!(done.get());
        assert!(!controller.is_started());
        assert!(!controller.is_listening());
    }

    #[test]
    fn test_close_is_immediate_clear() {
        let mut controller = recording(MaskConfig::default());
        controller.start().unwrap();
        controller.close();
        assert!(!controller.is_started());
        assert_eq!(controller.animation_count(), 0);
    }

    #[test]
    fn test_clear_fades_then_tears_down_once() {
        let done = Rc::new(Cell::new(0));
        let counter = Rc::clone(&done);
        let config = MaskConfig::from(MaskOptions {
            brush_target: Some(crate::config::BrushTarget {
                x: 180.0,
                y: 10.0,
                angle: 90.0,
            }),
            ..Default::default()
        });
        let mut controller = recording(config);
        controller.start().unwrap();
        controller.clear(100.0, move || counter.set(counter.get() + 1));
        assert!(!controller.is_listening());
        assert_eq!(controller.animation_count(), 2);

        controller.tick(50.0);
        let opacity = controller.surface_opacity().unwrap();
        assert!(opacity > 0.0 && opacity < 1.0);

        let frames = controller.run_frames(Some(&mut veil_animation::FixedFrames::new(10.0)));
        assert!(frames > 0);
        assert_eq!(done.get(), 1);
        assert!(!controller.is_started());
        assert!(!controller.is_clearing());
        assert_eq!(controller.animation_count(), 0);
    }

    #[test]
    fn test_brush_sprite_follows_and_rotates() {
        let config = MaskConfig::from(MaskOptions {
            brush_target: Some(crate::config::BrushTarget {
                x: 180.0,
                y: 10.0,
                angle: 90.0,
            }),
            ..Default::default()
        });
        let mut controller = recording(config);
        controller.start().unwrap();
        swipe(&mut controller, &[(40.0, 60.0)]);
        assert_eq!(controller.brush().x, Some(40.0));
        assert_eq!(controller.brush().y, Some(60.0));

        controller.clear(100.0, || {});
        controller.tick(60.0);
        let brush = controller.brush();
        let rotate = brush.rotate.unwrap();
        assert!(rotate > 0.0 && rotate < 90.0);
        assert!(brush.x.unwrap() > 40.0);
    }

    #[test]
    fn test_rain_rules_and_cap() {
        let rule = RainRule {
            percent: 0.0,
            delay_ms: 0.0,
            duration_ms: 100.0,
            distance: 50.0,
            ..Default::default()
        };
        let config = MaskConfig::from(MaskOptions {
            rain: Some(vec![rule.clone(), rule.clone()]),
            start_rain: Some(vec![rule]),
            max_drops: Some(5),
            ..Default::default()
        });
        let mut controller = recording(config);
        controller.start().unwrap();

        swipe(&mut controller, &[(50.0, 50.0)]);
        assert_eq!(controller.drops_spawned(), 3);
        swipe(&mut controller, &[(60.0, 50.0)]);
        assert_eq!(controller.drops_spawned(), 5);
        assert_eq!(controller.drops().len(), 5);

        controller.tick(50.0);
        let drop = controller.drops()[0];
        assert!(drop.opacity.unwrap() < 1.0);

        controller.run_frames(Some(&mut veil_animation::FixedFrames::new(20.0)));
        assert!(controller.drops().is_empty());
        // The counter lives until teardown
        assert_eq!(controller.drops_spawned(), 5);
        controller.stop();
        assert_eq!(controller.drops_spawned(), 0);
    }

    #[test]
    fn test_auto_clear_threshold() {
        let config = MaskConfig::from(MaskOptions {
            radius: Some(60.0),
            alpha_radius: Some(0.0),
            auto_clear: Some(crate::config::AutoClear {
                percent: 40.0,
                duration_ms: 100.0,
            }),
            ..Default::default()
        });
        let mut controller = MaskController::new(
            PixmapHost::new(bounds()),
            config,
            MaskCallbacks::new().on_percent(|_, _, _| {}),
        )
        .unwrap();
        controller.start().unwrap();

        swipe(&mut controller, &[(10.0, 50.0)]);
        assert!(controller.percent() < 40.0);
        assert!(!controller.is_clearing());

        swipe(&mut controller, &[(100.0, 50.0), (190.0, 50.0)]);
        assert!(controller.percent() >= 40.0);
        assert!(controller.is_clearing());
        controller.run_frames(Some(&mut veil_animation::FixedFrames::new(16.0)));
        assert!(!controller.is_started());
    }

    #[test]
    fn test_refresh_size_rebuilds_grid() {
        let mut controller = MaskController::new(
            PixmapHost::new(bounds()),
            MaskConfig::default(),
            MaskCallbacks::new().on_percent(|_, _, _| {}),
        )
        .unwrap();
        controller.start().unwrap();
        swipe(&mut controller, &[(100.0, 50.0)]);
        assert!(controller.percent() > 0.0);

        controller
            .host_mut()
            .set_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        controller.refresh_size();
        assert!(controller.is_listening());
        assert_eq!(controller.checkpoints().len(), 25);
        assert_eq!(controller.percent(), 0.0);
        assert_eq!(controller.with_surface(|s| s.width()), Some(100));
    }
}
