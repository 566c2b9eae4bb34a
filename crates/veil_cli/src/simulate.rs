//! Offline erase simulation
//!
//! Builds a raster mask from a config file, replays strokes against it as
//! pointer gestures, then runs any clear or drop animations on a virtual clock.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;
use veil_animation::FixedFrames;
use veil_core::{InputEvent, MaskCallbacks, MaskController, PixmapHost};
use veil_paint::MaskImage;

use crate::config::VeilConfig;

/// Inputs of one simulation run
#[derive(Debug)]
pub struct SimulateOptions {
    pub config: VeilConfig,
    pub strokes: Vec<Vec<(f32, f32)>>,
    pub tainted: bool,
    pub debug_grid: bool,
    pub out: Option<PathBuf>,
    pub frame_ms: f64,
}

/// Erased percentage reported at the end of a gesture
#[derive(Clone, Copy, Debug, Serialize)]
pub struct GestureReport {
    pub percent: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub strategy: Option<String>,
    pub checkpoints: usize,
    pub covered: usize,
    pub gestures: Vec<GestureReport>,
    pub drops_spawned: u32,
    pub cleared: bool,
    pub frames: u64,
}

/// Parse `"x,y;x,y;..."` into stroke points
pub fn parse_stroke(text: &str) -> Result<Vec<(f32, f32)>> {
    let mut points = Vec::new();
    for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((x, y)) = pair.split_once(',') else {
            anyhow::bail!("Expected `x,y` in stroke, got `{}`", pair);
        };
        let x: f32 = x
            .trim()
            .parse()
            .with_context(|| format!("Invalid x coordinate in `{}`", pair))?;
        let y: f32 = y
            .trim()
            .parse()
            .with_context(|| format!("Invalid y coordinate in `{}`", pair))?;
        points.push((x, y));
    }
    if points.is_empty() {
        anyhow::bail!("Stroke `{}` has no points", text);
    }
    Ok(points)
}

fn build_host(options: &SimulateOptions, mask: &veil_core::MaskConfig) -> Result<PixmapHost> {
    let mut host = PixmapHost::new(options.config.target.bounds());
    if options.tainted {
        host = host.tainted();
    }
    if let Some(source) = mask.mask_image.as_deref() {
        let path = options.config.resolve(source);
        let image = MaskImage::load(&path, options.config.cross_origin)
            .with_context(|| format!("Failed to load mask image {}", path.display()))?;
        host = host.with_image(source, image);
    }
    Ok(host)
}

/// Run every stroke as one gesture and report the outcome
pub fn run(options: SimulateOptions) -> Result<SimulationReport> {
    let mut mask = options.config.mask_config();
    if options.debug_grid {
        mask.debug = true;
    }
    let host = build_host(&options, &mask)?;

    let gestures = Rc::new(RefCell::new(Vec::new()));
    let sink = gestures.clone();
    let callbacks = MaskCallbacks::new().on_percent(move |percent, x, y| {
        sink.borrow_mut().push(GestureReport { percent, x, y });
    });

    let mut controller =
        MaskController::new(host, mask, callbacks).context("Invalid mask configuration")?;
    if controller.start().is_none() {
        anyhow::bail!("Mask could not be started for the configured target");
    }

    for (index, stroke) in options.strokes.iter().enumerate() {
        if !controller.is_listening() {
            tracing::info!("Mask stopped accepting input after {} gestures", index);
            break;
        }
        let (first_x, first_y) = stroke[0];
        controller.handle_event(InputEvent::PointerDown {
            x: first_x,
            y: first_y,
        })?;
        for &(x, y) in stroke {
            controller.handle_event(InputEvent::PointerMove { x, y })?;
        }
        let (last_x, last_y) = stroke[stroke.len() - 1];
        controller.handle_event(InputEvent::PointerUp {
            x: last_x,
            y: last_y,
        })?;
        tracing::debug!("Gesture {} done, {:.1}% erased", index + 1, controller.percent());
    }

    let strategy = controller.strategy().map(|s| format!("{:?}", s));
    let checkpoints = controller.checkpoints();
    let covered = checkpoints.iter().filter(|p| p.covered).count();
    let drops_spawned = controller.drops_spawned();

    if let Some(path) = &options.out {
        match controller.with_surface(|surface| surface.save_png(path)) {
            Some(saved) => {
                saved.with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Mask written to {}", path.display());
            }
            None => tracing::warn!("No mask surface to write"),
        }
    }

    let mut clock = FixedFrames::new(options.frame_ms);
    let frames = controller.run_frames(Some(&mut clock));
    let cleared = !controller.is_started();

    let gestures = gestures.borrow().clone();
    Ok(SimulationReport {
        strategy,
        checkpoints: checkpoints.len(),
        covered,
        gestures,
        drops_spawned,
        cleared,
        frames,
    })
}
