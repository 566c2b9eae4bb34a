//! Easing curve sampling

use anyhow::{Context, Result};
use veil_animation::{Easing, EasingRegistry};

/// Resolve a curve name or a comma-separated list of control coordinates
pub fn resolve(curve: &str) -> Result<Easing> {
    if curve.contains(',') {
        let control = curve
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .with_context(|| format!("Invalid control coordinate `{}`", v.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        return Easing::control_points(&control)
            .with_context(|| format!("Invalid control points `{}`", curve));
    }
    EasingRegistry::new()
        .get(curve)
        .with_context(|| format!("Unknown easing curve `{}`", curve))
}

/// `(progress, value)` pairs at `samples + 1` evenly spaced points
pub fn sample(easing: &Easing, samples: usize) -> Vec<(f64, f64)> {
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| {
            let p = i as f64 / samples as f64;
            (p, easing.apply(p))
        })
        .collect()
}
