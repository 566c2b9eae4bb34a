//! Named easing curves
//!
//! The registry starts out with the built-in presets and accepts custom
//! curves registered either as functions or as Bezier control points.

use rustc_hash::FxHashMap;

use crate::easing::{Easing, Fragment};
use crate::error::{EasingError, Result};

/// CSS-compatible cubic presets
const BEZIER_PRESETS: [(&str, [f64; 4]); 4] = [
    ("ease", [0.25, 0.1, 0.25, 1.0]),
    ("ease-in", [0.42, 0.0, 1.0, 1.0]),
    ("ease-out", [0.0, 0.0, 0.58, 1.0]),
    ("ease-in-out", [0.42, 0.0, 0.58, 1.0]),
];

/// Fifth-order curve: fast start settling into a linear tail
const B2_TO_LINEAR: [f64; 6] = [0.0, 0.4, 0.2, 0.4, 0.4, 0.55];

/// Something that can be turned into an easing curve
#[derive(Clone, Debug)]
pub enum CurveSpec {
    /// Look up an already registered curve
    Named(String),
    /// Interior Bezier control coordinates `[x1, y1, x2, y2, ...]`
    ControlPoints(Vec<f64>),
    /// A ready-made easing
    Function(Easing),
}

impl From<&str> for CurveSpec {
    fn from(name: &str) -> Self {
        CurveSpec::Named(name.to_string())
    }
}

impl From<String> for CurveSpec {
    fn from(name: String) -> Self {
        CurveSpec::Named(name)
    }
}

impl From<Vec<f64>> for CurveSpec {
    fn from(points: Vec<f64>) -> Self {
        CurveSpec::ControlPoints(points)
    }
}

impl From<[f64; 4]> for CurveSpec {
    fn from(points: [f64; 4]) -> Self {
        CurveSpec::ControlPoints(points.to_vec())
    }
}

impl From<Easing> for CurveSpec {
    fn from(easing: Easing) -> Self {
        CurveSpec::Function(easing)
    }
}

/// Lookup table from curve name to easing
#[derive(Clone, Debug)]
pub struct EasingRegistry {
    curves: FxHashMap<String, Easing>,
}

impl EasingRegistry {
    /// Registry pre-populated with every built-in preset
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.install_builtins();
        registry
    }

    /// Registry without any curves
    pub fn empty() -> Self {
        Self {
            curves: FxHashMap::default(),
        }
    }

    fn install_builtins(&mut self) {
        self.insert("linear", Easing::Linear);
        self.insert("none", Easing::Zero);
        self.insert("full", Easing::One);
        self.insert("reverse", Easing::Reverse);
        self.insert("swing", Easing::Swing);
        self.insert("spring", Easing::Spring);

        for fragment in Fragment::ALL {
            let name = fragment.name();
            self.insert(&format!("easeIn{name}"), Easing::ease_in(fragment));
            self.insert(&format!("easeOut{name}"), Easing::ease_out(fragment));
            self.insert(&format!("easeInOut{name}"), Easing::ease_in_out(fragment));
            self.insert(&format!("easeOutIn{name}"), Easing::ease_out_in(fragment));
        }

        // Constant control points, construction cannot fail
        if let Ok(fast) = Easing::control_points(&B2_TO_LINEAR) {
            self.insert("fastInB2ToLinear", fast.clone());
            self.insert("fastOutB2ToLinear", fast.clone().reverse());
            self.insert("fastInOutB2ToLinear", fast.clone().reflect());
            self.insert("fastOutInB2ToLinear", fast.reverse().reflect());
        }

        for (name, [x1, y1, x2, y2]) in BEZIER_PRESETS {
            if let Ok(curve) = Easing::cubic_bezier(x1, y1, x2, y2) {
                self.insert(name, curve);
            }
        }
    }

    fn insert(&mut self, name: &str, easing: Easing) {
        self.curves.insert(name.to_string(), easing);
    }

    /// Look up a curve by name
    pub fn get(&self, name: &str) -> Result<Easing> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| EasingError::UnknownCurve(name.to_string()))
    }

    /// Turn a spec into an easing without registering it
    pub fn resolve(&self, spec: &CurveSpec) -> Result<Easing> {
        match spec {
            CurveSpec::Named(name) => self.get(name),
            CurveSpec::ControlPoints(points) => Easing::control_points(points),
            CurveSpec::Function(easing) => Ok(easing.clone()),
        }
    }

    /// Register (or replace) a named curve
    pub fn register(&mut self, name: impl Into<String>, spec: impl Into<CurveSpec>) -> Result<()> {
        let name = name.into();
        let easing = self.resolve(&spec.into())?;
        tracing::debug!("registered easing curve {}", name);
        self.curves.insert(name, easing);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.curves.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl Default for EasingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
