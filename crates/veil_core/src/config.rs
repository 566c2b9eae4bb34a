//! Mask configuration
//!
//! [`MaskConfig`] is the complete, immutable set of options a controller runs
//! with. Callers usually supply a partial [`MaskOptions`] which is merged over
//! the defaults, caller values winning. Both deserialize from camelCase keys.

use serde::{Deserialize, Serialize};

/// Fade-out and brush rotation once enough of the mask is erased
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoClear {
    /// Erased percentage (0-100) that starts the clear
    pub percent: f32,
    pub duration_ms: f64,
}

impl Default for AutoClear {
    fn default() -> Self {
        Self {
            percent: 40.0,
            duration_ms: 2000.0,
        }
    }
}

/// A falling drop spawned relative to a gesture position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RainRule {
    /// Erased percentage (0-100) at or above which the drop spawns
    pub percent: f32,
    pub dx: f32,
    pub dy: f32,
    /// Drop edge length in pixels
    pub size: f32,
    pub duration_ms: f64,
    /// How far the drop falls
    pub distance: f32,
    pub delay_ms: f64,
}

impl Default for RainRule {
    fn default() -> Self {
        Self {
            percent: 0.0,
            dx: 0.0,
            dy: 0.0,
            size: 10.0,
            duration_ms: 4000.0,
            distance: 400.0,
            delay_ms: 200.0,
        }
    }
}

/// Where the brush sprite ends up after a clear
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushTarget {
    pub x: f32,
    pub y: f32,
    /// Final rotation in degrees
    pub angle: f32,
}

/// Complete mask configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskConfig {
    /// CSS hex fill color
    pub color: String,
    /// Fill alpha, 0-100
    pub alpha_percent: f32,
    /// Checkpoint grid spacing in pixels
    pub check_distance: f32,
    /// Erase radius in pixels
    pub radius: f32,
    /// Feather width around the erase shape
    pub alpha_radius: f32,
    /// Oval brush width; an oval brush needs both width and height
    pub erase_width: Option<f32>,
    pub erase_height: Option<f32>,
    /// Oval rotation in degrees, counter-clockwise
    pub angle: f32,
    /// Image source resolved by the host, used instead of `color`
    pub mask_image: Option<String>,
    pub left: f32,
    pub top: f32,
    /// Overrides the target width
    pub width: Option<f32>,
    /// Overrides the target height
    pub height: Option<f32>,
    /// Paint uncovered checkpoints after each gesture
    pub debug: bool,
    pub auto_clear: Option<AutoClear>,
    /// Drops spawned when a gesture ends
    pub rain: Vec<RainRule>,
    /// Drops spawned when a gesture starts
    pub start_rain: Vec<RainRule>,
    /// Drops allowed per mask lifetime
    pub max_drops: u32,
    pub brush_target: Option<BrushTarget>,
    pub fade_easing: String,
    pub rotate_easing: String,
    pub drop_easing: String,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            color: "#666".to_string(),
            alpha_percent: 100.0,
            check_distance: 20.0,
            radius: 20.0,
            alpha_radius: 10.0,
            erase_width: None,
            erase_height: None,
            angle: 0.0,
            mask_image: None,
            left: 0.0,
            top: 0.0,
            width: None,
            height: None,
            debug: false,
            auto_clear: None,
            rain: Vec::new(),
            start_rain: Vec::new(),
            max_drops: 5,
            brush_target: None,
            fade_easing: "ease-out".to_string(),
            rotate_easing: "ease-in-out".to_string(),
            drop_easing: "easeInQuad".to_string(),
        }
    }
}

impl MaskConfig {
    /// Merge `options` over this config; every option that is set wins
    pub fn merged(mut self, options: MaskOptions) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = options.$field {
                    self.$field = value;
                })*
            };
        }
        take!(
            color,
            alpha_percent,
            check_distance,
            radius,
            alpha_radius,
            angle,
            left,
            top,
            debug,
            rain,
            start_rain,
            max_drops,
            fade_easing,
            rotate_easing,
            drop_easing,
        );

        macro_rules! take_optional {
            ($($field:ident),* $(,)?) => {
                $(if options.$field.is_some() {
                    self.$field = options.$field;
                })*
            };
        }
        take_optional!(
            erase_width,
            erase_height,
            mask_image,
            width,
            height,
            auto_clear,
            brush_target,
        );
        self
    }

    /// Oval brush size, when both dimensions are configured
    pub fn oval(&self) -> Option<(f32, f32)> {
        self.erase_width.zip(self.erase_height)
    }
}

impl From<MaskOptions> for MaskConfig {
    fn from(options: MaskOptions) -> Self {
        MaskConfig::default().merged(options)
    }
}

/// Caller-supplied partial configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskOptions {
    pub color: Option<String>,
    pub alpha_percent: Option<f32>,
    pub check_distance: Option<f32>,
    pub radius: Option<f32>,
    pub alpha_radius: Option<f32>,
    pub erase_width: Option<f32>,
    pub erase_height: Option<f32>,
    pub angle: Option<f32>,
    pub mask_image: Option<String>,
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub debug: Option<bool>,
    pub auto_clear: Option<AutoClear>,
    pub rain: Option<Vec<RainRule>>,
    pub start_rain: Option<Vec<RainRule>>,
    pub max_drops: Option<u32>,
    pub brush_target: Option<BrushTarget>,
    pub fade_easing: Option<String>,
    pub rotate_easing: Option<String>,
    pub drop_easing: Option<String>,
}

type PercentFn = Box<dyn FnMut(f32, f32, f32)>;
type GestureStartFn = Box<dyn FnMut(f32, f32)>;

/// Callbacks handed to the controller alongside its config
#[derive(Default)]
pub struct MaskCallbacks {
    pub(crate) percent: Option<PercentFn>,
    pub(crate) gesture_start: Option<GestureStartFn>,
}

impl MaskCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per completed gesture with `(percent_erased_0_100, x, y)`
    pub fn on_percent<F: FnMut(f32, f32, f32) + 'static>(mut self, f: F) -> Self {
        self.percent = Some(Box::new(f));
        self
    }

    /// Called once per gesture when the pointer goes down
    pub fn on_gesture_start<F: FnMut(f32, f32) + 'static>(mut self, f: F) -> Self {
        self.gesture_start = Some(Box::new(f));
        self
    }

    pub fn has_percent(&self) -> bool {
        self.percent.is_some()
    }
}

impl std::fmt::Debug for MaskCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskCallbacks")
            .field("percent", &self.percent.is_some())
            .field("gesture_start", &self.gesture_start.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MaskConfig::default();
        assert_eq!(config.color, "#666");
        assert_eq!(config.alpha_percent, 100.0);
        assert_eq!(config.check_distance, 20.0);
        assert_eq!(config.radius, 20.0);
        assert_eq!(config.alpha_radius, 10.0);
        assert_eq!(config.max_drops, 5);
        assert!(config.oval().is_none());
    }

    #[test]
    fn test_caller_wins_on_merge() {
        let config = MaskConfig::default().merged(MaskOptions {
            radius: Some(30.0),
            alpha_radius: Some(0.0),
            erase_width: Some(50.0),
            erase_height: Some(140.0),
            ..Default::default()
        });
        assert_eq!(config.radius, 30.0);
        assert_eq!(config.alpha_radius, 0.0);
        assert_eq!(config.oval(), Some((50.0, 140.0)));
        // Untouched fields keep their defaults
        assert_eq!(config.color, "#666");
        assert_eq!(config.check_distance, 20.0);
    }

    #[test]
    fn test_partial_toml_document() {
        let options: MaskOptions = toml::from_str(
            r##"
            color = "#000"
            checkDistance = 10
            alphaRadius = 0

            [autoClear]
            percent = 50
            "##,
        )
        .unwrap();
        let config = MaskConfig::from(options);
        assert_eq!(config.color, "#000");
        assert_eq!(config.check_distance, 10.0);
        assert_eq!(config.alpha_radius, 0.0);
        let auto_clear = config.auto_clear.unwrap();
        assert_eq!(auto_clear.percent, 50.0);
        assert_eq!(auto_clear.duration_ms, 2000.0);
    }

    #[test]
    fn test_callbacks_builder() {
        let callbacks = MaskCallbacks::new().on_percent(|_, _, _| {});
        assert!(callbacks.has_percent());
        assert!(!MaskCallbacks::new().has_percent());
    }
}
