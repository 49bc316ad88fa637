use serde::{Deserialize, Serialize};

/// Which eye drives the pointer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EyeMode {
    Left,
    Right,
    #[default]
    Both,
}

/// Live values owned by the configuration collaborator. They may change
/// between any two frames, so the engine receives them on every step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub eye_mode: EyeMode,
    /// Flip horizontal movement so the pointer follows a mirrored self-view.
    pub mirror: bool,
    pub invert_y: bool,
    /// Weight of the newest mapped position, in (0, 1].
    pub smoothing_factor: f32,
    /// Face size (mean eye-socket width, normalized image units) at which
    /// the depth scale is exactly 1.
    pub reference_face_size: f32,
}

pub const MIN_SMOOTHING_FACTOR: f32 = 0.001;

fn default_smoothing_factor() -> f32 {
    0.04
}

fn default_reference_face_size() -> f32 {
    0.13
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eye_mode: EyeMode::default(),
            mirror: true,
            invert_y: false,
            smoothing_factor: default_smoothing_factor(),
            reference_face_size: default_reference_face_size(),
        }
    }
}

impl Settings {
    /// Smoothing factor forced into (0, 1]. Non-finite values fall back to the default.
    pub fn effective_alpha(&self) -> f32 {
        if self.smoothing_factor.is_finite() {
            self.smoothing_factor.clamp(MIN_SMOOTHING_FACTOR, 1.0)
        } else {
            default_smoothing_factor()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationVariant {
    /// Four extremes (left, right, up, down), producing bounds.
    #[default]
    Directional,
    /// A square grid of screen points, producing a per-axis affine fit.
    Grid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationConfig {
    pub variant: CalibrationVariant,
    pub warmup_ms: f32,
    /// Collection time per directional target.
    pub collect_ms: f32,
    pub grid_size: usize,
    pub grid_margin: f32,
    /// Samples gathered per grid target.
    pub grid_samples: usize,
    /// Upper bound on collection time per grid target when frames keep dropping out.
    pub grid_timeout_ms: f32,
    /// Minimum magnitude of the horizontal bounds.
    pub min_extent_x: f32,
    /// Minimum magnitude of the vertical bounds.
    pub min_extent_y: f32,
    /// Smallest raw-offset spread across grid targets that still yields a fit.
    pub min_spread: f32,
}

fn default_warmup_ms() -> f32 {
    450.0
}

fn default_collect_ms() -> f32 {
    1600.0
}

fn default_grid_size() -> usize {
    3
}

fn default_grid_margin() -> f32 {
    0.1
}

fn default_grid_samples() -> usize {
    30
}

fn default_grid_timeout_ms() -> f32 {
    4000.0
}

fn default_min_extent_x() -> f32 {
    0.1
}

fn default_min_extent_y() -> f32 {
    0.08
}

fn default_min_spread() -> f32 {
    0.02
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            variant: CalibrationVariant::default(),
            warmup_ms: default_warmup_ms(),
            collect_ms: default_collect_ms(),
            grid_size: default_grid_size(),
            grid_margin: default_grid_margin(),
            grid_samples: default_grid_samples(),
            grid_timeout_ms: default_grid_timeout_ms(),
            min_extent_x: default_min_extent_x(),
            min_extent_y: default_min_extent_y(),
            min_spread: default_min_spread(),
        }
    }
}

/// Static engine tuning, read once at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub depth_min_ratio: f32,
    pub depth_max_ratio: f32,
    pub depth_epsilon: f32,
    /// Take the first valid frame as the neutral baseline when none exists.
    pub auto_baseline: bool,
    /// Gain of the uncalibrated mapping around screen center.
    pub fallback_gain: f32,
    /// One-Euro pre-filter strength on the raw offset; 0 disables it.
    pub offset_smoothness: f32,
    pub calibration: CalibrationConfig,
}

fn default_depth_min_ratio() -> f32 {
    0.6
}

fn default_depth_max_ratio() -> f32 {
    4.0
}

fn default_depth_epsilon() -> f32 {
    1e-6
}

fn default_fallback_gain() -> f32 {
    1.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth_min_ratio: default_depth_min_ratio(),
            depth_max_ratio: default_depth_max_ratio(),
            depth_epsilon: default_depth_epsilon(),
            auto_baseline: true,
            fallback_gain: default_fallback_gain(),
            offset_smoothness: 0.0,
            calibration: CalibrationConfig::default(),
        }
    }
}
