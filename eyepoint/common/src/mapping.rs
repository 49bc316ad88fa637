//! Offset-to-screen mappings.
//!
//! Every mapping takes a baseline-relative, depth-scaled offset and returns a
//! normalized screen position in `[0, 1]²`. Mirror and vertical inversion are
//! applied earlier, when the raw offset is read (see [`orient`]), so none of
//! the mappings know about them.

use crate::error::{Axis, CalibrationError};
use glam::Vec2;
use serde::{Deserialize, Serialize};

pub trait ScreenMapping {
    fn apply(&self, offset: Vec2) -> Vec2;
}

/// Sign adjustment for a mirrored self-view and inverted vertical axis.
pub fn orient(offset: Vec2, mirror: bool, invert_y: bool) -> Vec2 {
    Vec2::new(
        if mirror { -offset.x } else { offset.x },
        if invert_y { -offset.y } else { offset.y },
    )
}

/// Piecewise-linear, sign-asymmetric ratio: 0.5 at zero, 0 at `min`, 1 at `max`.
pub fn bounds_ratio(delta: f32, min: f32, max: f32) -> f32 {
    let ratio = if delta >= 0.0 {
        if max != 0.0 {
            (delta / max).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    } else if min != 0.0 {
        (delta / min.abs()).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    (0.5 + ratio * 0.5).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsMapping {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for BoundsMapping {
    fn default() -> Self {
        Self {
            min_x: -0.28,
            max_x: 0.28,
            min_y: -0.22,
            max_y: 0.22,
        }
    }
}

impl ScreenMapping for BoundsMapping {
    fn apply(&self, offset: Vec2) -> Vec2 {
        Vec2::new(
            bounds_ratio(offset.x, self.min_x, self.max_x),
            bounds_ratio(offset.y, self.min_y, self.max_y),
        )
    }
}

impl BoundsMapping {
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < 0.0
            && self.max_x > 0.0
            && self.min_y < 0.0
            && self.max_y > 0.0
    }
}

/// `screen = a * offset + b` on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineAxis {
    pub a: f32,
    pub b: f32,
}

impl AffineAxis {
    pub fn apply(&self, offset: f32) -> f32 {
        (self.a * offset + self.b).clamp(0.0, 1.0)
    }

    /// Least-squares line through `(raw_offset, screen_norm)` pairs.
    ///
    /// Needs two or more pairs whose raw offsets span at least `min_spread`.
    pub fn fit(axis: Axis, pairs: &[(f32, f32)], min_spread: f32) -> Result<Self, CalibrationError> {
        if pairs.len() < 2 {
            return Err(CalibrationError::InsufficientTargets {
                axis,
                found: pairs.len(),
            });
        }

        let (lo, hi) = pairs
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });
        let spread = hi - lo;
        if !(spread >= min_spread) {
            return Err(CalibrationError::DegenerateCalibration { axis, spread });
        }

        let n = pairs.len() as f32;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f32>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f32>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for &(x, y) in pairs {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }
        if !(sxx > f32::EPSILON) {
            return Err(CalibrationError::DegenerateCalibration { axis, spread });
        }

        let a = sxy / sxx;
        Ok(Self {
            a,
            b: mean_y - a * mean_x,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMapping {
    pub x: AffineAxis,
    pub y: AffineAxis,
}

impl ScreenMapping for AffineMapping {
    fn apply(&self, offset: Vec2) -> Vec2 {
        Vec2::new(self.x.apply(offset.x), self.y.apply(offset.y))
    }
}

impl AffineMapping {
    pub fn is_valid(&self) -> bool {
        [self.x.a, self.x.b, self.y.a, self.y.b]
            .iter()
            .all(|v| v.is_finite())
            && self.x.a != 0.0
            && self.y.a != 0.0
    }
}

/// Uncalibrated mapping: a fixed gain around screen center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackMapping {
    pub gain: f32,
}

impl ScreenMapping for FallbackMapping {
    fn apply(&self, offset: Vec2) -> Vec2 {
        (Vec2::splat(0.5) + offset * self.gain).clamp(Vec2::ZERO, Vec2::ONE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Mapping {
    Bounds(BoundsMapping),
    Affine(AffineMapping),
    Fallback(FallbackMapping),
}

impl ScreenMapping for Mapping {
    fn apply(&self, offset: Vec2) -> Vec2 {
        match self {
            Self::Bounds(m) => m.apply(offset),
            Self::Affine(m) => m.apply(offset),
            Self::Fallback(m) => m.apply(offset),
        }
    }
}

impl Mapping {
    pub fn fallback(gain: f32) -> Self {
        Self::Fallback(FallbackMapping { gain })
    }

    /// True for mappings learned from a calibration run.
    pub fn is_calibrated(&self) -> bool {
        !matches!(self, Self::Fallback(_))
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Bounds(m) => m.is_valid(),
            Self::Affine(m) => m.is_valid(),
            Self::Fallback(m) => m.gain.is_finite(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bounds(_) => "bounds",
            Self::Affine(_) => "affine",
            Self::Fallback(_) => "fallback",
        }
    }
}
