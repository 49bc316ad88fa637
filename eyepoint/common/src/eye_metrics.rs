//! Iris displacement inside the eye socket, normalized by socket size.

use crate::config::EyeMode;
use crate::error::FrameError;
use api::LandmarkFrame;
use glam::Vec2;

/// Face-mesh indices of the five anchors measured per eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeAnchors {
    pub outer: usize,
    pub inner: usize,
    pub upper: usize,
    pub lower: usize,
    pub iris: usize,
}

pub const LEFT_EYE: EyeAnchors = EyeAnchors {
    outer: 33,
    inner: 133,
    upper: 159,
    lower: 145,
    iris: 468,
};

pub const RIGHT_EYE: EyeAnchors = EyeAnchors {
    outer: 362,
    inner: 263,
    upper: 386,
    lower: 374,
    iris: 473,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EyeMetrics {
    pub norm_x: f32,
    pub norm_y: f32,
    pub width: f32,
    pub height: f32,
}

impl EyeMetrics {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.norm_x, self.norm_y)
    }

    /// Componentwise mean of two eyes.
    pub fn blend(&self, other: &EyeMetrics) -> EyeMetrics {
        EyeMetrics {
            norm_x: (self.norm_x + other.norm_x) / 2.0,
            norm_y: (self.norm_y + other.norm_y) / 2.0,
            width: (self.width + other.width) / 2.0,
            height: (self.height + other.height) / 2.0,
        }
    }
}

/// Selected eye reading plus the distance cue for the whole face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceReading {
    pub left: EyeMetrics,
    pub right: EyeMetrics,
    pub selected: EyeMetrics,
    /// Mean socket width of both eyes.
    pub face_scale: f32,
}

fn anchor(frame: &LandmarkFrame, index: usize, name: &'static str) -> Result<Vec2, FrameError> {
    frame
        .get_planar(index)
        .ok_or(FrameError::IncompleteLandmarks(name))
}

pub fn measure_eye(frame: &LandmarkFrame, anchors: &EyeAnchors) -> Result<EyeMetrics, FrameError> {
    let outer = anchor(frame, anchors.outer, "outer eye corner")?;
    let inner = anchor(frame, anchors.inner, "inner eye corner")?;
    let upper = anchor(frame, anchors.upper, "upper eyelid")?;
    let lower = anchor(frame, anchors.lower, "lower eyelid")?;
    let iris = anchor(frame, anchors.iris, "iris center")?;

    let width = outer.distance(inner);
    let height = upper.distance(lower);
    if !(width > 0.0 && height > 0.0) {
        return Err(FrameError::DegenerateEyeSocket);
    }

    let center_x = (outer.x + inner.x) / 2.0;
    let center_y = (upper.y + lower.y) / 2.0;

    Ok(EyeMetrics {
        norm_x: (iris.x - center_x) / (width / 2.0),
        norm_y: (iris.y - center_y) / (height / 2.0),
        width,
        height,
    })
}

/// Both eyes are required even in single-eye modes, since the face scale
/// is taken from the pair.
pub fn extract(frame: &LandmarkFrame, mode: EyeMode) -> Result<FaceReading, FrameError> {
    let left = measure_eye(frame, &LEFT_EYE)?;
    let right = measure_eye(frame, &RIGHT_EYE)?;

    let selected = match mode {
        EyeMode::Left => left,
        EyeMode::Right => right,
        EyeMode::Both => left.blend(&right),
    };

    Ok(FaceReading {
        left,
        right,
        selected,
        face_scale: (left.width + right.width) / 2.0,
    })
}
