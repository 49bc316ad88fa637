use crate::error::FrameError;

/// `clamp(reference / max(measured, epsilon), min_ratio, max_ratio)`.
///
/// A non-finite ratio (bad reference size) collapses to `min_ratio`.
pub fn depth_scale(reference: f32, measured: f32, epsilon: f32, min_ratio: f32, max_ratio: f32) -> f32 {
    let ratio = reference / measured.max(epsilon);
    if ratio.is_finite() {
        ratio.clamp(min_ratio, max_ratio)
    } else {
        min_ratio
    }
}

/// Converts face size into a multiplier for iris offsets, remembering the
/// last usable value for frames where the face size is unusable.
#[derive(Debug, Clone, Copy)]
pub struct DepthNormalizer {
    min_ratio: f32,
    max_ratio: f32,
    epsilon: f32,
    last_scale: f32,
}

impl DepthNormalizer {
    pub fn new(min_ratio: f32, max_ratio: f32, epsilon: f32) -> Self {
        let (min_ratio, max_ratio) = if min_ratio <= max_ratio {
            (min_ratio, max_ratio)
        } else {
            (max_ratio, min_ratio)
        };
        Self {
            min_ratio,
            max_ratio,
            epsilon,
            last_scale: 1.0f32.clamp(min_ratio, max_ratio),
        }
    }

    pub fn update(&mut self, reference: f32, measured: f32) -> Result<f32, FrameError> {
        if !(measured > self.epsilon) {
            return Err(FrameError::DegenerateFaceScale(measured));
        }
        self.last_scale = depth_scale(
            reference,
            measured,
            self.epsilon,
            self.min_ratio,
            self.max_ratio,
        );
        Ok(self.last_scale)
    }

    pub fn last_scale(&self) -> f32 {
        self.last_scale
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min_ratio, self.max_ratio)
    }
}
