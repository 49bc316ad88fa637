use glam::Vec2;

/// Exponential moving average of the pointer, per axis:
/// `smoothed = smoothed * (1 - alpha) + target * alpha`.
///
/// No clamping happens here; targets are clamped to the viewport before
/// they reach the smoother.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSmoother {
    value: Vec2,
}

impl TemporalSmoother {
    pub fn new(seed: Vec2) -> Self {
        Self { value: seed }
    }

    pub fn update(&mut self, target: Vec2, alpha: f32) -> Vec2 {
        self.value = self.value * (1.0 - alpha) + target * alpha;
        self.value
    }

    pub fn reseed(&mut self, seed: Vec2) {
        self.value = seed;
    }

    pub fn value(&self) -> Vec2 {
        self.value
    }
}
