//! One-Euro filter for the raw iris offset: heavy smoothing while the eye
//! rests, less lag while it moves.

use glam::Vec2;

const DERIVATIVE_CUTOFF: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
struct FilterState {
    raw: f32,
    smoothed: f32,
    speed: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct EuroFilter {
    min_cutoff: f32,
    beta: f32,
    state: Option<FilterState>,
}

impl Default for EuroFilter {
    fn default() -> Self {
        Self::with_params(1.0, 0.5)
    }
}

fn smoothing_weight(rate_hz: f32, cutoff: f32) -> f32 {
    let tau = 1.0 / (2.0 * std::f32::consts::PI * cutoff);
    1.0 / (1.0 + tau * rate_hz)
}

fn blend(previous: f32, value: f32, weight: f32) -> f32 {
    weight * value + (1.0 - weight) * previous
}

impl EuroFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(min_cutoff: f32, beta: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            state: None,
        }
    }

    /// Maps a 0..1 smoothness knob to `(min_cutoff, beta)`.
    pub fn from_smoothness(smoothness: f32) -> Self {
        if smoothness <= 0.0 {
            return Self::with_params(10.0, 1.0);
        }
        Self::with_params(1.0 / (smoothness * 10.0), 0.5 * (1.0 - smoothness))
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Filters `x` sampled `dt` seconds after the previous value. The first
    /// sample, and any sample with a non-positive `dt`, passes through and
    /// restarts the filter. NaN input yields 0.
    pub fn filter(&mut self, x: f32, dt: f32) -> f32 {
        if x.is_nan() {
            return 0.0;
        }

        let prev = match self.state {
            Some(prev) if dt > 0.0 => prev,
            _ => {
                self.state = Some(FilterState {
                    raw: x,
                    smoothed: x,
                    speed: 0.0,
                });
                return x;
            }
        };

        let rate_hz = 1.0 / dt;
        let speed = blend(
            prev.speed,
            (x - prev.raw) * rate_hz,
            smoothing_weight(rate_hz, DERIVATIVE_CUTOFF),
        );
        let cutoff = self.min_cutoff + self.beta * speed.abs();
        let smoothed = blend(prev.smoothed, x, smoothing_weight(rate_hz, cutoff));

        self.state = Some(FilterState {
            raw: x,
            smoothed,
            speed,
        });
        smoothed
    }
}

/// Pair of filters for the raw (x, y) iris offset.
#[derive(Debug, Clone, Copy)]
pub struct OffsetFilter {
    x: EuroFilter,
    y: EuroFilter,
}

impl OffsetFilter {
    pub fn from_smoothness(smoothness: f32) -> Self {
        let axis = EuroFilter::from_smoothness(smoothness);
        Self { x: axis, y: axis }
    }

    pub fn filter(&mut self, offset: Vec2, dt: f32) -> Vec2 {
        Vec2::new(self.x.filter(offset.x, dt), self.y.filter(offset.y, dt))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}
