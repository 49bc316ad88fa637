use anyhow::Result;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A single face-mesh point in normalized image coordinates.
pub type Landmark = Vec3;

/// One detected face, as delivered by the inference collaborator.
///
/// Points are indexed the way the face-mesh model numbers them; the engine
/// picks the anchors it needs by index and never keeps the frame around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    pub points: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Returns the point at `index` if it exists and every coordinate is finite.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points
            .get(index)
            .copied()
            .filter(|p| p.is_finite())
    }

    /// Planar (x, y) view of a point, used for all socket measurements.
    pub fn get_planar(&self, index: usize) -> Option<Vec2> {
        self.get(index).map(|p| p.truncate())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Size of the output surface the pointer is drawn on, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Inference collaborator: produces at most one face per request.
///
/// `detect` may block for as long as the detector needs; the engine loop waits
/// for it before processing and requesting the next frame.
pub trait LandmarkSource {
    fn initialize(&mut self) -> Result<()>;
    fn detect(&mut self, timestamp_ms: f64) -> Result<Option<LandmarkFrame>>;
    fn unload(&mut self);
}
