//! Generated face for demos: irises trace a slow Lissajous curve while the
//! head drifts closer and further away. A short dropout every few seconds
//! stands in for the detector losing the face.

use anyhow::Result;
use api::{LandmarkFrame, LandmarkSource};
use common::eye_metrics::{EyeAnchors, LEFT_EYE, RIGHT_EYE};
use glam::{Vec2, Vec3};
use log::info;

const MESH_POINTS: usize = 478;
const SOCKET_WIDTH: f32 = 0.13;
const SOCKET_HEIGHT: f32 = 0.045;
const DROPOUT_PERIOD_MS: f64 = 5000.0;
const DROPOUT_MS: f64 = 150.0;

#[derive(Default)]
pub struct SyntheticSource {
    ready: bool,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iris position inside the socket at `t` seconds, in `[-1, 1]²`.
    pub fn gaze_at(t: f64) -> Vec2 {
        Vec2::new(
            (0.8 * (t * 0.6).sin()) as f32,
            (0.6 * (t * 0.9).sin()) as f32,
        )
    }

    /// Relative face size at `t` seconds.
    pub fn scale_at(t: f64) -> f32 {
        (1.0 + 0.15 * (t * 0.15).sin()) as f32
    }

    pub fn face(gaze: Vec2, scale: f32) -> LandmarkFrame {
        let mut points = vec![Vec3::new(0.5, 0.5, 0.0); MESH_POINTS];
        let spacing = 0.09 * scale;
        place_eye(&mut points, &LEFT_EYE, Vec2::new(0.5 - spacing, 0.45), scale, gaze);
        place_eye(&mut points, &RIGHT_EYE, Vec2::new(0.5 + spacing, 0.45), scale, gaze);
        LandmarkFrame::new(points)
    }
}

fn place_eye(points: &mut [Vec3], anchors: &EyeAnchors, center: Vec2, scale: f32, gaze: Vec2) {
    let half_w = SOCKET_WIDTH * scale / 2.0;
    let half_h = SOCKET_HEIGHT * scale / 2.0;
    points[anchors.outer] = Vec3::new(center.x - half_w, center.y, 0.0);
    points[anchors.inner] = Vec3::new(center.x + half_w, center.y, 0.0);
    points[anchors.upper] = Vec3::new(center.x, center.y - half_h, 0.0);
    points[anchors.lower] = Vec3::new(center.x, center.y + half_h, 0.0);
    points[anchors.iris] = Vec3::new(center.x + gaze.x * half_w, center.y + gaze.y * half_h, 0.0);
}

impl LandmarkSource for SyntheticSource {
    fn initialize(&mut self) -> Result<()> {
        self.ready = true;
        info!("Synthetic landmark source ready");
        Ok(())
    }

    fn detect(&mut self, timestamp_ms: f64) -> Result<Option<LandmarkFrame>> {
        if !self.ready || timestamp_ms.rem_euclid(DROPOUT_PERIOD_MS) >= DROPOUT_PERIOD_MS - DROPOUT_MS {
            return Ok(None);
        }
        let t = timestamp_ms / 1000.0;
        Ok(Some(Self::face(Self::gaze_at(t), Self::scale_at(t))))
    }

    fn unload(&mut self) {
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{eye_metrics, EyeMode};

    #[test]
    fn generated_face_measures_back_to_its_gaze() {
        let gaze = Vec2::new(0.4, -0.3);
        let reading = eye_metrics::extract(&SyntheticSource::face(gaze, 1.2), EyeMode::Both).unwrap();

        assert!((reading.selected.offset() - gaze).length() < 1e-4);
        assert!((reading.face_scale - SOCKET_WIDTH * 1.2).abs() < 1e-5);
    }

    #[test]
    fn drops_out_periodically() {
        let mut source = SyntheticSource::new();
        assert!(source.detect(0.0).unwrap().is_none());

        source.initialize().unwrap();
        assert!(source.detect(1000.0).unwrap().is_some());
        assert!(source.detect(4900.0).unwrap().is_none());
        assert!(source.detect(5010.0).unwrap().is_some());
    }
}
