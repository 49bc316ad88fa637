#![allow(dead_code)]

use common::eye_metrics::{EyeAnchors, LEFT_EYE, RIGHT_EYE};
use common::{LandmarkFrame, Settings};
use glam::{Vec2, Vec3};

pub const SOCKET_WIDTH: f32 = 0.06;
pub const SOCKET_HEIGHT: f32 = 0.02;
pub const MESH_POINTS: usize = 478;

fn place_eye(points: &mut [Vec3], anchors: &EyeAnchors, center: Vec2, scale: f32, offset: Vec2) {
    let half_w = SOCKET_WIDTH * scale / 2.0;
    let half_h = SOCKET_HEIGHT * scale / 2.0;
    points[anchors.outer] = Vec3::new(center.x - half_w, center.y, 0.0);
    points[anchors.inner] = Vec3::new(center.x + half_w, center.y, 0.0);
    points[anchors.upper] = Vec3::new(center.x, center.y - half_h, 0.0);
    points[anchors.lower] = Vec3::new(center.x, center.y + half_h, 0.0);
    points[anchors.iris] = Vec3::new(
        center.x + offset.x * half_w,
        center.y + offset.y * half_h,
        0.0,
    );
}

/// A face whose irises both sit at normalized `offset` inside their sockets,
/// with sockets `scale` times the nominal size.
pub fn face_scaled(offset: Vec2, scale: f32) -> LandmarkFrame {
    let mut points = vec![Vec3::new(0.5, 0.5, 0.0); MESH_POINTS];
    place_eye(&mut points, &LEFT_EYE, Vec2::new(0.4, 0.4), scale, offset);
    place_eye(&mut points, &RIGHT_EYE, Vec2::new(0.6, 0.4), scale, offset);
    LandmarkFrame::new(points)
}

pub fn face(offset: Vec2) -> LandmarkFrame {
    face_scaled(offset, 1.0)
}

/// Settings with mirroring off and a reference size that gives depth scale 1.
pub fn plain_settings(alpha: f32) -> Settings {
    Settings {
        mirror: false,
        invert_y: false,
        smoothing_factor: alpha,
        reference_face_size: SOCKET_WIDTH,
        ..Settings::default()
    }
}

pub fn approx(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}
