use common::TemporalSmoother;
use glam::Vec2;

#[test]
fn test_single_update_matches_weighted_average() {
    let mut s = TemporalSmoother::new(Vec2::new(500.0, 500.0));
    let out = s.update(Vec2::new(600.0, 600.0), 0.2);
    assert!((out.x - 520.0).abs() < 1e-3);
    assert!((out.y - 520.0).abs() < 1e-3);
}

#[test]
fn test_geometric_convergence() {
    let alpha = 0.2f32;
    let start = 500.0f32;
    let target = 600.0f32;
    let mut s = TemporalSmoother::new(Vec2::splat(start));

    for n in 1..=25 {
        let out = s.update(Vec2::splat(target), alpha);
        let expected = (start - target).abs() * (1.0 - alpha).powi(n);
        assert!(
            ((out.x - target).abs() - expected).abs() < 1e-2,
            "step {}: got {}, expected distance {}",
            n,
            out.x,
            expected
        );
    }
}

#[test]
fn test_alpha_one_is_instant() {
    let mut s = TemporalSmoother::new(Vec2::ZERO);
    assert_eq!(s.update(Vec2::new(10.0, -4.0), 1.0), Vec2::new(10.0, -4.0));
}

#[test]
fn test_reseed_replaces_value() {
    let mut s = TemporalSmoother::new(Vec2::new(3000.0, -50.0));
    s.reseed(Vec2::new(960.0, 540.0));
    assert_eq!(s.value(), Vec2::new(960.0, 540.0));
}

#[test]
fn test_smoother_does_not_clamp() {
    let mut s = TemporalSmoother::new(Vec2::ZERO);
    let out = s.update(Vec2::new(-100.0, 5000.0), 0.5);
    assert_eq!(out, Vec2::new(-50.0, 2500.0));
}
