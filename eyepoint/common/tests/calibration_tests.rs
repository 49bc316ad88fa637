use common::calibration::{targets_for, TargetKind};
use common::{
    BoundsMapping, CalibrationConfig, CalibrationController, CalibrationError, CalibrationEvent,
    CalibrationState, CalibrationVariant, Mapping, Phase,
};
use glam::Vec2;

const DT: f32 = 0.05;

fn quick_config() -> CalibrationConfig {
    CalibrationConfig {
        warmup_ms: 100.0,
        collect_ms: 200.0,
        grid_samples: 4,
        grid_timeout_ms: 500.0,
        ..CalibrationConfig::default()
    }
}

/// Drives the controller until it returns to idle, feeding `sample_for(step)`
/// each frame. Returns every event emitted.
fn run<F>(ctrl: &mut CalibrationController, current: &Mapping, mut sample_for: F) -> Vec<CalibrationEvent>
where
    F: FnMut(usize) -> Option<Vec2>,
{
    let mut events = Vec::new();
    for _ in 0..10_000 {
        let step = match ctrl.state() {
            CalibrationState::Warmup { step, .. } | CalibrationState::Collecting { step, .. } => step,
            _ => break,
        };
        if let Some(e) = ctrl.advance(DT, sample_for(step), current) {
            events.push(e);
        }
    }
    events
}

#[test]
fn test_directional_targets_in_order() {
    let targets = targets_for(CalibrationVariant::Directional, &CalibrationConfig::default());
    let prompts: Vec<_> = targets.iter().map(|t| t.prompt.as_str()).collect();
    assert_eq!(
        prompts,
        [
            "Look to the far LEFT edge",
            "Look to the far RIGHT edge",
            "Look at the TOP edge",
            "Look at the BOTTOM edge"
        ]
    );
}

#[test]
fn test_grid_includes_center_and_corners() {
    let targets = targets_for(CalibrationVariant::Grid, &CalibrationConfig::default());
    assert_eq!(targets.len(), 9);
    let points: Vec<Vec2> = targets
        .iter()
        .map(|t| match t.kind {
            TargetKind::Point(p) => p,
            TargetKind::Direction(_) => panic!("grid target without a position"),
        })
        .collect();
    let has = |p: Vec2| points.iter().any(|q| (*q - p).length() < 1e-5);
    assert!(has(Vec2::new(0.5, 0.5)));
    assert!(has(Vec2::new(0.1, 0.1)));
    assert!(has(Vec2::new(0.9, 0.1)));
    assert!(has(Vec2::new(0.1, 0.9)));
    assert!(has(Vec2::new(0.9, 0.9)));
}

#[test]
fn test_warmup_then_collecting_then_next_target() {
    let mut ctrl = CalibrationController::new(quick_config());
    let fallback = Mapping::fallback(1.5);
    assert!(ctrl.start(CalibrationVariant::Directional));
    assert_eq!(
        ctrl.state(),
        CalibrationState::Warmup {
            step: 0,
            elapsed: 0.0
        }
    );

    // 100 ms warmup at 50 ms per frame.
    ctrl.advance(DT, Some(Vec2::ZERO), &fallback);
    assert!(matches!(ctrl.state(), CalibrationState::Warmup { step: 0, .. }));
    ctrl.advance(DT, Some(Vec2::ZERO), &fallback);
    assert!(matches!(ctrl.state(), CalibrationState::Collecting { step: 0, .. }));

    for _ in 0..4 {
        ctrl.advance(DT, Some(Vec2::new(-0.2, 0.0)), &fallback);
    }
    assert!(matches!(ctrl.state(), CalibrationState::Warmup { step: 1, .. }));
}

#[test]
fn test_start_while_active_is_ignored() {
    let mut ctrl = CalibrationController::new(quick_config());
    assert!(ctrl.start(CalibrationVariant::Directional));
    ctrl.advance(DT, None, &Mapping::fallback(1.5));
    let before = ctrl.state();
    assert!(!ctrl.start(CalibrationVariant::Grid));
    assert_eq!(ctrl.state(), before);
    assert_eq!(ctrl.variant(), CalibrationVariant::Directional);
}

#[test]
fn test_directional_produces_bounds_from_averages() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Directional);
    let offsets = [
        Vec2::new(-0.2, 0.01),
        Vec2::new(0.25, 0.0),
        Vec2::new(0.0, -0.15),
        Vec2::new(0.02, 0.18),
    ];
    let events = run(&mut ctrl, &Mapping::fallback(1.5), |step| Some(offsets[step]));

    match events.last() {
        Some(CalibrationEvent::Completed(Mapping::Bounds(b))) => {
            assert!((b.min_x + 0.2).abs() < 1e-5);
            assert!((b.max_x - 0.25).abs() < 1e-5);
            assert!((b.min_y + 0.15).abs() < 1e-5);
            assert!((b.max_y - 0.18).abs() < 1e-5);
        }
        other => panic!("expected bounds, got {:?}", other),
    }
    assert_eq!(ctrl.state(), CalibrationState::Idle);
    assert!(!ctrl.last_failed());
}

#[test]
fn test_directional_floors_keep_denominators_open() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Directional);
    let events = run(&mut ctrl, &Mapping::fallback(1.5), |_| Some(Vec2::new(0.01, -0.01)));

    match events.last() {
        Some(CalibrationEvent::Completed(Mapping::Bounds(b))) => {
            assert_eq!(b.min_x, -0.1);
            assert_eq!(b.max_x, 0.1);
            assert_eq!(b.min_y, -0.08);
            assert_eq!(b.max_y, 0.08);
        }
        other => panic!("expected bounds, got {:?}", other),
    }
}

#[test]
fn test_directional_without_samples_keeps_prior_bounds() {
    let prior = BoundsMapping {
        min_x: -0.35,
        max_x: 0.31,
        min_y: -0.2,
        max_y: 0.27,
    };
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Directional);
    let events = run(&mut ctrl, &Mapping::Bounds(prior), |_| None);
    assert_eq!(events.last(), Some(&CalibrationEvent::Completed(Mapping::Bounds(prior))));
}

#[test]
fn test_grid_recovers_affine_coefficients() {
    let config = quick_config();
    let targets = targets_for(CalibrationVariant::Grid, &config);
    let mut ctrl = CalibrationController::new(config);
    ctrl.start(CalibrationVariant::Grid);

    let events = run(&mut ctrl, &Mapping::fallback(1.5), |step| {
        Some((targets[step].screen_position() - Vec2::splat(0.5)) * 0.6)
    });

    match events.last() {
        Some(CalibrationEvent::Completed(Mapping::Affine(m))) => {
            assert!((m.x.a - 1.6667).abs() < 1e-3);
            assert!((m.x.b - 0.5).abs() < 1e-4);
            assert!((m.y.a - 1.6667).abs() < 1e-3);
            assert!((m.y.b - 0.5).abs() < 1e-4);
        }
        other => panic!("expected affine, got {:?}", other),
    }
}

#[test]
fn test_grid_with_identical_offsets_fails() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Grid);
    let events = run(&mut ctrl, &Mapping::fallback(1.5), |_| Some(Vec2::new(0.05, 0.05)));

    assert!(matches!(
        events.last(),
        Some(CalibrationEvent::Failed(
            CalibrationError::DegenerateCalibration { .. }
        ))
    ));
    assert_eq!(ctrl.state(), CalibrationState::Idle);
    assert!(ctrl.last_failed());
}

#[test]
fn test_grid_times_out_without_faces() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Grid);
    let events = run(&mut ctrl, &Mapping::fallback(1.5), |_| None);
    assert!(matches!(
        events.last(),
        Some(CalibrationEvent::Failed(
            CalibrationError::InsufficientTargets { found: 0, .. }
        ))
    ));
}

#[test]
fn test_progress_text() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Directional);
    let fallback = Mapping::fallback(1.5);

    match ctrl.advance(DT, None, &fallback) {
        Some(CalibrationEvent::Progress(p)) => {
            assert_eq!(p.phase, Phase::Warmup);
            assert_eq!(p.to_string(), "[1/4] Look to the far LEFT edge (get ready)");
        }
        other => panic!("expected progress, got {:?}", other),
    }

    ctrl.advance(DT, None, &fallback);
    match ctrl.advance(DT, Some(Vec2::new(-0.2, 0.0)), &fallback) {
        Some(CalibrationEvent::Progress(p)) => {
            assert_eq!(p.phase, Phase::Collecting);
            assert_eq!(p.samples, 1);
            assert_eq!(p.to_string(), "[1/4] Look to the far LEFT edge (1 samples)");
        }
        other => panic!("expected progress, got {:?}", other),
    }
}

#[test]
fn test_abandon_returns_to_idle() {
    let mut ctrl = CalibrationController::new(quick_config());
    ctrl.start(CalibrationVariant::Grid);
    ctrl.abandon();
    assert!(!ctrl.is_active());
    assert!(ctrl.start(CalibrationVariant::Directional));
}
