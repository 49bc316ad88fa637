use common::{EuroFilter, OffsetFilter};
use glam::Vec2;

#[test]
fn test_euro_filter_initialization() {
    let mut filter = EuroFilter::new();
    let first_val = 100.0;
    let filtered = filter.filter(first_val, 0.1);
    assert_eq!(
        filtered, first_val,
        "First value should be passed through exactly"
    );
}

#[test]
fn test_euro_filter_step_is_damped() {
    let mut filter = EuroFilter::new();
    filter.filter(0.0, 0.1);

    let filtered = filter.filter(1.0, 0.1);
    assert!(filtered > 0.0);
    assert!(filtered < 1.0);
}

#[test]
fn test_euro_filter_nan_handling() {
    let mut filter = EuroFilter::new();
    let res = filter.filter(f32::NAN, 0.1);
    assert_eq!(res, 0.0);
}

#[test]
fn test_euro_filter_zero_dt_reinitializes() {
    let mut filter = EuroFilter::new();
    filter.filter(0.0, 0.1);
    assert_eq!(filter.filter(0.7, 0.0), 0.7);
}

#[test]
fn test_offset_filter_reset_passes_next_value_through() {
    let mut filter = OffsetFilter::from_smoothness(0.8);
    filter.filter(Vec2::ZERO, 0.03);
    let damped = filter.filter(Vec2::new(0.2, -0.1), 0.03);
    assert!(damped.x < 0.2);

    filter.reset();
    assert_eq!(filter.filter(Vec2::new(0.2, -0.1), 0.03), Vec2::new(0.2, -0.1));
}
