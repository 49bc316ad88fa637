use common::calibration_manager::CalibrationManager;
use common::{AffineAxis, AffineMapping, BoundsMapping, Mapping};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eyepoint-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_save_and_load_bounds() {
    let dir = scratch_dir("bounds");
    let manager = CalibrationManager::new(dir.clone());
    let mapping = Mapping::Bounds(BoundsMapping {
        min_x: -0.31,
        max_x: 0.27,
        min_y: -0.2,
        max_y: 0.18,
    });

    manager.save(&mapping).unwrap();
    assert!(dir.join("mapping_default.json").exists());
    assert_eq!(manager.load().unwrap(), Some(mapping));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_save_and_load_affine() {
    let dir = scratch_dir("affine");
    let manager = CalibrationManager::with_profile(dir.clone(), "desk");
    let mapping = Mapping::Affine(AffineMapping {
        x: AffineAxis { a: 1.6, b: 0.5 },
        y: AffineAxis { a: 2.1, b: 0.45 },
    });

    manager.save(&mapping).unwrap();
    let text = std::fs::read_to_string(dir.join("mapping_desk.json")).unwrap();
    assert!(text.contains("\"kind\": \"affine\""));
    assert_eq!(manager.load().unwrap(), Some(mapping));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_profile_is_none() {
    let dir = scratch_dir("missing");
    let manager = CalibrationManager::new(dir);
    assert_eq!(manager.load().unwrap(), None);
}

#[test]
fn test_fallback_is_not_saved() {
    let dir = scratch_dir("fallback");
    let manager = CalibrationManager::new(dir.clone());
    assert!(manager.save(&Mapping::fallback(1.5)).is_err());
    assert!(!dir.join("mapping_default.json").exists());
}

#[test]
fn test_degenerate_file_is_rejected() {
    let dir = scratch_dir("degenerate");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("mapping_default.json"),
        r#"{"kind":"bounds","min_x":0.1,"max_x":0.2,"min_y":-0.2,"max_y":0.2}"#,
    )
    .unwrap();

    let manager = CalibrationManager::new(dir.clone());
    assert!(manager.load().is_err());

    std::fs::write(dir.join("mapping_default.json"), "not json").unwrap();
    assert!(manager.load().is_err());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_profile_switch_and_sanitized_names() {
    let dir = scratch_dir("profiles");
    let mut manager = CalibrationManager::new(dir.clone());
    assert_eq!(manager.profile_path("../evil name"), dir.join("mapping____evil_name.json"));
    assert_eq!(manager.profile_path(""), dir.join("mapping_default.json"));

    let mapping = Mapping::Bounds(BoundsMapping::default());
    manager.switch_profile("laptop");
    manager.save(&mapping).unwrap();
    assert_eq!(manager.current_profile_id, "laptop");

    manager.switch_profile("default");
    assert_eq!(manager.load().unwrap(), None);
    manager.switch_profile("laptop");
    assert_eq!(manager.load().unwrap(), Some(mapping));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_non_finite_fields_are_replaced_on_save() {
    let dir = scratch_dir("nonfinite");
    let manager = CalibrationManager::new(dir.clone());
    let mapping = Mapping::Bounds(BoundsMapping {
        min_x: f32::NAN,
        max_x: 0.3,
        min_y: -0.2,
        max_y: f32::INFINITY,
    });

    manager.save(&mapping).unwrap();
    let loaded = manager.load().unwrap();
    assert_eq!(
        loaded,
        Some(Mapping::Bounds(BoundsMapping {
            min_x: -0.28,
            max_x: 0.3,
            min_y: -0.2,
            max_y: 0.22,
        }))
    );

    let _ = std::fs::remove_dir_all(&dir);
}
