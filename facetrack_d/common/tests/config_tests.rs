use api::BackendKind;
use common::{load_config, InitOptions, Presentation, StaleResultPolicy, TrackerConfig};

#[test]
fn missing_config_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = load_config(&path).unwrap();

    assert_eq!(config, TrackerConfig::default());
    assert!(path.exists());
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn partial_config_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "init": { "useModernBackend": true, "useFullTracking": true },
             "stale_results": "Drop", "presentation": "unity", "max_log_len": 500 }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.init.backend(), BackendKind::Modern);
    assert!(config.init.wants_blendshapes());
    assert_eq!(config.stale_results, StaleResultPolicy::Drop);
    assert_eq!(config.presentation, Presentation::Unity);
    assert_eq!(config.max_log_len, Some(500));
    assert_eq!(config.max_fps, 60.0);
    assert!(!config.recording.record);
}

#[test]
fn invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(load_config(&path).is_err());
}

#[test]
fn full_tracking_needs_the_modern_backend() {
    let opts = InitOptions {
        use_full_tracking: true,
        ..Default::default()
    };
    assert_eq!(opts.backend(), BackendKind::Legacy);
    assert!(!opts.wants_blendshapes());
}
