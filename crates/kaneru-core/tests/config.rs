use kaneru_core::{ConfigPaths, DockConfig, ModuleType, NotificationPosition, ShellConfig};

#[test]
fn first_load_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::with_dirs(dir.path().join("config"), dir.path().join("cache"));

    let config = ShellConfig::load(&paths.config_file);
    assert_eq!(config, ShellConfig::default());
    assert!(paths.config_file.exists());

    let reread = ShellConfig::read(&paths.config_file).unwrap();
    assert_eq!(reread, config);
}

#[test]
fn partial_file_keeps_defaults_for_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::with_dirs(dir.path(), dir.path());
    std::fs::write(
        &paths.config_file,
        r#"{
            "clock_format": "%H:%M:%S",
            "modules_right": ["battery"],
            "notification": { "position": "bottom-left", "max_visible": 3 }
        }"#,
    )
    .unwrap();

    let config = ShellConfig::load(&paths.config_file);
    assert_eq!(config.clock_interval_secs(), 1);
    assert_eq!(config.modules_right, vec![ModuleType::Battery]);
    assert!(!config.has_module(ModuleType::Audio));
    assert_eq!(config.notification.position, NotificationPosition::BottomLeft);
    assert_eq!(config.notification.max_visible, 3);
    assert_eq!(config.notification.default_timeout_ms, 5000);
    assert_eq!(config.dock, DockConfig::default());
}

#[test]
fn broken_file_falls_back_without_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::with_dirs(dir.path(), dir.path());
    std::fs::write(&paths.config_file, "{ not json").unwrap();

    assert!(ShellConfig::read(&paths.config_file).is_err());
    assert_eq!(ShellConfig::load(&paths.config_file), ShellConfig::default());
    assert_eq!(
        std::fs::read_to_string(&paths.config_file).unwrap(),
        "{ not json"
    );
}
