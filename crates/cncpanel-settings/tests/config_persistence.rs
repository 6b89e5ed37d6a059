use cncpanel_core::Mode;
use cncpanel_settings::{Config, ConfigError, SettingsError};
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_config() -> Config {
    let mut config = Config::new();
    config.mode = Mode::Router;
    config.connection.motion_port = Some("/dev/ttyUSB0".to_string());
    config.connection.peripheral_port = "/dev/ttyACM0".to_string();
    config.machine.x_travel_mm = Some(838.0);
    config.machine.y_travel_mm = Some(838.0);
    config.companions.router = PathBuf::from("/opt/carbide/carbidemotion");
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("panel.toml");

    let config = sample_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.json");

    let mut config = sample_config();
    config.connection.motion_port = None;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.connection.motion_port, None);
    assert_eq!(loaded.mode, Mode::Router);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.yaml");
    std::fs::write(&path, "mode: laser").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    std::fs::write(&path, "[timing]\npoll_interval_ms = 0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_read_skips_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    std::fs::write(
        &path,
        "[connection]\nmotion_port = \"COM7\"\nperipheral_port = \"COM7\"\n",
    )
    .unwrap();

    assert!(matches!(
        Config::load_from_file(&path).unwrap_err(),
        SettingsError::Config(ConfigError::Conflict { .. })
    ));

    let mut config = Config::read_from_file(&path).unwrap();
    assert!(config.validate().is_err());
    config.connection.motion_port = None;
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    std::fs::write(&path, "mode = [").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError { .. }));
    assert!(err.to_string().contains("panel.toml"));
}
