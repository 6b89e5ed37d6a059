use cncpanel::{Args, Mode};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
mode = "router"

[connection]
motion_port = "/dev/ttyUSB0"
peripheral_port = "/dev/ttyACM0"

[machine]
spindle_max_rpm = 24000
"#;

#[test]
fn test_command_line_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    fs::write(&path, CONFIG).unwrap();

    let args = Args {
        config: Some(path),
        mode: Some(Mode::Laser),
        ..Args::default()
    };
    let config = args.load_config().unwrap();

    assert_eq!(config.mode, Mode::Laser);
    assert_eq!(config.connection.motion_port.as_deref(), Some("/dev/ttyUSB0"));
    assert_eq!(config.machine.spindle_max_rpm, 24000);
}

#[test]
fn test_overrides_are_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    fs::write(&path, CONFIG).unwrap();

    let args = Args {
        config: Some(path),
        peripheral_port: Some("/dev/ttyUSB0".to_string()),
        ..Args::default()
    };
    let err = args.load_config().unwrap_err();
    assert!(format!("{:#}", err).contains("invalid configuration"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let args = Args {
        config: Some(dir.path().join("absent.toml")),
        ..Args::default()
    };
    assert!(args.load_config().is_err());
}

#[test]
fn test_no_motion_resolves_port_clash_in_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    fs::write(
        &path,
        "mode = \"manual\"\n[connection]\nmotion_port = \"COM7\"\nperipheral_port = \"COM7\"\n",
    )
    .unwrap();

    let args = Args {
        config: Some(path.clone()),
        ..Args::default()
    };
    assert!(args.load_config().is_err());

    let args = Args {
        config: Some(path),
        no_motion: true,
        ..Args::default()
    };
    let config = args.load_config().unwrap();
    assert_eq!(config.connection.motion_port, None);
    assert_eq!(config.connection.peripheral_port, "COM7");
}

#[test]
fn test_headless_needs_companion_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panel.toml");
    fs::write(&path, CONFIG).unwrap();

    for mode in [Mode::Idle, Mode::Manual] {
        let args = Args {
            config: Some(path.clone()),
            mode: Some(mode),
            headless: true,
            ..Args::default()
        };
        let err = args.load_config().unwrap_err();
        assert!(err.to_string().contains("--headless"));
    }

    let args = Args {
        config: Some(path),
        headless: true,
        ..Args::default()
    };
    assert_eq!(args.load_config().unwrap().mode, Mode::Router);
}
