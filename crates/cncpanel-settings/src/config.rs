//! Configuration for CNC Panel
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files; the default file lives in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (ports, baud rates, read timeout)
//! - Timing (settle delays, homing deadline, poll interval)
//! - Companion executables (laser and router software)
//! - Machine profile (travel extents, spindle rating)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use cncpanel_core::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Serial connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Motion controller port; `None` runs in peripheral-only monitoring
    pub motion_port: Option<String>,
    /// Peripheral controller port
    pub peripheral_port: String,
    /// Motion controller baud rate
    pub motion_baud_rate: u32,
    /// Peripheral controller baud rate
    pub peripheral_baud_rate: u32,
    /// Per-read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            motion_port: Some("COM6".to_string()),
            peripheral_port: "COM7".to_string(),
            motion_baud_rate: 115200,
            peripheral_baud_rate: 115200,
            read_timeout_ms: 5000,
        }
    }
}

/// Device timing in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Motion controller boot settle after the wake sequence
    pub boot_settle_ms: u64,
    /// Delay between a request and reading its response
    pub settle_ms: u64,
    /// Peripheral controller boot settle after opening its port
    pub peripheral_boot_ms: u64,
    /// Homing acknowledgment deadline
    pub homing_timeout_ms: u64,
    /// Input-buffer check interval while homing
    pub homing_poll_ms: u64,
    /// Control loop period
    pub poll_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            boot_settle_ms: 2000,
            settle_ms: 1000,
            peripheral_boot_ms: 2000,
            homing_timeout_ms: 40_000,
            homing_poll_ms: 50,
            poll_interval_ms: 500,
        }
    }
}

impl TimingSettings {
    /// Control loop period as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Companion application executables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionSettings {
    /// Laser cutting software
    pub laser: PathBuf,
    /// Router motion software
    pub router: PathBuf,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            laser: PathBuf::from(r"C:\Program Files\LightBurn\LightBurn.exe"),
            router: PathBuf::from(r"C:\Program Files (x86)\Carbide Motion 5\carbidemotion.exe"),
        }
    }
}

impl CompanionSettings {
    /// Executable of the companion application for `mode`
    pub fn for_mode(&self, mode: Mode) -> Option<&Path> {
        match mode {
            Mode::Laser => Some(self.laser.as_path()),
            Mode::Router => Some(self.router.as_path()),
            Mode::Idle | Mode::Manual => None,
        }
    }

    /// Every companion executable
    pub fn all(&self) -> [&Path; 2] {
        [self.laser.as_path(), self.router.as_path()]
    }
}

/// Machine profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// X travel in mm; read from `$130` when unset
    pub x_travel_mm: Option<f64>,
    /// Y travel in mm; read from `$131` when unset
    pub y_travel_mm: Option<f64>,
    /// Rated maximum spindle speed written to `$30` in router mode
    pub spindle_max_rpm: u32,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            x_travel_mm: None,
            y_travel_mm: None,
            spindle_max_rpm: 30_000,
        }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Mode entered at startup
    pub mode: Mode,
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Device timing
    pub timing: TimingSettings,
    /// Companion executables
    pub companions: CompanionSettings,
    /// Machine profile
    pub machine: MachineSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/cncpanel/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("cncpanel").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Read the default config file, or defaults when it does not exist
    ///
    /// The result is not validated.
    pub fn read_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::read_from_file(&path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Self::read_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from file without validating it
    ///
    /// For callers that apply overrides before [`validate`](Self::validate).
    pub fn read_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let load_error = |reason: String| SettingsError::LoadError {
            path: path.display().to_string(),
            reason,
        };

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?,
            Format::Toml => toml::from_str(&content).map_err(|e| load_error(e.to_string()))?,
        };

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let save_error = |reason: String| SettingsError::SaveError {
            path: path.display().to_string(),
            reason,
        };

        let content = match Format::of(path)? {
            Format::Json => {
                serde_json::to_string_pretty(self).map_err(|e| save_error(e.to_string()))?
            }
            Format::Toml => toml::to_string_pretty(self).map_err(|e| save_error(e.to_string()))?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let connection = &self.connection;
        ensure_positive("connection.motion_baud_rate", connection.motion_baud_rate as f64)?;
        ensure_positive(
            "connection.peripheral_baud_rate",
            connection.peripheral_baud_rate as f64,
        )?;
        ensure_positive("connection.read_timeout_ms", connection.read_timeout_ms as f64)?;

        if connection.peripheral_port.trim().is_empty() {
            return Err(ConfigError::ValueOutOfRange {
                key: "connection.peripheral_port".to_string(),
                value: String::new(),
            });
        }

        if connection.motion_port.as_deref() == Some(connection.peripheral_port.as_str()) {
            return Err(ConfigError::Conflict {
                first: "connection.motion_port".to_string(),
                second: "connection.peripheral_port".to_string(),
                value: connection.peripheral_port.clone(),
            });
        }

        ensure_positive("timing.settle_ms", self.timing.settle_ms as f64)?;
        ensure_positive("timing.homing_timeout_ms", self.timing.homing_timeout_ms as f64)?;
        ensure_positive("timing.homing_poll_ms", self.timing.homing_poll_ms as f64)?;
        ensure_positive("timing.poll_interval_ms", self.timing.poll_interval_ms as f64)?;

        if let Some(x) = self.machine.x_travel_mm {
            ensure_positive("machine.x_travel_mm", x)?;
        }
        if let Some(y) = self.machine.y_travel_mm {
            ensure_positive("machine.y_travel_mm", y)?;
        }
        ensure_positive("machine.spindle_max_rpm", self.machine.spindle_max_rpm as f64)?;

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

fn ensure_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
