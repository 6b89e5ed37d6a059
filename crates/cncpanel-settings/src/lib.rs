//! CNC Panel Settings Crate
//!
//! Handles the panel configuration: serial ports, device timing, companion
//! executables, machine profile and the startup mode.

pub mod config;
pub mod error;

pub use config::{
    CompanionSettings, Config, ConnectionSettings, MachineSettings, TimingSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
