//! Command line arguments

use anyhow::Context;
use clap::Parser;
use cncpanel_core::Mode;
use cncpanel_settings::Config;
use std::path::PathBuf;

/// Control panel for the CNC router / laser rig
#[derive(Parser, Debug, Default)]
#[command(name = "cncpanel", version, about)]
pub struct Args {
    /// Config file (.toml or .json); defaults to the platform config directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Motion controller (GRBL) serial port
    #[arg(long, value_name = "PORT", conflicts_with = "no_motion")]
    pub motion_port: Option<String>,

    /// Peripheral controller serial port
    #[arg(long, value_name = "PORT")]
    pub peripheral_port: Option<String>,

    /// Monitor the peripheral controller only
    #[arg(long)]
    pub no_motion: bool,

    /// Mode to enter at startup (idle, router, laser, manual)
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Run without the console; the session ends when the companion exits,
    /// so the mode must be router or laser
    #[arg(long)]
    pub headless: bool,

    /// Print candidate serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

impl Args {
    /// Load the configuration and apply command line overrides
    ///
    /// The merged result is validated once, after the overrides.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::read_or_default().context("loading default config")?,
        };
        self.apply(&mut config);
        config.validate().context("invalid configuration")?;
        if self.headless && !config.mode.has_companion() {
            anyhow::bail!(
                "--headless needs a mode with a companion application (router or laser), got {}",
                config.mode
            );
        }
        Ok(config)
    }

    /// Override config values given on the command line
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = &self.motion_port {
            config.connection.motion_port = Some(port.clone());
        }
        if self.no_motion {
            config.connection.motion_port = None;
        }
        if let Some(port) = &self.peripheral_port {
            config.connection.peripheral_port = port.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}
