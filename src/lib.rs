//! # CNC Panel
//!
//! Control panel for a homebrew CNC router / laser cutter:
//! - Configures the GRBL motion controller for laser or router work
//!   (settings, homing, work origin) before handing it to the companion
//!   application
//! - Polls and drives the peripheral board (air, vacuum, hood, spindle and
//!   laser relays, vacuum pump, pressure and PWM readings)
//! - Keeps the laser and router companion applications mutually exclusive
//!
//! ## Architecture
//!
//! CNC Panel is organized as a workspace with multiple crates:
//!
//! 1. **cncpanel-core** - Data types, errors, presentation traits
//! 2. **cncpanel-communication** - Serial links, GRBL and peripheral protocols
//! 3. **cncpanel-settings** - Configuration files
//! 4. **cncpanel-machine** - Machine controller, mode sequences, process supervision
//! 5. **cncpanel** - Binary with the CLI and the console presentation

pub mod cli;
pub mod console;

pub use cli::Args;
pub use console::{parse_command, ConsoleCommand, ConsolePresentation, HeadlessPresentation};

pub use cncpanel_communication::{list_ports, ConnectionParams, LinkTiming, MotionLink, PeripheralLink};
pub use cncpanel_core::{Error, Mode, Peripheral, Presentation, Result, UserIntent};
pub use cncpanel_machine::{ExitReason, MachineController, ProcessSupervisor};
pub use cncpanel_settings::Config;

use anyhow::Context;
use cncpanel_settings::TimingSettings;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - A log file next to the executable in Windows release builds
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = log_filter(&std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default());

    // Windows release builds are usually started from a shortcut, so keep a file log
    #[cfg(all(target_os = "windows", not(debug_assertions)))]
    {
        use std::fs::OpenOptions;

        let log_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::path::PathBuf::from("."));

        let log_file = log_dir.join("cncpanel.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("opening {}", log_file.display()))?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
            .with(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_line_number(true),
            )
            .init();
    }

    #[cfg(not(all(target_os = "windows", not(debug_assertions))))]
    {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

/// Filter for `directives` in `RUST_LOG` syntax; INFO when none are given
pub fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Device delays from the timing section
pub fn link_timing(timing: &TimingSettings) -> LinkTiming {
    LinkTiming {
        boot_settle: Duration::from_millis(timing.boot_settle_ms),
        settle: Duration::from_millis(timing.settle_ms),
        homing_timeout: Duration::from_millis(timing.homing_timeout_ms),
        homing_poll: Duration::from_millis(timing.homing_poll_ms),
        peripheral_boot: Duration::from_millis(timing.peripheral_boot_ms),
    }
}

/// Connection parameters for the motion controller, if one is configured
pub fn motion_params(config: &Config) -> Option<ConnectionParams> {
    let connection = &config.connection;
    connection.motion_port.as_ref().map(|port| {
        ConnectionParams::new(port.clone(), connection.motion_baud_rate)
            .with_timeout_ms(connection.read_timeout_ms)
    })
}

/// Connection parameters for the peripheral controller
pub fn peripheral_params(config: &Config) -> ConnectionParams {
    let connection = &config.connection;
    ConnectionParams::new(connection.peripheral_port.clone(), connection.peripheral_baud_rate)
        .with_timeout_ms(connection.read_timeout_ms)
}

/// Open both devices and run one panel session with `presentation`
pub fn run_panel(config: &Config, presentation: &mut dyn Presentation) -> anyhow::Result<ExitReason> {
    let timing = link_timing(&config.timing);

    let params = peripheral_params(config);
    let peripheral = PeripheralLink::connect(&params, timing)
        .with_context(|| format!("opening peripheral controller on {}", params.port))?;

    let motion = match motion_params(config) {
        Some(params) => Some(
            MotionLink::connect(&params, timing)
                .with_context(|| format!("opening motion controller on {}", params.port))?,
        ),
        None => {
            tracing::info!("No motion controller configured, monitoring peripherals only");
            None
        }
    };

    let mut controller = MachineController::new(motion, peripheral, ProcessSupervisor::system())
        .with_machine(config.machine.clone())
        .with_companions(config.companions.clone());

    if controller.has_motion_link() {
        if let Err(e) = controller.read_motion_settings().map(|_| ()) {
            if let Err(cleanup) = controller.shutdown() {
                tracing::warn!("Shutdown incomplete: {}", cleanup);
            }
            return Err(e).context("reading motion controller settings");
        }
    }

    let reason = cncpanel_machine::run(
        &mut controller,
        config.mode,
        presentation,
        config.timing.poll_interval(),
    )
    .with_context(|| format!("running {} mode", config.mode))?;

    controller.close().context("closing devices")?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_honours_directives() {
        assert_eq!(log_filter("").max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter("warn").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter("cncpanel_machine=trace").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_link_timing_from_config() {
        let timing = link_timing(&TimingSettings::default());
        assert_eq!(timing, LinkTiming::default());
    }

    #[test]
    fn test_connection_params_from_config() {
        let mut config = Config::new();
        config.connection.read_timeout_ms = 250;

        let motion = motion_params(&config).unwrap();
        assert_eq!(motion.port, "COM6");
        assert_eq!(motion.baud_rate, 115200);
        assert_eq!(motion.timeout_ms, 250);

        let peripheral = peripheral_params(&config);
        assert_eq!(peripheral.port, "COM7");

        config.connection.motion_port = None;
        assert!(motion_params(&config).is_none());
    }
}
