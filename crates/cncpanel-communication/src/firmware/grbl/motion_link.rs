//! Motion controller link
//!
//! Request/response driver for a GRBL controller. Every request except the
//! settings dump must be answered by exactly `ok\n` within the settle delay;
//! homing instead polls the input buffer up to the homing deadline.

use super::response_parser::{parse_settings, rejections};
use super::utils::{
    format_setting, format_work_origin, get_setting_name, HOME_COMMAND, SETTINGS_COMMAND,
    WAKE_SEQUENCE,
};
use crate::communication::{
    normalize_response, settle, ConnectionParams, LinkTiming, RealSerialPort, SerialLink,
};
use crate::firmware::expect_acknowledgment;
use cncpanel_core::{ControllerError, Result};
use std::collections::BTreeMap;
use std::thread;
use std::time::Instant;

/// Acknowledgment GRBL sends for an accepted line
pub const GRBL_ACK: &str = "ok\n";

/// Driver for the motion controller
pub struct MotionLink {
    link: Box<dyn SerialLink>,
    timing: LinkTiming,
}

impl MotionLink {
    /// Wrap an already woken link
    pub fn new(link: Box<dyn SerialLink>, timing: LinkTiming) -> Self {
        Self { link, timing }
    }

    /// Wrap a freshly opened link and wake the controller
    pub fn open(link: Box<dyn SerialLink>, timing: LinkTiming) -> Result<Self> {
        let mut motion = Self::new(link, timing);
        motion.wake()?;
        Ok(motion)
    }

    /// Open the serial port described by `params` and wake the controller
    pub fn connect(params: &ConnectionParams, timing: LinkTiming) -> Result<Self> {
        let port = RealSerialPort::open(params)?;
        Self::open(Box::new(port), timing)
    }

    /// Port name of the underlying link
    pub fn port_name(&self) -> &str {
        self.link.name()
    }

    /// Wake the controller and discard its startup banner
    pub fn wake(&mut self) -> Result<()> {
        tracing::debug!("Waking motion controller on {}", self.link.name());
        self.link.write_all(WAKE_SEQUENCE)?;
        settle(self.timing.boot_settle);
        self.link.clear_input()
    }

    /// Read the full settings table (`$$`)
    pub fn read_settings(&mut self) -> Result<BTreeMap<u16, String>> {
        self.write_line(SETTINGS_COMMAND)?;
        settle(self.timing.settle);
        let response = normalize_response(&self.link.read_available()?);
        let settings = parse_settings(&response);

        for (number, value) in &settings {
            tracing::debug!("${}={} ({})", number, value, get_setting_name(*number));
        }
        tracing::info!("Read {} settings from {}", settings.len(), self.link.name());
        Ok(settings)
    }

    /// Send one line and require `ok`
    pub fn send_command(&mut self, command: &str) -> Result<()> {
        self.write_line(command)?;
        settle(self.timing.settle);
        self.expect_ok(command)
    }

    /// Write one setting (`$<key>=<value>`)
    pub fn write_setting(&mut self, key: u16, value: &str) -> Result<()> {
        self.send_command(&format_setting(key, value))
    }

    /// Run the homing cycle
    ///
    /// Waits for the first response byte for at most the homing deadline,
    /// then takes the settle delay and requires `ok`.
    pub fn home(&mut self) -> Result<()> {
        tracing::info!("Homing motion controller on {}", self.link.name());
        self.write_line(HOME_COMMAND)?;

        let started = Instant::now();
        let deadline = started + self.timing.homing_timeout;
        while self.link.bytes_to_read()? == 0 {
            if Instant::now() >= deadline {
                tracing::error!(
                    "Homing on {} gave no response within {:?}",
                    self.link.name(),
                    self.timing.homing_timeout
                );
                return Err(ControllerError::Timeout {
                    operation: HOME_COMMAND.to_string(),
                    timeout_ms: self.timing.homing_timeout.as_millis() as u64,
                }
                .into());
            }
            thread::sleep(self.timing.homing_poll);
        }

        settle(self.timing.settle);
        self.expect_ok(HOME_COMMAND)?;
        tracing::info!("Homing finished after {:?}", started.elapsed());
        Ok(())
    }

    /// Offset the G54 work origin relative to the machine home
    pub fn set_work_origin(&mut self, x: f64, y: f64) -> Result<()> {
        self.send_command(&format_work_origin(x, y))
    }

    /// Release the serial port
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing motion link {}", self.link.name());
        self.link.close()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        tracing::debug!("-> {}", line);
        self.link.write_all(format!("{}\n", line).as_bytes())
    }

    fn expect_ok(&mut self, command: &str) -> Result<()> {
        let raw = self.link.read_available()?;
        let result = expect_acknowledgment(command, GRBL_ACK, &raw);
        if result.is_err() {
            for rejection in rejections(&normalize_response(&raw)) {
                tracing::error!("GRBL rejected {:?}: {}", command, rejection);
            }
        }
        result
    }
}
