//! Peripheral controller link
//!
//! The board resets when its port is opened, so [`PeripheralLink::open`]
//! waits for it to boot before sending anything.

use super::response_parser::{format_write, parse_status, STATUS_COMMAND};
use crate::communication::{
    normalize_response, settle, ConnectionParams, LinkTiming, RealSerialPort, SerialLink,
};
use crate::firmware::expect_acknowledgment;
use cncpanel_core::Result;
use std::collections::BTreeMap;

/// Acknowledgment the board sends for an accepted write
pub const PERIPHERAL_ACK: &str = "done\n";

/// Driver for the peripheral controller
pub struct PeripheralLink {
    link: Box<dyn SerialLink>,
    timing: LinkTiming,
}

impl PeripheralLink {
    /// Wrap a freshly opened link, waiting for the board to boot
    pub fn open(link: Box<dyn SerialLink>, timing: LinkTiming) -> Self {
        tracing::debug!(
            "Waiting {:?} for peripheral controller on {}",
            timing.peripheral_boot,
            link.name()
        );
        settle(timing.peripheral_boot);
        Self { link, timing }
    }

    /// Open the serial port described by `params`
    pub fn connect(params: &ConnectionParams, timing: LinkTiming) -> Result<Self> {
        let port = RealSerialPort::open(params)?;
        Ok(Self::open(Box::new(port), timing))
    }

    /// Port name of the underlying link
    pub fn port_name(&self) -> &str {
        self.link.name()
    }

    /// Request a status report
    pub fn read_status(&mut self) -> Result<BTreeMap<String, String>> {
        self.write_line(STATUS_COMMAND)?;
        settle(self.timing.settle);
        let response = normalize_response(&self.link.read_available()?);
        Ok(parse_status(&response))
    }

    /// Write one value and require `done`
    pub fn write_value(&mut self, key: &str, value: &str) -> Result<()> {
        let request = format_write(key, value);
        self.write_line(&request)?;
        settle(self.timing.settle);
        let raw = self.link.read_available()?;
        expect_acknowledgment(&request, PERIPHERAL_ACK, &raw).inspect_err(|e| {
            tracing::error!("Peripheral write failed: {}", e);
        })
    }

    /// Release the serial port
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing peripheral link {}", self.link.name());
        self.link.close()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        tracing::debug!("-> {}", line);
        self.link.write_all(format!("{}\n", line).as_bytes())
    }
}
