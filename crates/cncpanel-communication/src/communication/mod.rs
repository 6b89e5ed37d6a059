//! Serial link abstraction
//!
//! Both devices on the rig speak a line protocol over a serial port. The
//! protocol drivers own a boxed [`SerialLink`] so that the real port and the
//! in-memory [`VirtualPort`] are interchangeable.

pub mod serial;
pub mod virtual_port;

pub use serial::{list_ports, RealSerialPort, SerialPortInfo};
pub use virtual_port::{Responder, VirtualPort};

use cncpanel_core::Result;
use std::thread;
use std::time::Duration;

/// Connection parameters for one serial link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM6")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Per-read timeout in milliseconds
    pub timeout_ms: u64,
}

impl ConnectionParams {
    /// Parameters for `port` at `baud_rate` with the default 5 s read timeout
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            timeout_ms: 5000,
        }
    }

    /// Override the read timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// An open, line-oriented serial connection
pub trait SerialLink: Send {
    /// Port name for diagnostics
    fn name(&self) -> &str;

    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Number of received bytes waiting to be read
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Read every byte currently buffered, without waiting for more
    fn read_available(&mut self) -> Result<Vec<u8>>;

    /// Discard everything in the input buffer
    fn clear_input(&mut self) -> Result<()>;

    /// Release the port
    fn close(self: Box<Self>) -> Result<()>;
}

/// Delays applied around device traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Wait after waking the motion controller before flushing its banner
    pub boot_settle: Duration,
    /// Wait between a request and reading its response
    pub settle: Duration,
    /// Deadline for the homing acknowledgment
    pub homing_timeout: Duration,
    /// Sleep between input-buffer checks while homing
    pub homing_poll: Duration,
    /// Wait after opening the peripheral port (the board resets on open)
    pub peripheral_boot: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            boot_settle: Duration::from_secs(2),
            settle: Duration::from_secs(1),
            homing_timeout: Duration::from_secs(40),
            homing_poll: Duration::from_millis(50),
            peripheral_boot: Duration::from_secs(2),
        }
    }
}

impl LinkTiming {
    /// Timing for devices that answer synchronously, such as [`VirtualPort`]
    ///
    /// Only the homing deadline is kept (shortened) so that a silent device
    /// still times out.
    pub fn simulated() -> Self {
        Self {
            boot_settle: Duration::ZERO,
            settle: Duration::ZERO,
            homing_timeout: Duration::from_millis(200),
            homing_poll: Duration::from_millis(1),
            peripheral_boot: Duration::ZERO,
        }
    }
}

/// Sleep for `delay` unless it is zero
pub(crate) fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Decode a raw response and strip carriage returns
pub fn normalize_response(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\r', "")
}
