//! Error handling for CNC Panel
//!
//! Provides the error types for all layers of the panel:
//! - Controller errors (sequencing, timeouts, mode transitions)
//! - Connection errors (serial ports)
//! - Firmware errors (unexpected responses from either device)
//! - Process errors (companion application lifecycle)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Controller error type
///
/// Represents errors raised while driving the machine: bounded waits that
/// expired, missing links and rejected mode transitions.
#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    /// The motion link is not available (peripheral-only configuration,
    /// or the link has already been handed over to the companion)
    #[error("Motion controller not connected")]
    NotConnected,

    /// A bounded wait expired before the device answered
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// The command or operation that was waiting.
        operation: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Invalid mode transition
    #[error("Invalid mode transition from {current} to {requested}")]
    InvalidStateTransition {
        /// The current mode name.
        current: String,
        /// The requested mode name.
        requested: String,
    },

    /// Peripheral name that cannot be toggled
    #[error("Unknown peripheral: {name}")]
    UnknownPeripheral {
        /// The name that was requested.
        name: String,
    },

    /// Unknown mode name or code
    #[error("Unknown mode: {value}")]
    UnknownMode {
        /// The rejected value.
        value: String,
    },

    /// A machine parameter is neither configured nor reported by the
    /// motion controller
    #[error("Machine setting unavailable: {name}")]
    MissingSetting {
        /// The parameter name.
        name: String,
    },
}

/// Connection error type
///
/// Represents errors related to the serial links.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// The port could not be opened
    #[error("Port {port} unavailable: {reason}")]
    PortUnavailable {
        /// The name of the port.
        port: String,
        /// The reason the port could not be opened.
        reason: String,
    },

    /// Reading from or writing to an open port failed
    #[error("I/O error on {port}: {reason}")]
    Io {
        /// The name of the port.
        port: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The link was already closed
    #[error("Link {port} is closed")]
    Closed {
        /// The name of the port.
        port: String,
    },

    /// Serial port enumeration failed
    #[error("Failed to enumerate serial ports: {reason}")]
    Enumeration {
        /// The reason for the failure.
        reason: String,
    },
}

/// Firmware error type
///
/// Represents responses that do not honour the line protocol of either the
/// motion controller or the peripheral controller.
#[derive(Error, Debug, Clone)]
pub enum FirmwareError {
    /// The response did not equal the expected literal acknowledgment
    #[error("Protocol mismatch for {command:?}: expected {expected:?}, got {actual:?}")]
    ProtocolMismatch {
        /// The command that was sent (without the line terminator).
        command: String,
        /// The expected acknowledgment.
        expected: String,
        /// The response that actually arrived.
        actual: String,
    },
}

/// Process error type
///
/// Represents failures to manage the companion applications.
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    /// The executable could not be started
    #[error("Failed to launch {path}: {reason}")]
    LaunchFailed {
        /// The executable path.
        path: String,
        /// The reason the launch failed.
        reason: String,
    },

    /// The running process list could not be read
    #[error("Failed to enumerate processes: {reason}")]
    EnumerationFailed {
        /// The reason for the failure.
        reason: String,
    },

    /// A process could not be terminated
    #[error("Failed to terminate process {pid}: {reason}")]
    TerminateFailed {
        /// The process id.
        pid: u32,
        /// The reason for the failure.
        reason: String,
    },
}

/// Main error type for CNC Panel
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Firmware error
    #[error(transparent)]
    Firmware(#[from] FirmwareError),

    /// Process error
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::Timeout { .. }))
    }

    /// Check if this is a protocol mismatch
    pub fn is_protocol_mismatch(&self) -> bool {
        matches!(self, Error::Firmware(FirmwareError::ProtocolMismatch { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a process error
    pub fn is_process_error(&self) -> bool {
        matches!(self, Error::Process(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
