//! Device protocol drivers
//!
//! - [`grbl`]: the GRBL motion controller (`$n=value` settings, `ok` acks)
//! - [`peripheral`]: the auxiliary board (`key=value` status, `done` acks)

pub mod grbl;
pub mod peripheral;

use crate::communication::normalize_response;
use cncpanel_core::{FirmwareError, Result};

/// Require `raw` (carriage returns removed) to equal `expected` exactly
pub(crate) fn expect_acknowledgment(command: &str, expected: &str, raw: &[u8]) -> Result<()> {
    let actual = normalize_response(raw);
    if actual == expected {
        tracing::debug!("<- {:?} for {:?}", actual, command);
        return Ok(());
    }

    Err(FirmwareError::ProtocolMismatch {
        command: command.to_string(),
        expected: expected.to_string(),
        actual,
    }
    .into())
}
