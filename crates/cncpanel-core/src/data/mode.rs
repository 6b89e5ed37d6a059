//! Machine operating mode

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating mode of the rig
///
/// The integer code is what the peripheral controller understands on the
/// `mode` key and what it reports back in its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Nothing selected yet
    #[default]
    Idle,
    /// CNC router with the motion software as companion
    Router,
    /// Laser cutter with the laser software as companion
    Laser,
    /// Direct peripheral control, no companion
    Manual,
}

impl Mode {
    /// All modes, in code order
    pub const ALL: [Mode; 4] = [Mode::Idle, Mode::Router, Mode::Laser, Mode::Manual];

    /// Wire code sent to and reported by the peripheral controller
    pub fn code(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Router => 1,
            Self::Laser => 2,
            Self::Manual => 3,
        }
    }

    /// Look up a mode by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    /// Whether entering this mode hands the motion controller to a companion
    pub fn has_companion(self) -> bool {
        matches!(self, Self::Router | Self::Laser)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Router => write!(f, "router"),
            Self::Laser => write!(f, "laser"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for Mode {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| ControllerError::UnknownMode {
                value: s.to_string(),
            });
        }

        match s.to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "router" | "cnc" => Ok(Self::Router),
            "laser" => Ok(Self::Laser),
            "manual" => Ok(Self::Manual),
            _ => Err(ControllerError::UnknownMode {
                value: s.to_string(),
            }),
        }
    }
}
