//! Peripheral controller state
//!
//! The peripheral controller answers a `status` request with `key=value`
//! lines. [`PeripheralStatus`] is the typed form of one such report; a
//! missing or unparseable key stays `None` so that merging a report into a
//! retained snapshot keeps the previously known value.

use super::mode::Mode;
use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Status keys reported by the peripheral controller
pub mod keys {
    pub const AIR: &str = "air";
    pub const VACUUM: &str = "vacuum";
    pub const HOOD: &str = "hood";
    pub const SPINDLE: &str = "spindle";
    pub const LASER: &str = "laser";
    pub const DOOR: &str = "door";
    pub const LASER_HEAD: &str = "laser_head";
    pub const FORCE_VACUUM: &str = "force_vacuum";
    pub const PUMP_INTERVAL_MS: &str = "pump_interval_ms";
    pub const PRESSURE: &str = "pressure";
    pub const PWM: &str = "pwm";
    pub const MODE: &str = "mode";
}

/// Switchable actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Peripheral {
    /// Air assist valve
    Air,
    /// Vacuum pump
    Vacuum,
    /// Dust hood
    Hood,
    /// Spindle relay
    Spindle,
    /// Laser relay
    Laser,
}

impl Peripheral {
    /// All toggleable peripherals
    pub const ALL: [Peripheral; 5] = [
        Peripheral::Air,
        Peripheral::Vacuum,
        Peripheral::Hood,
        Peripheral::Spindle,
        Peripheral::Laser,
    ];

    /// Key used on the wire
    pub fn key(self) -> &'static str {
        match self {
            Self::Air => keys::AIR,
            Self::Vacuum => keys::VACUUM,
            Self::Hood => keys::HOOD,
            Self::Spindle => keys::SPINDLE,
            Self::Laser => keys::LASER,
        }
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Peripheral {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.key() == name)
            .ok_or(ControllerError::UnknownPeripheral { name })
    }
}

/// Typed peripheral status report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeripheralStatus {
    pub air: Option<bool>,
    pub vacuum: Option<bool>,
    pub hood: Option<bool>,
    pub spindle: Option<bool>,
    pub laser: Option<bool>,
    /// Door switch (true = open)
    pub door: Option<bool>,
    /// Laser head detected on the gantry
    pub laser_head: Option<bool>,
    /// Vacuum forced on by the panel switch
    pub force_vacuum: Option<bool>,
    /// Pump stroke interval in milliseconds, 0 = stopped
    pub pump_interval_ms: Option<u32>,
    /// Raw pressure sensor reading (0-1024)
    pub pressure: Option<u16>,
    /// Raw PWM reading (0-1024)
    pub pwm: Option<u16>,
    /// Mode currently applied by the peripheral controller
    pub mode: Option<Mode>,
    /// Keys this panel does not know about, kept verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PeripheralStatus {
    /// Build a typed status from a raw `key=value` report
    ///
    /// Values that fail to parse are logged and left as `None`.
    pub fn from_report(report: &BTreeMap<String, String>) -> Self {
        let mut status = Self::default();

        for (key, value) in report {
            let value = value.trim();
            let parsed = match key.as_str() {
                keys::AIR => assign(&mut status.air, parse_flag(value)),
                keys::VACUUM => assign(&mut status.vacuum, parse_flag(value)),
                keys::HOOD => assign(&mut status.hood, parse_flag(value)),
                keys::SPINDLE => assign(&mut status.spindle, parse_flag(value)),
                keys::LASER => assign(&mut status.laser, parse_flag(value)),
                keys::DOOR => assign(&mut status.door, parse_flag(value)),
                keys::LASER_HEAD => assign(&mut status.laser_head, parse_flag(value)),
                keys::FORCE_VACUUM => assign(&mut status.force_vacuum, parse_flag(value)),
                keys::PUMP_INTERVAL_MS => assign(&mut status.pump_interval_ms, value.parse().ok()),
                keys::PRESSURE => assign(&mut status.pressure, value.parse().ok()),
                keys::PWM => assign(&mut status.pwm, value.parse().ok()),
                keys::MODE => assign(&mut status.mode, value.parse().ok()),
                _ => {
                    status.extra.insert(key.clone(), value.to_string());
                    true
                }
            };

            if !parsed {
                tracing::warn!("Ignoring unparseable status value {}={}", key, value);
            }
        }

        status
    }

    /// Merge a newer report into this snapshot
    ///
    /// Fields present in `newer` overwrite, absent fields are left untouched.
    pub fn merge(&mut self, newer: &PeripheralStatus) {
        merge_field(&mut self.air, newer.air);
        merge_field(&mut self.vacuum, newer.vacuum);
        merge_field(&mut self.hood, newer.hood);
        merge_field(&mut self.spindle, newer.spindle);
        merge_field(&mut self.laser, newer.laser);
        merge_field(&mut self.door, newer.door);
        merge_field(&mut self.laser_head, newer.laser_head);
        merge_field(&mut self.force_vacuum, newer.force_vacuum);
        merge_field(&mut self.pump_interval_ms, newer.pump_interval_ms);
        merge_field(&mut self.pressure, newer.pressure);
        merge_field(&mut self.pwm, newer.pwm);
        merge_field(&mut self.mode, newer.mode);
        self.extra
            .extend(newer.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Last known state of a switchable peripheral
    pub fn switch_state(&self, peripheral: Peripheral) -> Option<bool> {
        match peripheral {
            Peripheral::Air => self.air,
            Peripheral::Vacuum => self.vacuum,
            Peripheral::Hood => self.hood,
            Peripheral::Spindle => self.spindle,
            Peripheral::Laser => self.laser,
        }
    }

    /// Record the state of a switchable peripheral
    pub fn set_switch_state(&mut self, peripheral: Peripheral, on: bool) {
        let slot = match peripheral {
            Peripheral::Air => &mut self.air,
            Peripheral::Vacuum => &mut self.vacuum,
            Peripheral::Hood => &mut self.hood,
            Peripheral::Spindle => &mut self.spindle,
            Peripheral::Laser => &mut self.laser,
        };
        *slot = Some(on);
    }
}

fn assign<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    let parsed = value.is_some();
    if parsed {
        *slot = value;
    }
    parsed
}

fn merge_field<T: Copy>(slot: &mut Option<T>, newer: Option<T>) {
    if newer.is_some() {
        *slot = newer;
    }
}

/// Parse a boolean as reported by the peripheral controller
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" => Some(true),
        "0" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// Encode a boolean for a peripheral write
pub fn format_flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}
