//! Normalized status snapshot
//!
//! Derived values are computed once per poll from the retained
//! [`PeripheralStatus`] so that presentation code only renders numbers.

use super::peripheral::PeripheralStatus;
use serde::{Deserialize, Serialize};

/// Numerator shared by the pump speed formula and its inverse
pub const PUMP_SPEED_FACTOR: f64 = 200.0;

/// Full scale of the peripheral controller's analog readings
pub const ADC_FULL_SCALE: f64 = 1024.0;

/// Raw pressure reading that corresponds to 0%
pub const PRESSURE_OFFSET: f64 = 104.0;

/// Status as shown to the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Retained peripheral status
    pub peripherals: PeripheralStatus,
    /// Pump speed derived from the stroke interval
    pub pump_speed: Option<f64>,
    /// Pressure in percent of full scale
    pub pressure_percent: Option<f64>,
    /// PWM output in percent
    pub pwm_percent: Option<f64>,
}

impl StatusSnapshot {
    /// Merge a fresh report and recompute the derived values
    pub fn apply_report(&mut self, report: &PeripheralStatus) {
        self.peripherals.merge(report);
        self.refresh_derived();
    }

    /// Recompute derived values from the retained peripheral status
    pub fn refresh_derived(&mut self) {
        self.pump_speed = self.peripherals.pump_interval_ms.map(pump_speed_from_interval);
        self.pressure_percent = self.peripherals.pressure.map(pressure_percent);
        self.pwm_percent = self.peripherals.pwm.map(pwm_percent);
    }
}

/// `200 / interval`; a stopped pump (interval 0) has speed 0
pub fn pump_speed_from_interval(interval_ms: u32) -> f64 {
    if interval_ms == 0 {
        0.0
    } else {
        PUMP_SPEED_FACTOR / f64::from(interval_ms)
    }
}

/// Inverse of [`pump_speed_from_interval`], rounded to whole milliseconds
///
/// The speed is clamped to 0..=100 first; 0 stops the pump.
pub fn pump_interval_from_speed(speed: f64) -> u32 {
    let speed = if speed.is_finite() { speed.clamp(0.0, 100.0) } else { 0.0 };
    if speed <= 0.0 {
        return 0;
    }
    (PUMP_SPEED_FACTOR / speed).round().max(1.0) as u32
}

/// `(raw - 104) / 1024 * 100`, never below 0
pub fn pressure_percent(raw: u16) -> f64 {
    ((f64::from(raw) - PRESSURE_OFFSET) / ADC_FULL_SCALE * 100.0).max(0.0)
}

/// Linear 0-1024 to 0-100 scaling
pub fn pwm_percent(raw: u16) -> f64 {
    f64::from(raw) / ADC_FULL_SCALE * 100.0
}
