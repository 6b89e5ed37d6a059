//! Mode configuration sequences
//!
//! Before a companion takes over the motion controller, GRBL is switched
//! between laser and spindle behaviour, homed and given the work origin the
//! companion expects.

use cncpanel_communication::firmware::grbl::utils::{
    LASER_MODE, MAX_SPINDLE_SPEED, MIN_SPINDLE_SPEED, STATUS_REPORT,
};
use cncpanel_communication::MotionLink;
use cncpanel_core::Result;
use std::fmt;

/// Laser power ceiling written to `$30` in laser mode (S0-S1000)
pub const LASER_MAX_POWER: u32 = 1000;

/// One step of a configuration sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `$<key>=<value>`
    Setting(u16, String),
    /// Homing cycle
    Home,
    /// G54 offset from machine home
    WorkOrigin {
        /// X offset in mm
        x: f64,
        /// Y offset in mm
        y: f64,
    },
}

impl Step {
    /// Execute the step on the motion link
    pub fn run(&self, motion: &mut MotionLink) -> Result<()> {
        match self {
            Step::Setting(key, value) => motion.write_setting(*key, value),
            Step::Home => motion.home(),
            Step::WorkOrigin { x, y } => motion.set_work_origin(*x, *y),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Setting(key, value) => write!(f, "${}={}", key, value),
            Step::Home => write!(f, "home"),
            Step::WorkOrigin { x, y } => write!(f, "work origin ({:.3}, {:.3})", x, y),
        }
    }
}

/// Laser mode: no status report, laser mode on, S0-S1000, origin at the far corner
pub fn laser_sequence(x_travel: f64, y_travel: f64) -> Vec<Step> {
    vec![
        Step::Setting(STATUS_REPORT, "0".to_string()),
        Step::Setting(LASER_MODE, "1".to_string()),
        Step::Setting(MIN_SPINDLE_SPEED, "0".to_string()),
        Step::Setting(MAX_SPINDLE_SPEED, LASER_MAX_POWER.to_string()),
        Step::Home,
        Step::WorkOrigin {
            x: -x_travel,
            y: -y_travel,
        },
    ]
}

/// Router mode: full status report, laser mode off, spindle rpm range, origin at home
pub fn router_sequence(spindle_max_rpm: u32) -> Vec<Step> {
    vec![
        Step::Setting(STATUS_REPORT, "255".to_string()),
        Step::Setting(LASER_MODE, "0".to_string()),
        Step::Setting(MIN_SPINDLE_SPEED, "0".to_string()),
        Step::Setting(MAX_SPINDLE_SPEED, spindle_max_rpm.to_string()),
        Step::Home,
        Step::WorkOrigin { x: 0.0, y: 0.0 },
    ]
}
