//! Data models for the peripheral controller and the operating mode

pub mod mode;
pub mod peripheral;
pub mod snapshot;

pub use mode::Mode;
pub use peripheral::{format_flag, keys, parse_flag, Peripheral, PeripheralStatus};
pub use snapshot::{
    pressure_percent, pump_interval_from_speed, pump_speed_from_interval, pwm_percent,
    StatusSnapshot,
};
