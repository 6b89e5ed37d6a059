//! Presentation boundary
//!
//! A presentation observes the controller through capability traits: it
//! returns the views it actually has and the controller pushes values only
//! through those. User actions travel the other way as [`UserIntent`]s.

use crate::data::{Mode, Peripheral, PeripheralStatus};

/// Operator actions relayed to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserIntent {
    /// Flip a switchable peripheral
    Toggle(Peripheral),
    /// Ask the peripheral controller to apply a mode
    SetMode(Mode),
    /// Set the pump speed in percent
    SetPumpSpeed(f64),
}

/// On/off indicators for the switchable peripherals and sensors
pub trait PeripheralView {
    /// Show the switch and sensor states of the retained status
    fn show_switches(&mut self, status: &PeripheralStatus);
}

/// Analog gauges
pub trait GaugeView {
    fn show_pump_speed(&mut self, speed: f64);
    fn show_pressure(&mut self, percent: f64);
    fn show_pwm(&mut self, percent: f64);
}

/// Mode indicator
pub trait ModeView {
    fn show_mode(&mut self, mode: Mode);
}

/// What the control loop needs from a presentation layer
pub trait Presentation {
    /// False once the operator closed the presentation
    fn is_open(&self) -> bool;

    /// Intents queued since the last call
    fn take_intents(&mut self) -> Vec<UserIntent>;

    /// Switch indicators, if this presentation has them
    fn toggles(&mut self) -> Option<&mut dyn PeripheralView> {
        None
    }

    /// Gauges, if this presentation has them
    fn gauges(&mut self) -> Option<&mut dyn GaugeView> {
        None
    }

    /// Mode indicator, if this presentation has one
    fn mode_view(&mut self) -> Option<&mut dyn ModeView> {
        None
    }
}
