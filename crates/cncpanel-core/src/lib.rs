//! # CNC Panel Core
//!
//! Core types shared by every CNC Panel crate: the error hierarchy, the
//! operating mode, the typed peripheral status with its derived values and
//! the presentation capability traits.

pub mod data;
pub mod error;
pub mod presentation;

pub use data::{Mode, Peripheral, PeripheralStatus, StatusSnapshot};

pub use error::{ConnectionError, ControllerError, Error, FirmwareError, ProcessError, Result};

pub use presentation::{GaugeView, ModeView, PeripheralView, Presentation, UserIntent};
