//! # CNC Panel Machine
//!
//! Machine-level orchestration: the [`MachineController`] that owns both
//! device links, the GRBL mode configuration sequences, the companion
//! [`ProcessSupervisor`] and the session loop.

pub mod controller;
pub mod sequence;
pub mod session;
pub mod supervisor;

pub use controller::MachineController;
pub use sequence::{laser_sequence, router_sequence, Step, LASER_MAX_POWER};
pub use session::{run, ExitReason};
pub use supervisor::{
    image_matches, CompanionHandle, ProcessHost, ProcessSupervisor, RunningProcess,
    SystemProcessHost,
};
