//! # CNC Panel Communication
//!
//! Serial links and the two device protocols spoken on them:
//! the GRBL motion controller and the auxiliary peripheral controller.

pub mod communication;
pub mod firmware;

pub use communication::{
    list_ports, normalize_response, ConnectionParams, LinkTiming, RealSerialPort, Responder,
    SerialLink, SerialPortInfo, VirtualPort,
};

pub use firmware::grbl::MotionLink;
pub use firmware::peripheral::PeripheralLink;
