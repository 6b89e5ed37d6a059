//! Auxiliary peripheral controller support

pub mod peripheral_link;
pub mod response_parser;

pub use peripheral_link::{PeripheralLink, PERIPHERAL_ACK};
pub use response_parser::{format_write, parse_status, parse_status_line, STATUS_COMMAND};
