//! GRBL motion controller support

pub mod motion_link;
pub mod response_parser;
pub mod utils;

pub use motion_link::{MotionLink, GRBL_ACK};
pub use response_parser::{parse_line, parse_setting_line, parse_settings, GrblResponse};
