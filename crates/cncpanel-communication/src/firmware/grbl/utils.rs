//! GRBL Protocol Utilities
//!
//! Setting numbers used by the mode sequences, command formatting and
//! human-readable setting names for logging a `$$` dump.

/// `$10` status report options
pub const STATUS_REPORT: u16 = 10;
/// `$30` maximum spindle speed (laser power ceiling in laser mode)
pub const MAX_SPINDLE_SPEED: u16 = 30;
/// `$31` minimum spindle speed
pub const MIN_SPINDLE_SPEED: u16 = 31;
/// `$32` laser mode enable
pub const LASER_MODE: u16 = 32;
/// `$130` X maximum travel
pub const X_MAX_TRAVEL: u16 = 130;
/// `$131` Y maximum travel
pub const Y_MAX_TRAVEL: u16 = 131;

/// Settings dump request
pub const SETTINGS_COMMAND: &str = "$$";
/// Homing cycle request
pub const HOME_COMMAND: &str = "$H";
/// Bytes sent to wake the controller after opening the port
pub const WAKE_SEQUENCE: &[u8] = b"\r\n\r\n";

/// Format a setting write (`$<key>=<value>`)
pub fn format_setting(key: u16, value: &str) -> String {
    format!("${}={}", key, value)
}

/// Format the G54 origin offset command (`G10 L2 P1 X<x> Y<y>`)
pub fn format_work_origin(x: f64, y: f64) -> String {
    format!("G10 L2 P1 X{} Y{}", format_coordinate(x), format_coordinate(y))
}

/// Three decimals, with negative zero printed as zero
fn format_coordinate(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.3}", value)
}

/// Get setting name from setting number (GRBL 1.1)
pub fn get_setting_name(setting_num: u16) -> &'static str {
    match setting_num {
        0 => "Step pulse time",
        1 => "Step idle delay",
        2 => "Step pulse invert",
        3 => "Step direction invert",
        4 => "Invert step enable pin",
        5 => "Invert limit pins",
        6 => "Invert probe pin",
        10 => "Status report options",
        11 => "Junction deviation",
        12 => "Arc tolerance",
        13 => "Report in inches",
        20 => "Soft limits enable",
        21 => "Hard limits enable",
        22 => "Homing cycle enable",
        23 => "Homing direction invert",
        24 => "Homing locate feed rate",
        25 => "Homing search seek rate",
        26 => "Homing switch debounce delay",
        27 => "Homing switch pull-off distance",
        30 => "Maximum spindle speed",
        31 => "Minimum spindle speed",
        32 => "Laser mode enable",
        100 => "X steps/mm",
        101 => "Y steps/mm",
        102 => "Z steps/mm",
        110 => "X max rate",
        111 => "Y max rate",
        112 => "Z max rate",
        120 => "X acceleration",
        121 => "Y acceleration",
        122 => "Z acceleration",
        130 => "X max travel",
        131 => "Y max travel",
        132 => "Z max travel",
        _ => "Unknown setting",
    }
}
