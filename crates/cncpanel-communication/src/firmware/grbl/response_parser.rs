//! GRBL Response Parser
//!
//! Classifies the lines a GRBL controller sends back and extracts the
//! `$n=value` lines of a `$$` settings dump.

use std::collections::BTreeMap;
use std::fmt;

/// GRBL response types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrblResponse {
    /// OK acknowledgment
    Ok,
    /// Error response with error code
    Error(u8),
    /// Alarm response with alarm code
    Alarm(u8),
    /// Setting response ($n=value)
    Setting { number: u16, value: String },
    /// Startup banner
    Version(String),
    /// Anything else (echoes, feedback messages)
    Message(String),
}

impl fmt::Display for GrblResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error(code) => write!(f, "error {}", code),
            Self::Alarm(code) => write!(f, "alarm {} ({})", code, alarm_description(*code)),
            Self::Setting { number, value } => write!(f, "${}={}", number, value),
            Self::Version(version) => write!(f, "{}", version),
            Self::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Parse one response line; blank lines yield `None`
pub fn parse_line(line: &str) -> Option<GrblResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line == "ok" {
        return Some(GrblResponse::Ok);
    }

    if let Some(code) = strip_prefix_ignore_case(line, "error:") {
        if let Ok(code) = code.trim().parse::<u8>() {
            return Some(GrblResponse::Error(code));
        }
    }

    if let Some(code) = strip_prefix_ignore_case(line, "alarm:") {
        if let Ok(code) = code.trim().parse::<u8>() {
            return Some(GrblResponse::Alarm(code));
        }
    }

    if let Some((number, value)) = parse_setting_line(line) {
        return Some(GrblResponse::Setting { number, value });
    }

    if line.starts_with("Grbl ") {
        return Some(GrblResponse::Version(line.to_string()));
    }

    Some(GrblResponse::Message(line.to_string()))
}

/// Parse a `$<digits>=<rest>` line into its number and value
pub fn parse_setting_line(line: &str) -> Option<(u16, String)> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix('$')?;
    let (number, value) = rest.split_once('=')?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((number.parse().ok()?, value.to_string()))
}

/// Extract every setting from a `$$` dump; other lines are skipped
pub fn parse_settings(text: &str) -> BTreeMap<u16, String> {
    text.lines().filter_map(parse_setting_line).collect()
}

/// Describe the rejections (errors and alarms) contained in a response
pub fn rejections(text: &str) -> Vec<GrblResponse> {
    text.lines()
        .filter_map(parse_line)
        .filter(|r| matches!(r, GrblResponse::Error(_) | GrblResponse::Alarm(_)))
        .collect()
}

/// Short meaning of a GRBL 1.1 alarm code
pub fn alarm_description(code: u8) -> &'static str {
    match code {
        1 => "hard limit triggered",
        2 => "motion target exceeds machine travel",
        3 => "reset while in motion",
        4 => "probe not in expected initial state",
        5 => "probe did not contact the workpiece",
        6 => "homing reset",
        7 => "safety door opened during homing",
        8 => "homing failed to clear limit switch",
        9 => "homing could not find limit switch",
        _ => "unknown alarm",
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}
