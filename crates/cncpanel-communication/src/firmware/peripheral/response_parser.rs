//! Peripheral status report parser
//!
//! A status report is a sequence of `<key>=<value>` lines. The key is
//! everything before the first `=`; lines without one are ignored.

use std::collections::BTreeMap;

/// Status request line
pub const STATUS_COMMAND: &str = "status";

/// Parse a single `key=value` line
pub fn parse_status_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Parse a whole status report into a fresh map
pub fn parse_status(text: &str) -> BTreeMap<String, String> {
    let mut status = BTreeMap::new();
    for line in text.lines() {
        match parse_status_line(line) {
            Some((key, value)) => {
                status.insert(key, value);
            }
            None if !line.trim().is_empty() => {
                tracing::warn!("Ignoring malformed status line {:?}", line);
            }
            None => {}
        }
    }
    status
}

/// Format a write request (`key=value`)
pub fn format_write(key: &str, value: &str) -> String {
    format!("{}={}", key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        assert_eq!(
            parse_status_line("air=1\r"),
            Some(("air".to_string(), "1".to_string()))
        );
        assert_eq!(
            parse_status_line("note=a=b"),
            Some(("note".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_status_line("=1"), None);
        assert_eq!(parse_status_line("ready"), None);
    }

    #[test]
    fn test_parse_status_report() {
        let status = parse_status("air=1\r\nvacuum=0\r\n");
        assert_eq!(status.len(), 2);
        assert_eq!(status["air"], "1");
        assert_eq!(status["vacuum"], "0");
    }

    #[test]
    fn test_parse_status_skips_garbage() {
        let status = parse_status("booting...\r\n\r\npressure=512\r\n");
        assert_eq!(status.len(), 1);
        assert_eq!(status["pressure"], "512");
    }
}
