//! Human-readable durations such as `500ms`, `30s` or `1m`.

use crate::error::{Error, Result};
use std::time::Duration;

/// Parse a duration string like "500ms", "30s", "1m", or a bare number of seconds.
///
/// Returns `None` if the string cannot be parsed.
///
/// ```
/// use dbkeeper::config::parse_duration_string;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration_string("2s"), Some(Duration::from_secs(2)));
/// assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
/// assert_eq!(parse_duration_string("1m"), Some(Duration::from_secs(60)));
/// assert_eq!(parse_duration_string("45"), Some(Duration::from_secs(45)));
/// ```
pub fn parse_duration_string(s: &str) -> Option<Duration> {
    let s = s.trim();

    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Parse the duration stored under `key`, naming the key on failure.
pub fn parse_duration_value(key: &str, value: &str) -> Result<Duration> {
    parse_duration_string(value).ok_or_else(|| Error::InvalidConfig {
        key: key.to_string(),
        reason: format!("'{}' is not a duration", value),
    })
}
