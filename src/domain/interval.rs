use std::time::Duration;

use regex::Regex;

const INTERVAL_PATTERN: &str = r"^(?:(?P<days>\d+)d)?(?:(?P<hours>\d+)h)?(?:(?P<minutes>\d+)m)?(?:(?P<seconds>\d+)s)?$";

const UNITS: [(&str, u64); 4] = [
    ("days", 24 * 60 * 60),
    ("hours", 60 * 60),
    ("minutes", 60),
    ("seconds", 1),
];

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IntervalError {
    #[error("invalid time interval '{0}', expected a value like 1d2h30m or 45s")]
    Format(String),
    #[error("time interval '{0}' is too large")]
    Overflow(String),
}

/// Parses a `NdNhNmNs` interval. Every component is optional but at least one
/// must be present, and they must appear in that order.
pub fn parse_interval(value: &str) -> Result<Duration, IntervalError> {
    let re = Regex::new(INTERVAL_PATTERN).unwrap();
    let captures = re
        .captures(value)
        .ok_or_else(|| IntervalError::Format(value.to_string()))?;

    let mut total_secs: u64 = 0;
    let mut any_component = false;

    for (name, unit_secs) in UNITS {
        let Some(component) = captures.name(name) else {
            continue;
        };
        any_component = true;

        let secs = component
            .as_str()
            .parse::<u64>()
            .ok()
            .and_then(|count| count.checked_mul(unit_secs))
            .and_then(|secs| secs.checked_add(total_secs))
            .ok_or_else(|| IntervalError::Overflow(value.to_string()))?;
        total_secs = secs;
    }

    if !any_component {
        return Err(IntervalError::Format(value.to_string()));
    }

    Ok(Duration::from_secs(total_secs))
}

/// Renders a duration back into the `NdNhNmNs` form, dropping zero components.
pub fn format_interval(interval: Duration) -> String {
    let mut remaining = interval.as_secs();
    let mut formatted = String::new();

    for ((_, unit_secs), suffix) in UNITS.iter().zip(["d", "h", "m", "s"]) {
        let count = remaining / unit_secs;
        remaining %= unit_secs;
        if count > 0 {
            formatted.push_str(&format!("{}{}", count, suffix));
        }
    }

    match formatted.is_empty() {
        true => "0s".to_string(),
        false => formatted,
    }
}
