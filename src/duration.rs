//! Effort and timesheet durations.
//!
//! Two encodings are accepted: work days (`3d`, `0.5d`), scaled by the configured
//! work hours, and composite clock durations (`8h`, `30m`, `2h30m`, `86400s`).

use crate::error::{PrevisionError, Result};
use regex::Regex;
use std::sync::LazyLock;

static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]*\.?[0-9]+)d$").unwrap_or_else(|err| unreachable!("days regex: {err}"))
});

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9]*\.?[0-9]+)h)?(?:([0-9]*\.?[0-9]+)m)?(?:([0-9]*\.?[0-9]+)s)?$")
        .unwrap_or_else(|err| unreachable!("clock regex: {err}"))
});

const SECONDS_PER_HOUR: i64 = 3600;

pub fn day_seconds(work_hours: u32) -> i64 {
    i64::from(work_hours) * SECONDS_PER_HOUR
}

/// Seconds in `amount` units of `scale` seconds. The fraction is applied in integer
/// arithmetic and truncated to the second; `None` on overflow.
fn scaled_seconds(amount: &str, scale: i64) -> Option<i64> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut seconds = whole.checked_mul(scale)?;

    // ASCII digits only; 18 of them keep the numerator well inside i128
    let fraction = &fraction[..fraction.len().min(18)];
    if !fraction.is_empty() {
        let numerator: i128 = fraction.parse().ok()?;
        let denominator = 10_i128.pow(fraction.len() as u32);
        let part = i64::try_from(numerator * i128::from(scale) / denominator).ok()?;
        seconds = seconds.checked_add(part)?;
    }
    Some(seconds)
}

/// Parse a duration string into seconds.
pub fn parse_duration(value: &str, work_hours: u32) -> Result<i64> {
    let trimmed = value.trim();
    let invalid = || PrevisionError::InvalidDuration(value.to_string());

    if let Some(caps) = DAYS_RE.captures(trimmed) {
        return scaled_seconds(&caps[1], day_seconds(work_hours)).ok_or_else(invalid);
    }

    let caps = CLOCK_RE.captures(trimmed).ok_or_else(invalid)?;
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    for (idx, scale) in [(1, SECONDS_PER_HOUR), (2, 60), (3, 1)] {
        if let Some(m) = caps.get(idx) {
            total = scaled_seconds(m.as_str(), scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(invalid)?;
        }
    }
    Ok(total)
}

/// Format seconds as a composite `XhYmZs` string, dropping zero components.
pub fn seconds_to_duration(seconds: i64) -> Result<String> {
    if seconds <= 0 {
        return Err(PrevisionError::NonPositiveSeconds(seconds));
    }

    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / 60;
    let secs = seconds % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if secs > 0 {
        out.push_str(&format!("{secs}s"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_days_truncate_to_seconds() {
        assert_eq!(parse_duration("0.25d", 7).unwrap(), 6300);
        assert_eq!(parse_duration(".5d", 8).unwrap(), 4 * 3600);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("", 8).is_err());
        assert!(parse_duration("abc", 8).is_err());
        assert!(parse_duration("3w", 8).is_err());
        assert!(parse_duration("h", 8).is_err());
    }
}
