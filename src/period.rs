use crate::calendar::unix_seconds;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date range. Either bound may be unset; an unset end means open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<NaiveDate>,
}

impl Period {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start_period: start,
            end_period: end,
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn starting(start: NaiveDate) -> Self {
        Self::new(Some(start), None)
    }

    /// Unix seconds of the start, 0 when unset.
    pub fn start_time(&self) -> i64 {
        self.start_period.map(unix_seconds).unwrap_or(0)
    }

    /// Unix seconds of the end, 0 when unset.
    pub fn end_time(&self) -> i64 {
        self.end_period.map(unix_seconds).unwrap_or(0)
    }

    pub fn is_unset(&self) -> bool {
        self.start_period.is_none() && self.end_period.is_none()
    }

    /// Inclusive containment. A period without a start contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.start_period {
            Some(start) if date >= start => self.end_period.is_none_or(|end| date <= end),
            _ => false,
        }
    }

    /// Widen this period so it covers `other`. Unset bounds on either side are ignored.
    pub fn widen(&mut self, other: &Period) {
        self.start_period = earliest(self.start_period, other.start_period);
        self.end_period = latest(self.end_period, other.end_period);
    }
}

/// Minimum of two optional dates, ignoring unset ones.
pub fn earliest(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Maximum of two optional dates, ignoring unset ones.
pub fn latest(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn unset_bounds_are_ignored_when_widening() {
        let mut period = Period::default();
        period.widen(&Period::between(d(2020, 9, 7), d(2020, 9, 10)));
        period.widen(&Period::starting(d(2020, 9, 1)));
        assert_eq!(period, Period::between(d(2020, 9, 1), d(2020, 9, 10)));
        assert_eq!(Period::default().start_time(), 0);
        assert_eq!(period.start_time(), 1_598_918_400);
        assert_eq!(period.end_time(), 1_599_696_000);
        assert_eq!(Period::starting(d(2020, 9, 1)).end_time(), 0);
    }

    #[test]
    fn containment_is_inclusive_and_open_ended() {
        let window = Period::between(d(2020, 1, 1), d(2020, 1, 3));
        assert!(window.contains(d(2020, 1, 1)));
        assert!(window.contains(d(2020, 1, 3)));
        assert!(!window.contains(d(2020, 1, 4)));
        assert!(Period::starting(d(2020, 3, 1)).contains(d(2099, 1, 1)));
        assert!(!Period::default().contains(d(2020, 1, 1)));
    }
}
