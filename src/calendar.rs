use crate::error::{PrevisionError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Anything after the first blank (a time of day) is ignored.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let day = value.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|source| PrevisionError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Unix seconds of the date at midnight UTC.
pub fn unix_seconds(date: NaiveDate) -> i64 {
    NaiveDateTime::from(date).and_utc().timestamp()
}

/// Work-day arithmetic over a configurable week and holiday list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    #[serde(default = "WorkCalendarConfig::default_working_days")]
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(PrevisionError::InvalidCalendar(
                "at least one working day is required".into(),
            ));
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Set custom working days (e.g. Mon-Sat for 6-day weeks)
    pub fn set_working_days(&mut self, days: &[Weekday]) {
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// The given date when it is a work day, the next work day otherwise.
    pub fn work_day_on_or_after(&self, date: NaiveDate) -> NaiveDate {
        if self.is_work_day(date) {
            date
        } else {
            self.next_work_day(date)
        }
    }

    /// First work day strictly after `from`.
    pub fn next_work_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_work_day(current) {
            current += Duration::days(1);
        }
        current
    }

    /// First work day of the ISO week following the one containing `from`.
    pub fn next_week_first_work_day(&self, from: NaiveDate) -> NaiveDate {
        let days_to_monday = 7 - i64::from(from.weekday().num_days_from_monday());
        self.work_day_on_or_after(from + Duration::days(days_to_monday))
    }

    /// First work day of the calendar month following the one containing `from`.
    pub fn next_month_first_work_day(&self, from: NaiveDate) -> NaiveDate {
        let (year, month) = if from.month() == 12 {
            (from.year() + 1, 1)
        } else {
            (from.year(), from.month() + 1)
        };
        let first = from
            .with_day(1)
            .and_then(|d| d.with_year(year))
            .and_then(|d| d.with_month(month))
            .unwrap_or(from);
        self.work_day_on_or_after(first)
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            working_days: working,
            holidays,
        }
    }

    fn default_working_days() -> Vec<Weekday> {
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ]
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        Self::new(Self::default_working_days(), Vec::new())
    }
}
