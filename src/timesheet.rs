use crate::calendar::format_date;
use crate::duration::{parse_duration, seconds_to_duration};
use crate::error::Result;
use crate::task::NAME_SEPARATOR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Work of one resource on one task for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetRow {
    pub user: String,
    pub date: NaiveDate,
    /// Full name of the task.
    pub task: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TimesheetRow {
    pub fn new(
        user: impl Into<String>,
        date: NaiveDate,
        task: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            date,
            task: task.into(),
            duration: duration.into(),
            note: None,
        }
    }

    /// Row produced by the allocation, duration encoded as raw seconds.
    pub fn allocated(user: &str, date: NaiveDate, task: &str, seconds: i64) -> Self {
        Self::new(user, date, task, format!("{seconds}s"))
    }

    pub fn seconds(&self, work_hours: u32) -> Result<i64> {
        parse_duration(&self.duration, work_hours)
    }

    /// `YYYY-MM` of the row date.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn activity_name(&self) -> &str {
        self.task
            .split(NAME_SEPARATOR)
            .next()
            .unwrap_or(self.task.as_str())
    }

    pub fn group_key(&self, grouping: &TimesheetGrouping) -> String {
        let mut parts: Vec<String> = Vec::new();
        if grouping.by_user {
            parts.push(self.user.clone());
        }
        if grouping.by_activity {
            parts.push(self.activity_name().to_string());
        } else if grouping.by_task {
            parts.push(self.task.clone());
        }
        if !grouping.ignore_time {
            if grouping.monthly {
                parts.push(self.month_key());
            } else {
                parts.push(format_date(self.date));
            }
        }
        parts.join("-")
    }
}

/// Logged work of one agenda (usually one person or one import).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaTimesheets {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub timesheets: Vec<TimesheetRow>,
}

impl AgendaTimesheets {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timesheets: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: TimesheetRow) {
        self.timesheets.push(row);
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.timesheets.iter().map(|row| row.date).max()
    }
}

/// Which row fields split timesheets into separate aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetGrouping {
    #[serde(default)]
    pub by_user: bool,
    #[serde(default)]
    pub by_activity: bool,
    #[serde(default)]
    pub by_task: bool,
    #[serde(default)]
    pub monthly: bool,
    #[serde(default)]
    pub ignore_time: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTimesheet {
    pub key: String,
    /// First date that contributed to the aggregate.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    pub seconds: i64,
    pub duration: String,
}

impl AggregatedTimesheet {
    fn start(key: String, row: &TimesheetRow, grouping: &TimesheetGrouping) -> Self {
        Self {
            key,
            date: row.date,
            user: grouping.by_user.then(|| row.user.clone()),
            task: if grouping.by_activity {
                Some(row.activity_name().to_string())
            } else {
                grouping.by_task.then(|| row.task.clone())
            },
            seconds: 0,
            duration: String::new(),
        }
    }
}

/// Sum rows by group key. Aggregates come back ordered by key.
pub fn aggregate_timesheets<'a, I>(
    rows: I,
    grouping: &TimesheetGrouping,
    work_hours: u32,
) -> Result<Vec<AggregatedTimesheet>>
where
    I: IntoIterator<Item = &'a TimesheetRow>,
{
    let mut groups: BTreeMap<String, AggregatedTimesheet> = BTreeMap::new();
    for row in rows {
        let key = row.group_key(grouping);
        let seconds = row.seconds(work_hours)?;
        let entry = groups
            .entry(key.clone())
            .or_insert_with(|| AggregatedTimesheet::start(key, row, grouping));
        entry.date = entry.date.min(row.date);
        entry.seconds += seconds;
    }

    groups
        .into_values()
        .map(|mut agg| {
            agg.duration = seconds_to_duration(agg.seconds)?;
            Ok(agg)
        })
        .collect()
}
