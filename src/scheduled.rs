use crate::activity::{Activity, Client};
use crate::error::{PrevisionError, Result};
use crate::period::{Period, earliest, latest};
use crate::task::Task;
use crate::timesheet::TimesheetRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Header of the activity a scheduled task belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(default)]
    pub closed: bool,
}

impl ActivityRef {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

impl From<&Activity> for ActivityRef {
    fn from(activity: &Activity) -> Self {
        Self {
            name: activity.name.clone(),
            flags: activity.flags.clone(),
            closed: activity.closed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub name: String,
}

impl From<&Client> for ClientRef {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
        }
    }
}

/// Runtime view of one flattened task during a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task: Task,
    pub activity: ActivityRef,
    pub client: ClientRef,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub progress: f64,
    /// Seconds already logged.
    #[serde(default)]
    pub work_time: i64,
    /// Seconds still to allocate. Only meaningful inside a build.
    #[serde(skip)]
    pub left_time: i64,
    #[serde(default)]
    pub underestimated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timesheets: Vec<TimesheetRow>,
}

impl ScheduledTask {
    pub fn new(task: Task, activity: &Activity, client: &Client) -> Self {
        Self {
            task,
            activity: activity.into(),
            client: client.into(),
            period: Period::default(),
            progress: 0.0,
            work_time: 0,
            left_time: 0,
            underestimated: false,
            timesheets: Vec::new(),
        }
    }

    /// Full dotted name of the task.
    pub fn name(&self) -> &str {
        &self.task.name
    }

    pub fn add_timesheet(&mut self, row: TimesheetRow) {
        self.timesheets.push(row);
    }

    /// True when the period end may be published.
    pub fn is_closed_for(&self, with_plan: bool) -> bool {
        self.task.completed || (with_plan && self.left_time == 0)
    }

    /// First day the allocation may book work on this task.
    pub fn fixed_start(&self) -> Option<NaiveDate> {
        self.task.period.start_period.or(self.period.start_period)
    }

    /// Recompute logged work and the period covered by the timesheets.
    pub fn elaborate_timesheets(&mut self, work_hours: u32, with_plan: bool) -> Result<()> {
        let mut work_time = 0;
        let mut first = None;
        let mut last = None;
        for row in &self.timesheets {
            work_time = row
                .seconds(work_hours)?
                .checked_add(work_time)
                .ok_or_else(|| PrevisionError::DurationOverflow(self.task.name.clone()))?;
            first = earliest(first, Some(row.date));
            last = latest(last, Some(row.date));
        }
        self.work_time = work_time;

        if let Some(first) = first {
            self.period.start_period = Some(first);
            if self.is_closed_for(with_plan) {
                self.period.end_period = last;
            }
        }
        Ok(())
    }
}

/// Ascending priority, ties broken by descending full name.
pub fn priority_order(a: &ScheduledTask, b: &ScheduledTask) -> Ordering {
    a.task
        .priority
        .cmp(&b.task.priority)
        .then_with(|| b.task.name.cmp(&a.task.name))
}

pub fn sort_by_priority(tasks: &mut [ScheduledTask]) {
    tasks.sort_by(priority_order);
}

/// Progress percentage rounded to two decimals.
pub fn progress_percent(work_time: i64, effort: i64) -> f64 {
    if effort <= 0 {
        return 0.0;
    }
    let ratio = work_time as f64 / effort as f64 * 100.0;
    // rounds the exact binary value, so 0.125 becomes 0.12
    format!("{ratio:.2}").parse().unwrap_or(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_to_two_decimals() {
        assert_eq!(progress_percent(1, 3), 33.33);
        assert_eq!(progress_percent(2, 3), 66.67);
        assert_eq!(progress_percent(3600, 28800), 12.5);
        // a tie on the exact value rounds to even
        assert_eq!(progress_percent(1, 800), 0.12);
    }

    #[test]
    fn logged_work_overflow_is_an_error() {
        let task = Task::new("T1", Some("1d"), &["user1"]);
        let mut st = ScheduledTask::new(task, &Activity::new("A"), &Client::new("C"));
        let date = NaiveDate::from_ymd_opt(2020, 9, 1).unwrap();
        st.add_timesheet(TimesheetRow::new("user1", date, "A.T1", "300000000000000d"));
        st.add_timesheet(TimesheetRow::new("user1", date, "A.T1", "300000000000000d"));
        assert!(matches!(
            st.elaborate_timesheets(8, false),
            Err(PrevisionError::DurationOverflow(name)) if name == "T1"
        ));
    }
}
