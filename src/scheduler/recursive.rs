//! Recurring tasks.
//!
//! Every occurrence books a fixed quota of time. The pacing decides where the next
//! occurrence starts; the driver loop is the same for every mode. An occurrence that
//! runs out of capacity continues on the next work day, but must finish before the
//! next occurrence would start.

use crate::calendar::WorkCalendar;
use crate::duration::parse_duration;
use crate::error::{PrevisionError, Result};
use crate::resource_map::ResourceBook;
use crate::scheduled::ScheduledTask;
use crate::task::RecursiveMode;
use chrono::NaiveDate;
use tracing::debug;

pub trait PacingStrategy: Send + Sync {
    fn mode(&self) -> RecursiveMode;

    /// Start of the occurrence following the one that contains `date`.
    fn next_pacing_day(&self, calendar: &WorkCalendar, date: NaiveDate) -> NaiveDate;
}

pub struct DailyPacing;
pub struct WeeklyPacing;
pub struct MonthlyPacing;

impl PacingStrategy for DailyPacing {
    fn mode(&self) -> RecursiveMode {
        RecursiveMode::Daily
    }

    fn next_pacing_day(&self, calendar: &WorkCalendar, date: NaiveDate) -> NaiveDate {
        calendar.next_work_day(date)
    }
}

impl PacingStrategy for WeeklyPacing {
    fn mode(&self) -> RecursiveMode {
        RecursiveMode::Weekly
    }

    fn next_pacing_day(&self, calendar: &WorkCalendar, date: NaiveDate) -> NaiveDate {
        calendar.next_week_first_work_day(date)
    }
}

impl PacingStrategy for MonthlyPacing {
    fn mode(&self) -> RecursiveMode {
        RecursiveMode::Monthly
    }

    fn next_pacing_day(&self, calendar: &WorkCalendar, date: NaiveDate) -> NaiveDate {
        calendar.next_month_first_work_day(date)
    }
}

pub fn pacing_for(mode: RecursiveMode) -> &'static dyn PacingStrategy {
    match mode {
        RecursiveMode::Daily => &DailyPacing,
        RecursiveMode::Weekly => &WeeklyPacing,
        RecursiveMode::Monthly => &MonthlyPacing,
    }
}

pub struct RecursiveTaskSeer<'a> {
    pacing: &'a dyn PacingStrategy,
    calendar: &'a WorkCalendar,
    work_hours: u32,
}

impl<'a> RecursiveTaskSeer<'a> {
    pub fn new(
        pacing: &'a dyn PacingStrategy,
        calendar: &'a WorkCalendar,
        work_hours: u32,
    ) -> Self {
        Self {
            pacing,
            calendar,
            work_hours,
        }
    }

    pub fn for_mode(mode: RecursiveMode, calendar: &'a WorkCalendar, work_hours: u32) -> Self {
        Self::new(pacing_for(mode), calendar, work_hours)
    }

    /// Generate the occurrences of `st` from `now` up to the task's end period,
    /// appending one row per booking to the task's timesheets.
    pub fn do_prevision(
        &self,
        st: &mut ScheduledTask,
        book: &mut ResourceBook,
        now: NaiveDate,
    ) -> Result<()> {
        let name = st.task.name.clone();
        let invalid = |reason: &str| PrevisionError::InvalidRecursiveTask {
            task: name.clone(),
            reason: reason.to_string(),
        };

        let duration = st
            .task
            .recursive
            .duration
            .clone()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| invalid("without duration"))?;
        let end = st
            .task
            .period
            .end_period
            .ok_or_else(|| invalid("without end period"))?;
        let quota = parse_duration(&duration, self.work_hours)?;
        if quota <= 0 {
            return Err(invalid("duration must be positive"));
        }
        let resources = st.task.allocated_resources.clone();
        if resources.is_empty() {
            return Err(PrevisionError::NoResources(name));
        }

        let mut day = self.calendar.work_day_on_or_after(now);
        while day <= end {
            if st.task.recursive.is_excluded(day) {
                debug!(%day, task = %name, "date excluded");
                day = self.pacing.next_pacing_day(self.calendar, day);
                continue;
            }

            let occurrence = day;
            let next_occurrence = self.pacing.next_pacing_day(self.calendar, occurrence);
            let mut left = quota;
            loop {
                book.allocate(&name, &resources, day, &mut left, &mut st.timesheets)?;
                if left == 0 {
                    break;
                }
                let candidate = self.calendar.next_work_day(day);
                if candidate >= next_occurrence {
                    return Err(PrevisionError::InsufficientResources {
                        task: name,
                        mode: self.pacing.mode().as_str(),
                        date: occurrence,
                    });
                }
                day = candidate;
            }
            debug!(%occurrence, task = %name, "occurrence booked");
            day = self.pacing.next_pacing_day(self.calendar, day);
        }
        Ok(())
    }
}
