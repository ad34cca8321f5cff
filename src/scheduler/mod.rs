//! Prevision builders.
//!
//! A build flattens the client tree into scheduled tasks, reconciles logged work,
//! allocates what is left against resource capacity and rolls dates up through the
//! task hierarchy and declared dependencies.

pub mod default;
pub mod filter;
pub mod recursive;
pub mod rollup;
pub mod simple;

pub use default::DefaultScheduler;
pub use recursive::{PacingStrategy, RecursiveTaskSeer};
pub use simple::SimpleScheduler;

use crate::activity::Client;
use crate::calendar::WorkCalendar;
use crate::config::PrevisionConfig;
use crate::error::{PrevisionError, Result};
use crate::resource::Resource;
use crate::resource_map::ResourceBook;
use crate::scenario::{Scenario, ScenarioSchedule};
use crate::scheduled::ScheduledTask;
use crate::timesheet::AgendaTimesheets;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SIMPLE_SCHEDULER: &str = "simple";

/// Filters and switches of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOpts {
    /// Only reconcile logged work, do not forecast.
    pub skip_plan: bool,
    pub only_closed: bool,
    /// Drop tasks that never started.
    pub skip_empty_tasks: bool,

    pub pre_clients: Vec<String>,
    pub pre_activities: Vec<String>,
    /// Regular expressions over activity names.
    pub pre_exclude_activities: Vec<String>,
    pub pre_exclude_task_flags: Vec<String>,
    pub pre_exclude_activity_flags: Vec<String>,

    pub post_clients: Vec<String>,
    pub post_activities: Vec<String>,
    /// Regular expressions over activity names.
    pub post_exclude_activities: Vec<String>,
    pub post_exclude_task_flags: Vec<String>,
    pub post_exclude_activity_flags: Vec<String>,
}

pub trait PrevisionScheduler {
    fn build_prevision(&mut self, opts: &SchedulerOpts) -> Result<ScenarioSchedule>;
    fn set_clients(&mut self, clients: Vec<Client>);
    fn set_resources(&mut self, resources: Vec<Resource>);
    fn set_timesheets(&mut self, timesheets: Vec<AgendaTimesheets>);
}

/// Pick the scheduler named by the scenario. No name selects the simple scheduler.
pub fn new_scheduler(
    config: PrevisionConfig,
    scenario: Scenario,
) -> Result<Box<dyn PrevisionScheduler>> {
    match scenario.scheduler.as_deref() {
        None | Some("") | Some(SIMPLE_SCHEDULER) => {
            Ok(Box::new(SimpleScheduler::new(config, scenario)))
        }
        Some(other) => Err(PrevisionError::UnknownScheduler(other.to_string())),
    }
}

/// Owned state of one build: the task arena, its name index and resource capacity.
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: PrevisionConfig,
    calendar: WorkCalendar,
    now: NaiveDate,
    pub schedule: Vec<ScheduledTask>,
    task_index: HashMap<String, usize>,
    pub resources: ResourceBook,
}

impl BuildContext {
    pub fn new(
        config: PrevisionConfig,
        calendar: WorkCalendar,
        now: NaiveDate,
        schedule: Vec<ScheduledTask>,
        resources: &[Resource],
    ) -> Self {
        let book = ResourceBook::new(resources, config.work_day_seconds());
        let mut ctx = Self {
            config,
            calendar,
            now,
            schedule,
            task_index: HashMap::new(),
            resources: book,
        };
        ctx.reindex();
        ctx
    }

    pub fn config(&self) -> &PrevisionConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn now(&self) -> NaiveDate {
        self.now
    }

    pub fn work_hours(&self) -> u32 {
        self.config.work_hours()
    }

    pub fn resources_map(&self) -> &ResourceBook {
        &self.resources
    }

    pub fn task_map(&self) -> &HashMap<String, usize> {
        &self.task_index
    }

    /// Rebuild the name index after the arena changed shape.
    pub fn reindex(&mut self) {
        self.task_index = self
            .schedule
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.name().to_string(), idx))
            .collect();
    }

    pub fn index_of(&self, full_name: &str) -> Option<usize> {
        self.task_index.get(full_name).copied()
    }

    pub fn task(&self, full_name: &str) -> Result<&ScheduledTask> {
        self.index_of(full_name)
            .map(|idx| &self.schedule[idx])
            .ok_or_else(|| PrevisionError::TaskNotFound(full_name.to_string()))
    }

    pub fn task_mut(&mut self, full_name: &str) -> Result<&mut ScheduledTask> {
        match self.index_of(full_name) {
            Some(idx) => Ok(&mut self.schedule[idx]),
            None => Err(PrevisionError::TaskNotFound(full_name.to_string())),
        }
    }

    /// Fresh capacity for every resource.
    pub fn reset_resources(&mut self, resources: &[Resource]) {
        self.resources = ResourceBook::new(resources, self.config.work_day_seconds());
    }

    pub fn into_schedule(self) -> Vec<ScheduledTask> {
        self.schedule
    }
}
