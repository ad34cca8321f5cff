use crate::scheduled::ScheduledTask;
use crate::timesheet::AgendaTimesheets;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Priority override applied to one task by full name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTask {
    pub name: String,
    pub priority: i32,
    /// Replaces the task's allocated resources when not empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_resources: Vec<String>,
}

/// Priority override applied to every task of an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioActivity {
    pub name: String,
    pub priority: i32,
}

/// Parameters of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Reference day of the forecast. Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_priorities: Vec<ScenarioTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_priorities: Vec<ScenarioActivity>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_now(mut self, now: NaiveDate) -> Self {
        self.now = Some(now);
        self
    }

    pub fn now_or_today(&self) -> NaiveDate {
        self.now.unwrap_or_else(|| {
            let today = Utc::now().date_naive();
            debug!(scenario = %self.name, %today, "scenario without now, using today");
            today
        })
    }

    pub fn task_override(&self, full_name: &str) -> Option<&ScenarioTask> {
        self.task_priorities.iter().find(|t| t.name == full_name)
    }

    pub fn activity_override(&self, activity: &str) -> Option<&ScenarioActivity> {
        self.activity_priorities.iter().find(|a| a.name == activity)
    }
}

/// Result of a build: the scenario and its ordered scheduled tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSchedule {
    pub scenario: Scenario,
    #[serde(default)]
    pub schedule: Vec<ScheduledTask>,
}

impl ScenarioSchedule {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            schedule: Vec::new(),
        }
    }

    pub fn task(&self, full_name: &str) -> Option<&ScheduledTask> {
        self.schedule.iter().find(|t| t.name() == full_name)
    }

    /// Every timesheet row of the schedule in one agenda, e.g. to store a baseline.
    pub fn all_resource_timesheets(&self) -> AgendaTimesheets {
        let mut agenda =
            AgendaTimesheets::new(format!("Agenda from scenario {}", self.scenario.name));
        for task in &self.schedule {
            agenda.timesheets.extend(task.timesheets.iter().cloned());
        }
        agenda
    }
}
