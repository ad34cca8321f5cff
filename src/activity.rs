use crate::error::{PrevisionError, Result};
use crate::task::{NAME_SEPARATOR, Task};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<Activity>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_activity(&mut self, activity: Activity) {
        self.activities.push(activity);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default)]
    pub priority: i32,
    /// A closed activity marks every one of its tasks completed.
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            note: String::new(),
            priority: 100,
            closed: false,
            labels: BTreeMap::new(),
            flags: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn planned_effort_seconds(&self, work_hours: u32) -> Result<i64> {
        self.tasks.iter().try_fold(0_i64, |total, t| {
            t.planned_effort_seconds(work_hours)?
                .checked_add(total)
                .ok_or_else(|| PrevisionError::DurationOverflow(self.name.clone()))
        })
    }

    /// Every task and subtask, named `ACTIVITY.TASK[.SUB...]`.
    pub fn all_tasks(&self) -> Vec<Task> {
        let mut out: Vec<Task> = self
            .tasks
            .iter()
            .flat_map(|t| t.flatten(Some(&self.name), &[]))
            .collect();
        if self.closed {
            out.iter_mut().for_each(|t| t.completed = true);
        }
        out
    }

    pub fn find_task_by_full_name(&self, full_name: &str) -> Result<&Task> {
        let not_found = || PrevisionError::TaskNotFound(full_name.to_string());
        let (prefix, rest) = full_name.split_once(NAME_SEPARATOR).ok_or_else(not_found)?;
        if prefix != self.name {
            return Err(not_found());
        }
        let head = rest.split(NAME_SEPARATOR).next().unwrap_or(rest);
        self.tasks
            .iter()
            .find(|t| t.name == head)
            .ok_or_else(not_found)?
            .find_by_full_name(rest)
    }

    pub fn validate(&self) -> Result<()> {
        self.tasks.iter().try_for_each(Task::validate)
    }
}
