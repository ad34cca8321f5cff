//! Authored task tree.
//!
//! Tasks nest through `subtasks`; after flattening every node becomes its own
//! record named by the dot-joined path of its ancestors (`ACTIVITY.TASK.SUB`).

use crate::duration::parse_duration;
use crate::error::{PrevisionError, Result};
use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const NAME_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecursiveMode {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl RecursiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecursiveMode::Daily => "daily",
            RecursiveMode::Weekly => "weekly",
            RecursiveMode::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecursiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveOptions {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub mode: RecursiveMode,
    /// Time consumed by every occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Windows in which no occurrence is generated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Period>,
}

impl RecursiveOptions {
    pub fn new(mode: RecursiveMode, duration: impl Into<String>) -> Self {
        Self {
            enable: true,
            mode,
            duration: Some(duration.into()),
            exclude: Vec::new(),
        }
    }

    pub fn is_excluded(&self, date: chrono::NaiveDate) -> bool {
        self.exclude.iter().any(|window| window.contains(date))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default)]
    pub priority: i32,
    /// Authored on leaves only; containers derive their effort from subtasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, rename = "resources", skip_serializing_if = "Vec::is_empty")]
    pub allocated_resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, rename = "subtasks", skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Period::is_unset")]
    pub period: Period,
    #[serde(default)]
    pub recursive: RecursiveOptions,
}

impl Task {
    pub fn new(name: impl Into<String>, effort: Option<&str>, resources: &[&str]) -> Self {
        Self {
            name: name.into(),
            effort: effort.map(str::to_string),
            allocated_resources: resources.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn add_subtask(&mut self, task: Task) {
        self.subtasks.push(task);
    }

    pub fn is_milestone(&self) -> bool {
        self.milestone.as_deref().is_some_and(|m| !m.is_empty())
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    pub fn has_effort(&self) -> bool {
        self.effort.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive.enable
    }

    /// Own effort in seconds, 0 when none is authored.
    pub fn effort_seconds(&self, work_hours: u32) -> Result<i64> {
        match self.effort.as_deref() {
            Some(effort) if !effort.is_empty() => parse_duration(effort, work_hours),
            _ => Ok(0),
        }
    }

    /// Own effort plus the planned effort of every subtask.
    pub fn planned_effort_seconds(&self, work_hours: u32) -> Result<i64> {
        let mut total = self.effort_seconds(work_hours)?;
        for subtask in &self.subtasks {
            total = subtask
                .planned_effort_seconds(work_hours)?
                .checked_add(total)
                .ok_or_else(|| PrevisionError::DurationOverflow(self.name.clone()))?;
        }
        Ok(total)
    }

    /// Pre-order list of this task and its subtasks with dotted names. A node without
    /// allocated resources inherits the ones resolved for its father.
    pub fn flatten(&self, father_name: Option<&str>, father_resources: &[String]) -> Vec<Task> {
        let mut node = self.clone();
        if let Some(father) = father_name.filter(|f| !f.is_empty()) {
            node.name = format!("{father}{NAME_SEPARATOR}{}", self.name);
        }
        if node.allocated_resources.is_empty() && !father_resources.is_empty() {
            node.allocated_resources = father_resources.to_vec();
        }

        let mut out = Vec::new();
        for subtask in &self.subtasks {
            out.extend(subtask.flatten(Some(&node.name), &node.allocated_resources));
        }
        out.insert(0, node);
        out
    }

    /// Resolve a dotted path whose first segment is this task's own name.
    pub fn find_by_full_name(&self, full_name: &str) -> Result<&Task> {
        let mut leaves = full_name.split(NAME_SEPARATOR);
        if leaves.next() != Some(self.name.as_str()) {
            return Err(PrevisionError::TaskNotFound(full_name.to_string()));
        }

        let mut current = self;
        for leaf in leaves {
            current = current
                .subtasks
                .iter()
                .find(|st| st.name == leaf)
                .ok_or_else(|| PrevisionError::TaskNotFound(full_name.to_string()))?;
        }
        Ok(current)
    }

    /// Names must not contain the separator used for full names.
    pub fn validate(&self) -> Result<()> {
        if self.name.contains(NAME_SEPARATOR) {
            return Err(PrevisionError::InvalidTaskName(self.name.clone()));
        }
        self.subtasks.iter().try_for_each(Task::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_dots_names_and_inherits_resources() {
        let mut root = Task::new("T", None, &["user1"]);
        let mut mid = Task::new("A", None, &[]);
        mid.add_subtask(Task::new("B", Some("1d"), &["user2"]));
        root.add_subtask(mid);

        let flat = root.flatten(Some("ACT"), &[]);
        let names: Vec<_> = flat.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ACT.T", "ACT.T.A", "ACT.T.A.B"]);
        assert_eq!(flat[1].allocated_resources, vec!["user1".to_string()]);
        assert_eq!(flat[2].allocated_resources, vec!["user2".to_string()]);
    }

    #[test]
    fn planned_effort_overflow_is_an_error() {
        let mut root = Task::new("T", Some("300000000000000d"), &[]);
        root.add_subtask(Task::new("S", Some("300000000000000d"), &[]));
        let one = root.subtasks[0].planned_effort_seconds(8).unwrap();
        assert_eq!(one, 300_000_000_000_000 * 28800);
        assert!(matches!(
            root.planned_effort_seconds(8),
            Err(PrevisionError::DurationOverflow(name)) if name == "T"
        ));
    }

    #[test]
    fn rejects_dotted_names() {
        let mut root = Task::new("T", None, &[]);
        root.add_subtask(Task::new("a.b", Some("1h"), &[]));
        assert!(matches!(
            root.validate(),
            Err(PrevisionError::InvalidTaskName(name)) if name == "a.b"
        ));
    }
}
