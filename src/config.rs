use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::duration;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const DEFAULT_WORK_HOURS: u32 = 8;
const DEFAULT_TASK_PRIORITY: i32 = 100;
const DEFAULT_MAX_SIMULATION_DAYS: u32 = 3650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkConfig {
    /// Length of a work day in hours; `1d` efforts scale by this.
    #[serde(default = "default_work_hours")]
    pub work_hours: u32,
    /// Priority given to tasks authored with priority 0.
    #[serde(default = "default_task_priority")]
    pub task_default_priority: i32,
    /// Upper bound of simulated work days for the forward allocation.
    #[serde(default = "default_max_simulation_days")]
    pub max_simulation_days: u32,
}

fn default_work_hours() -> u32 {
    DEFAULT_WORK_HOURS
}

fn default_task_priority() -> i32 {
    DEFAULT_TASK_PRIORITY
}

fn default_max_simulation_days() -> u32 {
    DEFAULT_MAX_SIMULATION_DAYS
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            work_hours: DEFAULT_WORK_HOURS,
            task_default_priority: DEFAULT_TASK_PRIORITY,
            max_simulation_days: DEFAULT_MAX_SIMULATION_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevisionConfig {
    #[serde(default)]
    pub work: WorkConfig,
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
}

impl PrevisionConfig {
    pub fn new(work_hours: u32, task_default_priority: i32) -> Self {
        Self {
            work: WorkConfig {
                work_hours,
                task_default_priority,
                ..WorkConfig::default()
            },
            calendar: WorkCalendarConfig::default(),
        }
    }

    pub fn calendar(&self) -> Result<WorkCalendar> {
        WorkCalendar::from_config(&self.calendar)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn work_hours(&self) -> u32 {
        self.work.work_hours
    }

    /// Seconds in one work day.
    pub fn work_day_seconds(&self) -> i64 {
        duration::day_seconds(self.work.work_hours)
    }
}
