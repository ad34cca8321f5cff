use chrono::NaiveDate;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrevisionError>;

/// Every failure a prevision build can hit. All of them abort the whole run.
#[derive(Debug, Error)]
pub enum PrevisionError {
    #[error("invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("total duration of {0} overflows")]
    DurationOverflow(String),

    #[error("seconds must be greater than 0 (got {0})")]
    NonPositiveSeconds(i64),

    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("task {child} of the father {parent} not found")]
    ChildTaskNotFound { parent: String, child: String },

    #[error("dependency {dependency} of task {task} not found")]
    DependencyNotFound { task: String, dependency: String },

    #[error("dependency cycle around task {0}: cycles are rejected before date rollup")]
    DependencyCycle(String),

    #[error("no resources for task {0}")]
    NoResources(String),

    #[error("resource map for user {0} not found")]
    ResourceNotFound(String),

    #[error("invalid recursive task {task}: {reason}")]
    InvalidRecursiveTask { task: String, reason: String },

    #[error("too few resources for {mode} task {task} (occurrence of {date})")]
    InsufficientResources {
        task: String,
        mode: &'static str,
        date: NaiveDate,
    },

    #[error("no clients available after the filter")]
    NoClientsAfterFilter,

    #[error("unknown scheduler '{0}'")]
    UnknownScheduler(String),

    #[error("tasks still open after simulating {days} work days: {tasks}")]
    SimulationHorizonExceeded { days: u32, tasks: String },

    #[error("invalid resource {user}: {reason}")]
    InvalidResource { user: String, reason: String },

    #[error("invalid task name {0}")]
    InvalidTaskName(String),

    #[error("invalid calendar: {0}")]
    InvalidCalendar(String),

    #[error("config io error: {0}")]
    ConfigIo(#[from] io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
