pub mod activity;
pub mod calendar;
pub mod config;
pub mod duration;
pub mod error;
pub mod period;
pub mod persistence;
pub mod resource;
pub mod resource_map;
pub mod scenario;
pub mod scheduled;
pub mod scheduler;
pub mod task;
pub mod timesheet;

pub use activity::{Activity, Client};
pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::{PrevisionConfig, WorkConfig};
pub use duration::{parse_duration, seconds_to_duration};
pub use error::{PrevisionError, Result};
pub use period::Period;
pub use persistence::{
    PersistenceError, PrevisionStore, load_prevision_from_json, load_timesheets_from_csv,
    save_prevision_to_json, save_timesheets_to_csv,
};
#[cfg(feature = "sqlite")]
pub use persistence::SqlitePrevisionStore;
pub use resource::Resource;
pub use resource_map::{ResourceBook, ResourceDailyMap};
pub use scenario::{Scenario, ScenarioActivity, ScenarioSchedule, ScenarioTask};
pub use scheduled::ScheduledTask;
pub use scheduler::{
    BuildContext, PrevisionScheduler, SchedulerOpts, SimpleScheduler, new_scheduler,
};
pub use task::{RecursiveMode, RecursiveOptions, Task};
pub use timesheet::{AgendaTimesheets, TimesheetRow};
