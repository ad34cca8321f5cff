use crate::error::PrevisionError;
use crate::scenario::ScenarioSchedule;
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Prevision(#[from] PrevisionError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage for computed previsions, kept as baselines for later runs.
pub trait PrevisionStore {
    fn save_prevision(&self, prevision: &ScenarioSchedule) -> PersistenceResult<()>;
    fn load_prevision(&self) -> PersistenceResult<Option<ScenarioSchedule>>;
}

/// Task names are unique and every timesheet row belongs to the task holding it.
pub fn validate_prevision(prevision: &ScenarioSchedule) -> PersistenceResult<()> {
    let mut seen = HashSet::new();
    for st in &prevision.schedule {
        if !seen.insert(st.name()) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate task {}",
                st.name()
            )));
        }
        if let Some(row) = st.timesheets.iter().find(|row| row.task != st.name()) {
            return Err(PersistenceError::InvalidData(format!(
                "timesheet of task {} stored under {}",
                row.task,
                st.name()
            )));
        }
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_prevision_from_json, load_timesheets_from_csv, save_prevision_to_json,
    save_timesheets_to_csv,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePrevisionStore;
