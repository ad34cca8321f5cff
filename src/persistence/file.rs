use super::{PersistenceError, PersistenceResult};
use crate::calendar::{format_date, parse_date};
use crate::scenario::{Scenario, ScenarioSchedule};
use crate::scheduled::ScheduledTask;
use crate::timesheet::{AgendaTimesheets, TimesheetRow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PrevisionSnapshot {
    #[serde(default = "default_version")]
    version: u32,
    scenario: Scenario,
    #[serde(default)]
    schedule: Vec<ScheduledTask>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl PrevisionSnapshot {
    fn from_prevision(prevision: &ScenarioSchedule) -> PersistenceResult<Self> {
        super::validate_prevision(prevision)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            scenario: prevision.scenario.clone(),
            schedule: prevision.schedule.clone(),
        })
    }

    fn into_prevision(self) -> PersistenceResult<ScenarioSchedule> {
        if self.version > SNAPSHOT_VERSION {
            return Err(PersistenceError::InvalidData(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        let prevision = ScenarioSchedule {
            scenario: self.scenario,
            schedule: self.schedule,
        };
        super::validate_prevision(&prevision)?;
        Ok(prevision)
    }
}

pub fn save_prevision_to_json<P: AsRef<Path>>(
    prevision: &ScenarioSchedule,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = PrevisionSnapshot::from_prevision(prevision)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_prevision_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ScenarioSchedule> {
    let file = File::open(path)?;
    let snapshot: PrevisionSnapshot = serde_json::from_reader(file)?;
    snapshot.into_prevision()
}

#[derive(Default, Serialize, Deserialize)]
struct TimesheetCsvRecord {
    user: String,
    date: String,
    task: String,
    duration: String,
    #[serde(default)]
    note: String,
}

impl From<&TimesheetRow> for TimesheetCsvRecord {
    fn from(row: &TimesheetRow) -> Self {
        Self {
            user: row.user.clone(),
            date: format_date(row.date),
            task: row.task.clone(),
            duration: row.duration.clone(),
            note: row.note.clone().unwrap_or_default(),
        }
    }
}

impl TimesheetCsvRecord {
    fn into_row(self) -> PersistenceResult<TimesheetRow> {
        if self.user.is_empty() || self.task.is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "timesheet row without user or task on {}",
                self.date
            )));
        }
        let date = parse_date(&self.date)?;
        let mut row = TimesheetRow::new(self.user, date, self.task, self.duration);
        row.note = (!self.note.is_empty()).then_some(self.note);
        Ok(row)
    }
}

pub fn save_timesheets_to_csv<P: AsRef<Path>>(
    agenda: &AgendaTimesheets,
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &agenda.timesheets {
        writer.serialize(TimesheetCsvRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read rows exported by [`save_timesheets_to_csv`] into an agenda named `name`.
pub fn load_timesheets_from_csv<P: AsRef<Path>>(
    path: P,
    name: &str,
) -> PersistenceResult<AgendaTimesheets> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut agenda = AgendaTimesheets::new(name);
    for record in reader.deserialize::<TimesheetCsvRecord>() {
        agenda.add_row(record?.into_row()?);
    }
    Ok(agenda)
}
