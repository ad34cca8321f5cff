use super::{PersistenceError, PersistenceResult, PrevisionStore};
use crate::scenario::{Scenario, ScenarioSchedule};
use crate::scheduled::ScheduledTask;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqlitePrevisionStore {
    connection: Mutex<Connection>,
}

impl SqlitePrevisionStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS prevision_scenario (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                scenario_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS scheduled_tasks (
                position INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_scenario(
        &self,
        tx: &rusqlite::Transaction,
        scenario: &Scenario,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(scenario)?;
        tx.execute("DELETE FROM prevision_scenario", [])?;
        tx.execute(
            "INSERT INTO prevision_scenario (id, scenario_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_tasks(
        &self,
        tx: &rusqlite::Transaction,
        tasks: &[ScheduledTask],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM scheduled_tasks", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO scheduled_tasks (position, name, task_json) VALUES (?1, ?2, ?3)",
        )?;
        for (position, task) in tasks.iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![position as i64, task.name(), json])?;
        }
        Ok(())
    }
}

impl PrevisionStore for SqlitePrevisionStore {
    fn save_prevision(&self, prevision: &ScenarioSchedule) -> PersistenceResult<()> {
        super::validate_prevision(prevision)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_scenario(&tx, &prevision.scenario)?;
        self.save_tasks(&tx, &prevision.schedule)?;
        tx.commit()?;
        Ok(())
    }

    fn load_prevision(&self) -> PersistenceResult<Option<ScenarioSchedule>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT scenario_json FROM prevision_scenario WHERE id = 1")?;
        let scenario_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(scenario_json) = scenario_json else {
            return Ok(None);
        };
        let scenario: Scenario = serde_json::from_str(&scenario_json)?;

        let mut stmt =
            conn.prepare("SELECT task_json FROM scheduled_tasks ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut schedule = Vec::new();
        for json in rows {
            let task: ScheduledTask = serde_json::from_str(&json?)?;
            schedule.push(task);
        }

        let prevision = ScenarioSchedule { scenario, schedule };
        super::validate_prevision(&prevision)?;
        Ok(Some(prevision))
    }
}
