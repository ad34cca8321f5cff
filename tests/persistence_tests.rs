use chrono::NaiveDate;
use prevision::{
    Activity, AgendaTimesheets, Client, PersistenceError, PrevisionConfig, Resource, Scenario,
    ScenarioSchedule, SchedulerOpts, Task, TimesheetRow, load_prevision_from_json,
    load_timesheets_from_csv, new_scheduler, save_prevision_to_json, save_timesheets_to_csv,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_prevision() -> ScenarioSchedule {
    let mut activity = Activity::new("A");
    activity.add_task(Task::new("T1", Some("1.5d"), &["user1"]));
    activity.add_task(Task::new("T2", Some("3h"), &["user1"]));
    let mut client = Client::new("C");
    client.add_activity(activity);

    let mut logged = AgendaTimesheets::new("logged");
    logged.add_row(TimesheetRow::new("user1", d(2020, 9, 1), "A.T2", "1h"));

    let mut scheduler =
        new_scheduler(PrevisionConfig::default(), Scenario::new("baseline").with_now(d(2020, 9, 6)))
            .unwrap();
    scheduler.set_clients(vec![client]);
    scheduler.set_resources(vec![Resource::new("user1", "User One")]);
    scheduler.set_timesheets(vec![logged]);
    scheduler.build_prevision(&SchedulerOpts::default()).unwrap()
}

#[test]
fn prevision_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prevision.json");
    let prevision = sample_prevision();

    save_prevision_to_json(&prevision, &path).unwrap();
    let loaded = load_prevision_from_json(&path).unwrap();

    assert_eq!(loaded, prevision);
    assert_eq!(loaded.task("A.T2").unwrap().progress, 33.33);
}

#[test]
fn prevision_with_foreign_rows_is_not_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prevision.json");
    let mut prevision = sample_prevision();
    prevision.schedule[0]
        .timesheets
        .push(TimesheetRow::new("user1", d(2020, 9, 1), "A.OTHER", "1h"));

    assert!(matches!(
        save_prevision_to_json(&prevision, &path),
        Err(PersistenceError::InvalidData(_))
    ));
    assert!(!path.exists());
}

#[test]
fn missing_json_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_prevision_from_json(dir.path().join("missing.json")),
        Err(PersistenceError::Io(_))
    ));
}

#[test]
fn timesheet_csv_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timesheets.csv");
    let mut agenda = AgendaTimesheets::new("export");
    let mut noted = TimesheetRow::new("user1", d(2020, 9, 1), "A.T1", "2h30m");
    noted.note = Some("kickoff, with client".to_string());
    agenda.add_row(noted);
    agenda.add_row(TimesheetRow::new("user2", d(2020, 9, 2), "A.T2", "1d"));

    save_timesheets_to_csv(&agenda, &path).unwrap();
    let loaded = load_timesheets_from_csv(&path, "export").unwrap();

    assert_eq!(loaded, agenda);
}

#[test]
fn csv_row_with_bad_date_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timesheets.csv");
    std::fs::write(&path, "user,date,task,duration,note\nuser1,01/09/2020,A.T1,1h,\n").unwrap();

    assert!(matches!(
        load_timesheets_from_csv(&path, "broken"),
        Err(PersistenceError::Prevision(_))
    ));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use prevision::{PrevisionStore, SqlitePrevisionStore};

    #[test]
    fn empty_store_has_no_prevision() {
        let store = SqlitePrevisionStore::in_memory().unwrap();
        assert!(store.load_prevision().unwrap().is_none());
    }

    #[test]
    fn store_round_trip_keeps_task_order() {
        let store = SqlitePrevisionStore::in_memory().unwrap();
        let prevision = sample_prevision();

        store.save_prevision(&prevision).unwrap();
        let loaded = store.load_prevision().unwrap().unwrap();
        assert_eq!(loaded, prevision);
    }

    #[test]
    fn saving_again_replaces_the_previous_prevision() {
        let dir = tempdir().unwrap();
        let store = SqlitePrevisionStore::new(dir.path().join("prevision.db")).unwrap();
        let mut prevision = sample_prevision();
        store.save_prevision(&prevision).unwrap();

        prevision.schedule.truncate(1);
        prevision.scenario.name = "second".to_string();
        store.save_prevision(&prevision).unwrap();

        let loaded = store.load_prevision().unwrap().unwrap();
        assert_eq!(loaded.scenario.name, "second");
        assert_eq!(loaded.schedule.len(), 1);
    }
}
