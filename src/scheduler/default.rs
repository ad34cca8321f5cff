use super::filter;
use super::rollup;
use super::{BuildContext, SchedulerOpts};
use crate::activity::Client;
use crate::config::PrevisionConfig;
use crate::error::Result;
use crate::resource::Resource;
use crate::scenario::{Scenario, ScenarioSchedule};
use crate::scheduled::ScheduledTask;
use crate::timesheet::AgendaTimesheets;
use tracing::{debug, warn};

/// Steps shared by every scheduler: flattening, priorities, timesheet
/// reconciliation, date rollup and filtering.
#[derive(Debug, Clone)]
pub struct DefaultScheduler {
    pub config: PrevisionConfig,
    pub scenario: Scenario,
    pub clients: Vec<Client>,
    pub resources: Vec<Resource>,
    pub timesheets: Vec<AgendaTimesheets>,
}

impl DefaultScheduler {
    pub fn new(config: PrevisionConfig, scenario: Scenario) -> Self {
        Self {
            config,
            scenario,
            clients: Vec::new(),
            resources: Vec::new(),
            timesheets: Vec::new(),
        }
    }

    /// Everything a plan needs: filtered, flattened, prioritized tasks with their
    /// logged work reconciled.
    pub fn prepare_context(&self, opts: &SchedulerOpts) -> Result<BuildContext> {
        let clients = filter::filter_pre_elaboration(&self.clients, opts)?;
        let schedule = Self::create_task_scheduled(&clients);
        let schedule = filter::filter_pre_elaboration_flags(schedule, opts)?;
        debug!(tasks = schedule.len(), "flattened tasks");

        let mut ctx = BuildContext::new(
            self.config.clone(),
            self.config.calendar()?,
            self.scenario.now_or_today(),
            schedule,
            &self.resources,
        );
        self.initialize_tasks(&mut ctx);
        self.assign_timesheets(&mut ctx);
        Self::elaborate_timesheets(&mut ctx, false)?;
        Ok(ctx)
    }

    pub fn create_task_scheduled(clients: &[Client]) -> Vec<ScheduledTask> {
        let mut schedule = Vec::new();
        for client in clients {
            for activity in &client.activities {
                schedule.extend(
                    activity
                        .all_tasks()
                        .into_iter()
                        .map(|task| ScheduledTask::new(task, activity, client)),
                );
            }
        }
        schedule
    }

    /// Completed tasks start at 100%. Priorities fall back to the configured default,
    /// then scenario overrides apply by activity and by task.
    pub fn initialize_tasks(&self, ctx: &mut BuildContext) {
        let default_priority = self.config.work.task_default_priority;
        for st in ctx.schedule.iter_mut() {
            if st.task.completed {
                st.progress = 100.0;
            }
            if st.task.priority == 0 {
                st.task.priority = default_priority;
            }
            if let Some(sa) = self.scenario.activity_override(&st.activity.name) {
                st.task.priority = sa.priority;
            }
            if let Some(override_task) = self.scenario.task_override(&st.task.name) {
                st.task.priority = override_task.priority;
                if !override_task.override_resources.is_empty() {
                    st.task.allocated_resources = override_task.override_resources.clone();
                }
            }
        }
    }

    pub fn assign_timesheets(&self, ctx: &mut BuildContext) {
        for agenda in &self.timesheets {
            for row in &agenda.timesheets {
                match ctx.task_mut(&row.task) {
                    Ok(task) => task.add_timesheet(row.clone()),
                    Err(_) => warn!(
                        task = %row.task,
                        agenda = %agenda.name,
                        "task not found for timesheet"
                    ),
                }
            }
        }
    }

    pub fn elaborate_timesheets(ctx: &mut BuildContext, with_plan: bool) -> Result<()> {
        let work_hours = ctx.work_hours();
        for st in ctx.schedule.iter_mut() {
            st.elaborate_timesheets(work_hours, with_plan)?;
        }
        rollup::elaborate_father_tasks_and_milestone(ctx, with_plan)
    }

    pub fn finish(&self, ctx: BuildContext, opts: &SchedulerOpts) -> Result<ScenarioSchedule> {
        let schedule = filter::filter_post_elaboration(ctx.into_schedule(), opts)?;
        Ok(ScenarioSchedule {
            scenario: self.scenario.clone(),
            schedule,
        })
    }
}
