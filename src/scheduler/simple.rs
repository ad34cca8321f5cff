use super::recursive::RecursiveTaskSeer;
use super::{BuildContext, DefaultScheduler, PrevisionScheduler, SchedulerOpts};
use crate::activity::Client;
use crate::config::PrevisionConfig;
use crate::error::{PrevisionError, Result};
use crate::resource::Resource;
use crate::scenario::{Scenario, ScenarioSchedule};
use crate::scheduled::{ScheduledTask, progress_percent, sort_by_priority};
use crate::timesheet::AgendaTimesheets;
use tracing::{debug, info};

/// Greedy day-by-day allocation in priority order.
#[derive(Debug, Clone)]
pub struct SimpleScheduler {
    base: DefaultScheduler,
}

impl SimpleScheduler {
    pub fn new(config: PrevisionConfig, scenario: Scenario) -> Self {
        Self {
            base: DefaultScheduler::new(config, scenario),
        }
    }

    /// Allocate every open task, recurring ones first, then copy the generated
    /// timesheets back into the arena.
    pub fn do_prevision(&self, ctx: &mut BuildContext) -> Result<()> {
        ctx.reset_resources(&self.base.resources);
        let work_hours = ctx.work_hours();

        let mut tasks: Vec<ScheduledTask> = Vec::new();
        let mut recursive: Vec<ScheduledTask> = Vec::new();
        for st in ctx.schedule.iter_mut() {
            debug!(task = %st.name(), "checking task for scheduling");
            if st.task.completed || (!st.task.has_effort() && !st.task.is_recursive()) {
                continue;
            }
            if st.task.is_recursive() {
                recursive.push(st.clone());
                continue;
            }

            let effort = st.task.effort_seconds(work_hours)?;
            debug!(task = %st.name(), effort, work_time = st.work_time, "found effort");
            if st.work_time > effort {
                st.underestimated = true;
                st.left_time = 0;
                continue;
            } else if st.work_time == effort {
                st.left_time = 0;
                continue;
            }
            st.progress = progress_percent(st.work_time, effort);
            st.left_time = effort - st.work_time;
            tasks.push(st.clone());
        }
        sort_by_priority(&mut tasks);

        let mut completed: Vec<ScheduledTask> = Vec::new();
        if !recursive.is_empty() {
            sort_by_priority(&mut recursive);
            let calendar = ctx.calendar().clone();
            let now = ctx.now();
            for mut st in recursive {
                debug!(
                    task = %st.name(),
                    mode = %st.task.recursive.mode,
                    "scheduling recursive task"
                );
                RecursiveTaskSeer::for_mode(st.task.recursive.mode, &calendar, work_hours)
                    .do_prevision(&mut st, &mut ctx.resources, now)?;
                completed.push(st);
            }
        }

        let max_days = ctx.config().work.max_simulation_days;
        let mut work_date = ctx.now();
        let mut simulated_days: u32 = 0;
        while !tasks.is_empty() {
            if simulated_days >= max_days {
                let names: Vec<&str> = tasks.iter().map(ScheduledTask::name).collect();
                return Err(PrevisionError::SimulationHorizonExceeded {
                    days: max_days,
                    tasks: names.join(", "),
                });
            }
            work_date = ctx.calendar().next_work_day(work_date);
            simulated_days += 1;

            let mut in_progress = Vec::with_capacity(tasks.len());
            for mut st in tasks {
                if st.task.allocated_resources.is_empty() {
                    return Err(PrevisionError::NoResources(st.name().to_string()));
                }
                if st.fixed_start().is_some_and(|start| work_date < start) {
                    in_progress.push(st);
                    continue;
                }

                let name = st.task.name.clone();
                let resources = st.task.allocated_resources.clone();
                ctx.resources.allocate(
                    &name,
                    &resources,
                    work_date,
                    &mut st.left_time,
                    &mut st.timesheets,
                )?;
                if st.left_time == 0 {
                    debug!(task = %name, %work_date, "task fully allocated");
                    completed.push(st);
                } else {
                    in_progress.push(st);
                }
            }
            tasks = in_progress;
        }

        for done in completed {
            let target = ctx.task_mut(done.name())?;
            target.timesheets = done.timesheets;
            target.left_time = 0;
        }
        Ok(())
    }
}

impl PrevisionScheduler for SimpleScheduler {
    fn build_prevision(&mut self, opts: &SchedulerOpts) -> Result<ScenarioSchedule> {
        info!(scenario = %self.base.scenario.name, "building prevision");
        let mut ctx = self.base.prepare_context(opts)?;
        if !opts.skip_plan {
            self.do_prevision(&mut ctx)?;
            DefaultScheduler::elaborate_timesheets(&mut ctx, true)?;
        }
        let prevision = self.base.finish(ctx, opts)?;
        info!(
            scenario = %prevision.scenario.name,
            tasks = prevision.schedule.len(),
            "prevision ready"
        );
        Ok(prevision)
    }

    fn set_clients(&mut self, clients: Vec<Client>) {
        self.base.clients = clients;
    }

    fn set_resources(&mut self, resources: Vec<Resource>) {
        self.base.resources = resources;
    }

    fn set_timesheets(&mut self, timesheets: Vec<AgendaTimesheets>) {
        self.base.timesheets = timesheets;
    }
}
