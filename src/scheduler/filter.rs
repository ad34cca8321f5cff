//! Membership filters applied before and after a build. None of them touch dates or
//! progress.

use super::SchedulerOpts;
use crate::activity::Client;
use crate::error::{PrevisionError, Result};
use crate::scheduled::ScheduledTask;
use regex::Regex;
use tracing::debug;

pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(PrevisionError::from))
        .collect()
}

fn matches_any(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(name))
}

fn contains(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n == name)
}

/// Restrict the client tree to the named clients and activities. Selected clients
/// keep the order of the filter list.
pub fn filter_pre_elaboration(clients: &[Client], opts: &SchedulerOpts) -> Result<Vec<Client>> {
    let mut selected: Vec<Client> = if opts.pre_clients.is_empty() {
        clients.to_vec()
    } else {
        let picked: Vec<Client> = opts
            .pre_clients
            .iter()
            .filter_map(|name| clients.iter().find(|c| &c.name == name).cloned())
            .collect();
        if picked.is_empty() {
            return Err(PrevisionError::NoClientsAfterFilter);
        }
        picked
    };

    if !opts.pre_activities.is_empty() {
        for client in selected.iter_mut() {
            client.activities = opts
                .pre_activities
                .iter()
                .filter_map(|name| client.activities.iter().find(|a| &a.name == name).cloned())
                .collect();
        }
    }
    Ok(selected)
}

pub fn filter_pre_elaboration_flags(
    schedule: Vec<ScheduledTask>,
    opts: &SchedulerOpts,
) -> Result<Vec<ScheduledTask>> {
    let excluded_activities = compile_patterns(&opts.pre_exclude_activities)?;

    Ok(schedule
        .into_iter()
        .filter(|st| {
            if matches_any(&st.activity.name, &excluded_activities) {
                debug!(
                    task = %st.name(),
                    activity = %st.activity.name,
                    "excluded in pre processing"
                );
                return false;
            }
            true
        })
        .filter(|st| !opts.pre_exclude_task_flags.iter().any(|f| st.task.has_flag(f)))
        .filter(|st| {
            let excluded = opts
                .pre_exclude_activity_flags
                .iter()
                .any(|f| st.activity.has_flag(f));
            if excluded {
                debug!(task = %st.name(), "excluding task by activity flag");
            }
            !excluded
        })
        .collect())
}

pub fn filter_post_elaboration(
    schedule: Vec<ScheduledTask>,
    opts: &SchedulerOpts,
) -> Result<Vec<ScheduledTask>> {
    let excluded_activities = compile_patterns(&opts.post_exclude_activities)?;

    Ok(schedule
        .into_iter()
        .filter(|st| {
            opts.post_clients.is_empty() || contains(&opts.post_clients, &st.client.name)
        })
        .filter(|st| {
            if matches_any(&st.activity.name, &excluded_activities) {
                debug!(
                    task = %st.name(),
                    activity = %st.activity.name,
                    "excluded in post processing"
                );
                return false;
            }
            true
        })
        .filter(|st| {
            opts.post_activities.is_empty() || contains(&opts.post_activities, &st.activity.name)
        })
        .filter(|st| !opts.skip_empty_tasks || st.period.start_period.is_some())
        .filter(|st| !opts.only_closed || st.task.completed)
        .filter(|st| !opts.post_exclude_task_flags.iter().any(|f| st.task.has_flag(f)))
        .filter(|st| {
            !opts
                .post_exclude_activity_flags
                .iter()
                .any(|f| st.activity.has_flag(f))
        })
        .collect())
}
