//! Date rollup through the task hierarchy and declared dependencies.
//!
//! Phases run in a fixed order: containers, completed tasks without logged work,
//! tasks with dependencies, milestones. Containers are ordered children first over a
//! child -> parent graph. The other phases are ordered over their dependency graph,
//! ties going to the lexicographically greatest name.

use super::BuildContext;
use crate::error::{PrevisionError, Result};
use crate::period::{earliest, latest};
use crate::scheduled::ScheduledTask;
use crate::task::NAME_SEPARATOR;
use chrono::NaiveDate;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BinaryHeap, HashMap};
use tracing::debug;

type TaskIndex = HashMap<String, usize>;

/// Graph over arena indices.
pub struct RollupDag {
    pub graph: DiGraph<usize, ()>,
    pub index_to_node: HashMap<usize, NodeIndex>,
}

impl RollupDag {
    fn with_nodes(members: &[usize]) -> Self {
        let mut graph = DiGraph::new();
        let mut index_to_node = HashMap::new();
        for &idx in members {
            index_to_node.insert(idx, graph.add_node(idx));
        }
        Self {
            graph,
            index_to_node,
        }
    }

    fn connect(&mut self, from: usize, to: usize) {
        if let (Some(&u), Some(&v)) = (self.index_to_node.get(&from), self.index_to_node.get(&to))
        {
            self.graph.add_edge(u, v, ());
        }
    }

    /// Edges child -> container for every container in `containers`.
    pub fn containers(
        schedule: &[ScheduledTask],
        index: &TaskIndex,
        containers: &[usize],
    ) -> Result<Self> {
        let mut dag = Self::with_nodes(containers);
        for &parent in containers {
            for child in child_indices(schedule, index, parent)? {
                dag.connect(child, parent);
            }
        }
        Ok(dag)
    }

    /// Edges dependency -> dependent among `members`.
    pub fn dependencies(
        schedule: &[ScheduledTask],
        index: &TaskIndex,
        members: &[usize],
    ) -> Result<Self> {
        let mut dag = Self::with_nodes(members);
        for &idx in members {
            for dep in dependency_indices(schedule, index, idx)? {
                dag.connect(dep, idx);
            }
        }
        Ok(dag)
    }

    pub fn topological_order(&self, schedule: &[ScheduledTask]) -> Result<Vec<usize>> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| {
                let name = schedule[self.graph[cycle.node_id()]].name();
                PrevisionError::DependencyCycle(name.to_string())
            })
    }

    /// Kahn's algorithm; among ready nodes the greatest task name goes first.
    pub fn ordered_by_name_desc(&self, schedule: &[ScheduledTask]) -> Result<Vec<usize>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| (n, self.graph.neighbors_directed(n, Direction::Incoming).count()))
            .collect();

        let mut ready: BinaryHeap<(&str, NodeIndex)> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(&n, _)| (schedule[self.graph[n]].name(), n))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some((_, node)) = ready.pop() {
            order.push(self.graph[node]);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push((schedule[self.graph[next]].name(), next));
                    }
                }
            }
        }

        if order.len() < in_degree.len() {
            let stuck = in_degree
                .iter()
                .filter(|(_, deg)| **deg > 0)
                .map(|(&n, _)| schedule[self.graph[n]].name())
                .max()
                .unwrap_or_default();
            return Err(PrevisionError::DependencyCycle(stuck.to_string()));
        }
        Ok(order)
    }
}

fn child_indices(
    schedule: &[ScheduledTask],
    index: &TaskIndex,
    parent: usize,
) -> Result<Vec<usize>> {
    let st = &schedule[parent];
    st.task
        .subtasks
        .iter()
        .map(|child| {
            let full = format!("{}{NAME_SEPARATOR}{}", st.name(), child.name);
            index.get(&full).copied().ok_or_else(|| PrevisionError::ChildTaskNotFound {
                parent: st.name().to_string(),
                child: child.name.clone(),
            })
        })
        .collect()
}

fn dependency_indices(
    schedule: &[ScheduledTask],
    index: &TaskIndex,
    idx: usize,
) -> Result<Vec<usize>> {
    let st = &schedule[idx];
    st.task
        .depends
        .iter()
        .map(|dep| {
            index.get(dep).copied().ok_or_else(|| PrevisionError::DependencyNotFound {
                task: st.name().to_string(),
                dependency: dep.clone(),
            })
        })
        .collect()
}

#[derive(Default)]
struct Phases {
    containers: Vec<usize>,
    closed: Vec<usize>,
    with_deps: Vec<usize>,
    milestones: Vec<usize>,
}

fn classify(schedule: &[ScheduledTask]) -> Phases {
    let mut phases = Phases::default();
    for (idx, st) in schedule.iter().enumerate() {
        let task = &st.task;
        if task.is_milestone() {
            phases.milestones.push(idx);
            continue;
        }
        let closed_without_work =
            task.has_effort() && !task.has_subtasks() && st.timesheets.is_empty() && task.completed;
        if closed_without_work {
            if !task.depends.is_empty() {
                phases.closed.push(idx);
            }
            continue;
        }
        if !task.depends.is_empty() {
            phases.with_deps.push(idx);
        }
        if !task.has_effort() && task.has_subtasks() {
            phases.containers.push(idx);
        }
    }
    phases
}

/// Fold the periods of `sources` into min start / max end, starting from `seed`.
/// The end only moves when the target may publish it.
fn aggregate(
    schedule: &[ScheduledTask],
    sources: &[usize],
    seed: (Option<NaiveDate>, Option<NaiveDate>),
    with_end: bool,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    sources.iter().fold(seed, |(start, end), &src| {
        let period = &schedule[src].period;
        let end = if with_end { latest(end, period.end_period) } else { end };
        (earliest(start, period.start_period), end)
    })
}

fn apply(st: &mut ScheduledTask, start: Option<NaiveDate>, end: Option<NaiveDate>, with_end: bool) {
    if start.is_some() {
        st.period.start_period = start;
    }
    if with_end && end.is_some() {
        st.period.end_period = end;
    }
}

fn roll_up_dependencies(
    schedule: &mut [ScheduledTask],
    index: &TaskIndex,
    members: &[usize],
    with_plan: bool,
    from_own_period: bool,
) -> Result<()> {
    let dag = RollupDag::dependencies(schedule, index, members)?;
    for idx in dag.ordered_by_name_desc(schedule)? {
        let deps = dependency_indices(schedule, index, idx)?;
        let with_end = schedule[idx].is_closed_for(with_plan);
        let seed = if from_own_period {
            (schedule[idx].period.start_period, schedule[idx].period.end_period)
        } else {
            (None, None)
        };
        let (start, end) = aggregate(schedule, &deps, seed, with_end);

        let st = &mut schedule[idx];
        apply(st, start, end, with_end);
        if with_end && end.is_some() {
            debug!(
                task = %st.name(),
                start = ?st.period.start_period,
                end = ?st.period.end_period,
                "dependencies closed"
            );
        }
    }
    Ok(())
}

pub fn elaborate_father_tasks_and_milestone(
    ctx: &mut BuildContext,
    with_plan: bool,
) -> Result<()> {
    let phases = classify(&ctx.schedule);
    let index = ctx.task_map().clone();
    let schedule = &mut ctx.schedule;

    let containers = RollupDag::containers(schedule, &index, &phases.containers)?;
    for idx in containers.topological_order(schedule)? {
        let children = child_indices(schedule, &index, idx)?;
        let with_end = schedule[idx].is_closed_for(with_plan);
        let (start, end) = aggregate(schedule, &children, (None, None), with_end);
        apply(&mut schedule[idx], start, end, with_end);
    }

    roll_up_dependencies(schedule, &index, &phases.closed, with_plan, false)?;
    roll_up_dependencies(schedule, &index, &phases.with_deps, with_plan, true)?;
    for &idx in &phases.milestones {
        debug!(milestone = %schedule[idx].name(), "updating milestone period");
    }
    roll_up_dependencies(schedule, &index, &phases.milestones, with_plan, false)
}
