use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{RunSummary, TaskFailure, TaskName, TaskOutcome};
use crate::tasks::TaskPlan;

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - deciding which tasks a run needs, pruning those already complete
/// - deciding when a task is ready (all requirements satisfied)
/// - marking tasks as succeeded/failed
/// - scheduling dependents when appropriate
/// - blocking dependents when a task fails
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: HashMap<TaskName, TaskInfo>,
    /// Whether a run is in progress.
    active: bool,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`TaskPlan`].
    pub fn from_plan(plan: &TaskPlan) -> Self {
        let graph = DagGraph::from_plan(plan);

        let tasks = plan
            .tasks()
            .iter()
            .enumerate()
            .map(|(order, spec)| (spec.name.clone(), TaskInfo::from_spec(spec, order)))
            .collect();

        Self {
            graph,
            tasks,
            active: false,
        }
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        !self.active
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        let info = self.tasks.get(task)?;
        Some(info.run_state.into())
    }

    /// Failure recorded for a task in the current (or last) run.
    pub fn failure_of(&self, task: &str) -> Option<&TaskFailure> {
        self.tasks.get(task)?.failure.as_ref()
    }

    /// Names of tasks participating in the current (or last) run.
    pub fn tasks_in_current_run(&self) -> Vec<TaskName> {
        self.tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| info.name.clone())
            .collect()
    }

    /// Whether the requirements of `task` are satisfied.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        let mgr = ReadOnlyStateManager::new(&self.tasks);
        Some(mgr.deps_satisfied_for_info(info))
    }

    /// Start a run towards `goals`, returning the tasks ready right away.
    ///
    /// `completed` names the tasks whose output target already exists.
    pub fn start_run(
        &mut self,
        goals: &[TaskName],
        completed: &HashSet<TaskName>,
    ) -> Vec<ScheduledTask> {
        self.start_step_internal(goals, completed).newly_scheduled
    }

    /// Handle completion of a task action (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.completion_step_internal(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `start_run` that returns a rich [`SchedulerStep`].
    pub fn step_start(
        &mut self,
        goals: &[TaskName],
        completed: &HashSet<TaskName>,
    ) -> SchedulerStep {
        self.start_step_internal(goals, completed)
    }

    /// Manual-step variant of `handle_completion` that returns a rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        self.completion_step_internal(task, outcome)
    }

    /// Per-task outcome report for the current (or last) run.
    pub fn summary(&self) -> RunSummary {
        let mut infos: Vec<&TaskInfo> = self.tasks.values().collect();
        infos.sort_by_key(|info| info.order);

        let mut summary = RunSummary::default();
        for info in infos {
            let name = info.name.clone();
            match info.run_state {
                None => {}
                Some(RunState::AlreadyComplete) => summary.already_complete.push(name),
                Some(RunState::DoneSuccess) => summary.succeeded.push(name),
                Some(RunState::DoneFailed) => {
                    let failure = info
                        .failure
                        .clone()
                        .unwrap_or_else(|| TaskFailure::Io("unknown failure".to_string()));
                    summary.failed.push((name, failure));
                }
                Some(RunState::Blocked) => summary.blocked.push(name),
                Some(RunState::Pending) | Some(RunState::Running) => summary.unfinished.push(name),
            }
        }
        summary
    }

    /// Clear `active` once no task is pending or running.
    ///
    /// Returns `true` if this call transitioned the scheduler to idle.
    fn maybe_finish_run(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let manager = StateManager::new(&self.graph, &mut self.tasks);

        if manager.all_tasks_terminal() {
            info!("scheduler: all tasks terminal; marking run as finished");
            self.active = false;
            true
        } else {
            false
        }
    }

    fn start_step_internal(
        &mut self,
        goals: &[TaskName],
        completed: &HashSet<TaskName>,
    ) -> SchedulerStep {
        if self.active {
            warn!("start_run called while a run is active; ignoring");
            return SchedulerStep::default();
        }

        for info in self.tasks.values_mut() {
            info.run_state = None;
            info.failure = None;
        }
        self.active = true;

        let known_goals: Vec<TaskName> = goals
            .iter()
            .filter(|g| {
                let known = self.graph.contains(g);
                if !known {
                    warn!(task = %g, "goal is not part of the plan; ignoring");
                }
                known
            })
            .cloned()
            .collect();

        debug!(goals = ?known_goals, "scheduler: starting run");

        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        manager.mark_needed_from_goals(&known_goals, completed);
        let newly_scheduled = manager.collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            run_just_finished,
            ..SchedulerStep::default()
        }
    }

    fn completion_step_internal(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        if !self.active {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        }

        let mut step = SchedulerStep::default();

        match self.tasks.get_mut(task) {
            Some(info) if info.run_state != Some(RunState::Running) => {
                warn!(
                    task = %task,
                    state = ?info.run_state,
                    "completion for task that is not running; ignoring"
                );
            }
            Some(info) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    debug!(task = %info.name, "task completed successfully");
                    let mut manager = StateManager::new(&self.graph, &mut self.tasks);
                    step.newly_scheduled = manager.collect_new_ready_tasks();
                }
                TaskOutcome::Failed(failure) => {
                    warn!(
                        task = %info.name,
                        reason = %failure,
                        "task failed; blocking dependents"
                    );
                    info.run_state = Some(RunState::DoneFailed);
                    info.failure = Some(failure);
                    step.newly_failed.push(info.name.clone());
                    let mut manager = StateManager::new(&self.graph, &mut self.tasks);
                    step.newly_blocked = manager.mark_dependents_blocked(task);
                }
            },
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        step.run_just_finished = self.maybe_finish_run();
        step
    }
}
