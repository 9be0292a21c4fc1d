// tests/scheduler_properties.rs

use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;

use readqc::dag::{Scheduler, TaskRunState, completed_tasks};
use readqc::engine::{TaskFailure, TaskOutcome};
use readqc::fs::mock::MockFileSystem;
use readqc::tasks::{AllSamplesQcWrapper, TaskPlan};
use readqc_test_utils::builders::ConfigFileBuilder;

#[derive(Debug, Clone)]
struct Scenario {
    samples: usize,
    fragmented: Vec<bool>,
    /// Indices into the plan's task list.
    complete: Vec<usize>,
    failing: Vec<usize>,
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (1..5usize).prop_flat_map(|samples| {
        (
            Just(samples),
            proptest::collection::vec(any::<bool>(), samples),
            proptest::collection::vec(0..64usize, 0..8),
            proptest::collection::vec(0..64usize, 0..4),
        )
            .prop_map(|(samples, fragmented, complete, failing)| Scenario {
                samples,
                fragmented,
                complete,
                failing,
            })
    })
}

fn build_plan(s: &Scenario, fs: &MockFileSystem) -> TaskPlan {
    let mut builder = ConfigFileBuilder::new("/w", "/opt/bin");
    for i in 0..s.samples {
        let name = format!("S{i}");
        builder = if s.fragmented[i] {
            let r1 = [format!("/raw/{name}_a1"), format!("/raw/{name}_b1")];
            let r2 = [format!("/raw/{name}_a2"), format!("/raw/{name}_b2")];
            builder.with_fragments(
                &name,
                &[r1[0].as_str(), r1[1].as_str()],
                &[r2[0].as_str(), r2[1].as_str()],
            )
        } else {
            builder.with_pair(&name, &format!("/raw/{name}_1"), &format!("/raw/{name}_2"))
        };
    }
    let fan_out = AllSamplesQcWrapper::from_config(&builder.build())
        .with_inherited_path(None)
        .plan_only(fs)
        .unwrap();
    fan_out.plan.validate().unwrap();
    fan_out.plan
}

proptest! {
    #[test]
    fn run_terminates_and_respects_requirements(s in scenario()) {
        let fs = MockFileSystem::new();
        let plan = build_plan(&s, &fs);
        let n = plan.len();

        let mut completed = completed_tasks(&plan, &fs);
        for &i in &s.complete {
            let task = &plan.tasks()[i % n];
            if task.output.is_some() {
                completed.insert(task.name.clone());
            }
        }
        let failing: HashSet<String> =
            s.failing.iter().map(|&i| plan.tasks()[i % n].name.clone()).collect();

        let mut scheduler = Scheduler::from_plan(&plan);
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut dispatched = HashSet::new();

        let ready = scheduler.start_run(plan.goals(), &completed);
        for t in ready {
            prop_assert_eq!(scheduler.deps_satisfied(&t.name), Some(true));
            prop_assert!(dispatched.insert(t.name.clone()), "{} dispatched twice", t.name);
            queue.push_back(t.name);
        }

        let mut steps = 0;
        while let Some(name) = queue.pop_front() {
            steps += 1;
            prop_assert!(steps <= n, "more completions than tasks");

            let outcome = if failing.contains(&name) {
                TaskOutcome::Failed(TaskFailure::ExitCode(1))
            } else {
                TaskOutcome::Success
            };
            for t in scheduler.handle_completion(&name, outcome) {
                prop_assert_eq!(scheduler.deps_satisfied(&t.name), Some(true));
                prop_assert!(dispatched.insert(t.name.clone()), "{} dispatched twice", t.name);
                queue.push_back(t.name);
            }
        }

        prop_assert!(scheduler.is_idle());

        // Complete tasks are never dispatched.
        for name in &dispatched {
            prop_assert!(!completed.contains(name));
        }

        // Every task that took part ended in a terminal state.
        let summary = scheduler.summary();
        prop_assert!(summary.unfinished.is_empty());
        for name in scheduler.tasks_in_current_run() {
            let state = scheduler.run_state_of(&name).unwrap();
            prop_assert!(
                !matches!(state, TaskRunState::Pending | TaskRunState::Running),
                "{} left in {:?}", name, state
            );
        }

        let any_failed = dispatched.iter().any(|t| failing.contains(t));
        prop_assert_eq!(summary.is_success(), !any_failed);
    }
}
