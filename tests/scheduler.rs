// tests/scheduler.rs

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use readqc::dag::{Scheduler, TaskRunState, completed_tasks};
use readqc::engine::{RuntimeEvent, TaskFailure, TaskOutcome};
use readqc::exec::task_runner::run_task;
use readqc::fs::FileSystem;
use readqc::fs::mock::MockFileSystem;
use readqc::tasks::{AllSamplesQcWrapper, TaskPlan, WRAPPER_TASK};
use readqc_test_utils::builders::ConfigFileBuilder;
use readqc_test_utils::{init_tracing, mock_fs_with_reads};

fn plan_for(builder: ConfigFileBuilder, fs: &MockFileSystem) -> TaskPlan {
    let fan_out = AllSamplesQcWrapper::from_config(&builder.build())
        .with_inherited_path(None)
        .build(fs)
        .unwrap();
    fan_out.plan.validate().unwrap();
    fan_out.plan
}

fn names(tasks: &[readqc::dag::ScheduledTask]) -> Vec<&str> {
    tasks.iter().map(|t| t.name.as_str()).collect()
}

fn two_samples(fs: &MockFileSystem) -> TaskPlan {
    for f in ["/raw/A_1.fq", "/raw/A_2.fq", "/raw/B_1.fq", "/raw/B_2.fq"] {
        fs.add_file(f, "@r\nACGT\n+\nIIII\n");
    }
    plan_for(
        ConfigFileBuilder::new("/w", "/opt/bin")
            .with_pair("A", "/raw/A_1.fq", "/raw/A_2.fq")
            .with_pair("B", "/raw/B_1.fq", "/raw/B_2.fq"),
        fs,
    )
}

#[test]
fn existing_inputs_are_not_rechecked_and_qc_runs() {
    init_tracing();
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);
    assert_eq!(names(&ready), vec!["qc:A", "qc:B"]);

    assert_eq!(
        scheduler.run_state_of("input:/raw/A_1.fq"),
        Some(TaskRunState::AlreadyComplete)
    );
    assert_eq!(scheduler.run_state_of(WRAPPER_TASK), Some(TaskRunState::Pending));

    assert!(scheduler.handle_completion("qc:A", TaskOutcome::Success).is_empty());
    let ready = scheduler.handle_completion("qc:B", TaskOutcome::Success);
    assert_eq!(names(&ready), vec![WRAPPER_TASK]);

    let step = scheduler.step_completion(WRAPPER_TASK, TaskOutcome::Success);
    assert!(step.run_just_finished);
    assert!(scheduler.is_idle());

    let summary = scheduler.summary();
    assert!(summary.is_success());
    assert_eq!(summary.succeeded, vec!["qc:A", "qc:B", WRAPPER_TASK]);
    assert_eq!(summary.already_complete.len(), 4);
}

#[test]
fn existing_stats_file_skips_the_sample_entirely() {
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    fs.add_file("/w/A/trimming_results/A.stats.txt", "done");
    fs.add_file("/w/B/trimming_results/B.stats.txt", "done");
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);

    // Only the wrapper remains; the input checks below the complete QC
    // tasks are not even visited.
    assert_eq!(names(&ready), vec![WRAPPER_TASK]);
    assert_eq!(scheduler.run_state_of("qc:A"), Some(TaskRunState::AlreadyComplete));
    assert_eq!(
        scheduler.run_state_of("input:/raw/A_1.fq"),
        Some(TaskRunState::NotInRun)
    );

    scheduler.handle_completion(WRAPPER_TASK, TaskOutcome::Success);
    assert!(scheduler.is_idle());
    assert!(scheduler.summary().succeeded == vec![WRAPPER_TASK.to_string()]);
}

#[test]
fn missing_input_blocks_its_sample_only() {
    let fs = MockFileSystem::new();
    fs.add_file("/raw/A_1.fq", "x");
    fs.add_file("/raw/B_1.fq", "x");
    fs.add_file("/raw/B_2.fq", "x");
    let plan = plan_for(
        ConfigFileBuilder::new("/w", "/opt/bin")
            .with_pair("A", "/raw/A_1.fq", "/raw/A_2.fq")
            .with_pair("B", "/raw/B_1.fq", "/raw/B_2.fq"),
        &fs,
    );
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);
    assert_eq!(names(&ready), vec!["input:/raw/A_2.fq", "qc:B"]);

    let missing = PathBuf::from("/raw/A_2.fq");
    let step = scheduler.step_completion(
        "input:/raw/A_2.fq",
        TaskOutcome::Failed(TaskFailure::MissingInput(missing.clone())),
    );
    assert_eq!(step.newly_failed, vec!["input:/raw/A_2.fq"]);
    let blocked: HashSet<_> = step.newly_blocked.into_iter().collect();
    assert_eq!(
        blocked,
        HashSet::from(["qc:A".to_string(), WRAPPER_TASK.to_string()])
    );
    assert!(!step.run_just_finished);

    let step = scheduler.step_completion("qc:B", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(step.run_just_finished);

    let summary = scheduler.summary();
    assert!(!summary.is_success());
    assert_eq!(summary.succeeded, vec!["qc:B"]);
    assert_eq!(
        summary.failed,
        vec![(
            "input:/raw/A_2.fq".to_string(),
            TaskFailure::MissingInput(missing)
        )]
    );
    assert_eq!(summary.blocked, vec!["qc:A", WRAPPER_TASK]);
}

#[test]
fn qc_failure_is_recorded_with_its_exit_code() {
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    scheduler.start_run(plan.goals(), &completed);
    scheduler.handle_completion("qc:A", TaskOutcome::Failed(TaskFailure::ExitCode(3)));
    scheduler.handle_completion("qc:B", TaskOutcome::Success);

    assert!(scheduler.is_idle());
    assert_eq!(scheduler.failure_of("qc:A"), Some(&TaskFailure::ExitCode(3)));
    assert_eq!(scheduler.run_state_of(WRAPPER_TASK), Some(TaskRunState::Blocked));
}

#[test]
fn fragments_are_concatenated_before_qc() {
    let fs = mock_fs_with_reads(&["/raw/a1", "/raw/b1", "/raw/a2", "/raw/b2"]);
    let plan = plan_for(
        ConfigFileBuilder::new("/w", "/opt/bin").with_fragments(
            "S",
            &["/raw/a1", "/raw/b1"],
            &["/raw/a2", "/raw/b2"],
        ),
        &fs,
    );
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);
    assert_eq!(names(&ready), vec!["concat:S:R1", "concat:S:R2"]);
    assert_eq!(scheduler.deps_satisfied("qc:S"), Some(false));

    assert!(scheduler.handle_completion("concat:S:R1", TaskOutcome::Success).is_empty());
    let ready = scheduler.handle_completion("concat:S:R2", TaskOutcome::Success);
    assert_eq!(names(&ready), vec!["qc:S"]);
}

#[test]
fn completed_concatenation_is_not_redone() {
    let fs = mock_fs_with_reads(&["/raw/a1", "/raw/b1", "/raw/a2", "/raw/b2"]);
    let plan = plan_for(
        ConfigFileBuilder::new("/w", "/opt/bin").with_fragments(
            "S",
            &["/raw/a1", "/raw/b1"],
            &["/raw/a2", "/raw/b2"],
        ),
        &fs,
    );
    fs.add_file("/w/S/trimming_results/S_R1.fastq", "xx");
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);
    assert_eq!(names(&ready), vec!["concat:S:R2"]);
}

#[test]
fn stray_completions_are_ignored() {
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);

    // No active run yet.
    let step = scheduler.step_completion("qc:A", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());

    scheduler.start_run(plan.goals(), &completed);

    // Wrapper is pending, not running.
    let step = scheduler.step_completion(WRAPPER_TASK, TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert_eq!(scheduler.run_state_of(WRAPPER_TASK), Some(TaskRunState::Pending));

    let step = scheduler.step_completion("no-such-task", TaskOutcome::Success);
    assert!(step.newly_scheduled.is_empty());
    assert!(!scheduler.is_idle());
}

#[test]
fn manual_start_step_reports_ready_tasks_and_ignores_a_second_start() {
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    fs.add_file("/w/A/trimming_results/A.stats.txt", "done");
    let completed = completed_tasks(&plan, &fs);

    let mut scheduler = Scheduler::from_plan(&plan);
    let step = scheduler.step_start(plan.goals(), &completed);
    assert_eq!(names(&step.newly_scheduled), vec!["qc:B"]);
    assert!(step.newly_failed.is_empty());
    assert!(!step.run_just_finished);

    let again = scheduler.step_start(plan.goals(), &completed);
    assert!(again.newly_scheduled.is_empty());
    assert_eq!(scheduler.run_state_of("qc:B"), Some(TaskRunState::Running));
}

#[tokio::test]
async fn directory_in_place_of_a_read_file_fails_the_input_check() {
    let fs = MockFileSystem::new();
    fs.add_dir("/raw/A_1.fq");
    fs.add_file("/raw/A_2.fq", "x");
    let plan = plan_for(
        ConfigFileBuilder::new("/w", "/opt/bin").with_pair("A", "/raw/A_1.fq", "/raw/A_2.fq"),
        &fs,
    );
    let completed = completed_tasks(&plan, &fs);
    assert!(!completed.contains("input:/raw/A_1.fq"));
    assert!(completed.contains("input:/raw/A_2.fq"));

    let mut scheduler = Scheduler::from_plan(&plan);
    let ready = scheduler.start_run(plan.goals(), &completed);
    assert_eq!(names(&ready), vec!["input:/raw/A_1.fq"]);

    let (tx, mut rx) = mpsc::channel(4);
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    run_task(ready[0].clone(), shared, tx).await;

    match rx.recv().await {
        Some(RuntimeEvent::TaskCompleted { task, outcome }) => {
            assert_eq!(task, "input:/raw/A_1.fq");
            assert_eq!(
                outcome,
                TaskOutcome::Failed(TaskFailure::MissingInput(PathBuf::from("/raw/A_1.fq")))
            );
        }
        other => panic!("expected a completion event, got {other:?}"),
    }
}

#[test]
fn directory_named_like_the_stats_file_does_not_complete_a_sample() {
    let fs = MockFileSystem::new();
    let plan = two_samples(&fs);
    fs.add_dir("/w/A/trimming_results/A.stats.txt");
    let completed = completed_tasks(&plan, &fs);
    assert!(!completed.contains("qc:A"));
}
