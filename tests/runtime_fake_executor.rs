// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use readqc::dag::{Scheduler, completed_tasks};
use readqc::engine::{CoreCommand, CoreRuntime, RunSummary, Runtime, RuntimeEvent, TaskFailure};
use readqc::fs::mock::MockFileSystem;
use readqc::tasks::{AllSamplesQcWrapper, PrepareFailure, TaskPlan, WRAPPER_TASK};
use readqc_test_utils::builders::ConfigFileBuilder;
use readqc_test_utils::fake_executor::FakeExecutor;
use readqc_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn fragmented_and_paired(fs: &MockFileSystem) -> TaskPlan {
    for f in ["/raw/a1", "/raw/b1", "/raw/a2", "/raw/b2", "/raw/P_1", "/raw/P_2"] {
        fs.add_file(f, "x");
    }
    let cfg = ConfigFileBuilder::new("/w", "/opt/bin")
        .with_fragments("F", &["/raw/a1", "/raw/b1"], &["/raw/a2", "/raw/b2"])
        .with_pair("P", "/raw/P_1", "/raw/P_2")
        .build();
    let fan_out = AllSamplesQcWrapper::from_config(&cfg)
        .with_inherited_path(None)
        .build(fs)
        .unwrap();
    fan_out.plan.validate().unwrap();
    fan_out.plan
}

async fn run_once(
    plan: &TaskPlan,
    fs: &MockFileSystem,
    executor: impl FnOnce(mpsc::Sender<RuntimeEvent>) -> FakeExecutor,
) -> readqc::errors::Result<RunSummary> {
    let completed = completed_tasks(plan, fs);
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let core = CoreRuntime::new(Scheduler::from_plan(plan));
    let runtime = Runtime::new(core, rt_rx, executor(rt_tx));
    with_timeout(runtime.run(plan.goals(), &completed)).await
}

#[tokio::test]
async fn runtime_runs_every_sample_to_completion() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let plan = fragmented_and_paired(&fs);
    let executed = Arc::new(Mutex::new(Vec::new()));

    let summary = run_once(&plan, &fs, |tx| {
        FakeExecutor::new(tx, executed.clone()).writing_outputs_to(fs.clone())
    })
    .await?;

    assert!(summary.is_success());
    let tasks_run = executed.lock().unwrap().clone();
    assert_eq!(
        tasks_run,
        vec!["concat:F:R1", "concat:F:R2", "qc:P", "qc:F", WRAPPER_TASK]
    );
    assert!(fs.contents("/w/F/trimming_results/F.stats.txt").is_some());

    Ok(())
}

#[tokio::test]
async fn rerun_after_success_dispatches_only_the_wrapper() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let plan = fragmented_and_paired(&fs);

    let first = Arc::new(Mutex::new(Vec::new()));
    run_once(&plan, &fs, |tx| {
        FakeExecutor::new(tx, first.clone()).writing_outputs_to(fs.clone())
    })
    .await?;

    let second = Arc::new(Mutex::new(Vec::new()));
    let summary = run_once(&plan, &fs, |tx| FakeExecutor::new(tx, second.clone())).await?;

    assert!(summary.is_success());
    assert_eq!(*second.lock().unwrap(), vec![WRAPPER_TASK]);
    assert_eq!(summary.already_complete, vec!["qc:F", "qc:P"]);

    Ok(())
}

#[tokio::test]
async fn failing_sample_does_not_stop_the_other() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let plan = fragmented_and_paired(&fs);
    let executed = Arc::new(Mutex::new(Vec::new()));

    let summary = run_once(&plan, &fs, |tx| {
        FakeExecutor::new(tx, executed.clone()).failing(
            "concat:F:R2",
            TaskFailure::Io("disk full".to_string()),
        )
    })
    .await?;

    assert!(!summary.is_success());
    assert!(summary.is_failed("concat:F:R2"));
    assert!(summary.succeeded.contains(&"qc:P".to_string()));
    assert_eq!(summary.blocked, vec!["qc:F", WRAPPER_TASK]);
    assert!(!executed.lock().unwrap().contains(&"qc:F".to_string()));

    let report = summary.to_string();
    assert!(report.contains("concat:F:R2 (disk full)"));
    assert!(report.contains(":("));

    Ok(())
}

#[tokio::test]
async fn complete_samples_leave_only_the_wrapper() -> TestResult {
    let fs = MockFileSystem::new();
    let plan = fragmented_and_paired(&fs);

    let mut core = CoreRuntime::new(Scheduler::from_plan(&plan));
    let mut completed = completed_tasks(&plan, &fs);
    completed.insert("qc:F".to_string());
    completed.insert("qc:P".to_string());

    let step = core.start(plan.goals(), &completed);
    assert!(step.keep_running);
    match step.commands.as_slice() {
        [CoreCommand::DispatchTasks(tasks)] => {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].name, WRAPPER_TASK);
        }
        other => panic!("unexpected commands: {other:?}"),
    }

    let step = core.step(RuntimeEvent::TaskCompleted {
        task: WRAPPER_TASK.to_string(),
        outcome: readqc::engine::TaskOutcome::Success,
    });
    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    assert!(core.is_idle());

    Ok(())
}

#[tokio::test]
async fn shutdown_reports_unfinished_tasks() -> TestResult {
    let fs = MockFileSystem::new();
    let plan = fragmented_and_paired(&fs);
    let completed = completed_tasks(&plan, &fs);

    let mut core = CoreRuntime::new(Scheduler::from_plan(&plan));
    core.start(plan.goals(), &completed);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(!step.keep_running);

    let summary = core.summary();
    assert!(!summary.is_success());
    assert!(summary.unfinished.contains(&"qc:P".to_string()));
    assert!(summary.unfinished.contains(&WRAPPER_TASK.to_string()));
    assert_eq!(summary.failure_causes(), vec!["the run was interrupted"]);
    assert!(summary.to_string().ends_with(":( because the run was interrupted"));

    Ok(())
}

#[test]
fn summary_names_each_cause_of_an_unsuccessful_run() {
    let prepared_badly = RunSummary {
        succeeded: vec![WRAPPER_TASK.to_string()],
        prepare_failures: vec![PrepareFailure {
            sample: "S".to_string(),
            error: "permission denied".to_string(),
        }],
        ..RunSummary::default()
    };
    let text = prepared_badly.to_string();
    assert!(text.contains("    - S: permission denied"), "{text}");
    assert!(text.ends_with(":( because some samples could not be prepared"), "{text}");

    let mixed = RunSummary {
        failed: vec![("qc:A".to_string(), TaskFailure::ExitCode(2))],
        blocked: vec![WRAPPER_TASK.to_string()],
        unfinished: vec!["qc:B".to_string()],
        ..RunSummary::default()
    };
    assert_eq!(
        mixed.failure_causes(),
        vec!["there were failed tasks", "the run was interrupted"]
    );

    let clean = RunSummary::default();
    assert!(clean.failure_causes().is_empty());
    assert!(clean.to_string().ends_with(":) because there were no failed tasks"));
}
