// src/exec/task_runner.rs

//! Individual task action runner.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskFailure, TaskOutcome};
use crate::fs::{FileSystem, concat_files};
use crate::tasks::{RunSpec, TaskAction, Target};

/// Run a single task action and emit exactly one `TaskCompleted` event.
pub async fn run_task(
    task: ScheduledTask,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let task_name = task.name.clone();

    let outcome = match run_task_inner(&task, fs).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(task = %task_name, error = %format!("{err:#}"), "task execution error");
            TaskOutcome::Failed(TaskFailure::Io(format!("{err:#}")))
        }
    };

    if let Err(e) = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task_name.clone(),
            outcome,
        })
        .await
    {
        debug!(task = %task_name, error = %e, "runtime gone; dropping completion event");
    }
}

async fn run_task_inner(task: &ScheduledTask, fs: Arc<dyn FileSystem>) -> Result<TaskOutcome> {
    match &task.action {
        TaskAction::Aggregate => Ok(TaskOutcome::Success),
        TaskAction::CheckExists => Ok(check_exists(task, fs.as_ref())),
        TaskAction::Concatenate { sources } => {
            let Some(dest) = task.output.clone() else {
                anyhow::bail!("concatenation task '{}' has no output target", task.name);
            };
            let sources = sources.clone();
            let blocking_fs = Arc::clone(&fs);
            let dest_path = dest.path().to_path_buf();

            info!(
                task = %task.name,
                dest = %dest,
                fragments = sources.len(),
                "concatenating fragments"
            );

            tokio::task::spawn_blocking(move || {
                concat_files(blocking_fs.as_ref(), &sources, &dest_path)
            })
            .await
            .context("concatenation worker panicked")??;

            Ok(verify_output(task, Some(&dest), fs.as_ref()))
        }
        TaskAction::RunQc(spec) => {
            let code = run_program(task, spec).await?;
            if code != 0 {
                return Ok(TaskOutcome::Failed(TaskFailure::ExitCode(code)));
            }
            Ok(verify_output(task, task.output.as_ref(), fs.as_ref()))
        }
    }
}

fn check_exists(task: &ScheduledTask, fs: &dyn FileSystem) -> TaskOutcome {
    match &task.output {
        Some(target) if target.exists(fs) => TaskOutcome::Success,
        Some(target) => {
            if fs.exists(target.path()) {
                warn!(task = %task.name, path = %target, "required input is not a regular file");
            } else {
                warn!(task = %task.name, path = %target, "required input file is missing");
            }
            TaskOutcome::Failed(TaskFailure::MissingInput(target.path().to_path_buf()))
        }
        None => TaskOutcome::Failed(TaskFailure::Io(format!(
            "check task '{}' has no target",
            task.name
        ))),
    }
}

/// A task is only complete once its target exists, whatever the action said.
fn verify_output(task: &ScheduledTask, target: Option<&Target>, fs: &dyn FileSystem) -> TaskOutcome {
    match target {
        Some(target) if !target.exists(fs) => {
            warn!(task = %task.name, path = %target, "action finished but target is absent");
            TaskOutcome::Failed(TaskFailure::OutputMissing(target.path().to_path_buf()))
        }
        _ => TaskOutcome::Success,
    }
}

/// Spawn the QC program and wait for it; returns the exit code (-1 when
/// terminated by a signal).
async fn run_program(task: &ScheduledTask, spec: &RunSpec) -> Result<i32> {
    info!(
        task = %task.name,
        cmd = %spec.command_line(),
        "starting QC process"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {:?} for task '{}'", spec.program, task.name))?;

    // Always consume output so pipe buffers don't fill; log at debug.
    if let Some(stdout) = child.stdout.take() {
        drain_lines(task.name.clone(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        drain_lines(task.name.clone(), "stderr", stderr);
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", task.name))?;

    let code = status.code().unwrap_or(-1);
    info!(
        task = %task.name,
        exit_code = code,
        success = status.success(),
        "QC process exited"
    );

    Ok(code)
}

fn drain_lines<R>(task_name: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(task = %task_name, stream, "{}", line);
        }
    });
}
