// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod tasks;
pub mod types;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::config::ConfigFile;
use crate::dag::{Scheduler, completed_tasks};
use crate::engine::{CoreRuntime, RunSummary, Runtime, RuntimeEvent};
use crate::exec::RealExecutorBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::tasks::{AllSamplesQcWrapper, FanOut, TaskAction};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - sample fan-out and plan validation
/// - scheduler / runtime
/// - executor
/// - Ctrl-C handling
///
/// Returns whether every goal completed.
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be at least 1");
        }
        cfg.config.workers = workers;
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        let wrapper = AllSamplesQcWrapper::from_config(&cfg).with_sample_filter(args.samples);
        let fan_out = wrapper.plan_only(fs.as_ref())?;
        fan_out.plan.validate()?;
        print_dry_run(&cfg, &fan_out, fs.as_ref());
        return Ok(true);
    }

    let summary = run_config(&cfg, args.samples, fs).await?;
    println!("{summary}");
    Ok(summary.is_success())
}

/// Build the plan for `cfg` (optionally restricted to `samples`), execute it
/// and return the per-task outcome. Ctrl-C stops the run early.
pub async fn run_config(
    cfg: &ConfigFile,
    samples: Vec<String>,
    fs: Arc<dyn FileSystem>,
) -> Result<RunSummary> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    run_config_until(cfg, samples, fs, ctrl_c).await
}

/// Like [`run_config`], but the run is interrupted when `shutdown` resolves.
///
/// Tasks that have not finished by then are reported as unfinished and any
/// QC process still running is killed before this returns.
pub async fn run_config_until<F>(
    cfg: &ConfigFile,
    samples: Vec<String>,
    fs: Arc<dyn FileSystem>,
    shutdown: F,
) -> Result<RunSummary>
where
    F: Future<Output = ()> + Send + 'static,
{
    let wrapper = AllSamplesQcWrapper::from_config(cfg).with_sample_filter(samples);
    let FanOut {
        plan,
        prepare_failures,
    } = wrapper.build(fs.as_ref())?;
    plan.validate()?;

    let completed = completed_tasks(&plan, fs.as_ref());
    info!(
        tasks = plan.len(),
        complete = completed.len(),
        "task plan ready"
    );

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), Arc::clone(&fs), cfg.config.workers);

    let shutdown_task = {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        })
    };

    let core = CoreRuntime::new(Scheduler::from_plan(&plan));
    let runtime = Runtime::new(core, rt_rx, executor);
    let result = runtime.run(plan.goals(), &completed).await;
    shutdown_task.abort();

    let mut summary = result?;
    summary.prepare_failures = prepare_failures;
    Ok(summary)
}

/// Simple dry-run output: print tasks, requirements and commands.
fn print_dry_run(cfg: &ConfigFile, fan_out: &FanOut, fs: &dyn FileSystem) {
    let completed = completed_tasks(&fan_out.plan, fs);

    println!("readqc dry-run");
    println!("  config.workdir = {}", cfg.config.workdir.display());
    println!("  config.bindir = {}", cfg.config.bindir.display());
    println!("  config.num_cpus = {}", cfg.config.num_cpus);
    println!("  config.workers = {}", cfg.config.workers);
    println!();

    println!("tasks ({}):", fan_out.plan.len());
    for task in fan_out.plan.tasks() {
        let status = if completed.contains(&task.name) {
            "complete"
        } else {
            "pending"
        };
        println!("  - {} [{}]", task.name, status);
        if let Some(ref output) = task.output {
            println!("      output: {output}");
        }
        if !task.requires.is_empty() {
            println!("      requires: {:?}", task.requires);
        }
        match &task.action {
            TaskAction::Concatenate { sources } => {
                println!("      concat: {sources:?}");
            }
            TaskAction::RunQc(spec) => {
                println!("      cmd: {}", spec.command_line());
            }
            TaskAction::CheckExists | TaskAction::Aggregate => {}
        }
    }

    for failure in &fan_out.prepare_failures {
        println!("  ! {}: {}", failure.sample, failure.error);
    }

    debug!("dry-run complete (no execution)");
}
