// src/main.rs

use std::process::ExitCode;

use readqc::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    // Return rather than `process::exit`: in-flight children die on drop.
    match run_main().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("readqc error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every goal completed.
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
