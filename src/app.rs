//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging and exit codes; this module parses the
//! CLI, runs the matching pipeline and prints or exports the results.

use std::path::Path;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, ConfigArgs, DemoArgs, FetchArgs, OutputArgs, RunArgs};
use crate::config::EngineConfig;
use crate::data::{FredClient, ScenarioConfig};
use crate::error::AppError;
use crate::orchestrator::RunOutcome;

pub mod pipeline;

/// Entry point for the `regime` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Demo(args) => handle_demo(args),
        Command::Fetch(args) => handle_fetch(args),
        Command::Config(args) => handle_config(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, AppError> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = load_config(args.config.as_deref())?;
    let outcome = pipeline::run_from_dir(&config, &args.data_dir, Utc::now())?;
    present(&outcome, &args.output)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let scenario = ScenarioConfig {
        years: args.years,
        seed: args.seed,
        cycle_days: args.cycle_days,
        ..ScenarioConfig::default()
    };
    let outcome = pipeline::run_demo(&scenario, &EngineConfig::default(), Utc::now())?;
    present(&outcome, &args.output)
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = load_config(args.config.as_deref())?;
    let client = FredClient::from_env()?;
    let summary = pipeline::fetch_into_dir(&config, &args.data_dir, args.refresh, |id, start| {
        client.fetch_series(id, start)
    })?;

    println!(
        "Fetched {} | reused {} | skipped {} | failed {}",
        summary.written.len(),
        summary.reused.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    for (id, message) in &summary.failed {
        println!("  {id}: {message}");
    }
    Ok(())
}

fn handle_config(args: ConfigArgs) -> Result<(), AppError> {
    if args.out.exists() && !args.force {
        return Err(AppError::new(
            2,
            format!("'{}' already exists (use --force to overwrite).", args.out.display()),
        ));
    }
    EngineConfig::default().save(&args.out)?;
    println!("Wrote default config to {}", args.out.display());
    Ok(())
}

fn present(outcome: &RunOutcome, output: &OutputArgs) -> Result<(), AppError> {
    let response = outcome.response();
    if outcome.is_partial() {
        info!(warnings = outcome.warnings().len(), "partial result");
    }

    if output.json {
        let json = serde_json::to_string_pretty(response)
            .map_err(|e| AppError::new(2, format!("Failed to serialize response: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_run_summary(response));
        if !output.brief {
            print!("{}", crate::report::format_correlations(response));
            println!("{}", crate::report::format_trigger_stats(response));
        }
    }

    if let Some(path) = &output.export {
        crate::io::write_response_json(path, response)?;
        info!(path = %path.display(), "response exported");
    }
    Ok(())
}
