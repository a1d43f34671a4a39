//! sitetest - functional test case generation and execution for websites
//!
//! Generates functional test cases for an e-commerce website, lets them be
//! reviewed and edited, then runs them one by one or as a sequential batch
//! and summarizes the outcome in a report.
//!
//! ## Features
//!
//! - Test case generation through any OpenAI-compatible endpoint
//! - Offline review: save generated cases to JSON/YAML, edit, run later
//! - Sequential batch execution with live progress
//! - Multiple output formats (Table, JSON, CSV, Summary)
//!
//! ## Usage
//!
//! ```bash
//! # Generate test cases and save them for review
//! sitetest generate --url https://shop.example.com --save cases.yaml
//!
//! # Run the reviewed test cases
//! sitetest run --cases cases.yaml
//!
//! # Generate and run in one go, only the third test case
//! sitetest run --url https://shop.example.com --test 3
//!
//! # Write a default configuration file
//! sitetest config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod cli;
mod config;
mod events;
mod executor;
mod generation;
mod models;
mod output;
mod report;
mod store;
mod utils;

use cli::Args;
use config::{AppConfig, EnvConfig};
use events::RunEvent;
use executor::{ExecutionEngine, SimulatedExecutor};
use generation::{generate_test_cases, save_test_cases, FileGenerator, LlmGenerator};
use models::{TestCaseContent, TestCaseId};
use output::{OutputFormat, ReportFormatter};
use store::TestCaseStore;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::resolve(args.config.as_deref())?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log_level.parse::<LogLevel>().unwrap_or_default()
    };
    init_logger(level);

    match args.command {
        cli::Command::Generate(generate_args) => {
            generate(generate_args, &config).await?;
        }
        cli::Command::Run(run_args) => {
            run_tests(run_args, &config).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &config)?;
        }
    }

    Ok(())
}

fn output_format(requested: Option<&str>, config: &AppConfig) -> Result<OutputFormat> {
    requested
        .unwrap_or(config.output_format.as_str())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
}

/// Obtain raw test cases from a file, the generation service, or both
async fn load_cases(
    url: Option<&str>,
    cases: Option<&Path>,
    config: &AppConfig,
) -> Result<Vec<TestCaseContent>> {
    let raw_cases = match (url, cases) {
        (Some(url), Some(path)) => generate_test_cases(&FileGenerator::new(path), url).await?,
        (Some(url), None) => {
            let generator = LlmGenerator::from_config(&config.generation)?;
            generate_test_cases(&generator, url).await?
        }
        (None, Some(path)) => FileGenerator::new(path).load()?,
        (None, None) => anyhow::bail!("Either --url or --cases is required"),
    };

    if raw_cases.is_empty() {
        anyhow::bail!("No test cases to run");
    }
    Ok(raw_cases)
}

async fn generate(args: cli::GenerateArgs, config: &AppConfig) -> Result<()> {
    let format = output_format(args.format.as_deref(), config)?;
    let raw_cases = load_cases(Some(&args.url), args.cases.as_deref(), config).await?;

    let mut store = TestCaseStore::new();
    let records = store.seed(raw_cases.clone());
    println!("{}", ReportFormatter::new(format).format_cases(records));

    if let Some(path) = args.save {
        save_test_cases(&path, &raw_cases)?;
        println!("✓ Saved {} test cases to {}", raw_cases.len(), path.display());
    }

    Ok(())
}

async fn run_tests(args: cli::RunArgs, config: &AppConfig) -> Result<()> {
    let format = output_format(args.format.as_deref(), config)?;
    let raw_cases = load_cases(args.url.as_deref(), args.cases.as_deref(), config).await?;

    let executor = Arc::new(SimulatedExecutor::from_config(&config.simulation));
    let engine = match args.timeout.or(config.execution.timeout_secs) {
        Some(0) => anyhow::bail!("Timeout must be greater than zero"),
        Some(secs) => ExecutionEngine::new(executor).with_timeout(Duration::from_secs(secs)),
        None => ExecutionEngine::new(executor),
    };

    let records = engine.seed(raw_cases).await?;
    info!("Loaded {} test cases", records.len());

    let formatter = ReportFormatter::new(format);
    let mut events = engine.subscribe();
    let printer = tokio::spawn(async move {
        let progress = ReportFormatter::new(OutputFormat::Summary);
        while let Some(event) = events.recv().await {
            match event {
                RunEvent::RecordUpdated(record) if record.status.is_terminal() => {
                    eprintln!("  {record}");
                }
                RunEvent::Progress(p) => eprintln!("{}", progress.format_progress(&p)),
                RunEvent::ExecutorFailed { id, message } => eprintln!("  ! {id}: {message}"),
                _ => {}
            }
        }
    });

    if let Some(number) = args.test {
        if number == 0 || number > records.len() {
            anyhow::bail!(
                "Test number must be between 1 and {}, got {number}",
                records.len()
            );
        }
        let id = TestCaseId::from_index(number - 1);
        let status = engine.run_one(&id).await?;
        info!("{} finished: {}", id, status);
    } else {
        let outcome = engine.run_all().await?;
        info!(
            "Batch finished in {}ms ({} passed, {} failed)",
            outcome.duration_ms, outcome.passed, outcome.failed
        );
    }

    let report = engine.report().await;
    // Closing the event bus ends the printer task
    drop(engine);
    printer.await.context("Progress printer panicked")?;

    println!("{}", formatter.format_report(&report));

    if let Some(path) = args.output {
        let content = ReportFormatter::new(format).no_color().format_report(&report);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("✓ Report saved to {}", path.display());
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, current: &AppConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            AppConfig::default().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                EnvConfig::load().print_summary();
            } else {
                let mut shown = current.clone();
                if shown.generation.api_key.is_some() {
                    shown.generation.api_key = Some("<set>".to_string());
                }
                let output = if format == "json" {
                    serde_json::to_string_pretty(&shown)?
                } else {
                    serde_yaml::to_string(&shown)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}
