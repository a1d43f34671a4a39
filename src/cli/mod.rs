//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Functional test case generation and execution for websites
#[derive(Parser, Debug)]
#[command(name = "sitetest")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Generate, review and run functional test cases for a website")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (overrides SITETEST_CONFIG and the search path)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate test cases for a website
    Generate(GenerateArgs),

    /// Run test cases and print the report
    Run(RunArgs),

    /// Configuration management
    Config(ConfigArgs),
}

/// Arguments for generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Website URL
    #[arg(short, long)]
    pub url: String,

    /// Read test cases from a JSON/YAML file instead of the generation service
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Save generated test cases for review (JSON or YAML by extension)
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Arguments for run command
#[derive(Parser, Debug)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["url", "cases"])
))]
pub struct RunArgs {
    /// Website URL to generate test cases for
    #[arg(short, long)]
    pub url: Option<String>,

    /// Previously saved test cases (JSON or YAML)
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Run only this test case (1-based)
    #[arg(short, long)]
    pub test: Option<usize>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the report to file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per test case timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Output file path
        #[arg(short, long, default_value = "./sitetest.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variable overrides instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// List supported environment variables
    Env,
}
