//! # Clausewise CLI (`clausewise`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clausewise extract <FILE>` | Print extracted fields as JSON |
//! | `clausewise audit <FILE>` | Print the audit report as JSON |
//! | `clausewise eval` | Run the Q&A evaluation against a live API |
//!
//! ## Exit codes
//!
//! - `0` command completed (an evaluation with low scores still completes)
//! - `1` failure, including evaluation setup failures (health, fixtures, upload, questions)
//! - `2` invalid evaluation configuration

mod console;
mod input;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use clausewise_core::{extract_with_evidence, Auditor};
use clausewise_eval::{EvalConfig, Harness, HttpContractApi};

use console::ConsoleObserver;

const EXIT_FAILURE: u8 = 1;
const EXIT_INVALID_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(
    name = "clausewise",
    about = "Contract field extraction, risk audit and Q&A evaluation",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract structured fields from a contract (PDF or text).
    Extract {
        file: PathBuf,

        /// Include evidence pointers for every extracted value.
        #[arg(long)]
        evidence: bool,
    },

    /// Audit a contract for missing clauses and risky language.
    Audit { file: PathBuf },

    /// Run the Q&A evaluation against a running API.
    Eval {
        /// YAML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// API base URL (overrides config and CLAUSEWISE_API_URL).
        #[arg(long)]
        base_url: Option<String>,

        /// Question set file (JSON).
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Where to write the results artifact.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Extract { file, evidence } => extract(file, evidence),
        Commands::Audit { file } => audit(file),
        Commands::Eval {
            config,
            base_url,
            questions,
            output,
        } => eval(config, base_url, questions, output).await,
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract(file: PathBuf, evidence: bool) -> Result<ExitCode> {
    let text = input::load_text(&file)?;
    let extraction = extract_with_evidence(&text);

    let json = if evidence {
        serde_json::to_string_pretty(&extraction)?
    } else {
        serde_json::to_string_pretty(&extraction.fields)?
    };
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn audit(file: PathBuf) -> Result<ExitCode> {
    let text = input::load_text(&file)?;
    let report = Auditor::new().audit(&text);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

async fn eval(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    questions: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = match load_config(config_path, base_url, questions, output) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            return Ok(ExitCode::from(EXIT_INVALID_CONFIG));
        }
    };

    let api = HttpContractApi::new(&config).context("Failed to build HTTP client")?;
    let observer = Arc::new(ConsoleObserver::new(config.scoring.pass_threshold));
    let results_path = config.results_path.clone();

    println!("Contract Intelligence API - Q&A Evaluation ({})", config.base_url);
    let mut harness = Harness::new(Arc::new(api), config).with_observer(observer);

    match harness.run().await {
        Ok(summary) => {
            println!("Detailed results saved to: {}", results_path.display());
            println!("{}", summary.one_line());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Evaluation aborted (last phase: {}): {e}", harness.phase());
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

/// File, then environment, then flags.
fn load_config(
    path: Option<PathBuf>,
    base_url: Option<String>,
    questions: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<EvalConfig> {
    let mut config = match &path {
        Some(path) => EvalConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => EvalConfig::default(),
    };
    config.apply_env();

    if let Some(url) = base_url {
        config.base_url = url;
    }
    if let Some(questions) = questions {
        config.question_set = questions;
    }
    if let Some(output) = output {
        config.results_path = output;
    }

    config.validate()?;
    Ok(config)
}
