//! prompteval - prompt evaluation harness
//!
//! Runs an LLM invocation spec against input/expected-output pairs and
//! reports how many outputs match.
//!
//! ## Commands
//!
//! - `generate`: Synthesize new test cases from a spec's system prompt
//! - `test`: Run every case in a case file
//! - `run`: Run one case by zero-based index
//! - `eval`: Run a multi-suite eval plan

mod commands;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::CommandContext;
use prompteval_evals::{ConsoleListener, DEFAULT_CASE_COUNT, DEFAULT_GENERATOR_MODEL};
use prompteval_models::{OpenAIChatModel, SharedModel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "prompteval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate LLM prompts against expected outputs", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Provider endpoint (OpenAI-compatible)
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test cases and append them to a case file
    Generate {
        /// Invocation spec file (.json, .yaml, .yml)
        #[arg(short, long)]
        prompt: PathBuf,

        /// Case file to extend (created if absent)
        #[arg(short, long)]
        testcases: PathBuf,

        /// Number of new cases
        #[arg(short, long, default_value_t = DEFAULT_CASE_COUNT)]
        num: usize,

        /// Model used to write the cases
        #[arg(long, default_value = DEFAULT_GENERATOR_MODEL)]
        generator_model: String,
    },

    /// Run every test case against a prompt
    Test {
        /// Invocation spec file (.json, .yaml, .yml)
        #[arg(short, long)]
        prompt: PathBuf,

        /// Case file (.json, .yaml, .yml)
        #[arg(short, long)]
        testcases: PathBuf,

        /// Evaluation type: strict or json
        #[arg(short, long, default_value = "strict")]
        eval: String,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run a single test case by index
    Run {
        /// Invocation spec file (.json, .yaml, .yml)
        #[arg(short, long)]
        prompt: PathBuf,

        /// Case file (.json, .yaml, .yml)
        #[arg(short, long)]
        testcases: PathBuf,

        /// Zero-based case index
        #[arg(short, long)]
        index: usize,

        /// Evaluation type: strict or json
        #[arg(short, long, default_value = "strict")]
        eval: String,
    },

    /// Run an eval plan covering several suites
    Eval {
        /// Eval plan file (.json, .yaml, .yml)
        #[arg(short, long)]
        file: PathBuf,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn build_model(cli: &Cli) -> Result<SharedModel> {
    let mut model = OpenAIChatModel::from_env()
        .context("checking provider credentials")?
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(ref url) = cli.base_url {
        debug!(base_url = %url, "using custom provider endpoint");
        model = model.with_base_url(url);
    }
    Ok(Arc::new(model))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(cli.log_json, level);

    let model = build_model(&cli)?;
    let ctx = CommandContext::new(model, Arc::new(ConsoleListener::stdout()));

    match cli.command {
        Commands::Generate {
            prompt,
            testcases,
            num,
            generator_model,
        } => {
            commands::cmd_generate(&ctx, &prompt, &testcases, num, &generator_model).await?;
        }
        Commands::Test {
            prompt,
            testcases,
            eval,
            report,
        } => {
            commands::cmd_test(&ctx, &prompt, &testcases, &eval, report.as_deref()).await?;
        }
        Commands::Run {
            prompt,
            testcases,
            index,
            eval,
        } => {
            commands::cmd_run(&ctx, &prompt, &testcases, index, &eval).await?;
        }
        Commands::Eval { file, report } => {
            commands::cmd_eval(&ctx, &file, report.as_deref()).await?;
        }
    }

    Ok(())
}
