//! testforge - generate, run and repair Python unit tests with a generative model
//!
//! Discovers modules under the source root, writes one `test_<module>.py` per
//! module into the test directory, runs each with the selected Python test
//! runner and, after a single confirmation, asks the model to repair the
//! files that failed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use testforge_core::{
    init_tracing, write_run_report, ApprovalProvider, ConsoleApproval, FixedApproval,
    GeminiBackend, LayoutConfig, ModelClient, ModelConfig, PipelineRun, PythonCompileCheck,
    RunReport,
};
use testforge_pipeline::{BuiltinRunner, Pipeline, PipelineConfig, ProcessTestRunner, RunnerConfig};

#[derive(Parser)]
#[command(name = "testforge")]
#[command(version = testforge_core::VERSION)]
#[command(about = "Generate, run and repair Python unit tests with a generative model", long_about = None)]
struct Cli {
    /// Directory scanned recursively for Python modules
    #[arg(long, default_value = "src")]
    source_root: PathBuf,

    /// Directory that receives generated test files
    #[arg(long, default_value = "tests")]
    test_dir: PathBuf,

    /// Model name
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Backend base URL
    #[arg(long, env = "GEMINI_ENDPOINT")]
    endpoint: Option<String>,

    /// API key for the generative backend
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request deadline for model calls, in seconds
    #[arg(long, default_value_t = 120)]
    request_timeout: u64,

    /// Test runner (unittest or pytest)
    #[arg(long, default_value = "unittest")]
    runner: BuiltinRunner,

    /// Python interpreter used to run tests and to compile-check repairs
    #[arg(long, default_value = "python3")]
    python: String,

    /// Per-file test timeout in seconds (0 = none)
    #[arg(long, default_value_t = 300)]
    runner_timeout: u64,

    /// Approve repair of failing tests without prompting
    #[arg(long, conflicts_with = "no_repair")]
    yes: bool,

    /// Never repair failing tests
    #[arg(long)]
    no_repair: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let model_config = model_config(&cli).context("Failed to configure the model backend")?;
    let call_timeout = model_config.request_timeout;
    let backend = GeminiBackend::new(model_config).context("Failed to build the model backend")?;
    let client = ModelClient::new(Arc::new(backend)).with_call_timeout(call_timeout);

    let runner = ProcessTestRunner::new(RunnerConfig {
        runner: cli.runner,
        python: cli.python.clone(),
        timeout_secs: cli.runner_timeout,
    });

    let layout = LayoutConfig {
        source_root: cli.source_root.clone(),
        test_dir: cli.test_dir.clone(),
    };
    let pipeline = Pipeline::new(
        PipelineConfig::new(layout),
        client,
        Arc::new(runner),
        approval_for(&cli),
    )
    .with_validator(Arc::new(PythonCompileCheck::new(cli.python.clone())));

    let run = pipeline
        .run()
        .await
        .with_context(|| format!("Pipeline failed for {}", cli.source_root.display()))?;

    if let Some(path) = &cli.report {
        write_report(path, &run, &cli.source_root, &cli.test_dir)?;
    }

    info!("Processing complete");
    Ok(())
}

/// CLI flags, falling back to the environment through clap, then to defaults.
fn model_config(cli: &Cli) -> Result<ModelConfig> {
    let mut config = ModelConfig::new(cli.api_key.clone().unwrap_or_default())?
        .with_request_timeout(Duration::from_secs(cli.request_timeout));
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    config.validate()?;
    Ok(config)
}

fn approval_for(cli: &Cli) -> Arc<dyn ApprovalProvider> {
    if cli.yes {
        Arc::new(FixedApproval(true))
    } else if cli.no_repair {
        Arc::new(FixedApproval(false))
    } else {
        Arc::new(ConsoleApproval)
    }
}

fn write_report(path: &Path, run: &PipelineRun, source_root: &Path, test_dir: &Path) -> Result<()> {
    let report = RunReport::from_run(run, source_root, test_dir);
    write_run_report(path, &report)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    info!(path = %path.display(), "Run report written");
    Ok(())
}
