//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 on any failure.

use super::commands::{ConfigArgs, HealthArgs, ReportArgs, RunArgs};
use super::output::{HealthStatus, OutputFormatter};
use crate::client::EvaluationBackend;
use crate::config::OptimizerConfig;
use crate::documents::DocumentKind;
use crate::metrics::EvaluationResult;
use crate::progress::LoggingHandler;
use crate::report::{parse_report, DirectorySink, ReportSink};
use crate::workflow::WorkflowController;
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

const GENERIC_MIME_TYPE: &str = "application/octet-stream";

/// What a `run` produced
#[derive(Debug)]
pub struct RunOutcome {
    pub result: Arc<EvaluationResult>,
    /// Files skipped because their type is not accepted
    pub rejected: Vec<String>,
    pub export_path: Option<String>,
}

/// Loads configuration from the environment and applies the `--api-url` override
pub fn load_config(api_url: Option<&str>) -> Result<OptimizerConfig> {
    let mut config = OptimizerConfig::default();
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_questions(args: &RunArgs) -> Result<Vec<String>> {
    let mut questions = args.questions.clone();

    if let Some(ref path) = args.questions_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read questions from {}", path.display()))?;
        questions.extend(text.lines().map(str::to_string));
    }

    Ok(questions)
}

fn read_document(path: &Path) -> Result<(String, Vec<u8>, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Not a file: {}", path.display()))?;
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime_type = DocumentKind::from_file_name(&name)
        .map(DocumentKind::mime_type)
        .unwrap_or(GENERIC_MIME_TYPE)
        .to_string();
    Ok((name, content, mime_type))
}

/// Runs upload, ingest and evaluate against `backend`
pub async fn run_evaluation(
    backend: Arc<dyn EvaluationBackend>,
    args: &RunArgs,
) -> Result<RunOutcome> {
    let questions = read_questions(args)?;
    let documents = args
        .files
        .iter()
        .map(|path| read_document(path))
        .collect::<Result<Vec<_>>>()?;

    let controller = WorkflowController::new(backend).with_progress(Arc::new(LoggingHandler));

    let staged = controller.stage_files(documents);
    for name in &staged.rejected {
        warn!(file = %name, "Skipping file: only PDF, TXT and DOCX documents are accepted");
    }
    if staged.accepted.is_empty() {
        bail!("None of the given files is a PDF, TXT or DOCX document");
    }

    let user_error = |e: crate::workflow::WorkflowError| {
        error!(error = %e, "Workflow step failed");
        anyhow!(e.user_message())
    };

    controller.submit_pending().await.map_err(user_error)?;
    controller.trigger_ingest().await.map_err(user_error)?;
    let result = controller
        .submit_questions(questions)
        .await
        .map_err(user_error)?;

    let export_path = match args.export {
        Some(ref dir) => {
            let report = controller.export_current().map_err(user_error)?;
            let path = DirectorySink::new(dir)
                .offer(&report)
                .with_context(|| format!("Failed to export report to {}", dir.display()))?;
            Some(path)
        }
        None => None,
    };

    Ok(RunOutcome {
        result,
        rejected: staged.rejected,
        export_path,
    })
}

pub async fn handle_run(args: &RunArgs, api_url: Option<&str>, quiet: bool) -> i32 {
    let outcome = async {
        let config = load_config(api_url)?;
        let client = config
            .create_client()
            .context("Failed to create evaluation client")?;
        info!(api_url = %config.api_url, "Starting evaluation run");
        run_evaluation(Arc::new(client), args).await
    }
    .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_result(&outcome.result) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    }

    if !quiet {
        for name in &outcome.rejected {
            eprintln!("Skipped unsupported file: {}", name);
        }
        if let Some(ref path) = outcome.export_path {
            eprintln!("Report saved to {}", path);
        }
    }

    0
}

/// Queries `/` and `/status`; a missing status does not make the service unhealthy
pub async fn check_health(backend: &dyn EvaluationBackend, api_url: &str) -> HealthStatus {
    match backend.health().await {
        Ok(health) => {
            let status = match backend.status().await {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(error = %e, "Status endpoint unavailable");
                    None
                }
            };
            HealthStatus::from_checks(api_url, health, status)
        }
        Err(e) => HealthStatus::unavailable(api_url, e.to_string()),
    }
}

pub async fn handle_health(args: &HealthArgs, api_url: Option<&str>) -> i32 {
    let config = match load_config(api_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    let client = match config.create_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let health = check_health(&client, &config.api_url).await;

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_health(&health) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    }

    if health.available {
        0
    } else {
        1
    }
}

pub fn handle_report(args: &ReportArgs) -> i32 {
    let rendered = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))
        .and_then(|text| {
            parse_report(&text).with_context(|| format!("Invalid report {}", args.path.display()))
        })
        .and_then(|report| OutputFormatter::new(args.format.into()).format_report(&report));

    match rendered {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// Prints the effective configuration; exits 1 when it does not validate
pub fn handle_config(args: &ConfigArgs, api_url: Option<&str>) -> i32 {
    let mut config = OptimizerConfig::default();
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    }

    match config.validate() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: Invalid configuration: {}", e);
            1
        }
    }
}
