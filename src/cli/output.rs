//! Output formatting for multiple formats
//!
//! Evaluation results, service health, configuration and parsed reports can be
//! rendered as JSON, YAML or human-readable text.
//!
//! # Example
//!
//! ```ignore
//! use rag_optimizer::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_result(&result)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::{ServiceHealth, ServiceStatus};
use crate::config::OptimizerConfig;
use crate::metrics::{ranked, EvaluationResult};
use crate::report::ParsedReport;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Health of the evaluation service as seen by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub api_url: String,
    pub available: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<ServiceHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
}

impl HealthStatus {
    pub fn from_checks(
        api_url: impl Into<String>,
        health: ServiceHealth,
        status: Option<ServiceStatus>,
    ) -> Self {
        let available = health.is_healthy();
        let message = if available {
            "Evaluation service is healthy".to_string()
        } else {
            format!("Evaluation service reports status '{}'", health.status)
        };
        Self {
            api_url: api_url.into(),
            available,
            message,
            health: Some(health),
            status,
        }
    }

    pub fn unavailable(api_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            available: false,
            message: message.into(),
            health: None,
            status: None,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn structured(&self, value: &impl Serialize, what: &str) -> Result<String> {
        match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            _ => serde_json::to_string_pretty(value)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
        }
    }

    /// Formats an evaluation result with pipelines in rank order
    pub fn format_result(&self, result: &EvaluationResult) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_result_human(result)),
            _ => self.structured(&result_value(result), "evaluation result"),
        }
    }

    pub fn format_health(&self, health: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_health_human(health)),
            _ => self.structured(health, "health status"),
        }
    }

    pub fn format_config(&self, config: &OptimizerConfig) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(config.to_string()),
            _ => self.structured(&config.to_display_map(), "config"),
        }
    }

    pub fn format_report(&self, report: &ParsedReport) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_report_human(report)),
            _ => self.structured(report, "report"),
        }
    }

    // Human-readable formatting methods

    fn format_result_human(&self, result: &EvaluationResult) -> String {
        let mut output = String::new();
        let winner = result.winner_metrics();

        output.push_str("\u{2713} RAG Pipeline Comparison\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!(
            "Winner:     {} (composite {:.2})\n",
            result.winner().display_name(),
            winner.composite_score
        ));
        output.push_str(&format!("Questions:  {}\n", result.questions().len()));
        output.push_str(&format!(
            "Evaluated:  {}\n\n",
            result.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&format!(
            "{:<4} {:<16} {:>9} {:>10} {:>13} {:>10} {:>10}\n",
            "#", "Pipeline", "Accuracy", "Relevance", "Completeness", "Cost", "Composite"
        ));
        for row in ranked(result) {
            let marker = if row.is_winner { "\u{2605}" } else { " " };
            output.push_str(&format!(
                "{:<4} {:<16} {:>9.2} {:>10.2} {:>13.2} {:>10} {:>10.2}\n",
                format!("{}{}", row.rank, marker),
                row.id.display_name(),
                row.metrics.avg_accuracy,
                row.metrics.avg_relevance,
                row.metrics.avg_completeness,
                format!("${:.6}", row.metrics.avg_cost),
                row.metrics.composite_score
            ));
        }

        output.push_str("\nQuestions Asked:\n");
        for (i, question) in result.questions().iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, question));
        }

        output
    }

    fn format_health_human(&self, health: &HealthStatus) -> String {
        let mut output = String::new();

        output.push_str("Evaluation Service Health\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let symbol = if health.available {
            "\u{2713}"
        } else {
            "\u{2717}"
        };
        output.push_str(&format!("{} {}\n", symbol, health.api_url));
        output.push_str(&format!(
            "  Status: {}\n",
            if health.available {
                "Available"
            } else {
                "Unavailable"
            }
        ));
        output.push_str(&format!("  Message: {}\n", health.message));

        if let Some(ref service) = health.health {
            if let Some(loaded) = service.api_key_loaded {
                output.push_str(&format!("  API Key Loaded: {}\n", yes_no(loaded)));
            }
        }
        if let Some(ref status) = health.status {
            output.push_str(&format!(
                "  Documents Uploaded: {}\n",
                status.documents_uploaded
            ));
            output.push_str(&format!(
                "  Pipelines Ready: {}\n",
                yes_no(status.pipelines_ready)
            ));
        }

        output
    }

    fn format_report_human(&self, report: &ParsedReport) -> String {
        let mut output = String::new();

        output.push_str("Evaluation Report\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for row in &report.rows {
            let m = &row.metrics;
            output.push_str(&format!("{}\n", row.pipeline.display_name()));
            output.push_str(&format!("\u{251C}\u{2500} Accuracy:     {}\n", m.avg_accuracy));
            output.push_str(&format!("\u{251C}\u{2500} Relevance:    {}\n", m.avg_relevance));
            output.push_str(&format!("\u{251C}\u{2500} Completeness: {}\n", m.avg_completeness));
            output.push_str(&format!("\u{251C}\u{2500} Cost:         ${:.6}\n", m.avg_cost));
            output.push_str(&format!("\u{2514}\u{2500} Composite:    {}\n\n", m.composite_score));
        }

        output.push_str(&format!("{} pipeline(s)\n", report.rows.len()));
        output
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn result_value(result: &EvaluationResult) -> Value {
    let pipelines: Vec<Value> = ranked(result)
        .into_iter()
        .map(|row| {
            json!({
                "rank": row.rank,
                "pipeline": row.id,
                "name": row.id.display_name(),
                "is_winner": row.is_winner,
                "metrics": row.metrics,
            })
        })
        .collect();

    json!({
        "id": result.id(),
        "timestamp": result.timestamp(),
        "winner": result.winner(),
        "questions": result.questions(),
        "pipelines": pipelines,
    })
}
