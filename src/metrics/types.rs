//! Per-pipeline metrics and evaluation results

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Opaque pipeline key as reported by the evaluation service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineId(String);

impl PipelineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human label, e.g. `pipeline_a` becomes `PIPELINE A`
    pub fn display_name(&self) -> String {
        self.0.replacen("pipeline_", "Pipeline ", 1).to_uppercase()
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PipelineId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PipelineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PipelineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Averaged metrics for one pipeline over one evaluation run.
///
/// `composite_score` is computed by the service and carried through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub avg_accuracy: f64,
    pub avg_relevance: f64,
    pub avg_completeness: f64,
    pub avg_cost: f64,
    pub composite_score: f64,
}

impl PipelineMetrics {
    pub fn new(
        avg_accuracy: f64,
        avg_relevance: f64,
        avg_completeness: f64,
        avg_cost: f64,
        composite_score: f64,
    ) -> Self {
        Self {
            avg_accuracy,
            avg_relevance,
            avg_completeness,
            avg_cost,
            composite_score,
        }
    }
}

/// Pipeline metrics in the order the service listed them
pub type PipelineSummary = IndexMap<PipelineId, PipelineMetrics>;

/// Outcome of one evaluation run.
///
/// Only [`aggregate`](super::aggregate) builds these, which keeps `winner`
/// a key of `summary` with the highest composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    id: Uuid,
    summary: PipelineSummary,
    winner: PipelineId,
    questions: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    pub(super) fn new(
        summary: PipelineSummary,
        winner: PipelineId,
        questions: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            summary,
            winner,
            questions,
            timestamp,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn summary(&self) -> &PipelineSummary {
        &self.summary
    }

    pub fn winner(&self) -> &PipelineId {
        &self.winner
    }

    pub fn winner_metrics(&self) -> &PipelineMetrics {
        // winner is always a summary key
        &self.summary[&self.winner]
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metrics(&self, pipeline: &str) -> Option<&PipelineMetrics> {
        self.summary.get(pipeline)
    }
}
