//! Winner selection and ranking
//!
//! Composite scores arrive precomputed from the evaluation service. This module
//! only picks and orders; it never derives a score of its own.

use super::types::{EvaluationResult, PipelineId, PipelineMetrics, PipelineSummary};
use crate::client::EvaluateResponse;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// The service answered without any pipeline metrics
    #[error("Evaluation response contains no pipeline metrics")]
    EmptySummary,
}

/// Returns the pipeline with the highest composite score.
///
/// Ties go to the pipeline listed first. A NaN score never beats a number.
pub fn select_winner(summary: &PipelineSummary) -> Option<&PipelineId> {
    let mut best: Option<(&PipelineId, f64)> = None;

    for (id, metrics) in summary {
        let score = metrics.composite_score;
        best = match best {
            None => Some((id, score)),
            Some((_, top)) if score > top || (top.is_nan() && !score.is_nan()) => {
                Some((id, score))
            }
            keep => keep,
        };
    }

    best.map(|(id, _)| id)
}

/// Builds an [`EvaluationResult`] from a raw `/evaluate` response
pub fn aggregate(
    response: EvaluateResponse,
    questions: Vec<String>,
    timestamp: DateTime<Utc>,
) -> Result<EvaluationResult, AggregationError> {
    let EvaluateResponse { summary, winner } = response;

    let computed = select_winner(&summary)
        .cloned()
        .ok_or(AggregationError::EmptySummary)?;

    match winner {
        Some(reported) if reported != computed => {
            warn!(
                reported = %reported,
                computed = %computed,
                "Service-reported winner disagrees with composite scores, using computed winner"
            );
        }
        _ => {}
    }

    debug!(
        winner = %computed,
        pipelines = summary.len(),
        questions = questions.len(),
        "Aggregated evaluation results"
    );

    Ok(EvaluationResult::new(summary, computed, questions, timestamp))
}

/// One line of the ranked comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPipeline<'a> {
    pub rank: usize,
    pub id: &'a PipelineId,
    pub metrics: &'a PipelineMetrics,
    pub is_winner: bool,
}

/// Orders pipelines by descending composite score, keeping listing order on ties
pub fn ranked(result: &EvaluationResult) -> Vec<RankedPipeline<'_>> {
    let mut entries: Vec<(&PipelineId, &PipelineMetrics)> = result.summary().iter().collect();

    let key = |m: &PipelineMetrics| {
        if m.composite_score.is_nan() {
            f64::NEG_INFINITY
        } else {
            m.composite_score
        }
    };
    entries.sort_by(|a, b| key(b.1).total_cmp(&key(a.1)));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (id, metrics))| RankedPipeline {
            rank: index + 1,
            id,
            metrics,
            is_winner: id == result.winner(),
        })
        .collect()
}
