//! Metrics aggregation for pipeline comparisons

mod aggregator;
mod types;

pub use aggregator::{aggregate, ranked, select_winner, AggregationError, RankedPipeline};
pub use types::{EvaluationResult, PipelineId, PipelineMetrics, PipelineSummary};
