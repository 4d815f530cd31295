//! rag-optimizer - compare RAG pipelines on your own documents
//!
//! This library drives a remote RAG evaluation service through a three-step
//! workflow: upload documents, have every pipeline ingest them, then evaluate a
//! set of test questions. The service scores each pipeline; this crate picks
//! the winner, keeps a short history of runs and exports results as CSV.
//!
//! # Core Concepts
//!
//! - **Evaluation backend**: the remote service behind [`client::EvaluationBackend`],
//!   reached over HTTP by [`HttpEvaluationClient`]
//! - **Workflow**: [`WorkflowController`] moves through
//!   upload, ingest and questions, one request in flight per step
//! - **Result**: [`EvaluationResult`] holds per-pipeline metrics and the pipeline
//!   with the highest composite score
//!
//! # Example Usage
//!
//! ```no_run
//! use rag_optimizer::{DocumentFile, DocumentKind, OptimizerConfig, WorkflowController};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OptimizerConfig::default();
//! config.validate()?;
//!
//! let controller = WorkflowController::new(Arc::new(config.create_client()?));
//! controller
//!     .submit_files(vec![DocumentFile::new("faq.txt", "Refunds take 5 days.", DocumentKind::PlainText)])
//!     .await?;
//! controller.trigger_ingest().await?;
//!
//! let result = controller
//!     .submit_questions(vec!["How long do refunds take?".to_string()])
//!     .await?;
//! println!("Best pipeline: {}", result.winner().display_name());
//!
//! let report = controller.export_current()?;
//! std::fs::write(&report.file_name, report.bytes())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`client`]: HTTP client, backend trait and in-process mock
//! - [`workflow`]: the step-by-step controller
//! - [`metrics`]: winner selection and ranking
//! - [`history`]: recent results, newest first
//! - [`report`]: CSV export and parsing

pub mod cli;
pub mod client;
pub mod config;
pub mod documents;
pub mod history;
pub mod metrics;
pub mod progress;
pub mod report;
pub mod util;
pub mod workflow;

pub use client::{ClientError, EvaluationBackend, HttpEvaluationClient, MockEvaluationClient};
pub use config::{ConfigError, OptimizerConfig};
pub use documents::{DocumentFile, DocumentKind, UploadedFile};
pub use history::{HistoryStore, HISTORY_CAPACITY};
pub use metrics::{EvaluationResult, PipelineId, PipelineMetrics};
pub use report::{Report, ReportError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use workflow::{WorkflowController, WorkflowError, WorkflowState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
