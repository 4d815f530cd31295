//! Evaluation workflow controller
//!
//! Drives the three remote calls in order:
//!
//! ```text
//! AwaitingUpload --submit_files--> AwaitingIngest --trigger_ingest--> AwaitingQuestions
//!       ^                                                                  |
//!       +------------------ reset <-- ShowingResults <--submit_questions--+
//! ```
//!
//! A failed call leaves the state untouched so the same step can be retried.
//! Each step allows one request in flight; a second call while the first is
//! pending is refused without reaching the service.
//!
//! # Example
//!
//! ```no_run
//! use rag_optimizer::client::{HttpEvaluationClient, Timeouts};
//! use rag_optimizer::documents::{DocumentFile, DocumentKind};
//! use rag_optimizer::workflow::WorkflowController;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpEvaluationClient::new("http://localhost:8000", Timeouts::default())?;
//! let controller = WorkflowController::new(Arc::new(client));
//!
//! controller
//!     .submit_files(vec![DocumentFile::new("guide.pdf", std::fs::read("guide.pdf")?, DocumentKind::Pdf)])
//!     .await?;
//! controller.trigger_ingest().await?;
//! let result = controller
//!     .submit_questions(vec!["What is the main topic?".to_string()])
//!     .await?;
//!
//! println!("Winner: {}", result.winner().display_name());
//! # Ok(())
//! # }
//! ```

use super::error::{ValidationError, WorkflowError};
use super::state::WorkflowState;
use crate::client::{EvaluationBackend, Step};
use crate::documents::{DocumentFile, UploadedFile};
use crate::history::{HistorySnapshot, HistoryStore};
use crate::metrics::{aggregate, EvaluationResult};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::report::{self, Report};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of staging a selection of documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedFiles {
    pub accepted: Vec<UploadedFile>,
    /// Names of files whose type is not accepted
    pub rejected: Vec<String>,
}

#[derive(Debug, Default)]
struct Session {
    state: WorkflowState,
    pending: Vec<DocumentFile>,
    /// Leading entries of `pending` included in the upload in flight
    submitting: usize,
    stored: Vec<String>,
    displayed: Option<Arc<EvaluationResult>>,
}

#[derive(Debug, Default)]
struct InFlight {
    upload: AtomicBool,
    ingest: AtomicBool,
    evaluate: AtomicBool,
}

impl InFlight {
    fn flag(&self, step: Step) -> &AtomicBool {
        match step {
            Step::Upload => &self.upload,
            Step::Ingest => &self.ingest,
            Step::Evaluate => &self.evaluate,
        }
    }

    fn acquire(&self, step: Step) -> Result<FlightGuard<'_>, WorkflowError> {
        let flag = self.flag(step);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WorkflowError::StepInFlight(step))?;
        Ok(FlightGuard { flag })
    }

    fn is_set(&self, step: Step) -> bool {
        self.flag(step).load(Ordering::Acquire)
    }
}

/// Clears the step's in-flight flag on drop
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct WorkflowController {
    backend: Arc<dyn EvaluationBackend>,
    history: Arc<HistoryStore>,
    progress: Arc<dyn ProgressHandler>,
    session: Mutex<Session>,
    in_flight: InFlight,
}

impl WorkflowController {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self::with_history(backend, Arc::new(HistoryStore::new()))
    }

    /// Shares an existing history, e.g. across several sessions in one process
    pub fn with_history(backend: Arc<dyn EvaluationBackend>, history: Arc<HistoryStore>) -> Self {
        Self {
            backend,
            history,
            progress: Arc::new(NoOpHandler),
            session: Mutex::new(Session::default()),
            in_flight: InFlight::default(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> WorkflowState {
        self.session().state
    }

    pub fn is_in_flight(&self, step: Step) -> bool {
        self.in_flight.is_set(step)
    }

    pub fn history(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    /// The result currently on display, if any
    pub fn current_result(&self) -> Option<Arc<EvaluationResult>> {
        self.session().displayed.clone()
    }

    /// Names the service assigned to the last successful upload
    pub fn stored_files(&self) -> Vec<String> {
        self.session().stored.clone()
    }

    pub fn pending_files(&self) -> Vec<UploadedFile> {
        self.session()
            .pending
            .iter()
            .map(DocumentFile::listing)
            .collect()
    }

    /// Adds `(name, content, declared MIME type)` entries to the pending set,
    /// keeping only accepted document types
    pub fn stage_files<I, C>(&self, files: I) -> StagedFiles
    where
        I: IntoIterator<Item = (String, C, String)>,
        C: Into<bytes::Bytes>,
    {
        let mut staged = StagedFiles::default();
        let mut session = self.session();

        for (name, content, mime_type) in files {
            match DocumentFile::from_declared(name.clone(), content, &mime_type) {
                Some(file) => {
                    staged.accepted.push(file.listing());
                    session.pending.push(file);
                }
                None => {
                    debug!(file = %name, mime_type = %mime_type, "Skipping unsupported document type");
                    staged.rejected.push(name);
                }
            }
        }

        staged
    }

    /// Removes one file from the pending set
    pub fn unstage_file(&self, index: usize) -> Option<UploadedFile> {
        let mut session = self.session();
        if index >= session.pending.len() {
            return None;
        }
        if index < session.submitting {
            session.submitting -= 1;
        }
        Some(session.pending.remove(index).listing())
    }

    fn expect_state(&self, step: Step) -> Result<(), WorkflowError> {
        let actual = self.state();
        if actual.pending_step() == Some(step) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                step: step_verb(step),
                expected: WorkflowState::awaiting(step),
                actual,
            })
        }
    }

    fn started(&self, step: Step, detail: String) -> Instant {
        self.progress
            .on_progress(&ProgressEvent::StepStarted { step, detail });
        Instant::now()
    }

    fn failed(&self, step: Step, start: Instant, err: WorkflowError) -> WorkflowError {
        self.progress.on_progress(&ProgressEvent::StepFailed {
            step,
            elapsed: start.elapsed(),
            error: err.to_string(),
        });
        err
    }

    /// Uploads the pending set. Once the upload succeeds the submitted files
    /// leave the pending set; files staged meanwhile stay.
    pub async fn submit_pending(&self) -> Result<Vec<String>, WorkflowError> {
        self.upload(None).await
    }

    /// `AwaitingUpload -> AwaitingIngest`; the pending set is left alone
    pub async fn submit_files(&self, files: Vec<DocumentFile>) -> Result<Vec<String>, WorkflowError> {
        self.upload(Some(files)).await
    }

    async fn upload(&self, files: Option<Vec<DocumentFile>>) -> Result<Vec<String>, WorkflowError> {
        let _guard = self.in_flight.acquire(Step::Upload)?;
        self.expect_state(Step::Upload)?;

        let files = match files {
            Some(files) => files,
            None => {
                let mut session = self.session();
                session.submitting = session.pending.len();
                session.pending.clone()
            }
        };

        if files.is_empty() {
            return Err(ValidationError::NoFiles.into());
        }

        let start = self.started(Step::Upload, format!("{} file(s)", files.len()));

        let outcome = self.backend.upload(&files).await;

        let stored = match outcome {
            Ok(stored) => {
                let mut session = self.session();
                let submitted = std::mem::take(&mut session.submitting);
                session.pending.drain(..submitted);
                session.stored = stored.clone();
                session.state = WorkflowState::AwaitingIngest;
                stored
            }
            Err(e) => {
                self.session().submitting = 0;
                return Err(self.failed(Step::Upload, start, WorkflowError::from_step(Step::Upload, e)));
            }
        };

        info!(stored = stored.len(), "Documents uploaded");
        self.progress.on_progress(&ProgressEvent::StepCompleted {
            step: Step::Upload,
            elapsed: start.elapsed(),
        });

        Ok(stored)
    }

    /// `AwaitingIngest -> AwaitingQuestions`
    pub async fn trigger_ingest(&self) -> Result<(), WorkflowError> {
        let _guard = self.in_flight.acquire(Step::Ingest)?;
        self.expect_state(Step::Ingest)?;

        let files = self.session().stored.len();
        let start = self.started(Step::Ingest, format!("{} stored file(s)", files));

        let ack = self
            .backend
            .ingest()
            .await
            .map_err(|e| self.failed(Step::Ingest, start, WorkflowError::from_step(Step::Ingest, e)))?;

        self.session().state = WorkflowState::AwaitingQuestions;

        info!(pipelines = ?ack.pipelines, "Documents ingested");
        self.progress.on_progress(&ProgressEvent::StepCompleted {
            step: Step::Ingest,
            elapsed: start.elapsed(),
        });

        Ok(())
    }

    /// `AwaitingQuestions -> ShowingResults`
    ///
    /// Blank questions are dropped before sending. The result is recorded in
    /// history and becomes the displayed result.
    pub async fn submit_questions(
        &self,
        questions: Vec<String>,
    ) -> Result<Arc<EvaluationResult>, WorkflowError> {
        let _guard = self.in_flight.acquire(Step::Evaluate)?;
        self.expect_state(Step::Evaluate)?;

        let questions: Vec<String> = questions
            .into_iter()
            .filter(|q| !q.trim().is_empty())
            .collect();
        if questions.is_empty() {
            return Err(ValidationError::NoQuestions.into());
        }

        let start = self.started(Step::Evaluate, format!("{} question(s)", questions.len()));

        let response = self
            .backend
            .evaluate(&questions)
            .await
            .map_err(|e| self.failed(Step::Evaluate, start, WorkflowError::from_step(Step::Evaluate, e)))?;

        let result = aggregate(response, questions, Utc::now())
            .map(Arc::new)
            .map_err(|e| self.failed(Step::Evaluate, start, e.into()))?;

        self.history.record(Arc::clone(&result));
        {
            let mut session = self.session();
            session.displayed = Some(Arc::clone(&result));
            session.state = WorkflowState::ShowingResults;
        }

        self.progress.on_progress(&ProgressEvent::StepCompleted {
            step: Step::Evaluate,
            elapsed: start.elapsed(),
        });
        self.progress.on_progress(&ProgressEvent::ResultRecorded {
            winner: result.winner().clone(),
            pipelines: result.summary().len(),
            history_len: self.history.len(),
        });

        Ok(result)
    }

    /// `ShowingResults -> AwaitingUpload`; history is kept
    pub fn reset(&self) -> Result<(), WorkflowError> {
        let mut session = self.session();
        if session.state != WorkflowState::ShowingResults {
            return Err(WorkflowError::InvalidState {
                step: "reset",
                expected: WorkflowState::ShowingResults,
                actual: session.state,
            });
        }

        *session = Session::default();
        debug!("Workflow reset");
        Ok(())
    }

    /// Displays a history entry without touching the workflow state
    pub fn select_history(&self, index: usize) -> Option<Arc<EvaluationResult>> {
        let Some(entry) = self.history.select(index) else {
            warn!(index, "No history entry at index");
            return None;
        };

        self.session().displayed = Some(Arc::clone(&entry));
        Some(entry)
    }

    /// Renders the displayed result as a CSV report
    pub fn export_current(&self) -> Result<Report, WorkflowError> {
        let result = self.current_result().ok_or(WorkflowError::NoResult)?;
        Ok(report::export(&result, Utc::now()))
    }
}

fn step_verb(step: Step) -> &'static str {
    match step {
        Step::Upload => "upload files",
        Step::Ingest => "ingest",
        Step::Evaluate => "evaluate",
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .field("history_len", &self.history.len())
            .finish()
    }
}
