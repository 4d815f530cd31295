use super::backend::EvaluationBackend;
use super::error::ClientError;
use super::types::{EvaluateResponse, IngestAck, ServiceHealth, ServiceStatus, Step};
use crate::documents::DocumentFile;
use crate::metrics::{PipelineId, PipelineMetrics, PipelineSummary};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process backend with queued replies, for tests and dry runs
pub struct MockEvaluationClient {
    uploads: Mutex<VecDeque<Result<Vec<String>, ClientError>>>,
    ingests: Mutex<VecDeque<Result<IngestAck, ClientError>>>,
    evaluations: Mutex<VecDeque<Result<EvaluateResponse, ClientError>>>,
    holds: Mutex<Vec<(Step, HoldHandle)>>,
    upload_calls: AtomicUsize,
    ingest_calls: AtomicUsize,
    evaluate_calls: AtomicUsize,
    evaluated_questions: Mutex<Vec<Vec<String>>>,
    name: String,
}

struct HoldHandle {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Keeps one call parked until [`Hold::release`] is called
pub struct Hold {
    entered: Option<oneshot::Receiver<()>>,
    release: oneshot::Sender<()>,
}

impl Hold {
    /// Resolves once the held call has started
    pub async fn entered(&mut self) {
        if let Some(entered) = self.entered.take() {
            let _ = entered.await;
        }
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl MockEvaluationClient {
    pub fn new() -> Self {
        Self::with_name("MockEvaluationService")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            uploads: Mutex::new(VecDeque::new()),
            ingests: Mutex::new(VecDeque::new()),
            evaluations: Mutex::new(VecDeque::new()),
            holds: Mutex::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
            ingest_calls: AtomicUsize::new(0),
            evaluate_calls: AtomicUsize::new(0),
            evaluated_questions: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_upload(&self, reply: Result<Vec<String>, ClientError>) {
        lock(&self.uploads).push_back(reply);
    }

    pub fn add_ingest(&self, reply: Result<IngestAck, ClientError>) {
        lock(&self.ingests).push_back(reply);
    }

    pub fn add_evaluation(&self, reply: Result<EvaluateResponse, ClientError>) {
        lock(&self.evaluations).push_back(reply);
    }

    /// Parks the next call to `step` until the returned hold is released
    pub fn hold_next(&self, step: Step) -> Hold {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        lock(&self.holds).push((
            step,
            HoldHandle {
                entered: entered_tx,
                release: release_rx,
            },
        ));
        Hold {
            entered: Some(entered_rx),
            release: release_tx,
        }
    }

    pub fn calls(&self, step: Step) -> usize {
        self.counter(step).load(Ordering::SeqCst)
    }

    pub fn evaluated_questions(&self) -> Vec<Vec<String>> {
        lock(&self.evaluated_questions).clone()
    }

    /// Response with the given composite scores, other metrics fixed
    pub fn scores(entries: &[(&str, f64)]) -> EvaluateResponse {
        let summary: PipelineSummary = entries
            .iter()
            .map(|(id, score)| {
                (
                    PipelineId::from(*id),
                    PipelineMetrics::new(7.5, 8.0, 7.0, 0.000_25, *score),
                )
            })
            .collect();
        let winner = crate::metrics::select_winner(&summary).cloned();
        EvaluateResponse { summary, winner }
    }

    fn counter(&self, step: Step) -> &AtomicUsize {
        match step {
            Step::Upload => &self.upload_calls,
            Step::Ingest => &self.ingest_calls,
            Step::Evaluate => &self.evaluate_calls,
        }
    }

    async fn wait_if_held(&self, step: Step) {
        let handle = {
            let mut holds = lock(&self.holds);
            holds
                .iter()
                .position(|(held, _)| *held == step)
                .map(|index| holds.remove(index).1)
        };

        if let Some(handle) = handle {
            let _ = handle.entered.send(());
            let _ = handle.release.await;
        }
    }

    fn next_reply<T>(queue: &Mutex<VecDeque<Result<T, ClientError>>>, step: Step) -> Result<T, ClientError> {
        lock(queue).pop_front().unwrap_or_else(|| {
            Err(ClientError::InvalidResponse {
                message: format!("MockEvaluationClient: no queued {} reply", step),
            })
        })
    }
}

impl Default for MockEvaluationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EvaluationBackend for MockEvaluationClient {
    async fn upload(&self, _files: &[DocumentFile]) -> Result<Vec<String>, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held(Step::Upload).await;
        Self::next_reply(&self.uploads, Step::Upload)
    }

    async fn ingest(&self) -> Result<IngestAck, ClientError> {
        self.ingest_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held(Step::Ingest).await;
        Self::next_reply(&self.ingests, Step::Ingest)
    }

    async fn evaluate(&self, questions: &[String]) -> Result<EvaluateResponse, ClientError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.evaluated_questions).push(questions.to_vec());
        self.wait_if_held(Step::Evaluate).await;
        Self::next_reply(&self.evaluations, Step::Evaluate)
    }

    async fn health(&self) -> Result<ServiceHealth, ClientError> {
        Ok(ServiceHealth {
            status: "healthy".to_string(),
            api_key_loaded: Some(true),
            pipelines_ready: Some(self.calls(Step::Ingest) > 0),
        })
    }

    async fn status(&self) -> Result<ServiceStatus, ClientError> {
        Ok(ServiceStatus {
            documents_uploaded: self.calls(Step::Upload),
            pipelines_ready: self.calls(Step::Ingest) > 0,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockEvaluationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEvaluationClient")
            .field("name", &self.name)
            .field("upload_calls", &self.calls(Step::Upload))
            .field("ingest_calls", &self.calls(Step::Ingest))
            .field("evaluate_calls", &self.calls(Step::Evaluate))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_queued_replies_in_order() {
        let client = MockEvaluationClient::new();
        client.add_upload(Ok(vec!["a.pdf".to_string()]));
        client.add_upload(Err(ClientError::Timeout { seconds: 1 }));

        assert_eq!(client.upload(&[]).await.unwrap(), vec!["a.pdf".to_string()]);
        assert!(client.upload(&[]).await.unwrap_err().is_timeout());
        assert_eq!(client.calls(Step::Upload), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let client = MockEvaluationClient::new();
        let err = client.ingest().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_records_questions() {
        let client = MockEvaluationClient::new();
        client.add_evaluation(Ok(MockEvaluationClient::scores(&[("p1", 1.0)])));

        client.evaluate(&["q1".to_string()]).await.unwrap();

        assert_eq!(client.evaluated_questions(), vec![vec!["q1".to_string()]]);
    }

    #[tokio::test]
    async fn test_hold_parks_call_until_released() {
        let client = Arc::new(MockEvaluationClient::new());
        client.add_ingest(Ok(IngestAck::default()));
        let mut hold = client.hold_next(Step::Ingest);

        let task = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.ingest().await })
        };

        hold.entered().await;
        assert!(!task.is_finished());

        hold.release();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_queue_survives_panicking_holder() {
        let client = Arc::new(MockEvaluationClient::new());
        let poisoner = Arc::clone(&client);
        let _ = std::thread::spawn(move || {
            let _queue = poisoner.uploads.lock().unwrap();
            panic!("panic while holding the upload queue");
        })
        .join();
        assert!(client.uploads.is_poisoned());

        client.add_upload(Ok(vec!["a.pdf".to_string()]));
        assert_eq!(client.upload(&[]).await.unwrap(), vec!["a.pdf".to_string()]);
    }

    #[test]
    fn test_scores_helper_picks_winner() {
        let response = MockEvaluationClient::scores(&[("p1", 80.0), ("p2", 92.0)]);
        assert_eq!(response.winner, Some(PipelineId::from("p2")));
    }
}
