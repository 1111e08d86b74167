//! Evaluation harness: drives one end-to-end run against the contract API.
//!
//! A run moves through fixed phases:
//! `NotStarted -> HealthChecked -> DocumentsUploaded -> Evaluating* -> Summarized`
//!
//! Any failure before `DocumentsUploaded` ends the run without a summary.
//! Failures while evaluating are recorded as zero scores and the run
//! continues. Questions are asked strictly in order, one at a time.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::client::{ApiError, ContractApi, UploadFile};
use crate::config::EvalConfig;
use crate::questions::{EvalQuestion, QuestionSet, QuestionSetError};
use crate::scoring::Scorer;
use crate::summary::{EvalResult, EvalSummary};

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("API is not healthy: {0}")]
    Unhealthy(String),

    #[error("No fixture documents available (tried {tried})")]
    NoFixtures { tried: usize },

    #[error("Document upload failed: {0}")]
    UploadFailed(ApiError),

    #[error("Upload returned no document ids")]
    NoDocuments,

    #[error("Question set error: {0}")]
    QuestionSet(#[from] QuestionSetError),

    #[error("Failed to write results: {0}")]
    Persist(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether the run failed before any question was asked.
    pub fn is_setup_failure(&self) -> bool {
        !matches!(self, HarnessError::Persist(_))
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    HealthChecked,
    DocumentsUploaded { documents: usize },
    Evaluating { index: usize, total: usize },
    Summarized,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::NotStarted => write!(f, "not started"),
            RunPhase::HealthChecked => write!(f, "health checked"),
            RunPhase::DocumentsUploaded { documents } => {
                write!(f, "documents uploaded ({documents})")
            }
            RunPhase::Evaluating { index, total } => write!(f, "evaluating {}/{}", index + 1, total),
            RunPhase::Summarized => write!(f, "summarized"),
        }
    }
}

/// Receives progress events from a run.
pub trait RunObserver: Send + Sync {
    fn on_phase(&self, _phase: RunPhase) {}

    fn on_fixture_skipped(&self, _path: &str, _reason: &str) {}

    fn on_question_start(&self, _index: usize, _total: usize, _question: &EvalQuestion) {}

    fn on_question_scored(&self, _result: &EvalResult) {}

    fn on_summary(&self, _summary: &EvalSummary) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Drives an evaluation run.
pub struct Harness {
    api: Arc<dyn ContractApi>,
    config: EvalConfig,
    scorer: Scorer,
    observer: Arc<dyn RunObserver>,
    fixtures: Option<Vec<UploadFile>>,
    questions: Option<QuestionSet>,
    persist: bool,
    phase: RunPhase,
}

impl Harness {
    pub fn new(api: Arc<dyn ContractApi>, config: EvalConfig) -> Self {
        let scorer = Scorer::new(config.scoring.clone());
        Self {
            api,
            config,
            scorer,
            observer: Arc::new(NoopObserver),
            fixtures: None,
            questions: None,
            persist: true,
            phase: RunPhase::NotStarted,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Upload these documents instead of reading `config.fixtures`.
    pub fn with_fixtures(mut self, fixtures: Vec<UploadFile>) -> Self {
        self.fixtures = Some(fixtures);
        self
    }

    /// Use this question set instead of reading `config.question_set`.
    pub fn with_questions(mut self, questions: QuestionSet) -> Self {
        self.questions = Some(questions);
        self
    }

    /// Skip writing the results artifact.
    pub fn without_persist(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run the full evaluation. A harness may be run again; each run starts
    /// from `NotStarted`.
    pub async fn run(&mut self) -> Result<EvalSummary, HarnessError> {
        self.phase = RunPhase::NotStarted;
        tracing::info!(api = self.api.name(), base_url = %self.config.base_url, "Starting evaluation run");

        self.check_health().await?;
        self.enter(RunPhase::HealthChecked);

        let document_ids = self.upload_fixtures().await?;
        self.enter(RunPhase::DocumentsUploaded {
            documents: document_ids.len(),
        });

        let questions = match self.questions.take() {
            Some(questions) => questions,
            None => QuestionSet::from_file(&self.config.question_set)?,
        };

        let total = questions.len();
        let mut results = Vec::with_capacity(total);
        for (index, question) in questions.iter().enumerate() {
            self.enter(RunPhase::Evaluating { index, total });
            self.observer.on_question_start(index, total, question);

            let result = self.evaluate_question(question).await;
            self.observer.on_question_scored(&result);
            results.push(result);
        }

        let summary = EvalSummary::from_results(results, self.scorer.config().pass_threshold);
        if self.persist {
            summary.write_json(&self.config.results_path)?;
        }
        self.enter(RunPhase::Summarized);

        tracing::info!(
            average_score = summary.average_score,
            passed = summary.passed,
            total = summary.total_questions,
            grade = %summary.grade,
            "Evaluation run complete"
        );
        self.observer.on_summary(&summary);
        Ok(summary)
    }

    fn enter(&mut self, phase: RunPhase) {
        tracing::debug!(from = %self.phase, to = %phase, "Run phase transition");
        self.phase = phase;
        self.observer.on_phase(phase);
    }

    async fn check_health(&self) -> Result<(), HarnessError> {
        let timeout = self.config.health_timeout;
        match with_timeout(timeout, self.api.health()).await {
            Ok(status) if status.is_healthy() => Ok(()),
            Ok(status) => Err(HarnessError::Unhealthy(format!("status '{}'", status.status))),
            Err(e) => {
                tracing::error!(error = %e, "Health check failed");
                Err(HarnessError::Unhealthy(e.to_string()))
            }
        }
    }

    async fn upload_fixtures(&mut self) -> Result<Vec<String>, HarnessError> {
        let files = match self.fixtures.take() {
            Some(files) => files,
            None => self.load_fixture_files(),
        };
        if files.is_empty() {
            return Err(HarnessError::NoFixtures {
                tried: self.config.fixtures.len(),
            });
        }

        let count = files.len();
        let document_ids = with_timeout(self.config.request_timeout, self.api.ingest(files))
            .await
            .map_err(HarnessError::UploadFailed)?;

        if document_ids.is_empty() {
            return Err(HarnessError::NoDocuments);
        }
        tracing::info!(files = count, documents = document_ids.len(), "Fixtures uploaded");
        Ok(document_ids)
    }

    fn load_fixture_files(&self) -> Vec<UploadFile> {
        self.config
            .fixtures
            .iter()
            .filter_map(|path| match UploadFile::from_path(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    let shown = path.display().to_string();
                    tracing::warn!(path = %shown, error = %e, "Fixture unavailable, skipping");
                    self.observer.on_fixture_skipped(&shown, &e.to_string());
                    None
                }
            })
            .collect()
    }

    async fn evaluate_question(&self, question: &EvalQuestion) -> EvalResult {
        let response = with_timeout(self.config.request_timeout, self.api.ask(&question.question)).await;

        match response {
            Ok(response) => {
                let breakdown = self.scorer.score(
                    &question.expected_keywords,
                    &response.answer,
                    response.has_citations(),
                );
                tracing::debug!(
                    question_id = %question.id,
                    score = breakdown.score,
                    matched = breakdown.matched_keywords.len(),
                    negative_signal = breakdown.negative_signal,
                    "Question scored"
                );
                EvalResult::scored(question, response.answer, breakdown)
            }
            Err(e) => {
                tracing::warn!(question_id = %question.id, error = %e, "Question request failed");
                let reason = match e.status() {
                    Some(status) => format!("API error: {status}"),
                    None => e.to_string(),
                };
                EvalResult::failed(question, reason)
            }
        }
    }
}

/// Bound an API call by `timeout`, mapping expiry to [`ApiError::Timeout`].
async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(ApiError::Timeout(timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiMetrics, AskResponse, HealthStatus};
    use async_trait::async_trait;
    use clausewise_core::ExtractedFields;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    // Mock API for testing
    #[derive(Default)]
    struct MockApi {
        healthy: AtomicBool,
        document_ids: Vec<String>,
        answers: HashMap<String, Result<AskResponse, ApiError>>,
        asked: Mutex<Vec<String>>,
        uploads: Mutex<usize>,
        hang_on_ask: bool,
    }

    impl MockApi {
        fn healthy() -> Self {
            Self {
                healthy: AtomicBool::new(true),
                document_ids: vec!["doc-1".to_string()],
                ..Default::default()
            }
        }

        fn answer(mut self, question: &str, answer: &str, citations: usize) -> Self {
            self.answers.insert(
                question.to_string(),
                Ok(AskResponse {
                    answer: answer.to_string(),
                    citations: vec![serde_json::json!({"document_id": "doc-1"}); citations],
                }),
            );
            self
        }

        fn fail(mut self, question: &str, status: u16) -> Self {
            self.answers.insert(
                question.to_string(),
                Err(ApiError::Status {
                    status,
                    body: "boom".to_string(),
                }),
            );
            self
        }
    }

    #[async_trait]
    impl ContractApi for MockApi {
        async fn health(&self) -> Result<HealthStatus, ApiError> {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(HealthStatus::default())
            } else {
                Err(ApiError::Connect("connection refused".to_string()))
            }
        }

        async fn ingest(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError> {
            *self.uploads.lock() += files.len();
            Ok(self.document_ids.clone())
        }

        async fn ask(&self, question: &str) -> Result<AskResponse, ApiError> {
            self.asked.lock().push(question.to_string());
            if self.hang_on_ask {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.answers
                .get(question)
                .cloned()
                .unwrap_or_else(|| Ok(AskResponse::default()))
        }

        async fn extract(&self, _document_id: &str) -> Result<ExtractedFields, ApiError> {
            Ok(ExtractedFields::default())
        }

        async fn audit(&self, _document_id: &str) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::json!({}))
        }

        async fn metrics(&self) -> Result<ApiMetrics, ApiError> {
            Ok(ApiMetrics::default())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        phases: Mutex<Vec<RunPhase>>,
        scored: Mutex<Vec<String>>,
    }

    impl RunObserver for RecordingObserver {
        fn on_phase(&self, phase: RunPhase) {
            self.phases.lock().push(phase);
        }

        fn on_question_scored(&self, result: &EvalResult) {
            self.scored.lock().push(result.question_id.clone());
        }
    }

    fn questions() -> QuestionSet {
        QuestionSet::new(vec![
            EvalQuestion::new("1", "What is the governing law?", ["California"]),
            EvalQuestion::new("2", "How long is the term?", ["two years", "2"]),
            EvalQuestion::new("3", "What is the liability cap?", ["100,000"]),
        ])
        .unwrap()
    }

    fn fixture() -> Vec<UploadFile> {
        vec![UploadFile::new("Sample NDA.pdf", b"%PDF-1.4".to_vec())]
    }

    fn harness(api: MockApi) -> Harness {
        Harness::new(Arc::new(api), EvalConfig::default())
            .with_fixtures(fixture())
            .with_questions(questions())
            .without_persist()
    }

    #[tokio::test]
    async fn test_full_run() {
        let api = MockApi::healthy()
            .answer("What is the governing law?", "The State of California.", 1)
            .answer("How long is the term?", "Two years (2) from the Effective Date.", 0)
            .fail("What is the liability cap?", 500);
        let observer = Arc::new(RecordingObserver::default());

        let mut harness = harness(api).with_observer(observer.clone());
        let summary = harness.run().await.unwrap();

        assert_eq!(harness.phase(), RunPhase::Summarized);
        assert_eq!(summary.total_questions, 3);
        assert_eq!(summary.results[0].score, 1.0);
        assert_eq!(summary.results[1].score, 1.0);
        assert_eq!(summary.results[2].score, 0.0);
        assert_eq!(summary.results[2].reason.as_deref(), Some("API error: 500"));
        assert_eq!(summary.passed, 2);
        assert!((summary.average_score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(*observer.scored.lock(), vec!["1", "2", "3"]);

        let phases = observer.phases.lock();
        assert_eq!(phases.first(), Some(&RunPhase::HealthChecked));
        assert_eq!(phases[1], RunPhase::DocumentsUploaded { documents: 1 });
        assert_eq!(phases.last(), Some(&RunPhase::Summarized));
    }

    #[tokio::test]
    async fn test_questions_asked_in_order() {
        let api = Arc::new(MockApi::healthy());
        let mut harness = Harness::new(api.clone(), EvalConfig::default())
            .with_fixtures(fixture())
            .with_questions(questions())
            .without_persist();
        harness.run().await.unwrap();

        let asked = api.asked.lock();
        assert_eq!(
            *asked,
            vec![
                "What is the governing law?",
                "How long is the term?",
                "What is the liability cap?"
            ]
        );
        assert_eq!(*api.uploads.lock(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_aborts_before_upload() {
        let api = Arc::new(MockApi::default());
        let mut harness = Harness::new(api.clone(), EvalConfig::default())
            .with_fixtures(fixture())
            .with_questions(questions())
            .without_persist();

        let err = harness.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::Unhealthy(_)));
        assert!(err.is_setup_failure());
        assert_eq!(harness.phase(), RunPhase::NotStarted);
        assert_eq!(*api.uploads.lock(), 0);
    }

    #[tokio::test]
    async fn test_rerun_starts_from_not_started() {
        let api = Arc::new(MockApi::healthy());
        let mut harness = Harness::new(api.clone(), EvalConfig::default())
            .with_fixtures(fixture())
            .with_questions(questions())
            .without_persist();
        harness.run().await.unwrap();
        assert_eq!(harness.phase(), RunPhase::Summarized);

        api.healthy.store(false, Ordering::SeqCst);
        let err = harness.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::Unhealthy(_)));
        assert_eq!(harness.phase(), RunPhase::NotStarted);
    }

    #[tokio::test]
    async fn test_no_documents_aborts() {
        let api = MockApi {
            healthy: AtomicBool::new(true),
            ..Default::default()
        };
        let mut harness = harness(api);
        let err = harness.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::NoDocuments));
        assert_eq!(harness.phase(), RunPhase::HealthChecked);
    }

    #[tokio::test]
    async fn test_missing_fixture_files_abort() {
        let config = EvalConfig {
            fixtures: vec!["/nonexistent/clausewise/a.pdf".into()],
            ..Default::default()
        };
        let mut harness = Harness::new(Arc::new(MockApi::healthy()), config)
            .with_questions(questions())
            .without_persist();

        let err = harness.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::NoFixtures { tried: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_question_timeout_scores_zero() {
        let api = MockApi {
            hang_on_ask: true,
            ..MockApi::healthy()
        };
        let config = EvalConfig {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let mut harness = Harness::new(Arc::new(api), config)
            .with_fixtures(fixture())
            .with_questions(questions())
            .without_persist();

        let summary = harness.run().await.unwrap();
        assert!(summary.results.iter().all(|r| r.score == 0.0));
        assert!(summary.results[0]
            .reason
            .as_deref()
            .unwrap()
            .starts_with("Timeout"));
    }

    #[tokio::test]
    async fn test_results_persisted() {
        let path = std::env::temp_dir()
            .join(format!("clausewise-harness-{}", std::process::id()))
            .join("eval_results.json");
        let config = EvalConfig {
            results_path: path.clone(),
            ..Default::default()
        };
        let api = MockApi::healthy().answer("What is the governing law?", "California", 0);
        let mut harness = Harness::new(Arc::new(api), config)
            .with_fixtures(fixture())
            .with_questions(questions());

        let summary = harness.run().await.unwrap();
        let written = EvalSummary::read_json(&path).unwrap();
        assert_eq!(written, summary);
        std::fs::remove_file(&path).ok();
    }
}
