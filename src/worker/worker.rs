//! The sequential fetch-parse-emit loop
//!
//! One page is in flight at a time. For every position the worker sequences
//! a URL, loads it with retry and backoff, parses it, runs the strategy, and
//! reports the result to its notifier (and, in a two-stage pipeline, pushes
//! it onto the hand-off queue).

use crate::loader::{LoaderSettings, PageLoader};
use crate::notify::Notifier;
use crate::pipeline::HandOffSender;
use crate::strategy::{extract, ParsingStrategy};
use crate::worker::retry::RetryPolicy;
use crate::worker::state::{WorkerHandle, WorkerState};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to do when loaded markup cannot be turned into a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Log, count, and move on to the next position
    #[default]
    Skip,
    /// Load the same position again under the retry policy
    Retry,
    /// Stop the run
    Abort,
}

/// Counters and outcome of one worker run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub worker: String,
    pub outcome: WorkerState,
    pub positions_visited: u32,
    pub load_attempts: u32,
    pub records_emitted: u32,
    /// Positions given up after the retry budget ran out
    pub load_failures: u32,
    /// Positions whose markup could not be parsed
    pub document_failures: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub(crate) fn begin(worker: &str) -> Self {
        Self {
            worker: worker.to_string(),
            outcome: WorkerState::Running,
            positions_visited: 0,
            load_attempts: 0,
            records_emitted: 0,
            load_failures: 0,
            document_failures: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Positions that produced no record
    pub fn pages_skipped(&self) -> u32 {
        self.load_failures + self.document_failures
    }

    pub fn is_aborted(&self) -> bool {
        self.outcome == WorkerState::Aborted
    }
}

enum LoadOutcome {
    Loaded(String),
    Exhausted,
    Aborted,
}

enum Step {
    Next,
    Stop,
}

/// Drives one strategy over a range of pages
pub struct ParserWorker<S: ParsingStrategy> {
    name: String,
    settings: LoaderSettings,
    strategy: Arc<S>,
    loader: Arc<dyn PageLoader>,
    notifier: Arc<dyn Notifier<S::Output>>,
    retry: RetryPolicy,
    parse_failure: ParseFailurePolicy,
    hand_off: Option<HandOffSender<S::Output>>,
    handle: WorkerHandle,
    state: WorkerState,
}

impl<S: ParsingStrategy> ParserWorker<S> {
    pub fn new(
        name: impl Into<String>,
        settings: LoaderSettings,
        strategy: Arc<S>,
        loader: Arc<dyn PageLoader>,
        notifier: Arc<dyn Notifier<S::Output>>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            strategy,
            loader,
            notifier,
            retry: RetryPolicy::default(),
            parse_failure: ParseFailurePolicy::default(),
            hand_off: None,
            handle: WorkerHandle::new(),
            state: WorkerState::Idle,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_parse_failure(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failure = policy;
        self
    }

    /// Also push every result onto a downstream queue
    pub fn with_hand_off(mut self, sender: HandOffSender<S::Output>) -> Self {
        self.hand_off = Some(sender);
        self
    }

    /// Shares an abort handle with other workers
    pub fn with_handle(mut self, handle: WorkerHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    /// Stops the worker before its next position or during a backoff wait
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Runs the worker over its whole range
    ///
    /// Page-level failures are logged and counted in the report, never
    /// returned. The only error is a sequencing failure, which cannot occur
    /// for settings built through `LoaderSettings::new`.
    pub async fn start(&mut self) -> Result<RunReport, HarvestError> {
        if self.state != WorkerState::Idle {
            return Err(HarvestError::InvalidStart {
                name: self.name.clone(),
                state: self.state,
            });
        }

        self.state = WorkerState::Running;
        self.handle.activate();
        tracing::info!(
            "Worker '{}' starting with {} strategy: {} positions from {}",
            self.name,
            self.strategy.name(),
            self.settings.len(),
            self.settings.base_url()
        );

        let result = self.work().await;

        self.handle.deactivate();
        self.state = match &result {
            Ok(report) => report.outcome,
            Err(_) => WorkerState::Aborted,
        };
        result
    }

    async fn work(&self) -> Result<RunReport, HarvestError> {
        let mut report = RunReport::begin(&self.name);

        for position in self.settings.positions() {
            if self.handle.is_aborted() {
                tracing::info!("Worker '{}' aborted before position {}", self.name, position);
                return Ok(self.finish(report, WorkerState::Aborted));
            }

            let url = match self.settings.url_for(position) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Worker '{}' cannot sequence position {}: {}", self.name, position, e);
                    self.notifier.on_completed(&self.name);
                    return Err(e);
                }
            };

            report.positions_visited += 1;

            if let Step::Stop = self.process_position(position, &url, &mut report).await {
                return Ok(self.finish(report, WorkerState::Aborted));
            }
        }

        Ok(self.finish(report, WorkerState::Completed))
    }

    async fn process_position(&self, position: u32, url: &str, report: &mut RunReport) -> Step {
        let mut attempts = 0u32;

        loop {
            let content = match self.load_with_retry(url, &mut attempts, report).await {
                LoadOutcome::Loaded(content) => content,
                LoadOutcome::Exhausted => {
                    tracing::error!(
                        "Giving up on position {} ({}) after {} attempts",
                        position,
                        url,
                        attempts
                    );
                    report.load_failures += 1;
                    return Step::Next;
                }
                LoadOutcome::Aborted => return Step::Stop,
            };

            let error = match extract(self.strategy.as_ref(), &content) {
                Ok(result) => {
                    self.emit(result).await;
                    report.records_emitted += 1;
                    return Step::Next;
                }
                Err(e) => e,
            };

            match self.parse_failure {
                ParseFailurePolicy::Skip => {
                    tracing::warn!("Could not parse page {} ({}): {}, skipping", position, url, error);
                    report.document_failures += 1;
                    return Step::Next;
                }
                ParseFailurePolicy::Abort => {
                    tracing::error!("Could not parse page {} ({}): {}, aborting", position, url, error);
                    report.document_failures += 1;
                    self.handle.abort();
                    return Step::Stop;
                }
                ParseFailurePolicy::Retry => {
                    if !self.retry.allows(attempts + 1) {
                        tracing::error!(
                            "Could not parse page {} ({}) after {} attempts: {}",
                            position,
                            url,
                            attempts,
                            error
                        );
                        report.document_failures += 1;
                        return Step::Next;
                    }

                    let delay = self.retry.delay_for(attempts);
                    tracing::warn!(
                        "Could not parse page {} ({}): {}, reloading in {}ms",
                        position,
                        url,
                        error,
                        delay.as_millis()
                    );
                    if !self.handle.pause(delay).await {
                        return Step::Stop;
                    }
                }
            }
        }
    }

    /// Loads until the body is non-empty, the budget runs out, or abort is requested
    async fn load_with_retry(
        &self,
        url: &str,
        attempts: &mut u32,
        report: &mut RunReport,
    ) -> LoadOutcome {
        loop {
            *attempts += 1;
            report.load_attempts += 1;
            tracing::debug!("Loading {} (attempt {})", url, attempts);

            let content = self.loader.load(url).await;
            if !content.is_empty() {
                return LoadOutcome::Loaded(content);
            }

            if !self.retry.allows(*attempts + 1) {
                return LoadOutcome::Exhausted;
            }

            let delay = self.retry.delay_for(*attempts);
            tracing::warn!(
                "Empty response from {} (attempt {}), retrying in {}ms",
                url,
                attempts,
                delay.as_millis()
            );

            if !self.handle.pause(delay).await {
                tracing::info!("Worker '{}' aborted while waiting to retry {}", self.name, url);
                return LoadOutcome::Aborted;
            }
        }
    }

    async fn emit(&self, result: S::Output) {
        self.notifier.on_new_data(&self.name, &result);

        if let Some(queue) = &self.hand_off {
            if queue.push(result).await.is_err() {
                tracing::warn!("Worker '{}': downstream queue closed, result dropped", self.name);
            }
        }
    }

    fn finish(&self, mut report: RunReport, outcome: WorkerState) -> RunReport {
        self.notifier.on_completed(&self.name);
        report.outcome = outcome;
        report.finished_at = Some(Utc::now());

        tracing::info!(
            "Worker '{}' ({}) {}: {} records, {} skipped, {} load attempts",
            self.name,
            self.strategy.name(),
            outcome,
            report.records_emitted,
            report.pages_skipped(),
            report.load_attempts
        );

        report
    }
}
