//! Sequential batch runner: request → generate → download, one record at a time.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument, warn};

use deckgen_shared::{DeckgenError, GenerationRequest, GenerationResult, Result, ServiceConfig};

use crate::download::{ArtifactFetcher, ArtifactNaming, claim_file_name};
use crate::generation::{PresentationClient, service_url};

// ---------------------------------------------------------------------------
// Record state machine
// ---------------------------------------------------------------------------

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    Start,
    Sourced,
    /// Only pitch decks pass through this state.
    QaDone,
    Prompted,
    Requested,
    Saved,
    Failed,
}

impl RecordState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Saved | Self::Failed)
    }

    /// Legal single steps. Any non-terminal state may fail.
    pub fn can_transition(self, next: Self) -> bool {
        use RecordState::*;
        match (self, next) {
            (Start, Sourced)
            | (Sourced, QaDone)
            | (Sourced, Prompted)
            | (QaDone, Prompted)
            | (Prompted, Requested)
            | (Requested, Saved) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Ordered states a record has been through, starting at [`RecordState::Start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StateHistory(Vec<RecordState>);

impl Default for StateHistory {
    fn default() -> Self {
        Self(vec![RecordState::Start])
    }
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RecordState {
        self.0.last().copied().unwrap_or(RecordState::Start)
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: RecordState) -> Result<()> {
        let from = self.current();
        if !from.can_transition(next) {
            return Err(DeckgenError::validation(format!(
                "illegal record transition {from:?} -> {next:?}"
            )));
        }
        self.0.push(next);
        Ok(())
    }

    pub fn states(&self) -> &[RecordState] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Batch items and outcomes
// ---------------------------------------------------------------------------

/// One record ready to be sent to the service.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Human-readable identity for logs and summaries (student or company name, URL).
    pub identity: String,
    pub request: GenerationRequest,
    pub naming: ArtifactNaming,
    /// Must be at [`RecordState::Prompted`] when the batch runs.
    pub history: StateHistory,
}

impl BatchItem {
    /// Item for a record that went straight from its source to a prompt.
    pub fn new(
        identity: impl Into<String>,
        request: GenerationRequest,
        naming: ArtifactNaming,
    ) -> Result<Self> {
        let mut history = StateHistory::new();
        history.advance(RecordState::Sourced)?;
        history.advance(RecordState::Prompted)?;
        Ok(Self {
            identity: identity.into(),
            request,
            naming,
            history,
        })
    }
}

/// What happened to one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub identity: String,
    pub history: StateHistory,
    pub saved_to: Option<PathBuf>,
    pub error: Option<String>,
    pub result: Option<GenerationResult>,
    /// Service edit link, when the service returned one.
    pub edit_url: Option<String>,
}

impl RecordOutcome {
    pub fn state(&self) -> RecordState {
        self.history.current()
    }

    pub fn is_saved(&self) -> bool {
        self.state() == RecordState::Saved
    }
}

/// All outcomes of one batch, in source order.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub outcomes: Vec<RecordOutcome>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn saved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.saved()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting batch status.
pub trait BatchProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a record is sent to the service. `current` starts at 1.
    fn record_started(&self, identity: &str, current: usize, total: usize);
    /// Called once a record is saved or failed.
    fn record_finished(&self, outcome: &RecordOutcome);
    /// Called when the batch completes.
    fn done(&self, summary: &BatchSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_started(&self, _identity: &str, _current: usize, _total: usize) {}
    fn record_finished(&self, _outcome: &RecordOutcome) {}
    fn done(&self, _summary: &BatchSummary) {}
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Generates and downloads a batch, one record at a time.
pub struct BatchRunner {
    client: PresentationClient,
    fetcher: ArtifactFetcher,
}

impl BatchRunner {
    pub fn new(service: &ServiceConfig, output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            client: PresentationClient::new(service)?,
            fetcher: ArtifactFetcher::new(service, output_dir)?,
        })
    }

    /// Run every item. Failures are logged and recorded; they never stop the batch.
    ///
    /// File names are unique within a batch; a repeated name gets a numeric suffix.
    #[instrument(skip_all, fields(items = items.len(), output_dir = %self.fetcher.output_dir().display()))]
    pub async fn run(&self, items: Vec<BatchItem>, progress: &dyn BatchProgress) -> BatchSummary {
        let start = Instant::now();
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut taken = HashSet::new();

        progress.phase("Generating presentations");

        for (i, item) in items.into_iter().enumerate() {
            progress.record_started(&item.identity, i + 1, total);
            let outcome = self.run_one(item, &mut taken).await;

            match &outcome.error {
                Some(error) => warn!(identity = %outcome.identity, %error, "record failed"),
                None => info!(
                    identity = %outcome.identity,
                    saved_to = ?outcome.saved_to,
                    "record saved"
                ),
            }

            progress.record_finished(&outcome);
            outcomes.push(outcome);
        }

        let summary = BatchSummary {
            outcomes,
            elapsed: start.elapsed(),
        };

        info!(
            saved = summary.saved(),
            failed = summary.failed(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch complete"
        );

        progress.done(&summary);
        summary
    }

    async fn run_one(&self, item: BatchItem, taken: &mut HashSet<String>) -> RecordOutcome {
        let BatchItem {
            identity,
            request,
            naming,
            mut history,
        } = item;

        let mut outcome_result = None;
        let attempt = self
            .attempt(&request, &naming, taken, &mut history, &mut outcome_result)
            .await;

        let edit_url = outcome_result
            .as_ref()
            .filter(|r| !r.edit_path.is_empty())
            .map(|r| service_url(self.client.base_url(), &r.edit_path));

        match attempt {
            Ok(path) => RecordOutcome {
                identity,
                history,
                saved_to: Some(path),
                error: None,
                result: outcome_result,
                edit_url,
            },
            Err(e) => {
                // Errors only leave `attempt` from a non-terminal state.
                let _ = history.advance(RecordState::Failed);
                RecordOutcome {
                    identity,
                    history,
                    saved_to: None,
                    error: Some(e.to_string()),
                    result: outcome_result,
                    edit_url,
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        naming: &ArtifactNaming,
        taken: &mut HashSet<String>,
        history: &mut StateHistory,
        result_slot: &mut Option<GenerationResult>,
    ) -> Result<PathBuf> {
        history.advance(RecordState::Requested)?;
        let result = self.client.generate(request).await?;
        let file_name = claim_file_name(&naming.file_name(&result, request.export_as), taken);
        let result = result_slot.insert(result);
        let path = self.fetcher.fetch(result, &file_name).await?;
        history.advance(RecordState::Saved)?;
        Ok(path)
    }
}
