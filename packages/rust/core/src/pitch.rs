//! Pitch-deck job: company page → questions → answers → outline → deck.

use tracing::{info, instrument};

use deckgen_prompts::pitch_prompt;
use deckgen_shared::{JobSettings, PromptContext, Result, ServiceConfig};
use deckgen_sources::{FetchOptions, fetch_company_profile};

use crate::download::ArtifactNaming;
use crate::jobs::request_for;
use crate::llm::ChatClient;
use crate::pipeline::{
    BatchItem, BatchProgress, BatchRunner, BatchSummary, RecordState, StateHistory,
};
use crate::questions::{AnswerSource, collect_answers, generate_outline, generate_questions};

/// Stem used when the company page has no title.
const DEFAULT_STEM: &str = "pitch_deck";

/// Inputs for one pitch deck.
#[derive(Debug, Clone)]
pub struct PitchDeckOptions {
    /// Company website as typed by the operator; a scheme is added if missing.
    pub url: String,
    pub service: ServiceConfig,
    pub job: JobSettings,
    pub fetch: FetchOptions,
}

/// Build and download one pitch deck.
///
/// The page fetch, question, and outline steps all recover with defaults;
/// only operator input failures and service configuration errors are fatal.
/// Generation and download failures are recorded in the returned summary.
#[instrument(skip_all, fields(url = %options.url))]
pub async fn run_pitch_deck(
    chat: &ChatClient,
    options: &PitchDeckOptions,
    answers: &mut dyn AnswerSource,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    let runner = BatchRunner::new(&options.service, &options.job.output_dir)?;
    let mut history = StateHistory::new();

    progress.phase("Fetching company page");
    let profile = fetch_company_profile(&options.url, &options.fetch).await;
    history.advance(RecordState::Sourced)?;
    info!(title = %profile.title, "company profile ready");

    progress.phase("Generating questions");
    let questions = generate_questions(chat, &profile).await;
    let replies = collect_answers(&questions, answers)?;
    history.advance(RecordState::QaDone)?;

    let context = PromptContext::new(profile, questions.iter().cloned(), replies);

    progress.phase("Generating outline");
    let outline = generate_outline(chat, &context).await;
    let prompt = pitch_prompt(&context.profile, &outline, options.job.n_slides);
    history.advance(RecordState::Prompted)?;

    let profile = context.profile;
    let (identity, stem) = if profile.title.is_empty() {
        (profile.url.clone(), DEFAULT_STEM.to_string())
    } else {
        (profile.title.clone(), profile.title.clone())
    };

    let item = BatchItem {
        identity,
        request: request_for(&options.job, prompt),
        naming: ArtifactNaming::ResultFileName { fallback_stem: stem },
        history,
    };

    Ok(runner.run(vec![item], progress).await)
}
