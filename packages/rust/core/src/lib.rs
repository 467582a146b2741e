//! Core job orchestration for deckgen.
//!
//! This crate ties together the input sources, prompt builders, the chat
//! model, and the presentation service into end-to-end jobs
//! (students, sales reports, pitch decks).

pub mod download;
pub mod generation;
pub mod jobs;
pub mod llm;
pub mod pipeline;
pub mod pitch;
pub mod questions;

pub use deckgen_sources::FetchOptions;
pub use download::{ArtifactFetcher, ArtifactNaming, claim_file_name, sanitize_file_name};
pub use generation::{GENERATE_PATH, PresentationClient, service_url};
pub use jobs::{run_sales_reports, run_student_presentations};
pub use llm::{ChatClient, FunctionSpec};
pub use pipeline::{
    BatchItem, BatchProgress, BatchRunner, BatchSummary, RecordOutcome, RecordState,
    SilentProgress, StateHistory,
};
pub use pitch::{PitchDeckOptions, run_pitch_deck};
pub use questions::{
    AnswerSource, FALLBACK_QUESTIONS, LineAnswers, QUESTION_COUNT, Questions, collect_answers,
    generate_outline, generate_questions,
};
