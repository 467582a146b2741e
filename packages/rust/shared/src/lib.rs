//! Shared types, error model, and configuration for deckgen.
//!
//! This crate is the foundation depended on by all other deckgen crates.
//! It provides:
//! - [`DeckgenError`] — the unified error type
//! - Domain types ([`Record`], [`CompanyProfile`], [`SalesSummary`], [`GenerationRequest`])
//! - Configuration ([`AppConfig`], [`JobSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, JobSettings, OpenAiConfig, PitchConfig, SalesConfig, ServiceConfig,
    StudentsConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{DeckgenError, Result};
pub use types::{
    CompanyProfile, ExportFormat, GenerationRequest, GenerationResult, PromptContext, QaPair,
    Record, RegionSummary, SalesSummary, Theme,
};
