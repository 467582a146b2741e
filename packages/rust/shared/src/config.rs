//! Application configuration for deckgen.
//!
//! User config lives at `~/.deckgen/deckgen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeckgenError, Result};
use crate::types::{ExportFormat, Theme};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "deckgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".deckgen";

// ---------------------------------------------------------------------------
// Config structs (matching deckgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Presentation service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Chat-completion settings for the pitch-deck job.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Student presentation job.
    #[serde(default)]
    pub students: StudentsConfig,

    /// Sales report job.
    #[serde(default)]
    pub sales: SalesConfig,

    /// Pitch deck job.
    #[serde(default)]
    pub pitch: PitchConfig,
}

/// `[service]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base address of the presentation service; download paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single generation call. Generation can take minutes.
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,

    /// Timeout for downloading a generated file.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            generate_timeout_secs: default_generate_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".into()
}
fn default_generate_timeout() -> u64 {
    500
}
fn default_download_timeout() -> u64 {
    120
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model used for questions and outlines.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_questions_max_tokens")]
    pub questions_max_tokens: u32,

    #[serde(default = "default_outline_max_tokens")]
    pub outline_max_tokens: u32,

    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_openai_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            questions_max_tokens: default_questions_max_tokens(),
            outline_max_tokens: default_outline_max_tokens(),
            timeout_secs: default_openai_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_questions_max_tokens() -> u32 {
    300
}
fn default_outline_max_tokens() -> u32 {
    1500
}
fn default_openai_timeout() -> u64 {
    60
}

fn default_language() -> String {
    "English".into()
}

/// `[students]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsConfig {
    /// CSV file, relative to the working directory.
    #[serde(default = "default_students_input")]
    pub input: String,
    #[serde(default = "default_students_output")]
    pub output_dir: String,
    #[serde(default = "default_students_slides")]
    pub n_slides: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub export_as: ExportFormat,
}

impl Default for StudentsConfig {
    fn default() -> Self {
        Self {
            input: default_students_input(),
            output_dir: default_students_output(),
            n_slides: default_students_slides(),
            language: default_language(),
            theme: Theme::Light,
            export_as: ExportFormat::Pdf,
        }
    }
}

fn default_students_input() -> String {
    "students.csv".into()
}
fn default_students_output() -> String {
    "presentations".into()
}
fn default_students_slides() -> u32 {
    8
}

/// `[sales]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesConfig {
    #[serde(default = "default_sales_input")]
    pub input: String,
    #[serde(default = "default_sales_output")]
    pub output_dir: String,
    #[serde(default = "default_sales_slides")]
    pub n_slides: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_sales_theme")]
    pub theme: Theme,
    #[serde(default)]
    pub export_as: ExportFormat,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            input: default_sales_input(),
            output_dir: default_sales_output(),
            n_slides: default_sales_slides(),
            language: default_language(),
            theme: default_sales_theme(),
            export_as: ExportFormat::Pdf,
        }
    }
}

fn default_sales_input() -> String {
    "sales_data.csv".into()
}
fn default_sales_output() -> String {
    "reports".into()
}
fn default_sales_slides() -> u32 {
    5
}
fn default_sales_theme() -> Theme {
    Theme::LightRed
}

/// `[pitch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchConfig {
    #[serde(default = "default_pitch_output")]
    pub output_dir: String,
    #[serde(default = "default_pitch_slides")]
    pub n_slides: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub export_as: ExportFormat,
    /// Timeout for fetching the company page.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            output_dir: default_pitch_output(),
            n_slides: default_pitch_slides(),
            language: default_language(),
            theme: Theme::Light,
            export_as: ExportFormat::Pdf,
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_pitch_output() -> String {
    "pitch-decks".into()
}
fn default_pitch_slides() -> u32 {
    10
}
fn default_fetch_timeout() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Job settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime settings for one job, merged from a config section and CLI flags.
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Input file (unused by the pitch-deck job).
    pub input: PathBuf,
    /// Directory artifacts are written to; created if absent.
    pub output_dir: PathBuf,
    pub n_slides: u32,
    pub language: String,
    pub theme: Theme,
    pub export_as: ExportFormat,
}

impl From<&StudentsConfig> for JobSettings {
    fn from(config: &StudentsConfig) -> Self {
        Self {
            input: PathBuf::from(&config.input),
            output_dir: PathBuf::from(&config.output_dir),
            n_slides: config.n_slides,
            language: config.language.clone(),
            theme: config.theme,
            export_as: config.export_as,
        }
    }
}

impl From<&SalesConfig> for JobSettings {
    fn from(config: &SalesConfig) -> Self {
        Self {
            input: PathBuf::from(&config.input),
            output_dir: PathBuf::from(&config.output_dir),
            n_slides: config.n_slides,
            language: config.language.clone(),
            theme: config.theme,
            export_as: config.export_as,
        }
    }
}

impl From<&PitchConfig> for JobSettings {
    fn from(config: &PitchConfig) -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from(&config.output_dir),
            n_slides: config.n_slides,
            language: config.language.clone(),
            theme: config.theme,
            export_as: config.export_as,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.deckgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DeckgenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.deckgen/deckgen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DeckgenError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DeckgenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DeckgenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DeckgenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DeckgenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the chat API key from the env var named in the config.
///
/// A missing or empty key is a fatal configuration error.
pub fn resolve_api_key(config: &OpenAiConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(DeckgenError::config(format!(
            "OpenAI API key not found. Set the {var_name} environment variable:\n\
             export {var_name}='your-key-here'"
        ))),
    }
}
