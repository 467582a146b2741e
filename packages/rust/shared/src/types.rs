//! Core domain types: records, prompt context, and generation messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DeckgenError, Result};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One row of structured input, keyed by column name.
///
/// Cell text is trimmed on read. A record is never mutated after it is built;
/// construct it from an iterator of `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    /// Raw cell text, or `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Cell text, or the empty string when the column is absent.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Parse a numeric cell.
    ///
    /// Absent columns and blank cells are `None`; anything else that is not a
    /// finite number is a parse error naming the column.
    pub fn number(&self, column: &str) -> Result<Option<f64>> {
        let raw = self.text(column);
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(DeckgenError::parse(format!(
                "column '{column}': '{raw}' is not a number"
            ))),
        }
    }

    /// Number of columns in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| {
                    let value: String = v.into();
                    (k.into(), value.trim().to_string())
                })
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// CompanyProfile
// ---------------------------------------------------------------------------

/// Fields scraped from a company's landing page.
///
/// Every field except `url` may be empty; extraction is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub url: String,
    pub title: String,
    pub description: String,
    pub h1: String,
    pub first_paragraph: String,
}

impl CompanyProfile {
    /// A profile carrying only the URL, used when fetching fails.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Sales aggregates
// ---------------------------------------------------------------------------

/// Per-region breakdown inside a [`SalesSummary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    pub total_sales: f64,
    pub product_a: f64,
    pub product_b: f64,
    pub product_c: f64,
    /// Top rep from the region's first row.
    pub top_sales_rep: String,
    /// New clients from the region's first row, as written in the source.
    pub new_clients: String,
}

/// All sales rows of one company reduced to a single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub company: String,
    pub total_sales: f64,
    pub total_new_clients: f64,
    pub mean_churn: f64,
    pub mean_satisfaction: f64,
    pub mean_growth: f64,
    pub marketing_spend: f64,
    /// Unique notable events in first-appearance order.
    pub notable_events: Vec<String>,
    /// Regions in first-appearance order.
    pub regions: Vec<RegionSummary>,
}

// ---------------------------------------------------------------------------
// Prompt context
// ---------------------------------------------------------------------------

/// A clarifying question and the operator's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Everything the pitch-deck outline prompt is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub profile: CompanyProfile,
    pub qa: Vec<QaPair>,
}

impl PromptContext {
    /// Pair questions with answers in order. Extra items on either side are dropped.
    pub fn new<Q, A>(profile: CompanyProfile, questions: Q, answers: A) -> Self
    where
        Q: IntoIterator,
        Q::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let qa = questions
            .into_iter()
            .zip(answers)
            .map(|(q, a)| QaPair {
                question: q.into(),
                answer: a.into(),
            })
            .collect();
        Self { profile, qa }
    }
}

// ---------------------------------------------------------------------------
// Generation messages
// ---------------------------------------------------------------------------

/// Presentation theme understood by the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Cream,
    RoyalBlue,
    FaintYellow,
    LightRed,
    DarkPink,
}

impl Theme {
    /// Wire value for the `theme` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Cream => "cream",
            Self::RoyalBlue => "royal_blue",
            Self::FaintYellow => "faint_yellow",
            Self::LightRed => "light_red",
            Self::DarkPink => "dark_pink",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format the service exports to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Pptx,
}

impl ExportFormat {
    /// Wire value for the `export_as` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
        }
    }

    /// File extension for downloaded artifacts (without the dot).
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call to the presentation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub n_slides: u32,
    pub language: String,
    pub theme: Theme,
    pub export_as: ExportFormat,
}

impl GenerationRequest {
    /// Form fields in the order the service documents them.
    pub fn form_fields(&self) -> [(&'static str, String); 5] {
        [
            ("prompt", self.prompt.clone()),
            ("n_slides", self.n_slides.to_string()),
            ("language", self.language.clone()),
            ("theme", self.theme.as_str().to_string()),
            ("export_as", self.export_as.as_str().to_string()),
        ]
    }
}

/// Descriptor returned by the presentation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Download path relative to the service base address.
    pub path: String,
    #[serde(default)]
    pub edit_path: String,
    #[serde(default)]
    pub presentation_id: String,
}
