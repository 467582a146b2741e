//! Best-effort company profile extraction from a landing page.
//!
//! This is not a parser: four fields are pulled out of the page and anything
//! missing becomes an empty string. Fetch failures never abort the run; they
//! produce a profile with only the URL set.

use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};

use deckgen_shared::{CompanyProfile, DeckgenError, Result};

/// Browser User-Agent; many marketing sites reject obvious bots.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default timeout in seconds for fetching the page.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Options for fetching a company page.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for the HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Prefix `https://` when the operator typed a bare host.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Fetch a page and extract its profile. Never fails.
#[instrument(skip(opts))]
pub async fn fetch_company_profile(input: &str, opts: &FetchOptions) -> CompanyProfile {
    let url = normalize_url(input);

    match fetch_html(&url, opts).await {
        Ok(html) => {
            let profile = extract_profile(&html, &url);
            info!(
                title = %profile.title,
                description = %preview(&profile.description, 100),
                "company information fetched"
            );
            profile
        }
        Err(e) => {
            warn!(%url, error = %e, "could not fetch company information, continuing with empty fields");
            CompanyProfile::empty(url)
        }
    }
}

async fn fetch_html(url: &str, opts: &FetchOptions) -> Result<String> {
    let parsed =
        url::Url::parse(url).map_err(|e| DeckgenError::Network(format!("invalid URL '{url}': {e}")))?;

    let client = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| DeckgenError::Network(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| DeckgenError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DeckgenError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| DeckgenError::Network(format!("{url}: failed to read body: {e}")))
}

/// Extract title, meta description, first `<h1>` and first `<p>` from HTML.
pub fn extract_profile(html: &str, url: &str) -> CompanyProfile {
    let doc = Html::parse_document(html);

    let description = Selector::parse(r#"meta[name="description"]"#)
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .and_then(|el| el.value().attr("content").map(str::to_string))
        })
        .unwrap_or_default();

    CompanyProfile {
        url: url.to_string(),
        title: first_text(&doc, "title"),
        description,
        h1: first_text(&doc, "h1"),
        first_paragraph: first_text(&doc, "p"),
    }
}

fn first_text(doc: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(element_text))
        .unwrap_or_default()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First `max_chars` characters, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
