//! Client for the presentation-generation service.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};

use deckgen_shared::{DeckgenError, GenerationRequest, GenerationResult, Result, ServiceConfig};

/// Endpoint that turns a prompt into a presentation.
pub const GENERATE_PATH: &str = "/api/v1/ppt/generate/presentation";

/// User-Agent string for service requests.
pub(crate) const USER_AGENT: &str = concat!("deckgen/", env!("CARGO_PKG_VERSION"));

/// Join the service base address and a path the service returned.
pub fn service_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Check the configured base address once, up front.
pub(crate) fn validate_base_url(base_url: &str) -> Result<()> {
    url::Url::parse(base_url)
        .map(|_| ())
        .map_err(|e| DeckgenError::config(format!("invalid service base_url '{base_url}': {e}")))
}

/// Sends generation requests to the service.
pub struct PresentationClient {
    client: Client,
    base_url: String,
}

impl PresentationClient {
    /// Build a client with the (long) generation timeout from the config.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        validate_base_url(&config.base_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.generate_timeout_secs))
            .build()
            .map_err(|e| DeckgenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Base address of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one request and wait for the finished presentation descriptor.
    ///
    /// Transport failures, non-2xx responses, and unparseable bodies all map to
    /// [`DeckgenError::Generation`] carrying the response text or error message.
    #[instrument(skip_all, fields(n_slides = request.n_slides, theme = %request.theme))]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let url = service_url(&self.base_url, GENERATE_PATH);
        info!(%url, prompt_len = request.prompt.len(), "requesting presentation");

        let response = self
            .client
            .post(&url)
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| DeckgenError::Generation(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeckgenError::Generation(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(DeckgenError::Generation(format!("HTTP {status}: {body}")));
        }

        let result: GenerationResult = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            DeckgenError::Generation(format!("unexpected response body: {e} (got: {preview})"))
        })?;

        debug!(
            path = %result.path,
            presentation_id = %result.presentation_id,
            "presentation generated"
        );

        Ok(result)
    }
}
