//! Download finished presentations into the output directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument};

use deckgen_shared::{DeckgenError, ExportFormat, GenerationResult, Result, ServiceConfig};

use crate::generation::{USER_AGENT, service_url, validate_base_url};

/// Path separators, characters Windows rejects, and control characters.
static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("valid regex")
});

/// Make `name` safe to use as a single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(name, "_");
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Claim `name` in `taken`, appending `_2`, `_3`, ... to the stem until it is free.
pub fn claim_file_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// How the local file name of an artifact is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactNaming {
    /// Keep the service's file name; use `fallback_stem` if the path has none.
    ResultFileName { fallback_stem: String },
    /// Always `<stem>.<ext>`.
    Stem(String),
}

impl ArtifactNaming {
    pub fn file_name(&self, result: &GenerationResult, format: ExportFormat) -> String {
        let raw = match self {
            Self::ResultFileName { fallback_stem } => {
                let last = result.path.rsplit('/').next().unwrap_or_default();
                if last.trim().is_empty() {
                    format!("{fallback_stem}.{}", format.extension())
                } else {
                    last.to_string()
                }
            }
            Self::Stem(stem) => format!("{stem}.{}", format.extension()),
        };
        sanitize_file_name(&raw)
    }
}

/// Fetches artifacts from the generation service.
pub struct ArtifactFetcher {
    client: Client,
    base_url: String,
    output_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(config: &ServiceConfig, output_dir: impl Into<PathBuf>) -> Result<Self> {
        validate_base_url(&config.base_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| DeckgenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            output_dir: output_dir.into(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download `result.path` and write it as `file_name` in the output directory.
    ///
    /// `file_name` is sanitized again here, so it can never name a path outside
    /// the output directory.
    #[instrument(skip_all, fields(path = %result.path))]
    pub async fn fetch(&self, result: &GenerationResult, file_name: &str) -> Result<PathBuf> {
        let url = service_url(&self.base_url, &result.path);
        debug!(%url, "downloading artifact");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeckgenError::Download(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeckgenError::Download(format!("{url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeckgenError::Download(format!("{url}: failed to read body: {e}")))?;

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| DeckgenError::io(&self.output_dir, e))?;

        let target = self.output_dir.join(sanitize_file_name(file_name));
        std::fs::write(&target, &bytes).map_err(|e| DeckgenError::io(&target, e))?;

        info!(path = %target.display(), bytes = bytes.len(), "artifact saved");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result(path: &str) -> GenerationResult {
        GenerationResult {
            path: path.into(),
            edit_path: String::new(),
            presentation_id: String::new(),
        }
    }

    fn temp_out() -> PathBuf {
        std::env::temp_dir().join(format!("dg-download-{}", Uuid::now_v7()))
    }

    fn fetcher(server: &MockServer, out: &Path) -> ArtifactFetcher {
        let config = ServiceConfig {
            base_url: format!("{}/", server.uri()),
            ..Default::default()
        };
        ArtifactFetcher::new(&config, out).unwrap()
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_file_name("A/B Corp"), "A_B Corp");
        assert_eq!(sanitize_file_name(r"..\evil"), "_evil");
        assert_eq!(sanitize_file_name("what?*.pdf"), "what__.pdf");
        assert_eq!(sanitize_file_name("tab\there"), "tab_here");
        assert_eq!(sanitize_file_name(" . "), "untitled");
        assert_eq!(sanitize_file_name("Acme_Sales_Report.pdf"), "Acme_Sales_Report.pdf");
    }

    #[test]
    fn claim_suffixes_taken_names() {
        let mut taken = HashSet::new();
        assert_eq!(claim_file_name("A_B_Sales_Report.pdf", &mut taken), "A_B_Sales_Report.pdf");
        assert_eq!(claim_file_name("A_B_Sales_Report.pdf", &mut taken), "A_B_Sales_Report_2.pdf");
        assert_eq!(claim_file_name("A_B_Sales_Report.pdf", &mut taken), "A_B_Sales_Report_3.pdf");
        assert_eq!(claim_file_name("A_B_Sales_Report_2.pdf", &mut taken), "A_B_Sales_Report_2_2.pdf");
        assert_eq!(claim_file_name("notes", &mut taken), "notes");
        assert_eq!(claim_file_name("notes", &mut taken), "notes_2");
    }

    #[test]
    fn naming_from_result_path() {
        let naming = ArtifactNaming::ResultFileName {
            fallback_stem: "Alice".into(),
        };
        assert_eq!(
            naming.file_name(&result("/app_data/exports/Alice_Report.pdf"), ExportFormat::Pdf),
            "Alice_Report.pdf"
        );
        assert_eq!(
            naming.file_name(&result("/app_data/exports/"), ExportFormat::Pdf),
            "Alice.pdf"
        );
    }

    #[test]
    fn naming_from_stem() {
        let naming = ArtifactNaming::Stem("A/B_Sales_Report".into());
        assert_eq!(
            naming.file_name(&result("/x/y.pptx"), ExportFormat::Pptx),
            "A_B_Sales_Report.pptx"
        );
    }

    #[tokio::test]
    async fn writes_body_to_output_dir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app_data/exports/alice.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let out = temp_out();
        let saved = fetcher(&server, &out)
            .fetch(&result("/app_data/exports/alice.pdf"), "alice.pdf")
            .await
            .unwrap();

        assert_eq!(saved, out.join("alice.pdf"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7");

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn path_without_leading_slash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/deck.pptx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let out = temp_out();
        let saved = fetcher(&server, &out)
            .fetch(&result("files/deck.pptx"), "deck.pptx")
            .await
            .unwrap();
        assert!(saved.exists());

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn non_success_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let out = temp_out();
        let err = fetcher(&server, &out)
            .fetch(&result("/missing.pdf"), "missing.pdf")
            .await
            .unwrap_err();

        match err {
            DeckgenError::Download(msg) => assert!(msg.contains("404")),
            other => panic!("expected Download, got {other:?}"),
        }
        assert!(!out.join("missing.pdf").exists());
    }

    #[tokio::test]
    async fn hostile_name_stays_in_output_dir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let out = temp_out();
        let saved = fetcher(&server, &out)
            .fetch(&result("/a.pdf"), "../../escape.pdf")
            .await
            .unwrap();
        assert_eq!(saved.parent(), Some(out.as_path()));

        let _ = std::fs::remove_dir_all(&out);
    }
}
