// # HTTP Snapshot Source
//
// This crate provides an HTTP-based snapshot source for the resetcast engine.
//
// ## Purpose
//
// Fetches the current rotation snapshot from the companion database's content
// API, keyed by a fixed content-key template, and decodes it into the engine's
// snapshot model.
//
// ## Constraints
//
// Single-shot: one request per fetch, no retry logic (the scheduler owns the
// retry budget), no caching (the snapshot is transient per tick).

use async_trait::async_trait;
use resetcast_core::model::ResetSnapshot;
use resetcast_core::traits::SnapshotSource;
use resetcast_core::{Error, Result};
use std::time::Duration;

/// HTTP timeout for content API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot source backed by the HTTP content API
pub struct HttpSnapshotSource {
    base_url: String,
    content_key: String,
    lang: String,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    /// Create a source for `{base_url}/{content_key}?lang={lang}`
    pub fn new(
        base_url: impl Into<String>,
        content_key: impl Into<String>,
        lang: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let content_key = content_key.into();
        if base_url.is_empty() {
            return Err(Error::config("content API base URL cannot be empty"));
        }
        if content_key.is_empty() {
            return Err(Error::config("content key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            content_key,
            lang: lang.into(),
            client,
        })
    }

    /// The endpoint one fetch hits
    fn endpoint(&self) -> String {
        format!(
            "{}/{}?lang={}",
            self.base_url, self.content_key, self.lang
        )
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<ResetSnapshot> {
        let url = self.endpoint();
        tracing::debug!(%url, "fetching snapshot");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::source(format!("snapshot request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::source(format!(
                "snapshot fetch returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<ResetSnapshot>()
            .await
            .map_err(|e| Error::source(format!("snapshot decode failed: {e}")))
    }

    fn source_name(&self) -> &'static str {
        "http-content-api"
    }
}
