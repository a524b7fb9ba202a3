//! HTTP client for the placeholder quote endpoint.

use crate::config::SyncConfig;
use crate::model::quote::Quote;
use crate::sync::error::{SyncError, SyncResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Remote endpoint pair: one resource to read, one collection to write.
#[derive(Clone)]
pub struct HttpQuoteRemote {
    client: Client,
    fetch_url: String,
    post_url: String,
}

impl HttpQuoteRemote {
    pub fn new(
        fetch_url: impl Into<String>,
        post_url: impl Into<String>,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            fetch_url: fetch_url.into(),
            post_url: post_url.into(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(
            config.fetch_url.clone(),
            config.post_url.clone(),
            config.request_timeout(),
        )
    }

    /// Fetches the remote resource and turns its `title` into a quote.
    pub async fn fetch_quote(&self) -> SyncResult<Quote> {
        let response = self.client.get(&self.fetch_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                stage: "fetch",
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| SyncError::MalformedResponse(err.to_string()))?;
        let title = body
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::MalformedResponse("missing string field `title`".into()))?;

        Ok(Quote::from_remote_title(title))
    }

    /// Posts `{text, category}` to the remote collection.
    ///
    /// The response body is ignored.
    pub async fn mirror_quote(&self, quote: &Quote) -> SyncResult<()> {
        let response = self
            .client
            .post(&self.post_url)
            .json(&serde_json::json!({
                "text": quote.text,
                "category": quote.category,
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                stage: "mirror",
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
