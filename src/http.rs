//! HTTP fetching behind a trait so every stage can run against fixtures.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::config::HttpConfig;
use crate::error::Result;

/// Abstraction over HTTP GETs, enabling testability.
///
/// Both methods fail with [`crate::Error::Network`] on transport errors and on
/// non-success HTTP statuses. Implementations never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a document and decode it as text
    async fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Fetch the full body as raw bytes
    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes>;
}

/// Production [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured deadlines and user agent
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        Ok(response.error_for_status()?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Bytes> {
        Ok(self.get(url).await?.bytes().await?)
    }
}
