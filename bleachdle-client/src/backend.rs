use async_trait::async_trait;
use reqwest::Client;

use bleachdle_types::{CharacterSummary, CompareResponse, GuessRequest};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// The game backend's JSON endpoints.
#[async_trait]
pub trait GameBackend: Send + Sync {
    async fn search_characters(&self, query: &str) -> Result<Vec<CharacterSummary>, ClientError>;

    async fn compare(
        &self,
        endpoint: &str,
        request: &GuessRequest,
    ) -> Result<CompareResponse, ClientError>;
}

/// Source of whole HTML pages for in-place navigation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, path: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check_status(response: &reqwest::Response) -> Result<(), ClientError> {
        if response.status().is_success() {
            return Ok(());
        }
        tracing::warn!("{} returned status {}", response.url(), response.status());
        Err(ClientError::Status {
            status: response.status().as_u16(),
            url: response.url().to_string(),
        })
    }
}

#[async_trait]
impl GameBackend for HttpBackend {
    async fn search_characters(&self, query: &str) -> Result<Vec<CharacterSummary>, ClientError> {
        tracing::debug!("Searching characters for {:?}", query);

        let response = self
            .client
            .get(self.url("/search_characters"))
            .query(&[("query", query)])
            .send()
            .await?;
        Self::check_status(&response)?;

        let results: Vec<CharacterSummary> = response.json().await?;
        tracing::debug!("Search for {:?} returned {} characters", query, results.len());
        Ok(results)
    }

    async fn compare(
        &self,
        endpoint: &str,
        request: &GuessRequest,
    ) -> Result<CompareResponse, ClientError> {
        tracing::debug!("Comparing {:?} via {}", request.selected_character, endpoint);

        let response = self
            .client
            .post(self.url(endpoint))
            .json(request)
            .send()
            .await?;
        Self::check_status(&response)?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpBackend {
    async fn fetch_page(&self, path: &str) -> Result<String, ClientError> {
        tracing::debug!("Fetching page {}", path);

        let response = self.client.get(self.url(path)).send().await?;
        Self::check_status(&response)?;

        Ok(response.text().await?)
    }
}
