//! NFZ queue directory API client.
//!
//! Fetches every page of the queue listing for a [`FilterQuery`] and
//! concatenates the records in upstream order.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://api.nfz.gov.pl/app-itl-api/queues`
//! - **Pagination**: 25 records per page. The first request carries the full
//!   filter; later pages follow `links.next` as returned, even though those
//!   links drop `benefitForChildren` and `api-version`.
//! - **Termination**: stops when `links.next` is `null`, or fails once the
//!   configured page budget is exhausted.
//! - **Failure**: any failed page fails the whole fetch. Nothing partial is
//!   returned.

pub mod error;
pub mod request;
pub mod response;

pub use error::NfzError;
pub use request::{first_page_url, next_page_url};
pub use response::{ApiResponse, ResponseLinks, ResponseMeta};

use async_trait::async_trait;
use nfzq_core::{AppConfig, FilterQuery, Queue};
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Default base URL of the NFZ API.
const DEFAULT_BASE_URL: &str = "https://api.nfz.gov.pl";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "nfz-queues/0.1";

/// Default page budget per fetch.
const DEFAULT_MAX_PAGES: usize = 1000;

/// NFZ client configuration.
#[derive(Debug, Clone)]
pub struct NfzConfig {
    /// Base URL (default: https://api.nfz.gov.pl).
    pub base_url: String,
    /// Per-request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: nfz-queues/0.x).
    pub user_agent: String,
    /// Maximum pages followed for one query.
    pub max_pages: usize,
}

impl Default for NfzConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl From<&AppConfig> for NfzConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.nfz_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            max_pages: config.max_pages,
        }
    }
}

/// Source of complete, unpaginated queue listings.
#[async_trait]
pub trait QueuesSource: Send + Sync {
    async fn fetch_all(&self, query: &FilterQuery) -> Result<Vec<Queue>, NfzError>;
}

/// NFZ queue directory client.
#[derive(Debug, Clone)]
pub struct NfzClient {
    http: reqwest::Client,
    base_url: Url,
    config: NfzConfig,
}

impl NfzClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NfzConfig) -> Result<Self, NfzError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| NfzError::InvalidUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NfzError::Network(Arc::new(e)))?;

        Ok(Self { http, base_url, config })
    }

    /// Fetch every record matching `query`, following pagination links.
    ///
    /// The query is validated before any request is made.
    pub async fn fetch_all(&self, query: &FilterQuery) -> Result<Vec<Queue>, NfzError> {
        query.validate().map_err(|e| match e {
            nfzq_core::Error::InvalidQuery(msg) => NfzError::InvalidQuery(msg),
            other => NfzError::InvalidQuery(other.to_string()),
        })?;

        tracing::info!(?query, "fetching all queues");
        let start = Instant::now();

        let mut queues = Vec::new();
        let mut next = Some(first_page_url(&self.base_url, query)?);
        let mut requests = 0usize;

        while let Some(url) = next.take() {
            if requests >= self.config.max_pages {
                tracing::warn!(limit = self.config.max_pages, "pagination did not terminate");
                return Err(NfzError::TooManyPages { limit: self.config.max_pages });
            }
            requests += 1;

            tracing::debug!(request = requests, url = %url, "network request no. {requests}");
            let page = self.fetch_page(url).await?;

            if requests == 1 {
                let pages = page.page_count(u64::from(request::PAGE_SIZE));
                tracing::info!(count = page.meta.count, pages, "all queues = {}, pages = {}", page.meta.count, pages);
            }

            next = page.next_link().map(|link| next_page_url(&self.base_url, link)).transpose()?;
            queues.extend(page.data);
        }

        tracing::debug!("fetched {} queues in {} requests ({:?})", queues.len(), requests, start.elapsed());

        Ok(queues)
    }

    async fn fetch_page(&self, url: Url) -> Result<ApiResponse, NfzError> {
        let http_response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("NFZ API response status: {}", status);

        if status.is_client_error() || status.is_server_error() {
            return Err(NfzError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NfzError::Parse(e.to_string()))
    }
}

#[async_trait]
impl QueuesSource for NfzClient {
    async fn fetch_all(&self, query: &FilterQuery) -> Result<Vec<Queue>, NfzError> {
        NfzClient::fetch_all(self, query).await
    }
}
