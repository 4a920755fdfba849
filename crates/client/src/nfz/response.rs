//! NFZ queue directory response types.

use nfzq_core::Queue;
use serde::Deserialize;

/// One page of the upstream queue listing.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub links: ResponseLinks,
    #[serde(default)]
    pub data: Vec<Queue>,
}

/// Page metadata. Only used for logging.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Pagination links.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default, rename = "self")]
    pub current: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

impl ApiResponse {
    /// Next page link, treating an empty string like `null`.
    pub fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref().filter(|link| !link.is_empty())
    }

    /// Number of pages implied by `meta.count` and the page size.
    pub fn page_count(&self, page_size: u64) -> u64 {
        let limit = self.meta.limit.filter(|l| *l > 0).unwrap_or(page_size.max(1));
        self.meta.count.div_ceil(limit)
    }
}
