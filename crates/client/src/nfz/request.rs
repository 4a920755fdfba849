//! Request URL construction for the NFZ queue directory.

use nfzq_core::FilterQuery;
use url::{Url, form_urlencoded};

use super::NfzError;

/// Path of the queue listing endpoint, relative to the API base URL.
pub const QUEUES_PATH: &str = "app-itl-api/queues";

/// API version pinned on the first request.
pub const API_VERSION: &str = "1.3";

/// Records requested per page.
pub const PAGE_SIZE: u32 = 25;

/// Build the URL of the first page for `query`.
///
/// Optional filters are appended only when present. `province` is
/// zero-padded to two digits. Values are percent-encoded with spaces as `%20`.
pub fn first_page_url(base_url: &Url, query: &FilterQuery) -> Result<Url, NfzError> {
    let endpoint = format!("{}/{}", base_url.as_str().trim_end_matches('/'), QUEUES_PATH);
    let mut url = Url::parse(&endpoint).map_err(|e| NfzError::InvalidUrl(e.to_string()))?;

    let mut pairs = vec![
        ("format", "json".to_string()),
        ("api-version", API_VERSION.to_string()),
        ("page", "1".to_string()),
        ("limit", PAGE_SIZE.to_string()),
        ("case", query.case.to_string()),
        ("benefitForChildren", query.benefit_for_children.clone()),
    ];
    if let Some(benefit) = &query.benefit {
        pairs.push(("benefit", benefit.clone()));
    }
    if let Some(province) = query.province {
        pairs.push(("province", format!("{province:02}")));
    }
    if let Some(locality) = &query.locality {
        pairs.push(("locality", locality.clone()));
    }

    let query_string =
        pairs.iter().map(|(key, value)| format!("{key}={}", encode_component(value))).collect::<Vec<_>>().join("&");
    url.set_query(Some(&query_string));

    Ok(url)
}

/// Percent-encode a query value, spelling spaces as `%20` rather than `+`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>().replace('+', "%20")
}

/// Resolve an upstream `links.next` value.
///
/// Relative links are joined onto the base URL; absolute links are followed
/// as given. The link's query string is never rewritten.
pub fn next_page_url(base_url: &Url, link: &str) -> Result<Url, NfzError> {
    base_url.join(link).map_err(|e| NfzError::InvalidUrl(format!("{link}: {e}")))
}
