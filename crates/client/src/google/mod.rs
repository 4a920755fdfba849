//! Google Geocoding API client.
//!
//! Only the top result is used. An empty result list, or a non-`OK` status,
//! is reported as a geocoding failure.

use async_trait::async_trait;
use nfzq_core::{Error, GeocodedAddress, Geocoder};
use reqwest::header;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default Geocoding API endpoint.
const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by the Google Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Create a geocoder against a non-default endpoint.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: &str) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::GeocodeFailed(format!("invalid endpoint: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::GeocodeFailed(e.to_string()))?;

        Ok(Self { http, endpoint, api_key: api_key.into() })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, Error> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);

        tracing::debug!(address, "requesting google geocoder");

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::GeocodeFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::GeocodeFailed(format!("HTTP error: {status}")));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::GeocodeFailed(format!("parse error: {e}")))?;

        if let Some(api_status) = body.status.as_deref()
            && api_status != "OK"
            && api_status != "ZERO_RESULTS"
        {
            return Err(Error::GeocodeFailed(format!("api status {api_status}")));
        }

        let top = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::GeocodeFailed(format!("no results for {address}")))?;

        Ok(GeocodedAddress {
            queried_address: address.to_string(),
            located_address: top.formatted_address,
            longitude: top.geometry.location.lng,
            latitude: top.geometry.location.lat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;

    const FIXTURE_JSON: &str = r#"{
        "results": [
            {
                "formatted_address": "Ceglana 35, 40-514 Katowice, Poland",
                "geometry": { "location": { "lat": 50.2365, "lng": 18.9889 } }
            },
            {
                "formatted_address": "Ceglana, Katowice, Poland",
                "geometry": { "location": { "lat": 50.2, "lng": 18.9 } }
            }
        ],
        "status": "OK"
    }"#;

    fn geocoder(server: &MockServer) -> GoogleGeocoder {
        GoogleGeocoder::with_endpoint("test-key", &server.url("/maps/api/geocode/json")).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_takes_top_result() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/maps/api/geocode/json")
                    .query_param("address", "UL. CEGLANA 35, KATOWICE, ŚLĄSK")
                    .query_param("key", "test-key");
                then.status(200).header("content-type", "application/json").body(FIXTURE_JSON);
            })
            .await;

        let located = geocoder(&server).geocode("UL. CEGLANA 35, KATOWICE, ŚLĄSK").await.unwrap();
        mock.assert_async().await;

        assert_eq!(located.queried_address, "UL. CEGLANA 35, KATOWICE, ŚLĄSK");
        assert_eq!(located.located_address, "Ceglana 35, 40-514 Katowice, Poland");
        assert_eq!(located.latitude, 50.2365);
        assert_eq!(located.longitude, 18.9889);
    }

    #[tokio::test]
    async fn test_geocode_no_results() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/maps/api/geocode/json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"results": [], "status": "ZERO_RESULTS"}"#);
            })
            .await;

        let err = geocoder(&server).geocode("MARS BASE no.3").await.unwrap_err();
        assert!(matches!(err, Error::GeocodeFailed(_)));
    }

    #[tokio::test]
    async fn test_geocode_denied_key() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/maps/api/geocode/json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "bad key"}"#);
            })
            .await;

        let err = geocoder(&server).geocode("UL. CEGLANA 35").await.unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn test_geocode_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/maps/api/geocode/json");
                then.status(503);
            })
            .await;

        let err = geocoder(&server).geocode("UL. CEGLANA 35").await.unwrap_err();
        assert!(err.to_string().starts_with("GEOCODE_FAILED"));
    }
}
