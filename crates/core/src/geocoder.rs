//! Address geocoding.
//!
//! The queue service depends only on the [`Geocoder`] trait. The default
//! implementation returns a fixed location; an HTTP-backed geocoder lives in
//! the client crate. [`CachingGeocoder`] puts the SQLite address cache in
//! front of either.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::CacheDb;
use crate::Error;

/// Result of geocoding one free-text address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub queried_address: String,
    pub located_address: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Maps a free-text address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, Error>;
}

/// Geocoder returning the same location for every address.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardcodedGeocoder;

impl HardcodedGeocoder {
    pub const LOCATED_ADDRESS: &'static str = "random hardcoded value";
    pub const LONGITUDE: f64 = 1337.0;
    pub const LATITUDE: f64 = 42.0;
}

#[async_trait]
impl Geocoder for HardcodedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, Error> {
        Ok(GeocodedAddress {
            queried_address: address.to_string(),
            located_address: Self::LOCATED_ADDRESS.to_string(),
            longitude: Self::LONGITUDE,
            latitude: Self::LATITUDE,
        })
    }
}

/// Geocoder that consults the address cache before delegating.
///
/// Cache faults are logged and bypassed; only the inner geocoder's errors
/// reach the caller.
#[derive(Debug, Clone)]
pub struct CachingGeocoder<G> {
    inner: G,
    db: CacheDb,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G, db: CacheDb) -> Self {
        Self { inner, db }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, Error> {
        match self.db.get_geocoded_address(address).await {
            Ok(Some(cached)) => {
                tracing::debug!(address, "geocoder cache hit");
                return Ok(cached);
            }
            Ok(None) => tracing::debug!(address, "geocoder cache miss"),
            Err(e) => tracing::warn!(error = %e, "failed to read geocoder cache"),
        }

        let located = self.inner.geocode(address).await?;

        if let Err(e) = self.db.put_geocoded_address(&located).await {
            tracing::warn!(error = %e, "failed to store geocoded address");
        }

        Ok(located)
    }
}
