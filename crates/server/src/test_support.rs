//! Fakes shared by the service and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nfzq_client::{NfzError, QueuesSource};
use nfzq_core::{Error, FilterQuery, GeocodedAddress, Geocoder, Queue};
use serde_json::json;

/// Record with the attributes the cache filters on.
pub fn queue(id: &str, benefit: &str, locality: &str, teryt_place: &str) -> Queue {
    serde_json::from_value(json!({
        "type": "queues",
        "id": id,
        "attributes": {
            "case": 1,
            "benefit": benefit,
            "many-places": "N",
            "provider": "SZPITAL MIEJSKI",
            "provider-code": "120/000077",
            "regon-provider": "000000077",
            "nip-provider": "6340000077",
            "teryt-provider": teryt_place,
            "place": "PORADNIA",
            "address": "UL. CEGLANA 35",
            "locality": locality,
            "phone": "+48 32 000 00 77",
            "teryt-place": teryt_place,
            "registry-number": "000000000077-W-24",
            "id-resort-part-VII": "01",
            "id-resort-part-VIII": "1030",
            "benefits-for-children": null,
            "covid-19": "N",
            "toilet": "Y",
            "ramp": "N",
            "car-park": "Y",
            "elevator": "N",
            "latitude": null,
            "longitude": null,
            "statistics": null,
            "dates": null,
            "benefits-provided": null
        }
    }))
    .unwrap()
}

/// Upstream fake counting `fetch_all` calls.
#[derive(Clone)]
pub struct FakeSource {
    queues: Option<Vec<Queue>>,
    calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn returning(queues: Vec<Queue>) -> Self {
        Self { queues: Some(queues), calls: Arc::default() }
    }

    pub fn failing() -> Self {
        Self { queues: None, calls: Arc::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueuesSource for FakeSource {
    async fn fetch_all(&self, _query: &FilterQuery) -> Result<Vec<Queue>, NfzError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queues.clone().ok_or(NfzError::HttpError { status: 500 })
    }
}

/// Geocoder fake recording every address it is asked about.
#[derive(Clone, Default)]
pub struct FakeGeocoder {
    fail: bool,
    addresses: Arc<Mutex<Vec<String>>>,
}

impl FakeGeocoder {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.addresses().len()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, Error> {
        self.addresses.lock().unwrap().push(address.to_string());
        if self.fail {
            return Err(Error::GeocodeFailed(format!("no results for {address}")));
        }
        Ok(GeocodedAddress {
            queried_address: address.to_string(),
            located_address: "Ceglana 35, Katowice".to_string(),
            longitude: 19.0,
            latitude: 50.0,
        })
    }
}
