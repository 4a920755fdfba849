//! Queue records as returned by the NFZ queue directory API.
//!
//! The cache treats these as opaque payloads apart from `benefit`,
//! `locality` and `teryt-place`, which drive record-level filtering.

use serde::{Deserialize, Serialize};

/// Region suffix appended to every address sent to the geocoder.
pub const GEOCODING_REGION_SUFFIX: &str = "ŚLĄSK";

/// One healthcare-queue listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub attributes: QueueAttributes,
}

/// Flat attribute set of a queue listing.
///
/// Every attribute is optional on the wire. Records missing a field the
/// cache requires still deserialize and are rejected when stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub many_places: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regon_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teryt_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teryt_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_number: Option<String>,
    #[serde(default, rename = "id-resort-part-VII", skip_serializing_if = "Option::is_none")]
    pub id_resort_part_vii: Option<String>,
    #[serde(default, rename = "id-resort-part-VIII", skip_serializing_if = "Option::is_none")]
    pub id_resort_part_viii: Option<String>,
    #[serde(default)]
    pub benefits_for_children: Option<String>,
    #[serde(default, rename = "covid-19", skip_serializing_if = "Option::is_none")]
    pub covid_19: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toilet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_park: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevator: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub statistics: Option<QueueStatistics>,
    #[serde(default)]
    pub dates: Option<QueueDates>,
    #[serde(default)]
    pub benefits_provided: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueStatistics {
    #[serde(default)]
    pub provider_data: Option<ProviderData>,
    #[serde(default)]
    pub computed_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderData {
    pub awaiting: i64,
    pub removed: i64,
    pub average_period: i64,
    pub update: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueDates {
    pub applicable: bool,
    pub date: String,
    pub date_situation_as_at: String,
}

impl Queue {
    /// Free-text address handed to the geocoder for this record.
    pub fn geocoding_address(&self) -> String {
        let attributes = &self.attributes;
        format!(
            "{}, {}, {}",
            attributes.address.as_deref().unwrap_or_default(),
            attributes.locality.as_deref().unwrap_or_default(),
            GEOCODING_REGION_SUFFIX
        )
    }
}
