//! Filter query shared by the upstream client and the query cache.
//!
//! The same tuple is sent to the NFZ queue directory and used to key cached
//! result sets, so validation lives next to the type.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Lowest province (voivodeship) code accepted by the upstream API.
pub const MIN_PROVINCE: u8 = 1;

/// Highest province (voivodeship) code accepted by the upstream API.
pub const MAX_PROVINCE: u8 = 16;

/// Filter presented to both the query cache and the upstream client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    /// Urgency of the case: 1 (stable) or 2 (urgent).
    pub case: u8,

    /// `"true"` or `"false"`, compared case-insensitively.
    pub benefit_for_children: String,

    /// Substring of the benefit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<String>,

    /// Province code in `[1, 16]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<u8>,

    /// Prefix of the locality name. Requires `province`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
}

/// A single rule a [`FilterQuery`] can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryViolation {
    Case,
    BenefitForChildren,
    ProvinceRange,
    LocalityWithoutProvince,
}

impl QueryViolation {
    /// Name of the offending query parameter.
    pub fn field(&self) -> &'static str {
        match self {
            QueryViolation::Case => "case",
            QueryViolation::BenefitForChildren => "benefitForChildren",
            QueryViolation::ProvinceRange => "province",
            QueryViolation::LocalityWithoutProvince => "locality",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            QueryViolation::Case => "case must be 1 or 2",
            QueryViolation::BenefitForChildren => "benefitForChildren must be \"true\" or \"false\"",
            QueryViolation::ProvinceRange => "province must be in range [1, 16] (inclusive)",
            QueryViolation::LocalityWithoutProvince => "province must be specified when locality is specified",
        }
    }
}

impl FilterQuery {
    /// Build a query with only the required fields set.
    pub fn new(case: u8, benefit_for_children: impl Into<String>) -> Self {
        Self { case, benefit_for_children: benefit_for_children.into(), benefit: None, province: None, locality: None }
    }

    pub fn with_benefit(mut self, benefit: impl Into<String>) -> Self {
        self.benefit = Some(benefit.into());
        self
    }

    pub fn with_province(mut self, province: u8) -> Self {
        self.province = Some(province);
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    /// Every rule this query breaks, in checking order.
    pub fn violations(&self) -> Vec<QueryViolation> {
        let mut violations = Vec::new();

        if !matches!(self.case, 1 | 2) {
            violations.push(QueryViolation::Case);
        }

        let children = self.benefit_for_children.to_lowercase();
        if children != "true" && children != "false" {
            violations.push(QueryViolation::BenefitForChildren);
        }

        if let Some(province) = self.province
            && !(MIN_PROVINCE..=MAX_PROVINCE).contains(&province)
        {
            violations.push(QueryViolation::ProvinceRange);
        }

        if self.locality.is_some() && self.province.is_none() {
            violations.push(QueryViolation::LocalityWithoutProvince);
        }

        violations
    }

    /// Validate the query, failing on the first broken rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQuery` describing the first violation.
    pub fn validate(&self) -> Result<(), Error> {
        match self.violations().first() {
            Some(violation) => Err(Error::InvalidQuery(violation.message().to_string())),
            None => Ok(()),
        }
    }
}

/// Decode the province code from a record's `teryt-place` attribute.
///
/// The upstream data encodes the province as twice its code in the first two
/// characters (`"24..."` is province 12). Odd or non-numeric prefixes decode
/// to `None`.
pub fn province_from_teryt_place(teryt_place: &str) -> Option<u8> {
    let prefix = teryt_place.get(..2)?;
    let doubled: u8 = prefix.parse().ok()?;
    if doubled % 2 != 0 {
        return None;
    }
    Some(doubled / 2)
}
