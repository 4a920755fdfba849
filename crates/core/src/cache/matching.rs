//! Query subsumption and record-level refinement.
//!
//! A stored query subsumes a requested one when every record matching the
//! requested filter would also have matched the stored filter. Text
//! comparisons are case-insensitive throughout.

use crate::query::{FilterQuery, province_from_teryt_place};
use crate::queue::Queue;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Whether the result set stored for `stored` covers `requested`.
///
/// - `case` must be equal, `benefitForChildren` equal ignoring case.
/// - A stored `benefit` must be a substring of the requested one.
/// - A stored `province` must equal the requested one.
/// - A stored `locality` must be a prefix of the requested one.
///
/// An absent stored filter matches anything; a stored filter the request
/// omits never matches.
pub fn stored_subsumes(stored: &FilterQuery, requested: &FilterQuery) -> bool {
    if stored.case != requested.case {
        return false;
    }

    if stored.benefit_for_children.to_lowercase() != requested.benefit_for_children.to_lowercase() {
        return false;
    }

    let benefit_ok = match (&stored.benefit, &requested.benefit) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(stored), Some(requested)) => contains_ci(requested, stored),
    };
    if !benefit_ok {
        return false;
    }

    let province_ok = match (stored.province, requested.province) {
        (None, _) => true,
        (Some(stored), requested) => requested == Some(stored),
    };
    if !province_ok {
        return false;
    }

    match (&stored.locality, &requested.locality) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(stored), Some(requested)) => starts_with_ci(requested, stored),
    }
}

/// Whether a single record satisfies every filter `requested` specifies.
pub fn record_matches(requested: &FilterQuery, queue: &Queue) -> bool {
    let attributes = &queue.attributes;

    if let Some(benefit) = &requested.benefit
        && !contains_ci(attributes.benefit.as_deref().unwrap_or_default(), benefit)
    {
        return false;
    }

    if let Some(province) = requested.province
        && attributes.teryt_place.as_deref().and_then(province_from_teryt_place) != Some(province)
    {
        return false;
    }

    if let Some(locality) = &requested.locality
        && !contains_ci(attributes.locality.as_deref().unwrap_or_default(), locality)
    {
        return false;
    }

    true
}

/// Keep the records matching `requested`, preserving stored order.
pub fn refine(requested: &FilterQuery, queues: Vec<Queue>) -> Vec<Queue> {
    queues.into_iter().filter(|queue| record_matches(requested, queue)).collect()
}
