//! Query intent detection.
//!
//! Geo-proximity intents are narrow and unambiguous, so they pre-empt the
//! broader aggregate path. Checks run in fixed priority order with the first
//! match winning.

use regex::Regex;
use std::sync::LazyLock;

static WITHIN_KM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)within\s+(\d{1,4})\s*km\s+of\s+(.+)$").expect("within-km regex is valid")
});

/// Handling strategy selected for a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// "nearest floats to <coords>": rank the whole store by distance.
    NearestFloats,
    /// "within <radius> km of <place>": gazetteer lookup plus radius filter.
    WithinRadius { radius_km: f64, place: String },
    /// Everything else: constraint extraction, store query, synthesis.
    Aggregate,
}

pub fn classify(query: &str) -> Intent {
    if query.to_lowercase().contains("nearest") {
        return Intent::NearestFloats;
    }
    if let Some(caps) = WITHIN_KM_RE.captures(query.trim()) {
        if let Ok(radius_km) = caps[1].parse::<f64>() {
            let place = caps[2].trim().trim_end_matches('?').trim().to_lowercase();
            return Intent::WithinRadius { radius_km, place };
        }
    }
    Intent::Aggregate
}
