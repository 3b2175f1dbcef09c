//! Minimal built-in gazetteer for the radius-search path.
//!
//! Lookup is exact after normalization; anything fancier belongs to a real
//! geocoding service.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

const PLACES: &[(&str, Coordinates)] = &[
    ("sri lanka", Coordinates { lat: 7.8731, lon: 80.7718 }),
    ("colombo", Coordinates { lat: 6.9271, lon: 79.8612 }),
    ("bay of bengal", Coordinates { lat: 15.0, lon: 90.0 }),
    ("arabian sea", Coordinates { lat: 18.0, lon: 64.0 }),
    ("indian ocean", Coordinates { lat: 0.0, lon: 80.0 }),
    ("chennai", Coordinates { lat: 13.0827, lon: 80.2707 }),
];

/// Resolve a place name to coordinates.
///
/// Case-insensitive, tolerates a leading "the " article, exact match only.
/// Returns `None` on a miss so the caller can ask the user for explicit
/// coordinates.
pub fn resolve(place: &str) -> Option<Coordinates> {
    let lowered = place.trim().to_lowercase();
    let normalized = lowered.strip_prefix("the ").unwrap_or(&lowered).trim();
    PLACES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, coords)| *coords)
}
