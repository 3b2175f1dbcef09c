//! Geodesy helpers shared by the geo-intent handlers.

pub mod gazetteer;
pub mod regions;

use regex::Regex;
use std::sync::LazyLock;

const EARTH_RADIUS_KM: f64 = 6371.0;

static LABELED_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)lat\s*[:=]\s*([-+]?\d+\.?\d*)\s*,?\s*lon\s*[:=]\s*([-+]?\d+\.?\d*)")
        .expect("labeled coordinate regex is valid")
});
static BARE_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([-+]?\d+\.?\d*)\s*,\s*([-+]?\d+\.?\d*)").expect("bare coordinate regex is valid")
});

/// Great-circle (haversine) distance between two points, in kilometres.
///
/// Pure computation; NaN coordinates propagate as NaN.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Pull a latitude/longitude pair out of free text.
///
/// Accepts labeled pairs ("lat: 12.97, lon: 77.59") or a bare "12.97, 77.59"
/// when both numbers fall inside valid coordinate ranges.
pub fn parse_lat_lon(text: &str) -> Option<(f64, f64)> {
    if let Some(caps) = LABELED_COORDS_RE.captures(text) {
        let lat = caps[1].parse().ok()?;
        let lon = caps[2].parse().ok()?;
        return Some((lat, lon));
    }
    if let Some(caps) = BARE_COORDS_RE.captures(text) {
        let lat: f64 = caps[1].parse().ok()?;
        let lon: f64 = caps[2].parse().ok()?;
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            return Some((lat, lon));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(6.9271, 79.8612, 6.9271, 79.8612), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let d1 = distance_km(6.9271, 79.8612, 13.0827, 80.2707);
        let d2 = distance_km(13.0827, 80.2707, 6.9271, 79.8612);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn colombo_to_chennai_magnitude() {
        // Roughly 690 km along the coast of the Bay of Bengal.
        let d = distance_km(6.9271, 79.8612, 13.0827, 80.2707);
        assert!(d > 600.0 && d < 750.0, "got {}", d);
    }

    #[test]
    fn nan_coordinates_propagate() {
        assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn parses_labeled_pair() {
        let parsed = parse_lat_lon("nearest floats to lat: 12.97, lon: 77.59");
        assert_eq!(parsed, Some((12.97, 77.59)));
    }

    #[test]
    fn parses_bare_pair_within_range() {
        assert_eq!(parse_lat_lon("floats near -12.5, 130.25"), Some((-12.5, 130.25)));
    }

    #[test]
    fn rejects_bare_pair_out_of_range() {
        assert_eq!(parse_lat_lon("values 250, 300 observed"), None);
    }

    #[test]
    fn rejects_text_without_coordinates() {
        assert_eq!(parse_lat_lon("nearest floats to this location"), None);
    }
}
