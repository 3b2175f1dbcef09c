//! Rule-based constraint extraction for the aggregate path.
//!
//! Each rule tests a phrase against the lowercased query text. Rules are
//! additive, except parameter selection which is a single mutually-exclusive
//! branch evaluated last.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::QueryError;
use crate::geo::regions::{RegionBox, EQUATOR_BAND, INDIAN_OCEAN};
use crate::types::Parameter;

/// Hard cap on rows returned by any aggregate query.
pub const ROW_CAP: usize = 200;

/// Time window attached to a constraint set. An explicit absolute range and a
/// relative day-count are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeWindow {
    /// Start inclusive, end exclusive.
    Absolute { start: DateTime<Utc>, end: DateTime<Utc> },
    /// Rows no older than this many days before now.
    RelativeDays(i64),
}

/// Normalized query constraints produced by [`extract`].
///
/// Always carries the row cap, newest-first ordering, and a non-null filter
/// on the selected parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    pub parameter: Parameter,
    pub region: Option<RegionBox>,
    pub window: Option<TimeWindow>,
    pub limit: usize,
}

impl ConstraintSet {
    /// Reject internally inconsistent sets before they reach the store.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.limit == 0 {
            return Err(QueryError::MalformedConstraint("row limit is zero".into()));
        }
        if let Some(region) = &self.region {
            if region.lat_min > region.lat_max || region.lon_min > region.lon_max {
                return Err(QueryError::MalformedConstraint(format!(
                    "inverted region box '{}'",
                    region.name
                )));
            }
        }
        match &self.window {
            Some(TimeWindow::Absolute { start, end }) if start >= end => {
                return Err(QueryError::MalformedConstraint("absolute time range is empty".into()));
            }
            Some(TimeWindow::RelativeDays(days)) if *days <= 0 => {
                return Err(QueryError::MalformedConstraint(
                    "relative window must cover at least one day".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    /// Deterministic rendering of the resolved predicates, echoed back to the
    /// caller in the response envelope.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("{} IS NOT NULL", self.parameter)];
        if let Some(region) = &self.region {
            parts.push(format!(
                "{}: lat {}..{}, lon {}..{}",
                region.name, region.lat_min, region.lat_max, region.lon_min, region.lon_max
            ));
        }
        match &self.window {
            Some(TimeWindow::Absolute { start, end }) => parts.push(format!(
                "timestamp in [{}, {})",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )),
            Some(TimeWindow::RelativeDays(days)) => {
                parts.push(format!("timestamp within last {} days", days))
            }
            None => {}
        }
        format!("{} ORDER BY timestamp DESC LIMIT {}", parts.join(" AND "), self.limit)
    }
}

/// Map recognized phrases in the query text to normalized constraints.
pub fn extract(query: &str) -> ConstraintSet {
    let q = query.to_lowercase();

    // Region rules are mutually exclusive: the first match applies, with the
    // narrower equatorial band checked before the Indian Ocean box.
    let region = if q.contains("equator") {
        Some(EQUATOR_BAND)
    } else if q.contains("indian ocean") {
        Some(INDIAN_OCEAN)
    } else {
        None
    };

    // Relative recency markers may stack; the smallest window wins. An
    // explicit absolute range overrides them entirely.
    let mut relative_days: Option<i64> = None;
    let mut mark = |days: i64| {
        relative_days = Some(relative_days.map_or(days, |current| current.min(days)));
    };
    if q.contains("last 30 days") || q.contains("past 30 days") || q.contains("30 days") {
        mark(30);
    }
    if q.contains("this week")
        || q.contains("past week")
        || q.contains("last 7 days")
        || q.contains("7 days")
    {
        mark(7);
    }
    if q.contains("last 6 months") || q.contains("past 6 months") || q.contains("6 months") {
        mark(180);
    }

    let window = if q.contains("march 2023") {
        Some(TimeWindow::Absolute {
            start: march_2023_bound(3),
            end: march_2023_bound(4),
        })
    } else {
        relative_days.map(TimeWindow::RelativeDays)
    };

    // Parameter selection: single branch, fixed priority, salinity default.
    let parameter = if q.contains("oxygen") || q.contains("o2") {
        Parameter::Oxygen
    } else if q.contains("salinity") || q.contains("psal") {
        Parameter::Salinity
    } else if q.contains("temperature") || q.contains("temp") {
        Parameter::Temperature
    } else {
        Parameter::Salinity
    };

    ConstraintSet { parameter, region, window, limit: ROW_CAP }
}

fn march_2023_bound(month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, month, 1, 0, 0, 0)
        .single()
        .expect("fixed calendar bound is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_compose_independently() {
        let set = extract("oxygen levels near the equator last 30 days");
        assert_eq!(set.parameter, Parameter::Oxygen);
        assert_eq!(set.region, Some(EQUATOR_BAND));
        assert_eq!(set.window, Some(TimeWindow::RelativeDays(30)));
        assert_eq!(set.limit, ROW_CAP);
    }

    #[test]
    fn smallest_relative_window_wins() {
        let set = extract("salinity this week, or the last 30 days if needed");
        assert_eq!(set.window, Some(TimeWindow::RelativeDays(7)));

        let set = extract("temperature over the last 6 months and past 30 days");
        assert_eq!(set.window, Some(TimeWindow::RelativeDays(30)));
    }

    #[test]
    fn absolute_range_overrides_relative_markers() {
        let set = extract("salinity in march 2023 compared with the last 30 days");
        match set.window {
            Some(TimeWindow::Absolute { start, end }) => {
                assert_eq!(start.format("%Y-%m-%d").to_string(), "2023-03-01");
                assert_eq!(end.format("%Y-%m-%d").to_string(), "2023-04-01");
            }
            other => panic!("expected absolute window, got {:?}", other),
        }
    }

    #[test]
    fn parameter_defaults_to_salinity() {
        let set = extract("what do the floats show in the indian ocean");
        assert_eq!(set.parameter, Parameter::Salinity);
        assert_eq!(set.region, Some(INDIAN_OCEAN));
    }

    #[test]
    fn oxygen_beats_salinity_in_priority() {
        let set = extract("dissolved oxygen versus salinity trends");
        assert_eq!(set.parameter, Parameter::Oxygen);
    }

    #[test]
    fn equator_band_beats_indian_ocean() {
        let set = extract("salinity near the equator in the indian ocean");
        assert_eq!(set.region, Some(EQUATOR_BAND));
    }

    #[test]
    fn describe_carries_cap_and_ordering() {
        let description = extract("oxygen last 7 days").describe();
        assert!(description.contains("oxygen IS NOT NULL"));
        assert!(description.contains("last 7 days"));
        assert!(description.contains("ORDER BY timestamp DESC LIMIT 200"));
    }

    #[test]
    fn zero_limit_is_malformed() {
        let mut set = extract("salinity");
        set.limit = 0;
        assert!(matches!(set.validate(), Err(QueryError::MalformedConstraint(_))));
    }

    #[test]
    fn inverted_absolute_range_is_malformed() {
        let set = ConstraintSet {
            parameter: Parameter::Salinity,
            region: None,
            window: Some(TimeWindow::Absolute {
                start: march_2023_bound(4),
                end: march_2023_bound(3),
            }),
            limit: ROW_CAP,
        };
        assert!(matches!(set.validate(), Err(QueryError::MalformedConstraint(_))));
    }
}
