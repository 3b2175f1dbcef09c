//! Deterministic narrative synthesis over returned samples.
//!
//! Sub-rules are an ordered table of (predicate, render) pairs evaluated with
//! short-circuit priority against the lowercased query text; the generic
//! narrative is the fallback.

use std::collections::HashMap;

use crate::geo::regions::{basin_for, indian_subregion_for};
use crate::types::{FloatRecord, Parameter};

/// Fixed reply for an empty result set.
pub const NO_MATCHING_SAMPLES: &str =
    "I couldn't find matching samples for that filter. Try widening the time or latitude band.";

/// Regional salinity deviation that counts as unusual, in PSU.
const BASIN_ANOMALY_THRESHOLD: f64 = 0.30;
/// Minimum samples a subregion needs before its variability is reported.
const MIN_SUBREGION_SAMPLES: usize = 3;
const MAX_SUBREGIONS_REPORTED: usize = 4;
/// How many low-oxygen rows get listed.
const MAX_OXYGEN_ANOMALIES: usize = 5;

/// Per-parameter sample vectors, precomputed once per synthesis call.
struct Samples<'a> {
    rows: &'a [FloatRecord],
    salinity: Vec<f64>,
    temperature: Vec<f64>,
    oxygen: Vec<f64>,
}

impl<'a> Samples<'a> {
    fn collect(rows: &'a [FloatRecord]) -> Self {
        Self {
            rows,
            salinity: values(rows, Parameter::Salinity),
            temperature: values(rows, Parameter::Temperature),
            oxygen: values(rows, Parameter::Oxygen),
        }
    }
}

struct SynthesisRule {
    name: &'static str,
    applies: fn(&str, &Samples) -> bool,
    render: fn(&Samples) -> String,
}

const RULES: &[SynthesisRule] = &[
    SynthesisRule {
        name: "basin_salinity_anomalies",
        applies: basin_anomalies_apply,
        render: render_basin_anomalies,
    },
    SynthesisRule {
        name: "indian_salinity_variability",
        applies: subregion_variability_applies,
        render: render_subregion_variability,
    },
    SynthesisRule {
        name: "indian_temperature",
        applies: indian_temperature_applies,
        render: render_indian_temperature,
    },
    SynthesisRule {
        name: "oxygen_anomalies",
        applies: oxygen_anomalies_apply,
        render: render_oxygen_anomalies,
    },
];

/// Produce the narrative for a result set.
pub fn synthesize(query_text: &str, rows: &[FloatRecord]) -> String {
    if rows.is_empty() {
        return NO_MATCHING_SAMPLES.to_string();
    }
    let samples = Samples::collect(rows);
    let q = query_text.to_lowercase();
    for rule in RULES {
        if (rule.applies)(&q, &samples) {
            tracing::debug!(rule = rule.name, "synthesis rule matched");
            return (rule.render)(&samples);
        }
    }
    render_generic(&samples)
}

fn mentions_salinity(q: &str) -> bool {
    q.contains("salinity") || q.contains("psal")
}

fn mentions_temperature(q: &str) -> bool {
    q.contains("temperature") || q.contains("temp")
}

fn mentions_oxygen(q: &str) -> bool {
    q.contains("oxygen") || q.contains("o2")
}

fn basin_anomalies_apply(q: &str, samples: &Samples) -> bool {
    q.contains("unusual") && mentions_salinity(q) && !samples.salinity.is_empty()
}

fn subregion_variability_applies(q: &str, samples: &Samples) -> bool {
    q.contains("indian ocean")
        && q.contains("variability")
        && mentions_salinity(q)
        && !samples.salinity.is_empty()
}

fn indian_temperature_applies(q: &str, samples: &Samples) -> bool {
    q.contains("indian ocean") && mentions_temperature(q) && !samples.temperature.is_empty()
}

fn oxygen_anomalies_apply(q: &str, samples: &Samples) -> bool {
    mentions_oxygen(q) && !samples.oxygen.is_empty()
}

fn render_basin_anomalies(samples: &Samples) -> String {
    let global_mean = mean(&samples.salinity);

    let mut by_basin: HashMap<&'static str, Vec<f64>> = HashMap::new();
    for row in samples.rows {
        let Some(sal) = row.salinity else { continue };
        let basin = basin_for(row.latitude, row.longitude);
        if basin != "Global" {
            by_basin.entry(basin).or_default().push(sal);
        }
    }

    let mut deltas: Vec<(&str, f64, f64)> = by_basin
        .into_iter()
        .map(|(name, vals)| {
            let basin_mean = mean(&vals);
            (name, basin_mean - global_mean, basin_mean)
        })
        .collect();
    deltas.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let highlights: Vec<String> = deltas
        .iter()
        .filter(|(_, delta, _)| delta.abs() >= BASIN_ANOMALY_THRESHOLD)
        .map(|(name, delta, basin_mean)| {
            format!(
                "{} ({} by {:.2} PSU; mean {:.2} PSU)",
                name,
                if *delta > 0.0 { "higher" } else { "lower" },
                delta.abs(),
                basin_mean
            )
        })
        .collect();

    let base = format!(
        "Based on {} recent samples, global salinity averages {:.2} PSU. ",
        samples.rows.len(),
        global_mean
    );
    if highlights.is_empty() {
        base + "No strong regional anomalies (>|0.30| PSU) were detected in this window."
    } else {
        base + "Unusual patterns detected in: " + &highlights.join(", ") + "."
    }
}

fn render_subregion_variability(samples: &Samples) -> String {
    let mut buckets: HashMap<&'static str, Vec<f64>> = HashMap::new();
    for row in samples.rows {
        let Some(sal) = row.salinity else { continue };
        buckets
            .entry(indian_subregion_for(row.latitude, row.longitude))
            .or_default()
            .push(sal);
    }

    let mut ranking: Vec<(&str, f64, f64, usize)> = buckets
        .into_iter()
        .filter(|(_, vals)| vals.len() >= MIN_SUBREGION_SAMPLES)
        .map(|(name, vals)| (name, pstdev(&vals), mean(&vals), vals.len()))
        .collect();
    if ranking.is_empty() {
        return format!(
            "I found {} samples in the Indian Ocean but not enough per subregion to estimate variability. Try widening the time window.",
            samples.rows.len()
        );
    }
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

    let lines: Vec<String> = ranking
        .iter()
        .take(MAX_SUBREGIONS_REPORTED)
        .map(|(name, sd, m, n)| format!("{}: σ={:.3} PSU (mean {:.2}, n={})", name, sd, m, n))
        .collect();
    format!(
        "Highest salinity variability by Indian Ocean subregion: {}.",
        lines.join("; ")
    )
}

fn render_indian_temperature(samples: &Samples) -> String {
    format!(
        "Indian Ocean (last window): Mean temperature {:.2}°C, range {:.2}–{:.2}°C across {} samples. Warmest pockets align with lower latitudes and western/eastern basin edges.",
        mean(&samples.temperature),
        min_of(&samples.temperature),
        max_of(&samples.temperature),
        samples.rows.len()
    )
}

fn render_oxygen_anomalies(samples: &Samples) -> String {
    let mean_o = mean(&samples.oxygen);
    let sd_o = pstdev(&samples.oxygen);
    let threshold = if sd_o > 0.0 { mean_o - 1.5 * sd_o } else { min_of(&samples.oxygen) };

    let mut lows: Vec<(&FloatRecord, f64)> = samples
        .rows
        .iter()
        .filter_map(|row| row.oxygen.map(|o| (row, o)))
        .filter(|(_, o)| *o <= threshold)
        .collect();
    if lows.is_empty() {
        return format!(
            "Analyzed {} samples. Oxygen mean {:.2} mg/L; no low-oxygen anomalies below {:.2} mg/L detected.",
            samples.rows.len(),
            mean_o,
            threshold
        );
    }
    lows.sort_by(|a, b| a.1.total_cmp(&b.1));

    let lines: Vec<String> = lows
        .iter()
        .take(MAX_OXYGEN_ANOMALIES)
        .map(|(row, o)| {
            format!(
                "float {}: O₂={:.2} mg/L at ({:.2},{:.2})",
                row.float_id, o, row.latitude, row.longitude
            )
        })
        .collect();
    format!(
        "Detected {} low-oxygen samples (≤ {:.2} mg/L). {}.",
        lows.len(),
        threshold,
        lines.join("; ")
    )
}

fn render_generic(samples: &Samples) -> String {
    let mut parts = Vec::new();
    if !samples.temperature.is_empty() {
        parts.push(format!(
            "Temperature mean {:.2}°C (min {:.2}, max {:.2}).",
            mean(&samples.temperature),
            min_of(&samples.temperature),
            max_of(&samples.temperature)
        ));
    }
    if !samples.salinity.is_empty() {
        parts.push(format!(
            "Salinity mean {:.2} PSU (min {:.2}, max {:.2}).",
            mean(&samples.salinity),
            min_of(&samples.salinity),
            max_of(&samples.salinity)
        ));
    }
    if !samples.oxygen.is_empty() {
        parts.push(format!(
            "Oxygen mean {:.2} mg/L (min {:.2}, max {:.2}).",
            mean(&samples.oxygen),
            min_of(&samples.oxygen),
            max_of(&samples.oxygen)
        ));
    }
    let lats: Vec<f64> = samples.rows.iter().map(|row| row.latitude).collect();
    let lons: Vec<f64> = samples.rows.iter().map(|row| row.longitude).collect();
    if !lats.is_empty() {
        parts.push(format!(
            "Coverage: lat {:.2}–{:.2}, lon {:.2}–{:.2}.",
            min_of(&lats),
            max_of(&lats),
            min_of(&lons),
            max_of(&lons)
        ));
    }
    format!("Analyzed {} samples. {}", samples.rows.len(), parts.join(" "))
}

fn values(rows: &[FloatRecord], parameter: Parameter) -> Vec<f64> {
    rows.iter().filter_map(|row| row.value_of(parameter)).collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation.
fn pstdev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
}

fn min_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: &str, lat: f64, lon: f64) -> FloatRecord {
        FloatRecord {
            float_id: id.to_string(),
            latitude: lat,
            longitude: lon,
            temperature: None,
            salinity: None,
            pressure: None,
            oxygen: None,
            timestamp: Utc::now(),
            status: "active".to_string(),
        }
    }

    fn salinity_row(id: &str, lat: f64, lon: f64, salinity: f64) -> FloatRecord {
        FloatRecord { salinity: Some(salinity), ..row(id, lat, lon) }
    }

    fn oxygen_row(id: &str, oxygen: f64) -> FloatRecord {
        FloatRecord { oxygen: Some(oxygen), ..row(id, 0.0, 80.0) }
    }

    #[test]
    fn empty_rows_produce_fixed_message() {
        assert_eq!(synthesize("any salinity question", &[]), NO_MATCHING_SAMPLES);
    }

    #[test]
    fn basin_anomalies_flag_only_strong_deviations() {
        // Basin means: Indian 36.0, Atlantic 35.0, Pacific 34.5; global mean
        // 35.17. Only Indian (+0.83) and Pacific (-0.67) clear the 0.30 bar.
        let rows = vec![
            salinity_row("I1", 0.0, 80.0, 36.0),
            salinity_row("A1", 0.0, -30.0, 35.0),
            salinity_row("P1", 0.0, 150.0, 34.5),
        ];
        let text = synthesize("any unusual salinity patterns?", &rows);
        assert!(text.contains("Unusual patterns detected in:"), "got: {}", text);
        assert!(text.contains("Indian Ocean (higher by 0.83 PSU"), "got: {}", text);
        assert!(text.contains("Pacific Ocean (lower by 0.67 PSU"), "got: {}", text);
        assert!(!text.contains("Atlantic Ocean ("), "got: {}", text);
        // Sorted by deviation magnitude descending.
        let indian_pos = text.find("Indian Ocean (").unwrap();
        let pacific_pos = text.find("Pacific Ocean (").unwrap();
        assert!(indian_pos < pacific_pos);
    }

    #[test]
    fn basin_anomalies_report_quiet_window() {
        let rows = vec![
            salinity_row("I1", 0.0, 80.0, 35.1),
            salinity_row("A1", 0.0, -30.0, 35.0),
        ];
        let text = synthesize("unusual salinity anywhere?", &rows);
        assert!(text.contains("No strong regional anomalies"), "got: {}", text);
    }

    #[test]
    fn subregion_variability_ranks_by_spread() {
        let mut rows = Vec::new();
        // Arabian Sea: tight cluster.
        for (i, s) in [36.0, 36.05, 35.95].iter().enumerate() {
            rows.push(salinity_row(&format!("AS{}", i), 18.0, 64.0, *s));
        }
        // Bay of Bengal: wide spread.
        for (i, s) in [32.0, 34.0, 36.0].iter().enumerate() {
            rows.push(salinity_row(&format!("BB{}", i), 15.0, 90.0, *s));
        }
        let text = synthesize("salinity variability in the indian ocean", &rows);
        let bay_pos = text.find("Bay of Bengal").expect("bay listed");
        let arabian_pos = text.find("Arabian Sea").expect("arabian listed");
        assert!(bay_pos < arabian_pos, "got: {}", text);
    }

    #[test]
    fn subregion_variability_needs_three_samples() {
        let rows = vec![
            salinity_row("AS1", 18.0, 64.0, 36.0),
            salinity_row("BB1", 15.0, 90.0, 33.0),
        ];
        let text = synthesize("salinity variability in the indian ocean", &rows);
        assert!(text.contains("not enough per subregion"), "got: {}", text);
    }

    #[test]
    fn oxygen_outlier_is_flagged_and_named() {
        let mut rows: Vec<FloatRecord> =
            (0..9).map(|i| oxygen_row(&format!("OK{}", i), 8.0)).collect();
        rows.push(oxygen_row("LOW1", 2.0));
        let text = synthesize("dissolved oxygen anomalies", &rows);
        assert!(text.contains("low-oxygen samples"), "got: {}", text);
        assert!(text.contains("LOW1"), "got: {}", text);
        assert!(!text.contains("OK0"), "got: {}", text);
    }

    #[test]
    fn uniform_oxygen_reports_no_anomalies_threshold_at_minimum() {
        // With zero spread the threshold falls back to the minimum, so every
        // row ties it; the report lists them rather than claiming an anomaly
        // free window.
        let rows: Vec<FloatRecord> = (0..4).map(|i| oxygen_row(&format!("U{}", i), 6.0)).collect();
        let text = synthesize("oxygen levels", &rows);
        assert!(text.contains("low-oxygen samples (≤ 6.00 mg/L)"), "got: {}", text);
    }

    #[test]
    fn indian_temperature_summary() {
        let rows = vec![
            FloatRecord { temperature: Some(28.0), ..row("T1", 0.0, 80.0) },
            FloatRecord { temperature: Some(30.0), ..row("T2", -5.0, 90.0) },
        ];
        let text = synthesize("temperature in the indian ocean this week", &rows);
        assert!(text.contains("Mean temperature 29.00°C"), "got: {}", text);
        assert!(text.contains("range 28.00–30.00°C"), "got: {}", text);
    }

    #[test]
    fn generic_narrative_covers_present_parameters() {
        let rows = vec![
            FloatRecord {
                temperature: Some(25.0),
                salinity: Some(35.0),
                ..row("G1", 10.0, 70.0)
            },
            FloatRecord {
                temperature: Some(27.0),
                salinity: Some(35.4),
                ..row("G2", -10.0, 90.0)
            },
        ];
        let text = synthesize("show me the data", &rows);
        assert!(text.starts_with("Analyzed 2 samples."), "got: {}", text);
        assert!(text.contains("Temperature mean 26.00°C"), "got: {}", text);
        assert!(text.contains("Salinity mean 35.20 PSU"), "got: {}", text);
        assert!(!text.contains("Oxygen"), "got: {}", text);
        assert!(text.contains("Coverage: lat -10.00–10.00, lon 70.00–90.00."), "got: {}", text);
    }

    #[test]
    fn pstdev_matches_population_formula() {
        assert!((pstdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-9);
        assert_eq!(pstdev(&[3.0]), 0.0);
    }
}
