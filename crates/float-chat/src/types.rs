use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measured quantity a query selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Temperature,
    Salinity,
    Oxygen,
    Pressure,
}

impl Parameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Salinity => "salinity",
            Self::Oxygen => "oxygen",
            Self::Pressure => "pressure",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Salinity => "PSU",
            Self::Oxygen => "mg/L",
            Self::Pressure => "dbar",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One float observation as returned by the backing store.
///
/// Rows are read-only snapshots; query processing never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatRecord {
    pub float_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub pressure: Option<f64>,
    pub oxygen: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

impl FloatRecord {
    pub fn value_of(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Salinity => self.salinity,
            Parameter::Oxygen => self.oxygen,
            Parameter::Pressure => self.pressure,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Final answer envelope returned by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    /// Echo of the resolved query predicates; `None` on the geo
    /// short-circuit paths.
    pub structured_query: Option<String>,
    pub data_points: usize,
    /// Always 0: answers are grounded in store rows, not retrieved context.
    pub context_sources: usize,
    pub confidence: f32,
    /// Whether an external LLM produced the constraints for this answer.
    pub used_llm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_accessor_matches_field() {
        let row = FloatRecord {
            float_id: "F100".to_string(),
            latitude: 0.0,
            longitude: 80.0,
            temperature: Some(28.5),
            salinity: Some(35.1),
            pressure: None,
            oxygen: Some(6.2),
            timestamp: Utc::now(),
            status: "active".to_string(),
        };
        assert_eq!(row.value_of(Parameter::Temperature), Some(28.5));
        assert_eq!(row.value_of(Parameter::Salinity), Some(35.1));
        assert_eq!(row.value_of(Parameter::Oxygen), Some(6.2));
        assert_eq!(row.value_of(Parameter::Pressure), None);
    }

    #[test]
    fn parameter_serde_uses_snake_case() {
        let json = serde_json::to_string(&Parameter::Oxygen).unwrap();
        assert_eq!(json, "\"oxygen\"");
    }
}
