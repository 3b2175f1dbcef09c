//! Query pipeline: classify, dispatch, synthesize, package.
//!
//! The pipeline holds no mutable state between calls; the storage handle is
//! injected per invocation and all rule tables are immutable constants, so
//! concurrent callers can share one instance.

use uuid::Uuid;

use crate::config::ChatConfig;
use crate::error::QueryError;
use crate::geo::{self, gazetteer};
use crate::llm::LlmTranslator;
use crate::query::constraints::{self, ConstraintSet};
use crate::query::executor;
use crate::query::intent::{classify, Intent};
use crate::storage::FloatStore;
use crate::synthesis::{self, NO_MATCHING_SAMPLES};
use crate::types::{FloatRecord, QueryResponse};

/// Canned example prompts surfaced to new users.
const SUGGESTED_QUERIES: &[&str] = &[
    "Show me temperature trends in the Indian Ocean",
    "What are the salinity levels near the equator?",
    "Find floats with highest oxygen levels",
    "Compare temperature between Pacific and Atlantic",
    "Show me data from floats deployed in 2024",
];

pub struct QueryPipeline {
    config: ChatConfig,
    llm: Option<LlmTranslator>,
}

impl QueryPipeline {
    /// The LLM capability is resolved once here; absence of a key keeps every
    /// query on the rule-based path.
    pub fn new(config: ChatConfig) -> Self {
        let llm = LlmTranslator::from_settings(&config.llm);
        match &llm {
            Some(_) => tracing::info!(model = %config.llm.model, "external LLM translation enabled"),
            None => tracing::info!("no LLM configured; using rule-based extraction"),
        }
        Self { config, llm }
    }

    pub fn suggested_queries(&self, limit: usize) -> Vec<&'static str> {
        SUGGESTED_QUERIES.iter().copied().take(limit).collect()
    }

    /// Answer a free-text question against the given store.
    ///
    /// Never fails: every internal error is converted into a recovery prompt
    /// or a degraded envelope.
    pub async fn answer(
        &self,
        store: &dyn FloatStore,
        query_text: &str,
        requester_id: Option<Uuid>,
    ) -> QueryResponse {
        tracing::debug!(query = query_text, requester = ?requester_id, "processing query");
        match self.process(store, query_text).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "query recovered into degraded envelope");
                recover(e)
            }
        }
    }

    async fn process(
        &self,
        store: &dyn FloatStore,
        query_text: &str,
    ) -> Result<QueryResponse, QueryError> {
        match classify(query_text) {
            Intent::NearestFloats => self.handle_nearest(store, query_text).await,
            Intent::WithinRadius { radius_km, place } => {
                self.handle_radius(store, radius_km, &place).await
            }
            Intent::Aggregate => self.handle_aggregate(store, query_text).await,
        }
    }

    async fn handle_nearest(
        &self,
        store: &dyn FloatStore,
        query_text: &str,
    ) -> Result<QueryResponse, QueryError> {
        let (lat0, lon0) =
            geo::parse_lat_lon(query_text).ok_or(QueryError::CoordinatesNotParsed)?;
        let rows = store
            .all_active_rows()
            .await
            .map_err(|e| QueryError::Storage(e.to_string()))?;
        if rows.is_empty() {
            return Ok(envelope(
                "I could not find floats in the local database yet. Try triggering data ingestion or try again shortly.",
                0,
                0.7,
            ));
        }

        let mut ranked: Vec<(f64, &FloatRecord)> = rows
            .iter()
            .map(|row| (geo::distance_km(lat0, lon0, row.latitude, row.longitude), row))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(self.config.query.nearest_k);

        let lines: Vec<String> = ranked
            .iter()
            .map(|(distance, row)| {
                format!(
                    "- Float {}: {:.1} km away at ({:.2}, {:.2}), salinity={}, temp={}",
                    row.float_id,
                    distance,
                    row.latitude,
                    row.longitude,
                    fmt_opt(row.salinity),
                    fmt_opt(row.temperature)
                )
            })
            .collect();
        let response = format!(
            "Nearest ARGO floats to ({:.2}, {:.2}):\n{}",
            lat0,
            lon0,
            lines.join("\n")
        );
        Ok(envelope(&response, ranked.len(), 0.9))
    }

    async fn handle_radius(
        &self,
        store: &dyn FloatStore,
        radius_km: f64,
        place: &str,
    ) -> Result<QueryResponse, QueryError> {
        let coords = gazetteer::resolve(place)
            .ok_or_else(|| QueryError::PlaceNotResolved(place.to_string()))?;
        let rows = store
            .all_active_rows()
            .await
            .map_err(|e| QueryError::Storage(e.to_string()))?;
        if rows.is_empty() {
            return Ok(envelope(
                "No floats available in the local database yet. Try triggering data ingestion.",
                0,
                0.7,
            ));
        }

        let mut nearby: Vec<(f64, &FloatRecord)> = rows
            .iter()
            .map(|row| {
                (geo::distance_km(coords.lat, coords.lon, row.latitude, row.longitude), row)
            })
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        if nearby.is_empty() {
            return Ok(envelope(
                &format!(
                    "No active floats found within {} km of {}.",
                    radius_km as i64,
                    title_case(place)
                ),
                0,
                0.8,
            ));
        }
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        let lines: Vec<String> = nearby
            .iter()
            .take(self.config.query.radius_listing_k)
            .map(|(distance, row)| {
                format!(
                    "- {}: {:.1} km; temp={}, salinity={} at ({:.2},{:.2})",
                    row.float_id,
                    distance,
                    fmt_opt(row.temperature),
                    fmt_opt(row.salinity),
                    row.latitude,
                    row.longitude
                )
            })
            .collect();
        let response = format!(
            "Found {} active floats within {} km of {}.\n{}",
            nearby.len(),
            radius_km as i64,
            title_case(place),
            lines.join("\n")
        );
        Ok(envelope(&response, nearby.len(), 0.9))
    }

    async fn handle_aggregate(
        &self,
        store: &dyn FloatStore,
        query_text: &str,
    ) -> Result<QueryResponse, QueryError> {
        let (constraints, used_llm) = self.resolve_constraints(query_text).await;
        let rows = executor::execute(store, &constraints).await?;
        let structured_query = Some(constraints.describe());

        if rows.is_empty() {
            return Ok(QueryResponse {
                response: NO_MATCHING_SAMPLES.to_string(),
                structured_query,
                data_points: 0,
                context_sources: 0,
                confidence: 0.0,
                used_llm,
            });
        }

        let response = synthesis::synthesize(query_text, &rows);
        Ok(QueryResponse {
            response,
            structured_query,
            data_points: rows.len(),
            context_sources: 0,
            confidence: 0.85,
            used_llm,
        })
    }

    async fn resolve_constraints(&self, query_text: &str) -> (ConstraintSet, bool) {
        if let Some(llm) = &self.llm {
            match llm.translate(query_text).await {
                Ok(mut constraints) => {
                    constraints.limit = self.config.query.row_cap;
                    return (constraints, true);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "LLM translation failed; falling back to rule-based extraction");
                }
            }
        }
        let mut constraints = constraints::extract(query_text);
        constraints.limit = self.config.query.row_cap;
        (constraints, false)
    }
}

/// Map recoverable failures to their user-facing prompts; everything else
/// becomes an apology with confidence zero.
fn recover(error: QueryError) -> QueryResponse {
    let (response, confidence) = match &error {
        QueryError::CoordinatesNotParsed => (
            "Please provide coordinates. For example: \"nearest ARGO floats to lat: 12.97, lon: 77.59\".".to_string(),
            0.6,
        ),
        QueryError::PlaceNotResolved(place) => (
            format!(
                "I couldn't resolve the location '{}'. Please provide coordinates like 'lat: 7.0, lon: 81.0'.",
                place
            ),
            0.5,
        ),
        QueryError::Storage(_) | QueryError::MalformedConstraint(_) => (
            format!("I apologize, but I encountered an error processing your query: {}", error),
            0.0,
        ),
    };
    QueryResponse {
        response,
        structured_query: None,
        data_points: 0,
        context_sources: 0,
        confidence,
        used_llm: false,
    }
}

fn envelope(response: &str, data_points: usize, confidence: f32) -> QueryResponse {
    QueryResponse {
        response: response.to_string(),
        structured_query: None,
        data_points,
        context_sources: 0,
        confidence,
        used_llm: false,
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn title_case(place: &str) -> String {
    place
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
