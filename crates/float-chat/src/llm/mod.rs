//! Optional external LLM translation for the aggregate path.
//!
//! The rule-based extractor is the unconditional default. When an API key is
//! configured, the pipeline first asks an OpenAI-compatible chat endpoint to
//! translate the question into a constraint set; guardrails reject anything
//! that does not validate, and any failure falls back to the rules. The
//! envelope's `used_llm` flag reports which path produced the constraints.

use anyhow::{anyhow, Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::LlmSettings;
use crate::geo::regions::{EQUATOR_BAND, INDIAN_OCEAN};
use crate::query::constraints::{ConstraintSet, TimeWindow, ROW_CAP};
use crate::types::Parameter;

const TRANSLATION_PROMPT: &str = "You translate user questions about ocean float data into a JSON object with fields: \
parameter (one of temperature, salinity, oxygen, pressure), \
region (one of equator, indian_ocean, or null), \
window_days (integer number of days, or null), \
month (YYYY-MM string for an explicit month, or null). \
Return ONLY the JSON object, no explanation.";

#[derive(Debug, Deserialize)]
struct TranslatedConstraints {
    parameter: String,
    region: Option<String>,
    window_days: Option<i64>,
    month: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct LlmTranslator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl LlmTranslator {
    /// Build a translator when the capability is configured; `None` keeps the
    /// pipeline on the rule-based path.
    pub fn from_settings(settings: &LlmSettings) -> Option<Self> {
        let api_key = settings.api_key.clone()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
        })
    }

    /// Ask the model for a constraint set. Callers fall back to rule-based
    /// extraction on any error.
    pub async fn translate(&self, query: &str) -> Result<ConstraintSet> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": TRANSLATION_PROMPT},
                {"role": "user", "content": query},
            ],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("LLM endpoint returned HTTP {}", status));
        }
        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("LLM response was not valid JSON")?;
        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().trim_matches('`').trim())
            .ok_or_else(|| anyhow!("LLM response contained no choices"))?;
        let translated: TranslatedConstraints = serde_json::from_str(content)
            .context("LLM did not return the expected JSON shape")?;
        let constraints = into_constraints(translated)?;
        constraints
            .validate()
            .map_err(|e| anyhow!("LLM produced an invalid constraint set: {}", e))?;
        Ok(constraints)
    }
}

fn into_constraints(translated: TranslatedConstraints) -> Result<ConstraintSet> {
    let parameter = match translated.parameter.as_str() {
        "temperature" => Parameter::Temperature,
        "salinity" => Parameter::Salinity,
        "oxygen" => Parameter::Oxygen,
        "pressure" => Parameter::Pressure,
        other => return Err(anyhow!("unknown parameter '{}'", other)),
    };
    let region = match translated.region.as_deref() {
        Some("equator") => Some(EQUATOR_BAND),
        Some("indian_ocean") => Some(INDIAN_OCEAN),
        Some(other) => return Err(anyhow!("unknown region '{}'", other)),
        None => None,
    };
    let window = match translated.month {
        Some(month) => Some(parse_month_window(&month)?),
        None => translated.window_days.map(TimeWindow::RelativeDays),
    };
    Ok(ConstraintSet { parameter, region, window, limit: ROW_CAP })
}

fn parse_month_window(month: &str) -> Result<TimeWindow> {
    let (year, month_num) = month
        .split_once('-')
        .ok_or_else(|| anyhow!("month must be YYYY-MM, got '{}'", month))?;
    let year: i32 = year.parse().context("invalid year")?;
    let month_num: u32 = month_num.parse().context("invalid month")?;
    let start = Utc
        .with_ymd_and_hms(year, month_num, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid month '{}'", month))?;
    let (next_year, next_month) = if month_num == 12 { (year + 1, 1) } else { (year, month_num + 1) };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid month '{}'", month))?;
    Ok(TimeWindow::Absolute { start, end })
}
