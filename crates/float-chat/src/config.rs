use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub query: QueryLimits,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimits {
    /// Hard cap on rows returned by any aggregate query.
    pub row_cap: usize,
    /// How many floats the nearest-neighbor path lists.
    pub nearest_k: usize,
    /// How many floats the radius-search path lists.
    pub radius_listing_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Presence of a key enables the external translation path; the
    /// rule-based extractor remains the unconditional fallback.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl LlmSettings {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl ChatConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.query.row_cap == 0 {
            return Err("query.row_cap must be > 0".into());
        }
        if self.query.nearest_k == 0 {
            return Err("query.nearest_k must be > 0".into());
        }
        if self.query.radius_listing_k == 0 {
            return Err("query.radius_listing_k must be > 0".into());
        }
        if self.llm.enabled() && self.llm.model.is_empty() {
            return Err("llm.model must be set when an api key is configured".into());
        }
        if self.llm.enabled() && self.llm.endpoint.is_empty() {
            return Err("llm.endpoint must be set when an api key is configured".into());
        }
        Ok(())
    }

    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        // LLM capability is resolved once here, at startup.
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            query: QueryLimits {
                row_cap: 200,
                nearest_k: 5,
                radius_listing_k: 10,
            },
            llm: LlmSettings {
                api_key,
                model: "gpt-5".to_string(),
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            },
        }
    }
}
