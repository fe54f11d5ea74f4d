//! Narrative synthesis over a chat-completion endpoint.
//!
//! `synthesize` never fails: any transport, status or payload problem is
//! logged and replaced by a placeholder starting with [`FALLBACK_PREFIX`]
//! so the report can still be written.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;
use crate::profiler::ProfileSummary;

/// Prefix of the placeholder used when the LLM cannot be reached or answers
/// garbage. The triggering error is appended after a colon.
pub const FALLBACK_PREFIX: &str = "Failed to generate insights using LLM";

const SYSTEM_PROMPT: &str = "You are a data analysis assistant.";

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response")]
    InvalidResponse,
}

/// Narrative text plus whether it fell back to the placeholder.
#[derive(Debug, Clone)]
pub struct Narrative {
    pub text: String,
    pub degraded: bool,
}

pub struct NarrativeClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl NarrativeClient {
    pub fn new(config: &AppConfig) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.llm_endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }

    /// Ask the model for insights about a profiled dataset. Every failure
    /// degrades to the fixed fallback text.
    pub async fn synthesize(&self, file_name: &str, profile: &ProfileSummary) -> Narrative {
        let prompt = build_prompt(file_name, profile);
        match self.chat(&prompt).await {
            Ok(text) => Narrative {
                text,
                degraded: false,
            },
            Err(err) => {
                warn!("Error communicating with LLM: {}", err);
                Narrative {
                    text: format!("{}: {}", FALLBACK_PREFIX, err),
                    degraded: true,
                }
            }
        }
    }

    pub async fn chat(&self, input: &str) -> Result<String, NarrativeError> {
        let request_body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": input }
            ]
        });

        let resp: Value = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(NarrativeError::InvalidResponse)?
            .to_string();
        Ok(content)
    }
}

/// User prompt embedding the dataset name and a JSON digest of the profile.
fn build_prompt(file_name: &str, profile: &ProfileSummary) -> String {
    let mut kinds = Map::new();
    let mut stats = Map::new();
    let mut missing = Map::new();
    for col in &profile.columns {
        kinds.insert(col.name.clone(), json!(col.kind));
        stats.insert(col.name.clone(), json!(col.stats));
        missing.insert(col.name.clone(), json!(col.missing));
    }
    let mut skew = Map::new();
    for entry in &profile.skewness {
        skew.insert(entry.column.clone(), json!(entry.value));
    }

    format!(
        "Analyze the following dataset and provide insights:\n\
         - Filename: {}\n\
         - Columns and data types: {}\n\
         - Summary statistics: {}\n\
         - Missing values: {}\n\
         - Skewness: {}\n\
         - Correlation matrix: {}\n\n\
         Provide:\n\
         1. Key insights about the dataset.\n\
         2. Patterns in numeric and categorical variables.\n\
         3. Insights on missing values and correlations.\n\
         4. Suggestions for further analysis.",
        file_name,
        Value::Object(kinds),
        Value::Object(stats),
        Value::Object(missing),
        Value::Object(skew),
        json!(profile.correlation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::dataset::Dataset;
    use crate::profiler::profile;

    fn sample_profile() -> ProfileSummary {
        let dataset = Dataset::new(vec![
            Column::infer(
                "amount".into(),
                vec![Some("1".into()), Some("2".into()), Some("3".into())],
            ),
            Column::infer(
                "region".into(),
                vec![Some("north".into()), Some("south".into()), None],
            ),
        ]);
        profile(&dataset)
    }

    #[test]
    fn prompt_names_the_file_and_requests_four_sections() {
        let prompt = build_prompt("sales.csv", &sample_profile());
        assert!(prompt.contains("- Filename: sales.csv"));
        assert!(prompt.contains("1. Key insights about the dataset."));
        assert!(prompt.contains("4. Suggestions for further analysis."));
    }

    #[test]
    fn prompt_embeds_profile_digest() {
        let prompt = build_prompt("sales.csv", &sample_profile());
        assert!(prompt.contains("\"amount\":\"numeric\""));
        assert!(prompt.contains("\"region\":1"), "missing counts: {prompt}");
        assert!(prompt.contains("Correlation matrix:"));
    }
}
