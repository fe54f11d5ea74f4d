//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then environment variables, then
//! CLI flags. The API token has no default and no flag, it must come from the
//! `AIPROXY_TOKEN` environment variable.

use std::path::PathBuf;

use config as config_rs;
use thiserror::Error;

pub const DEFAULT_LLM_ENDPOINT: &str =
    "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm_endpoint: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Directory under which per-dataset output directories are created.
    pub output_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS as u64,
            output_root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AIPROXY_TOKEN environment variable is not set")]
    MissingToken,
    #[error("config error: {0}")]
    Config(#[from] config_rs::ConfigError),
}

pub fn load_config(
    endpoint_flag: &Option<String>,
    model_flag: &Option<String>,
) -> Result<AppConfig, ConfigError> {
    let api_key = std::env::var("AIPROXY_TOKEN").map_err(|_| ConfigError::MissingToken)?;

    let mut builder = config_rs::Config::builder()
        .set_default("llm_endpoint", DEFAULT_LLM_ENDPOINT)?
        .set_default("model", DEFAULT_MODEL)?
        .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("output_root", ".")?;

    // Environment overrides defaults
    if let Ok(endpoint) = std::env::var("LLM_ENDPOINT") {
        builder = builder.set_override("llm_endpoint", endpoint)?;
    }
    if let Ok(model) = std::env::var("LLM_MODEL") {
        builder = builder.set_override("model", model)?;
    }

    // CLI flags take precedence
    if let Some(endpoint) = endpoint_flag {
        builder = builder.set_override("llm_endpoint", endpoint.clone())?;
    }
    if let Some(model) = model_flag {
        builder = builder.set_override("model", model.clone())?;
    }

    let cfg = builder.build()?;

    Ok(AppConfig {
        llm_endpoint: cfg.get::<String>("llm_endpoint")?,
        api_key,
        model: cfg.get::<String>("model")?,
        request_timeout_secs: cfg.get::<u64>("request_timeout_secs")?,
        output_root: PathBuf::from(cfg.get::<String>("output_root")?),
    })
}
