use secrecy::ExposeSecret;
use serde::Serialize;

use stockwise_core::config::{AppConfig, LlmProvider, LoadOptions, LogFormat};

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    database: DatabaseView,
    llm: LlmView,
    weather: WeatherView,
    pipeline: PipelineView,
    logging: LoggingView,
}

#[derive(Debug, Serialize)]
struct DatabaseView {
    url: String,
    max_connections: u32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct LlmView {
    provider: &'static str,
    api_key: &'static str,
    base_url: Option<String>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct WeatherView {
    api_key: &'static str,
    base_url: String,
    cache_ttl_secs: u64,
    forecast_days: u8,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct PipelineView {
    max_history_turns: usize,
    ambiguity_row_threshold: usize,
    decision_intents: Vec<String>,
    reorder_multiplier: f64,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: &'static str,
}

fn redact(secret: Option<&secrecy::SecretString>) -> &'static str {
    match secret {
        Some(value) if !value.expose_secret().trim().is_empty() => "<set>",
        _ => "<unset>",
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return format!("configuration issue: {error}");
        }
    };

    let view = EffectiveConfig {
        database: DatabaseView {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            timeout_secs: config.database.timeout_secs,
        },
        llm: LlmView {
            provider: match config.llm.provider {
                LlmProvider::OpenAi => "openai",
                LlmProvider::Anthropic => "anthropic",
                LlmProvider::Ollama => "ollama",
            },
            api_key: redact(config.llm.api_key.as_ref()),
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
            timeout_secs: config.llm.timeout_secs,
            max_retries: config.llm.max_retries,
        },
        weather: WeatherView {
            api_key: redact(config.weather.api_key.as_ref()),
            base_url: config.weather.base_url.clone(),
            cache_ttl_secs: config.weather.cache_ttl_secs,
            forecast_days: config.weather.forecast_days,
            timeout_secs: config.weather.timeout_secs,
        },
        pipeline: PipelineView {
            max_history_turns: config.pipeline.max_history_turns,
            ambiguity_row_threshold: config.pipeline.ambiguity_row_threshold,
            decision_intents: config.pipeline.decision_intents.clone(),
            reorder_multiplier: config.pipeline.reorder_multiplier,
        },
        logging: LoggingView {
            level: config.logging.level.clone(),
            format: match config.logging.format {
                LogFormat::Compact => "compact",
                LogFormat::Pretty => "pretty",
                LogFormat::Json => "json",
            },
        },
    };

    serde_json::to_string_pretty(&view).unwrap_or_else(|error| format!("serialization error: {error}"))
}
