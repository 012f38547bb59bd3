use secrecy::ExposeSecret;
use serde::Serialize;

use stockwise_core::config::{AppConfig, LlmProvider, LoadOptions};
use stockwise_db::connect;

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: "pass", detail: detail.into() }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: "warn", detail: detail.into() }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self { name, status: "fail", detail: detail.into() }
    }
}

pub fn run(json: bool) -> String {
    let checks = collect_checks();

    if json {
        return serde_json::to_string_pretty(&checks)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
    }

    let mut lines = vec!["Stockwise doctor".to_string(), String::new()];
    for check in &checks {
        lines.push(format!("[{}] {}: {}", check.status, check.name, check.detail));
    }
    lines.join("\n")
}

fn collect_checks() -> Vec<DoctorCheck> {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass("config", "configuration loads and validates"));
            config
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config", error.to_string()));
            return checks;
        }
    };

    checks.push(database_check(&config));
    checks.push(llm_check(&config));
    checks.push(weather_check(&config));

    checks
}

fn database_check(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return DoctorCheck::fail("database", error.to_string()),
    };

    runtime.block_on(async {
        match connect(&config.database).await {
            Ok(pool) => {
                let ping = sqlx::query("SELECT 1").execute(&pool).await;
                pool.close().await;
                match ping {
                    Ok(_) => DoctorCheck::pass(
                        "database",
                        format!("connected to {}", config.database.url),
                    ),
                    Err(error) => DoctorCheck::fail("database", error.to_string()),
                }
            }
            Err(error) => DoctorCheck::fail("database", error.to_string()),
        }
    })
}

fn llm_check(config: &AppConfig) -> DoctorCheck {
    let provider = match config.llm.provider {
        LlmProvider::OpenAi => "openai",
        LlmProvider::Anthropic => "anthropic",
        LlmProvider::Ollama => "ollama",
    };

    let has_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| !key.expose_secret().trim().is_empty())
        .unwrap_or(false);

    match (config.llm.provider, has_key) {
        (LlmProvider::Ollama, _) => DoctorCheck::pass(
            "llm",
            format!("{provider} via {} (model {})", config.llm.base_url.as_deref().unwrap_or("?"), config.llm.model),
        ),
        (_, true) => DoctorCheck::pass("llm", format!("{provider} key set (model {})", config.llm.model)),
        (_, false) => DoctorCheck::fail("llm", format!("{provider} selected but no api key set")),
    }
}

fn weather_check(config: &AppConfig) -> DoctorCheck {
    let has_key = config
        .weather
        .api_key
        .as_ref()
        .map(|key| !key.expose_secret().trim().is_empty())
        .unwrap_or(false);

    if has_key {
        DoctorCheck::pass(
            "weather",
            format!("key set, cache ttl {}s", config.weather.cache_ttl_secs),
        )
    } else {
        // Weather failures only degrade decisions, so a missing key is
        // a warning rather than a failure.
        DoctorCheck::warn("weather", "no api key set; decisions will run without forecasts")
    }
}
