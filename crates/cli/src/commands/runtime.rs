use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use stockwise_agent::llm::HttpAdvisoryClient;
use stockwise_agent::weather::{CachedWeatherProvider, OpenWeatherClient};
use stockwise_agent::{CoordinatorSettings, PipelineCoordinator};
use stockwise_core::config::{AppConfig, ConfigError, LoadOptions};
use stockwise_core::AdvisoryError;
use stockwise_db::repositories::{
    SqlConversationRepository, SqlForecastRepository, SqlReportCollector, SqlTicketRepository,
};
use stockwise_db::{connect, migrations, DbPool};

/// Fully wired application: validated config, migrated pool, and the
/// coordinator with its collaborators behind their trait boundaries.
pub struct Application {
    pub config: AppConfig,
    pub pool: DbPool,
    pub coordinator: PipelineCoordinator,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("advisory client setup failed: {0}")]
    Advisory(#[from] AdvisoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;

    let pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;

    let advisory = Arc::new(HttpAdvisoryClient::from_config(&config.llm)?);
    let weather = Arc::new(CachedWeatherProvider::new(
        OpenWeatherClient::from_config(&config.weather)?,
        Duration::from_secs(config.weather.cache_ttl_secs),
    ));

    let policy = config.pipeline.decision_policy()?;
    let settings = CoordinatorSettings::from_config(&config);

    let coordinator = PipelineCoordinator::new(
        advisory,
        weather,
        Arc::new(SqlReportCollector::new(pool.clone())),
        Arc::new(SqlTicketRepository::new(pool.clone())),
        Arc::new(SqlForecastRepository::new(pool.clone())),
        Arc::new(SqlConversationRepository::new(pool.clone())),
    )
    .with_policy(policy)
    .with_settings(settings);

    Ok(Application { config, pool, coordinator })
}

#[cfg(test)]
mod tests {
    use stockwise_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_wires_the_pipeline() {
        let app = bootstrap(memory_options()).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('vendors', 'inventory', 'finance', 'sales', 'tickets', \
                          'conversations', 'forecasts')",
        )
        .fetch_one(&app.pool)
        .await
        .expect("baseline tables available after bootstrap");
        assert_eq!(table_count, 7, "bootstrap should expose all baseline tables");

        app.pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_invalid_config() {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://nope".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };

        let error = bootstrap(options).await.err().expect("bootstrap must fail");
        assert!(error.to_string().contains("database.url"));
    }
}
