use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use stockwise_core::domain::forecast::{accuracy_score, ForecastRecord, NewForecast};

use super::{ForecastRepository, RepositoryError};
use crate::DbPool;

pub struct SqlForecastRepository {
    pool: DbPool,
}

impl SqlForecastRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ForecastRow {
    id: i64,
    forecast_date: NaiveDate,
    sku: String,
    predicted_demand: i64,
    predicted_weather: String,
    recommendation: String,
    actual_demand: Option<i64>,
    actual_weather: Option<String>,
    accuracy_score: Option<f64>,
    created_at: DateTime<Utc>,
}

impl ForecastRow {
    fn into_record(self) -> ForecastRecord {
        ForecastRecord {
            id: self.id,
            forecast_date: self.forecast_date,
            sku: self.sku,
            predicted_demand: self.predicted_demand,
            predicted_weather: self.predicted_weather,
            recommendation: self.recommendation,
            actual_demand: self.actual_demand,
            actual_weather: self.actual_weather,
            accuracy_score: self.accuracy_score,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl ForecastRepository for SqlForecastRepository {
    async fn record(&self, forecast: NewForecast) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO forecasts \
                 (forecast_date, sku, predicted_demand, predicted_weather, recommendation) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(forecast.forecast_date.to_string())
        .bind(&forecast.sku)
        .bind(forecast.predicted_demand)
        .bind(&forecast.predicted_weather)
        .bind(&forecast.recommendation)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ForecastRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ForecastRow>(
            "SELECT id, forecast_date, sku, predicted_demand, predicted_weather, recommendation, \
                    actual_demand, actual_weather, accuracy_score, created_at \
             FROM forecasts \
             ORDER BY created_at DESC, id DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ForecastRow::into_record).collect())
    }

    async fn update_actuals(
        &self,
        id: i64,
        actual_demand: i64,
        actual_weather: &str,
    ) -> Result<Option<f64>, RepositoryError> {
        let predicted: Option<(i64,)> =
            sqlx::query_as("SELECT predicted_demand FROM forecasts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((predicted_demand,)) = predicted else {
            return Ok(None);
        };

        let score = accuracy_score(predicted_demand, actual_demand);
        sqlx::query(
            "UPDATE forecasts \
             SET actual_demand = ?, actual_weather = ?, accuracy_score = ? \
             WHERE id = ?",
        )
        .bind(actual_demand)
        .bind(actual_weather)
        .bind(score)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(score))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::SqlForecastRepository;
    use crate::repositories::ForecastRepository;
    use crate::test_support::memory_pool;
    use stockwise_core::domain::forecast::NewForecast;

    fn forecast(sku: &str, predicted_demand: i64) -> NewForecast {
        NewForecast {
            forecast_date: NaiveDate::from_ymd_opt(2026, 8, 14).expect("date"),
            sku: sku.to_string(),
            predicted_demand,
            predicted_weather: "Rain".to_string(),
            recommendation: "restock ahead of the wet week".to_string(),
        }
    }

    #[tokio::test]
    async fn recorded_forecast_appears_in_recent_listing() {
        let pool = memory_pool().await;
        let forecasts = SqlForecastRepository::new(pool);

        let id = forecasts.record(forecast("SKU-BEV-004", 120)).await.expect("record");
        let recent = forecasts.recent(10).await.expect("recent");

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].sku, "SKU-BEV-004");
        assert_eq!(recent[0].predicted_demand, 120);
        assert!(recent[0].actual_demand.is_none());
        assert!(recent[0].accuracy_score.is_none());
    }

    #[tokio::test]
    async fn manual_reconciliation_fills_actuals_and_accuracy() {
        let pool = memory_pool().await;
        let forecasts = SqlForecastRepository::new(pool);

        let id = forecasts.record(forecast("SKU-BEV-004", 100)).await.expect("record");
        let score = forecasts
            .update_actuals(id, 80, "Clouds")
            .await
            .expect("update actuals")
            .expect("forecast exists");
        assert!((score - 80.0).abs() < f64::EPSILON);

        let recent = forecasts.recent(10).await.expect("recent");
        assert_eq!(recent[0].actual_demand, Some(80));
        assert_eq!(recent[0].actual_weather.as_deref(), Some("Clouds"));
        assert_eq!(recent[0].accuracy_score, Some(80.0));
    }

    #[tokio::test]
    async fn reconciling_a_missing_forecast_returns_none() {
        let pool = memory_pool().await;
        let forecasts = SqlForecastRepository::new(pool);

        let score = forecasts.update_actuals(404, 50, "Clear").await.expect("update call");
        assert!(score.is_none());
    }
}
