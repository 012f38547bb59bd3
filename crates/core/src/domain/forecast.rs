use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForecast {
    pub forecast_date: NaiveDate,
    pub sku: String,
    pub predicted_demand: i64,
    pub predicted_weather: String,
    pub recommendation: String,
}

/// Write-once prediction row; the actual/accuracy columns are filled
/// in later by a manual reconciliation pass, never by the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: i64,
    pub forecast_date: NaiveDate,
    pub sku: String,
    pub predicted_demand: i64,
    pub predicted_weather: String,
    pub recommendation: String,
    pub actual_demand: Option<i64>,
    pub actual_weather: Option<String>,
    pub accuracy_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Percentage accuracy of a demand prediction, clamped to 0..=100.
pub fn accuracy_score(predicted: i64, actual: i64) -> f64 {
    if predicted == 0 {
        return 0.0;
    }
    let error = (predicted - actual).abs() as f64;
    (100.0 - error / predicted as f64 * 100.0).max(0.0)
}
