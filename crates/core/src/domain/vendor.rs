use serde::{Deserialize, Serialize};

/// Immutable vendor reference data. Ranking for recommendations is
/// quality desc, reliability desc, lead time asc; the report collector
/// returns vendors already in that order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub vendor_id: String,
    pub name: String,
    pub lead_time_days: i64,
    pub unit_price: f64,
    pub on_time_rate: f64,
    pub quality_score: f64,
    pub reliability_rating: f64,
}
