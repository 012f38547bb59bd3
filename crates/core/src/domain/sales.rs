use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::region::Region;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSellingDay {
    pub date: NaiveDate,
    pub sku: String,
    pub quantity: i64,
}

/// Sales pattern analysis over a trailing window, including the
/// historical weather tags carried on each sales row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesPatterns {
    pub total_units: i64,
    pub total_revenue: f64,
    pub avg_daily_units: f64,
    pub top_days: Vec<TopSellingDay>,
    pub units_by_condition: BTreeMap<String, i64>,
    pub revenue_by_region: BTreeMap<Region, f64>,
    pub transaction_count: i64,
    pub period_days: u32,
}
