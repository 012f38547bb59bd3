use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(Self::Sale),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }
}

/// Aggregated ledger summary over a trailing window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_sales: f64,
    pub total_purchases: f64,
    pub net_profit: f64,
    pub transaction_count: i64,
    pub avg_transaction_value: f64,
    pub period_days: u32,
}

impl FinanceSummary {
    pub fn profit_margin_pct(&self) -> f64 {
        if self.total_sales <= 0.0 {
            return 0.0;
        }
        self.net_profit / self.total_sales * 100.0
    }
}
