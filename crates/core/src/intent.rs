use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::region::Region;

/// Closed set of query intents. Variant order is the fixed priority
/// ordering used to break classification ties, so reordering variants
/// changes routing behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    InventoryStatus,
    SalesAnalysis,
    ReorderRecommendation,
    TicketStatus,
    FinancialSummary,
    VendorOptimization,
    GeneralQuery,
}

pub const INTENT_PRIORITY: [Intent; 7] = [
    Intent::InventoryStatus,
    Intent::SalesAnalysis,
    Intent::ReorderRecommendation,
    Intent::TicketStatus,
    Intent::FinancialSummary,
    Intent::VendorOptimization,
    Intent::GeneralQuery,
];

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::InventoryStatus => "inventory_status",
            Self::SalesAnalysis => "sales_analysis",
            Self::ReorderRecommendation => "reorder_recommendation",
            Self::TicketStatus => "ticket_status",
            Self::FinancialSummary => "financial_summary",
            Self::VendorOptimization => "vendor_optimization",
            Self::GeneralQuery => "general_query",
        }
    }

    /// Strict closed-set parse. Anything unrecognized is `None`; the
    /// caller decides whether that means fallback.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inventory_status" => Some(Self::InventoryStatus),
            "sales_analysis" => Some(Self::SalesAnalysis),
            "reorder_recommendation" => Some(Self::ReorderRecommendation),
            "ticket_status" => Some(Self::TicketStatus),
            "financial_summary" => Some(Self::FinancialSummary),
            "vendor_optimization" => Some(Self::VendorOptimization),
            "general_query" => Some(Self::GeneralQuery),
            _ => None,
        }
    }

    pub fn requires_data(&self) -> bool {
        !matches!(self, Self::GeneralQuery)
    }

    fn priority_rank(&self) -> usize {
        INTENT_PRIORITY
            .iter()
            .position(|candidate| candidate == self)
            .unwrap_or(INTENT_PRIORITY.len())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Slots optionally extracted alongside the intent label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySlots {
    pub region: Option<Region>,
    pub category: Option<String>,
    pub sku: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentCandidate {
    pub intent: Intent,
    pub confidence: Option<f64>,
}

/// Result of the classify stage. `degraded` marks a fallback caused by
/// an advisory failure or an out-of-set label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub slots: QuerySlots,
    pub degraded: bool,
}

impl Classification {
    pub fn fallback() -> Self {
        Self { intent: Intent::GeneralQuery, slots: QuerySlots::default(), degraded: true }
    }
}

/// Deterministic candidate resolution: highest confidence wins;
/// missing confidence counts as zero; exact ties resolve to the
/// earlier entry in the fixed priority ordering. An empty candidate
/// list falls back to the default intent.
pub fn resolve_candidates(candidates: &[IntentCandidate]) -> Intent {
    candidates
        .iter()
        .min_by(|a, b| {
            let conf_a = a.confidence.unwrap_or(0.0);
            let conf_b = b.confidence.unwrap_or(0.0);
            conf_b
                .partial_cmp(&conf_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.intent.priority_rank().cmp(&b.intent.priority_rank()))
        })
        .map(|candidate| candidate.intent)
        .unwrap_or(Intent::GeneralQuery)
}
