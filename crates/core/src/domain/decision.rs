use serde::{Deserialize, Serialize};

use crate::domain::ticket::TicketPriority;

/// Deterministic restocking action derived from gathered data. The
/// advisory model supplies the narrative; quantities and vendor choice
/// come from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderAction {
    pub sku: String,
    pub quantity: i64,
    pub vendor_id: String,
    pub priority: TicketPriority,
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub analysis: String,
    pub actions: Vec<ReorderAction>,
}

/// Outcome of the optional decide stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOutcome {
    Decided(Decision),
    /// The decision policy did not select this query.
    Skipped,
    /// The advisory call failed; the reply is data-only.
    Degraded { reason: String },
}

impl DecisionOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Decided(decision) => Some(decision),
            _ => None,
        }
    }
}
