use std::collections::BTreeSet;

use crate::domain::bundle::DataBundle;
use crate::intent::Intent;

/// Predicate deciding whether the decide stage runs. The exact
/// boundary is configuration, not a hard-coded heuristic: operators
/// tune which intents always decide and how many bundle rows imply an
/// ambiguous query worth a recommendation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionPolicy {
    pub decision_intents: BTreeSet<Intent>,
    pub ambiguity_row_threshold: usize,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            decision_intents: BTreeSet::from([
                Intent::ReorderRecommendation,
                Intent::VendorOptimization,
            ]),
            ambiguity_row_threshold: 25,
        }
    }
}

impl DecisionPolicy {
    pub fn requires_decision(&self, intent: Intent, bundle: &DataBundle) -> bool {
        if !intent.requires_data() {
            return false;
        }
        self.decision_intents.contains(&intent) || bundle.row_count() > self.ambiguity_row_threshold
    }
}
