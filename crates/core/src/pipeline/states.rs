use serde::{Deserialize, Serialize};

/// Stages of a single query. `Done` is terminal; there are no cycles
/// and no concurrency between stages of one query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStage {
    Classifying,
    Gathering,
    Deciding,
    Responding,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageEvent {
    /// Classification finished, possibly via fallback.
    IntentResolved,
    /// The data bundle is available, possibly empty.
    BundleReady,
    /// The decide stage produced a decision, skipped, or degraded.
    DecisionResolved,
    /// The formatted answer exists.
    AnswerComposed,
}

/// Routing input computed before applying `BundleReady`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageContext {
    pub decision_required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageAction {
    GatherBundle,
    EvaluateDecision,
    ComposeAnswer,
    RecordConversation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub from: QueryStage,
    pub to: QueryStage,
    pub event: StageEvent,
    pub actions: Vec<StageAction>,
}
