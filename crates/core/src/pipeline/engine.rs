use thiserror::Error;

use crate::pipeline::states::{QueryStage, StageAction, StageContext, StageEvent, StageOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StageTransitionError {
    #[error("invalid transition from {stage:?} using event {event:?}")]
    InvalidTransition { stage: QueryStage, event: StageEvent },
}

/// The fixed classify → gather → (decide)? → respond sequence as an
/// explicit transition table. The coordinator drives this machine; the
/// machine itself performs no I/O and rejects out-of-order events.
#[derive(Clone, Debug, Default)]
pub struct QueryPipeline;

impl QueryPipeline {
    pub fn initial_stage(&self) -> QueryStage {
        QueryStage::Classifying
    }

    pub fn apply(
        &self,
        current: &QueryStage,
        event: &StageEvent,
        context: &StageContext,
    ) -> Result<StageOutcome, StageTransitionError> {
        use StageAction::{ComposeAnswer, EvaluateDecision, GatherBundle, RecordConversation};
        use StageEvent::{AnswerComposed, BundleReady, DecisionResolved, IntentResolved};
        use QueryStage::{Classifying, Deciding, Done, Gathering, Responding};

        let (to, actions) = match (current, event) {
            (Classifying, IntentResolved) => (Gathering, vec![GatherBundle]),
            (Gathering, BundleReady) if context.decision_required => {
                (Deciding, vec![EvaluateDecision])
            }
            (Gathering, BundleReady) => (Responding, vec![ComposeAnswer]),
            (Deciding, DecisionResolved) => (Responding, vec![ComposeAnswer]),
            (Responding, AnswerComposed) => (Done, vec![RecordConversation]),
            _ => {
                return Err(StageTransitionError::InvalidTransition {
                    stage: current.clone(),
                    event: event.clone(),
                });
            }
        };

        Ok(StageOutcome { from: current.clone(), to, event: event.clone(), actions })
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryPipeline, StageTransitionError};
    use crate::pipeline::states::{QueryStage, StageAction, StageContext, StageEvent};

    #[test]
    fn data_only_path_skips_the_decide_stage() {
        let pipeline = QueryPipeline;
        let context = StageContext { decision_required: false };
        let mut stage = pipeline.initial_stage();

        stage = pipeline
            .apply(&stage, &StageEvent::IntentResolved, &context)
            .expect("classifying -> gathering")
            .to;
        let routed = pipeline
            .apply(&stage, &StageEvent::BundleReady, &context)
            .expect("gathering -> responding");
        assert_eq!(routed.to, QueryStage::Responding);
        assert_eq!(routed.actions, vec![StageAction::ComposeAnswer]);

        let done = pipeline
            .apply(&routed.to, &StageEvent::AnswerComposed, &context)
            .expect("responding -> done");
        assert_eq!(done.to, QueryStage::Done);
        assert_eq!(done.actions, vec![StageAction::RecordConversation]);
    }

    #[test]
    fn decision_path_routes_through_deciding() {
        let pipeline = QueryPipeline;
        let context = StageContext { decision_required: true };

        let gathered = pipeline
            .apply(&QueryStage::Classifying, &StageEvent::IntentResolved, &context)
            .expect("classifying -> gathering");
        assert_eq!(gathered.actions, vec![StageAction::GatherBundle]);

        let deciding = pipeline
            .apply(&gathered.to, &StageEvent::BundleReady, &context)
            .expect("gathering -> deciding");
        assert_eq!(deciding.to, QueryStage::Deciding);
        assert_eq!(deciding.actions, vec![StageAction::EvaluateDecision]);

        let responding = pipeline
            .apply(&deciding.to, &StageEvent::DecisionResolved, &context)
            .expect("deciding -> responding");
        assert_eq!(responding.to, QueryStage::Responding);
    }

    #[test]
    fn done_is_terminal() {
        let pipeline = QueryPipeline;
        for event in [
            StageEvent::IntentResolved,
            StageEvent::BundleReady,
            StageEvent::DecisionResolved,
            StageEvent::AnswerComposed,
        ] {
            let error = pipeline
                .apply(&QueryStage::Done, &event, &StageContext::default())
                .expect_err("done must reject every event");
            assert!(matches!(error, StageTransitionError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let pipeline = QueryPipeline;
        let error = pipeline
            .apply(&QueryStage::Classifying, &StageEvent::BundleReady, &StageContext::default())
            .expect_err("cannot gather before classifying finishes");
        assert_eq!(
            error,
            StageTransitionError::InvalidTransition {
                stage: QueryStage::Classifying,
                event: StageEvent::BundleReady,
            }
        );

        let error = pipeline
            .apply(&QueryStage::Responding, &StageEvent::DecisionResolved, &StageContext::default())
            .expect_err("decide cannot run after responding");
        assert!(matches!(error, StageTransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let pipeline = QueryPipeline;
        let context = StageContext { decision_required: true };
        let events = [
            StageEvent::IntentResolved,
            StageEvent::BundleReady,
            StageEvent::DecisionResolved,
            StageEvent::AnswerComposed,
        ];

        let run = || {
            let mut stage = pipeline.initial_stage();
            let mut actions = Vec::new();
            for event in &events {
                let outcome = pipeline.apply(&stage, event, &context).expect("deterministic run");
                actions.push(outcome.actions);
                stage = outcome.to;
            }
            (stage, actions)
        };

        assert_eq!(run(), run());
    }
}
