pub mod engine;
pub mod policy;
pub mod states;

pub use engine::{QueryPipeline, StageTransitionError};
pub use policy::DecisionPolicy;
pub use states::{QueryStage, StageAction, StageContext, StageEvent, StageOutcome};
