pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod pipeline;

pub use domain::bundle::{DataBundle, ReorderContext};
pub use domain::conversation::{ConversationTurn, NewConversationTurn, SessionId, TurnMetadata};
pub use domain::decision::{Decision, DecisionOutcome, ReorderAction};
pub use domain::finance::{FinanceSummary, TransactionKind};
pub use domain::forecast::{ForecastRecord, NewForecast};
pub use domain::inventory::{InventoryStatus, LowStockItem};
pub use domain::region::Region;
pub use domain::sales::{SalesPatterns, TopSellingDay};
pub use domain::ticket::{NewTicket, Ticket, TicketPriority, TicketStats, TicketStatus};
pub use domain::vendor::Vendor;
pub use errors::AdvisoryError;
pub use intent::{Classification, Intent, IntentCandidate, QuerySlots};
pub use pipeline::{
    DecisionPolicy, QueryStage, StageAction, StageContext, StageEvent, StageOutcome,
    StageTransitionError,
};
