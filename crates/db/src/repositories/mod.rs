use async_trait::async_trait;
use thiserror::Error;

use stockwise_core::domain::conversation::{ConversationTurn, NewConversationTurn, SessionId};
use stockwise_core::domain::finance::FinanceSummary;
use stockwise_core::domain::forecast::{ForecastRecord, NewForecast};
use stockwise_core::domain::inventory::InventoryStatus;
use stockwise_core::domain::region::Region;
use stockwise_core::domain::sales::SalesPatterns;
use stockwise_core::domain::ticket::{NewTicket, Ticket, TicketStats, TicketStatus};
use stockwise_core::domain::vendor::Vendor;
use stockwise_core::ReorderContext;

pub mod conversations;
pub mod forecasts;
pub mod reports;
pub mod tickets;

pub use conversations::SqlConversationRepository;
pub use forecasts::SqlForecastRepository;
pub use reports::SqlReportCollector;
pub use tickets::SqlTicketRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only aggregated queries. One fixed query shape per intent;
/// empty stores produce empty-but-well-typed results, never errors.
/// Identical inputs against an unchanged store return identical
/// results.
#[async_trait]
pub trait ReportCollector: Send + Sync {
    async fn inventory_status(
        &self,
        region: Option<Region>,
    ) -> Result<InventoryStatus, RepositoryError>;

    async fn sales_patterns(
        &self,
        sku: Option<&str>,
        days: u32,
    ) -> Result<SalesPatterns, RepositoryError>;

    async fn financial_summary(
        &self,
        region: Option<Region>,
        days: u32,
    ) -> Result<FinanceSummary, RepositoryError>;

    /// Vendors ranked quality desc, reliability desc, lead time asc.
    async fn vendor_performance(&self) -> Result<Vec<Vendor>, RepositoryError>;

    async fn pending_tickets(&self, limit: i64) -> Result<Vec<Ticket>, RepositoryError>;

    async fn ticket_stats(&self) -> Result<TicketStats, RepositoryError>;

    async fn reorder_context(
        &self,
        region: Option<Region>,
    ) -> Result<ReorderContext, RepositoryError>;
}

/// Side-effect writer for restocking tickets. The pipeline only
/// creates; status transitions are manual operator actions.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, RepositoryError>;

    async fn update_status(&self, id: i64, status: TicketStatus) -> Result<bool, RepositoryError>;
}

/// Side-effect writer for demand forecasts. Actuals reconciliation is
/// a manual operation outside the pipeline.
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    async fn record(&self, forecast: NewForecast) -> Result<i64, RepositoryError>;

    async fn recent(&self, limit: i64) -> Result<Vec<ForecastRecord>, RepositoryError>;

    /// Fills in actuals and the derived accuracy score; returns the
    /// score, or `None` when the forecast does not exist.
    async fn update_actuals(
        &self,
        id: i64,
        actual_demand: i64,
        actual_weather: &str,
    ) -> Result<Option<f64>, RepositoryError>;
}

/// Append-only conversation log providing short-term session context.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn append(&self, turn: NewConversationTurn) -> Result<i64, RepositoryError>;

    /// Most recent `limit` turns of a session, chronological order.
    async fn session_history(
        &self,
        session_id: &SessionId,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, RepositoryError>;

    async fn recent(&self, limit: i64) -> Result<Vec<ConversationTurn>, RepositoryError>;
}
