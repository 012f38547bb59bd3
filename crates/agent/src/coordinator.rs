use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use stockwise_core::config::AppConfig;
use stockwise_core::domain::conversation::{NewConversationTurn, SessionId, TurnMetadata};
use stockwise_core::domain::forecast::NewForecast;
use stockwise_core::domain::inventory::reorder_quantity;
use stockwise_core::domain::ticket::{NewTicket, TicketPriority};
use stockwise_core::pipeline::{
    DecisionPolicy, QueryPipeline, QueryStage, StageContext, StageEvent,
};
use stockwise_core::{
    Classification, DataBundle, Decision, DecisionOutcome, Intent, QuerySlots, Region,
    ReorderAction, ReorderContext,
};
use stockwise_db::repositories::{
    ConversationRepository, ForecastRepository, ReportCollector, RepositoryError, TicketRepository,
};

use crate::classify::{build_classification_prompt, classification_from_response};
use crate::format;
use crate::llm::AdvisoryClient;
use crate::prompts::{build_ambiguous_bundle_prompt, build_reorder_prompt, build_vendor_prompt};
use crate::weather::{RegionForecast, WeatherProvider};

const SALES_WINDOW_DAYS: u32 = 365;
const FINANCE_WINDOW_DAYS: u32 = 365;
const PENDING_TICKET_LIMIT: i64 = 50;

#[derive(Clone, Debug)]
pub struct CoordinatorSettings {
    pub advisory_timeout: Duration,
    pub max_history_turns: usize,
    pub reorder_multiplier: f64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            advisory_timeout: Duration::from_secs(30),
            max_history_turns: 10,
            reorder_multiplier: 2.0,
        }
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            advisory_timeout: Duration::from_secs(config.llm.timeout_secs),
            max_history_turns: config.pipeline.max_history_turns,
            reorder_multiplier: config.pipeline.reorder_multiplier,
        }
    }
}

/// One formatted answer per query, with the degradation flags the
/// surfaces need: `advisory_used` is false when any advisory call was
/// skipped or failed, `data_only` marks a decision that degraded to
/// gathered data, and `warnings` carry partial persistence failures.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReply {
    pub intent: Intent,
    pub text: String,
    pub advisory_used: bool,
    pub data_only: bool,
    pub warnings: Vec<String>,
}

/// Drives a single query through the fixed stage sequence. Logically
/// synchronous per query; the only suspension points are the bounded
/// advisory/weather calls and database access.
pub struct PipelineCoordinator {
    advisory: Arc<dyn AdvisoryClient>,
    weather: Arc<dyn WeatherProvider>,
    reports: Arc<dyn ReportCollector>,
    tickets: Arc<dyn TicketRepository>,
    forecasts: Arc<dyn ForecastRepository>,
    conversations: Arc<dyn ConversationRepository>,
    policy: DecisionPolicy,
    settings: CoordinatorSettings,
    engine: QueryPipeline,
}

impl PipelineCoordinator {
    pub fn new(
        advisory: Arc<dyn AdvisoryClient>,
        weather: Arc<dyn WeatherProvider>,
        reports: Arc<dyn ReportCollector>,
        tickets: Arc<dyn TicketRepository>,
        forecasts: Arc<dyn ForecastRepository>,
        conversations: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            advisory,
            weather,
            reports,
            tickets,
            forecasts,
            conversations,
            policy: DecisionPolicy::default(),
            settings: CoordinatorSettings::default(),
            engine: QueryPipeline,
        }
    }

    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Processes one query. Never fails: every stage has a defined
    /// degraded fallback, so a well-formed reply always comes back.
    pub async fn handle(&self, session_id: &SessionId, query: &str) -> PipelineReply {
        let mut warnings = Vec::new();
        let mut stage = self.engine.initial_stage();

        let Classification { intent, slots, degraded: classify_degraded } =
            self.classify(session_id, query).await;
        info!(intent = %intent, degraded = classify_degraded, "query classified");
        self.advance(&mut stage, StageEvent::IntentResolved, &StageContext::default());

        let bundle = match self.gather(intent, &slots).await {
            Ok(bundle) => bundle,
            Err(repo_error) => {
                error!(error = %repo_error, intent = %intent, "gather failed; degrading to empty bundle");
                warnings.push("data lookup failed; results may be incomplete".to_string());
                DataBundle::Empty
            }
        };
        debug!(bundle = bundle.label(), rows = bundle.row_count(), "data gathered");

        let context =
            StageContext { decision_required: self.policy.requires_decision(intent, &bundle) };
        self.advance(&mut stage, StageEvent::BundleReady, &context);

        let decision = if context.decision_required {
            let outcome = self.decide(intent, &slots, &bundle, &mut warnings).await;
            self.advance(&mut stage, StageEvent::DecisionResolved, &context);
            outcome
        } else {
            DecisionOutcome::Skipped
        };

        let decision_degraded = decision.is_degraded();
        let text = format::compose_reply(intent, &slots, &bundle, &decision, &warnings);
        self.advance(&mut stage, StageEvent::AnswerComposed, &context);

        let turn = NewConversationTurn {
            session_id: session_id.clone(),
            user_message: query.to_string(),
            assistant_message: text.clone(),
            intent_label: Some(intent.label().to_string()),
            metadata: TurnMetadata {
                region: slots.region,
                category: slots.category.clone(),
                sku: slots.sku.clone(),
            },
        };
        if let Err(repo_error) = self.conversations.append(turn).await {
            error!(error = %repo_error, "conversation log append failed");
            warnings.push("conversation history not saved".to_string());
        }

        PipelineReply {
            intent,
            text,
            advisory_used: !classify_degraded && !decision_degraded,
            data_only: decision_degraded,
            warnings,
        }
    }

    /// Applies an event to the stage machine. The coordinator always
    /// drives events in a valid order, so a rejection is a bug; it is
    /// logged and the query continues rather than aborting.
    fn advance(&self, stage: &mut QueryStage, event: StageEvent, context: &StageContext) {
        match self.engine.apply(stage, &event, context) {
            Ok(outcome) => {
                debug!(from = ?outcome.from, to = ?outcome.to, event = ?outcome.event, "pipeline stage advanced");
                *stage = outcome.to;
            }
            Err(transition_error) => {
                error!(error = %transition_error, "pipeline transition rejected");
            }
        }
    }

    async fn classify(&self, session_id: &SessionId, query: &str) -> Classification {
        let history = match self
            .conversations
            .session_history(session_id, self.settings.max_history_turns as i64)
            .await
        {
            Ok(history) => history,
            Err(repo_error) => {
                warn!(error = %repo_error, "history lookup failed; classifying without context");
                Vec::new()
            }
        };

        let prompt = build_classification_prompt(query, &history);
        match tokio::time::timeout(self.settings.advisory_timeout, self.advisory.complete(&prompt))
            .await
        {
            Err(_) => {
                warn!("classification timed out; falling back to default intent");
                Classification::fallback()
            }
            Ok(Err(advisory_error)) => {
                warn!(error = %advisory_error, "classification failed; falling back to default intent");
                Classification::fallback()
            }
            Ok(Ok(content)) => classification_from_response(&content),
        }
    }

    /// Intent is the routing key: one fixed query shape each.
    async fn gather(
        &self,
        intent: Intent,
        slots: &QuerySlots,
    ) -> Result<DataBundle, RepositoryError> {
        let bundle = match intent {
            Intent::InventoryStatus => {
                DataBundle::Inventory(self.reports.inventory_status(slots.region).await?)
            }
            Intent::SalesAnalysis => DataBundle::Sales(
                self.reports.sales_patterns(slots.sku.as_deref(), SALES_WINDOW_DAYS).await?,
            ),
            Intent::FinancialSummary => DataBundle::Finance(
                self.reports.financial_summary(slots.region, FINANCE_WINDOW_DAYS).await?,
            ),
            Intent::TicketStatus => DataBundle::Tickets {
                tickets: self.reports.pending_tickets(PENDING_TICKET_LIMIT).await?,
                stats: self.reports.ticket_stats().await?,
            },
            Intent::ReorderRecommendation => {
                DataBundle::Reorder(self.reports.reorder_context(slots.region).await?)
            }
            Intent::VendorOptimization => {
                DataBundle::Vendors(self.reports.vendor_performance().await?)
            }
            Intent::GeneralQuery => DataBundle::Empty,
        };
        Ok(bundle)
    }

    async fn decide(
        &self,
        intent: Intent,
        slots: &QuerySlots,
        bundle: &DataBundle,
        warnings: &mut Vec<String>,
    ) -> DecisionOutcome {
        let forecast_region = slots.region.unwrap_or(Region::Central);
        let forecast = match self.weather.forecast(forecast_region).await {
            Ok(forecast) => Some(forecast),
            Err(weather_error) => {
                warn!(error = %weather_error, region = %forecast_region, "weather lookup failed; deciding without forecast");
                None
            }
        };

        let prompt = match bundle {
            DataBundle::Reorder(context) => {
                build_reorder_prompt(context, forecast.as_ref(), slots.region)
            }
            DataBundle::Vendors(vendors) => build_vendor_prompt(vendors, slots.sku.as_deref()),
            other => build_ambiguous_bundle_prompt(intent, other),
        };

        let analysis = match tokio::time::timeout(
            self.settings.advisory_timeout,
            self.advisory.complete(&prompt),
        )
        .await
        {
            Err(_) => {
                let reason = format!(
                    "advisory request timed out after {}s",
                    self.settings.advisory_timeout.as_secs()
                );
                warn!(intent = %intent, "decide stage degraded: {reason}");
                return DecisionOutcome::Degraded { reason };
            }
            Ok(Err(advisory_error)) => {
                warn!(error = %advisory_error, intent = %intent, "decide stage degraded");
                return DecisionOutcome::Degraded { reason: advisory_error.to_string() };
            }
            Ok(Ok(analysis)) => analysis,
        };

        let actions = match bundle {
            DataBundle::Reorder(context) => {
                derive_reorder_actions(context, self.settings.reorder_multiplier)
            }
            _ => Vec::new(),
        };

        self.persist_actions(&actions, forecast.as_ref(), warnings).await;

        DecisionOutcome::Decided(Decision { analysis, actions })
    }

    /// One transaction per write; each failure becomes a partial-success
    /// warning instead of dropping the recommendation.
    async fn persist_actions(
        &self,
        actions: &[ReorderAction],
        forecast: Option<&RegionForecast>,
        warnings: &mut Vec<String>,
    ) {
        let forecast_date = forecast
            .and_then(RegionForecast::leading_date)
            .unwrap_or_else(|| Utc::now().date_naive() + chrono::Duration::days(1));
        let predicted_weather =
            forecast.and_then(RegionForecast::leading_condition).unwrap_or("Unknown").to_string();

        for action in actions {
            let new_ticket = NewTicket {
                sku: action.sku.clone(),
                reason: action.rationale.clone(),
                recommended_qty: action.quantity,
                vendor_id: action.vendor_id.clone(),
                priority: action.priority,
            };
            match self.tickets.create(new_ticket).await {
                Ok(ticket) => {
                    info!(ticket_id = ticket.id, sku = %action.sku, "reorder ticket created");
                }
                Err(repo_error) => {
                    error!(error = %repo_error, sku = %action.sku, "ticket insert failed");
                    warnings.push(format!(
                        "recommendation generated, ticket not saved for {}",
                        action.sku
                    ));
                }
            }

            let new_forecast = NewForecast {
                forecast_date,
                sku: action.sku.clone(),
                predicted_demand: action.quantity,
                predicted_weather: predicted_weather.clone(),
                recommendation: action.rationale.clone(),
            };
            match self.forecasts.record(new_forecast).await {
                Ok(forecast_id) => {
                    debug!(forecast_id, sku = %action.sku, "forecast recorded");
                }
                Err(repo_error) => {
                    error!(error = %repo_error, sku = %action.sku, "forecast insert failed");
                    warnings.push(format!(
                        "recommendation generated, forecast not saved for {}",
                        action.sku
                    ));
                }
            }
        }
    }
}

/// Quantities and vendor assignment are policy, not model output: top
/// up to `threshold * multiplier` from the item's own vendor.
fn derive_reorder_actions(context: &ReorderContext, multiplier: f64) -> Vec<ReorderAction> {
    context
        .low_stock
        .iter()
        .filter_map(|item| {
            let quantity = reorder_quantity(item.quantity, item.reorder_threshold, multiplier);
            (quantity > 0).then(|| ReorderAction {
                sku: item.sku.clone(),
                quantity,
                vendor_id: item.vendor_id.clone(),
                priority: TicketPriority::High,
                rationale: format!(
                    "low stock: {} units at or below threshold {}",
                    item.quantity, item.reorder_threshold
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::{derive_reorder_actions, CoordinatorSettings, PipelineCoordinator};
    use crate::format::DATA_ONLY_NOTE;
    use crate::llm::AdvisoryClient;
    use crate::weather::{DailyForecast, RegionForecast, WeatherProvider};
    use stockwise_core::domain::conversation::SessionId;
    use stockwise_core::domain::inventory::LowStockItem;
    use stockwise_core::domain::ticket::{NewTicket, Ticket, TicketStatus};
    use stockwise_core::{AdvisoryError, Intent, QuerySlots, Region, ReorderContext};
    use stockwise_db::repositories::{
        ReportCollector, RepositoryError, SqlConversationRepository, SqlForecastRepository,
        SqlReportCollector, SqlTicketRepository, TicketRepository,
    };
    use stockwise_db::repositories::{ConversationRepository, ForecastRepository};
    use stockwise_db::{connect_with_settings, migrations, DbPool, DemoDataset};

    struct ScriptedAdvisory {
        responses: Mutex<VecDeque<Result<String, AdvisoryError>>>,
    }

    impl ScriptedAdvisory {
        fn new(responses: Vec<Result<String, AdvisoryError>>) -> Arc<Self> {
            Arc::new(Self { responses: Mutex::new(responses.into_iter().collect()) })
        }
    }

    #[async_trait]
    impl AdvisoryClient for ScriptedAdvisory {
        async fn complete(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Err(AdvisoryError::Transport("script exhausted".to_string())))
        }
    }

    struct SlowAdvisory {
        delay: Duration,
    }

    #[async_trait]
    impl AdvisoryClient for SlowAdvisory {
        async fn complete(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            tokio::time::sleep(self.delay).await;
            Ok("intent: inventory_status\nregion: none\ncategory: none\nsku: none".to_string())
        }
    }

    struct ClearWeather;

    #[async_trait]
    impl WeatherProvider for ClearWeather {
        async fn forecast(&self, region: Region) -> Result<RegionForecast, AdvisoryError> {
            Ok(RegionForecast {
                region,
                days: vec![DailyForecast {
                    date: NaiveDate::from_ymd_opt(2026, 8, 8).expect("date"),
                    temperature: 27.0,
                    rainfall: 0.0,
                    humidity: 55.0,
                    condition: "Clear".to_string(),
                }],
            })
        }
    }

    struct FailingTickets;

    #[async_trait]
    impl TicketRepository for FailingTickets {
        async fn create(&self, _ticket: NewTicket) -> Result<Ticket, RepositoryError> {
            Err(RepositoryError::Decode("disk full".to_string()))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Ticket>, RepositoryError> {
            Ok(None)
        }

        async fn update_status(
            &self,
            _id: i64,
            _status: TicketStatus,
        ) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    async fn seeded_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        DemoDataset::load(&pool).await.expect("load demo dataset");
        pool
    }

    fn coordinator(advisory: Arc<dyn AdvisoryClient>, pool: &DbPool) -> PipelineCoordinator {
        PipelineCoordinator::new(
            advisory,
            Arc::new(ClearWeather),
            Arc::new(SqlReportCollector::new(pool.clone())),
            Arc::new(SqlTicketRepository::new(pool.clone())),
            Arc::new(SqlForecastRepository::new(pool.clone())),
            Arc::new(SqlConversationRepository::new(pool.clone())),
        )
    }

    fn classify_response(intent: &str) -> Result<String, AdvisoryError> {
        Ok(format!("intent: {intent}\nregion: none\ncategory: none\nsku: none"))
    }

    fn session() -> SessionId {
        SessionId("session-test".to_string())
    }

    #[tokio::test]
    async fn classification_failure_still_produces_a_well_formed_reply() {
        let pool = seeded_pool().await;
        let advisory =
            ScriptedAdvisory::new(vec![Err(AdvisoryError::Transport("api down".to_string()))]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "what items are low in stock?").await;

        assert_eq!(reply.intent, Intent::GeneralQuery);
        assert!(!reply.advisory_used);
        assert!(!reply.data_only);
        assert!(!reply.text.is_empty());
        assert!(reply.warnings.is_empty());
    }

    #[tokio::test]
    async fn classification_timeout_falls_back_to_the_default_intent() {
        let pool = seeded_pool().await;
        let coordinator = coordinator(Arc::new(SlowAdvisory { delay: Duration::from_millis(200) }), &pool)
            .with_settings(CoordinatorSettings {
                advisory_timeout: Duration::from_millis(20),
                ..CoordinatorSettings::default()
            });

        let reply = coordinator.handle(&session(), "hello").await;

        assert_eq!(reply.intent, Intent::GeneralQuery);
        assert!(!reply.advisory_used);
    }

    #[tokio::test]
    async fn low_stock_query_reports_eight_items_without_a_decision() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![classify_response("inventory_status")]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "What items are low in stock?").await;

        assert_eq!(reply.intent, Intent::InventoryStatus);
        assert!(reply.advisory_used);
        assert!(!reply.data_only);
        assert!(reply.text.contains("Low stock alerts: 8"));
        assert!(reply.text.contains("SKU-BEV-004"));

        // No decision intent fired, so no ticket side effects.
        let collector = SqlReportCollector::new(pool);
        assert!(collector.pending_tickets(50).await.expect("tickets").is_empty());
    }

    #[tokio::test]
    async fn reorder_decision_creates_retrievable_pending_tickets() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("reorder_recommendation"),
            Ok("Restock the most depleted beverage lines first.".to_string()),
        ]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "what should we reorder?").await;

        assert_eq!(reply.intent, Intent::ReorderRecommendation);
        assert!(reply.advisory_used);
        assert!(!reply.data_only);
        assert!(reply.warnings.is_empty());
        assert!(reply.text.contains("Restock the most depleted beverage lines first."));
        assert!(reply.text.contains("TICKETS RAISED:"));

        let collector = SqlReportCollector::new(pool.clone());
        let pending = collector.pending_tickets(50).await.expect("pending tickets");
        assert_eq!(pending.len(), 8, "one ticket per seeded low-stock item");

        // Round-trip contract: the iced tea ticket carries the same
        // sku/vendor/quantity it was created with.
        let iced_tea = pending
            .iter()
            .find(|ticket| ticket.sku == "SKU-BEV-004")
            .expect("iced tea ticket exists");
        assert_eq!(iced_tea.status, TicketStatus::Pending);
        assert_eq!(iced_tea.vendor_id, "VEND-001");
        assert_eq!(iced_tea.recommended_qty, 36); // 20 * 2.0 - 4

        let forecasts = SqlForecastRepository::new(pool);
        let recent = forecasts.recent(50).await.expect("recent forecasts");
        assert_eq!(recent.len(), 8);
        assert!(recent.iter().all(|forecast| forecast.predicted_weather == "Clear"));
    }

    #[tokio::test]
    async fn advisory_failure_during_decide_degrades_to_data_only() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("reorder_recommendation"),
            Err(AdvisoryError::Timeout { waited_secs: 30 }),
        ]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "what should we reorder?").await;

        assert_eq!(reply.intent, Intent::ReorderRecommendation);
        assert!(!reply.advisory_used);
        assert!(reply.data_only);
        assert!(reply.text.contains("SKU-BEV-004"), "gathered data still present");
        assert!(reply.text.contains(DATA_ONLY_NOTE));

        // Degraded decisions must not write side effects.
        let collector = SqlReportCollector::new(pool);
        assert!(collector.pending_tickets(50).await.expect("tickets").is_empty());
    }

    #[tokio::test]
    async fn ticket_persistence_failure_surfaces_as_partial_success() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("reorder_recommendation"),
            Ok("Restock everything below threshold.".to_string()),
        ]);
        let coordinator = PipelineCoordinator::new(
            advisory,
            Arc::new(ClearWeather),
            Arc::new(SqlReportCollector::new(pool.clone())),
            Arc::new(FailingTickets),
            Arc::new(SqlForecastRepository::new(pool.clone())),
            Arc::new(SqlConversationRepository::new(pool.clone())),
        );

        let reply = coordinator.handle(&session(), "what should we reorder?").await;

        assert!(reply.advisory_used, "the recommendation itself succeeded");
        assert!(!reply.data_only);
        assert!(reply
            .warnings
            .iter()
            .any(|warning| warning.contains("ticket not saved")));
        assert!(reply.text.contains("Restock everything below threshold."));
        assert!(reply.text.contains("ticket not saved"));
    }

    #[tokio::test]
    async fn vendor_optimization_decides_without_writing_tickets() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("vendor_optimization"),
            Ok("FreshLine Supply is the strongest primary vendor.".to_string()),
        ]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "which vendor should we use?").await;

        assert_eq!(reply.intent, Intent::VendorOptimization);
        assert!(reply.advisory_used);
        assert!(reply.text.contains("FreshLine Supply"));

        let collector = SqlReportCollector::new(pool);
        assert!(collector.pending_tickets(50).await.expect("tickets").is_empty());
    }

    #[tokio::test]
    async fn replies_are_appended_to_the_conversation_log() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![classify_response("ticket_status")]);
        let coordinator = coordinator(advisory, &pool);
        let session_id = session();

        let reply = coordinator.handle(&session_id, "any open tickets?").await;

        let log = SqlConversationRepository::new(pool);
        let history = log.session_history(&session_id, 10).await.expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_message, "any open tickets?");
        assert_eq!(history[0].assistant_message, reply.text);
        assert_eq!(history[0].intent_label.as_deref(), Some("ticket_status"));
    }

    #[tokio::test]
    async fn gather_routes_each_intent_to_its_bundle_shape() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(Vec::new());
        let coordinator = coordinator(advisory, &pool);
        let slots = QuerySlots::default();

        let cases = [
            (Intent::InventoryStatus, "inventory"),
            (Intent::SalesAnalysis, "sales"),
            (Intent::FinancialSummary, "finance"),
            (Intent::TicketStatus, "tickets"),
            (Intent::ReorderRecommendation, "reorder"),
            (Intent::VendorOptimization, "vendors"),
            (Intent::GeneralQuery, "empty"),
        ];
        for (intent, expected_label) in cases {
            let bundle = coordinator.gather(intent, &slots).await.expect("gather");
            assert_eq!(bundle.label(), expected_label, "wrong bundle shape for {intent}");
        }
    }

    #[tokio::test]
    async fn gather_twice_returns_identical_bundles() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(Vec::new());
        let coordinator = coordinator(advisory, &pool);
        let slots = QuerySlots { region: Some(Region::North), ..QuerySlots::default() };

        let first = coordinator.gather(Intent::InventoryStatus, &slots).await.expect("first");
        let second = coordinator.gather(Intent::InventoryStatus, &slots).await.expect("second");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ambiguous_bundle_row_count_triggers_a_decision() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("inventory_status"),
            Ok("The snack category is the one to watch.".to_string()),
        ]);
        // Seeded inventory has 20 rows; force the threshold below it.
        let coordinator = coordinator(advisory, &pool).with_policy(
            stockwise_core::pipeline::DecisionPolicy {
                ambiguity_row_threshold: 10,
                ..stockwise_core::pipeline::DecisionPolicy::default()
            },
        );

        let reply = coordinator.handle(&session(), "show me all inventory").await;

        assert_eq!(reply.intent, Intent::InventoryStatus);
        assert!(reply.text.contains("RECOMMENDATION"));
        assert!(reply.text.contains("The snack category is the one to watch."));
    }

    #[test]
    fn reorder_actions_top_up_to_target_from_the_item_vendor() {
        let context = ReorderContext {
            low_stock: vec![
                LowStockItem {
                    sku: "SKU-A".to_string(),
                    name: "Item A".to_string(),
                    category: "snacks".to_string(),
                    region: Region::North,
                    quantity: 4,
                    reorder_threshold: 20,
                    vendor_id: "VEND-002".to_string(),
                },
                // Already at target after rounding: no action.
                LowStockItem {
                    sku: "SKU-B".to_string(),
                    name: "Item B".to_string(),
                    category: "snacks".to_string(),
                    region: Region::North,
                    quantity: 40,
                    reorder_threshold: 20,
                    vendor_id: "VEND-003".to_string(),
                },
            ],
            vendors: Vec::new(),
        };

        let actions = derive_reorder_actions(&context, 2.0);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].sku, "SKU-A");
        assert_eq!(actions[0].quantity, 36);
        assert_eq!(actions[0].vendor_id, "VEND-002");
    }

    #[tokio::test]
    async fn empty_gather_results_still_produce_defined_replies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        let advisory = ScriptedAdvisory::new(vec![classify_response("ticket_status")]);
        let coordinator = coordinator(advisory, &pool);

        let reply = coordinator.handle(&session(), "any open tickets?").await;

        assert_eq!(reply.intent, Intent::TicketStatus);
        assert_eq!(reply.text.lines().next(), Some("No pending tickets."));
    }

    #[tokio::test]
    async fn rolling_history_is_fed_back_into_classification() {
        let pool = seeded_pool().await;
        let advisory = ScriptedAdvisory::new(vec![
            classify_response("inventory_status"),
            classify_response("inventory_status"),
        ]);
        let coordinator = coordinator(advisory, &pool);
        let session_id = session();

        coordinator.handle(&session_id, "how is stock looking?").await;
        coordinator.handle(&session_id, "and in the north?").await;

        let log = SqlConversationRepository::new(pool);
        let history = log.session_history(&session_id, 10).await.expect("history");
        assert_eq!(history.len(), 2);
    }
}
