//! Query pipeline - classification, data gathering, and advisory calls
//!
//! This crate is the orchestration layer of the stockwise system:
//!
//! - **Classification** (`classify`) - Parse NL queries into a closed
//!   `Intent` set plus region/category/sku slots via the advisory model
//! - **Gathering** - Route each intent to one fixed report query
//! - **Decision** (`prompts`, `coordinator`) - Optionally ask the
//!   advisory model for a recommendation and write tickets/forecasts
//! - **Response** (`format`) - Deterministic, pure formatting
//!
//! # Key Types
//!
//! - `PipelineCoordinator` - Drives the stage machine from
//!   `stockwise-core` through its collaborators (see `coordinator`)
//! - `AdvisoryClient` / `WeatherProvider` - Single-method boundaries
//!   around the hosted model and weather service, each with an explicit
//!   failure type
//!
//! # Degradation Principle
//!
//! No advisory failure ever aborts a query. Classification falls back
//! to the default intent, the decide stage falls back to a data-only
//! answer, and persistence failures surface as partial-success
//! warnings in the reply.

pub mod classify;
pub mod coordinator;
pub mod format;
pub mod llm;
pub mod prompts;
pub mod weather;

pub use coordinator::{CoordinatorSettings, PipelineCoordinator, PipelineReply};
pub use llm::{AdvisoryClient, HttpAdvisoryClient};
pub use weather::{CachedWeatherProvider, DailyForecast, RegionForecast, WeatherProvider};
