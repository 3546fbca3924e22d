//! # Chartdeck Core
//!
//! Symbol data aggregation for interactive stock dashboards.
//!
//! ## Overview
//!
//! This crate backs dashboards that chart one or more ticker symbols:
//!
//! - **Category dashboards** track company overviews and chart currency or
//!   sector distributions plus per-symbol scalars (bar and pie charts)
//! - **Series dashboards** track daily price history for up to two symbols
//!   over a configurable window (candlestick and line charts)
//!
//! Every user command validates its input, fetches from Alpha Vantage,
//! normalizes the payload into a typed record, updates an in-memory store and
//! hands a fresh snapshot to a [`ChartRenderer`]. A failed command leaves the
//! store untouched and renders nothing.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chart`] | Renderer trait, snapshots and chart-ready records |
//! | [`config`] | Client configuration and environment overrides |
//! | [`dashboard`] | Category and series controllers |
//! | [`domain`] | Domain models (Symbol, CompanyProfile, DailyBar, WindowSize) |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Raw JSON to domain records |
//! | [`retry`] | Retry policy for rate-limited calls |
//! | [`sequencer`] | Last-request-wins bookkeeping |
//! | [`source`] | Alpha Vantage fetcher |
//! | [`store`] | Category and time-series aggregates |
//! | [`throttling`] | Client-side request quota |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use chartdeck_core::{AlphaVantageSource, CategoryDashboard, ChartRenderer, ChartSnapshot};
//!
//! struct Stdout;
//!
//! impl ChartRenderer for Stdout {
//!     fn render(&self, snapshot: &ChartSnapshot) {
//!         println!("{snapshot:?}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = CategoryDashboard::new(AlphaVantageSource::from_env(), Arc::new(Stdout));
//!     dashboard.on_add_symbol("AAPL").await?;
//!     dashboard.on_add_symbol("MSFT").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  UI command     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Dashboard      │────▶│ Request          │
//! │  controller     │     │ Sequencer        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ AlphaVantage    │────▶│ HTTP Client      │
//! │ Source          │     │ (retry/throttle) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Normalizer      │────▶│ Store ──▶ Render │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Commands return [`DashboardError`], which carries a stable code:
//!
//! ```rust
//! use chartdeck_core::{DashboardError, NetworkErrorKind};
//!
//! fn describe(error: &DashboardError) -> &'static str {
//!     match error {
//!         DashboardError::Network(network) if network.kind() == NetworkErrorKind::RateLimited => {
//!             "quota exhausted, try again shortly"
//!         }
//!         DashboardError::Validation(_) => "not a ticker symbol",
//!         _ => error.code(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The API key is read from `CHARTDECK_ALPHAVANTAGE_API_KEY` and redacted from `Debug` output
//! - Symbols are validated before they reach a request URL

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod retry;
pub mod sequencer;
pub mod source;
pub mod store;
pub mod throttling;

// Charts and rendering
pub use chart::{ChartRenderer, ChartSnapshot};

// Configuration
pub use config::ClientConfig;

// Controllers
pub use dashboard::{CategoryDashboard, CommandOutcome, SeriesDashboard};

// Domain models
pub use domain::{
    CategoryField, CompanyProfile, DailyBar, Direction, Role, ScalarMetric, Symbol, WindowSize,
};

// Error types
pub use error::{
    DashboardError, NetworkError, NetworkErrorKind, NormalizationError, StoreError,
    ValidationError,
};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Request ordering
pub use sequencer::{RequestSequencer, RequestTicket};

// Fetching
pub use source::{AlphaVantageSource, ApiFunction};

// Aggregates
pub use store::{
    CategoryCounts, CategorySnapshot, ProfileStore, ScalarEntry, SeriesDomain, SeriesSnapshot,
    SeriesStore, SymbolSeries,
};

// Throttling
pub use throttling::{RequestQuota, RequestThrottle};
