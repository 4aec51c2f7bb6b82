//! # Demand Forecast
//!
//! A Rust library for inventory demand forecasting and replenishment
//! planning.
//!
//! ## Features
//!
//! - Regularization of raw stock movements into gap-free demand series
//! - Seasonal decomposition (additive or multiplicative, picked per
//!   series)
//! - Damped-trend forecasting with widening prediction intervals
//! - Anomaly scoring of incoming movements against the seasonal baseline
//! - Reorder-point and reorder-quantity recommendations
//! - A per-product result cache behind the [`ForecastEngine`]
//!   orchestrator
//!
//! The engine is a pure in-process computation library: it performs no
//! I/O and never reads the clock. Movement history and evaluation
//! timestamps come from the caller, so results are reproducible from
//! their inputs alone.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use demand_forecast::{EngineConfig, ForecastEngine, MovementKind, StockMovement};
//!
//! # fn main() -> demand_forecast::Result<()> {
//! // Four weeks of daily sales for product 1.
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let movements: Vec<StockMovement> = (0..28i64)
//!     .map(|day| StockMovement {
//!         id: day as u64,
//!         product_id: 1,
//!         warehouse_id: 1,
//!         timestamp: start + Duration::days(day),
//!         quantity: -10,
//!         kind: MovementKind::Sale,
//!     })
//!     .collect();
//!
//! let engine = ForecastEngine::new(EngineConfig::default())?;
//! let end = start + Duration::days(28);
//! engine.refresh(1, 1, &movements, (start, end), end)?;
//!
//! let forecast = engine.get_forecast(1)?;
//! assert_eq!(forecast.horizon(), 30);
//!
//! let recommendation = engine.get_recommendation(1)?;
//! assert!(recommendation.reorder_point > 0.0);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod anomaly;
pub mod config;
pub mod decompose;
pub mod engine;
pub mod error;
pub mod model;
pub mod movement;
pub mod replenish;
pub mod series;

// Re-export commonly used types
pub use crate::aggregate::TimeSeriesAggregator;
pub use crate::anomaly::{AnomalyDetector, AnomalyFlag, AnomalyReason};
pub use crate::config::EngineConfig;
pub use crate::decompose::{DecompositionMode, SeasonalDecomposer, SeasonalProfile};
pub use crate::engine::{EngineSummary, ForecastEngine, RefreshRequest};
pub use crate::error::{ForecastError, Result};
pub use crate::model::{Forecast, ForecastPoint, FittedSeasonalTrend, SeasonalTrendModel};
pub use crate::movement::{MovementId, MovementKind, ProductId, StockMovement, WarehouseId};
pub use crate::replenish::{
    service_level_z, ReorderRecommendation, ReplenishmentOptimizer, Urgency,
};
pub use crate::series::{Cadence, DemandSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
