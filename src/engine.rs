//! Forecast engine orchestrating aggregation, decomposition,
//! forecasting and replenishment per product

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::TimeSeriesAggregator;
use crate::anomaly::{AnomalyDetector, AnomalyFlag};
use crate::config::EngineConfig;
use crate::decompose::SeasonalProfile;
use crate::error::{ForecastError, Result};
use crate::model::{Forecast, SeasonalTrendModel};
use crate::movement::{ProductId, StockMovement, WarehouseId};
use crate::replenish::{ReorderRecommendation, ReplenishmentOptimizer};
use crate::series::DemandSeries;

/// One product's cached results, replaced wholesale on every successful
/// refresh.
#[derive(Debug)]
struct CacheEntry {
    series: DemandSeries,
    profile: SeasonalProfile,
    forecast: Forecast,
    recommendation: ReorderRecommendation,
    computed_at: DateTime<Utc>,
}

/// Input for one product in a bulk refresh.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub movements: Vec<StockMovement>,
    pub range: (DateTime<Utc>, DateTime<Utc>),
}

/// Cache-derived overview of the engine's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSummary {
    pub products_cached: usize,
    pub stale_products: usize,
    pub generated_at: DateTime<Utc>,
}

/// Orchestrates the forecasting pipeline per product and owns the result
/// cache.
///
/// The cache lives and dies with the engine value: created empty at
/// construction, entries replaced by `refresh`, dropped by `invalidate`
/// or `clear`. Reads never trigger computation.
///
/// Refreshes for different products run in parallel; the cache map is
/// sharded by product id. Concurrent refreshes for the *same* product
/// serialize on a per-product guard: the second caller waits for the
/// first to finish, then recomputes. Reads take an atomic snapshot of a
/// product's entry, so `check_movement` sees a consistent baseline even
/// while a refresh is swapping it.
///
/// The engine performs no I/O and never reads the clock; callers pass
/// the evaluation timestamp, which keeps every result a pure function of
/// its inputs.
pub struct ForecastEngine {
    config: EngineConfig,
    aggregator: TimeSeriesAggregator,
    model: SeasonalTrendModel,
    detector: AnomalyDetector,
    optimizer: ReplenishmentOptimizer,
    cache: DashMap<ProductId, Arc<CacheEntry>>,
    in_flight: DashMap<ProductId, Arc<Mutex<()>>>,
}

impl ForecastEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let aggregator =
            TimeSeriesAggregator::new(config.cadence, config.min_nonzero_periods)?;
        let model = SeasonalTrendModel::new(config.seasonal_period, config.damping)?
            .with_level_scaling_threshold(config.level_scaling_threshold);
        let detector = AnomalyDetector::new(config.z_threshold, config.rate_threshold)?;
        let optimizer = ReplenishmentOptimizer::new(config.coverage_periods)?;

        Ok(Self {
            config,
            aggregator,
            model,
            detector,
            optimizer,
            cache: DashMap::new(),
            in_flight: DashMap::new(),
        })
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recompute series, decomposition, forecast and recommendation for
    /// one product, replacing its cached results.
    ///
    /// `as_of` stamps the generated results and should be the caller's
    /// evaluation time. On failure the previous cache entry, if any, is
    /// left untouched.
    pub fn refresh(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        movements: &[StockMovement],
        range: (DateTime<Utc>, DateTime<Utc>),
        as_of: DateTime<Utc>,
    ) -> Result<()> {
        let guard = self
            .in_flight
            .entry(product_id)
            .or_default()
            .clone();
        let _serialized = guard.lock().unwrap_or_else(PoisonError::into_inner);

        match self.compute(product_id, warehouse_id, movements, range, as_of) {
            Ok(entry) => {
                self.cache.insert(product_id, Arc::new(entry));
                info!(product_id, "forecast refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(product_id, error = %e, "refresh failed, keeping previous results");
                Err(e)
            }
        }
    }

    fn compute(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        movements: &[StockMovement],
        range: (DateTime<Utc>, DateTime<Utc>),
        as_of: DateTime<Utc>,
    ) -> Result<CacheEntry> {
        debug!(product_id, movements = movements.len(), "aggregating movement history");
        let series = self.aggregator.aggregate(product_id, movements, range)?;

        debug!(product_id, periods = series.len(), "fitting seasonal-trend model");
        let fitted = self.model.fit(&series)?;
        let forecast = fitted.forecast(self.config.horizon, as_of)?;
        let recommendation = self.optimizer.recommend(
            &forecast,
            warehouse_id,
            self.config.lead_time_periods,
            self.config.service_level,
            as_of,
        )?;

        Ok(CacheEntry {
            series,
            profile: fitted.into_profile(),
            forecast,
            recommendation,
            computed_at: as_of,
        })
    }

    /// Refresh a batch of products, one unit of work each.
    ///
    /// Checks `cancel` between products and stops early when it is set;
    /// products already refreshed keep their new results, the rest keep
    /// whatever they had.
    pub fn refresh_many(
        &self,
        requests: &[RefreshRequest],
        as_of: DateTime<Utc>,
        cancel: &AtomicBool,
    ) -> Vec<(ProductId, Result<()>)> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            if cancel.load(Ordering::Relaxed) {
                debug!(
                    completed = outcomes.len(),
                    remaining = requests.len() - outcomes.len(),
                    "batch refresh cancelled"
                );
                break;
            }

            let outcome = self.refresh(
                request.product_id,
                request.warehouse_id,
                &request.movements,
                request.range,
                as_of,
            );
            outcomes.push((request.product_id, outcome));
        }

        outcomes
    }

    /// Cached forecast for a product.
    pub fn get_forecast(&self, product_id: ProductId) -> Result<Forecast> {
        self.cache
            .get(&product_id)
            .map(|entry| entry.forecast.clone())
            .ok_or(ForecastError::NotComputed(product_id))
    }

    /// Cached reorder recommendation for a product.
    pub fn get_recommendation(&self, product_id: ProductId) -> Result<ReorderRecommendation> {
        self.cache
            .get(&product_id)
            .map(|entry| entry.recommendation.clone())
            .ok_or(ForecastError::NotComputed(product_id))
    }

    /// Cached demand series for a product.
    pub fn get_series(&self, product_id: ProductId) -> Result<DemandSeries> {
        self.cache
            .get(&product_id)
            .map(|entry| entry.series.clone())
            .ok_or(ForecastError::NotComputed(product_id))
    }

    /// Cached seasonal profile for a product.
    pub fn get_profile(&self, product_id: ProductId) -> Result<SeasonalProfile> {
        self.cache
            .get(&product_id)
            .map(|entry| entry.profile.clone())
            .ok_or(ForecastError::NotComputed(product_id))
    }

    /// Score an incoming movement against the product's cached baseline.
    ///
    /// Read-only: takes a snapshot of the cache entry and never mutates
    /// it. Fails with `NoBaseline` if the product was never refreshed.
    pub fn check_movement(
        &self,
        movement: &StockMovement,
        as_of: DateTime<Utc>,
    ) -> Result<Option<AnomalyFlag>> {
        let snapshot = self
            .cache
            .get(&movement.product_id)
            .map(|entry| entry.value().clone())
            .ok_or(ForecastError::NoBaseline(movement.product_id))?;

        self.detector
            .evaluate(movement, &snapshot.series, &snapshot.profile, as_of)
    }

    /// Cache-derived overview: how many products have results, and how
    /// many of those are older than the configured staleness window.
    pub fn summary(&self, as_of: DateTime<Utc>) -> EngineSummary {
        let max_age = self.config.cadence.duration() * (self.config.stale_after_periods as i32);
        let mut products_cached = 0;
        let mut stale_products = 0;
        for entry in self.cache.iter() {
            products_cached += 1;
            if as_of - entry.computed_at > max_age {
                stale_products += 1;
            }
        }

        EngineSummary {
            products_cached,
            stale_products,
            generated_at: as_of,
        }
    }

    /// Drop one product's cached results.
    pub fn invalidate(&self, product_id: ProductId) {
        self.cache.remove(&product_id);
    }

    /// Drop all cached results.
    pub fn clear(&self) {
        self.cache.clear();
    }
}
