//! Reorder-point and reorder-quantity recommendations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ForecastError, Result};
use crate::model::Forecast;
use crate::movement::{ProductId, WarehouseId};

/// How soon the stock position demands action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

/// Reorder recommendation derived from a forecast plus lead-time and
/// service-level configuration. Recomputed whenever the forecast is
/// refreshed; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRecommendation {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    /// Stock level at which a reorder should be triggered.
    pub reorder_point: f64,
    /// Quantity to order when the reorder point is hit.
    pub reorder_quantity: f64,
    pub service_level: f64,
    pub generated_at: DateTime<Utc>,
}

impl ReorderRecommendation {
    /// Number of forecast periods until available stock is expected to
    /// fall to the reorder point. `Some(0)` when it already has;
    /// `None` when the forecast horizon never gets there.
    pub fn periods_until_reorder(&self, available: f64, forecast: &Forecast) -> Option<usize> {
        if available <= self.reorder_point {
            return Some(0);
        }

        let mut remaining = available;
        for (i, point) in forecast.points().iter().enumerate() {
            remaining -= point.point.max(0.0);
            if remaining <= self.reorder_point {
                return Some(i + 1);
            }
        }

        None
    }

    /// Urgency of the recommendation given the currently available
    /// stock: high below half the reorder point, medium at or below it,
    /// low otherwise.
    pub fn urgency(&self, available: f64) -> Urgency {
        if available <= self.reorder_point * 0.5 {
            Urgency::High
        } else if available <= self.reorder_point {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

/// Map a service-level probability to the corresponding standard-normal
/// quantile.
pub fn service_level_z(service_level: f64) -> Result<f64> {
    if !service_level.is_finite() || service_level <= 0.0 || service_level >= 1.0 {
        return Err(ForecastError::InvalidServiceLevel(service_level));
    }

    let standard_normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
    Ok(standard_normal.inverse_cdf(service_level))
}

/// Combines a forecast with lead time and a service-level target into a
/// reorder point and reorder quantity.
///
/// The reorder quantity follows a cover-next-N-periods policy: order
/// enough to meet expected demand over `coverage_periods`.
#[derive(Debug, Clone)]
pub struct ReplenishmentOptimizer {
    coverage_periods: usize,
}

impl ReplenishmentOptimizer {
    /// Create a new optimizer ordering cover for `coverage_periods`
    /// periods of expected demand.
    pub fn new(coverage_periods: usize) -> Result<Self> {
        if coverage_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "coverage_periods must be at least 1".to_string(),
            ));
        }

        Ok(Self { coverage_periods })
    }

    /// Recommend a reorder point and quantity for one product at one
    /// warehouse.
    ///
    /// Reorder point = expected demand over the lead time + safety
    /// stock, where safety stock scales the forecast uncertainty at the
    /// lead-time horizon by the service-level quantile.
    pub fn recommend(
        &self,
        forecast: &Forecast,
        warehouse_id: WarehouseId,
        lead_time_periods: usize,
        service_level: f64,
        generated_at: DateTime<Utc>,
    ) -> Result<ReorderRecommendation> {
        let z = service_level_z(service_level)?;

        let horizon = forecast.horizon();
        if lead_time_periods == 0 || lead_time_periods > horizon {
            return Err(ForecastError::InvalidLeadTime {
                lead_time: lead_time_periods,
                horizon,
            });
        }

        let lead_time_demand = forecast.expected_over(lead_time_periods);
        let sigma = forecast.sigma_at(lead_time_periods - 1).unwrap_or(0.0);
        let safety_stock = z * sigma;
        let reorder_point = (lead_time_demand + safety_stock).max(0.0);

        let coverage = self.coverage_periods.min(horizon);
        let reorder_quantity = forecast.expected_over(coverage).max(0.0);

        Ok(ReorderRecommendation {
            product_id: forecast.product_id(),
            warehouse_id,
            reorder_point,
            reorder_quantity,
            service_level,
            generated_at,
        })
    }
}
