//! Anomaly scoring of incoming stock movements

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decompose::SeasonalProfile;
use crate::error::{ForecastError, Result};
use crate::movement::{MovementId, StockMovement};
use crate::series::DemandSeries;

/// Why a movement was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyReason {
    /// Quantity far from the seasonal expectation
    QuantityOutlier,
    /// Sudden change relative to the preceding period
    RateOfChange,
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::QuantityOutlier => write!(f, "quantity outlier"),
            AnomalyReason::RateOfChange => write!(f, "rate-of-change outlier"),
        }
    }
}

/// Flag raised for a single anomalous movement. Never mutated; the
/// alerting subsystem consumes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub movement_id: MovementId,
    /// Scales with how far beyond the threshold the movement landed;
    /// 1.0 means exactly at threshold.
    pub severity: f64,
    pub reason: AnomalyReason,
    pub generated_at: DateTime<Utc>,
}

/// Scores incoming movements against a product's historical baseline.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    z_threshold: f64,
    rate_threshold: f64,
}

impl AnomalyDetector {
    /// Create a new detector. `z_threshold` is the deviation cutoff in
    /// baseline standard deviations; `rate_threshold` the cutoff for
    /// change relative to the preceding period.
    pub fn new(z_threshold: f64, rate_threshold: f64) -> Result<Self> {
        if !(z_threshold.is_finite() && z_threshold > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "z_threshold must be a finite positive number".to_string(),
            ));
        }
        if !(rate_threshold.is_finite() && rate_threshold > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "rate_threshold must be a finite positive number".to_string(),
            ));
        }

        Ok(Self {
            z_threshold,
            rate_threshold,
        })
    }

    /// Evaluate one movement against its product's baseline.
    ///
    /// Returns `Ok(None)` for unremarkable movements; a movement whose
    /// quantity matches the seasonal expectation exactly is never
    /// flagged. Fails with `InvalidMovement` when the movement does not
    /// belong to the baseline's product.
    pub fn evaluate(
        &self,
        movement: &StockMovement,
        baseline: &DemandSeries,
        profile: &SeasonalProfile,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<AnomalyFlag>> {
        if movement.product_id != baseline.product_id() {
            return Err(ForecastError::InvalidMovement(format!(
                "movement {} references product {} but the baseline covers product {}",
                movement.id,
                movement.product_id,
                baseline.product_id()
            )));
        }

        let observed = movement.demand_effect();
        let index = baseline
            .period_index(movement.timestamp)
            .unwrap_or(0)
            .min(baseline.len() - 1);
        let expected = profile.fitted(index);

        let deviation = observed - expected;
        if deviation.abs() < 1e-9 {
            return Ok(None);
        }

        let sigma = profile.residual_std();
        if sigma <= f64::EPSILON {
            // Constant baseline: any deviation is out of distribution.
            return Ok(Some(AnomalyFlag {
                movement_id: movement.id,
                severity: 1.0,
                reason: AnomalyReason::QuantityOutlier,
                generated_at,
            }));
        }

        let z = deviation / sigma;
        if z.abs() > self.z_threshold {
            return Ok(Some(AnomalyFlag {
                movement_id: movement.id,
                severity: z.abs() / self.z_threshold,
                reason: AnomalyReason::QuantityOutlier,
                generated_at,
            }));
        }

        if index > 0 {
            if let Some(previous) = baseline.get(index - 1) {
                let ratio = (observed - previous).abs() / previous.abs().max(1.0);
                if ratio > self.rate_threshold {
                    return Ok(Some(AnomalyFlag {
                        movement_id: movement.id,
                        severity: ratio / self.rate_threshold,
                        reason: AnomalyReason::RateOfChange,
                        generated_at,
                    }));
                }
            }
        }

        Ok(None)
    }
}
