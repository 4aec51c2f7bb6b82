//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::series::Cadence;

/// Tunable parameters for the forecast engine.
///
/// Defaults match a weekly seasonal pattern over daily buckets with a
/// 30-period forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bucket width for regularizing movements into a series.
    pub cadence: Cadence,
    /// Length of one seasonal cycle, in periods.
    pub seasonal_period: usize,
    /// Number of future periods each forecast covers.
    pub horizon: usize,
    /// Minimum non-zero periods required before fitting.
    pub min_nonzero_periods: usize,
    /// Cycle-level correlation above which decomposition turns
    /// multiplicative.
    pub level_scaling_threshold: f64,
    /// Trend damping factor in (0, 1]; 1.0 extrapolates fully linearly.
    pub damping: f64,
    /// Anomaly deviation cutoff, in baseline standard deviations.
    pub z_threshold: f64,
    /// Anomaly cutoff for change relative to the preceding period.
    pub rate_threshold: f64,
    /// Periods between placing and receiving a reorder.
    pub lead_time_periods: usize,
    /// Target probability of not stocking out before replenishment.
    pub service_level: f64,
    /// Periods of expected demand a reorder should cover.
    pub coverage_periods: usize,
    /// Cache entries older than this many periods count as stale.
    pub stale_after_periods: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cadence: Cadence::Daily,
            seasonal_period: 7,
            horizon: 30,
            min_nonzero_periods: 14,
            level_scaling_threshold: 0.5,
            damping: 0.98,
            z_threshold: 3.0,
            rate_threshold: 3.0,
            lead_time_periods: 7,
            service_level: 0.95,
            coverage_periods: 14,
            stale_after_periods: 1,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// Lead time against horizon is deliberately left to `recommend`,
    /// which owns that contract.
    pub fn validate(&self) -> Result<()> {
        if self.seasonal_period < 2 {
            return Err(ForecastError::InvalidParameter(
                "seasonal_period must be at least 2".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.min_nonzero_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_nonzero_periods must be at least 1".to_string(),
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "damping must be in (0, 1], got {}",
                self.damping
            )));
        }
        if !self.level_scaling_threshold.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "level_scaling_threshold must be finite".to_string(),
            ));
        }
        if !(self.z_threshold.is_finite() && self.z_threshold > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "z_threshold must be a finite positive number".to_string(),
            ));
        }
        if !(self.rate_threshold.is_finite() && self.rate_threshold > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "rate_threshold must be a finite positive number".to_string(),
            ));
        }
        if self.lead_time_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "lead_time_periods must be at least 1".to_string(),
            ));
        }
        if !(self.service_level > 0.0 && self.service_level < 1.0) {
            return Err(ForecastError::InvalidServiceLevel(self.service_level));
        }
        if self.coverage_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "coverage_periods must be at least 1".to_string(),
            ));
        }
        if self.stale_after_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "stale_after_periods must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut config = EngineConfig::default();
        config.seasonal_period = 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.horizon = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.damping = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.service_level = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidServiceLevel(_))
        ));
    }
}
