//! Seasonal-trend forecasting model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decompose::{DecompositionMode, SeasonalDecomposer, SeasonalProfile};
use crate::error::{ForecastError, Result};
use crate::movement::ProductId;
use crate::series::{Cadence, DemandSeries};

/// Half-width multiplier for the 95% prediction interval.
const INTERVAL_Z: f64 = 1.96;

/// One forecast period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period_start: DateTime<Utc>,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forward-looking demand forecast for one product.
///
/// Interval widths never narrow as the horizon grows: uncertainty
/// accumulates random-walk style with distance from the observed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    product_id: ProductId,
    generated_at: DateTime<Utc>,
    cadence: Cadence,
    points: Vec<ForecastPoint>,
    confidence: f64,
}

impl Forecast {
    /// Create a forecast from already-computed points.
    pub fn new(
        product_id: ProductId,
        generated_at: DateTime<Utc>,
        cadence: Cadence,
        points: Vec<ForecastPoint>,
        confidence: f64,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "forecast must cover at least one period".to_string(),
            ));
        }

        Ok(Self {
            product_id,
            generated_at,
            cadence,
            points,
            confidence,
        })
    }

    /// Product this forecast describes.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// When the forecast was generated.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Cadence of the forecast periods.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Forecast points, ordered by period.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of future periods covered.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// Data-consistency confidence in `[0.5, 1.0]`: high when residual
    /// noise is small relative to mean demand.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Accumulated forecast uncertainty at horizon index `i`, recovered
    /// from the interval half-width.
    pub fn sigma_at(&self, i: usize) -> Option<f64> {
        self.points
            .get(i)
            .map(|p| (p.upper - p.point) / INTERVAL_Z)
    }

    /// Expected demand summed over the first `periods` forecast periods,
    /// with negative point estimates clamped to zero.
    pub fn expected_over(&self, periods: usize) -> f64 {
        self.points
            .iter()
            .take(periods)
            .map(|p| p.point.max(0.0))
            .sum()
    }

    /// Serialize the forecast to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Forecasting model blending damped trend extrapolation with cyclic
/// reapplication of the seasonal pattern.
///
/// Stateless across calls: every fit starts from scratch, so output is a
/// pure function of the input series.
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    decomposer: SeasonalDecomposer,
    damping: f64,
}

impl SeasonalTrendModel {
    /// Create a new model. `damping` in `(0, 1]` flattens the trend
    /// extrapolation; 1.0 keeps it fully linear.
    pub fn new(period_length: usize, damping: f64) -> Result<Self> {
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "damping must be in (0, 1], got {damping}"
            )));
        }

        Ok(Self {
            decomposer: SeasonalDecomposer::new(period_length)?,
            damping,
        })
    }

    /// Threshold passed through to the decomposer's mode heuristic.
    pub fn with_level_scaling_threshold(mut self, threshold: f64) -> Self {
        self.decomposer = self.decomposer.with_level_scaling_threshold(threshold);
        self
    }

    /// Fit the model to a demand series.
    ///
    /// Decomposition failure surfaces as `ForecastUnavailable` with the
    /// underlying cause attached.
    pub fn fit(&self, series: &DemandSeries) -> Result<FittedSeasonalTrend> {
        let profile = self
            .decomposer
            .decompose(series)
            .map_err(|e| ForecastError::ForecastUnavailable(Box::new(e)))?;

        let (intercept, slope) = linear_fit(profile.trend());
        let n = series.len();
        let level = intercept + slope * (n - 1) as f64;
        let residual_std = profile.residual_std();
        let mean_demand = series.mean();

        Ok(FittedSeasonalTrend {
            product_id: series.product_id(),
            cadence: series.cadence(),
            series_start: series.start(),
            observed_periods: n,
            level,
            slope,
            damping: self.damping,
            residual_std,
            mean_demand,
            profile,
        })
    }

    /// Fit and immediately forecast `horizon` periods.
    pub fn fit_and_forecast(
        &self,
        series: &DemandSeries,
        horizon: usize,
        generated_at: DateTime<Utc>,
    ) -> Result<Forecast> {
        self.fit(series)?.forecast(horizon, generated_at)
    }
}

/// Model state produced by one fit, sufficient to forecast any horizon.
#[derive(Debug, Clone)]
pub struct FittedSeasonalTrend {
    product_id: ProductId,
    cadence: Cadence,
    series_start: DateTime<Utc>,
    observed_periods: usize,
    level: f64,
    slope: f64,
    damping: f64,
    residual_std: f64,
    mean_demand: f64,
    profile: SeasonalProfile,
}

impl FittedSeasonalTrend {
    /// Decomposition underlying this fit.
    pub fn profile(&self) -> &SeasonalProfile {
        &self.profile
    }

    /// Consume the fit, keeping only the decomposition.
    pub fn into_profile(self) -> SeasonalProfile {
        self.profile
    }

    /// Fitted trend level at the last observed period.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Fitted trend slope per period.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Standard deviation of the fit residuals.
    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    /// Forecast `horizon` future periods.
    pub fn forecast(&self, horizon: usize, generated_at: DateTime<Utc>) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }

        let p = self.profile.period_length();
        let last_index = self.observed_periods - 1;
        let step = self.cadence.duration();

        let mut points = Vec::with_capacity(horizon);
        let mut damped_steps = 0.0;
        let mut phi_pow = 1.0;
        for h in 1..=horizon {
            phi_pow *= self.damping;
            damped_steps += phi_pow;

            let trend = self.level + self.slope * damped_steps;
            let seasonal = self.profile.seasonal_index((last_index + h) % p);
            let point = match self.profile.mode() {
                DecompositionMode::Additive => trend + seasonal,
                DecompositionMode::Multiplicative => trend * seasonal,
            };

            let sigma = self.residual_std * (h as f64).sqrt();
            points.push(ForecastPoint {
                period_start: self.series_start + step * ((last_index + h) as i32),
                point,
                lower: point - INTERVAL_Z * sigma,
                upper: point + INTERVAL_Z * sigma,
            });
        }

        let confidence = (1.0 - self.residual_std / (self.mean_demand + 1.0)).clamp(0.5, 1.0);

        Forecast::new(
            self.product_id,
            generated_at,
            self.cadence,
            points,
            confidence,
        )
    }
}

/// Least-squares line through `values` indexed by position. Returns
/// `(intercept, slope)`; a degenerate x-spread yields a flat line at the
/// mean.
fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let x_mean = (values.len() - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    if denominator.abs() < 1e-10 {
        return (y_mean, 0.0);
    }

    let slope = numerator / denominator;
    (y_mean - slope * x_mean, slope)
}
