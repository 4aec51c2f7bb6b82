//! Regularized per-product demand series

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::movement::ProductId;

/// Fixed time-bucket width used to regularize raw movements into a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    Hourly,
    Daily,
    Weekly,
}

impl Cadence {
    /// Width of one period.
    pub fn duration(&self) -> Duration {
        match self {
            Cadence::Hourly => Duration::hours(1),
            Cadence::Daily => Duration::days(1),
            Cadence::Weekly => Duration::weeks(1),
        }
    }
}

/// Ordered, gap-free demand series for one product at a fixed cadence.
///
/// Period `i` starts at `start + i * cadence`. Periods with no observed
/// movements hold zero demand; none are ever skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSeries {
    product_id: ProductId,
    start: DateTime<Utc>,
    cadence: Cadence,
    values: Vec<f64>,
}

impl DemandSeries {
    /// Create a new demand series.
    pub fn new(
        product_id: ProductId,
        start: DateTime<Utc>,
        cadence: Cadence,
        values: Vec<f64>,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "demand series must contain at least one period".to_string(),
            ));
        }

        Ok(Self {
            product_id,
            start,
            cadence,
            values,
        })
    }

    /// Product this series describes.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Start of the first period.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Cadence of the series.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Aggregated demand per period.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Demand in period `i`, if present.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    /// Demand in the last period.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Start of period `i`.
    pub fn period_start(&self, i: usize) -> DateTime<Utc> {
        self.start + self.cadence.duration() * (i as i32)
    }

    /// Period index that `timestamp` falls into, or `None` for timestamps
    /// before the series starts. The returned index may lie beyond the
    /// last observed period.
    pub fn period_index(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        if timestamp < self.start {
            return None;
        }

        let step = self.cadence.duration().num_seconds();
        let offset = (timestamp - self.start).num_seconds();
        Some((offset / step) as usize)
    }

    /// Number of periods with non-zero demand.
    pub fn non_zero_periods(&self) -> usize {
        self.values.iter().filter(|v| v.abs() > f64::EPSILON).count()
    }

    /// Mean demand per period.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Standard deviation of demand per period.
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;

        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series() -> DemandSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        DemandSeries::new(1, start, Cadence::Daily, vec![2.0, 0.0, 4.0, 6.0]).unwrap()
    }

    #[test]
    fn period_starts_are_equally_spaced() {
        let s = series();
        assert_eq!(s.period_start(0), s.start());
        assert_eq!(s.period_start(3) - s.period_start(2), Duration::days(1));
    }

    #[test]
    fn period_index_maps_timestamps_into_buckets() {
        let s = series();
        let inside = s.start() + Duration::hours(30);
        assert_eq!(s.period_index(inside), Some(1));
        assert_eq!(s.period_index(s.start() - Duration::hours(1)), None);
        // Beyond the observed range still yields an index.
        assert_eq!(s.period_index(s.start() + Duration::days(10)), Some(10));
    }

    #[test]
    fn statistics_cover_all_periods() {
        let s = series();
        assert_eq!(s.non_zero_periods(), 3);
        assert_eq!(s.mean(), 3.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(DemandSeries::new(1, start, Cadence::Daily, vec![]).is_err());
    }
}
