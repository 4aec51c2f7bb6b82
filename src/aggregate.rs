//! Aggregation of raw stock movements into regular demand series

use chrono::{DateTime, Utc};

use crate::error::{ForecastError, Result};
use crate::movement::{ProductId, StockMovement};
use crate::series::{Cadence, DemandSeries};

/// Converts raw stock-movement history into a regularized demand series.
///
/// Movements are bucketed into periods of the configured cadence and
/// summed by their demand effect. Periods without movements are imputed
/// as zero demand so the series never has gaps.
#[derive(Debug, Clone)]
pub struct TimeSeriesAggregator {
    cadence: Cadence,
    min_nonzero_periods: usize,
}

impl TimeSeriesAggregator {
    /// Create a new aggregator.
    pub fn new(cadence: Cadence, min_nonzero_periods: usize) -> Result<Self> {
        if min_nonzero_periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_nonzero_periods must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            cadence,
            min_nonzero_periods,
        })
    }

    /// Cadence the aggregator buckets into.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Aggregate a product's movement history over `[start, end)` into a
    /// demand series.
    ///
    /// Movements for other products or outside the range are skipped. The
    /// resulting series spans the requested range exactly: one period per
    /// cadence step, the last one truncated by `end` if the range is not
    /// a whole multiple of the cadence.
    pub fn aggregate(
        &self,
        product_id: ProductId,
        movements: &[StockMovement],
        range: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<DemandSeries> {
        let (start, end) = range;
        if end <= start {
            return Err(ForecastError::InvalidParameter(format!(
                "aggregation range is empty: {start} to {end}"
            )));
        }

        let step = self.cadence.duration().num_seconds();
        let span = (end - start).num_seconds();
        let periods = ((span + step - 1) / step) as usize;

        let mut values = vec![0.0; periods];
        for movement in movements {
            if movement.product_id != product_id {
                continue;
            }
            if movement.timestamp < start || movement.timestamp >= end {
                continue;
            }

            let index = ((movement.timestamp - start).num_seconds() / step) as usize;
            values[index] += movement.demand_effect();
        }

        let series = DemandSeries::new(product_id, start, self.cadence, values)?;
        let nonzero = series.non_zero_periods();
        if nonzero < self.min_nonzero_periods {
            return Err(ForecastError::InsufficientData {
                nonzero,
                needed: self.min_nonzero_periods,
            });
        }

        Ok(series)
    }
}
