//! Seasonal decomposition of demand series

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::series::DemandSeries;

/// How the trend, seasonal and residual components combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompositionMode {
    /// observed = trend + seasonal + residual
    Additive,
    /// observed = trend * seasonal * residual
    Multiplicative,
}

/// Decomposition of a demand series into trend, seasonal and residual
/// components.
///
/// The residual closes the reconstruction identity exactly: combining
/// all three components per `mode` reproduces the observed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    mode: DecompositionMode,
    period_length: usize,
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    residual: Vec<f64>,
}

impl SeasonalProfile {
    /// Mode selected for this decomposition.
    pub fn mode(&self) -> DecompositionMode {
        self.mode
    }

    /// Length of one seasonal cycle.
    pub fn period_length(&self) -> usize {
        self.period_length
    }

    /// Trend component, one value per observed period.
    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    /// Seasonal indices, one per cycle position. Additive indices average
    /// to 0, multiplicative indices to 1.
    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    /// Residual component, one value per observed period.
    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    /// Number of observed periods.
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    /// Check if the profile covers no periods.
    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }

    /// Seasonal index at a cycle position.
    pub fn seasonal_index(&self, position: usize) -> f64 {
        self.seasonal[position % self.period_length]
    }

    /// Expected value at period `i` from trend and seasonal components
    /// alone.
    pub fn fitted(&self, i: usize) -> f64 {
        let trend = self.trend[i.min(self.trend.len() - 1)];
        let seasonal = self.seasonal_index(i);
        match self.mode {
            DecompositionMode::Additive => trend + seasonal,
            DecompositionMode::Multiplicative => trend * seasonal,
        }
    }

    /// Reconstruct the observed value at period `i` from all components.
    pub fn reconstruct(&self, i: usize) -> f64 {
        match self.mode {
            DecompositionMode::Additive => self.fitted(i) + self.residual[i],
            DecompositionMode::Multiplicative => self.fitted(i) * self.residual[i],
        }
    }

    /// Standard deviation of the one-step errors `observed - fitted`,
    /// expressed in demand units for both modes so interval math
    /// downstream is mode-independent.
    pub fn residual_std(&self) -> f64 {
        let n = self.residual.len();
        let errors: Vec<f64> = (0..n)
            .map(|i| match self.mode {
                DecompositionMode::Additive => self.residual[i],
                DecompositionMode::Multiplicative => self.fitted(i) * (self.residual[i] - 1.0),
            })
            .collect();

        let mean = errors.iter().sum::<f64>() / n as f64;
        let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n as f64;
        variance.sqrt()
    }
}

/// Extracts trend, seasonal and residual components from a demand series.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposer {
    period_length: usize,
    level_scaling_threshold: f64,
}

impl SeasonalDecomposer {
    /// Create a new decomposer for cycles of `period_length` periods.
    pub fn new(period_length: usize) -> Result<Self> {
        if period_length < 2 {
            return Err(ForecastError::InvalidParameter(
                "period_length must be at least 2".to_string(),
            ));
        }

        Ok(Self {
            period_length,
            level_scaling_threshold: 0.5,
        })
    }

    /// Correlation between cycle level and cycle dispersion above which
    /// the decomposition switches to multiplicative.
    pub fn with_level_scaling_threshold(mut self, threshold: f64) -> Self {
        self.level_scaling_threshold = threshold;
        self
    }

    /// Length of one seasonal cycle.
    pub fn period_length(&self) -> usize {
        self.period_length
    }

    /// Decompose a series into trend, seasonal and residual components.
    pub fn decompose(&self, series: &DemandSeries) -> Result<SeasonalProfile> {
        let values = series.values();
        let n = values.len();
        let p = self.period_length;
        if n < 2 * p {
            return Err(ForecastError::InsufficientHistory {
                len: n,
                needed: 2 * p,
            });
        }

        let trend = moving_average_trend(values, p);
        let mode = self.select_mode(values);

        let detrended: Vec<f64> = values
            .iter()
            .zip(trend.iter())
            .map(|(&v, &t)| match mode {
                DecompositionMode::Additive => v - t,
                DecompositionMode::Multiplicative => {
                    if t.abs() > f64::EPSILON {
                        v / t
                    } else {
                        1.0
                    }
                }
            })
            .collect();

        let seasonal = normalized_indices(&detrended, p, mode);

        let residual: Vec<f64> = (0..n)
            .map(|i| {
                let fitted = match mode {
                    DecompositionMode::Additive => trend[i] + seasonal[i % p],
                    DecompositionMode::Multiplicative => trend[i] * seasonal[i % p],
                };
                match mode {
                    DecompositionMode::Additive => values[i] - fitted,
                    DecompositionMode::Multiplicative => {
                        if fitted.abs() > f64::EPSILON {
                            values[i] / fitted
                        } else {
                            1.0
                        }
                    }
                }
            })
            .collect();

        Ok(SeasonalProfile {
            mode,
            period_length: p,
            trend,
            seasonal,
            residual,
        })
    }

    /// Pick additive or multiplicative decomposition.
    ///
    /// The series is cut into full seasonal cycles; if per-cycle
    /// dispersion correlates with per-cycle level beyond the configured
    /// threshold, variance scales with level and the multiplicative form
    /// fits better. Multiplicative also requires strictly positive
    /// observations and at least three full cycles.
    fn select_mode(&self, values: &[f64]) -> DecompositionMode {
        let p = self.period_length;
        let cycles = values.len() / p;
        if cycles < 3 || values.iter().any(|v| *v <= 0.0) {
            return DecompositionMode::Additive;
        }

        let mut means = Vec::with_capacity(cycles);
        let mut stds = Vec::with_capacity(cycles);
        for c in 0..cycles {
            let cycle = &values[c * p..(c + 1) * p];
            let mean = cycle.iter().sum::<f64>() / p as f64;
            let variance = cycle.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / p as f64;
            means.push(mean);
            stds.push(variance.sqrt());
        }

        if pearson(&means, &stds) > self.level_scaling_threshold {
            DecompositionMode::Multiplicative
        } else {
            DecompositionMode::Additive
        }
    }
}

/// Centered moving-average trend with a half-window of `period / 2`.
/// The window shrinks at the series edges so the trend is defined at
/// every index.
fn moving_average_trend(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let window = &values[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Average detrended values at each cycle position, then normalize the
/// indices to mean 0 (additive) or mean 1 (multiplicative).
fn normalized_indices(detrended: &[f64], period: usize, mode: DecompositionMode) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, &d) in detrended.iter().enumerate() {
        sums[i % period] += d;
        counts[i % period] += 1;
    }

    let mut indices: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    let mean = indices.iter().sum::<f64>() / period as f64;
    match mode {
        DecompositionMode::Additive => {
            for index in &mut indices {
                *index -= mean;
            }
        }
        DecompositionMode::Multiplicative => {
            if mean.abs() > f64::EPSILON {
                for index in &mut indices {
                    *index /= mean;
                }
            } else {
                indices = vec![1.0; period];
            }
        }
    }

    indices
}

/// Pearson correlation coefficient; 0.0 when either input is degenerate.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        cov += (x - x_mean) * (y - y_mean);
        x_var += (x - x_mean).powi(2);
        y_var += (y - y_mean).powi(2);
    }

    let denom = (x_var * y_var).sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }
    cov / denom
}
