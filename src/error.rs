//! Error types for the demand_forecast crate

use thiserror::Error;

use crate::movement::ProductId;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Not enough non-zero demand periods to fit anything meaningful
    #[error("insufficient data: {nonzero} non-zero periods, need at least {needed}")]
    InsufficientData { nonzero: usize, needed: usize },

    /// Series too short for seasonal decomposition
    #[error("insufficient history: series has {len} periods, need at least {needed}")]
    InsufficientHistory { len: usize, needed: usize },

    /// Forecasting failed because decomposition failed
    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(#[source] Box<ForecastError>),

    /// Movement does not belong to the baseline it is evaluated against
    #[error("invalid movement: {0}")]
    InvalidMovement(String),

    /// Service level must be a probability strictly between 0 and 1
    #[error("invalid service level {0}: must be strictly between 0 and 1")]
    InvalidServiceLevel(f64),

    /// Lead time reaches beyond the forecast horizon
    #[error("invalid lead time: {lead_time} periods exceeds forecast horizon of {horizon}")]
    InvalidLeadTime { lead_time: usize, horizon: usize },

    /// No cached result exists for the product
    #[error("no forecast computed for product {0}")]
    NotComputed(ProductId),

    /// No baseline series has been computed for the product
    #[error("no baseline series for product {0}")]
    NoBaseline(ProductId),

    /// Error from invalid parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error serializing results
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
