use assert_approx_eq::assert_approx_eq;
use chrono::{DateTime, TimeZone, Utc};
use demand_forecast::{
    Cadence, DecompositionMode, DemandSeries, ForecastError, SeasonalDecomposer,
};

fn start() -> DateTime<Utc> {
    // A Monday, so cycle position 5 is Saturday.
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn series(values: Vec<f64>) -> DemandSeries {
    DemandSeries::new(1, start(), Cadence::Daily, values).unwrap()
}

const WEEK_PATTERN: [f64; 7] = [-2.0, -1.0, 0.0, 1.0, 2.0, 1.0, -1.0];

#[test]
fn additive_reconstruction_matches_observed() {
    let values: Vec<f64> = (0..28)
        .map(|i| 50.0 + 0.5 * i as f64 + WEEK_PATTERN[i % 7])
        .collect();
    let s = series(values.clone());

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    assert_eq!(profile.mode(), DecompositionMode::Additive);
    for (i, &observed) in values.iter().enumerate() {
        assert_approx_eq!(profile.reconstruct(i), observed, 1e-9);
    }
}

#[test]
fn multiplicative_reconstruction_matches_observed() {
    let factors = [0.8, 0.9, 1.0, 1.1, 1.2, 1.0, 1.0];
    let values: Vec<f64> = (0..56).map(|i| (10.0 + i as f64) * factors[i % 7]).collect();
    let s = series(values.clone());

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    assert_eq!(profile.mode(), DecompositionMode::Multiplicative);
    for (i, &observed) in values.iter().enumerate() {
        assert_approx_eq!(profile.reconstruct(i), observed, 1e-9);
    }
}

#[test]
fn constant_amplitude_with_growing_level_stays_additive() {
    let values: Vec<f64> = (0..56)
        .map(|i| 10.0 + i as f64 + WEEK_PATTERN[i % 7])
        .collect();
    let s = series(values);

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    assert_eq!(profile.mode(), DecompositionMode::Additive);
}

#[test]
fn additive_indices_average_to_zero() {
    let values: Vec<f64> = (0..28).map(|i| 20.0 + WEEK_PATTERN[i % 7]).collect();
    let s = series(values);

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    let mean: f64 = profile.seasonal().iter().sum::<f64>() / 7.0;
    assert_approx_eq!(mean, 0.0, 1e-9);
}

#[test]
fn multiplicative_indices_average_to_one() {
    let factors = [0.8, 0.9, 1.0, 1.1, 1.2, 1.0, 1.0];
    let values: Vec<f64> = (0..56).map(|i| (10.0 + i as f64) * factors[i % 7]).collect();
    let s = series(values);

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    assert_eq!(profile.mode(), DecompositionMode::Multiplicative);
    let mean: f64 = profile.seasonal().iter().sum::<f64>() / 7.0;
    assert_approx_eq!(mean, 1.0, 1e-9);
}

#[test]
fn short_history_is_an_error() {
    let s = series(vec![10.0; 13]);

    let result = SeasonalDecomposer::new(7).unwrap().decompose(&s);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistory {
            len: 13,
            needed: 14
        })
    ));
}

#[test]
fn constant_series_has_flat_components() {
    let s = series(vec![10.0; 28]);

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    assert_eq!(profile.mode(), DecompositionMode::Additive);
    assert_approx_eq!(profile.residual_std(), 0.0, 1e-9);
    for i in 0..28 {
        assert_approx_eq!(profile.fitted(i), 10.0, 1e-9);
    }
}

#[test]
fn weekend_spike_shows_up_in_seasonal_component() {
    // 90 days of 10 units/day with a +50% spike every Saturday.
    let values: Vec<f64> = (0..90)
        .map(|i| if i % 7 == 5 { 15.0 } else { 10.0 })
        .collect();
    let s = series(values);

    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&s).unwrap();

    let saturday = profile.seasonal_index(5);
    for position in 0..7 {
        if position != 5 {
            assert!(
                saturday > profile.seasonal_index(position) + 3.0,
                "saturday index {saturday} should dominate position {position}"
            );
        }
    }
}

#[test]
fn period_length_below_two_is_rejected() {
    assert!(SeasonalDecomposer::new(1).is_err());
}
