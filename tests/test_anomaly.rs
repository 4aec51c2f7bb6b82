use chrono::{DateTime, Duration, TimeZone, Utc};
use demand_forecast::{
    AnomalyDetector, AnomalyReason, Cadence, DemandSeries, ForecastError, MovementKind,
    SeasonalDecomposer, SeasonalProfile, StockMovement,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn evaluated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap()
}

fn baseline(values: Vec<f64>) -> (DemandSeries, SeasonalProfile) {
    let series = DemandSeries::new(1, start(), Cadence::Daily, values).unwrap();
    let profile = SeasonalDecomposer::new(7).unwrap().decompose(&series).unwrap();
    (series, profile)
}

fn sale(day: i64, quantity: i64) -> StockMovement {
    StockMovement {
        id: 500,
        product_id: 1,
        warehouse_id: 1,
        timestamp: start() + Duration::days(day),
        quantity,
        kind: MovementKind::Sale,
    }
}

fn detector() -> AnomalyDetector {
    AnomalyDetector::new(3.0, 3.0).unwrap()
}

#[test]
fn huge_sale_against_stable_baseline_is_a_quantity_outlier() {
    // Daily demand clustering around 10 +/- 2.
    let values: Vec<f64> = (0..28).map(|i| 8.0 + ((i * 5) % 11) as f64 / 2.5).collect();
    let (series, profile) = baseline(values);

    let flag = detector()
        .evaluate(&sale(20, -500), &series, &profile, evaluated_at())
        .unwrap()
        .expect("a 500-unit sale should be flagged");

    assert_eq!(flag.reason, AnomalyReason::QuantityOutlier);
    assert_eq!(flag.reason.to_string(), "quantity outlier");
    assert_eq!(flag.movement_id, 500);
    assert!(flag.severity > 1.0);
    assert_eq!(flag.generated_at, evaluated_at());
}

#[test]
fn movement_matching_expectation_is_never_flagged() {
    let (series, profile) = baseline(vec![10.0; 28]);

    let flag = detector()
        .evaluate(&sale(5, -10), &series, &profile, evaluated_at())
        .unwrap();

    assert!(flag.is_none());
}

#[test]
fn constant_baseline_flags_any_deviation() {
    let (series, profile) = baseline(vec![10.0; 28]);

    let flag = detector()
        .evaluate(&sale(5, -12), &series, &profile, evaluated_at())
        .unwrap()
        .expect("deviation from a constant baseline should be flagged");

    assert_eq!(flag.reason, AnomalyReason::QuantityOutlier);
    assert_eq!(flag.severity, 1.0);
}

#[test]
fn sudden_jump_from_quiet_period_is_a_rate_outlier() {
    // Bursty demand every third day; the seasonal cycle cannot absorb
    // it, so the residual spread is wide and a moderate quantity stays
    // inside the z threshold.
    let values: Vec<f64> = (0..28)
        .map(|i| if i % 3 == 2 { 30.0 } else { 0.0 })
        .collect();
    let (series, profile) = baseline(values);

    // Day 13 saw zero demand; 20 units the next day is a >3x jump.
    let flag = detector()
        .evaluate(&sale(14, -20), &series, &profile, evaluated_at())
        .unwrap()
        .expect("a jump from a quiet period should be flagged");

    assert_eq!(flag.reason, AnomalyReason::RateOfChange);
    assert_eq!(flag.reason.to_string(), "rate-of-change outlier");
    assert!(flag.severity > 1.0);
}

#[test]
fn movement_for_another_product_is_invalid() {
    let (series, profile) = baseline(vec![10.0; 28]);
    let mut movement = sale(5, -10);
    movement.product_id = 2;

    let result = detector().evaluate(&movement, &series, &profile, evaluated_at());

    assert!(matches!(result, Err(ForecastError::InvalidMovement(_))));
}

#[test]
fn timestamps_outside_the_baseline_are_clamped() {
    let values: Vec<f64> = (0..28).map(|i| 8.0 + ((i * 5) % 11) as f64 / 2.5).collect();
    let (series, profile) = baseline(values);

    // Before the series start and beyond its end both evaluate against
    // the nearest observed period instead of failing.
    let before = sale(-10, -500);
    let after = sale(200, -500);

    assert!(detector()
        .evaluate(&before, &series, &profile, evaluated_at())
        .unwrap()
        .is_some());
    assert!(detector()
        .evaluate(&after, &series, &profile, evaluated_at())
        .unwrap()
        .is_some());
}

#[test]
fn invalid_thresholds_are_rejected() {
    assert!(AnomalyDetector::new(0.0, 3.0).is_err());
    assert!(AnomalyDetector::new(3.0, f64::NAN).is_err());
}
