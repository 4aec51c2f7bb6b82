use chrono::{DateTime, Duration, TimeZone, Utc};
use demand_forecast::{EngineConfig, ForecastEngine, MovementKind, StockMovement};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    // Create sample data
    println!("Creating sample movement history...");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let movements = create_sample_movements(start, 90);
    println!("Sample data created: {} movements\n", movements.len());

    // Build the engine and refresh product 1
    let engine = ForecastEngine::new(EngineConfig::default())?;
    let end = start + Duration::days(90);
    engine.refresh(1, 1, &movements, (start, end), end)?;
    println!("Engine refreshed for product 1\n");

    // Inspect the seasonal profile
    let profile = engine.get_profile(1)?;
    println!("Seasonal indices ({:?} decomposition):", profile.mode());
    for (position, index) in profile.seasonal().iter().enumerate() {
        println!("  Position {}: {:+.2}", position, index);
    }

    // Inspect the forecast
    let forecast = engine.get_forecast(1)?;
    println!(
        "\n30-day forecast (confidence {:.2}), first week:",
        forecast.confidence()
    );
    for (i, point) in forecast.points().iter().take(7).enumerate() {
        println!(
            "  Day {}: {:.1} units ({:.1}, {:.1})",
            i + 1,
            point.point,
            point.lower,
            point.upper
        );
    }

    // Inspect the reorder recommendation
    let recommendation = engine.get_recommendation(1)?;
    println!(
        "\nReorder at {:.0} units, order {:.0} units (service level {:.0}%)",
        recommendation.reorder_point,
        recommendation.reorder_quantity,
        recommendation.service_level * 100.0
    );

    // Score a suspicious movement against the cached baseline
    let spike = StockMovement {
        id: 9999,
        product_id: 1,
        warehouse_id: 1,
        timestamp: start + Duration::days(60),
        quantity: -500,
        kind: MovementKind::Sale,
    };
    match engine.check_movement(&spike, end)? {
        Some(flag) => println!(
            "\nMovement {} flagged: {} (severity {:.1})",
            flag.movement_id, flag.reason, flag.severity
        ),
        None => println!("\nMovement {} looks normal", spike.id),
    }

    println!("\nForecasting complete!");
    Ok(())
}

/// Daily sales of about 10 units with a +50% spike on Saturdays.
fn create_sample_movements(start: DateTime<Utc>, days: i64) -> Vec<StockMovement> {
    (0..days)
        .map(|day| StockMovement {
            id: day as u64,
            product_id: 1,
            warehouse_id: 1,
            timestamp: start + Duration::days(day),
            quantity: if day % 7 == 5 { -15 } else { -10 },
            kind: MovementKind::Sale,
        })
        .collect()
}
