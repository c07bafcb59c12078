//! Automatic ARIMA/SARIMA forecasting of a synthetic monthly series.
//!
//! Run with `cargo run --example auto_forecast`; set `RUST_LOG=tsforecast=debug`
//! to see every candidate the order search scores.

use chrono::{Months, TimeZone, Utc};
use tracing_subscriber::EnvFilter;
use tsforecast::prelude::*;
use tsforecast::seasonality::{decompose, DecompositionModel};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsforecast=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_logging();

    // Trend plus a yearly cycle, sampled monthly.
    let base = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..96u32).map(|i| base + Months::new(i)).collect();
    let values: Vec<f64> = (0..96)
        .map(|i| {
            let t = i as f64;
            let wiggle = ((t * 12.9898).sin() * 43_758.545_3).fract() - 0.5;
            200.0 + 1.5 * t + 20.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin() + 4.0 * wiggle
        })
        .collect();
    let series = Series::new(timestamps, values).expect("valid series");

    println!("{}", "=".repeat(60));
    println!("Series analysis");
    println!("{}", "=".repeat(60));

    let adf = check_stationarity(series.values()).expect("testable series");
    println!(
        "ADF statistic {:.3}, p-value {:.3} -> {}",
        adf.statistic,
        adf.p_value,
        if adf.is_stationary { "stationary" } else { "non-stationary" }
    );

    let period = detect_seasonal_period(series.values());
    println!("Detected seasonal period: {}", period);

    let parts = decompose(series.values(), 12, DecompositionModel::Additive).expect("decomposable");
    println!(
        "Seasonal strength {:.2}, trend strength {:.2}",
        parts.seasonal_strength(),
        parts.trend_strength()
    );

    println!("\n{}", "=".repeat(60));
    println!("ARIMA vs SARIMA");
    println!("{}", "=".repeat(60));

    let engine = CssEngine::new();
    let pipeline = ForecastPipeline::new(&engine).with_config(PipelineConfig::fast());
    let request = ForecastRequest::new(12, ConfidenceLevel::from_fraction(0.9).expect("level"))
        .expect("valid request");

    let comparison = pipeline.compare(&series, &request).expect("at least one family fits");
    for model in &comparison.models {
        let metrics = model.result.metrics();
        println!(
            "{:<28} AIC {:>9.2}  RMSE {:>7.3}  candidates {:>3}",
            model.result.label(),
            metrics.aic,
            metrics.rmse,
            model.search.engine_calls()
        );
    }
    for (family, reason) in &comparison.failures {
        println!("{} failed: {}", family, reason);
    }

    let best = comparison.best();
    println!("\nBest model: {}", best.result.label());
    let diagnostics = best.result.diagnostics();
    println!(
        "Ljung-Box({}) p-value {:.3}",
        diagnostics.ljung_box_lags, diagnostics.ljung_box_pvalue
    );

    println!("\n{:<12} {:>10} {:>10} {:>10}", "date", "forecast", "lower", "upper");
    for point in best.result.record() {
        let label = match point.index {
            ForecastIndex::Timestamp(ts) => ts.format("%Y-%m").to_string(),
            ForecastIndex::Position(i) => i.to_string(),
        };
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2}",
            label, point.forecast, point.lower, point.upper
        );
    }
}
