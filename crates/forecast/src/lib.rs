//! Shapes the forecasting service's prediction payload for display.
//!
//! The service answers `POST /predict` with a bare JSON array of
//! `[date, rate]` rows. This crate turns that into labelled points for the
//! 7-day chart, extracts today's rate, and converts amounts at that rate.
//! Malformed rows are dropped rather than reported.

use chrono::{DateTime, NaiveDate};
use models::ForecastPoint;
use serde_json::Value;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

/// Builds the currency-pair key the prediction service expects, e.g.
/// `pair("GBP", "USD")` is `"GBP_USD"`.
pub fn pair(base: &str, quote: &str) -> String {
    format!("{}_{}", base, quote)
}

/// Converts the raw prediction array into chart-ready points.
///
/// Each well-formed `[date, rate]` row yields one point with a `dd/mm`
/// label and the rate rounded to 4 decimals. Rows that are not two-element
/// arrays, carry an unreadable date, or a non-numeric rate are skipped.
pub fn parse_prediction(payload: &Value) -> Vec<ForecastPoint> {
    let Some(rows) = payload.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let row = row.as_array()?;
            let date = parse_forecast_date(row.first()?)?;
            let rate = rate_value(row.get(1)?)?;
            Some(ForecastPoint {
                label: date.format("%d/%m").to_string(),
                rate: round4(rate),
            })
        })
        .collect()
}

/// Today's rate is the first forecast point.
pub fn today_rate(points: &[ForecastPoint]) -> Option<f64> {
    points.first().map(|p| p.rate)
}

/// Converts `amount` at `rate`, rounded to 2 decimals for display.
pub fn convert(amount: f64, rate: f64) -> f64 {
    round2(amount * rate)
}

/// The service has emitted plain dates, RFC 3339/2822 timestamps, and
/// epoch milliseconds at various points; accept all of them.
fn parse_forecast_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let day = s.get(..10).unwrap_or(s);
            if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                return Some(date);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.date_naive());
            }
            if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
                return Some(dt.date_naive());
            }
            None
        }
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

fn rate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
