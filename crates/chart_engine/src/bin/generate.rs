use anyhow::{Context, Result};
use chart_engine::weekly_chart_points;
use models::{Record, RecordsResponse};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let records = env::args()
        .position(|a| a == "--records")
        .and_then(|i| env::args().nth(i + 1))
        .unwrap_or("records.json".to_string());
    let currency = env::args()
        .position(|a| a == "--currency")
        .and_then(|i| env::args().nth(i + 1));
    let month = env::args()
        .position(|a| a == "--month")
        .and_then(|i| env::args().nth(i + 1));
    let out = env::args()
        .position(|a| a == "--out")
        .and_then(|i| env::args().nth(i + 1))
        .unwrap_or("chart.json".to_string());

    let records_path = PathBuf::from(&records);
    let out_path = PathBuf::from(&out);

    println!(
        "Generating weekly chart...\n  records : {}\n  currency: {}\n  month   : {}\n  output  : {}",
        records_path.display(),
        currency.as_deref().unwrap_or("(all)"),
        month.as_deref().unwrap_or("(all)"),
        out_path.display()
    );

    let raw = fs::read_to_string(&records_path)
        .with_context(|| format!("Reading records file: {}", records_path.display()))?;
    let records = load_records(&raw)
        .with_context(|| format!("Parsing records JSON in {}", records_path.display()))?;

    let points = weekly_chart_points(&records, currency.as_deref(), month.as_deref());

    let json = serde_json::to_string_pretty(&points).context("Serializing chart points")?;
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory: {}", parent.display()))?;
        }
    }
    fs::write(&out_path, json)
        .with_context(|| format!("Writing chart points to {}", out_path.display()))?;

    println!("Done. {} weekly points written.", points.len());
    Ok(())
}

/// Accepts either a bare JSON array of records or a full backend response
/// (`{ success, income: [...] }`).
fn load_records(raw: &str) -> Result<Vec<Record>> {
    if let Ok(records) = serde_json::from_str::<Vec<Record>>(raw) {
        return Ok(records);
    }
    let response: RecordsResponse = serde_json::from_str(raw)?;
    Ok(response.records)
}
