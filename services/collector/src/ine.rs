//! INE `DATOS_TABLA` client and series flattening
//!
//! A table arrives as a JSON array of series:
//!   `[{"COD": "...", "Nombre": "...", "Data": [{"Anyo": 2023, "NombrePeriodo": "2023", "Periodo": {...}, "Valor": 1.0}]}]`
//! Each kept series is flattened into one raw row per data point with a value.

use anyhow::{Context, Result};
use catalog::{Dataset, RawRow, YearField};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// One published series
#[derive(Debug, Deserialize)]
pub struct Series {
    #[serde(rename = "COD", default = "unknown")]
    pub code: String,
    #[serde(rename = "Nombre", default = "unknown")]
    pub name: String,
    /// Kept loosely typed: entries that are not objects are skipped
    #[serde(rename = "Data", default)]
    pub data: Vec<Value>,
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// One observation of a series
#[derive(Debug, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "Anyo", default)]
    pub year: Option<Value>,
    #[serde(rename = "NombrePeriodo", default)]
    pub period_name: Option<Value>,
    /// Quarter descriptor `{Codigo, Nombre, ...}` on quarterly tables
    #[serde(rename = "Periodo", default)]
    pub period: Option<Value>,
    #[serde(rename = "Valor", default)]
    pub value: Option<f64>,
}

/// Rows produced from one table, plus per-series bookkeeping
#[derive(Debug, Default)]
pub struct Flattened {
    pub rows: Vec<RawRow>,
    pub kept_series: usize,
    pub skipped_series: usize,
}

/// Fetched table body together with its digest
pub struct Fetched {
    pub series: Vec<Series>,
    pub content_hash: String,
    pub size_bytes: usize,
}

/// Fetch and decode one table. Single attempt; the client's timeout applies.
pub async fn fetch_table(client: &reqwest::Client, url: &str) -> Result<Fetched> {
    info!("Fetching: {}", url);
    let resp = client
        .get(url)
        .send()
        .await
        .context("HTTP request failed")?
        .error_for_status()
        .context("HTTP request failed")?;

    let bytes = resp.bytes().await.context("Failed to read response body")?;
    let content_hash = content_hash(&bytes);

    let series = decode_table(&bytes)?;

    Ok(Fetched {
        series,
        content_hash,
        size_bytes: bytes.len(),
    })
}

/// Decode a `DATOS_TABLA` body into its series
pub fn decode_table(bytes: &[u8]) -> Result<Vec<Series>> {
    serde_json::from_slice(bytes).context("Failed to parse JSON response")
}

pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Render a JSON scalar the way it should appear in a CSV cell
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Keep the series the dataset's filter accepts and emit one row per non-null value
pub fn flatten_series(dataset: Dataset, series: &[Series]) -> Flattened {
    let mut out = Flattened::default();

    for s in series {
        if !dataset.keeps_series(&s.name) {
            debug!("Skipping series: {} ({})", s.name, s.code);
            out.skipped_series += 1;
            continue;
        }
        debug!("Processing series: {} ({})", s.name, s.code);
        out.kept_series += 1;

        for entry in &s.data {
            if !entry.is_object() {
                continue;
            }
            let point: DataPoint = match serde_json::from_value(entry.clone()) {
                Ok(p) => p,
                Err(e) => {
                    debug!("Skipping malformed data point in {}: {}", s.code, e);
                    continue;
                }
            };
            // Null means "no data for this period"
            let Some(value) = point.value else {
                continue;
            };

            let year_cell = match dataset.year_field() {
                YearField::PeriodName => point.period_name.as_ref(),
                YearField::Year => point.year.as_ref(),
            };

            let (quarter, period) = if dataset.is_quarterly() {
                (
                    point.period.as_ref().map(|p| p.to_string()),
                    point.period_name.as_ref().map(cell_text),
                )
            } else {
                (None, None)
            };

            out.rows.push(RawRow {
                series_id: s.code.clone(),
                series_name: s.name.clone(),
                year: year_cell.map(cell_text).unwrap_or_default(),
                quarter,
                period,
                value,
            });
        }
    }

    out
}

/// Flatten and fail when the filter left nothing to write
pub fn extract_rows(dataset: Dataset, series: &[Series]) -> Result<Flattened> {
    let flat = flatten_series(dataset, series);
    if flat.rows.is_empty() {
        anyhow::bail!(
            "No data found in the response ({} series, {} kept)",
            series.len(),
            flat.kept_series
        );
    }
    Ok(flat)
}
