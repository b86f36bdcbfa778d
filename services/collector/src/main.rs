//! Collector Service - Downloads INE statistical tables into raw CSV extracts
//!
//! Responsibilities:
//! - Fetch each table from the INE `DATOS_TABLA` endpoint (one attempt, bounded timeout)
//! - Keep only the series the dataset's label filter accepts
//! - Flatten kept series into one row per (series, period) with a value
//! - Write the raw extract consumed by the parser
//!
//! Usage:
//!   # Every dataset:
//!   cargo run --bin collector
//!
//!   # Selected datasets:
//!   cargo run --bin collector -- crimes employment

mod ine;

use anyhow::{Context, Result};
use catalog::{raw, Config, Dataset};
use clap::Parser;
use std::collections::BTreeSet;
use tokio::fs;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "collector", about = "Downloads INE tables into raw CSV extracts")]
struct Args {
    /// Datasets to collect (all of them when omitted)
    #[arg(value_enum)]
    datasets: Vec<Dataset>,

    /// Dry run - fetch and report without writing the extract
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

/// Fetch one dataset and write its raw extract, returning the row count
async fn collect(
    client: &reqwest::Client,
    config: &Config,
    dataset: Dataset,
    dry_run: bool,
) -> Result<usize> {
    info!("[{}] {}", dataset, dataset.title());

    let url = dataset.api_url(&config.api_base);
    let fetched = ine::fetch_table(client, &url).await?;
    info!(
        "  Downloaded: {} bytes, {} series",
        fetched.size_bytes,
        fetched.series.len()
    );
    info!("  Hash: {}", fetched.content_hash);

    let flat = ine::extract_rows(dataset, &fetched.series)?;
    info!(
        "  Kept {} series, skipped {}",
        flat.kept_series, flat.skipped_series
    );

    let series_ids: BTreeSet<&str> = flat.rows.iter().map(|r| r.series_id.as_str()).collect();
    let years: BTreeSet<&str> = flat.rows.iter().map(|r| r.year.as_str()).collect();
    info!("  Total records: {}", flat.rows.len());
    info!("  Series count: {}", series_ids.len());
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        info!("  Years: {} to {}", first, last);
    }

    if dry_run {
        info!("  Dry run - extract not written");
        return Ok(flat.rows.len());
    }

    let mut buf = Vec::new();
    raw::write_csv(&flat.rows, dataset.is_quarterly(), &mut buf)?;

    fs::create_dir_all(&config.extraction_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.extraction_dir.display()))?;
    let path = config.raw_path(dataset);
    fs::write(&path, buf)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("  Data saved to: {}", path.display());

    Ok(flat.rows.len())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    catalog::init_logging();
    let args = Args::parse();
    let config = Config::from_env()?;

    info!("=== INE Collector ===");
    info!("Output: {}", config.extraction_dir.display());

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent("ine-ccaa-etl/0.1")
        .build()?;

    let datasets = if args.datasets.is_empty() {
        Dataset::ALL.to_vec()
    } else {
        args.datasets
    };

    let mut collected = 0;
    let mut failed = 0;

    for dataset in datasets {
        match collect(&client, &config, dataset, args.dry_run).await {
            Ok(rows) => {
                info!("  ✓ Collected {} ({} rows)", dataset, rows);
                collected += 1;
            }
            Err(e) => {
                error!("  ✗ Failed {}: {:#}", dataset, e);
                failed += 1;
            }
        }
    }

    info!("=== Collection Summary ===");
    info!("Collected: {}", collected);
    info!("Failed: {}", failed);

    if failed > 0 {
        warn!("Data download failed for {} dataset(s)", failed);
        anyhow::bail!("{} dataset(s) failed", failed);
    }

    Ok(())
}
