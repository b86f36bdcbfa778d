//! Parser Service - Transforms raw INE extracts into processed regional tables
//!
//! Responsibilities:
//! - Read the raw extract written by the collector
//! - Split each series label into region and category fields (per-dataset rules)
//! - Canonicalize community names, dropping the nationwide aggregate
//! - Collapse quarterly employment rates into annual means
//! - Write the processed CSV, sorted by (year, region, categories)
//!
//! CRITICAL: This service must be DETERMINISTIC
//! Same raw extract = byte-identical processed CSV
//!
//! Usage:
//!   cargo run --bin parser
//!   cargo run --bin parser -- salaries employment

mod labels;
mod pipeline;
mod quarter;
mod region;

use anyhow::{Context, Result};
use catalog::{Config, Dataset};
use clap::Parser;
use tokio::fs;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "parser", about = "Parses raw INE extracts into processed tables")]
struct Args {
    /// Datasets to process (all of them when omitted)
    #[arg(value_enum)]
    datasets: Vec<Dataset>,

    /// Dry run - process and report without writing the output
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

/// Process one dataset's raw extract, returning the number of output rows
async fn process(config: &Config, dataset: Dataset, dry_run: bool) -> Result<usize> {
    let input = config.raw_path(dataset);
    let output = config.processed_path(dataset);
    info!("[{}] {}", dataset, dataset.title());
    info!("  Input file: {}", input.display());

    let (rows, report, csv) = pipeline::process_file(dataset, &input).await?;

    info!("  Loaded {} records", report.input_rows);
    info!(
        "  Dropped: {} unparseable label(s), {} invalid year(s), {} missing quarter(s), {} national total",
        report.unparseable_labels,
        report.invalid_years,
        report.missing_quarters,
        report.national_total_rows
    );
    if !report.unmapped_regions.is_empty() {
        warn!(
            "  {} community name(s) kept unmapped: {:?}",
            report.unmapped_regions.len(),
            report.unmapped_regions
        );
    }
    if report.partial_years > 0 {
        info!("  {} annual mean(s) over fewer than 4 quarters", report.partial_years);
    }
    if rows.is_empty() {
        warn!("  No rows survived processing - output will only hold the header");
    }

    // Print sample rows
    for (i, row) in rows.iter().take(3).enumerate() {
        info!(
            "  [{}] {} | {} | {} | {}",
            i + 1,
            row.year,
            row.region,
            row.categories.join(" | "),
            row.value
        );
    }
    if rows.len() > 3 {
        info!("  ... and {} more", rows.len() - 3);
    }

    if dry_run {
        info!("  Dry run - output not written");
        return Ok(report.output_rows);
    }

    fs::create_dir_all(&config.processed_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.processed_dir.display()))?;
    fs::write(&output, csv)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("  Output file: {}", output.display());

    Ok(report.output_rows)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    catalog::init_logging();
    let args = Args::parse();
    let config = Config::from_env()?;

    info!("=== INE Parser ===");
    info!("Mode: {}", if args.dry_run { "dry-run" } else { "live" });

    let datasets = if args.datasets.is_empty() {
        Dataset::ALL.to_vec()
    } else {
        args.datasets
    };

    let mut processed = 0;
    let mut failed = 0;

    for dataset in datasets {
        match process(&config, dataset, args.dry_run).await {
            Ok(rows) => {
                info!("  ✓ Processed {} ({} rows)", dataset, rows);
                processed += 1;
            }
            Err(e) => {
                error!("  ✗ Failed {}: {:#}", dataset, e);
                failed += 1;
            }
        }
    }

    info!("=== Parsing Summary ===");
    info!("Processed: {}", processed);
    info!("Failed: {}", failed);

    if failed > 0 {
        anyhow::bail!("{} dataset(s) failed", failed);
    }

    Ok(())
}
