//! Raw rows → processed table
//!
//! This module must be DETERMINISTIC: the same raw extract always yields a
//! byte-identical processed CSV (rows sorted by year, region, categories).

use anyhow::{Context, Result};
use catalog::{raw, Dataset, RawRow};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::labels::parse_label;
use crate::quarter::{parse_quarter, Quarter};
use crate::region::{normalize_region, RegionMatch};

/// One output row; `categories` follow [`Dataset::category_columns`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub year: i32,
    pub region: String,
    pub categories: Vec<String>,
    pub value: f64,
}

/// What happened to the input rows of one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub input_rows: usize,
    pub unparseable_labels: usize,
    pub missing_quarters: usize,
    pub invalid_years: usize,
    pub national_total_rows: usize,
    /// Spellings passed through because the canonical table lacks them
    pub unmapped_regions: BTreeSet<String>,
    /// Employment only: (year, region, sex) groups averaged over fewer than 4 quarters
    pub partial_years: usize,
    pub output_rows: usize,
}

/// A parsed row before any annual collapse, with its quarter if quarterly
struct Observation {
    row: ProcessedRow,
    quarter: Option<Quarter>,
}

fn parse_year(cell: &str) -> Option<i32> {
    cell.trim().parse().ok()
}

/// Round to `decimals` places, exact halves going to the even digit (60.125 -> 60.12)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Parse labels, canonicalize regions, collapse quarters (employment) and sort
pub fn process_rows(dataset: Dataset, rows: &[RawRow]) -> (Vec<ProcessedRow>, ProcessReport) {
    let mut report = ProcessReport {
        input_rows: rows.len(),
        ..Default::default()
    };
    let mut observations = Vec::with_capacity(rows.len());

    for raw_row in rows {
        let Some(fields) = parse_label(dataset, &raw_row.series_name) else {
            debug!("Unparseable label: '{}'", raw_row.series_name);
            report.unparseable_labels += 1;
            continue;
        };

        let quarter = if dataset.is_quarterly() {
            let Some(q) = raw_row.quarter.as_deref().and_then(parse_quarter) else {
                warn!("Missing quarter for '{}' ({})", raw_row.series_name, raw_row.year);
                report.missing_quarters += 1;
                continue;
            };
            Some(q)
        } else {
            None
        };

        let Some(year) = parse_year(&raw_row.year) else {
            warn!("Invalid year '{}' for '{}'", raw_row.year, raw_row.series_name);
            report.invalid_years += 1;
            continue;
        };

        let region = match normalize_region(&fields.region) {
            RegionMatch::NationalTotal => {
                report.national_total_rows += 1;
                continue;
            }
            RegionMatch::Unmapped(raw) => {
                report.unmapped_regions.insert(raw.clone());
                raw
            }
            RegionMatch::Canonical(name) => name.to_string(),
        };

        observations.push(Observation {
            row: ProcessedRow {
                year,
                region,
                categories: fields.categories,
                value: raw_row.value,
            },
            quarter,
        });
    }

    let mut processed = if dataset.is_quarterly() {
        annual_mean(observations, &mut report)
    } else {
        observations.into_iter().map(|o| o.row).collect()
    };

    sort_rows(&mut processed);
    report.output_rows = processed.len();
    (processed, report)
}

/// Group quarterly observations by (year, region, categories) and average them.
/// Whatever quarters are present are averaged; nothing is imputed.
fn annual_mean(observations: Vec<Observation>, report: &mut ProcessReport) -> Vec<ProcessedRow> {
    // BTreeMap for deterministic ordering
    // quarters present per group: code -> name
    let mut groups: BTreeMap<(i32, String, Vec<String>), (f64, usize, BTreeMap<String, String>)> =
        BTreeMap::new();

    for obs in observations {
        let key = (obs.row.year, obs.row.region, obs.row.categories);
        let entry = groups.entry(key).or_insert_with(|| (0.0, 0, BTreeMap::new()));
        entry.0 += obs.row.value;
        entry.1 += 1;
        if let Some(q) = obs.quarter {
            entry.2.insert(q.code, q.name);
        }
    }

    groups
        .into_iter()
        .map(|((year, region, categories), (sum, count, quarters))| {
            if quarters.len() < 4 {
                debug!(
                    "{} {} {:?}: averaging {} quarter(s) {:?}",
                    year,
                    region,
                    categories,
                    quarters.len(),
                    quarters.values().collect::<Vec<_>>()
                );
                report.partial_years += 1;
            }
            ProcessedRow {
                year,
                region,
                categories,
                value: round_to(sum / count as f64, 2),
            }
        })
        .collect()
}

/// Sort by (year, region, categories...), value last so ties stay deterministic
pub fn sort_rows(rows: &mut [ProcessedRow]) {
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| a.region.cmp(&b.region))
            .then_with(|| a.categories.cmp(&b.categories))
            .then_with(|| a.value.total_cmp(&b.value))
    });
}

/// Write the processed CSV with the dataset's header row
pub fn write_processed<W: Write>(dataset: Dataset, rows: &[ProcessedRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(dataset.processed_headers())
        .context("Failed to write CSV header")?;

    for row in rows {
        let mut record = Vec::with_capacity(row.categories.len() + 3);
        record.push(row.year.to_string());
        record.push(row.region.clone());
        record.extend(row.categories.iter().cloned());
        record.push(row.value.to_string());
        writer.write_record(&record).context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Read a raw extract from `input`, process it and render the processed CSV.
/// Fails when the extract is missing or holds no rows.
pub async fn process_file(
    dataset: Dataset,
    input: &Path,
) -> Result<(Vec<ProcessedRow>, ProcessReport, Vec<u8>)> {
    let content = fs::read(input).await.with_context(|| {
        format!(
            "Input file not found: {}. Run the collector for '{}' first",
            input.display(),
            dataset
        )
    })?;

    let (raw_rows, skipped) = raw::read_csv(content.as_slice())
        .with_context(|| format!("Failed to read raw extract {}", input.display()))?;
    if skipped > 0 {
        warn!("Skipped {} malformed line(s) in {}", skipped, input.display());
    }
    if raw_rows.is_empty() {
        anyhow::bail!("No rows in raw extract {}", input.display());
    }

    let (rows, report) = process_rows(dataset, &raw_rows);

    let mut buf = Vec::new();
    write_processed(dataset, &rows, &mut buf)?;
    Ok((rows, report, buf))
}
