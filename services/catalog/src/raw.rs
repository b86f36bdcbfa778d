//! Raw extract schema: one row per (series, period) with a non-null value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::warn;

pub const ANNUAL_HEADERS: &[&str] = &["series_id", "series_name", "year", "value"];
pub const QUARTERLY_HEADERS: &[&str] = &["series_id", "series_name", "year", "quarter", "period", "value"];

/// Flattened observation as stored in the raw CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub series_id: String,
    pub series_name: String,
    pub year: String,
    /// Nested `{Codigo, Nombre}` period object, kept as text
    #[serde(default)]
    pub quarter: Option<String>,
    /// Full period label, e.g. `2023T4`
    #[serde(default)]
    pub period: Option<String>,
    pub value: f64,
}

impl RawRow {
    fn to_record(&self, quarterly: bool) -> Vec<String> {
        let mut record = vec![
            self.series_id.clone(),
            self.series_name.clone(),
            self.year.clone(),
        ];
        if quarterly {
            record.push(self.quarter.clone().unwrap_or_default());
            record.push(self.period.clone().unwrap_or_default());
        }
        record.push(self.value.to_string());
        record
    }
}

/// Write rows as a raw CSV; quarterly extracts carry the quarter and period columns
pub fn write_csv<W: Write>(rows: &[RawRow], quarterly: bool, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let headers = if quarterly { QUARTERLY_HEADERS } else { ANNUAL_HEADERS };
    writer.write_record(headers).context("Failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(row.to_record(quarterly))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Read a raw CSV, skipping rows that fail to deserialize (e.g. empty value).
/// Returns the rows and the number of skipped lines.
pub fn read_csv<R: Read>(reader: R) -> Result<(Vec<RawRow>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    reader.headers().context("Failed to read CSV headers")?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (line_idx, result) in reader.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("skipping line {}: {}", line_idx + 2, e);
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, year: &str, value: f64) -> RawRow {
        RawRow {
            series_id: "DIV1".to_string(),
            series_name: name.to_string(),
            year: year.to_string(),
            quarter: None,
            period: None,
            value,
        }
    }

    #[test]
    fn test_annual_csv_has_no_quarter_columns() {
        let mut buf = Vec::new();
        write_csv(&[row("Divorcios. Andalucía. Dato base. Total", "2022", 15000.0)], false, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("series_id,series_name,year,value"));
        assert_eq!(lines.next(), Some("DIV1,Divorcios. Andalucía. Dato base. Total,2022,15000"));
    }

    #[test]
    fn test_labels_with_commas_are_quoted_and_read_back() {
        let original = row("13 Madrid, Comunidad de, 12.3.3 Abandono de familia", "2023", 42.0);
        let mut buf = Vec::new();
        write_csv(std::slice::from_ref(&original), false, &mut buf).unwrap();

        let (rows, skipped) = read_csv(buf.as_slice()).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(rows, vec![original]);
    }

    #[test]
    fn test_quarterly_csv_keeps_quarter_cell() {
        let mut quarterly = row("Tasa de empleo de la población. Hombres. Andalucía. Total. ", "2023", 55.1);
        quarterly.quarter = Some(r#"{"Codigo":"II","Nombre":"T2"}"#.to_string());
        quarterly.period = Some("2023T2".to_string());

        let mut buf = Vec::new();
        write_csv(std::slice::from_ref(&quarterly), true, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("series_id,series_name,year,quarter,period,value\n"));

        let (rows, _) = read_csv(buf.as_slice()).unwrap();
        assert_eq!(rows[0].quarter.as_deref(), Some(r#"{"Codigo":"II","Nombre":"T2"}"#));
        assert_eq!(rows[0].period.as_deref(), Some("2023T2"));
    }

    #[test]
    fn test_read_skips_rows_without_value() {
        let csv = "series_id,series_name,year,value\nA,Andalucía,2020,1.5\nB,Aragón,2020,\n";
        let (rows, skipped) = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(rows[0].quarter, None);
    }
}
