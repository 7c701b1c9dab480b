//! Raw CSV loading
//!
//! Reads a raw per-source CSV into typed rows. Columns are located by
//! header name rather than position since the raw feeds do not agree on
//! column order. Timestamps are interpreted as UTC instants.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::info;

use crate::constants::column;
use crate::error::{Error, Result};

/// One raw observation, not yet normalized to a calendar date.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Timestamp of the observation as a UTC instant
    pub instant: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Raw series as read from disk, in file order.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub source: String,
    pub rows: Vec<RawRow>,
}

/// Read a raw CSV, failing with a schema error if any column in
/// `required` is absent from the header row.
pub fn load_raw_series(source: &str, path: &Path, required: &[&str]) -> Result<RawSeries> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Io(format!("Failed to read headers from {}: {}", path.display(), e)))?;

    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    for &name in required {
        if !index.contains_key(name) {
            return Err(Error::Schema {
                dataset: source.to_string(),
                column: name.to_string(),
            });
        }
    }

    let date_idx = index[column::DATE];
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;

        let timestamp = record.get(date_idx).unwrap_or("");
        let instant = parse_utc_timestamp(timestamp).map_err(|e| {
            Error::Parse(format!("{}: bad timestamp '{}': {}", source, timestamp, e))
        })?;

        rows.push(RawRow {
            instant,
            open: parse_price(&record, &index, column::OPEN, source)?,
            high: parse_price(&record, &index, column::HIGH, source)?,
            low: parse_price(&record, &index, column::LOW, source)?,
            close: parse_price(&record, &index, column::CLOSE, source)?,
            volume: parse_price(&record, &index, column::VOLUME, source)?,
        });
    }

    info!(source, rows = rows.len(), path = %path.display(), "Loaded raw dataset");

    Ok(RawSeries {
        source: source.to_string(),
        rows,
    })
}

/// Parse a numeric cell. An absent column or empty cell is a missing
/// value; anything else must parse as a float.
fn parse_price(
    record: &csv::StringRecord,
    index: &HashMap<String, usize>,
    name: &str,
    source: &str,
) -> Result<Option<f64>> {
    let cell = match index.get(name).and_then(|&i| record.get(i)) {
        Some(cell) => cell.trim(),
        None => return Ok(None),
    };
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::Parse(format!("{}: bad {} value '{}'", source, name, cell)))
}

/// Interpret a raw timestamp as a UTC instant.
///
/// Accepts RFC3339, `YYYY-MM-DD HH:MM:SS` with or without a zone offset
/// (naive timestamps are taken as UTC), and bare `YYYY-MM-DD` dates.
pub fn parse_utc_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }

    Err("unrecognized timestamp format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_utc_timestamp_formats() {
        let rfc = parse_utc_timestamp("2024-01-02T10:30:00+05:30").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-01-02T05:00:00+00:00");

        let offset = parse_utc_timestamp("2024-01-02 10:30:00+05:30").unwrap();
        assert_eq!(offset, rfc);

        let naive = parse_utc_timestamp("2024-01-02 10:30:00").unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-01-02T10:30:00+00:00");

        let bare = parse_utc_timestamp("2024-01-02").unwrap();
        assert_eq!(bare.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        assert!(parse_utc_timestamp("02/01/2024").is_err());
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Open,High,Low,Close,Volume").unwrap();
        writeln!(file, "1,2,0.5,1.5,100").unwrap();

        let err = load_raw_series("nasdaq", file.path(), &[column::DATE]).unwrap_err();
        match err {
            Error::Schema { dataset, column } => {
                assert_eq!(dataset, "nasdaq");
                assert_eq!(column, "Date");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_loads_columns_by_name_in_any_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // The raw feed writes Close before Open
        writeln!(file, "Date,Close,High,Low,Open,Volume").unwrap();
        writeln!(file, "2024-01-02,15.0,16.0,13.0,14.0,1200").unwrap();
        writeln!(file, "2024-01-03,,16.5,13.5,14.5,").unwrap();

        let raw = load_raw_series(
            "nasdaq",
            file.path(),
            &[column::DATE, column::OPEN, column::CLOSE],
        )
        .unwrap();

        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0].open, Some(14.0));
        assert_eq!(raw.rows[0].close, Some(15.0));
        assert_eq!(raw.rows[0].volume, Some(1200.0));
        assert_eq!(raw.rows[1].close, None);
        assert_eq!(raw.rows[1].volume, None);
    }
}
