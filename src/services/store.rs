//! Cleaned-dataset store
//!
//! Owns the `cleaned_<source>.csv` contract: market series persist as
//! `Date,Open,High,Low,Close,Volume`, the FX series as `Date,fx_rate`.
//! Undefined prices round-trip as empty cells.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::constants::{cleaned_filename, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::models::{CleanedSeries, DailyBar, MarketSeries, RatePoint, RateSeries};

/// Write one cleaned series into `out_dir`, returning the file path.
pub fn write_cleaned(series: &CleanedSeries, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| Error::Io(format!("Failed to create {}: {}", out_dir.display(), e)))?;

    let path = out_dir.join(cleaned_filename(series.source()));
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    match series {
        CleanedSeries::Market(market) => {
            writer.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
            for bar in &market.bars {
                writer.write_record([
                    bar.date.format(DATE_FORMAT).to_string(),
                    format_cell(bar.open),
                    format_cell(bar.high),
                    format_cell(bar.low),
                    format_cell(bar.close),
                    bar.volume.to_string(),
                ])?;
            }
        }
        CleanedSeries::Rate(rates) => {
            writer.write_record(["Date", "fx_rate"])?;
            for point in &rates.points {
                writer.write_record([
                    point.date.format(DATE_FORMAT).to_string(),
                    format_cell(point.rate),
                ])?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| Error::Io(format!("Failed to flush {}: {}", path.display(), e)))?;

    Ok(path)
}

/// Read a persisted cleaned market series back from `path`.
pub fn read_cleaned_market(source: &str, path: &Path) -> Result<MarketSeries> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut bars = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;

        let date = parse_date(record.get(0).unwrap_or(""), path)?;
        bars.push(DailyBar::new(
            date,
            parse_cell(record.get(1), path)?,
            parse_cell(record.get(2), path)?,
            parse_cell(record.get(3), path)?,
            parse_cell(record.get(4), path)?,
            record
                .get(5)
                .unwrap_or("0")
                .trim()
                .parse::<u64>()
                .unwrap_or(0),
        ));
    }

    Ok(MarketSeries::new(source.to_string(), bars))
}

/// Read the persisted cleaned FX series back from `path`.
pub fn read_cleaned_rates(source: &str, path: &Path) -> Result<RateSeries> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut points = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;

        let date = parse_date(record.get(0).unwrap_or(""), path)?;
        points.push(RatePoint::new(date, parse_cell(record.get(1), path)?));
    }

    Ok(RateSeries::new(source.to_string(), points))
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn parse_cell(cell: Option<&str>, path: &Path) -> Result<Option<f64>> {
    let cell = cell.unwrap_or("").trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some).map_err(|_| {
        Error::Parse(format!("{}: bad numeric cell '{}'", path.display(), cell))
    })
}

fn parse_date(cell: &str, path: &Path) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT)
        .map_err(|_| Error::Parse(format!("{}: bad date '{}'", path.display(), cell)))
}
