//! Dataset Normalizer
//!
//! Turns a raw per-source CSV into a cleaned daily series: timestamps
//! resolved to the market's calendar date, rows past the cutoff dropped,
//! duplicate dates collapsed to the last observation, volumes coerced to
//! non-negative integers. The FX source is reduced to a single
//! Close-derived rate column and forward-filled.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::constants::{column, CUTOFF_DATE};
use crate::error::Result;
use crate::models::{DailyBar, MarketSeries, PipelineConfig, RatePoint, RateSeries};
use crate::services::loader;

/// Clean a market (non-FX) dataset into a [`MarketSeries`].
pub fn clean_market_dataset(
    source: &str,
    path: &Path,
    config: &PipelineConfig,
) -> Result<MarketSeries> {
    let raw = loader::load_raw_series(
        source,
        path,
        &[
            column::DATE,
            column::OPEN,
            column::HIGH,
            column::LOW,
            column::CLOSE,
        ],
    )?;

    let tz = config.market_timezone(source);
    let mut deduped: BTreeMap<NaiveDate, DailyBar> = BTreeMap::new();
    let mut duplicates = 0usize;
    let mut past_cutoff = 0usize;

    for row in &raw.rows {
        let date = normalize_date(row.instant, tz);
        if date > CUTOFF_DATE {
            past_cutoff += 1;
            continue;
        }

        let bar = DailyBar::new(
            date,
            row.open,
            row.high,
            row.low,
            row.close,
            coerce_volume(row.volume),
        );
        // Later rows win: keep the last observation per date
        if deduped.insert(date, bar).is_some() {
            duplicates += 1;
        }
    }

    let bars: Vec<DailyBar> = deduped.into_values().collect();
    info!(
        source,
        rows = bars.len(),
        duplicates,
        past_cutoff,
        "Cleaned dataset"
    );

    Ok(MarketSeries::new(source.to_string(), bars))
}

/// Clean the FX dataset into a forward-filled [`RateSeries`]. Volume is
/// ignored and the rate is derived from the Close column.
pub fn clean_fx_dataset(source: &str, path: &Path, config: &PipelineConfig) -> Result<RateSeries> {
    let raw = loader::load_raw_series(source, path, &[column::DATE, column::CLOSE])?;

    let tz = config.market_timezone(source);
    let mut deduped: BTreeMap<NaiveDate, RatePoint> = BTreeMap::new();
    let mut duplicates = 0usize;
    let mut past_cutoff = 0usize;

    for row in &raw.rows {
        let date = normalize_date(row.instant, tz);
        if date > CUTOFF_DATE {
            past_cutoff += 1;
            continue;
        }
        if deduped.insert(date, RatePoint::new(date, row.close)).is_some() {
            duplicates += 1;
        }
    }

    let mut rates = RateSeries::new(source.to_string(), deduped.into_values().collect());
    rates.forward_fill();

    info!(
        source,
        rows = rates.len(),
        duplicates,
        past_cutoff,
        "Loaded FX rates"
    );

    Ok(rates)
}

/// Resolve a UTC instant to the calendar date it fell on in the market's
/// local timezone, or in UTC when no zone is configured.
fn normalize_date(instant: DateTime<Utc>, tz: Option<Tz>) -> NaiveDate {
    match tz {
        Some(tz) => instant.with_timezone(&tz).date_naive(),
        None => instant.date_naive(),
    }
}

/// Missing volume becomes zero; values are truncated to a non-negative
/// integer.
fn coerce_volume(volume: Option<f64>) -> u64 {
    match volume {
        Some(v) if v.is_finite() && v > 0.0 => v as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FX_SOURCE;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_normalize_date_uses_market_local_day() {
        let instant = parse("2024-01-01T23:30:00Z");
        let local = normalize_date(instant, Some(chrono_tz::America::New_York));
        assert_eq!(local, date(2024, 1, 1)); // 18:30 local

        let utc = normalize_date(instant, None);
        assert_eq!(utc, date(2024, 1, 1));

        let after_midnight_utc = parse("2024-01-02T00:15:00Z");
        let local = normalize_date(after_midnight_utc, Some(chrono_tz::America::New_York));
        assert_eq!(local, date(2024, 1, 1)); // 19:15 local, previous day
    }

    fn parse(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_timezone_collapse_keeps_last_observation() {
        // Both instants fall on 2024-01-01 in New York; the later row wins
        let file = write_csv(&[
            "Date,Open,High,Low,Close,Volume",
            "2024-01-01 23:30:00+00:00,10,11,9,10.5,100",
            "2024-01-02 00:15:00+00:00,10.6,11.2,10.0,11.0,200",
        ]);
        let config = PipelineConfig::default();

        let series = clean_market_dataset("nasdaq", file.path(), &config).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].date, date(2024, 1, 1));
        assert_eq!(series.bars[0].close, Some(11.0));
        assert_eq!(series.bars[0].volume, 200);
    }

    #[test]
    fn test_dates_sorted_unique_and_within_cutoff() {
        let file = write_csv(&[
            "Date,Open,High,Low,Close,Volume",
            "2024-01-03,1,1,1,1,10",
            "2024-01-01,1,1,1,1,10",
            "2024-01-02,1,1,1,1,10",
            "2099-01-01,1,1,1,1,10",
        ]);
        let mut config = PipelineConfig::default();
        config.time_zones.clear();

        let series = clean_market_dataset("sensex", file.path(), &config).unwrap();

        let dates: Vec<NaiveDate> = series.bars.iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert!(dates.iter().all(|d| *d <= CUTOFF_DATE));
    }

    #[test]
    fn test_volume_coercion() {
        assert_eq!(coerce_volume(None), 0);
        assert_eq!(coerce_volume(Some(-5.0)), 0);
        assert_eq!(coerce_volume(Some(1234.9)), 1234);
        assert_eq!(coerce_volume(Some(f64::NAN)), 0);
    }

    #[test]
    fn test_fx_dataset_reduced_to_rate_column() {
        let file = write_csv(&[
            "Date,Open,High,Low,Close",
            "2024-01-01,82.9,83.2,82.8,83.0",
            "2024-01-02,83.0,83.4,82.9,",
            "2024-01-03,83.1,83.5,83.0,83.3",
        ]);
        let config = PipelineConfig::default();

        let rates = clean_fx_dataset(FX_SOURCE, file.path(), &config).unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates.points[0].rate, Some(83.0));
        assert_eq!(rates.points[1].rate, Some(83.0)); // forward-filled cell
        assert_eq!(rates.points[2].rate, Some(83.3));
    }
}
