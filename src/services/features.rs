//! Feature Builder
//!
//! Merges the aligned cleaned datasets into one panel keyed on the
//! primary series and derives the technical indicator columns consumed by
//! the forecasting stage. Relies on the aligner's guarantee that every
//! cleaned CSV carries an identical date index; a mismatch is rejected
//! rather than silently re-aligned. Indicator warm-up rows are left empty
//! so no future value leaks into earlier rows.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::constants::{
    cleaned_filename, BOLLINGER_WIDTH, BOLLINGER_WINDOW, CORRELATION_WINDOW, DATE_FORMAT,
    EMA_FAST_SPAN, EMA_SLOW_SPAN, FX_SOURCE, MACD_SIGNAL_SPAN, MA_LONG_WINDOW, MA_SHORT_WINDOW,
    RSI_WINDOW, VOLATILITY_WINDOW,
};
use crate::error::{Error, Result};
use crate::models::indicators::{ema, obv, pct_change, rolling_corr, rolling_mean, rolling_std, rsi};
use crate::models::{MarketSeries, RateSeries};
use crate::services::store;

/// Summary of one feature-building run.
#[derive(Debug)]
pub struct FeatureStats {
    pub rows: usize,
    pub columns: usize,
    pub sources: usize,
}

/// Build `final_dataset.csv` from the cleaned CSVs in `processed_dir`.
pub fn build_features(processed_dir: &Path, primary: &str, out_path: &Path) -> Result<FeatureStats> {
    let sources = discover_sources(processed_dir)?;
    if !sources.iter().any(|s| s == primary) {
        return Err(Error::InvalidInput(format!(
            "Primary dataset '{}' not found in {}",
            primary,
            processed_dir.display()
        )));
    }

    let mut markets: BTreeMap<String, MarketSeries> = BTreeMap::new();
    let mut fx: Option<RateSeries> = None;

    for source in &sources {
        let path = processed_dir.join(cleaned_filename(source));
        if source == FX_SOURCE {
            fx = Some(store::read_cleaned_rates(source, &path)?);
        } else {
            markets.insert(source.clone(), store::read_cleaned_market(source, &path)?);
        }
    }

    let primary_series = &markets[primary];
    let dates: Vec<NaiveDate> = primary_series.bars.iter().map(|b| b.date).collect();
    verify_aligned(&dates, &markets, fx.as_ref())?;

    let closes: Vec<Option<f64>> = primary_series.bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = primary_series.bars.iter().map(|b| b.volume).collect();

    // Secondary market closes, keyed by source, in sorted order
    let others: Vec<(&String, Vec<Option<f64>>)> = markets
        .iter()
        .filter(|(name, _)| name.as_str() != primary)
        .map(|(name, series)| (name, series.bars.iter().map(|b| b.close).collect()))
        .collect();

    let ma50 = rolling_mean(&closes, MA_SHORT_WINDOW, 1);
    let ma200 = rolling_mean(&closes, MA_LONG_WINDOW, 1);
    let return_1d = pct_change(&closes, 1);
    let return_5d = pct_change(&closes, 5);
    let return_10d = pct_change(&closes, 10);

    let bb_mean = rolling_mean(&closes, BOLLINGER_WINDOW, 1);
    let bb_std = rolling_std(&closes, BOLLINGER_WINDOW, 1);
    let bb_upper: Vec<Option<f64>> = band(&bb_mean, &bb_std, BOLLINGER_WIDTH);
    let bb_lower: Vec<Option<f64>> = band(&bb_mean, &bb_std, -BOLLINGER_WIDTH);

    let volatility_20 = rolling_std(&closes, VOLATILITY_WINDOW, 1);
    let rsi_14 = rsi(&closes, RSI_WINDOW);
    let ema_12 = ema(&closes, EMA_FAST_SPAN);
    let ema_26 = ema(&closes, EMA_SLOW_SPAN);
    let macd: Vec<Option<f64>> = ema_12
        .iter()
        .zip(ema_26.iter())
        .map(|(fast, slow)| match (fast, slow) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let macd_signal = ema(&macd, MACD_SIGNAL_SPAN);
    let obv_col = obv(&closes, &volumes);

    let correlations: Vec<(&String, Vec<Option<f64>>)> = others
        .iter()
        .map(|(name, series)| (*name, rolling_corr(&closes, series, CORRELATION_WINDOW)))
        .collect();

    // Assemble and write
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    let mut writer = csv::Writer::from_path(out_path)
        .map_err(|e| Error::Io(format!("Failed to write {}: {}", out_path.display(), e)))?;

    let mut header: Vec<String> = vec![
        "Date".into(),
        "Open".into(),
        "High".into(),
        "Low".into(),
        "Close".into(),
        "Volume".into(),
    ];
    for (name, _) in &others {
        header.push(format!("close_{}", name));
    }
    if fx.is_some() {
        header.push("fx_rate".into());
    }
    header.extend(
        [
            "ma50",
            "ma200",
            "return_1d",
            "return_5d",
            "return_10d",
            "bb_upper",
            "bb_lower",
            "volatility_20",
            "rsi_14",
            "ema_12",
            "ema_26",
            "macd",
            "macd_signal",
            "obv",
        ]
        .map(String::from),
    );
    for (name, _) in &correlations {
        header.push(format!("corr_{}_{}", name, CORRELATION_WINDOW));
    }
    writer.write_record(&header)?;

    for (i, bar) in primary_series.bars.iter().enumerate() {
        let mut row: Vec<String> = vec![
            bar.date.format(DATE_FORMAT).to_string(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            bar.volume.to_string(),
        ];
        for (_, series) in &others {
            row.push(cell(series[i]));
        }
        if let Some(rates) = &fx {
            row.push(cell(rates.points[i].rate));
        }
        for column in [
            &ma50,
            &ma200,
            &return_1d,
            &return_5d,
            &return_10d,
            &bb_upper,
            &bb_lower,
            &volatility_20,
            &rsi_14,
            &ema_12,
            &ema_26,
            &macd,
            &macd_signal,
        ] {
            row.push(cell(column[i]));
        }
        row.push(obv_col[i].to_string());
        for (_, series) in &correlations {
            row.push(cell(series[i]));
        }
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .map_err(|e| Error::Io(format!("Failed to flush {}: {}", out_path.display(), e)))?;

    let stats = FeatureStats {
        rows: dates.len(),
        columns: header.len(),
        sources: sources.len(),
    };
    info!(
        rows = stats.rows,
        columns = stats.columns,
        path = %out_path.display(),
        "Feature dataset written"
    );
    Ok(stats)
}

/// Source names for every `cleaned_<source>.csv` in `dir`, sorted.
pub fn discover_sources(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", dir.display(), e)))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io(format!("Failed to read entry: {}", e)))?;
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(name) => name,
            None => continue,
        };
        if let Some(stem) = name.strip_prefix("cleaned_").and_then(|s| s.strip_suffix(".csv")) {
            sources.push(stem.to_string());
        }
    }

    if sources.is_empty() {
        return Err(Error::InvalidInput(format!(
            "No cleaned datasets found in {}",
            dir.display()
        )));
    }
    sources.sort();
    Ok(sources)
}

/// The cleaned inputs must share one date index; anything else means the
/// aligner did not produce them.
fn verify_aligned(
    dates: &[NaiveDate],
    markets: &BTreeMap<String, MarketSeries>,
    fx: Option<&RateSeries>,
) -> Result<()> {
    for (name, series) in markets {
        let theirs: Vec<NaiveDate> = series.bars.iter().map(|b| b.date).collect();
        if theirs != dates {
            return Err(Error::InvalidInput(format!(
                "Dataset '{}' is not aligned with the primary date index",
                name
            )));
        }
    }
    if let Some(rates) = fx {
        let theirs: Vec<NaiveDate> = rates.points.iter().map(|p| p.date).collect();
        if theirs != dates {
            return Err(Error::InvalidInput(format!(
                "Dataset '{}' is not aligned with the primary date index",
                FX_SOURCE
            )));
        }
    }
    Ok(())
}

fn band(mean: &[Option<f64>], std: &[Option<f64>], width: f64) -> Vec<Option<f64>> {
    mean.iter()
        .zip(std.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + width * s),
            _ => None,
        })
        .collect()
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}
