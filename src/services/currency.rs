//! Currency Converter
//!
//! Scales the OHLC columns of a cleaned market series into the base
//! currency using the cleaned FX-rate table. The join is an exact-date
//! left join followed by a forward fill along the target series: a date
//! with no matching FX observation reuses the rate from the last target
//! date that had one. Rates are never filled backward, so dates before
//! the first FX observation convert to undefined prices.

use tracing::info;

use crate::models::{MarketSeries, RateSeries};

/// Convert a market series into the base currency in place.
/// Volume is unaffected.
pub fn convert_to_base(series: &mut MarketSeries, rates: &RateSeries, base_currency: &str) {
    let mut last_rate: Option<f64> = None;
    let mut undefined = 0usize;

    for bar in &mut series.bars {
        if let Some(rate) = rates.rate_on(bar.date) {
            last_rate = Some(rate);
        }

        match last_rate {
            Some(rate) => {
                bar.open = bar.open.map(|v| v * rate);
                bar.high = bar.high.map(|v| v * rate);
                bar.low = bar.low.map(|v| v * rate);
                bar.close = bar.close.map(|v| v * rate);
            }
            None => {
                bar.open = None;
                bar.high = None;
                bar.low = None;
                bar.close = None;
                undefined += 1;
            }
        }
    }

    info!(
        source = %series.source,
        base_currency,
        rows = series.len(),
        undefined,
        "Converted dataset to base currency"
    );
}
