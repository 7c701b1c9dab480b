use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar-day OHLCV observation after cleaning.
///
/// Prices are optional: currency conversion against an undefined FX rate
/// produces an undefined price, which must survive to the CSV output as an
/// empty cell rather than a fabricated number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Calendar date of the observation (normalized, timezone-resolved)
    pub date: NaiveDate,

    /// Opening price
    pub open: Option<f64>,

    /// Highest price
    pub high: Option<f64>,

    /// Lowest price
    pub low: Option<f64>,

    /// Closing price
    pub close: Option<f64>,

    /// Trading volume (missing values coerced to zero)
    pub volume: u64,
}

impl DailyBar {
    pub fn new(
        date: NaiveDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// One calendar-day FX-rate observation.
///
/// The rate stays `None` for dates before the first observation in the raw
/// feed; it is forward-filled, never backward-filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: Option<f64>,
}

impl RatePoint {
    pub fn new(date: NaiveDate, rate: Option<f64>) -> Self {
        Self { date, rate }
    }
}
