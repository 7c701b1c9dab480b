//! Pipeline constants
//!
//! Fixed reference dates, CSV column names and indicator windows shared
//! across the cleaning and feature-engineering stages.

use chrono::NaiveDate;

/// Upper bound on accepted observation dates (end of the data collection
/// window). Rows normalizing past this date are dropped so repeated runs
/// over the same raw files produce identical outputs.
pub const CUTOFF_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 2, 7) {
    Some(d) => d,
    None => panic!("invalid cutoff date"),
};

/// Source name of the FX-rate dataset. It is cleaned with a reduced shape
/// (single rate column) and is never itself currency-converted.
pub const FX_SOURCE: &str = "fx_rates";

/// Raw CSV column names, looked up by header rather than position.
pub mod column {
    pub const DATE: &str = "Date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";
}

/// Output filename for a cleaned, aligned dataset.
pub fn cleaned_filename(source: &str) -> String {
    format!("cleaned_{}.csv", source)
}

/// Output filename for the merged feature dataset.
pub const FINAL_DATASET_FILE: &str = "final_dataset.csv";

/// Date format used in persisted CSV files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Indicator windows (feature-engineering stage)
pub const MA_SHORT_WINDOW: usize = 50;
pub const MA_LONG_WINDOW: usize = 200;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;
pub const VOLATILITY_WINDOW: usize = 20;
pub const RSI_WINDOW: usize = 14;
pub const EMA_FAST_SPAN: usize = 12;
pub const EMA_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;
pub const CORRELATION_WINDOW: usize = 30;
