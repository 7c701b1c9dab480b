mod daily_bar;
mod pipeline_config;
mod series;
pub mod indicators;

pub use daily_bar::{DailyBar, RatePoint};
pub use pipeline_config::PipelineConfig;
pub use series::{CleanedSeries, MarketSeries, RateSeries};

use std::collections::BTreeMap;

/// Working collection of cleaned series for one run, keyed by source name.
/// BTreeMap keeps iteration (and therefore logging and output order)
/// deterministic.
pub type PanelData = BTreeMap<String, CleanedSeries>;
