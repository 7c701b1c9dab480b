//! Cross-Source Aligner
//!
//! Intersects the trading calendars of every cleaned series into the
//! common calendar and reindexes each series onto it, forward-filling any
//! date that lost its direct observation along the way. After alignment
//! every series carries the same date index, so consumers can join
//! positionally or by date with no missing-index risk.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::models::PanelData;

/// Sorted intersection of every series' observation dates.
/// An empty panel or an empty intersection is a fatal alignment error.
pub fn common_calendar(panel: &PanelData) -> Result<Vec<NaiveDate>> {
    let mut iter = panel.values();
    let mut common = match iter.next() {
        Some(series) => series.date_set(),
        None => {
            error!("Alignment failed: no cleaned datasets");
            return Err(Error::Alignment("No cleaned datasets to align".to_string()));
        }
    };

    for series in iter {
        let dates = series.date_set();
        common = common.intersection(&dates).copied().collect();
    }

    if common.is_empty() {
        error!("Alignment failed: no common dates found across datasets");
        return Err(Error::Alignment(
            "No common dates found across datasets".to_string(),
        ));
    }

    let calendar: Vec<NaiveDate> = common.into_iter().collect();
    info!(days = calendar.len(), "Found common trading days");
    Ok(calendar)
}

/// Reindex every series onto `calendar` with forward-fill.
pub fn align(panel: &PanelData, calendar: &[NaiveDate]) -> PanelData {
    panel
        .iter()
        .map(|(name, series)| (name.clone(), series.reindex(calendar)))
        .collect()
}
