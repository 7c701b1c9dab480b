use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DailyBar, RatePoint};

/// Cleaned daily series for one market source.
///
/// Invariants maintained by the normalizer: dates strictly increasing,
/// no duplicates, none past the cutoff date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    /// Source name (e.g. "nasdaq", "sensex")
    pub source: String,

    /// Bars sorted ascending by date
    pub bars: Vec<DailyBar>,
}

impl MarketSeries {
    pub fn new(source: String, bars: Vec<DailyBar>) -> Self {
        Self { source, bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Set of observation dates, used for calendar intersection.
    pub fn date_set(&self) -> BTreeSet<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Reindex onto `calendar`, forward-filling dates that have no direct
    /// observation. Calendar dates before the first bar produce bars with
    /// undefined prices and zero volume. Reindexing onto the series' own
    /// date index is a no-op.
    pub fn reindex(&self, calendar: &[NaiveDate]) -> MarketSeries {
        let mut bars = Vec::with_capacity(calendar.len());
        let mut cursor = 0usize;
        let mut last: Option<&DailyBar> = None;

        for &date in calendar {
            while cursor < self.bars.len() && self.bars[cursor].date <= date {
                last = Some(&self.bars[cursor]);
                cursor += 1;
            }
            match last {
                Some(bar) => bars.push(DailyBar { date, ..bar.clone() }),
                None => bars.push(DailyBar::new(date, None, None, None, None, 0)),
            }
        }

        MarketSeries::new(self.source.clone(), bars)
    }
}

/// Cleaned FX-rate series: single rate column derived from the raw Close.
///
/// Used as a lookup table by the currency converter; never itself
/// currency-converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    pub source: String,

    /// Points sorted ascending by date
    pub points: Vec<RatePoint>,
}

impl RateSeries {
    pub fn new(source: String, points: Vec<RatePoint>) -> Self {
        Self { source, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_set(&self) -> BTreeSet<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Fill undefined rates from the previous defined one. Leading
    /// undefined rates stay undefined (no backward fill).
    pub fn forward_fill(&mut self) {
        let mut last: Option<f64> = None;
        for point in &mut self.points {
            match point.rate {
                Some(rate) => last = Some(rate),
                None => point.rate = last,
            }
        }
    }

    /// Exact-date lookup. Returns `None` both for dates not present and
    /// for present dates whose rate is still undefined.
    pub fn rate_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|idx| self.points[idx].rate)
    }

    /// Reindex onto `calendar` with forward-fill, mirroring
    /// [`MarketSeries::reindex`].
    pub fn reindex(&self, calendar: &[NaiveDate]) -> RateSeries {
        let mut points = Vec::with_capacity(calendar.len());
        let mut cursor = 0usize;
        let mut last: Option<&RatePoint> = None;

        for &date in calendar {
            while cursor < self.points.len() && self.points[cursor].date <= date {
                last = Some(&self.points[cursor]);
                cursor += 1;
            }
            match last {
                Some(point) => points.push(RatePoint { date, ..*point }),
                None => points.push(RatePoint::new(date, None)),
            }
        }

        RateSeries::new(self.source.clone(), points)
    }
}

/// Uniform shape the aligner and the writer operate on. The FX source is
/// the single `Rate` member of a run; all price sources are `Market`.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanedSeries {
    Market(MarketSeries),
    Rate(RateSeries),
}

impl CleanedSeries {
    pub fn source(&self) -> &str {
        match self {
            CleanedSeries::Market(s) => &s.source,
            CleanedSeries::Rate(s) => &s.source,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CleanedSeries::Market(s) => s.len(),
            CleanedSeries::Rate(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn date_set(&self) -> BTreeSet<NaiveDate> {
        match self {
            CleanedSeries::Market(s) => s.date_set(),
            CleanedSeries::Rate(s) => s.date_set(),
        }
    }

    pub fn reindex(&self, calendar: &[NaiveDate]) -> CleanedSeries {
        match self {
            CleanedSeries::Market(s) => CleanedSeries::Market(s.reindex(calendar)),
            CleanedSeries::Rate(s) => CleanedSeries::Rate(s.reindex(calendar)),
        }
    }
}
