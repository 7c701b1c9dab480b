//! Pipeline Orchestrator
//!
//! Sequences one cleaning run: FX table first (conversions depend on it),
//! then the remaining sources, then calendar alignment, then persistence.
//! Nothing is written unless alignment succeeded for every source. The
//! orchestrator is the single error boundary: `clean_all` downgrades any
//! internal failure to `false` after logging it, so callers never handle
//! pipeline-internal error types.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::constants::FX_SOURCE;
use crate::error::{Error, Result};
use crate::models::{CleanedSeries, PanelData, PipelineConfig, RateSeries};
use crate::services::{aligner, currency, normalizer, store};

/// Per-run working state. Constructed fresh for every invocation and
/// discarded once outputs are written.
#[derive(Debug, Default)]
pub struct PipelineContext {
    /// Cleaned series keyed by source name
    pub cleaned: PanelData,

    /// Common calendar, set once alignment has run
    pub common_dates: Vec<NaiveDate>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn fx_rates(&self) -> Result<&RateSeries> {
        match self.cleaned.get(FX_SOURCE) {
            Some(CleanedSeries::Rate(rates)) => Ok(rates),
            _ => Err(Error::Config(format!(
                "Currency conversion requires an '{}' dataset",
                FX_SOURCE
            ))),
        }
    }
}

/// One configured cleaning run.
pub struct CleaningPipeline {
    config: PipelineConfig,
    out_dir: PathBuf,
}

impl CleaningPipeline {
    /// Validate the configuration and build a pipeline. Fails before any
    /// file is opened if the configuration is unusable.
    pub fn new(config: PipelineConfig, out_dir: PathBuf) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, out_dir })
    }

    /// Run the full pipeline. Returns `true` on success; any failure has
    /// already been logged with its source context.
    pub fn clean_all(&self) -> bool {
        match self.run() {
            Ok(ctx) => {
                info!(
                    datasets = ctx.cleaned.len(),
                    common_days = ctx.common_dates.len(),
                    "Cleaning pipeline completed"
                );
                true
            }
            Err(e) => {
                error!("Cleaning pipeline failed: {}", e);
                false
            }
        }
    }

    fn run(&self) -> Result<PipelineContext> {
        let mut ctx = PipelineContext::new();

        // FX first: currency conversion reads the cleaned rate table
        if let Some(path) = self.config.datasets.get(FX_SOURCE) {
            let rates = normalizer::clean_fx_dataset(FX_SOURCE, path, &self.config)
                .map_err(|e| log_dataset_failure(FX_SOURCE, e))?;
            ctx.cleaned
                .insert(FX_SOURCE.to_string(), CleanedSeries::Rate(rates));
        }

        for (source, path) in &self.config.datasets {
            if source == FX_SOURCE {
                continue;
            }

            let mut series = normalizer::clean_market_dataset(source, path, &self.config)
                .map_err(|e| log_dataset_failure(source, e))?;
            if self.config.converts_to_base(source) {
                let rates = ctx.fx_rates()?;
                currency::convert_to_base(&mut series, rates, &self.config.base_currency);
            }
            ctx.cleaned.insert(source.clone(), CleanedSeries::Market(series));
        }

        ctx.common_dates = aligner::common_calendar(&ctx.cleaned)?;
        ctx.cleaned = aligner::align(&ctx.cleaned, &ctx.common_dates);

        // Outputs are only written once every source aligned
        for series in ctx.cleaned.values() {
            let path = store::write_cleaned(series, &self.out_dir)?;
            info!(source = series.source(), path = %path.display(), "Saved cleaned dataset");
        }

        Ok(ctx)
    }
}

fn log_dataset_failure(source: &str, e: Error) -> Error {
    error!(source, "Failed processing dataset: {}", e);
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::path::Path;

    fn write_market_csv(dir: &Path, name: &str, days: std::ops::RangeInclusive<u32>, close: f64) {
        let path = dir.join(format!("{}.csv", name));
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
        for day in days {
            writeln!(
                file,
                "2024-01-{:02},{},{},{},{},100",
                day,
                close - 1.0,
                close + 1.0,
                close - 2.0,
                close
            )
            .unwrap();
        }
    }

    fn config_for(dir: &Path, sources: &[&str]) -> PipelineConfig {
        let mut datasets = BTreeMap::new();
        for source in sources {
            datasets.insert(source.to_string(), dir.join(format!("{}.csv", source)));
        }
        PipelineConfig {
            datasets,
            base_currency: "INR".to_string(),
            time_zones: BTreeMap::new(),
            convert_to_base: Vec::new(),
        }
    }

    #[test]
    fn test_empty_config_fails_before_any_io() {
        let config = PipelineConfig {
            datasets: BTreeMap::new(),
            base_currency: "INR".to_string(),
            time_zones: BTreeMap::new(),
            convert_to_base: Vec::new(),
        };
        assert!(matches!(
            CleaningPipeline::new(config, PathBuf::from("unused")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_clean_all_aligns_and_persists() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_market_csv(raw.path(), "alpha", 1..=10, 10.0);
        write_market_csv(raw.path(), "beta", 3..=12, 20.0);

        let config = config_for(raw.path(), &["alpha", "beta"]);
        let pipeline = CleaningPipeline::new(config, out.path().to_path_buf()).unwrap();

        assert!(pipeline.clean_all());

        let alpha = store::read_cleaned_market(
            "alpha",
            &out.path().join("cleaned_alpha.csv"),
        )
        .unwrap();
        let beta = store::read_cleaned_market(
            "beta",
            &out.path().join("cleaned_beta.csv"),
        )
        .unwrap();

        assert_eq!(alpha.len(), 8); // Jan 3 ..= Jan 10
        assert_eq!(alpha.len(), beta.len());
        assert_eq!(alpha.date_set(), beta.date_set());
    }

    #[test]
    fn test_disjoint_calendars_fail_without_partial_output() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_market_csv(raw.path(), "alpha", 1..=5, 10.0);
        write_market_csv(raw.path(), "beta", 10..=12, 20.0);

        let config = config_for(raw.path(), &["alpha", "beta"]);
        let pipeline = CleaningPipeline::new(config, out.path().to_path_buf()).unwrap();

        assert!(!pipeline.clean_all());
        assert!(!out.path().join("cleaned_alpha.csv").exists());
        assert!(!out.path().join("cleaned_beta.csv").exists());
    }

    #[test]
    fn test_missing_raw_file_downgrades_to_failure() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let config = config_for(raw.path(), &["alpha"]);
        let pipeline = CleaningPipeline::new(config, out.path().to_path_buf()).unwrap();

        assert!(!pipeline.clean_all());
    }
}
