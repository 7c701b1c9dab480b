use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::FX_SOURCE;
use crate::error::{Error, Result};
use crate::utils::get_raw_data_dir;

/// Configuration for one cleaning run.
///
/// Validated once at startup via [`PipelineConfig::validate`]; the stages
/// never probe for missing keys mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source name -> raw CSV path
    pub datasets: BTreeMap<String, PathBuf>,

    /// Currency the convertible sources are expressed in after cleaning
    pub base_currency: String,

    /// Source name -> IANA market timezone. Entries are optional per
    /// source; absence means the source's timestamps normalize in UTC.
    #[serde(default)]
    pub time_zones: BTreeMap<String, String>,

    /// Sources whose OHLC columns are converted into the base currency
    #[serde(default)]
    pub convert_to_base: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let raw_dir = get_raw_data_dir();
        let mut datasets = BTreeMap::new();
        for source in [
            "nasdaq",
            "nifty_etf",
            "nifty_index",
            "sensex",
            "sp500",
            FX_SOURCE,
        ] {
            datasets.insert(source.to_string(), raw_dir.join(format!("{}.csv", source)));
        }

        let mut time_zones = BTreeMap::new();
        time_zones.insert("nasdaq".to_string(), "America/New_York".to_string());
        time_zones.insert("sp500".to_string(), "America/New_York".to_string());
        time_zones.insert("nifty_etf".to_string(), "Asia/Kolkata".to_string());
        time_zones.insert("nifty_index".to_string(), "Asia/Kolkata".to_string());
        time_zones.insert("sensex".to_string(), "Asia/Kolkata".to_string());

        Self {
            datasets,
            base_currency: "INR".to_string(),
            time_zones,
            convert_to_base: vec!["nasdaq".to_string(), "sp500".to_string()],
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read config {}: {}", path.display(), e)))?;
        let config: PipelineConfig = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before any file is opened.
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(Error::Config("No datasets configured".to_string()));
        }

        for source in &self.convert_to_base {
            if !self.datasets.contains_key(source) {
                return Err(Error::Config(format!(
                    "convert_to_base names unknown dataset '{}'",
                    source
                )));
            }
        }

        if !self.convert_to_base.is_empty() && !self.datasets.contains_key(FX_SOURCE) {
            return Err(Error::Config(format!(
                "Currency conversion requires an '{}' dataset",
                FX_SOURCE
            )));
        }

        for (source, zone) in &self.time_zones {
            zone.parse::<Tz>().map_err(|_| {
                Error::Config(format!("Invalid timezone '{}' for dataset '{}'", zone, source))
            })?;
        }

        Ok(())
    }

    /// Parsed market timezone for a source, if one is configured.
    /// `validate` guarantees the parse succeeds for configured entries.
    pub fn market_timezone(&self, source: &str) -> Option<Tz> {
        self.time_zones.get(source).and_then(|z| z.parse().ok())
    }

    /// Whether a source's OHLC columns get converted into the base currency.
    pub fn converts_to_base(&self, source: &str) -> bool {
        self.convert_to_base.iter().any(|s| s == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_currency, "INR");
        assert_eq!(config.datasets.len(), 6);
        assert!(config.converts_to_base("nasdaq"));
        assert!(!config.converts_to_base("sensex"));
    }

    #[test]
    fn test_empty_datasets_rejected() {
        let config = PipelineConfig {
            datasets: BTreeMap::new(),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_convert_to_base_requires_fx_dataset() {
        let mut config = PipelineConfig::default();
        config.datasets.remove(FX_SOURCE);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_convert_source_rejected() {
        let mut config = PipelineConfig::default();
        config.convert_to_base.push("ftse".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let mut config = PipelineConfig::default();
        config
            .time_zones
            .insert("nasdaq".to_string(), "America/Nowhere".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_market_timezone_lookup() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.market_timezone("nasdaq"),
            Some(chrono_tz::America::New_York)
        );
        assert_eq!(config.market_timezone(FX_SOURCE), None);
    }
}
