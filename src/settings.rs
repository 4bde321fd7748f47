use crate::error::Result;
use crate::models::Aggregation;
use crate::utils::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use chrono::{Datelike, Local};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Run settings, layered as defaults < config file < `CLIMATE_PROCESSOR_*` environment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Root holding the `aggregated`, `aggregated-combined` and `extra` directories
    pub data_root: PathBuf,

    /// Aggregation kinds combined for every (geography, measure)
    #[validate(length(min = 1))]
    pub aggregations: Vec<Aggregation>,

    /// Last year of the data, used only for the progress estimate
    #[validate(range(min = 1800, max = 2200))]
    pub last_year: Option<i32>,

    /// Require paired tmin/tmax rows to share `(id, date)` and equal lengths
    pub strict_alignment: bool,

    #[validate(range(max = 9))]
    pub compression_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("output"),
            aggregations: Aggregation::ALL.to_vec(),
            last_year: None,
            strict_alignment: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required if given) or the optional default
    /// config file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("aggregations"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Configured last year, or the current calendar year
    pub fn effective_last_year(&self) -> i32 {
        self.last_year.unwrap_or_else(|| Local::now().year())
    }
}
