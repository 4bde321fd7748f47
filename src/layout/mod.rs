pub mod discovery;

pub use discovery::{combined_geographies, discover_parts, group_parts, PartFile, PartGroup};

use crate::models::CombinedKey;
use crate::utils::constants::{
    AGGREGATED_DIR, COMBINED_DIR, DEFAULT_TMAX_FILENAME, DEFAULT_TMAX_QUANTILES_FILENAME,
    DEFAULT_TMEAN_FILENAME, DEFAULT_TMIN_FILENAME, DEFAULT_TMIN_QUANTILES_FILENAME, EXTRA_DIR,
};
use crate::utils::filename::combined_filename;
use std::path::{Path, PathBuf};

/// Directory convention of a processing run:
///
/// ```text
/// {root}/aggregated/{geography}/{measure}_{year}.csv.gz
/// {root}/aggregated-combined/{geography}/{aggregation}_{measure}.csv.gz
/// {root}/extra/{geography}/{mean_tmean,tmax_quantiles,tmin_quantiles}.csv.gz
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn aggregated_dir(&self) -> PathBuf {
        self.root.join(AGGREGATED_DIR)
    }

    pub fn combined_dir(&self) -> PathBuf {
        self.root.join(COMBINED_DIR)
    }

    pub fn extra_dir(&self) -> PathBuf {
        self.root.join(EXTRA_DIR)
    }

    pub fn combined_path(&self, key: &CombinedKey) -> PathBuf {
        self.combined_dir()
            .join(&key.geography)
            .join(combined_filename(key.aggregation, &key.measure))
    }

    pub fn tmax_path(&self, geography: &str) -> PathBuf {
        self.combined_dir().join(geography).join(DEFAULT_TMAX_FILENAME)
    }

    pub fn tmin_path(&self, geography: &str) -> PathBuf {
        self.combined_dir().join(geography).join(DEFAULT_TMIN_FILENAME)
    }

    pub fn tmean_path(&self, geography: &str) -> PathBuf {
        self.extra_dir().join(geography).join(DEFAULT_TMEAN_FILENAME)
    }

    pub fn tmax_quantiles_path(&self, geography: &str) -> PathBuf {
        self.extra_dir()
            .join(geography)
            .join(DEFAULT_TMAX_QUANTILES_FILENAME)
    }

    pub fn tmin_quantiles_path(&self, geography: &str) -> PathBuf {
        self.extra_dir()
            .join(geography)
            .join(DEFAULT_TMIN_QUANTILES_FILENAME)
    }
}
