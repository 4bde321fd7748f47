/// Aggregation kind identifiers embedded in wide column names
pub const AGGREGATION_MIN: &str = "min";
pub const AGGREGATION_MAX: &str = "max";
pub const AGGREGATION_MEAN: &str = "mean";

/// Directory names under the data root
pub const AGGREGATED_DIR: &str = "aggregated";
pub const COMBINED_DIR: &str = "aggregated-combined";
pub const EXTRA_DIR: &str = "extra";

/// File names
pub const CSV_GZ_SUFFIX: &str = ".csv.gz";
pub const PART_SUFFIX: &str = "part";
pub const DEFAULT_TMAX_FILENAME: &str = "mean_tmax.csv.gz";
pub const DEFAULT_TMIN_FILENAME: &str = "mean_tmin.csv.gz";
pub const DEFAULT_TMEAN_FILENAME: &str = "mean_tmean.csv.gz";
pub const DEFAULT_TMAX_QUANTILES_FILENAME: &str = "tmax_quantiles.csv.gz";
pub const DEFAULT_TMIN_QUANTILES_FILENAME: &str = "tmin_quantiles.csv.gz";
pub const DEFAULT_CONFIG_FILE: &str = "climate-series-processor.toml";

/// Long-format column names
pub const DATE_COLUMN: &str = "date";
pub const VALUE_COLUMN: &str = "value";
pub const TMEAN_COLUMN: &str = "tmean";
pub const YEAR_COLUMN: &str = "year";

/// Percentile defaults
pub const MAX_PERCENTILE: u32 = 100;
pub const DAYS_PER_YEAR_ESTIMATE: u64 = 365;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const PROGRESS_BATCH: u64 = 4096;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "CLIMATE_PROCESSOR";
