pub mod averager;
pub mod percentile;
pub mod quantiles;
pub mod reshaper;
pub mod stage_runner;

pub use averager::{average_paired, generate_tmean, AverageStats, PairedAverager};
pub use percentile::compute_percentiles;
pub use quantiles::{extract_quantiles, QuantileExtractor, QuantileStats};
pub use reshaper::{reshape, ReshapeStats, Reshaper};
pub use stage_runner::{StageRunner, StageSummary};
