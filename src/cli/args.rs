use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "climate-series-processor")]
#[command(about = "Bounded-memory reshaping, tmean and yearly percentiles for gridded climate CSVs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: climate-series-processor.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Override the data root directory")]
    pub data_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reshape wide per-year files into combined long-format series.
    /// Without arguments, combines every missing output under the data root.
    Combine {
        #[arg(short, long, num_args = 1.., help = "Wide input files, in time order")]
        input: Vec<PathBuf>,

        #[arg(short, long, help = "Aggregation kind to extract (min, max or mean)")]
        aggregation: Option<String>,

        #[arg(short, long, help = "Combined long-format output file")]
        output: Option<PathBuf>,
    },

    /// Average tmin and tmax series into tmean.
    /// Without arguments, generates every missing tmean under the data root.
    Tmean {
        #[arg(short = 't', long, help = "Long-format tmin input")]
        tmin_file: Option<PathBuf>,

        #[arg(short = 'T', long, help = "Long-format tmax input")]
        tmax_file: Option<PathBuf>,

        #[arg(short, long, help = "tmean output file")]
        output: Option<PathBuf>,

        #[arg(long, help = "Skip the (id, date) alignment check between inputs")]
        no_strict_alignment: bool,
    },

    /// Yearly 0-100th percentiles per id.
    /// Without arguments, generates every missing quantile file under the data root.
    Quantiles {
        #[arg(short, long, help = "Long-format input file, ordered by date")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Percentile output file")]
        output: Option<PathBuf>,

        #[arg(long, help = "Last year of the data, for the progress estimate")]
        last_year: Option<i32>,
    },

    /// Run combine, tmean and quantiles over the data root
    RunAll,
}
