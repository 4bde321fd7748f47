use clap::Parser;
use climate_series_processor::cli::{dispatch, init_logging, Cli};
use climate_series_processor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    dispatch(cli)
}
