use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::Aggregation;
use crate::processors::{generate_tmean, StageRunner, StageSummary};
use crate::settings::Settings;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};

/// Run the parsed command. Logging must already be initialised by the caller.
pub fn dispatch(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(root) = cli.data_root {
        settings.data_root = root;
    }

    match cli.command {
        Commands::Combine {
            input,
            aggregation,
            output,
        } => {
            let runner = StageRunner::new(&settings, cli.quiet);

            match (input.is_empty(), aggregation, output) {
                (true, None, None) => report("combine", &runner.combine_all()?),
                (false, Some(aggregation), Some(output)) => {
                    let aggregation: Aggregation = aggregation.parse()?;
                    if skip_existing(&output) {
                        return Ok(());
                    }

                    let progress = runner.progress(&format!("Combining into {}", output.display()));
                    let stats = runner
                        .reshaper(aggregation)
                        .combine_parts(&input, &output, Some(&progress))?;
                    progress.finish_with_message(&format!("Wrote {}", output.display()));
                    info!(
                        path = %output.display(),
                        parts = stats.parts,
                        rows = stats.rows_written,
                        "combine complete"
                    );
                }
                _ => return Err(partial_arguments("--input, --aggregation and --output")),
            }
        }

        Commands::Tmean {
            tmin_file,
            tmax_file,
            output,
            no_strict_alignment,
        } => {
            if no_strict_alignment {
                settings.strict_alignment = false;
            }
            let runner = StageRunner::new(&settings, cli.quiet);

            match (tmin_file, tmax_file, output) {
                (None, None, None) => report("tmean", &runner.tmean_all()?),
                (Some(tmin), Some(tmax), Some(output)) => {
                    if skip_existing(&output) {
                        return Ok(());
                    }

                    let progress = runner.progress(&format!("Generating {}", output.display()));
                    let stats =
                        generate_tmean(&runner.averager(), &tmin, &tmax, &output, Some(&progress))?;
                    progress.finish_with_message(&format!("Wrote {}", output.display()));
                    info!(path = %output.display(), rows = stats.rows_written, "tmean complete");
                }
                _ => return Err(partial_arguments("--tmin-file, --tmax-file and --output")),
            }
        }

        Commands::Quantiles {
            input,
            output,
            last_year,
        } => {
            if last_year.is_some() {
                settings.last_year = last_year;
            }
            let runner = StageRunner::new(&settings, cli.quiet);

            match (input, output) {
                (None, None) => report("quantiles", &runner.quantiles_all()?),
                (Some(input), Some(output)) => {
                    if skip_existing(&output) {
                        return Ok(());
                    }

                    let progress = runner.progress(&format!("Generating {}", output.display()));
                    let stats = runner.extractor().extract(&input, &output, Some(&progress))?;
                    progress.finish_with_message(&format!("Wrote {}", output.display()));
                    info!(
                        path = %output.display(),
                        rows = stats.rows_written,
                        years = stats.years_flushed,
                        "quantiles complete"
                    );
                }
                _ => return Err(partial_arguments("--input and --output")),
            }
        }

        Commands::RunAll => {
            let runner = StageRunner::new(&settings, cli.quiet);
            for (stage, summary) in runner.run_all()? {
                report(stage, &summary);
            }
        }
    }

    Ok(())
}

/// Install the global tracing subscriber; call once per process
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("failed to initialise logging: {}", e)))
}

fn skip_existing(output: &Path) -> bool {
    if output.exists() {
        info!(path = %output.display(), "skipping existing output");
        true
    } else {
        false
    }
}

fn partial_arguments(expected: &str) -> ProcessingError {
    ProcessingError::Config(format!(
        "pass all of {} to process one file, or none to auto-discover",
        expected
    ))
}

fn report(stage: &str, summary: &StageSummary) {
    info!("{}", summary.summary(stage));
}
