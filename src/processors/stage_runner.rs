use crate::error::{ProcessingError, Result};
use crate::layout::{combined_geographies, discover_parts, group_parts, DataLayout};
use crate::models::{Aggregation, CombinedKey};
use crate::processors::averager::{generate_tmean, PairedAverager};
use crate::processors::quantiles::QuantileExtractor;
use crate::processors::reshaper::Reshaper;
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outputs produced and skipped by one auto-discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl StageSummary {
    pub fn summary(&self, stage: &str) -> String {
        format!(
            "{}: generated {}, skipped {} (already present)",
            stage,
            self.generated.len(),
            self.skipped.len()
        )
    }
}

/// Paired inputs of the derived products for one geography
struct GeographyInputs {
    geography: String,
    tmax: PathBuf,
    tmin: PathBuf,
}

/// Runs each stage over every output missing from a [`DataLayout`], one after another
pub struct StageRunner {
    layout: DataLayout,
    aggregations: Vec<Aggregation>,
    strict_alignment: bool,
    compression_level: u32,
    last_year: i32,
    silent: bool,
}

impl StageRunner {
    pub fn new(settings: &Settings, silent: bool) -> Self {
        Self {
            layout: DataLayout::new(&settings.data_root),
            aggregations: settings.aggregations.clone(),
            strict_alignment: settings.strict_alignment,
            compression_level: settings.compression_level,
            last_year: settings.effective_last_year(),
            silent,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn averager(&self) -> PairedAverager {
        PairedAverager::new()
            .with_strict_alignment(self.strict_alignment)
            .with_compression_level(self.compression_level)
    }

    pub fn extractor(&self) -> QuantileExtractor {
        QuantileExtractor::new(self.last_year).with_compression_level(self.compression_level)
    }

    pub fn reshaper(&self, aggregation: Aggregation) -> Reshaper {
        Reshaper::new(aggregation).with_compression_level(self.compression_level)
    }

    pub fn progress(&self, message: &str) -> ProgressReporter {
        ProgressReporter::new_spinner(message, self.silent)
    }

    /// Combine every (geography, measure) group of parts for each configured
    /// aggregation, skipping combined files that already exist
    pub fn combine_all(&self) -> Result<StageSummary> {
        let groups = group_parts(discover_parts(&self.layout.aggregated_dir())?);
        let mut summary = StageSummary::default();

        for group in groups {
            let paths = group.paths();

            for &aggregation in &self.aggregations {
                let key = CombinedKey::new(&group.geography, aggregation, &group.measure);
                let output = self.layout.combined_path(&key);

                if output.exists() {
                    info!(path = %output.display(), "skipping existing output");
                    summary.skipped.push(output);
                    continue;
                }

                info!(%key, parts = paths.len(), "combining");
                let progress = self.progress(&format!("Combining {}", key));
                let stats = self
                    .reshaper(aggregation)
                    .combine_parts(&paths, &output, Some(&progress))?;
                progress.finish_with_message(&format!("Combined {}", key));

                info!(
                    path = %output.display(),
                    rows = stats.rows_written,
                    "wrote combined output"
                );
                summary.generated.push(output);
            }
        }

        Ok(summary)
    }

    /// Resolve tmax/tmin inputs for every combined geography, failing before
    /// any work starts if one is missing
    fn geography_inputs(&self) -> Result<Vec<GeographyInputs>> {
        let mut inputs = Vec::new();

        for geography in combined_geographies(&self.layout.combined_dir())? {
            let tmax = self.layout.tmax_path(&geography);
            let tmin = self.layout.tmin_path(&geography);

            for path in [&tmax, &tmin] {
                if !path.is_file() {
                    return Err(ProcessingError::MissingDependency(path.clone()));
                }
            }

            inputs.push(GeographyInputs {
                geography,
                tmax,
                tmin,
            });
        }

        Ok(inputs)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn tmean_all(&self) -> Result<StageSummary> {
        let averager = self.averager();
        let mut summary = StageSummary::default();

        for inputs in self.geography_inputs()? {
            let output = self.layout.tmean_path(&inputs.geography);
            Self::ensure_parent(&output)?;

            if output.exists() {
                info!(path = %output.display(), "skipping existing output");
                summary.skipped.push(output);
                continue;
            }

            info!(path = %output.display(), "generating tmean");
            let progress = self.progress(&format!("Generating {}", output.display()));
            let stats = generate_tmean(
                &averager,
                &inputs.tmin,
                &inputs.tmax,
                &output,
                Some(&progress),
            )?;
            progress.finish_with_message(&format!("Wrote {}", output.display()));

            info!(path = %output.display(), rows = stats.rows_written, "wrote tmean");
            summary.generated.push(output);
        }

        Ok(summary)
    }

    pub fn quantiles_all(&self) -> Result<StageSummary> {
        let extractor = self.extractor();
        let mut summary = StageSummary::default();

        for inputs in self.geography_inputs()? {
            let jobs = [
                (&inputs.tmax, self.layout.tmax_quantiles_path(&inputs.geography)),
                (&inputs.tmin, self.layout.tmin_quantiles_path(&inputs.geography)),
            ];

            for (input, output) in jobs {
                Self::ensure_parent(&output)?;

                if output.exists() {
                    info!(path = %output.display(), "skipping existing output");
                    summary.skipped.push(output);
                    continue;
                }

                info!(path = %output.display(), "generating quantiles");
                let progress = self.progress(&format!("Generating {}", output.display()));
                let stats = extractor.extract(input, &output, Some(&progress))?;
                progress.finish_with_message(&format!("Wrote {}", output.display()));

                info!(
                    path = %output.display(),
                    rows = stats.rows_written,
                    years = stats.years_flushed,
                    "wrote quantiles"
                );
                summary.generated.push(output);
            }
        }

        Ok(summary)
    }

    /// Combine, then tmean, then quantiles
    pub fn run_all(&self) -> Result<Vec<(&'static str, StageSummary)>> {
        Ok(vec![
            ("combine", self.combine_all()?),
            ("tmean", self.tmean_all()?),
            ("quantiles", self.quantiles_all()?),
        ])
    }
}
