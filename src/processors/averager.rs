use crate::error::{ProcessingError, Result};
use crate::readers::LongReader;
use crate::utils::constants::{DATE_COLUMN, DEFAULT_COMPRESSION_LEVEL, PROGRESS_BATCH, TMEAN_COLUMN};
use crate::utils::format::format_float;
use crate::utils::progress::ProgressReporter;
use crate::writers::{csv_writer, finish_csv, AtomicOutput};
use csv::Writer;
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageStats {
    pub rows_written: u64,
    /// Secondary rows left over after the primary stream ended (lenient mode only)
    pub ignored_secondary_rows: u64,
}

/// Element-wise mean of two row-aligned long-format streams
pub struct PairedAverager {
    strict_alignment: bool,
    compression_level: u32,
}

impl PairedAverager {
    pub fn new() -> Self {
        Self {
            strict_alignment: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// With strict alignment off, `(id, date)` keys are not compared and extra
    /// secondary rows are dropped with a warning.
    pub fn with_strict_alignment(mut self, strict_alignment: bool) -> Self {
        self.strict_alignment = strict_alignment;
        self
    }

    pub fn with_compression_level(mut self, compression_level: u32) -> Self {
        self.compression_level = compression_level;
        self
    }

    pub fn average(
        &self,
        primary: &Path,
        secondary: &Path,
        output: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<AverageStats> {
        let mut primary = LongReader::open(primary)?;
        let mut secondary = LongReader::open(secondary)?;

        let atomic = AtomicOutput::begin(output)?;
        let mut writer = csv_writer(atomic.create_stream(self.compression_level)?);

        let stats = self.average_streams(&mut primary, &mut secondary, &mut writer, progress)?;
        finish_csv(writer)?;
        atomic.commit()?;

        Ok(stats)
    }

    /// Walk both streams in lockstep until the primary one ends
    pub fn average_streams<P: Read, S: Read, W: Write>(
        &self,
        primary: &mut LongReader<P>,
        secondary: &mut LongReader<S>,
        writer: &mut Writer<W>,
        progress: Option<&ProgressReporter>,
    ) -> Result<AverageStats> {
        let mut stats = AverageStats::default();

        writer.write_record([primary.header().id_name.as_str(), DATE_COLUMN, TMEAN_COLUMN])?;

        while let Some(a) = primary.next_record()? {
            let b = secondary.next_record()?.ok_or_else(|| {
                ProcessingError::LengthMismatch(format!(
                    "secondary stream ended after {} rows while the primary continues at line {}",
                    stats.rows_written, a.line
                ))
            })?;

            if self.strict_alignment && !a.same_key(&b) {
                return Err(ProcessingError::AlignmentMismatch {
                    line: a.line,
                    primary: a.key(),
                    secondary: b.key(),
                });
            }

            let mean = (a.value + b.value) / 2.0;
            writer.write_record([a.id.as_str(), a.date.as_str(), format_float(mean).as_str()])?;

            stats.rows_written += 1;
            if stats.rows_written % PROGRESS_BATCH == 0 {
                if let Some(p) = progress {
                    p.increment(PROGRESS_BATCH);
                }
            }
        }

        if let Some(p) = progress {
            p.increment(stats.rows_written % PROGRESS_BATCH);
        }

        if self.strict_alignment {
            if secondary.skip_record()? {
                return Err(ProcessingError::LengthMismatch(format!(
                    "primary stream ended after {} rows but the secondary continues at line {}",
                    stats.rows_written,
                    secondary.line()
                )));
            }
        } else {
            while secondary.skip_record()? {
                stats.ignored_secondary_rows += 1;
            }
            if stats.ignored_secondary_rows > 0 {
                warn!(
                    rows = stats.ignored_secondary_rows,
                    "ignoring secondary rows past the end of the primary stream"
                );
            }
        }

        Ok(stats)
    }
}

impl Default for PairedAverager {
    fn default() -> Self {
        Self::new()
    }
}

/// `(a + b) / 2` per aligned row of two long-format files, with strict alignment
pub fn average_paired(primary: &Path, secondary: &Path, output: &Path) -> Result<AverageStats> {
    PairedAverager::new().average(primary, secondary, output, None)
}

/// Daily mean temperature as `(tmax + tmin) / 2`, with tmax as the primary stream
pub fn generate_tmean(
    averager: &PairedAverager,
    tmin_path: &Path,
    tmax_path: &Path,
    output_path: &Path,
    progress: Option<&ProgressReporter>,
) -> Result<AverageStats> {
    averager.average(tmax_path, tmin_path, output_path, progress)
}
