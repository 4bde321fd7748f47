use crate::error::{ProcessingError, Result};
use crate::models::{Aggregation, WideSchema};
use crate::readers::open_csv;
use crate::utils::constants::{DATE_COLUMN, DEFAULT_COMPRESSION_LEVEL, PROGRESS_BATCH, VALUE_COLUMN};
use crate::utils::progress::ProgressReporter;
use crate::writers::{csv_writer, finish_csv, AtomicOutput, OutputStream};
use csv::{Reader, StringRecord, Writer};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReshapeStats {
    pub parts: usize,
    pub rows_read: u64,
    pub rows_written: u64,
    pub columns_selected: usize,
}

impl ReshapeStats {
    fn absorb(&mut self, other: ReshapeStats) {
        self.parts += other.parts;
        self.rows_read += other.rows_read;
        self.rows_written += other.rows_written;
        self.columns_selected += other.columns_selected;
    }
}

/// Turns wide per-year files into `(id, date, value)` rows for one aggregation kind
pub struct Reshaper {
    aggregation: Aggregation,
    compression_level: u32,
}

impl Reshaper {
    pub fn new(aggregation: Aggregation) -> Self {
        Self {
            aggregation,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_compression_level(mut self, compression_level: u32) -> Self {
        self.compression_level = compression_level;
        self
    }

    /// Append the long form of one wide file to `output`.
    ///
    /// The `(id, date, value)` header is written only when `output` does not
    /// exist yet. Cells are copied verbatim, without numeric parsing.
    pub fn reshape(
        &self,
        input: &Path,
        output: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<ReshapeStats> {
        let mut reader = open_csv(input)?;
        let schema = WideSchema::from_header(reader.headers()?, self.aggregation)?;

        let write_header = !output.exists();
        let mut writer = csv_writer(OutputStream::create(output, true, self.compression_level)?);

        let stats = self.reshape_stream(&mut reader, &schema, &mut writer, write_header, progress)?;
        finish_csv(writer)?;

        debug!(
            input = %input.display(),
            aggregation = %self.aggregation,
            rows = stats.rows_read,
            written = stats.rows_written,
            "reshaped part"
        );

        Ok(stats)
    }

    pub fn reshape_stream<R: Read, W: Write>(
        &self,
        reader: &mut Reader<R>,
        schema: &WideSchema,
        writer: &mut Writer<W>,
        write_header: bool,
        progress: Option<&ProgressReporter>,
    ) -> Result<ReshapeStats> {
        let mut stats = ReshapeStats {
            parts: 1,
            columns_selected: schema.columns.len(),
            ..ReshapeStats::default()
        };

        if write_header {
            writer.write_record([schema.id_name.as_str(), DATE_COLUMN, VALUE_COLUMN])?;
        }

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let id = record.get(schema.id_index).unwrap_or_default();

            for column in &schema.columns {
                let value = record.get(column.index).unwrap_or_default();
                writer.write_record([id, column.date.as_str(), value])?;
            }

            stats.rows_read += 1;
            stats.rows_written += schema.columns.len() as u64;

            if stats.rows_read % PROGRESS_BATCH == 0 {
                if let Some(p) = progress {
                    p.increment(PROGRESS_BATCH);
                }
            }
        }

        if let Some(p) = progress {
            p.increment(stats.rows_read % PROGRESS_BATCH);
        }

        Ok(stats)
    }

    /// Reshape every part, in the order given, into one combined output.
    ///
    /// Parts accumulate in `{output}.part`, which is renamed to `output` only
    /// after the last part succeeds. Any failure removes the temp file.
    pub fn combine_parts(
        &self,
        parts: &[PathBuf],
        output: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<ReshapeStats> {
        if parts.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "no input parts to combine into {}",
                output.display()
            )));
        }

        let atomic = AtomicOutput::begin(output)?;
        let mut total = ReshapeStats::default();

        for (index, part) in parts.iter().enumerate() {
            if let Some(p) = progress {
                p.set_message(&format!(
                    "{} part {}/{}: {}",
                    self.aggregation,
                    index + 1,
                    parts.len(),
                    part.display()
                ));
            }
            total.absorb(self.reshape(part, atomic.temp_path(), progress)?);
        }

        atomic.commit()?;
        Ok(total)
    }
}

/// Append the `aggregation` columns of one wide file to a long-format output
pub fn reshape(input: &Path, aggregation: Aggregation, output: &Path) -> Result<ReshapeStats> {
    Reshaper::new(aggregation).reshape(input, output, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::open_input;
    use crate::utils::filename::temp_path_for;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const WIDE: &str = "ZCTA,20100101_min,20100101_max,20100102_min,20100102_max\n\
                        01001,-3.5,4.0,-2.0,5.5\n\
                        01002,-1.0,6.0,0.5,7.25\n";

    fn read_to_string(path: &Path) -> String {
        let mut content = String::new();
        open_input(path).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_reshape_emits_one_row_per_matching_cell() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("tmin_2010.csv");
        let output = dir.path().join("min_tmin.csv");
        std::fs::write(&input, WIDE)?;

        let stats = Reshaper::new(Aggregation::Min).reshape(&input, &output, None)?;

        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.rows_written, 4);
        assert_eq!(stats.columns_selected, 2);
        assert_eq!(
            read_to_string(&output),
            "ZCTA,date,value\n\
             01001,20100101,-3.5\n\
             01001,20100102,-2.0\n\
             01002,20100101,-1.0\n\
             01002,20100102,0.5\n"
        );
        Ok(())
    }

    #[test]
    fn test_reshape_appends_without_second_header() -> Result<()> {
        let dir = TempDir::new()?;
        let first = dir.path().join("tmax_2010.csv");
        let second = dir.path().join("tmax_2011.csv");
        let output = dir.path().join("max_tmax.csv.gz");
        std::fs::write(&first, "ZCTA,20101231_max\nA,1\n")?;
        std::fs::write(&second, "ZCTA,20110101_max\nA,2\n")?;

        let reshaper = Reshaper::new(Aggregation::Max);
        reshaper.reshape(&first, &output, None)?;
        reshaper.reshape(&second, &output, None)?;

        assert_eq!(
            read_to_string(&output),
            "ZCTA,date,value\nA,20101231,1\nA,20110101,2\n"
        );
        Ok(())
    }

    #[test]
    fn test_reshape_copies_cells_verbatim() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("prcp_2010.csv");
        let output = dir.path().join("mean_prcp.csv");
        std::fs::write(&input, "ZCTA,20100101_mean\nA,NA\n")?;

        Reshaper::new(Aggregation::Mean).reshape(&input, &output, None)?;
        assert_eq!(read_to_string(&output), "ZCTA,date,value\nA,20100101,NA\n");
        Ok(())
    }

    #[test]
    fn test_reshape_without_id_column_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("tmin_2010.csv");
        let output = dir.path().join("min_tmin.csv");
        std::fs::write(&input, "20100101_min,20100102_min\n1,2\n")?;

        let result = Reshaper::new(Aggregation::Min).reshape(&input, &output, None);
        assert!(matches!(result, Err(ProcessingError::MalformedHeader(_))));
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_combine_parts_is_atomic() -> Result<()> {
        let dir = TempDir::new()?;
        let good = dir.path().join("tmin_2010.csv");
        let bad = dir.path().join("tmin_2011.csv");
        let output = dir.path().join("combined").join("min_tmin.csv.gz");
        std::fs::write(&good, WIDE)?;
        std::fs::write(&bad, "20110101_min\n1\n")?;

        let reshaper = Reshaper::new(Aggregation::Min);
        let result = reshaper.combine_parts(&[good.clone(), bad], &output, None);

        assert!(result.is_err());
        assert!(!output.exists());
        assert!(!temp_path_for(&output).exists());

        let stats = reshaper.combine_parts(&[good.clone(), good], &output, None)?;
        assert_eq!(stats.parts, 2);
        assert_eq!(stats.rows_written, 8);

        let content = read_to_string(&output);
        assert_eq!(content.lines().count(), 9);
        assert_eq!(content.matches("ZCTA").count(), 1);
        Ok(())
    }

    #[test]
    fn test_combine_parts_requires_inputs() {
        let result = Reshaper::new(Aggregation::Min).combine_parts(&[], Path::new("out.csv"), None);
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }
}
