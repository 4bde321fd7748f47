use crate::error::{ProcessingError, Result};
use crate::models::YearBucket;
use crate::processors::percentile::{compute_percentiles, default_percentiles, validate_percentiles};
use crate::readers::LongReader;
use crate::utils::constants::{
    DAYS_PER_YEAR_ESTIMATE, DEFAULT_COMPRESSION_LEVEL, PROGRESS_BATCH, YEAR_COLUMN,
};
use crate::utils::format::format_float;
use crate::utils::progress::ProgressReporter;
use crate::writers::{csv_writer, finish_csv, AtomicOutput};
use csv::Writer;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantileStats {
    pub rows_read: u64,
    pub rows_written: u64,
    pub years_flushed: usize,
    /// Largest number of values held in the year bucket at any point
    pub peak_bucket_values: usize,
    pub estimated_total_rows: Option<u64>,
}

/// Streams a time-ordered long-format file and writes one percentile row per
/// `(id, year)`, holding at most one year of values in memory.
pub struct QuantileExtractor {
    percentiles: Vec<u32>,
    last_year: i32,
    compression_level: u32,
}

impl QuantileExtractor {
    /// `last_year` only feeds the progress estimate
    pub fn new(last_year: i32) -> Self {
        Self {
            percentiles: default_percentiles(),
            last_year,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_percentiles(mut self, percentiles: Vec<u32>) -> Result<Self> {
        validate_percentiles(&percentiles)?;
        self.percentiles = percentiles;
        Ok(self)
    }

    pub fn with_compression_level(mut self, compression_level: u32) -> Self {
        self.compression_level = compression_level;
        self
    }

    /// Output header: `{id}, year, pctile00, pctile01, ..., pctile100`
    pub fn header(&self, id_name: &str) -> Vec<String> {
        let mut header = Vec::with_capacity(self.percentiles.len() + 2);
        header.push(id_name.to_string());
        header.push(YEAR_COLUMN.to_string());
        header.extend(self.percentiles.iter().map(|p| format!("pctile{:02}", p)));
        header
    }

    pub fn extract(
        &self,
        input: &Path,
        output: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<QuantileStats> {
        let mut reader = LongReader::open(input)?;

        let atomic = AtomicOutput::begin(output)?;
        let mut writer = csv_writer(atomic.create_stream(self.compression_level)?);

        let stats = self.extract_stream(&mut reader, &mut writer, progress)?;
        finish_csv(writer)?;
        atomic.commit()?;

        Ok(stats)
    }

    pub fn extract_stream<R: Read, W: Write>(
        &self,
        reader: &mut LongReader<R>,
        writer: &mut Writer<W>,
        progress: Option<&ProgressReporter>,
    ) -> Result<QuantileStats> {
        let mut stats = QuantileStats::default();
        writer.write_record(self.header(&reader.header().id_name))?;

        let mut bucket = YearBucket::default();
        let mut first_year: Option<i32> = None;
        let mut seen_years: HashSet<String> = HashSet::new();

        while let Some(record) = reader.next_record()? {
            let year = record.year().ok_or_else(|| ProcessingError::ValueParse {
                field: "date",
                value: record.date.clone(),
                line: record.line,
            })?;

            if bucket.year() != Some(year) {
                if !seen_years.insert(year.to_string()) {
                    warn!(
                        year,
                        line = record.line,
                        "year appears again after it was flushed; input is not sorted by date"
                    );
                }

                let (finished_year, series) = bucket.take(year);
                if let Some(finished_year) = finished_year {
                    let ids = series.len() as u64;
                    self.dump_binned_values(&finished_year, series, writer, &mut stats)?;

                    if stats.estimated_total_rows.is_none() {
                        self.estimate_total_rows(ids, first_year, &mut stats, progress);
                    }
                } else {
                    first_year = year.parse().ok();
                }
            }

            bucket.push(&record.id, record.value);
            stats.peak_bucket_values = stats.peak_bucket_values.max(bucket.value_count());

            stats.rows_read += 1;
            if stats.rows_read % PROGRESS_BATCH == 0 {
                if let Some(p) = progress {
                    p.increment(PROGRESS_BATCH);
                }
            }
        }

        if let Some(p) = progress {
            p.increment(stats.rows_read % PROGRESS_BATCH);
        }

        let (year, series) = bucket.into_parts();
        if let Some(year) = year {
            self.dump_binned_values(&year, series, writer, &mut stats)?;
        }

        Ok(stats)
    }

    /// Write the percentile vector of every id in a finished year
    fn dump_binned_values<W: Write>(
        &self,
        year: &str,
        series: Vec<(String, Vec<f64>)>,
        writer: &mut Writer<W>,
        stats: &mut QuantileStats,
    ) -> Result<()> {
        debug!(year, ids = series.len(), "generating percentiles");

        let mut row: Vec<String> = Vec::with_capacity(self.percentiles.len() + 2);
        for (id, mut values) in series {
            let percentiles = compute_percentiles(&mut values, &self.percentiles);

            row.clear();
            row.push(id);
            row.push(year.to_string());
            row.extend(percentiles.into_iter().map(format_float));
            writer.write_record(&row)?;

            stats.rows_written += 1;
        }

        stats.years_flushed += 1;
        Ok(())
    }

    /// Informational row estimate: `ids × years × 365`
    fn estimate_total_rows(
        &self,
        ids: u64,
        first_year: Option<i32>,
        stats: &mut QuantileStats,
        progress: Option<&ProgressReporter>,
    ) {
        let Some(first_year) = first_year else {
            return;
        };
        if self.last_year < first_year {
            return;
        }

        let years = (self.last_year - first_year + 1) as u64;
        let total = ids * years * DAYS_PER_YEAR_ESTIMATE;
        info!(total, "estimated total rows");
        stats.estimated_total_rows = Some(total);

        if let Some(p) = progress {
            p.set_length(total);
        }
    }
}

/// Percentiles 0 to 100 per id and year of a long-format file
pub fn extract_quantiles(input: &Path, output: &Path, last_year: i32) -> Result<QuantileStats> {
    QuantileExtractor::new(last_year).extract(input, output, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::open_csv;
    use crate::utils::filename::temp_path_for;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn extract_str(extractor: &QuantileExtractor, input: &str) -> Result<(Vec<Vec<String>>, QuantileStats)> {
        let mut reader = LongReader::from_reader(input.as_bytes())?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        let stats = extractor.extract_stream(&mut reader, &mut writer, None)?;

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        let rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice())
            .records()
            .map(|r| r.map(|r| r.iter().map(str::to_string).collect::<Vec<String>>()))
            .collect::<std::result::Result<_, _>>()?;
        Ok((rows, stats))
    }

    #[test]
    fn test_header_has_103_columns() {
        let header = QuantileExtractor::new(2020).header("ZCTA");
        assert_eq!(header.len(), 103);
        assert_eq!(header[0], "ZCTA");
        assert_eq!(header[1], "year");
        assert_eq!(header[2], "pctile00");
        assert_eq!(header[52], "pctile50");
        assert_eq!(header[102], "pctile100");
    }

    #[test]
    fn test_percentiles_for_single_year() -> Result<()> {
        let input = "ZCTA,date,value\n\
                     A,20200101,1\nA,20200102,2\nA,20200103,3\nA,20200104,4\nA,20200105,5\n";
        let (rows, stats) = extract_str(&QuantileExtractor::new(2020), input)?;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 103);
        assert_eq!(rows[1][0], "A");
        assert_eq!(rows[1][1], "2020");
        assert_eq!(rows[1][2], "1.0");
        assert_eq!(rows[1][52], "3.0");
        assert_eq!(rows[1][102], "5.0");
        assert_eq!(stats.rows_read, 5);
        assert_eq!(stats.rows_written, 1);
        Ok(())
    }

    #[test]
    fn test_year_boundary_splits_rows() -> Result<()> {
        let input = "ZCTA,date,value\n\
                     A,20191231,1\nB,20191231,7\nA,20200101,9\n";
        let extractor = QuantileExtractor::new(2020).with_percentiles(vec![0, 100])?;
        let (rows, stats) = extract_str(&extractor, input)?;

        assert_eq!(
            rows,
            vec![
                vec!["ZCTA", "year", "pctile00", "pctile100"],
                vec!["A", "2019", "1.0", "1.0"],
                vec!["B", "2019", "7.0", "7.0"],
                vec!["A", "2020", "9.0", "9.0"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect::<Vec<_>>())
            .collect::<Vec<_>>()
        );
        assert_eq!(stats.years_flushed, 2);
        Ok(())
    }

    #[test]
    fn test_repeated_year_gets_its_own_row() -> Result<()> {
        let input = "ZCTA,date,value\n\
                     A,20190101,1\nA,20200101,2\nA,20190102,3\n";
        let extractor = QuantileExtractor::new(2020).with_percentiles(vec![50])?;
        let (rows, stats) = extract_str(&extractor, input)?;

        let years: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
        assert_eq!(years, vec!["2019", "2020", "2019"]);
        assert_eq!(rows[3][2], "3.0");
        assert_eq!(stats.years_flushed, 3);
        assert_eq!(stats.rows_written, 3);
        Ok(())
    }

    #[test]
    fn test_bucket_holds_one_year_at_a_time() -> Result<()> {
        let ids = 4;
        let mut input = String::from("ZCTA,date,value\n");
        for year in 2001..=2004 {
            for day in 1..=28 {
                for id in 0..ids {
                    input.push_str(&format!("id{},{}01{:02},{}\n", id, year, day, day));
                }
            }
        }

        let (rows, stats) = extract_str(&QuantileExtractor::new(2004), &input)?;

        assert_eq!(rows.len(), 1 + 4 * ids);
        assert_eq!(stats.rows_read, (4 * 28 * ids) as u64);
        assert_eq!(stats.peak_bucket_values, 28 * ids);
        assert!(stats.peak_bucket_values <= ids * 366);
        assert_eq!(stats.estimated_total_rows, Some(ids as u64 * 4 * 365));
        Ok(())
    }

    #[test]
    fn test_invalid_date_and_value() {
        let bad_date = "ZCTA,date,value\nA,20x0,1\n";
        assert!(matches!(
            extract_str(&QuantileExtractor::new(2020), bad_date),
            Err(ProcessingError::ValueParse { field: "date", .. })
        ));

        let bad_value = "ZCTA,date,value\nA,20200101,hot\n";
        assert!(matches!(
            extract_str(&QuantileExtractor::new(2020), bad_value),
            Err(ProcessingError::ValueParse { field: "value", .. })
        ));
    }

    #[test]
    fn test_empty_stream_writes_header_only() -> Result<()> {
        let (rows, stats) = extract_str(&QuantileExtractor::new(2020), "ZCTA,date,value\n")?;
        assert_eq!(rows.len(), 1);
        assert_eq!(stats.years_flushed, 0);
        Ok(())
    }

    #[test]
    fn test_extract_quantiles_file() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("mean_tmax.csv");
        let output = dir.path().join("tmax_quantiles.csv.gz");
        std::fs::write(&input, "ZCTA,date,value\nA,20200101,1\nA,20200102,3\n")?;

        let stats = extract_quantiles(&input, &output, 2020)?;
        assert_eq!(stats.rows_written, 1);
        assert!(!temp_path_for(&output).exists());

        let mut reader = open_csv(&output)?;
        assert_eq!(reader.headers()?.len(), 103);
        let row = reader.records().next().unwrap()?;
        assert_eq!(&row[2], "1.0");
        assert_eq!(&row[52], "2.0");
        assert_eq!(&row[102], "3.0");
        Ok(())
    }
}
