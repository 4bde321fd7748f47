use crate::error::{ProcessingError, Result};
use crate::models::Aggregation;
use crate::utils::constants::{CSV_GZ_SUFFIX, PART_SUFFIX};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Measure and year encoded in an aggregated part filename: `{measure}_{year}.csv.gz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartName {
    pub measure: String,
    pub year: u32,
}

/// Parse a part filename such as `tmax_2010.csv.gz`
pub fn parse_part_filename(filename: &str) -> Result<PartName> {
    let invalid = || {
        ProcessingError::InvalidFormat(format!(
            "Filename does not match '{{measure}}_{{year}}{}': {}",
            CSV_GZ_SUFFIX, filename
        ))
    };

    let stem = filename.strip_suffix(CSV_GZ_SUFFIX).ok_or_else(invalid)?;
    let (measure, year) = stem.rsplit_once('_').ok_or_else(invalid)?;

    if measure.is_empty() || !measure.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(invalid());
    }
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = year.parse::<u32>().map_err(|_| invalid())?;

    Ok(PartName {
        measure: measure.to_string(),
        year,
    })
}

/// Combined output filename with format: {aggregation}_{measure}.csv.gz
pub fn combined_filename(aggregation: Aggregation, measure: &str) -> String {
    format!("{}_{}{}", aggregation.as_str(), measure, CSV_GZ_SUFFIX)
}

/// Temporary sibling of a final output path: `{output}.part`
pub fn temp_path_for(output_path: &Path) -> PathBuf {
    let mut name = OsString::from(output_path.as_os_str());
    name.push(".");
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Whether a path should be read/written through gzip; a `.part` suffix is looked through
pub fn is_gzip_path(path: &Path) -> bool {
    let path = if path.extension().map_or(false, |ext| ext == PART_SUFFIX) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    path.extension().map_or(false, |ext| ext == "gz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_part_filename() {
        let part = parse_part_filename("tmax_2010.csv.gz").unwrap();
        assert_eq!(part.measure, "tmax");
        assert_eq!(part.year, 2010);
    }

    #[test]
    fn test_parse_part_filename_rejects_other_shapes() {
        assert!(parse_part_filename("tmax_2010.csv").is_err());
        assert!(parse_part_filename("tmax.csv.gz").is_err());
        assert!(parse_part_filename("Tmax_2010.csv.gz").is_err());
        assert!(parse_part_filename("tmax_20a0.csv.gz").is_err());
        assert!(parse_part_filename("_2010.csv.gz").is_err());
        assert!(parse_part_filename("mean_tmax.csv.gz").is_err());
    }

    #[test]
    fn test_combined_filename() {
        assert_eq!(combined_filename(Aggregation::Min, "tmax"), "min_tmax.csv.gz");
        assert_eq!(combined_filename(Aggregation::Mean, "prcp"), "mean_prcp.csv.gz");
    }

    #[test]
    fn test_temp_path_for() {
        let temp = temp_path_for(Path::new("output/extra/zip/mean_tmean.csv.gz"));
        assert_eq!(temp, PathBuf::from("output/extra/zip/mean_tmean.csv.gz.part"));
    }

    #[test]
    fn test_is_gzip_path() {
        assert!(is_gzip_path(Path::new("a/b.csv.gz")));
        assert!(!is_gzip_path(Path::new("a/b.csv")));
        assert!(is_gzip_path(Path::new("a/b.csv.gz.part")));
        assert!(!is_gzip_path(Path::new("a/b.csv.part")));
    }
}
