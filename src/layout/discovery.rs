use crate::error::Result;
use crate::utils::constants::CSV_GZ_SUFFIX;
use crate::utils::filename::parse_part_filename;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One per-year aggregated file: `{geography}/{measure}_{year}.csv.gz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFile {
    pub geography: String,
    pub measure: String,
    pub year: u32,
    pub path: PathBuf,
}

/// Every part of one (geography, measure), ordered by year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartGroup {
    pub geography: String,
    pub measure: String,
    pub parts: Vec<PartFile>,
}

impl PartGroup {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.parts.iter().map(|p| p.path.clone()).collect()
    }
}

/// Sorted subdirectory names of `dir`; a missing `dir` yields none
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        warn!(path = %dir.display(), "directory does not exist; nothing to discover");
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            dirs.push((name.to_string(), path.clone()));
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Scan `{aggregated_dir}/*/*.csv.gz` for part files.
///
/// Gzipped CSVs whose names do not follow `{measure}_{year}.csv.gz` are
/// skipped with a warning so they never reach the reshaper.
pub fn discover_parts(aggregated_dir: &Path) -> Result<Vec<PartFile>> {
    let mut parts = Vec::new();

    for (geography, dir) in subdirectories(aggregated_dir)? {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.is_file() || !filename.ends_with(CSV_GZ_SUFFIX) {
                continue;
            }

            match parse_part_filename(filename) {
                Ok(name) => parts.push(PartFile {
                    geography: geography.clone(),
                    measure: name.measure,
                    year: name.year,
                    path,
                }),
                Err(e) => warn!(path = %path.display(), "skipping file: {}", e),
            }
        }
    }

    debug!(count = parts.len(), "discovered aggregated parts");
    Ok(parts)
}

/// Group parts by (geography, measure) with each group's parts in ascending year order
pub fn group_parts(parts: Vec<PartFile>) -> Vec<PartGroup> {
    let mut grouped: BTreeMap<(String, String), Vec<PartFile>> = BTreeMap::new();
    for part in parts {
        grouped
            .entry((part.geography.clone(), part.measure.clone()))
            .or_default()
            .push(part);
    }

    grouped
        .into_iter()
        .map(|((geography, measure), mut parts)| {
            parts.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.path.cmp(&b.path)));
            PartGroup {
                geography,
                measure,
                parts,
            }
        })
        .collect()
}

/// Geography directories under the combined-output directory
pub fn combined_geographies(combined_dir: &Path) -> Result<Vec<String>> {
    Ok(subdirectories(combined_dir)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}
