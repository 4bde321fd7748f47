use crate::error::Result;
use crate::utils::filename::temp_path_for;
use crate::writers::output::OutputStream;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Write-to-`.part`-then-rename guard for one final output path.
///
/// The final path only ever appears through [`AtomicOutput::commit`]. Dropping
/// the guard without committing deletes the temp file; a killed process leaves
/// it behind and the next [`AtomicOutput::begin`] removes it.
pub struct AtomicOutput {
    final_path: PathBuf,
    temp_path: PathBuf,
    committed: bool,
}

impl AtomicOutput {
    pub fn begin(final_path: &Path) -> Result<Self> {
        let temp_path = temp_path_for(final_path);

        if temp_path.exists() {
            warn!(path = %temp_path.display(), "removing stale temporary file from an interrupted run");
            fs::remove_file(&temp_path)?;
        }

        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            final_path: final_path.to_path_buf(),
            temp_path,
            committed: false,
        })
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Fresh (truncating) stream on the temp path, compressed per the final path
    pub fn create_stream(&self, compression_level: u32) -> Result<OutputStream> {
        OutputStream::create(&self.temp_path, false, compression_level)
    }

    pub fn commit(mut self) -> Result<PathBuf> {
        fs::rename(&self.temp_path, &self.final_path)?;
        self.committed = true;
        debug!(path = %self.final_path.display(), "committed output");
        Ok(self.final_path.clone())
    }
}

impl Drop for AtomicOutput {
    fn drop(&mut self) {
        if self.committed || !self.temp_path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.temp_path) {
            warn!(path = %self.temp_path.display(), error = %e, "failed to remove temporary file");
        }
    }
}
