//! Host List Export
//!
//! Writes the plain `[{name, state}]` host list to a JSON file after every
//! successful poll, for other tools (status bars, GUIs) to pick up. The file
//! is replaced atomically so readers never see a half-written list.

use std::io;
use std::path::{Path, PathBuf};

use crate::host::HostExport;

/// Writes host exports to a fixed path
#[derive(Clone, Debug)]
pub struct HostExporter {
    path: PathBuf,
}

impl HostExporter {
    /// Export to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the export file with `hosts`
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be created or
    /// the file cannot be written or renamed.
    pub fn write(&self, hosts: &[HostExport]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(hosts).map_err(io::Error::other)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary export");
            }
            return Err(e);
        }

        tracing::trace!(path = %self.path.display(), hosts = hosts.len(), "Exported host list");
        Ok(())
    }
}
