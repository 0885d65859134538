//! On-disk artifacts: one JSON file per record plus an optional manifest
//!
//! Writes are synchronous. The fetch loop never awaits between opening and finishing a
//! file, so cancelling a run cannot leave a partially written artifact behind.

use crate::error::Result;
use crate::record::DerivedRecord;
use std::path::{Path, PathBuf};

/// Output directory holding the persisted artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the directory (and its parents) if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "Data directory initialized");
        Ok(Self { dir })
    }

    /// The output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a record would be written to
    pub fn path_for(&self, record: &DerivedRecord) -> PathBuf {
        self.dir.join(record.file_name())
    }

    /// Write one record, replacing any file of the same name from an earlier run
    pub fn write(&self, record: &DerivedRecord) -> Result<PathBuf> {
        let path = self.path_for(record);
        let json = record.to_json()?;
        tracing::debug!(path = %path.display(), "Saving metadata");
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Sorted names of every `*.json` file in the output directory
    pub fn artifact_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write the manifest read by the viewer: a JSON array of artifact file names
    ///
    /// Returns the number of names listed.
    pub fn write_index(&self, index_path: &Path) -> Result<usize> {
        let names = self.artifact_names()?;
        if let Some(parent) = index_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(index_path, serde_json::to_string(&names)?)?;
        tracing::info!(
            path = %index_path.display(),
            entries = names.len(),
            "Index written"
        );
        Ok(names.len())
    }
}
