//! JSON file checkpoint backend

use crate::checkpoint::traits::{CheckpointError, CheckpointResult, CheckpointStore};
use crate::checkpoint::ResultSet;
use crate::extract::CompanyRecord;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Checkpoint stored as a JSON object mapping link to record
#[derive(Debug, Clone)]
pub struct JsonCheckpoint {
    path: PathBuf,
}

impl JsonCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for the in-progress write
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CheckpointStore for JsonCheckpoint {
    fn load(&self) -> ResultSet {
        if !self.path.exists() {
            return ResultSet::new();
        }

        match read_entries(&self.path) {
            Ok(entries) => entries.into_iter().collect(),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                ResultSet::new()
            }
        }
    }

    fn save(&self, results: &ResultSet) -> CheckpointResult<()> {
        let temp = self.temp_path();

        {
            let file = File::create(&temp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, results)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        // rename replaces the destination atomically on the same filesystem
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!(
            "Checkpoint saved: {} entries to {}",
            results.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Reads a checkpoint strictly, keeping the file's entry order
///
/// Entries whose value is not a record object are skipped with a warning; a
/// record without a link takes its key as the link.
pub fn read_entries(path: &Path) -> CheckpointResult<Vec<(String, CompanyRecord)>> {
    let content = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;

    let Value::Object(map) = raw else {
        return Err(CheckpointError::Structure(format!(
            "expected a JSON object in {}",
            path.display()
        )));
    };

    Ok(entries_from_map(map))
}

fn entries_from_map(map: Map<String, Value>) -> Vec<(String, CompanyRecord)> {
    let mut entries = Vec::with_capacity(map.len());
    for (link, value) in map {
        match serde_json::from_value::<CompanyRecord>(value) {
            Ok(mut record) => {
                if record.link.is_empty() {
                    record.link = link.clone();
                }
                entries.push((link, record));
            }
            Err(e) => {
                tracing::warn!("Skipping checkpoint entry {}: {}", link, e);
            }
        }
    }
    entries
}
