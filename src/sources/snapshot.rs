//! Static snapshot billing source
//!
//! A snapshot is a JSON array of raw entries. The configured path may also be
//! a directory, in which case every `*.json` file in it is read in name order.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::BillingSource;
use crate::types::{CostwatchError, DateRange, RawCostEntry, Result};

pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Snapshot files behind the configured path
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.path.is_dir() {
            let pattern = self.path.join("*.json");
            let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| CostwatchError::Source(format!("bad snapshot pattern: {}", e)))?
                .filter_map(|e| e.ok())
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            return Ok(files);
        }

        if !self.path.exists() {
            return Err(CostwatchError::Source(format!(
                "snapshot file '{}' not found",
                self.path.display()
            )));
        }
        Ok(vec![self.path.clone()])
    }
}

/// Parse one snapshot file
pub fn read_snapshot(path: &Path) -> Result<Vec<RawCostEntry>> {
    let mut content = fs::read(path)?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    simd_json::from_slice(&mut content)
        .map_err(|e| CostwatchError::Parse(format!("{}: {}", path.display(), e)))
}

impl BillingSource for SnapshotSource {
    fn name(&self) -> &str {
        "snapshot"
    }

    /// The snapshot is static data; the range is not applied.
    fn applies_range(&self) -> bool {
        false
    }

    fn fetch(&self, _range: &DateRange) -> Result<Vec<RawCostEntry>> {
        let mut entries = Vec::new();
        for file in self.collect_files()? {
            let parsed = read_snapshot(&file)?;
            tracing::debug!(file = %file.display(), entries = parsed.len(), "read snapshot");
            entries.extend(parsed);
        }
        Ok(entries)
    }
}

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Lock file guarding writes to the snapshot at `path`. It is never renamed
/// over, so every writer contends on the same inode.
pub fn lock_path(path: &Path) -> PathBuf {
    sibling(path, ".lock")
}

/// Write entries as a snapshot: temp file + rename, while holding an
/// exclusive lock on the sidecar [`lock_path`].
pub fn write_snapshot(path: &Path, entries: &[RawCostEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| CostwatchError::Parse(format!("Serialization failed: {}", e)))?;

    let lock = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))?;
    FileExt::lock_exclusive(&lock)
        .map_err(|e| CostwatchError::Source(format!("Failed to acquire write lock: {}", e)))?;

    let written = replace_file(path, content.as_bytes());
    let unlocked = FileExt::unlock(&lock)
        .map_err(|e| CostwatchError::Source(format!("Failed to release write lock: {}", e)));
    written.and(unlocked)
}

fn replace_file(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = sibling(path, ".tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
