use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::model::Snapshot;

/// Durable home of the last observed snapshot: a single flat JSON object
/// (`{ "entryName": "timestamp", ... }`), overwritten each tick.
#[derive(Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted snapshot. Never fails the caller: a missing,
    /// empty, unreadable, or corrupt state file is recovered as an empty
    /// snapshot, which makes every current entry look newly added on the
    /// next diff.
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            return Snapshot::new();
        }
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read state file, starting from empty state");
                return Snapshot::new();
            }
        };
        if bytes.is_empty() {
            warn!(path = %self.path.display(), "state file is empty, starting from empty state");
            return Snapshot::new();
        }
        match serde_json::from_slice(&bytes) {
            Ok(snap) => snap,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to parse state file, starting from empty state");
                Snapshot::new()
            }
        }
    }

    /// Persists the snapshot as pretty-printed JSON via a tmp-file rename,
    /// so a crash mid-write leaves the previous state intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot).context("serialize snapshot")?;
        write_atomic(&self.path, &bytes)
            .with_context(|| format!("write state file {}", self.path.display()))?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
