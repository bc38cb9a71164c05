use crate::error::StoreError;
use executor::PortfolioSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Saves and loads portfolio snapshots as a single JSON document on disk.
#[derive(Debug, Clone)]
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

    /// Writes the snapshot, replacing any previous one.
    pub fn save(&self, snapshot: &PortfolioSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), positions = snapshot.positions.len(), "snapshot saved");
        Ok(())
    }

    /// Reads the snapshot back.
    ///
    /// A missing file surfaces as `StoreError::Io` with `NotFound` (see
    /// `StoreError::is_not_found`); a file that exists but does not parse
    /// as a snapshot surfaces as `MalformedSnapshot`.
    pub fn load(&self) -> Result<PortfolioSnapshot, StoreError> {
        let json = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}
