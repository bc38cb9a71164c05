use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read or write the snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot file is malformed: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),
}

impl StoreError {
    /// `true` when the error is simply "no snapshot exists yet" — the one
    /// condition callers routinely recover from by starting fresh.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
