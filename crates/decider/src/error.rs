use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeciderError {
    #[error("Decision parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("Decision payload is not a valid JSON proposal batch: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
