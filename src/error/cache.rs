use thiserror::Error;

/// Failure of a cache read or write. The lookup coordinator treats a failed
/// read as a cache miss and a failed write as a logged no-op; neither aborts
/// the flow.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] fred::error::Error),
    #[error("Failed to serialize cached weather reading: {0}")]
    Serialization(#[from] serde_json::Error),
}
