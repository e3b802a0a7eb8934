use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single provider attempt. Every variant is non-fatal to the
/// lookup flow: the provider chain logs it and advances to the next provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Weather provider returned unexpected status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("Failed to deserialize weather provider payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
