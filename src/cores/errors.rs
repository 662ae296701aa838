use thiserror::Error;

/// Everything that can go wrong while talking to the image provider.
///
/// Never leaves the adapter: the public operations turn it into a failed
/// `OperationResult` carrying `to_string()` of the error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Error code: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to fetch source image {url}: {reason}")]
    SourceImage { url: String, reason: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err)
        } else {
            ProviderError::Connection(err)
        }
    }
}
