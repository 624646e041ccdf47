use thiserror::Error;

/// Failure of the rendered (WebDriver) fetch path
#[derive(Debug, Error)]
pub enum RenderError {
    /// Navigation or page load exceeded the configured timeout
    #[error("page load timed out after {0}s")]
    Timeout(u64),

    /// Any other WebDriver level failure (lost session, crashed browser, ...)
    #[error("webdriver error: {0}")]
    Driver(String),
}

impl From<fantoccini::error::CmdError> for RenderError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        RenderError::Driver(err.to_string())
    }
}

/// Failure of the lightweight HTTP fallback path
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Why a single wrapper candidate could not be turned into a destination URL
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("candidate is not base64-like")]
    NotBase64,

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("decoded value is not an http url")]
    NotHttp,
}

/// Outcome of a two-tier page fetch that produced no document
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL points at a local or internal host and was never requested
    #[error("refusing to fetch internal url {0}")]
    Rejected(String),

    /// Rendering failed and the HTTP fallback failed as well
    #[error("fallback fetch failed: {0}")]
    Transport(#[from] TransportError),
}

/// Fatal errors that end a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to start webdriver session: {0}")]
    WebDriver(String),

    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<regex::Error> for HarvestError {
    fn from(err: regex::Error) -> Self {
        HarvestError::Config(format!("invalid exclude pattern: {}", err))
    }
}
