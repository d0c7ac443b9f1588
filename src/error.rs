//! Error types for the Vigiles CLI

use thiserror::Error;

/// Result type alias for Vigiles operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required parameter is missing or empty. Raised before any
    /// network call is attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An enumerated choice (report format, tool name) outside the
    /// supported set.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A local resource (tool executable, SBOM file) could not be found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Exported report content that is not valid base64 or gzip.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Shorthand for the "`<field>` is required" precondition failure.
    pub fn required(field: &str) -> Self {
        Error::InvalidArgument(format!("{field} is required"))
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the API key in your configuration.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to access this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Create ~/.vigiles/config.yaml to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("API key not configured. Add `api_key` to your configuration file.")]
    MissingApiKey,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
