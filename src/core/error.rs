use std::fmt;

/// Error types for carbon-eda operations
#[derive(Debug)]
pub enum CarbonEdaError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error, raised before any work begins
    Config(String),

    /// Input data that does not satisfy the record invariants
    Validation(String),

    /// HTTP client error from the live data source
    Http(reqwest::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// CSV reading or writing error
    Csv(csv::Error),

    /// JSON serialization error
    Json(serde_json::Error),

    /// Chart rendering error
    Chart(String),

    /// Invalid argument error
    InvalidArgument(String),
}

impl fmt::Display for CarbonEdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarbonEdaError::Io(err) => write!(f, "IO error: {err}"),
            CarbonEdaError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CarbonEdaError::Validation(msg) => write!(f, "Validation error: {msg}"),
            CarbonEdaError::Http(err) => write!(f, "HTTP error: {err}"),
            CarbonEdaError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            CarbonEdaError::Csv(err) => write!(f, "CSV error: {err}"),
            CarbonEdaError::Json(err) => write!(f, "JSON error: {err}"),
            CarbonEdaError::Chart(msg) => write!(f, "Chart error: {msg}"),
            CarbonEdaError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for CarbonEdaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CarbonEdaError::Io(err) => Some(err),
            CarbonEdaError::Http(err) => Some(err),
            CarbonEdaError::TomlParsing(err) => Some(err),
            CarbonEdaError::Csv(err) => Some(err),
            CarbonEdaError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CarbonEdaError {
    fn from(err: std::io::Error) -> Self {
        CarbonEdaError::Io(err)
    }
}

impl From<reqwest::Error> for CarbonEdaError {
    fn from(err: reqwest::Error) -> Self {
        CarbonEdaError::Http(err)
    }
}

impl From<toml::de::Error> for CarbonEdaError {
    fn from(err: toml::de::Error) -> Self {
        CarbonEdaError::TomlParsing(err)
    }
}

impl From<csv::Error> for CarbonEdaError {
    fn from(err: csv::Error) -> Self {
        CarbonEdaError::Csv(err)
    }
}

impl From<serde_json::Error> for CarbonEdaError {
    fn from(err: serde_json::Error) -> Self {
        CarbonEdaError::Json(err)
    }
}

/// Type alias for Results using CarbonEdaError
pub type Result<T> = std::result::Result<T, CarbonEdaError>;
