use thiserror::Error;

/// Result type alias using TelemetryError
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while building or configuring the telemetry pipeline.
///
/// Runtime overload conditions (a full queue, an oversized drain) are not
/// errors; they are counted by the queue and the window instead.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A capacity, interval or range failed validation.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// The config file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TelemetryError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
