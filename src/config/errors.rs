//! Configuration errors

use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation failures.
///
/// All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON for the config shape
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range or format
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "HX_CONFIG_READ",
            ConfigError::Parse(_) => "HX_CONFIG_PARSE",
            ConfigError::Invalid { .. } => "HX_CONFIG_INVALID",
        }
    }

    /// Severity of this failure
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}
