use thiserror::Error;

use crate::provider::ProviderId;

/// Errors raised by the chart core.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A configuration value is out of range or unrecognized.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The provider does not implement the requested capability.
    #[error("Provider '{provider}' does not support {capability}")]
    Unsupported {
        provider: ProviderId,
        capability: &'static str,
    },

    /// A provider failed to produce data.
    #[error("Provider '{provider}' failed: {message}")]
    Provider {
        provider: ProviderId,
        message: String,
    },

    /// Reading a provider data file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A provider data file was not a valid sample list.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The drawing backend rejected a draw call.
    #[error("Failed to draw chart: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
