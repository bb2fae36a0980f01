//! Error types for inspection AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// All provider implementations map their native errors to these variants,
/// preserving context while maintaining a provider-agnostic interface. The
/// workflow layer only ever distinguishes these categories, which is what lets
/// it treat a parse failure differently from a transport failure.
#[derive(Debug)]
pub enum Error {
    /// API key authentication failures. Indicates credentials are invalid,
    /// expired, or lack necessary permissions.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection resets.
    /// These errors are typically transient and may benefit from retry logic.
    Network(String),

    /// Invalid parameters, missing required fields, or malformed configuration.
    /// These errors indicate a programming error and should be fixed at development time.
    Configuration(String),

    /// Provider-specific business logic errors (e.g., model overloaded, audio rejected).
    Provider(String),

    /// Operation exceeded the configured or provider-enforced timeout period.
    Timeout(String),

    /// Failed to serialize data into the provider's request shape.
    Serialization(String),

    /// The provider's reply could not be deserialized into the expected shape.
    /// The offending payload is carried for diagnostics.
    Deserialization { message: String, raw: String },

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization { message, raw } => {
                write!(f, "Deserialization error: {} (raw reply: {})", message, raw)
            }
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
