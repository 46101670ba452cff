//! Error types for the introspection library.

use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// A column type matched no registered pattern.
    #[error("Unknown column type: {0}")]
    UnknownType(String),

    /// A fixed-field connection-info query failed during metadata capture.
    /// Fatal for connection setup.
    #[error("Connection metadata unavailable for {field}: {message}")]
    MetadataUnavailable { field: &'static str, message: String },

    /// The operation is disabled for the active dialect.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A type-name pattern failed to compile at registry build time.
    #[error("Invalid type pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Driver or transport failure. Propagated unchanged; retry policy (if
    /// any) belongs to the transport layer.
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntrospectError {
    /// Wrap a driver-side failure.
    pub fn driver(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        IntrospectError::Driver(Box::new(source))
    }

    /// Wrap a driver-side failure described only by a message.
    pub fn driver_msg(message: impl Into<String>) -> Self {
        IntrospectError::Driver(message.into().into())
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;
