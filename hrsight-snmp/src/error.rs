use thiserror::Error;

use crate::value::BindingError;

/// Result type alias using [`QueryError`].
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that fail a whole query.
///
/// Per-binding protocol errors and incomplete rows never show up here: they are
/// absorbed by the joiner and the calculators.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid request parameters, detected before any session is opened.
    #[error("{0}")]
    Config(String),

    /// The session could not be opened.
    #[error("Failed to open SNMP session to {target}: {message}")]
    Connect { target: String, message: String },

    /// A request exhausted its configured retries.
    #[error("SNMP request for {oid} timed out after {attempts} attempt(s)")]
    Timeout { oid: String, attempts: u32 },

    /// The agent or transport rejected a request.
    #[error("SNMP request for {oid} failed: {message}")]
    Request { oid: String, message: String },

    /// A single-instance value was reported as an error binding.
    #[error("{oid}: {kind}")]
    Binding { oid: String, kind: BindingError },
}

impl QueryError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error was raised before talking to the device.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
