//! Error types for tessera
//!
//! This module defines every error raised by the state layer and the
//! invocation dispatcher. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.
//!
//! None of these errors are retried internally: each one aborts the
//! invocation frame it was raised in, and the frame is rolled back.

use crate::types::Name;
use thiserror::Error;

/// Result type alias for tessera operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the contract state layer
#[derive(Debug, Error)]
pub enum Error {
    /// Read or update of a primary key that has no record
    #[error("Record not found in table '{table}': {key}")]
    RecordNotFound {
        /// Table name
        table: String,
        /// Debug rendering of the primary key
        key: String,
    },

    /// Insert of a primary key that already has a record
    #[error("Duplicate key in table '{table}': {key}")]
    DuplicateKey {
        /// Table name
        table: String,
        /// Debug rendering of the primary key
        key: String,
    },

    /// Stored or transmitted bytes could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An update mutator changed the primary key field
    #[error("Primary key of table '{table}' changed during update: {from} -> {to}")]
    PrimaryKeyChanged {
        /// Table name
        table: String,
        /// Key before the mutator ran
        from: String,
        /// Key after the mutator ran
        to: String,
    },

    /// Secondary index lookup on an index the table does not declare
    #[error("Table '{table}' has no index named '{index}'")]
    UnknownIndex {
        /// Table name
        table: String,
        /// Requested index
        index: String,
    },

    /// Invalid table or singleton declaration
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Target contract or method could not be resolved
    #[error("Method not found: {contract}::{method}")]
    MethodNotFound {
        /// Target contract
        contract: Name,
        /// Requested method
        method: String,
    },

    /// A contract with this name is already deployed
    #[error("Contract already deployed: {0}")]
    ContractExists(Name),

    /// Caller cannot cover the transferred amount
    #[error("Insufficient resources in '{account}': required {required}, available {available}")]
    InsufficientResources {
        /// Debited account
        account: Name,
        /// Amount requested
        required: u64,
        /// Balance at the time of the request
        available: u64,
    },

    /// A nested invocation failed and was rolled back
    #[error("Invocation of {contract}::{method} failed: {source}")]
    InvocationFailure {
        /// Target contract of the failed call
        contract: Name,
        /// Method of the failed call
        method: String,
        /// The error raised inside the nested frame
        #[source]
        source: Box<Error>,
    },

    /// Nesting limit reached
    #[error("Call depth {depth} exceeds maximum of {max}")]
    CallDepthExceeded {
        /// Depth of the stack when the call was attempted
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// Contract code aborted the current frame
    #[error("Aborted: {0}")]
    Aborted(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Abort the current frame with a message
    pub fn abort(message: impl Into<String>) -> Self {
        Error::Aborted(message.into())
    }

    /// True for [`Error::RecordNotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RecordNotFound { .. })
    }

    /// Innermost cause, looking through nested invocation failures
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InvocationFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
