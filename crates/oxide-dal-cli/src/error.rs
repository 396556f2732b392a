//! Error types for the command-line tool.

use std::path::PathBuf;

/// Errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A `NAME[:TYPE]=VALUE` argument is malformed.
    #[error("Invalid parameter '{spec}': {message}")]
    InvalidParam {
        /// The argument as given.
        spec: String,
        /// What is wrong with it.
        message: String,
    },

    /// A type name does not match any logical type.
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A parameter value could not be converted to its type.
    #[error("Parameter {name}: {source}")]
    Binding {
        /// Parameter name.
        name: String,
        /// The conversion failure.
        source: oxide_dal_core::BindingError,
    },

    /// Data-access error.
    #[error(transparent)]
    Dal(#[from] oxide_dal_core::Error),

    /// The database could not be opened.
    #[error(transparent)]
    Open(#[from] oxide_dal_sqlite::SqliteError),

    /// IO error (reading scripts or parameter files).
    #[error("IO error on '{path}': {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for command-line operations.
pub type Result<T> = std::result::Result<T, CliError>;
