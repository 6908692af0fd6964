//! Error types for alchemy-core

use thiserror::Error;

/// Result type alias for alchemy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in alchemy-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse the project configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// A node library file is not valid YAML for a descriptor
    #[error("failed to parse node library file {path}: {source}")]
    LibraryParse {
        /// The offending file
        path: String,
        /// Underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },

    /// A node library entry is not a usable descriptor
    #[error("invalid node definition '{type_key}': {message}")]
    InvalidDefinition {
        /// Type key of the offending definition
        type_key: String,
        /// Description of the error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
