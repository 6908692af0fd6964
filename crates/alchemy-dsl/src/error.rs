//! Error types for the DSL compiler

use alchemy_core::Diagnostic;
use thiserror::Error;

use crate::ast::Location;
use crate::token::Token;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// A grammar violation, carrying the offending token
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct SyntaxError {
    /// Error description
    pub message: String,
    /// Token the parser choked on
    pub token: Token,
}

/// Errors that can occur while compiling a source string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The token stream does not match the grammar
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A node definition is missing a name, type or kind
    #[error("{message}")]
    Validation {
        /// Error description, naming the node
        message: String,
        /// Location of the offending node definition
        location: Location,
    },

    /// A name could not be resolved, or the workspace block is missing
    #[error("{message}")]
    Resolution {
        /// Error description
        message: String,
        /// Location of the offending reference, when there is one
        location: Option<Location>,
    },

    /// The compile was superseded before it finished
    #[error("compile cancelled")]
    Cancelled,

    /// Anything unexpected (a panic caught at the pipeline boundary)
    #[error("internal compiler error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>, location: Location) -> Self {
        Error::Validation {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn resolution(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Resolution {
            message: message.into(),
            location,
        }
    }

    /// Convert to the user-facing diagnostic record
    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = match self {
            Error::Syntax(err) => Some(Location::new(err.token.line, err.token.column)),
            Error::Validation { location, .. } => Some(*location),
            Error::Resolution { location, .. } => *location,
            Error::Cancelled | Error::Internal(_) => None,
        };

        match location.filter(Location::is_known) {
            Some(loc) => Diagnostic::at(self.to_string(), loc.line, loc.column),
            None => Diagnostic::new(self.to_string()),
        }
    }
}
