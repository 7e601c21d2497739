//! Error types for hilite

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of definition a lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Syntax,
    Theme,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LookupKind::Syntax => "syntax",
            LookupKind::Theme => "theme",
        };
        f.write_str(name)
    }
}

/// Engine error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("No such {kind}: {name}")]
    NotFound { kind: LookupKind, name: String },

    #[error("Malformed grammar '{grammar}': {reason}")]
    MalformedGrammar { grammar: String, reason: String },

    #[error("Malformed theme '{theme}': {reason}")]
    MalformedTheme { theme: String, reason: String },

    #[error("Allocation failure")]
    AllocationFailure,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(kind: LookupKind, name: &str) -> Self {
        Error::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn grammar(grammar: &str, reason: impl Into<String>) -> Self {
        Error::MalformedGrammar {
            grammar: grammar.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn theme(theme: &str, reason: impl Into<String>) -> Self {
        Error::MalformedTheme {
            theme: theme.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::AllocationFailure
    }
}
