//! Error types for the jobconv core library
//!
//! Configuration and I/O problems are fatal and surface as [`Error`].
//! Data problems (missing columns, an unreadable taxonomy) and oracle
//! problems are recovered close to where they happen, so most of these
//! variants only ever reach a caller from loading code.

use std::fmt;
use thiserror::Error;

/// Main error type for jobconv operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed mapping document or tool configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Taxonomy table could not be loaded
    #[error("Taxonomy error: {message}")]
    Taxonomy {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Classification oracle call failed
    #[error("Oracle error: {message}")]
    Oracle {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Delimited text reading or writing failed
    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: csv::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error must abort a conversion run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Taxonomy { .. } | Error::Oracle { .. })
    }

    /// Coarse category used in logs and the CLI exit code table
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } | Error::Yaml { .. } => ErrorKind::Configuration,
            Error::Taxonomy { .. } => ErrorKind::Data,
            Error::Oracle { .. } => ErrorKind::ExternalDependency,
            Error::Csv { .. } | Error::Io { .. } => ErrorKind::Io,
            Error::Json { .. } | Error::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Data,
    ExternalDependency,
    Io,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Data => write!(f, "data"),
            ErrorKind::ExternalDependency => write!(f, "external-dependency"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

// Conversion implementations
impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
