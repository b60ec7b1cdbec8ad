//! Linkscout: recursive reference checking core
//!
//! This crate classifies reference strings into protocol variants, decides
//! whether each reference lies inside or outside the operator-defined checked
//! boundary, and drives the check loop that aggregates per-reference outcomes.
//! The byte-level protocol work (fetching, parsing) is delegated to transport
//! collaborators; the crate itself performs no network I/O.

pub mod config;
pub mod reference;
pub mod scheduler;
pub mod scheme;
pub mod scope;
pub mod session;

use thiserror::Error;

/// Transport family a protocol-level failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Http,
    Ftp,
    Mail,
    News,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::Ftp => "ftp",
            Self::Mail => "mail",
            Self::News => "news",
        };
        f.write_str(name)
    }
}

/// Recoverable check failures
///
/// This is the closed allowlist of failures a variant's check may report.
/// Transport adapters translate their native error types into one of these at
/// their own boundary. A failure that fits none of them is not recoverable and
/// must surface as [`TransportError::Fatal`] instead.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeout while checking {url}")]
    Timeout { url: String },

    #[error("connection failure for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("malformed address {url}: {message}")]
    MalformedAddress { url: String, message: String },

    #[error("response for {url} ended prematurely")]
    Truncated { url: String },

    #[error("{transport} protocol error for {url}: {message}")]
    Protocol {
        transport: TransportKind,
        url: String,
        message: String,
    },
}

/// Failure surface of a transport adapter
///
/// `Check` carries a recoverable failure from the closed taxonomy and is
/// recorded on the reference; `Fatal` indicates a defect in the adapter itself
/// and propagates out of the run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("fatal transport failure: {0}")]
    Fatal(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that terminate the check loop
#[derive(Debug, Error)]
pub enum RunError {
    /// Operator-initiated cancellation; drives the abort path.
    #[error("check run cancelled")]
    Cancelled,

    /// Anything outside the recoverable taxonomy. The scheduler never catches
    /// this; it propagates to the caller.
    #[error("fatal error: {0}")]
    Fatal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RunError {
    /// Wraps an arbitrary error as a fatal, non-recoverable run error
    pub fn fatal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fatal(Box::new(err))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid scope pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),
}

/// Result type alias for transport check operations
pub type TransportResult = std::result::Result<session::CheckReport, TransportError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use reference::{build_reference, resolve_absolute, Origin, Reference};
pub use scheduler::{run_checks, RunOutcome};
pub use scheme::LinkKind;
pub use scope::{Scope, ScopeRule, ScopeSet};
pub use session::{Session, StandardSession, Transport};
