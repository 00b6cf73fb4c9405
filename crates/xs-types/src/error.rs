//! Error types for XS Terminal.

use std::io;

/// Errors produced by the XS Terminal crates.
#[derive(Debug, thiserror::Error)]
pub enum XsError {
    /// Malformed identifier or path, rejected before any I/O.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A path or remote subtree does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service refused the request (forbidden or rate limited).
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Network-level failure outside the expected response shapes.
    #[error("transport error: {0}")]
    Transport(String),

    /// The persistent store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A clone of the same repository is already running.
    #[error("clone already in progress: {0}")]
    InProgress(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, XsError>;
