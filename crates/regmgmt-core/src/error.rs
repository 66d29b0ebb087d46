//! Error types for regmgmt-core

use std::path::PathBuf;

use crate::value::ValueKind;

/// Result type for regmgmt-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in regmgmt-core operations
///
/// The first four variants are evaluation-time failures and are always
/// contained to a single setting. The rest only occur while loading
/// configuration or snapshots, before any evaluation starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registry path or value could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Declared value cannot be coerced into the on-disk representation
    #[error("Invalid {kind} value '{value}': {reason}")]
    InvalidValueFormat {
        kind: ValueKind,
        value: String,
        reason: String,
    },

    /// Registry write or delete was rejected
    #[error("Write to {path} failed: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The post-remediation check disagrees with the declared state
    #[error("Verification failed for {target}: {detail}")]
    VerificationFailed { target: String, detail: String },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A declared setting or group is malformed
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    /// A registry path could not be interpreted
    #[error("Invalid registry path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
