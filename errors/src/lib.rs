//! # Cluster Configuration Errors
//!
//! Error types shared by the cluster configuration crates.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields on every variant so messages carry their context

use thiserror::Error;

/// Errors raised while decoding a cluster configuration document.
///
/// Decoding is all-or-nothing: any of these aborts the whole document and no
/// partial configuration is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed {format} document: {reason}")]
    Syntax { format: String, reason: String },

    #[error("Unsupported value for key {key}: {reason}")]
    UnsupportedValue { key: String, reason: String },
}

impl DecodeError {
    pub fn yaml(err: impl std::fmt::Display) -> Self {
        Self::Syntax {
            format: "YAML".to_string(),
            reason: err.to_string(),
        }
    }

    pub fn toml(err: impl std::fmt::Display) -> Self {
        Self::Syntax {
            format: "TOML".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Errors raised while parsing a `key=value,...` cluster flag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("Cluster flag is missing an id: {value}")]
    MissingId { value: String },

    #[error("Cluster flag has an empty key: {value}")]
    EmptyKey { value: String },
}
