//! # Cluster Configuration
//!
//! Resolves vtadmin cluster configuration from a cluster file and from
//! runtime (command-line) settings.
//!
//! This crate provides:
//! - The per-cluster [`Config`] structure
//! - Parsing of flattened keys (`discovery-<impl>-<flag>`, `vtsql-<flag>`)
//! - Cluster file decoding (YAML/TOML) into a [`FileConfig`]
//! - Configuration precedence (runtime cluster > file cluster > runtime
//!   defaults > file defaults)
//! - Validation of resolved configs

pub mod config;
pub mod file_config;
pub mod file_loader;
pub mod key;
pub mod precedence;
pub mod validation;

pub use config::{Config, FlagsByImpl, KNOWN_DISCOVERY_IMPLS, merge_flags_by_impl};
pub use errors::{DecodeError, FlagError};
pub use file_config::FileConfig;
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use key::{ClustersFlag, ConfigKey};
pub use precedence::{Layer, combine};
pub use validation::{validate, validate_clusters};
