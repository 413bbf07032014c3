//! # Cluster File Loading
//!
//! Loads a cluster configuration file from disk.
//!
//! Supports automatic format detection based on file extension.

use crate::file_config::FileConfig;
use errors::DecodeError;
use std::path::Path;

/// Cluster file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigFileError::FileNotFound(path.display().to_string()),
        _ => ConfigFileError::Io(e),
    })
}

/// Load a cluster file in YAML format.
///
/// # M-CANONICAL-DOCS
///
/// ## Usage
/// ```rust,no_run
/// use cluster_config::load_from_yaml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fc = load_from_yaml(Path::new("clusters.yaml"))?;
///     println!("{} clusters", fc.clusters.len());
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `ConfigFileError` for:
/// - File not found
/// - Invalid YAML syntax or non-scalar values
pub fn load_from_yaml(path: &Path) -> Result<FileConfig, ConfigFileError> {
    let contents = read(path)?;
    let fc = FileConfig::from_yaml_str(&contents)?;
    tracing::info!(
        path = %path.display(),
        clusters = fc.clusters.len(),
        "Loaded cluster config file",
    );
    Ok(fc)
}

/// Load a cluster file in TOML format.
pub fn load_from_toml(path: &Path) -> Result<FileConfig, ConfigFileError> {
    let contents = read(path)?;
    let fc = FileConfig::from_toml_str(&contents)?;
    tracing::info!(
        path = %path.display(),
        clusters = fc.clusters.len(),
        "Loaded cluster config file",
    );
    Ok(fc)
}

/// Load a cluster file, detecting the format from its extension.
///
/// ## Supported Formats
/// - `.yaml`, `.yml`: YAML
/// - `.toml`: TOML
pub fn load_from_file(path: &Path) -> Result<FileConfig, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_from_yaml(path),
        "toml" => load_from_toml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string())),
    }
}
