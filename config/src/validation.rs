//! # Configuration Validation
//!
//! Checks resolved cluster configs with the `validator` crate before they are
//! handed to cluster initialization.

use crate::config::Config;
use validator::{Validate, ValidationErrors};

/// Validate one resolved cluster config.
///
/// ## Validation Rules
/// - `id`: at least 1 character
/// - `discovery_impl`: one of [`crate::KNOWN_DISCOVERY_IMPLS`]
pub fn validate(config: &Config) -> Result<(), ValidationErrors> {
    config.validate()
}

/// Validate every resolved cluster, collecting the failures by cluster id.
pub fn validate_clusters(configs: &[Config]) -> Result<(), Vec<(String, ValidationErrors)>> {
    let failures: Vec<(String, ValidationErrors)> = configs
        .iter()
        .filter_map(|cfg| validate(cfg).err().map(|errors| (cfg.id.clone(), errors)))
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
