//! # Configuration Precedence
//!
//! Combines file and runtime configuration into one resolved config per
//! cluster.
//!
//! # Precedence Order
//! 1. Runtime per-cluster config, e.g. `--cluster` flags (highest priority)
//! 2. File per-cluster config (`clusters.<id>`)
//! 3. Runtime defaults, e.g. `--cluster-defaults`
//! 4. File defaults (`defaults`, lowest priority)

use crate::config::Config;
use crate::file_config::FileConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One source of cluster configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    FileDefaults,
    RuntimeDefaults,
    FileCluster,
    RuntimeCluster,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FileDefaults => "file defaults",
            Self::RuntimeDefaults => "runtime defaults",
            Self::FileCluster => "file cluster",
            Self::RuntimeCluster => "runtime cluster",
        };
        f.write_str(name)
    }
}

/// Resolve every cluster known to the file or the runtime configs.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Produces one config per cluster id found in `fc.clusters` or
/// `runtime_configs`, layering file defaults, runtime defaults, the file's
/// cluster block, and the runtime cluster config in that order.
///
/// ## Usage
/// ```rust
/// use cluster_config::{combine, Config, FileConfig};
/// use std::collections::BTreeMap;
///
/// let fc = FileConfig::from_yaml_str("defaults:\n  discovery: consul\nclusters:\n  c1:\n    name: one\n").unwrap();
/// let runtime_defaults: Config = "discovery=staticfile".parse().unwrap();
///
/// let resolved = combine(&fc, &runtime_defaults, &BTreeMap::new());
/// assert_eq!(resolved[0].discovery_impl, "staticfile");
/// ```
///
/// ## Semantics
/// - Non-empty scalars from a higher layer win; empty scalars never clear
/// - Flag maps merge key by key, two levels deep for discovery flags
/// - `id` is always the cluster's key
/// - Results are sorted by id and own all of their data
///
/// Combination never fails.
pub fn combine(
    fc: &FileConfig,
    runtime_defaults: &Config,
    runtime_configs: &BTreeMap<String, Config>,
) -> Vec<Config> {
    let mut defaults = merge_with_logging(Config::default(), &fc.defaults, Layer::FileDefaults);
    defaults = merge_with_logging(defaults, runtime_defaults, Layer::RuntimeDefaults);

    let ids: BTreeSet<&String> = fc.clusters.keys().chain(runtime_configs.keys()).collect();

    ids.into_iter()
        .map(|id| {
            let mut resolved = defaults.clone();

            if let Some(file_cluster) = fc.clusters.get(id) {
                resolved = merge_with_logging(resolved, file_cluster, Layer::FileCluster);
            }
            if let Some(runtime_cluster) = runtime_configs.get(id) {
                resolved = merge_with_logging(resolved, runtime_cluster, Layer::RuntimeCluster);
            }

            resolved.id.clone_from(id);
            tracing::debug!(cluster = %resolved, "Resolved cluster configuration");
            resolved
        })
        .collect()
}

impl FileConfig {
    /// See [`combine`].
    pub fn combine(
        &self,
        runtime_defaults: &Config,
        runtime_configs: &BTreeMap<String, Config>,
    ) -> Vec<Config> {
        combine(self, runtime_defaults, runtime_configs)
    }
}

fn merge_with_logging(base: Config, override_config: &Config, layer: Layer) -> Config {
    let merged = base.merge(override_config);

    let changes = config_changes(&base, &merged);
    if !changes.is_empty() {
        tracing::debug!("Configuration from {}: {:?}", layer, changes);
    }

    merged
}

fn config_changes(before: &Config, after: &Config) -> Vec<String> {
    let previous: BTreeMap<String, &str> = before
        .entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    after
        .entries()
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.to_string();
            (previous.get(&key) != Some(&value)).then(|| format!("{key} = {value}"))
        })
        .collect()
}
