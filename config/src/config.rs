//! # Cluster Configuration Structures
//!
//! This module defines the per-cluster configuration shared by every layer of
//! the resolver: file defaults, runtime defaults, and per-cluster overrides.
//!
//! All mappings are owned `BTreeMap`s. Merging always allocates fresh maps and
//! copies key by key, so a resolved configuration never shares state with the
//! layers it was built from.

use crate::key::ConfigKey;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// Flags for each discovery implementation, keyed by implementation name and
/// then by flag name.
pub type FlagsByImpl = BTreeMap<String, BTreeMap<String, String>>;

/// Discovery implementations the admin tool knows how to construct.
pub const KNOWN_DISCOVERY_IMPLS: &[&str] = &["consul", "staticfile", "zk"];

/// Configuration for a single cluster.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Holds one cluster's settings. The same shape is used for partial layers
/// (where empty values mean "inherit") and for fully resolved output.
///
/// ## Usage
/// ```rust
/// use cluster_config::Config;
///
/// let cfg: Config = "id=c1,name=prod,discovery=consul".parse().unwrap();
/// assert_eq!(cfg.discovery_impl, "consul");
/// ```
///
/// ## Fields
/// - `id`: Cluster identity, always taken from the key the config is stored under
/// - `name`: Human-readable cluster name
/// - `discovery_impl`: Selected discovery backend, empty means unset
/// - `discovery_flags_by_impl`: Flags per discovery backend
/// - `vtsql_flags`: Flags for the cluster's vtsql proxy
///
/// ## Serialization
/// Serializes to the flattened document shape (`discovery-<impl>-<flag>`,
/// `vtsql-<flag>`) so resolved output can be read back as a cluster block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct Config {
    #[validate(length(min = 1))]
    pub id: String,

    pub name: String,

    #[validate(custom(function = "validate_discovery_impl"))]
    pub discovery_impl: String,

    pub discovery_flags_by_impl: FlagsByImpl,

    pub vtsql_flags: BTreeMap<String, String>,
}

fn validate_discovery_impl(value: &str) -> Result<(), validator::ValidationError> {
    if KNOWN_DISCOVERY_IMPLS.contains(&value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_discovery_impl"))
    }
}

impl Config {
    /// Combine `self` with a higher-precedence `override_config`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Produces a new configuration where:
    /// - non-empty scalars (`id`, `name`, `discovery_impl`) from the override win
    /// - map entries are merged key by key, the override winning on conflicts
    /// - `discovery_flags_by_impl` merges two levels deep
    ///
    /// ## Ownership
    /// Neither input is modified and the result owns freshly allocated maps.
    pub fn merge(&self, override_config: &Config) -> Config {
        let mut merged = Config {
            id: self.id.clone(),
            name: self.name.clone(),
            discovery_impl: self.discovery_impl.clone(),
            discovery_flags_by_impl: FlagsByImpl::new(),
            vtsql_flags: BTreeMap::new(),
        };

        if !override_config.id.is_empty() {
            merged.id.clone_from(&override_config.id);
        }
        if !override_config.name.is_empty() {
            merged.name.clone_from(&override_config.name);
        }
        if !override_config.discovery_impl.is_empty() {
            merged
                .discovery_impl
                .clone_from(&override_config.discovery_impl);
        }

        merge_flags_by_impl(
            &mut merged.discovery_flags_by_impl,
            &self.discovery_flags_by_impl,
        );
        merge_flags_by_impl(
            &mut merged.discovery_flags_by_impl,
            &override_config.discovery_flags_by_impl,
        );

        merge_string_map(&mut merged.vtsql_flags, &self.vtsql_flags);
        merge_string_map(&mut merged.vtsql_flags, &override_config.vtsql_flags);

        merged
    }

    /// Flags configured for one discovery implementation, if any.
    pub fn discovery_flags(&self, implementation: &str) -> Option<&BTreeMap<String, String>> {
        self.discovery_flags_by_impl.get(implementation)
    }

    /// Flattened view of every set value, in document key form.
    ///
    /// Empty scalars are omitted. Map entries are always listed, even with an
    /// empty value.
    pub fn entries(&self) -> Vec<(ConfigKey, &str)> {
        let mut entries = Vec::new();

        if !self.id.is_empty() {
            entries.push((ConfigKey::Id, self.id.as_str()));
        }
        if !self.name.is_empty() {
            entries.push((ConfigKey::Name, self.name.as_str()));
        }
        if !self.discovery_impl.is_empty() {
            entries.push((ConfigKey::Discovery, self.discovery_impl.as_str()));
        }

        for (implementation, flags) in &self.discovery_flags_by_impl {
            for (flag, value) in flags {
                entries.push((
                    ConfigKey::DiscoveryFlag {
                        implementation: implementation.clone(),
                        flag: flag.clone(),
                    },
                    value.as_str(),
                ));
            }
        }

        for (flag, value) in &self.vtsql_flags {
            entries.push((ConfigKey::VtSqlFlag(flag.clone()), value.as_str()));
        }

        entries
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster(id={}, name={})", self.id, self.name)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in &entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

/// Copy every flag of `src` into `dst`, creating per-implementation maps as
/// needed. Existing flags in `dst` are overwritten.
pub fn merge_flags_by_impl(dst: &mut FlagsByImpl, src: &FlagsByImpl) {
    for (implementation, flags) in src {
        let target = dst.entry(implementation.clone()).or_default();
        merge_string_map(target, flags);
    }
}

fn merge_string_map(dst: &mut BTreeMap<String, String>, src: &BTreeMap<String, String>) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_merge_scalars_only_when_set() {
        let base = Config {
            id: "c1".to_string(),
            name: "base".to_string(),
            discovery_impl: "consul".to_string(),
            ..Default::default()
        };
        let override_config = Config {
            name: "override".to_string(),
            ..Default::default()
        };

        let merged = base.merge(&override_config);

        assert_eq!(merged.id, "c1");
        assert_eq!(merged.name, "override");
        assert_eq!(merged.discovery_impl, "consul");
    }

    #[test]
    fn test_merge_flags_two_levels_deep() {
        let mut base = Config::default();
        base.discovery_flags_by_impl.insert(
            "consul".to_string(),
            flags(&[("vtgate-service-name", "vtgate"), ("vtgate-pool-tag", "type")]),
        );
        base.vtsql_flags = flags(&[("credentials-path", "/etc/creds")]);

        let mut override_config = Config::default();
        override_config
            .discovery_flags_by_impl
            .insert("consul".to_string(), flags(&[("vtgate-service-name", "vtgate-svc")]));
        override_config
            .discovery_flags_by_impl
            .insert("zk".to_string(), flags(&[("root", "/vitess")]));

        let merged = base.merge(&override_config);

        assert_eq!(
            merged.discovery_flags("consul"),
            Some(&flags(&[
                ("vtgate-service-name", "vtgate-svc"),
                ("vtgate-pool-tag", "type"),
            ])),
        );
        assert_eq!(merged.discovery_flags("zk"), Some(&flags(&[("root", "/vitess")])));
        assert_eq!(merged.vtsql_flags, flags(&[("credentials-path", "/etc/creds")]));
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let mut base = Config::default();
        base.discovery_flags_by_impl
            .insert("consul".to_string(), flags(&[("flag", "base")]));
        let base_before = base.clone();

        let mut merged = base.merge(&Config::default());
        merged
            .discovery_flags_by_impl
            .get_mut("consul")
            .unwrap()
            .insert("flag".to_string(), "changed".to_string());

        assert_eq!(base, base_before);
    }

    #[test]
    fn test_entries_flatten_keys() {
        let mut cfg = Config {
            id: "c1".to_string(),
            discovery_impl: "consul".to_string(),
            ..Default::default()
        };
        cfg.discovery_flags_by_impl
            .insert("consul".to_string(), flags(&[("vtgate-cell-tag", "zone")]));
        cfg.vtsql_flags = flags(&[("credentials-path", "/creds")]);

        let keys: Vec<String> = cfg.entries().iter().map(|(k, _)| k.to_string()).collect();

        assert_eq!(
            keys,
            vec![
                "id",
                "discovery",
                "discovery-consul-vtgate-cell-tag",
                "vtsql-credentials-path",
            ],
        );
    }

    #[test]
    fn test_serialize_flattened_yaml() {
        let mut cfg = Config {
            id: "c1".to_string(),
            name: "one".to_string(),
            ..Default::default()
        };
        cfg.discovery_flags_by_impl
            .insert("consul".to_string(), flags(&[("vtgate-pool-tag", "type")]));

        let yaml = serde_yaml::to_string(&cfg).unwrap();

        assert!(yaml.contains("id: c1"));
        assert!(yaml.contains("name: one"));
        assert!(yaml.contains("discovery-consul-vtgate-pool-tag: type"));
        assert!(!yaml.contains("discovery:"));
    }

    #[test]
    fn test_display() {
        let cfg = Config {
            id: "c1".to_string(),
            name: "testcluster1".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.to_string(), "cluster(id=c1, name=testcluster1)");
    }

    #[test]
    fn test_validate_discovery_impl() {
        let valid = Config {
            id: "c1".to_string(),
            discovery_impl: "consul".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let unknown = Config {
            id: "c1".to_string(),
            discovery_impl: "etcd".to_string(),
            ..Default::default()
        };
        assert!(unknown.validate().is_err());

        let missing_id = Config {
            discovery_impl: "staticfile".to_string(),
            ..Default::default()
        };
        assert!(missing_id.validate().is_err());
    }

    #[test]
    fn test_validate_every_known_discovery_impl() {
        for discovery in ["consul", "staticfile", "zk"] {
            let cfg = Config {
                id: "c1".to_string(),
                discovery_impl: discovery.to_string(),
                ..Default::default()
            };
            assert!(cfg.validate().is_ok(), "{discovery}");
        }
    }
}
