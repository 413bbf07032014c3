//! # Cluster File Configuration
//!
//! Decodes a cluster document into a [`FileConfig`]: one block of defaults
//! plus one block per named cluster.
//!
//! ```yaml
//! defaults:
//!     discovery: consul
//!     discovery-consul-vtgate-service-name: vtgate-svc
//!
//! clusters:
//!     c1:
//!         name: testcluster1
//!         discovery-consul-vtgate-datacenter-tmpl: "dev-{{ .Cluster }}-test"
//!     c2:
//!         name: devcluster
//! ```
//!
//! Every block is a flat map of scalar values. Keys are interpreted by
//! [`ConfigKey`]; the key a cluster is stored under always becomes its `id`.

use crate::config::Config;
use crate::key::ConfigKey;
use errors::DecodeError;
use serde::de::{self, Deserializer, IgnoredAny, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cluster configuration as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFileConfig")]
pub struct FileConfig {
    /// File-level defaults applied to every cluster.
    pub defaults: Config,

    /// Per-cluster overrides, keyed by cluster id.
    pub clusters: BTreeMap<String, Config>,
}

/// A flat block as it appears in the document, before keys are interpreted.
type RawBlock = BTreeMap<ScalarValue, BlockValue>;

#[derive(Deserialize)]
struct RawFileConfig {
    #[serde(default)]
    defaults: Option<RawBlock>,

    #[serde(default)]
    clusters: Option<BTreeMap<ScalarValue, Option<RawBlock>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlockValue {
    Scalar(ScalarValue),
    Sequence(Vec<IgnoredAny>),
    Map(IgnoredAny),
}

impl TryFrom<RawFileConfig> for FileConfig {
    type Error = DecodeError;

    fn try_from(raw: RawFileConfig) -> Result<Self, Self::Error> {
        let defaults = match raw.defaults {
            Some(block) => block_to_config("defaults", block)?,
            None => Config::default(),
        };

        let mut clusters = BTreeMap::new();
        for (ScalarValue(id), block) in raw.clusters.unwrap_or_default() {
            let mut cfg = match block {
                Some(block) => block_to_config(&format!("clusters.{id}"), block)?,
                None => Config::default(),
            };
            cfg.id.clone_from(&id);
            clusters.insert(id, cfg);
        }

        Ok(Self { defaults, clusters })
    }
}

/// Interpret every key of `block`. `path` locates the block in the document
/// and prefixes the key named by an `UnsupportedValue` error.
fn block_to_config(path: &str, block: RawBlock) -> Result<Config, DecodeError> {
    let mut cfg = Config::default();

    for (ScalarValue(key), value) in block {
        let found = match value {
            BlockValue::Scalar(ScalarValue(value)) => {
                ConfigKey::parse(&key).apply(&mut cfg, value);
                continue;
            }
            BlockValue::Sequence(_) => "a sequence",
            BlockValue::Map(_) => "a map",
        };

        let key = if path.is_empty() {
            key
        } else {
            format!("{path}.{key}")
        };
        return Err(DecodeError::UnsupportedValue {
            key,
            reason: format!("expected a scalar flag value, found {found}"),
        });
    }

    Ok(cfg)
}

impl FileConfig {
    /// Decode a YAML cluster document.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Parses the `defaults` and `clusters` sections, un-flattening
    /// `discovery-<impl>-<flag>` and `vtsql-<flag>` keys and assigning each
    /// cluster its map key as `id`. Merge keys (`<<: *anchor`) are resolved
    /// before any block is interpreted.
    ///
    /// ## Usage
    /// ```rust
    /// use cluster_config::FileConfig;
    ///
    /// let fc = FileConfig::from_yaml_str("clusters:\n  c1:\n    name: one\n").unwrap();
    /// assert_eq!(fc.clusters["c1"].id, "c1");
    /// ```
    ///
    /// ## Error Handling
    /// Returns `DecodeError::Syntax` for malformed YAML and
    /// `DecodeError::UnsupportedValue` for a map or sequence where a flag
    /// value belongs. Nothing is returned on failure. An empty document
    /// decodes to an empty config.
    pub fn from_yaml_str(contents: &str) -> Result<Self, DecodeError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut value: serde_yaml::Value =
            serde_yaml::from_str(contents).map_err(DecodeError::yaml)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        value.apply_merge().map_err(DecodeError::yaml)?;

        let raw: RawFileConfig = serde_yaml::from_value(value).map_err(DecodeError::yaml)?;
        Self::try_from(raw)
    }

    /// Decode a TOML cluster document with the same shape as the YAML form.
    pub fn from_toml_str(contents: &str) -> Result<Self, DecodeError> {
        let raw: RawFileConfig = toml::from_str(contents).map_err(DecodeError::toml)?;
        Self::try_from(raw)
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let block = RawBlock::deserialize(deserializer)?;
        block_to_config("", block).map_err(de::Error::custom)
    }
}

/// A key or block value rendered to its string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ScalarValue(String);

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor).map(ScalarValue)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar flag value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}
