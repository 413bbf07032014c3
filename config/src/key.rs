//! # Configuration Keys
//!
//! Parses the flat keys used by cluster documents and command-line flags into
//! a typed [`ConfigKey`], and applies them to a [`Config`].
//!
//! # Key Forms
//! - `id`, `name`, `discovery`
//! - `discovery-<impl>-<flag>`: a flag for one discovery implementation,
//!   where `<impl>` is made of word characters
//! - `vtsql-<flag>`: a vtsql flag, stored without its prefix
//!
//! # Flag Values
//! Command-line values are comma-separated `key=value` pairs, e.g.
//! `id=c1,name=prod,discovery=consul,discovery-consul-vtgate-service-name=vtgate`.
//! A key without `=` is set to `"true"`.

use crate::config::Config;
use errors::FlagError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const DISCOVERY_PREFIX: &str = "discovery-";
const VTSQL_PREFIX: &str = "vtsql-";

/// A parsed configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKey {
    Id,
    Name,
    Discovery,
    DiscoveryFlag { implementation: String, flag: String },
    VtSqlFlag(String),
    /// Not a recognized key; applying it is a no-op.
    Unknown(String),
}

impl ConfigKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "id" => return Self::Id,
            "name" => return Self::Name,
            "discovery" => return Self::Discovery,
            _ => {}
        }

        if let Some(flag) = key.strip_prefix(VTSQL_PREFIX) {
            if !flag.is_empty() {
                return Self::VtSqlFlag(flag.to_string());
            }
        }

        if let Some((implementation, flag)) = key
            .strip_prefix(DISCOVERY_PREFIX)
            .and_then(|rest| rest.split_once('-'))
        {
            if is_word(implementation) && !flag.is_empty() {
                return Self::DiscoveryFlag {
                    implementation: implementation.to_string(),
                    flag: flag.to_string(),
                };
            }
        }

        Self::Unknown(key.to_string())
    }

    /// Store `value` in the field of `cfg` this key addresses.
    pub fn apply(self, cfg: &mut Config, value: String) {
        match self {
            Self::Id => cfg.id = value,
            Self::Name => cfg.name = value,
            Self::Discovery => cfg.discovery_impl = value,
            Self::DiscoveryFlag {
                implementation,
                flag,
            } => {
                cfg.discovery_flags_by_impl
                    .entry(implementation)
                    .or_default()
                    .insert(flag, value);
            }
            Self::VtSqlFlag(flag) => {
                cfg.vtsql_flags.insert(flag, value);
            }
            Self::Unknown(key) => {
                tracing::warn!(key = %key, "Ignoring unrecognized cluster config key");
            }
        }
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Name => f.write_str("name"),
            Self::Discovery => f.write_str("discovery"),
            Self::DiscoveryFlag {
                implementation,
                flag,
            } => write!(f, "{DISCOVERY_PREFIX}{implementation}-{flag}"),
            Self::VtSqlFlag(flag) => write!(f, "{VTSQL_PREFIX}{flag}"),
            Self::Unknown(key) => f.write_str(key),
        }
    }
}

impl FromStr for Config {
    type Err = FlagError;

    /// Parse a `key=value,...` flag value into a partial config.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut cfg = Config::default();

        for arg in value.split(',').filter(|arg| !arg.is_empty()) {
            let (key, val) = arg.split_once('=').unwrap_or((arg, "true"));
            let key = key.trim();
            if key.is_empty() {
                return Err(FlagError::EmptyKey {
                    value: value.to_string(),
                });
            }
            ConfigKey::parse(key).apply(&mut cfg, val.to_string());
        }

        Ok(cfg)
    }
}

/// Per-cluster configs collected from repeated `--cluster` flags, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClustersFlag {
    configs: BTreeMap<String, Config>,
}

impl ClustersFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one flag value and add it.
    pub fn set(&mut self, value: &str) -> Result<(), FlagError> {
        let cfg: Config = value.parse()?;
        if cfg.id.is_empty() {
            return Err(FlagError::MissingId {
                value: value.to_string(),
            });
        }
        self.insert(cfg);
        Ok(())
    }

    /// Add an already parsed config. A config for an id that was seen before
    /// is merged over the earlier one.
    pub fn insert(&mut self, cfg: Config) {
        let merged = match self.configs.remove(&cfg.id) {
            Some(existing) => existing.merge(&cfg),
            None => cfg,
        };
        self.configs.insert(merged.id.clone(), merged);
    }

    pub fn get(&self, id: &str) -> Option<&Config> {
        self.configs.get(id)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Config> {
        &self.configs
    }

    pub fn into_map(self) -> BTreeMap<String, Config> {
        self.configs
    }
}

impl fmt::Display for ClustersFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}
