pub mod check;
pub mod resolve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cluster_config::{ClustersFlag, Config, FileConfig, load_from_file};

#[derive(Parser)]
#[command(
    name = "vtadmin-clusters",
    author,
    version,
    about = "Resolve vtadmin cluster configuration",
    long_about = "Combines a cluster config file with --cluster-defaults and --cluster flags.\n\n\
                  Precedence, lowest to highest: file defaults, --cluster-defaults, the file's \
                  cluster block, --cluster flags.",
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print the resolved configuration of every cluster")]
    Resolve(resolve::ResolveArgs),

    #[command(about = "Resolve and validate every cluster")]
    Check(check::CheckArgs),
}

/// Where cluster configuration comes from.
#[derive(Args, Debug, Default)]
pub struct ClusterSourceArgs {
    /// Path to a cluster config file (.yaml, .yml or .toml)
    #[arg(long = "cluster-config", value_name = "PATH")]
    pub cluster_config: Option<PathBuf>,

    /// Defaults for every cluster, e.g. "discovery=consul,discovery-consul-vtgate-service-name=vtgate"
    #[arg(
        long = "cluster-defaults",
        env = "VTADMIN_CLUSTER_DEFAULTS",
        value_name = "FLAGS",
    )]
    pub cluster_defaults: Option<Config>,

    /// Per-cluster config, e.g. "id=c1,name=prod,vtsql-credentials-path=/creds" (repeatable)
    #[arg(long = "cluster", value_name = "FLAGS")]
    pub clusters: Vec<String>,
}

impl ClusterSourceArgs {
    pub fn resolve(&self) -> Result<Vec<Config>> {
        let fc = match &self.cluster_config {
            Some(path) => load_from_file(path)
                .with_context(|| format!("failed to load cluster config {}", path.display()))?,
            None => FileConfig::default(),
        };

        let mut clusters = ClustersFlag::new();
        for value in &self.clusters {
            clusters
                .set(value)
                .with_context(|| format!("invalid --cluster value {value:?}"))?;
        }

        let defaults = self.cluster_defaults.clone().unwrap_or_default();
        let configs = fc.combine(&defaults, clusters.as_map());
        tracing::debug!(
            file_clusters = fc.clusters.len(),
            flag_clusters = clusters.len(),
            resolved = configs.len(),
            "Resolved cluster configuration",
        );
        Ok(configs)
    }
}
