//! Resolve command - print resolved cluster configuration
//!
//! Output is a cluster document (`clusters: {<id>: {...}}`) that can be fed
//! back in with `--cluster-config`.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use cluster_config::Config;
use serde::Serialize;

use super::ClusterSourceArgs;
use crate::ux_error;

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub sources: ClusterSourceArgs,

    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ResolvedDocument<'a> {
    clusters: BTreeMap<&'a str, &'a Config>,
}

impl<'a> ResolvedDocument<'a> {
    fn new(configs: &'a [Config]) -> Self {
        Self {
            clusters: configs.iter().map(|cfg| (cfg.id.as_str(), cfg)).collect(),
        }
    }
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let configs = args.sources.resolve()?;

    if configs.is_empty() {
        ux_error::no_clusters().display();
        anyhow::bail!("no clusters configured");
    }

    let document = ResolvedDocument::new(&configs);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", serde_yaml::to_string(&document)?);
    }

    Ok(())
}
