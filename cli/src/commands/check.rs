//! Check command - cluster validation
//!
//! Resolves every cluster and validates it before it would be handed to
//! cluster initialization:
//! - every cluster has an id
//! - every cluster selects a known discovery implementation

use anyhow::Result;
use clap::Args;
use cluster_config::{Config, KNOWN_DISCOVERY_IMPLS, validate_clusters};
use colored::Colorize;
use validator::ValidationErrors;

use super::ClusterSourceArgs;
use crate::output;
use crate::ux_error::{self, UxError};

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sources: ClusterSourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let configs = args.sources.resolve()?;

    if configs.is_empty() {
        ux_error::no_clusters().display();
        anyhow::bail!("no clusters configured");
    }

    let failures = validate_clusters(&configs).err().unwrap_or_default();

    if args.json {
        let output = serde_json::json!({
            "valid": failures.is_empty(),
            "clusters": configs.iter().map(|cfg| serde_json::json!({
                "id": cfg.id,
                "name": cfg.name,
                "discovery": cfg.discovery_impl,
            })).collect::<Vec<_>>(),
            "errors": failures.iter().map(|(id, errors)| serde_json::json!({
                "id": id,
                "error": errors.to_string(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&configs, &failures);
    }

    if !failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(configs: &[Config], failures: &[(String, ValidationErrors)]) {
    output::header("Cluster Configuration");
    println!();

    for cfg in configs {
        let discovery = if cfg.discovery_impl.is_empty() {
            "(unset)".to_string()
        } else {
            cfg.discovery_impl.clone()
        };
        let mark = if failures.iter().any(|(id, _)| id == &cfg.id) {
            "✗".red()
        } else {
            "✓".green()
        };
        println!(
            "  {} {} {} {}",
            mark,
            cfg.id.cyan(),
            cfg.name.dimmed(),
            format!("discovery={discovery}").dimmed(),
        );
    }
    println!();

    for (id, errors) in failures {
        invalid_cluster(id, errors).display();
    }

    output::subheader("Summary");
    println!(
        "  {} of {} clusters valid",
        configs.len() - failures.len(),
        configs.len(),
    );

    if failures.is_empty() {
        output::success("All clusters valid");
    } else {
        output::error("Validation failed");
    }
}

fn invalid_cluster(id: &str, errors: &ValidationErrors) -> UxError {
    let mut err = UxError::new(format!("Cluster {id} is invalid")).why(errors.to_string());

    if errors.field_errors().contains_key("discovery_impl") {
        err = err
            .fix(format!(
                "Set a discovery implementation: one of {}",
                KNOWN_DISCOVERY_IMPLS.join(", "),
            ))
            .suggest(format!(
                "vtadmin-clusters check --cluster id={id},discovery={}",
                KNOWN_DISCOVERY_IMPLS[0],
            ));
    }

    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cluster_suggests_discovery() {
        let cfg = Config {
            id: "c1".to_string(),
            ..Default::default()
        };
        let errors = cluster_config::validate(&cfg).unwrap_err();

        let err = invalid_cluster("c1", &errors);

        assert_eq!(err.what, "Cluster c1 is invalid");
        assert_eq!(err.how_to_fix.len(), 1);
        assert!(err.how_to_fix[0].contains("consul"));
        assert_eq!(
            err.suggested_command.as_deref(),
            Some("vtadmin-clusters check --cluster id=c1,discovery=consul"),
        );
    }

    #[test]
    fn test_print_report_does_not_panic() {
        let configs = vec![
            "id=c1,discovery=consul".parse::<Config>().unwrap(),
            "id=c2".parse::<Config>().unwrap(),
        ];
        let failures = validate_clusters(&configs).unwrap_err();
        print_report(&configs, &failures);
    }
}
