//! ontomap CLI - Map taxonomy concepts to MONDO, EFO and MeSH
//!
//! Usage:
//!   ontomap
//!   ontomap --config ontomap.toml
//!   ontomap --input taxonomy.ttl --output mappings.csv
//!
//! With no arguments the taxonomy is read from
//! `input/programming_exercise.skos.ttl` and the table written to
//! `output/output.csv`, relative to the working directory.
//!
//! Author: hephaex@gmail.com

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ontomap_core::{AppConfig, LoggingConfig, TermSearchFailure};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ontomap")]
#[command(about = "Map SKOS disease concepts to MONDO, EFO and MeSH identifiers")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Taxonomy file (Turtle)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record "No result" instead of aborting when a term search fails
    #[arg(long)]
    keep_going: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let config = match &self.config {
            Some(path) => AppConfig::from_file(path)?.with_env_override()?,
            None => AppConfig::from_env()?,
        };
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(input) = &self.input {
            config.taxonomy.path = input.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.keep_going {
            config.pipeline.term_search_failure = TermSearchFailure::Sentinel;
        }
        config
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ontomap={level},ontomap_pipeline={level},ontomap_lookup={level},ontomap_taxonomy={level}"
        ))
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;

    init_tracing(&config.logging);
    tracing::info!(
        "Mapping concepts under {} from {}",
        config.taxonomy.root_concept,
        config.taxonomy.path.display()
    );

    let summary = ontomap_pipeline::run_from_config(&config)
        .await
        .context("mapping run failed")?;

    println!(
        "Mapped {} concepts ({} with OLS mappings, {} with OxO mappings) -> {}",
        summary.concepts,
        summary.with_ols_mapping,
        summary.with_oxo_mapping,
        config.output.path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::parse_from(["ontomap"]);
        let config = cli.apply_overrides(AppConfig::default());

        assert_eq!(
            config.taxonomy.path,
            PathBuf::from("input/programming_exercise.skos.ttl")
        );
        assert_eq!(config.output.path, PathBuf::from("output/output.csv"));
        assert_eq!(config.pipeline.term_search_failure, TermSearchFailure::Abort);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "ontomap",
            "--input",
            "t.ttl",
            "--output",
            "out/m.csv",
            "--keep-going",
        ]);
        let config = cli.apply_overrides(AppConfig::default());

        assert_eq!(config.taxonomy.path, PathBuf::from("t.ttl"));
        assert_eq!(config.output.path, PathBuf::from("out/m.csv"));
        assert_eq!(
            config.pipeline.term_search_failure,
            TermSearchFailure::Sentinel
        );
    }
}
