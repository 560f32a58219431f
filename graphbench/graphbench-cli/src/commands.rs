//! CLI command implementations.

use crate::output::{self, format_millis, OutputFormat, Reporter, TableBuilder};
use crate::runner::{run_benchmark, BenchReport};
use anyhow::{bail, Context, Result};
use graphbench_core::config::BenchConfig;
use graphbench_core::target::redact;
use graphbench_neo4j::Neo4jDriver;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Run Command
// ============================================================================

/// Command-line overrides for a run; `None` keeps the configured value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub uri: Option<String>,
    pub insecure: Option<bool>,
    pub database: Option<String>,
    pub create_indexes: bool,
    pub populate: bool,
    pub populate_range: Option<(i64, i64)>,
    pub step: Option<i64>,
    pub skip_calculate: bool,
    pub calculate_range: Option<(i64, i64)>,
    pub clean: bool,
}

impl RunOverrides {
    /// Fold the overrides into `config`, then re-validate it
    pub fn apply(&self, config: &mut BenchConfig) -> Result<()> {
        let connection = &mut config.connection;
        if let Some(uri) = &self.uri {
            connection.uri = uri.clone();
        }
        if let Some(insecure) = self.insecure {
            connection.insecure = insecure;
        }
        if let Some(database) = &self.database {
            connection.database = Some(database.clone());
        }

        let workload = &mut config.workload;
        if self.create_indexes {
            workload.create_indexes = true;
        }
        if self.populate || self.populate_range.is_some() {
            workload.populate.enabled = true;
        }
        if let Some((start, end)) = self.populate_range {
            workload.populate.start = start;
            workload.populate.end = end;
        }
        if let Some(step) = self.step {
            workload.populate.step = step;
        }
        if self.skip_calculate {
            workload.calculate.enabled = false;
        }
        if let Some((start, end)) = self.calculate_range {
            workload.calculate.start = start;
            workload.calculate.end = end;
        }
        if self.clean {
            workload.clean.enabled = true;
        }

        config.validate().context("Invalid run options")?;
        Ok(())
    }
}

/// Load the configuration from `path` or the default location
pub async fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    BenchConfig::load(path)
        .await
        .context("Failed to load configuration")
}

/// Run the benchmark with the neo4rs driver
pub async fn run(mut config: BenchConfig, overrides: RunOverrides, format: OutputFormat) -> Result<()> {
    overrides.apply(&mut config)?;
    debug!("Effective target: {}", redact(&config.connection.uri));

    let driver = Neo4jDriver::new();
    let reporter = Reporter::new(format);
    let report = run_benchmark(&driver, &config, &reporter)
        .await
        .context("Benchmark failed")?;

    print_report(&report, format)
}

/// Print the run summary
pub fn print_report(report: &BenchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            output::output(report)?;
        }
        OutputFormat::Plain => {
            for stage in &report.stages {
                let millis = stage
                    .timing
                    .as_ref()
                    .map(|t| format!("{:.5}", t.millis()))
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", stage.name, stage.count, millis);
            }
            println!("total\t{}\t{:.5}", report.statements, report.total.millis());
        }
        OutputFormat::Human => {
            output::header("Benchmark Summary");
            output::kv("Run", report.run_id);
            output::kv("Driver", &report.driver);
            output::kv("Target", &report.target);
            output::kv("Started", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"));

            let mut table = TableBuilder::new().header(vec!["Stage", "Count", "Elapsed"]);
            for stage in &report.stages {
                let elapsed = stage
                    .timing
                    .as_ref()
                    .map(|t| format_millis(t.millis()))
                    .unwrap_or_else(|| "-".to_string());
                table = table.row(vec![stage.name.clone(), stage.count.to_string(), elapsed]);
            }
            table.print();

            output::success(format!(
                "{} statements in {}",
                report.statements,
                format_millis(report.total.millis())
            ));
        }
    }

    Ok(())
}

// ============================================================================
// Config Commands
// ============================================================================

/// Write the default configuration file
pub async fn config_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => BenchConfig::default_path()?,
    };

    if tokio::fs::try_exists(&path).await.unwrap_or(false) && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    BenchConfig::default()
        .save_to_path(&path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    output::success(format!("Configuration written to {}", path.display()));
    Ok(())
}

/// Print the effective configuration
pub fn config_show(mut config: BenchConfig, format: OutputFormat) -> Result<()> {
    config.connection.uri = redact(&config.connection.uri);

    match format {
        OutputFormat::Json => output::output(&config)?,
        _ => print!("{}", config.to_toml()?),
    }

    Ok(())
}
