//! graphbench - Manual benchmark for graph database client drivers.
//!
//! # Usage
//!
//! ```bash
//! # Default run: calculate-and-save against neo4j://localhost:7687
//! graphbench
//!
//! # Full run with indexes, population and cleanup
//! graphbench run --create-indexes --populate --clean
//!
//! # Against a TLS endpoint
//! graphbench run --uri neo4j://neo4j:secret@db:7687 --tls
//!
//! # Write the default configuration
//! graphbench config init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use graphbench_cli::{commands, output, OutputFormat, RunOverrides};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "graphbench")]
#[command(about = "graphbench - Benchmark a graph database driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (human, json, plain)
    #[arg(long, global = true, default_value = "human")]
    format: OutputFormatArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark (the default when no command is given)
    Run(RunArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Connection URI with embedded credentials
    #[arg(long)]
    uri: Option<String>,

    /// Connect without TLS
    #[arg(long, conflicts_with = "tls")]
    insecure: bool,

    /// Connect with TLS
    #[arg(long)]
    tls: bool,

    /// Target database name
    #[arg(long)]
    database: Option<String>,

    /// Create the benchmark indexes first
    #[arg(long)]
    create_indexes: bool,

    /// Populate the graph before calculating
    #[arg(long)]
    populate: bool,

    /// Populate call range
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    populate_range: Option<Vec<i64>>,

    /// Nodes per populate call
    #[arg(long)]
    step: Option<i64>,

    /// Skip the calculate-and-save stage
    #[arg(long)]
    skip_calculate: bool,

    /// Calculate-and-save range
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    calculate_range: Option<Vec<i64>>,

    /// Delete benchmark data afterwards
    #[arg(long)]
    clean: bool,
}

impl From<RunArgs> for RunOverrides {
    fn from(args: RunArgs) -> Self {
        let insecure = if args.tls {
            Some(false)
        } else if args.insecure {
            Some(true)
        } else {
            None
        };

        Self {
            uri: args.uri,
            insecure,
            database: args.database,
            create_indexes: args.create_indexes,
            populate: args.populate,
            populate_range: pair(args.populate_range),
            step: args.step,
            skip_calculate: args.skip_calculate,
            calculate_range: pair(args.calculate_range),
            clean: args.clean,
        }
    }
}

fn pair(values: Option<Vec<i64>>) -> Option<(i64, i64)> {
    match values.as_deref() {
        Some([start, end]) => Some((*start, *end)),
        _ => None,
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default configuration file
    Init {
        /// Where to write it (default: user config directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        output::error(format!("{:#}", e));
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let loaded = commands::load_config(cli.config.as_deref()).await;
    let level = loaded
        .as_ref()
        .map(|config| config.general.log_level.as_str())
        .unwrap_or("info");
    init_logging(cli.verbose, level);

    let format = OutputFormat::from(cli.format);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            commands::run(loaded?, args.into(), format).await?;
        }

        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init { path, force } => {
                commands::config_init(path, force).await?;
            }
            ConfigCommands::Show => {
                commands::config_show(loaded?, format)?;
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool, level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("graphbench=debug,graphbench_cli=debug,graphbench_core=debug,graphbench_neo4j=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "graphbench={level},graphbench_cli={level},graphbench_core={level},graphbench_neo4j={level},warn"
            ))
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
