//! pathway CLI: synthetic academic profiles and career-compatibility scores.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::generate::GenerateArgs;
use commands::score::ScoreFormat;
use commands::CommandError;

#[derive(Parser)]
#[command(
    name = "pathway",
    version,
    about = "Synthetic academic profiles and career-compatibility scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and score a batch of synthetic records
    Generate(GenerateArgs),

    /// Score one record read as JSON
    Score {
        /// Record JSON file, or "-" for stdin
        #[arg(long)]
        input: PathBuf,

        /// Catalog file (defaults to the built-in tables)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ScoreFormat,

        /// Show per-factor contributions
        #[arg(long)]
        explain: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a catalog and print warnings
    Validate {
        /// Catalog file (defaults to the built-in tables)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the catalog tables
    Tables {
        /// Catalog file (defaults to the built-in tables)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, catalog and example record
    Init {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pathway=info,pathway_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Score {
            input,
            catalog,
            format,
            explain,
            config,
        } => commands::score::execute(input, catalog, format, explain, config),
        Commands::Validate { catalog, config } => commands::validate::execute(catalog, config),
        Commands::Tables { catalog, config } => commands::tables::execute(catalog, config),
        Commands::Init { dir } => commands::init::execute(&dir),
    };

    if let Err(e) = result {
        let code = e
            .downcast_ref::<CommandError>()
            .map_or(1, CommandError::exit_code);
        eprintln!("Error: {e:#}");
        process::exit(code);
    }
}
