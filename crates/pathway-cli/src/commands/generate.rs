//! The `pathway generate` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};

use pathway_core::engine::{BatchConfig, BatchEngine, ProgressReporter};
use pathway_core::generator::ProfileRequest;
use pathway_core::model::EducationLevel;
use pathway_core::parser::validate_catalog;
use pathway_core::report::DatasetReport;
use pathway_report::markdown::stats_to_markdown;
use pathway_report::training::{write_training_sets, Encoding};

use super::{load_catalog, CommandError};
use crate::config::load_config_from;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    All,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of records to generate
    #[arg(long)]
    pub count: Option<usize>,

    /// Base seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fix the education level (ol, al, uni)
    #[arg(long)]
    pub level: Option<EducationLevel>,

    /// Fix the stream for AL and UNI records
    #[arg(long)]
    pub stream: Option<String>,

    /// Max chunks generated concurrently
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Records per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Output directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "all")]
    pub format: OutputFormat,

    /// Also split AL and UNI tables per stream
    #[arg(long)]
    pub by_stream: bool,

    /// Catalog file (defaults to the built-in tables)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Abandon the batch after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_chunk_start(&self, chunk: usize, size: usize) {
        tracing::debug!("chunk {chunk}: {size} records queued");
    }

    fn on_chunk_complete(&self, chunk: usize, generated: usize) {
        eprintln!("  Done: chunk {chunk} ({generated} records)");
    }

    fn on_batch_complete(&self, total: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {total} records ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let catalog_path = args.catalog.or(config.catalog);
    let catalog = Arc::new(load_catalog(catalog_path.as_deref())?);
    for w in validate_catalog(&catalog) {
        match &w.scope {
            Some(scope) => tracing::warn!("catalog [{scope}]: {}", w.message),
            None => tracing::warn!("catalog: {}", w.message),
        }
    }

    if let Some(stream) = &args.stream {
        if catalog.stream(stream).is_err() {
            let message = format!("unknown stream: {stream}");
            return Err(CommandError::InvalidInput(message).into());
        }
        if args.level == Some(EducationLevel::Ol) {
            eprintln!("Warning: --stream has no effect on OL records.");
        }
    }

    let batch = BatchConfig {
        count: args.count.unwrap_or(config.count),
        seed: args.seed.unwrap_or(config.seed),
        parallelism: args.parallelism.unwrap_or(config.parallelism),
        chunk_size: args.chunk_size.unwrap_or(config.chunk_size),
        request: ProfileRequest {
            level: args.level,
            stream: args.stream,
        },
    };
    anyhow::ensure!(batch.parallelism >= 1, "parallelism must be at least 1");
    anyhow::ensure!(batch.chunk_size >= 1, "chunk size must be at least 1");

    eprintln!(
        "pathway v{}: generating {} records from '{}' (seed {}, {} workers)",
        env!("CARGO_PKG_VERSION"),
        batch.count,
        catalog.name(),
        batch.seed,
        batch.parallelism
    );
    eprintln!();

    let engine = BatchEngine::new(Arc::clone(&catalog), batch);
    let reporter = ConsoleReporter;
    let report = match args.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), engine.run(&reporter))
            .await
            .map_err(|_| {
                anyhow::anyhow!("generation timed out after {secs}s; nothing was written")
            })??,
        None => engine.run(&reporter).await?,
    };

    print_summary(&report);

    let output = args.output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;

    if matches!(args.format, OutputFormat::Json | OutputFormat::All) {
        let path = output.join("report.json");
        report.save_json(&path)?;
        eprintln!("Dataset saved to: {}", path.display());
    }

    if matches!(args.format, OutputFormat::Csv | OutputFormat::All) {
        for encoding in Encoding::ALL {
            let files = write_training_sets(&output, &catalog, &report, encoding, args.by_stream)?;
            eprintln!(
                "{} {encoding} table(s) in {}",
                files.len(),
                output.display()
            );
        }
    }

    let summary = output.join("summary.md");
    std::fs::write(&summary, stats_to_markdown(&report))?;
    eprintln!("Summary: {}", summary.display());

    Ok(())
}

fn print_summary(report: &DatasetReport) {
    use comfy_table::{Cell, Table};

    let stats = &report.stats;

    let mut levels = Table::new();
    levels.set_header(vec!["Level", "Records"]);
    for (level, count) in &stats.per_level {
        levels.add_row(vec![Cell::new(level), Cell::new(count)]);
    }

    let mut careers = Table::new();
    careers.set_header(vec!["Career", "Mean probability", "Top career"]);
    for career in &stats.careers {
        careers.add_row(vec![
            Cell::new(&career.career),
            Cell::new(format!("{:.1}%", career.mean_probability * 100.0)),
            Cell::new(career.top_count),
        ]);
    }

    eprintln!("\n{levels}\n{careers}");
}
