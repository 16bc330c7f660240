//! The `pathway score` command.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use pathway_core::error::CoreError;
use pathway_core::model::{AcademicRecord, CareerDistribution};
use pathway_core::scorer::{explain, score_record, ScoreBreakdown};
use pathway_core::validation::RecordInput;

use super::{load_catalog, CommandError};
use crate::config::load_config_from;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    level: String,
    top_career: Option<&'a str>,
    percentages: Vec<CareerPercentage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<Vec<ScoreBreakdown>>,
}

#[derive(Serialize)]
struct CareerPercentage<'a> {
    career: &'a str,
    percentage: f64,
}

pub fn execute(
    input: PathBuf,
    catalog_path: Option<PathBuf>,
    format: ScoreFormat,
    with_breakdown: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = load_catalog(catalog_path.or(config.catalog).as_deref())?;

    let content = read_input(&input)?;
    let record_input: RecordInput = serde_json::from_str(&content)
        .map_err(|e| CommandError::InvalidInput(format!("malformed record JSON: {e}")))?;
    let record = record_input
        .into_record(&catalog)
        .map_err(|e| reject(e.into()))?;
    let distribution = score_record(&catalog, &record).map_err(reject)?;

    let breakdown = with_breakdown.then(|| explain(catalog.compatibility(), &record));

    match format {
        ScoreFormat::Json => {
            let output = ScoreOutput {
                level: record.level().to_string(),
                top_career: distribution.top().map(|t| t.career.as_str()),
                percentages: distribution
                    .as_percentages()
                    .into_iter()
                    .map(|(career, percentage)| CareerPercentage { career, percentage })
                    .collect(),
                breakdown,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        ScoreFormat::Text => print_text(&record, &distribution, breakdown.as_deref()),
    }

    Ok(())
}

/// Input rejections keep their message; anything else is logged and hidden.
fn reject(err: CoreError) -> anyhow::Error {
    if err.is_client_error() {
        CommandError::InvalidInput(err.to_string()).into()
    } else {
        tracing::error!("scoring failed: {err}");
        CommandError::Internal.into()
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read record from stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))
    }
}

fn print_text(
    record: &AcademicRecord,
    distribution: &CareerDistribution,
    breakdown: Option<&[ScoreBreakdown]>,
) {
    use comfy_table::{Cell, Table};

    println!("Level: {}", record.level());
    if let Some(stream) = record.stream() {
        println!("Stream: {stream}");
    }
    if let Some(top) = distribution.top() {
        let percentage = top.probability * 100.0;
        println!("Top career: {} ({percentage:.2}%)", top.career);
    }

    let mut table = Table::new();
    table.set_header(vec!["Career", "Probability"]);
    for (career, percentage) in distribution.as_percentages() {
        let percentage = format!("{percentage:.2}%");
        table.add_row(vec![Cell::new(career), Cell::new(percentage)]);
    }
    println!("\n{table}");

    if let Some(rows) = breakdown {
        let mut table = Table::new();
        table.set_header(vec![
            "Career", "Base", "OL", "AL", "Aptitude", "GPA", "Stream", "Score",
        ]);
        for row in rows {
            table.add_row(vec![
                Cell::new(&row.career),
                Cell::new(format!("{:.3}", row.base)),
                Cell::new(format!("{:.3}", row.ol)),
                Cell::new(format!("{:.3}", row.al)),
                Cell::new(format!("{:.3}", row.aptitude)),
                Cell::new(format!("{:.3}", row.gpa)),
                Cell::new(format!("{:.3}", row.stream)),
                Cell::new(format!("{:.3}", row.clamped())),
            ]);
        }
        println!("\n{table}");
    }
}
