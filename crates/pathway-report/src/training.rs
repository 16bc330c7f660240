//! Training-table CSV export.
//!
//! Each education level gets its own table because the column set differs:
//! OL rows carry OL grades only, AL rows add stream, aptitude and one column
//! per reachable AL subject, UNI rows add GPA on top. Every row ends with
//! one probability column per career and the top career label.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pathway_core::catalog::Catalog;
use pathway_core::engine::ScoredProfile;
use pathway_core::model::{EducationLevel, Grade};
use pathway_core::report::DatasetReport;

/// Marker for an AL subject the record did not take.
const NOT_TAKEN: &str = "NA";

/// How cells are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Grade letters, `NA` for AL subjects not taken, stream and career names.
    Raw,
    /// Numeric matrix: grades as `rank + 1`, `0` for AL subjects not taken,
    /// stream and top career as their declared index.
    Processed,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Raw, Encoding::Processed];
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Raw => write!(f, "raw"),
            Encoding::Processed => write!(f, "processed"),
        }
    }
}

/// Column names for `level`, in output order.
pub fn header(catalog: &Catalog, level: EducationLevel) -> Vec<String> {
    let mut columns: Vec<String> = catalog.ol_subjects().map(|s| s.name.clone()).collect();

    if level.has_stream() {
        columns.push("Stream".into());
        columns.push("Aptitude".into());
        for subject in catalog.reachable_al_subjects() {
            columns.push(subject.to_string());
        }
    }
    if level == EducationLevel::Uni {
        columns.push("GPA".into());
    }

    for career in catalog.careers() {
        columns.push(format!("{}_Prob", career.name));
    }
    columns.push("TopCareer".into());
    columns
}

/// One row for `profile`, aligned with [`header`] for the profile's level.
pub fn row(catalog: &Catalog, profile: &ScoredProfile, encoding: Encoding) -> Result<Vec<String>> {
    let record = &profile.record;
    let mut cells = Vec::new();

    for subject in catalog.ol_subjects() {
        let grade = record.ol_grades().get(&subject.name).copied();
        cells.push(grade_cell(grade, encoding));
    }

    if let Some(al) = record.al() {
        cells.push(match encoding {
            Encoding::Raw => al.stream.clone(),
            Encoding::Processed => catalog
                .stream_index(&al.stream)
                .with_context(|| format!("unknown stream '{}'", al.stream))?
                .to_string(),
        });
        cells.push(format!("{:.2}", al.aptitude));
        for subject in catalog.reachable_al_subjects() {
            cells.push(grade_cell(al.grades.get(subject).copied(), encoding));
        }
    }

    if let Some(gpa) = record.gpa() {
        cells.push(format!("{gpa:.2}"));
    }

    for career in catalog.careers() {
        let p = profile.distribution.get(&career.name).unwrap_or(0.0);
        cells.push(format!("{p:.4}"));
    }

    let top = profile
        .distribution
        .top()
        .with_context(|| format!("record {} has an empty distribution", profile.index))?;
    cells.push(match encoding {
        Encoding::Raw => top.career.clone(),
        Encoding::Processed => catalog
            .careers()
            .iter()
            .position(|c| c.name == top.career)
            .with_context(|| format!("unknown career '{}'", top.career))?
            .to_string(),
    });

    Ok(cells)
}

fn grade_cell(grade: Option<Grade>, encoding: Encoding) -> String {
    match (grade, encoding) {
        (Some(g), Encoding::Raw) => g.letter().to_string(),
        (Some(g), Encoding::Processed) => (g.rank() + 1).to_string(),
        (None, Encoding::Raw) => NOT_TAKEN.to_string(),
        (None, Encoding::Processed) => "0".to_string(),
    }
}

/// Write one table to `path`. Returns the number of data rows.
pub fn write_table<'a>(
    path: &Path,
    catalog: &Catalog,
    level: EducationLevel,
    profiles: impl IntoIterator<Item = &'a ScoredProfile>,
    encoding: Encoding,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(header(catalog, level))?;

    let mut rows = 0;
    for profile in profiles {
        anyhow::ensure!(
            profile.record.level() == level,
            "record {} is {} but the table is {level}",
            profile.index,
            profile.record.level()
        );
        writer.write_record(row(catalog, profile, encoding)?)?;
        rows += 1;
    }
    writer.flush()?;

    tracing::debug!("wrote {rows} rows to {}", path.display());
    Ok(rows)
}

/// Write the training tables for every level present in `report`.
///
/// Files are named `<level>_<encoding>.csv`. With `by_stream`, AL and UNI
/// records are also split into `<level>_<stream>_<encoding>.csv`.
pub fn write_training_sets(
    dir: &Path,
    catalog: &Catalog,
    report: &DatasetReport,
    encoding: Encoding,
    by_stream: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for level in EducationLevel::ALL {
        if report.profiles_at(level).next().is_none() {
            continue;
        }
        let level_slug = level.to_string().to_lowercase();

        let path = dir.join(format!("{level_slug}_{encoding}.csv"));
        write_table(&path, catalog, level, report.profiles_at(level), encoding)?;
        written.push(path);

        if by_stream && level.has_stream() {
            for (stream, profiles) in report.by_stream(level) {
                let path = dir.join(format!("{level_slug}_{}_{encoding}.csv", slug(stream)));
                write_table(&path, catalog, level, profiles, encoding)?;
                written.push(path);
            }
        }
    }

    tracing::info!(
        "wrote {} {encoding} training tables to {}",
        written.len(),
        dir.display()
    );
    Ok(written)
}

/// Lowercase file-name form of a stream name.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
