//! Career-compatibility scoring.
//!
//! For each career the raw score is
//!
//! ```text
//! raw(C) = base(C)
//!        + sum over OL grades  bonus(C, subject) * weight(grade)
//!        + sum over AL grades  bonus(C, subject) * weight(grade)
//!        + bonus(C, aptitude) * aptitude
//!        + bonus(C, gpa) * gpa
//!        + bonus(C, stream)
//! ```
//!
//! where `weight(grade) = 1 - rank * 0.2` and absent factors contribute 0.
//! Negative raw scores are clamped to 0 before normalization. If nothing
//! positive remains the call fails with [`ScoringError::NonPositiveTotal`]
//! rather than dividing by a non-positive total.

use serde::{Deserialize, Serialize};

use crate::catalog::{Career, Catalog, CompatibilityTable, Factor};
use crate::error::{CoreError, ScoringError};
use crate::model::{AcademicRecord, CareerDistribution, CareerProbability};
use crate::validation::validate_record;

/// Per-factor contributions to one career's raw score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub career: String,
    pub base: f64,
    pub ol: f64,
    pub al: f64,
    pub aptitude: f64,
    pub gpa: f64,
    pub stream: f64,
}

impl ScoreBreakdown {
    /// Unnormalized score before clamping.
    pub fn raw(&self) -> f64 {
        self.base + self.ol + self.al + self.aptitude + self.gpa + self.stream
    }

    /// Raw score floored at zero, as used for normalization.
    pub fn clamped(&self) -> f64 {
        self.raw().max(0.0)
    }
}

/// Break down the raw score of every career in `table`, in declared order.
pub fn explain(table: &CompatibilityTable, record: &AcademicRecord) -> Vec<ScoreBreakdown> {
    table
        .careers()
        .iter()
        .map(|career| breakdown(career, record))
        .collect()
}

fn breakdown(career: &Career, record: &AcademicRecord) -> ScoreBreakdown {
    let bonus = &career.bonus;

    let ol = record
        .ol_grades()
        .iter()
        .map(|(subject, grade)| bonus.weight(Factor::OlSubject(subject)) * grade.weight())
        .sum();

    let (al, aptitude, stream) = match record.al() {
        Some(results) => (
            results
                .grades
                .iter()
                .map(|(subject, grade)| bonus.weight(Factor::AlSubject(subject)) * grade.weight())
                .sum(),
            bonus.weight(Factor::Aptitude) * results.aptitude,
            bonus.weight(Factor::Stream(&results.stream)),
        ),
        None => (0.0, 0.0, 0.0),
    };

    let gpa = record
        .gpa()
        .map_or(0.0, |gpa| bonus.weight(Factor::Gpa) * gpa);

    ScoreBreakdown {
        career: career.name.clone(),
        base: career.base,
        ol,
        al,
        aptitude,
        gpa,
        stream,
    }
}

/// Map a record to a normalized distribution over the careers in `table`.
///
/// The record is assumed valid; use [`score_record`] for unchecked input.
pub fn score(
    table: &CompatibilityTable,
    record: &AcademicRecord,
) -> Result<CareerDistribution, ScoringError> {
    let breakdowns = explain(table, record);
    if breakdowns.is_empty() {
        return Err(ScoringError::NoCareers);
    }

    let clamped: Vec<f64> = breakdowns
        .iter()
        .map(|b| {
            let raw = b.raw();
            if raw < 0.0 {
                tracing::debug!(career = %b.career, raw, "clamping negative compatibility to zero");
            }
            b.clamped()
        })
        .collect();

    let total: f64 = clamped.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(ScoringError::NonPositiveTotal { total });
    }

    let entries = breakdowns
        .into_iter()
        .zip(clamped)
        .map(|(b, value)| CareerProbability {
            career: b.career,
            probability: value / total,
        })
        .collect();

    Ok(CareerDistribution::from_entries(entries))
}

/// Validate `record` against `catalog`, then score it.
pub fn score_record(
    catalog: &Catalog,
    record: &AcademicRecord,
) -> Result<CareerDistribution, CoreError> {
    validate_record(catalog, record)?;
    Ok(score(catalog.compatibility(), record)?)
}
