//! Error types for catalog, input and scoring failures.
//!
//! Three classes of failure exist and they are handled differently by
//! callers: catalog defects fail the whole operation, input defects reject
//! a single record, and scoring defects signal a weighting problem that
//! must be surfaced instead of producing out-of-range probabilities.

use thiserror::Error;

use crate::model::EducationLevel;

/// A defect in the catalog tables (unknown ids, malformed distributions).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("unknown stream: {0}")]
    UnknownStream(String),

    #[error("unknown career: {0}")]
    UnknownCareer(String),

    /// An AL subject used by a stream has no hand-tuned grade distribution.
    #[error("no grade distribution for AL subject: {0}")]
    MissingGradeDistribution(String),

    #[error("stream '{stream}' is invalid: {reason}")]
    InvalidStream { stream: String, reason: String },

    /// Weights that must form a probability distribution do not.
    #[error("{name} weights must be non-negative and sum to 1 (got {total})")]
    InvalidDistribution { name: String, total: f64 },

    #[error("difficulty for {subject} must be within [0, 1] (got {value})")]
    InvalidDifficulty { subject: String, value: f64 },

    #[error("invalid range for {what}: [{min}, {max}]")]
    InvalidRange { what: String, min: f64, max: f64 },

    #[error("invalid GPA tier thresholds: top {top} must exceed mid {mid}")]
    InvalidThresholds { top: f64, mid: f64 },

    #[error("non-finite weight for {0}")]
    NonFiniteWeight(String),

    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("catalog has no {0}")]
    Empty(&'static str),
}

/// A caller-supplied record that violates the record invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("missing OL grade for {0}")]
    MissingOlSubject(String),

    #[error("unknown OL subject: {0}")]
    UnknownOlSubject(String),

    #[error("a stream is required at level {0}")]
    MissingStream(EducationLevel),

    #[error("a stream is not allowed at level {0}")]
    UnexpectedStream(EducationLevel),

    #[error("unknown stream: {0}")]
    UnknownStream(String),

    #[error("AL grades are required at level {0}")]
    MissingAlGrades(EducationLevel),

    #[error("AL grades are not allowed at level {0}")]
    UnexpectedAlGrades(EducationLevel),

    /// The AL grade keys differ from the three subjects the stream mandates.
    #[error("AL grades for stream '{stream}' must cover exactly {expected:?} (got {found:?})")]
    AlSubjectMismatch {
        stream: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("an aptitude score is required at level {0}")]
    MissingAptitude(EducationLevel),

    #[error("an aptitude score is not allowed at level {0}")]
    UnexpectedAptitude(EducationLevel),

    #[error("a GPA is required at level {0}")]
    MissingGpa(EducationLevel),

    #[error("a GPA is not allowed at level {0}")]
    UnexpectedGpa(EducationLevel),

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}

/// Normalization could not produce a valid distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("compatibility total is not positive ({total}); check career weights")]
    NonPositiveTotal { total: f64 },

    #[error("compatibility table has no careers")]
    NoCareers,
}

/// Any failure raised by the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputValidationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl CoreError {
    /// Returns `true` if the caller can fix this by correcting its input.
    ///
    /// Catalog and scoring failures are internal and should be reported
    /// without echoing weight-table contents.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::Input(_))
    }
}
