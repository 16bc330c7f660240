//! Record validation at the request boundary.
//!
//! Callers send a flat [`RecordInput`] with optional fields. Converting it
//! into an [`AcademicRecord`] checks every record invariant against the
//! catalog; a failure rejects only that input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SubjectLevel};
use crate::error::InputValidationError;
use crate::model::{AcademicRecord, AlResults, EducationLevel, GradeMap};

/// Flat record shape as supplied by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    pub education_level: EducationLevel,
    pub ol_grades: GradeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub al_grades: Option<GradeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aptitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}

impl RecordInput {
    /// Check the input and convert it into a tagged record.
    pub fn into_record(self, catalog: &Catalog) -> Result<AcademicRecord, InputValidationError> {
        let RecordInput {
            education_level: level,
            ol_grades: ol,
            stream,
            al_grades,
            aptitude,
            gpa,
        } = self;

        check_ol(catalog, &ol)?;

        match level {
            EducationLevel::Ol => {
                if stream.is_some() {
                    return Err(InputValidationError::UnexpectedStream(level));
                }
                if al_grades.is_some() {
                    return Err(InputValidationError::UnexpectedAlGrades(level));
                }
                if aptitude.is_some() {
                    return Err(InputValidationError::UnexpectedAptitude(level));
                }
                if gpa.is_some() {
                    return Err(InputValidationError::UnexpectedGpa(level));
                }
                Ok(AcademicRecord::Ordinary { ol })
            }
            EducationLevel::Al => {
                if gpa.is_some() {
                    return Err(InputValidationError::UnexpectedGpa(level));
                }
                let al = al_results(catalog, level, stream, al_grades, aptitude)?;
                Ok(AcademicRecord::Advanced { ol, al })
            }
            EducationLevel::Uni => {
                let al = al_results(catalog, level, stream, al_grades, aptitude)?;
                let gpa = gpa.ok_or(InputValidationError::MissingGpa(level))?;
                check_finite("gpa", gpa)?;
                Ok(AcademicRecord::University { ol, al, gpa })
            }
        }
    }
}

impl From<&AcademicRecord> for RecordInput {
    fn from(record: &AcademicRecord) -> Self {
        let al = record.al();
        Self {
            education_level: record.level(),
            ol_grades: record.ol_grades().clone(),
            stream: al.map(|a| a.stream.clone()),
            al_grades: al.map(|a| a.grades.clone()),
            aptitude: al.map(|a| a.aptitude),
            gpa: record.gpa(),
        }
    }
}

/// Check a record built outside [`RecordInput::into_record`].
pub fn validate_record(
    catalog: &Catalog,
    record: &AcademicRecord,
) -> Result<(), InputValidationError> {
    check_ol(catalog, record.ol_grades())?;
    if let Some(al) = record.al() {
        check_al(catalog, al)?;
    }
    if let Some(gpa) = record.gpa() {
        check_finite("gpa", gpa)?;
    }
    Ok(())
}

fn al_results(
    catalog: &Catalog,
    level: EducationLevel,
    stream: Option<String>,
    grades: Option<GradeMap>,
    aptitude: Option<f64>,
) -> Result<AlResults, InputValidationError> {
    let al = AlResults {
        stream: stream.ok_or(InputValidationError::MissingStream(level))?,
        grades: grades.ok_or(InputValidationError::MissingAlGrades(level))?,
        aptitude: aptitude.ok_or(InputValidationError::MissingAptitude(level))?,
    };
    check_al(catalog, &al)?;
    Ok(al)
}

fn check_ol(catalog: &Catalog, grades: &GradeMap) -> Result<(), InputValidationError> {
    for subject in catalog.ol_subjects() {
        if !grades.contains_key(&subject.name) {
            return Err(InputValidationError::MissingOlSubject(subject.name.clone()));
        }
    }
    for name in grades.keys() {
        let is_ol = catalog
            .subject(name)
            .is_ok_and(|s| s.level == SubjectLevel::Ol);
        if !is_ol {
            return Err(InputValidationError::UnknownOlSubject(name.clone()));
        }
    }
    Ok(())
}

fn check_al(catalog: &Catalog, al: &AlResults) -> Result<(), InputValidationError> {
    let stream = catalog
        .stream(&al.stream)
        .map_err(|_| InputValidationError::UnknownStream(al.stream.clone()))?;

    let expected: BTreeSet<&str> = stream.subjects.iter().map(String::as_str).collect();
    let found: BTreeSet<&str> = al.grades.keys().map(String::as_str).collect();
    if expected != found {
        return Err(InputValidationError::AlSubjectMismatch {
            stream: al.stream.clone(),
            expected: stream.subjects.to_vec(),
            found: al.grades.keys().cloned().collect(),
        });
    }

    check_finite("aptitude", al.aptitude)
}

fn check_finite(field: &'static str, value: f64) -> Result<(), InputValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputValidationError::NonFinite(field))
    }
}
