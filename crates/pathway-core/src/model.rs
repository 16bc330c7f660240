//! Core data model types for pathway.
//!
//! An academic record is a tagged variant with one payload shape per
//! education level, so a record can never carry AL grades without a stream
//! or a GPA below university level.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered grade classes. Rank 0 is the best performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    S,
    F,
}

impl Grade {
    /// All classes in declared order, best first.
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::S, Grade::F];

    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Contribution multiplier: 1.0 for A down to 0.2 for F. Never zero.
    pub fn weight(self) -> f64 {
        1.0 - f64::from(self.rank()) * 0.2
    }

    pub fn from_rank(rank: u8) -> Option<Grade> {
        Grade::ALL.get(usize::from(rank)).copied()
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::S => "S",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "S" => Ok(Grade::S),
            "F" => Ok(Grade::F),
            other => Err(format!("unknown grade: {other}")),
        }
    }
}

/// Academic stage reached by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EducationLevel {
    Ol,
    Al,
    Uni,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 3] =
        [EducationLevel::Ol, EducationLevel::Al, EducationLevel::Uni];

    /// True for AL and UNI, the levels that carry a stream and aptitude score.
    pub fn has_stream(self) -> bool {
        self >= EducationLevel::Al
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EducationLevel::Ol => write!(f, "OL"),
            EducationLevel::Al => write!(f, "AL"),
            EducationLevel::Uni => write!(f, "UNI"),
        }
    }
}

impl FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ol" | "ordinary" => Ok(EducationLevel::Ol),
            "al" | "advanced" => Ok(EducationLevel::Al),
            "uni" | "university" => Ok(EducationLevel::Uni),
            other => Err(format!("unknown education level: {other}")),
        }
    }
}

/// Subject name to grade. Ordered so iteration is deterministic.
pub type GradeMap = BTreeMap<String, Grade>;

/// The AL part of a record: stream, its three subject grades, aptitude score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlResults {
    pub stream: String,
    pub grades: GradeMap,
    pub aptitude: f64,
}

/// One academic record, shaped by education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level")]
pub enum AcademicRecord {
    #[serde(rename = "OL")]
    Ordinary { ol: GradeMap },
    #[serde(rename = "AL")]
    Advanced { ol: GradeMap, al: AlResults },
    #[serde(rename = "UNI")]
    University {
        ol: GradeMap,
        al: AlResults,
        gpa: f64,
    },
}

impl AcademicRecord {
    pub fn level(&self) -> EducationLevel {
        match self {
            AcademicRecord::Ordinary { .. } => EducationLevel::Ol,
            AcademicRecord::Advanced { .. } => EducationLevel::Al,
            AcademicRecord::University { .. } => EducationLevel::Uni,
        }
    }

    pub fn ol_grades(&self) -> &GradeMap {
        match self {
            AcademicRecord::Ordinary { ol }
            | AcademicRecord::Advanced { ol, .. }
            | AcademicRecord::University { ol, .. } => ol,
        }
    }

    pub fn al(&self) -> Option<&AlResults> {
        match self {
            AcademicRecord::Ordinary { .. } => None,
            AcademicRecord::Advanced { al, .. } => Some(al),
            AcademicRecord::University { al, .. } => Some(al),
        }
    }

    pub fn stream(&self) -> Option<&str> {
        self.al().map(|al| al.stream.as_str())
    }

    pub fn aptitude(&self) -> Option<f64> {
        self.al().map(|al| al.aptitude)
    }

    pub fn gpa(&self) -> Option<f64> {
        match self {
            AcademicRecord::University { gpa, .. } => Some(*gpa),
            _ => None,
        }
    }
}

/// Probability assigned to one career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerProbability {
    pub career: String,
    pub probability: f64,
}

/// Normalized probabilities over careers, in catalog order.
///
/// Values are non-negative and sum to 1 within floating tolerance. The
/// distribution is produced alongside a record and never merged into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareerDistribution {
    entries: Vec<CareerProbability>,
}

impl CareerDistribution {
    pub(crate) fn from_entries(entries: Vec<CareerProbability>) -> Self {
        Self { entries }
    }

    pub fn get(&self, career: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.career == career)
            .map(|e| e.probability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CareerProbability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    /// The most probable career. Ties go to the career declared first.
    pub fn top(&self) -> Option<&CareerProbability> {
        self.entries.iter().fold(None, |best, e| match best {
            Some(b) if b.probability >= e.probability => Some(b),
            _ => Some(e),
        })
    }

    /// Probabilities re-expressed on a 0-100 scale for display.
    pub fn as_percentages(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.career.as_str(), e.probability * 100.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_weights_descend_from_one_to_point_two() {
        let weights: Vec<f64> = Grade::ALL.iter().map(|g| g.weight()).collect();
        let expected = [1.0, 0.8, 0.6, 0.4, 0.2];
        for (w, e) in weights.iter().zip(expected) {
            assert!((w - e).abs() < 1e-12);
        }
        assert!(Grade::ALL.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn grade_from_str() {
        assert_eq!("a".parse::<Grade>().unwrap(), Grade::A);
        assert_eq!(" S ".parse::<Grade>().unwrap(), Grade::S);
        assert!("Z".parse::<Grade>().is_err());
        assert_eq!(Grade::from_rank(4), Some(Grade::F));
        assert_eq!(Grade::from_rank(5), None);
    }

    #[test]
    fn level_ordering_and_parsing() {
        assert!(!EducationLevel::Ol.has_stream());
        assert!(EducationLevel::Al.has_stream());
        assert!(EducationLevel::Uni.has_stream());
        assert_eq!(
            "uni".parse::<EducationLevel>().unwrap(),
            EducationLevel::Uni
        );
        assert_eq!(EducationLevel::Al.to_string(), "AL");
        assert!("phd".parse::<EducationLevel>().is_err());
    }

    #[test]
    fn record_json_is_tagged_by_level() {
        let record = AcademicRecord::Advanced {
            ol: GradeMap::from([("Maths".to_string(), Grade::A)]),
            al: AlResults {
                stream: "Physical Science".into(),
                grades: GradeMap::from([("Physics".to_string(), Grade::B)]),
                aptitude: 2.1,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["level"], "AL");
        assert_eq!(json["al"]["grades"]["Physics"], "B");

        let back: AcademicRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.stream(), Some("Physical Science"));
        assert_eq!(back.gpa(), None);
    }

    #[test]
    fn distribution_top_prefers_first_on_tie() {
        let dist = CareerDistribution::from_entries(vec![
            CareerProbability {
                career: "IT".into(),
                probability: 0.4,
            },
            CareerProbability {
                career: "Business".into(),
                probability: 0.4,
            },
            CareerProbability {
                career: "Research".into(),
                probability: 0.2,
            },
        ]);
        assert_eq!(dist.top().unwrap().career, "IT");
        assert!((dist.total() - 1.0).abs() < 1e-12);
        assert_eq!(dist.as_percentages()[2], ("Research", 20.0));
        assert_eq!(dist.get("Medicine"), None);
    }
}
