//! The built-in catalog.
//!
//! Six careers scored on OL subjects, AL subjects, aptitude, GPA and
//! stream, over four science streams.

use std::collections::BTreeMap;

use crate::catalog::{
    BonusTable, Career, CatalogSpec, CompatibilityTable, GpaTiers, LevelWeights, ScoreRange,
    Stream, Subject, SubjectLevel,
};

pub const PHYSICAL_SCIENCE: &str = "Physical Science";
pub const BIOLOGICAL_SCIENCE: &str = "Biological Science";
pub const PHYSICAL_SCIENCE_ICT: &str = "Physical Science with ICT";
pub const BIO_SCIENCE_AGRICULTURE: &str = "Bio Science with Agriculture";

pub fn standard_spec() -> CatalogSpec {
    let ol = [
        ("Maths", 1.0),
        ("Science", 0.8),
        ("English", 0.7),
        ("Sinhala", 0.5),
        ("History", 0.4),
        ("Religion", 0.2),
    ];
    let al = [
        ("Physics", 0.9),
        ("Chemistry", 0.85),
        ("Combined_Maths", 0.9),
        ("Biology", 0.8),
        ("ICT", 0.75),
        ("Agriculture", 0.7),
        ("Economics", 0.65),
        ("Business_Studies", 0.6),
    ];
    let al_subjects = al
        .iter()
        .map(|(name, d)| subject(name, SubjectLevel::Al, *d));
    let subjects = ol
        .iter()
        .map(|(name, d)| subject(name, SubjectLevel::Ol, *d))
        .chain(al_subjects)
        .collect();

    let al_distributions = BTreeMap::from([
        ("Physics".to_string(), [0.15, 0.25, 0.35, 0.15, 0.10]),
        ("Chemistry".to_string(), [0.20, 0.30, 0.30, 0.15, 0.05]),
        ("Combined_Maths".to_string(), [0.10, 0.20, 0.40, 0.20, 0.10]),
        ("Biology".to_string(), [0.25, 0.30, 0.30, 0.10, 0.05]),
        ("ICT".to_string(), [0.25, 0.35, 0.25, 0.10, 0.05]),
        ("Agriculture".to_string(), [0.30, 0.35, 0.25, 0.08, 0.02]),
    ]);

    let streams = vec![
        stream(
            PHYSICAL_SCIENCE,
            ["Combined_Maths", "Physics", "Chemistry"],
            0.40,
            (1.8, 3.2),
        ),
        stream(
            BIOLOGICAL_SCIENCE,
            ["Biology", "Chemistry", "Physics"],
            0.30,
            (1.6, 3.0),
        ),
        stream(
            PHYSICAL_SCIENCE_ICT,
            ["Combined_Maths", "Physics", "ICT"],
            0.15,
            (1.7, 3.1),
        ),
        stream(
            BIO_SCIENCE_AGRICULTURE,
            ["Biology", "Chemistry", "Agriculture"],
            0.15,
            (1.5, 2.9),
        ),
    ];

    let careers = vec![
        career(
            "Engineering",
            0.15,
            (0.25, 0.15),
            &[("Maths", 0.3), ("Science", 0.2)],
            &[("Physics", 0.8), ("Combined_Maths", 0.9)],
            &[(PHYSICAL_SCIENCE, 0.3), (PHYSICAL_SCIENCE_ICT, 0.2)],
        ),
        career(
            "Medicine",
            0.10,
            (0.30, 0.20),
            &[("Science", 0.4), ("English", 0.3)],
            &[("Biology", 0.9), ("Chemistry", 0.8)],
            &[(BIOLOGICAL_SCIENCE, 0.3), (BIO_SCIENCE_AGRICULTURE, 0.1)],
        ),
        career(
            "IT",
            0.20,
            (0.20, 0.10),
            &[("Maths", 0.4)],
            &[("ICT", 0.9), ("Combined_Maths", 0.7)],
            &[(PHYSICAL_SCIENCE_ICT, 0.4), (PHYSICAL_SCIENCE, 0.1)],
        ),
        career(
            "Business",
            0.25,
            (0.10, 0.05),
            &[("Maths", 0.6), ("English", 0.5)],
            &[("Economics", 0.8), ("Business_Studies", 0.9)],
            &[],
        ),
        career(
            "Teaching",
            0.30,
            (0.05, 0.02),
            &[("English", 0.7), ("Sinhala", 0.6)],
            &[("Biology", 0.7), ("Chemistry", 0.6)],
            &[(BIOLOGICAL_SCIENCE, 0.1), (BIO_SCIENCE_AGRICULTURE, 0.15)],
        ),
        career(
            "Research",
            0.05,
            (0.40, 0.30),
            &[("Science", 0.3), ("Maths", 0.2)],
            &[("Physics", 0.9), ("Chemistry", 0.8)],
            &[(PHYSICAL_SCIENCE, 0.15), (BIOLOGICAL_SCIENCE, 0.15)],
        ),
    ];

    CatalogSpec {
        name: "standard".to_string(),
        levels: LevelWeights {
            ol: 0.55,
            al: 0.35,
            uni: 0.10,
        },
        subjects,
        al_distributions,
        streams,
        gpa: GpaTiers {
            top_threshold: 3.0,
            mid_threshold: 2.5,
            top: ScoreRange::new(3.7, 4.0),
            mid: ScoreRange::new(3.3, 3.7),
            standard: ScoreRange::new(2.7, 3.3),
        },
        compatibility: CompatibilityTable::new(careers),
    }
}

fn subject(name: &str, level: SubjectLevel, difficulty: f64) -> Subject {
    Subject {
        name: name.to_string(),
        level,
        difficulty,
    }
}

fn stream(name: &str, subjects: [&str; 3], weight: f64, aptitude: (f64, f64)) -> Stream {
    Stream {
        name: name.to_string(),
        subjects: subjects.map(str::to_string),
        weight,
        aptitude: ScoreRange::new(aptitude.0, aptitude.1),
    }
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// `(aptitude, gpa)` are the continuous-factor weights.
fn career(
    name: &str,
    base: f64,
    (aptitude, gpa): (f64, f64),
    ol: &[(&str, f64)],
    al: &[(&str, f64)],
    stream: &[(&str, f64)],
) -> Career {
    Career {
        name: name.to_string(),
        base,
        bonus: BonusTable {
            aptitude,
            gpa,
            ol: weights(ol),
            al: weights(al),
            stream: weights(stream),
        },
    }
}
