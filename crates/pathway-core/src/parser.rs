//! TOML catalog parser.
//!
//! Loads catalogs from TOML files, writes them back out, and reports soft
//! warnings that do not stop a catalog from loading.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{
    BonusTable, Career, Catalog, CatalogSpec, CompatibilityTable, GpaTiers, LevelWeights,
    ScoreRange, Stream, Subject, SubjectLevel,
};
use crate::error::ConfigError;

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Serialize, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    levels: LevelWeights,
    #[serde(default)]
    subjects: Vec<TomlSubject>,
    #[serde(default)]
    streams: Vec<TomlStream>,
    gpa: GpaTiers,
    #[serde(default)]
    careers: Vec<TomlCareer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlCatalogHeader {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlSubject {
    name: String,
    level: SubjectLevel,
    difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distribution: Option<TomlGradeWeights>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlGradeWeights {
    #[serde(rename = "A", default)]
    a: f64,
    #[serde(rename = "B", default)]
    b: f64,
    #[serde(rename = "C", default)]
    c: f64,
    #[serde(rename = "S", default)]
    s: f64,
    #[serde(rename = "F", default)]
    f: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlStream {
    name: String,
    subjects: Vec<String>,
    weight: f64,
    aptitude: ScoreRange,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlCareer {
    name: String,
    base: f64,
    #[serde(default)]
    aptitude: f64,
    #[serde(default)]
    gpa: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ol: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    al: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    stream: BTreeMap<String, f64>,
}

/// Parse a catalog file.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    let catalog = parse_catalog_str(&content, path)?;
    tracing::info!(
        "loaded catalog '{}' from {} ({} streams, {} careers)",
        catalog.name(),
        path.display(),
        catalog.streams().len(),
        catalog.careers().len()
    );
    Ok(catalog)
}

/// Parse a TOML string into a checked `Catalog` (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let spec = into_spec(parsed)
        .with_context(|| format!("invalid catalog: {}", source_path.display()))?;

    Catalog::new(spec).with_context(|| format!("invalid catalog: {}", source_path.display()))
}

fn into_spec(file: TomlCatalogFile) -> Result<CatalogSpec, ConfigError> {
    let mut al_distributions = BTreeMap::new();
    let subjects = file
        .subjects
        .into_iter()
        .map(|s| {
            if let Some(d) = s.distribution {
                al_distributions.insert(s.name.clone(), [d.a, d.b, d.c, d.s, d.f]);
            }
            Subject {
                name: s.name,
                level: s.level,
                difficulty: s.difficulty,
            }
        })
        .collect();

    let streams = file
        .streams
        .into_iter()
        .map(|s| {
            let count = s.subjects.len();
            let subjects: [String; 3] = s.subjects.try_into().map_err(|_| {
                ConfigError::InvalidStream {
                    stream: s.name.clone(),
                    reason: format!("expected exactly 3 subjects, found {count}"),
                }
            })?;
            Ok(Stream {
                name: s.name,
                subjects,
                weight: s.weight,
                aptitude: s.aptitude,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let careers = file
        .careers
        .into_iter()
        .map(|c| Career {
            name: c.name,
            base: c.base,
            bonus: BonusTable {
                aptitude: c.aptitude,
                gpa: c.gpa,
                ol: c.ol,
                al: c.al,
                stream: c.stream,
            },
        })
        .collect();

    Ok(CatalogSpec {
        name: file.catalog.name,
        levels: file.levels,
        subjects,
        al_distributions,
        streams,
        gpa: file.gpa,
        compatibility: CompatibilityTable::new(careers),
    })
}

/// Render a catalog in the file format read by [`parse_catalog`].
pub fn catalog_to_toml(catalog: &Catalog) -> Result<String> {
    let spec = catalog.spec();
    let file = TomlCatalogFile {
        catalog: TomlCatalogHeader {
            name: spec.name.clone(),
        },
        levels: spec.levels,
        subjects: spec
            .subjects
            .iter()
            .map(|s| TomlSubject {
                name: s.name.clone(),
                level: s.level,
                difficulty: s.difficulty,
                distribution: spec.al_distributions.get(&s.name).map(grade_weights),
            })
            .collect(),
        streams: spec
            .streams
            .iter()
            .map(|s| TomlStream {
                name: s.name.clone(),
                subjects: s.subjects.to_vec(),
                weight: s.weight,
                aptitude: s.aptitude,
            })
            .collect(),
        gpa: spec.gpa,
        careers: spec
            .compatibility
            .careers()
            .iter()
            .map(|c| TomlCareer {
                name: c.name.clone(),
                base: c.base,
                aptitude: c.bonus.aptitude,
                gpa: c.bonus.gpa,
                ol: c.bonus.ol.clone(),
                al: c.bonus.al.clone(),
                stream: c.bonus.stream.clone(),
            })
            .collect(),
    };
    toml::to_string_pretty(&file).context("failed to serialize catalog")
}

fn grade_weights(p: &[f64; 5]) -> TomlGradeWeights {
    TomlGradeWeights {
        a: p[0],
        b: p[1],
        c: p[2],
        s: p[3],
        f: p[4],
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct CatalogWarning {
    /// The career, stream or subject concerned (if applicable).
    pub scope: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for issues that do not prevent loading.
pub fn validate_catalog(catalog: &Catalog) -> Vec<CatalogWarning> {
    let mut warnings = Vec::new();

    // AL subjects no stream takes never receive grades
    let reachable = catalog.reachable_al_subjects();
    for subject in catalog.al_subjects() {
        if !reachable.contains(&subject.name.as_str()) {
            warnings.push(CatalogWarning {
                scope: Some(subject.name.clone()),
                message: "AL subject is not part of any stream; its bonus weights never apply"
                    .into(),
            });
        }
    }

    for career in catalog.careers() {
        if career.bonus.is_empty() {
            warnings.push(CatalogWarning {
                scope: Some(career.name.clone()),
                message: "career has no bonus weights; its score is the base weight alone".into(),
            });
        }

        if career.base < 0.0 {
            warnings.push(CatalogWarning {
                scope: Some(career.name.clone()),
                message: format!("negative base weight ({})", career.base),
            });
        }

        for (factor, weight) in career.bonus.entries() {
            if weight < 0.0 {
                warnings.push(CatalogWarning {
                    scope: Some(career.name.clone()),
                    message: format!(
                        "negative weight for {factor} ({weight}); scores may clamp to zero"
                    ),
                });
            }
        }
    }

    // Streams that no career rewards do not move any distribution
    for stream in catalog.streams() {
        let rewarded = catalog
            .careers()
            .iter()
            .any(|c| c.bonus.stream.get(&stream.name).is_some_and(|w| *w != 0.0));
        if !rewarded {
            warnings.push(CatalogWarning {
                scope: Some(stream.name.clone()),
                message: "no career has a bonus for this stream".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MINIMAL_TOML: &str = r#"
[catalog]
name = "minimal"

[levels]
OL = 0.5
AL = 0.3
UNI = 0.2

[[subjects]]
name = "Maths"
level = "OL"
difficulty = 0.9

[[subjects]]
name = "Physics"
level = "AL"
difficulty = 0.8
distribution = { A = 0.2, B = 0.3, C = 0.3, S = 0.1, F = 0.1 }

[[subjects]]
name = "Chemistry"
level = "AL"
difficulty = 0.7
distribution = { A = 0.2, B = 0.2, C = 0.2, S = 0.2, F = 0.2 }

[[subjects]]
name = "Biology"
level = "AL"
difficulty = 0.6
distribution = { A = 0.3, B = 0.3, C = 0.2, S = 0.1, F = 0.1 }

[[streams]]
name = "Science"
subjects = ["Physics", "Chemistry", "Biology"]
weight = 1.0
aptitude = { min = 1.0, max = 3.0 }

[gpa]
top_threshold = 2.5
mid_threshold = 2.0
top = { min = 3.6, max = 4.0 }
mid = { min = 3.0, max = 3.6 }
standard = { min = 2.0, max = 3.0 }

[[careers]]
name = "Medicine"
base = 0.2
aptitude = 0.3
ol = { Maths = 0.1 }
al = { Biology = 0.9 }
stream = { Science = 0.2 }

[[careers]]
name = "Trades"
base = 0.4
"#;

    fn path() -> PathBuf {
        PathBuf::from("catalog.toml")
    }

    #[test]
    fn parse_minimal_catalog() {
        let catalog = parse_catalog_str(MINIMAL_TOML, &path()).unwrap();
        assert_eq!(catalog.name(), "minimal");
        assert_eq!(catalog.ol_subjects().count(), 1);
        assert_eq!(catalog.al_subjects().count(), 3);
        assert_eq!(
            catalog.subjects_for_stream("Science").unwrap()[2],
            "Biology"
        );
        let medicine = catalog.bonus_table("Medicine").unwrap();
        assert_eq!(medicine.gpa, 0.0);
        assert_eq!(medicine.al["Biology"], 0.9);
        assert!(catalog.bonus_table("Trades").unwrap().is_empty());
    }

    #[test]
    fn standard_catalog_survives_toml() {
        let standard = Catalog::standard();
        let text = catalog_to_toml(&standard).unwrap();
        let parsed = parse_catalog_str(&text, &path()).unwrap();
        assert_eq!(parsed.spec(), standard.spec());
    }

    #[test]
    fn stream_needs_three_subjects() {
        let bad = MINIMAL_TOML.replace(
            r#"subjects = ["Physics", "Chemistry", "Biology"]"#,
            r#"subjects = ["Physics", "Chemistry"]"#,
        );
        let err = parse_catalog_str(&bad, &path()).unwrap_err();
        assert!(format!("{err:#}").contains("exactly 3 subjects"));
    }

    #[test]
    fn distribution_must_sum_to_one() {
        let bad = MINIMAL_TOML.replace(
            "distribution = { A = 0.2, B = 0.2, C = 0.2, S = 0.2, F = 0.2 }",
            "distribution = { A = 0.2, B = 0.2, C = 0.2, S = 0.2, F = 0.5 }",
        );
        let err = parse_catalog_str(&bad, &path()).unwrap_err();
        assert!(format!("{err:#}").contains("sum to 1"));
    }

    #[test]
    fn unknown_subject_in_bonus_table_fails() {
        let bad = MINIMAL_TOML.replace("al = { Biology = 0.9 }", "al = { Zoology = 0.9 }");
        let err = parse_catalog_str(&bad, &path()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown subject: Zoology"));
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_catalog_str("this is not [valid toml }{", &path());
        assert!(result.is_err());
    }

    #[test]
    fn parse_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("catalog.toml");
        std::fs::write(&file, MINIMAL_TOML).unwrap();

        let catalog = parse_catalog(&file).unwrap();
        assert_eq!(catalog.careers().len(), 2);

        assert!(parse_catalog(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn standard_catalog_warns_about_unreachable_subjects() {
        let warnings = validate_catalog(&Catalog::standard());
        let scopes: Vec<_> = warnings.iter().filter_map(|w| w.scope.as_deref()).collect();
        assert_eq!(scopes, vec!["Economics", "Business_Studies"]);
    }

    #[test]
    fn warns_about_empty_and_negative_tables() {
        let toml = MINIMAL_TOML.replace("ol = { Maths = 0.1 }", "ol = { Maths = -0.1 }");
        let catalog = parse_catalog_str(&toml, &path()).unwrap();
        let warnings = validate_catalog(&catalog);

        assert!(warnings
            .iter()
            .any(|w| w.scope.as_deref() == Some("Trades") && w.message.contains("no bonus")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("negative weight for OL Maths")));
    }
}
