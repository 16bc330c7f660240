//! Immutable reference tables: subjects, streams, tiers and career weights.
//!
//! A [`Catalog`] is built once, checked once, and then shared read-only by
//! every generator and scorer. All lookups are pure. Unknown ids fail fast
//! with [`ConfigError`]; a factor missing from a career's bonus table is
//! worth 0.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::EducationLevel;
use crate::sampler::{GradeDistribution, SUM_TOLERANCE};

/// Which examination a subject belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectLevel {
    Ol,
    Al,
}

impl fmt::Display for SubjectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectLevel::Ol => write!(f, "OL"),
            SubjectLevel::Al => write!(f, "AL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub level: SubjectLevel,
    /// 0.0 is the easiest, 1.0 the hardest.
    pub difficulty: f64,
}

/// Closed interval `[min, max]` used for aptitude and GPA draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Uniform draw from one `u` in [0, 1).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        self.min + (self.max - self.min) * u
    }
}

/// An AL track with its three mandatory subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    pub subjects: [String; 3],
    /// Selection weight when the generator draws a stream.
    pub weight: f64,
    pub aptitude: ScoreRange,
}

/// Proportions over education levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelWeights {
    #[serde(rename = "OL")]
    pub ol: f64,
    #[serde(rename = "AL")]
    pub al: f64,
    #[serde(rename = "UNI")]
    pub uni: f64,
}

impl LevelWeights {
    pub fn weight(&self, level: EducationLevel) -> f64 {
        match level {
            EducationLevel::Ol => self.ol,
            EducationLevel::Al => self.al,
            EducationLevel::Uni => self.uni,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpaTier {
    Top,
    Mid,
    Standard,
}

impl fmt::Display for GpaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpaTier::Top => write!(f, "top"),
            GpaTier::Mid => write!(f, "mid"),
            GpaTier::Standard => write!(f, "standard"),
        }
    }
}

/// Aptitude thresholds and the GPA range of each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpaTiers {
    pub top_threshold: f64,
    pub mid_threshold: f64,
    pub top: ScoreRange,
    pub mid: ScoreRange,
    pub standard: ScoreRange,
}

impl GpaTiers {
    /// Bucket an aptitude score. Both comparisons are strict: a score equal
    /// to a threshold falls into the lower tier.
    pub fn tier_for(&self, aptitude: f64) -> GpaTier {
        if aptitude > self.top_threshold {
            GpaTier::Top
        } else if aptitude > self.mid_threshold {
            GpaTier::Mid
        } else {
            GpaTier::Standard
        }
    }

    pub fn range(&self, tier: GpaTier) -> ScoreRange {
        match tier {
            GpaTier::Top => self.top,
            GpaTier::Mid => self.mid,
            GpaTier::Standard => self.standard,
        }
    }
}

/// A key into a career's bonus table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor<'a> {
    OlSubject(&'a str),
    AlSubject(&'a str),
    Aptitude,
    Gpa,
    Stream(&'a str),
}

/// Per-career bonus weights. Weights may be negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusTable {
    #[serde(default)]
    pub aptitude: f64,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default)]
    pub ol: BTreeMap<String, f64>,
    #[serde(default)]
    pub al: BTreeMap<String, f64>,
    #[serde(default)]
    pub stream: BTreeMap<String, f64>,
}

impl BonusTable {
    /// Weight for `factor`, or 0 when the table does not define it.
    pub fn weight(&self, factor: Factor<'_>) -> f64 {
        match factor {
            Factor::OlSubject(name) => self.ol.get(name).copied().unwrap_or(0.0),
            Factor::AlSubject(name) => self.al.get(name).copied().unwrap_or(0.0),
            Factor::Aptitude => self.aptitude,
            Factor::Gpa => self.gpa,
            Factor::Stream(name) => self.stream.get(name).copied().unwrap_or(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.aptitude == 0.0
            && self.gpa == 0.0
            && self.ol.is_empty()
            && self.al.is_empty()
            && self.stream.is_empty()
    }

    /// Every defined weight with a printable label.
    pub fn entries(&self) -> Vec<(String, f64)> {
        let mut out = vec![
            ("aptitude".to_string(), self.aptitude),
            ("gpa".to_string(), self.gpa),
        ];
        for (k, v) in &self.ol {
            out.push((format!("OL {k}"), *v));
        }
        for (k, v) in &self.al {
            out.push((format!("AL {k}"), *v));
        }
        for (k, v) in &self.stream {
            out.push((format!("stream {k}"), *v));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub name: String,
    /// Prior weight before any bonus.
    pub base: f64,
    #[serde(default)]
    pub bonus: BonusTable,
}

/// Careers in declared order with their weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityTable {
    careers: Vec<Career>,
}

impl CompatibilityTable {
    pub fn new(careers: Vec<Career>) -> Self {
        Self { careers }
    }

    pub fn careers(&self) -> &[Career] {
        &self.careers
    }

    pub fn career(&self, name: &str) -> Result<&Career, ConfigError> {
        self.careers
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCareer(name.to_string()))
    }
}

/// Unchecked catalog contents. Turned into a [`Catalog`] by [`Catalog::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSpec {
    pub name: String,
    pub levels: LevelWeights,
    /// OL and AL subjects in declared order.
    pub subjects: Vec<Subject>,
    /// Hand-tuned A/B/C/S/F proportions per AL subject.
    pub al_distributions: BTreeMap<String, [f64; 5]>,
    pub streams: Vec<Stream>,
    pub gpa: GpaTiers,
    pub compatibility: CompatibilityTable,
}

/// The checked, immutable catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    spec: CatalogSpec,
    distributions: BTreeMap<String, GradeDistribution>,
}

impl Catalog {
    /// Check `spec` and freeze it.
    pub fn new(spec: CatalogSpec) -> Result<Self, ConfigError> {
        check(&spec)?;
        Ok(Self::assemble(spec))
    }

    /// The built-in table with six careers and four science streams.
    pub fn standard() -> Self {
        Self::assemble(crate::standard::standard_spec())
    }

    fn assemble(spec: CatalogSpec) -> Self {
        let distributions = spec
            .al_distributions
            .iter()
            .map(|(name, p)| (name.clone(), GradeDistribution::normalized(*p)))
            .collect();
        Self {
            spec,
            distributions,
        }
    }

    pub fn spec(&self) -> &CatalogSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn level_weights(&self) -> &LevelWeights {
        &self.spec.levels
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.spec.subjects
    }

    pub fn ol_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects_at(SubjectLevel::Ol)
    }

    pub fn al_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects_at(SubjectLevel::Al)
    }

    fn subjects_at(&self, level: SubjectLevel) -> impl Iterator<Item = &Subject> {
        self.spec.subjects.iter().filter(move |s| s.level == level)
    }

    pub fn subject(&self, name: &str) -> Result<&Subject, ConfigError> {
        self.spec
            .subjects
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownSubject(name.to_string()))
    }

    pub fn difficulty(&self, subject: &str) -> Result<f64, ConfigError> {
        Ok(self.subject(subject)?.difficulty)
    }

    pub fn streams(&self) -> &[Stream] {
        &self.spec.streams
    }

    pub fn stream(&self, name: &str) -> Result<&Stream, ConfigError> {
        self.spec
            .streams
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownStream(name.to_string()))
    }

    /// Position of `name` in declared stream order.
    pub fn stream_index(&self, name: &str) -> Option<usize> {
        self.spec.streams.iter().position(|s| s.name == name)
    }

    /// The three AL subjects a stream requires, in declared order.
    pub fn subjects_for_stream(&self, stream: &str) -> Result<&[String; 3], ConfigError> {
        Ok(&self.stream(stream)?.subjects)
    }

    pub fn aptitude_range(&self, stream: &str) -> Result<ScoreRange, ConfigError> {
        Ok(self.stream(stream)?.aptitude)
    }

    /// AL subjects taken by at least one stream, in declared subject order.
    pub fn reachable_al_subjects(&self) -> Vec<&str> {
        let used: BTreeSet<&str> = self
            .spec
            .streams
            .iter()
            .flat_map(|s| s.subjects.iter().map(String::as_str))
            .collect();
        self.al_subjects()
            .map(|s| s.name.as_str())
            .filter(|name| used.contains(name))
            .collect()
    }

    pub fn al_distribution(&self, subject: &str) -> Result<&GradeDistribution, ConfigError> {
        match self.subject(subject)?.level {
            SubjectLevel::Al => self
                .distributions
                .get(subject)
                .ok_or_else(|| ConfigError::MissingGradeDistribution(subject.to_string())),
            SubjectLevel::Ol => Err(ConfigError::UnknownSubject(subject.to_string())),
        }
    }

    pub fn gpa_tiers(&self) -> &GpaTiers {
        &self.spec.gpa
    }

    pub fn compatibility(&self) -> &CompatibilityTable {
        &self.spec.compatibility
    }

    pub fn careers(&self) -> &[Career] {
        self.spec.compatibility.careers()
    }

    pub fn base_compatibility(&self, career: &str) -> Result<f64, ConfigError> {
        Ok(self.spec.compatibility.career(career)?.base)
    }

    pub fn bonus_table(&self, career: &str) -> Result<&BonusTable, ConfigError> {
        Ok(&self.spec.compatibility.career(career)?.bonus)
    }
}

// ---------------------------------------------------------------------------
// Hard checks
// ---------------------------------------------------------------------------

fn check(spec: &CatalogSpec) -> Result<(), ConfigError> {
    if !spec.subjects.iter().any(|s| s.level == SubjectLevel::Ol) {
        return Err(ConfigError::Empty("OL subjects"));
    }
    if spec.streams.is_empty() {
        return Err(ConfigError::Empty("streams"));
    }
    if spec.compatibility.careers().is_empty() {
        return Err(ConfigError::Empty("careers"));
    }

    check_unique("subject", spec.subjects.iter().map(|s| s.name.as_str()))?;
    for subject in &spec.subjects {
        if !subject.difficulty.is_finite() || !(0.0..=1.0).contains(&subject.difficulty) {
            return Err(ConfigError::InvalidDifficulty {
                subject: subject.name.clone(),
                value: subject.difficulty,
            });
        }
    }

    let level_of = |name: &str| {
        spec.subjects
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.level)
    };

    for (name, proportions) in &spec.al_distributions {
        match level_of(name) {
            Some(SubjectLevel::Al) => {
                GradeDistribution::from_proportions(name, *proportions)?;
            }
            _ => return Err(ConfigError::UnknownSubject(name.clone())),
        }
    }

    let levels = &spec.levels;
    check_weights("education level", &[levels.ol, levels.al, levels.uni])?;

    check_unique("stream", spec.streams.iter().map(|s| s.name.as_str()))?;
    for stream in &spec.streams {
        let distinct: BTreeSet<&String> = stream.subjects.iter().collect();
        if distinct.len() != 3 {
            return Err(ConfigError::InvalidStream {
                stream: stream.name.clone(),
                reason: "its three subjects must be distinct".into(),
            });
        }
        for subject in &stream.subjects {
            match level_of(subject) {
                None => return Err(ConfigError::UnknownSubject(subject.clone())),
                Some(SubjectLevel::Ol) => {
                    return Err(ConfigError::InvalidStream {
                        stream: stream.name.clone(),
                        reason: format!("{subject} is not an AL subject"),
                    })
                }
                Some(SubjectLevel::Al) => {}
            }
            if !spec.al_distributions.contains_key(subject) {
                return Err(ConfigError::MissingGradeDistribution(subject.clone()));
            }
        }
        check_range(&format!("{} aptitude", stream.name), &stream.aptitude)?;
    }
    let stream_weights: Vec<f64> = spec.streams.iter().map(|s| s.weight).collect();
    check_weights("stream", &stream_weights)?;

    let gpa = &spec.gpa;
    if !gpa.top_threshold.is_finite()
        || !gpa.mid_threshold.is_finite()
        || gpa.top_threshold <= gpa.mid_threshold
    {
        return Err(ConfigError::InvalidThresholds {
            top: gpa.top_threshold,
            mid: gpa.mid_threshold,
        });
    }
    check_range("top GPA tier", &gpa.top)?;
    check_range("mid GPA tier", &gpa.mid)?;
    check_range("standard GPA tier", &gpa.standard)?;

    let careers = spec.compatibility.careers();
    check_unique("career", careers.iter().map(|c| c.name.as_str()))?;
    for career in careers {
        check_finite(&format!("{} base", career.name), career.base)?;
        let bonus = &career.bonus;
        check_finite(&format!("{} aptitude", career.name), bonus.aptitude)?;
        check_finite(&format!("{} gpa", career.name), bonus.gpa)?;
        for (subject, w) in &bonus.ol {
            if level_of(subject) != Some(SubjectLevel::Ol) {
                return Err(ConfigError::UnknownSubject(subject.clone()));
            }
            check_finite(&format!("{} OL {subject}", career.name), *w)?;
        }
        for (subject, w) in &bonus.al {
            if level_of(subject) != Some(SubjectLevel::Al) {
                return Err(ConfigError::UnknownSubject(subject.clone()));
            }
            check_finite(&format!("{} AL {subject}", career.name), *w)?;
        }
        for (stream, w) in &bonus.stream {
            if !spec.streams.iter().any(|s| &s.name == stream) {
                return Err(ConfigError::UnknownStream(stream.clone()));
            }
            check_finite(&format!("{} stream {stream}", career.name), *w)?;
        }
    }

    Ok(())
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_weights(name: &str, weights: &[f64]) -> Result<(), ConfigError> {
    let total: f64 = weights.iter().sum();
    let well_formed = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
    if !well_formed || !total.is_finite() || (total - 1.0).abs() > SUM_TOLERANCE {
        return Err(ConfigError::InvalidDistribution {
            name: name.to_string(),
            total,
        });
    }
    Ok(())
}

fn check_range(what: &str, range: &ScoreRange) -> Result<(), ConfigError> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
        return Err(ConfigError::InvalidRange {
            what: what.to_string(),
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

fn check_finite(what: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteWeight(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::standard_spec;

    #[test]
    fn standard_catalog_passes_checks() {
        let catalog = Catalog::new(standard_spec()).unwrap();
        assert_eq!(catalog.name(), "standard");
        assert_eq!(catalog.ol_subjects().count(), 6);
        assert_eq!(catalog.streams().len(), 4);
        assert_eq!(catalog.careers().len(), 6);
    }

    #[test]
    fn subjects_for_stream_in_declared_order() {
        let catalog = Catalog::standard();
        let stream = "Physical Science with ICT";
        assert_eq!(
            catalog.subjects_for_stream(stream).unwrap(),
            &["Combined_Maths", "Physics", "ICT"]
        );
        assert_eq!(
            catalog.subjects_for_stream("Arts"),
            Err(ConfigError::UnknownStream("Arts".into()))
        );
    }

    #[test]
    fn lookups_fail_fast_on_unknown_ids() {
        let catalog = Catalog::standard();
        assert!((catalog.difficulty("Maths").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            catalog.difficulty("Latin"),
            Err(ConfigError::UnknownSubject("Latin".into()))
        );
        let teaching = catalog.base_compatibility("Teaching").unwrap();
        assert!((teaching - 0.30).abs() < 1e-12);
        assert_eq!(
            catalog.base_compatibility("Law"),
            Err(ConfigError::UnknownCareer("Law".into()))
        );
        assert!(catalog.bonus_table("Law").is_err());
        assert_eq!(
            catalog.al_distribution("Maths"),
            Err(ConfigError::UnknownSubject("Maths".into()))
        );
    }

    #[test]
    fn missing_factor_is_worth_zero() {
        let catalog = Catalog::standard();
        let it = catalog.bonus_table("IT").unwrap();
        assert_eq!(it.weight(Factor::OlSubject("Religion")), 0.0);
        assert_eq!(it.weight(Factor::Stream("Biological Science")), 0.0);
        assert!((it.weight(Factor::AlSubject("ICT")) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn factor_kinds_do_not_collide() {
        let table = BonusTable {
            ol: BTreeMap::from([("Science".to_string(), 0.4)]),
            stream: BTreeMap::from([("Science".to_string(), -0.1)]),
            ..BonusTable::default()
        };
        assert_eq!(table.weight(Factor::OlSubject("Science")), 0.4);
        assert_eq!(table.weight(Factor::Stream("Science")), -0.1);
        assert_eq!(table.weight(Factor::AlSubject("Science")), 0.0);
    }

    #[test]
    fn gpa_tier_thresholds_are_strict() {
        let tiers = Catalog::standard().gpa_tiers().to_owned();
        assert_eq!(tiers.tier_for(3.0000001), GpaTier::Top);
        assert_eq!(tiers.tier_for(3.0), GpaTier::Mid);
        assert_eq!(tiers.tier_for(2.5000001), GpaTier::Mid);
        assert_eq!(tiers.tier_for(2.5), GpaTier::Standard);
        assert_eq!(tiers.tier_for(1.0), GpaTier::Standard);
    }

    #[test]
    fn reachable_subjects_exclude_unused_al_subjects() {
        let catalog = Catalog::standard();
        let reachable = catalog.reachable_al_subjects();
        assert_eq!(reachable.len(), 6);
        assert_eq!(reachable[..3], ["Physics", "Chemistry", "Combined_Maths"]);
        assert_eq!(reachable[3..], ["Biology", "ICT", "Agriculture"]);
    }

    #[test]
    fn stream_with_ol_subject_is_rejected() {
        let mut spec = standard_spec();
        spec.streams[0].subjects[2] = "Maths".into();
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::InvalidStream { .. })
        ));
    }

    #[test]
    fn stream_with_repeated_subject_is_rejected() {
        let mut spec = standard_spec();
        spec.streams[1].subjects[1] = spec.streams[1].subjects[0].clone();
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::InvalidStream { .. })
        ));
    }

    #[test]
    fn stream_subject_without_distribution_is_rejected() {
        let mut spec = standard_spec();
        spec.al_distributions.remove("ICT");
        assert_eq!(
            Catalog::new(spec).unwrap_err(),
            ConfigError::MissingGradeDistribution("ICT".into())
        );
    }

    #[test]
    fn level_weights_must_sum_to_one() {
        let mut spec = standard_spec();
        spec.levels.uni = 0.5;
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn difficulty_out_of_range_is_rejected() {
        let mut spec = standard_spec();
        spec.subjects[0].difficulty = 1.2;
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::InvalidDifficulty { .. })
        ));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut spec = standard_spec();
        spec.gpa.mid_threshold = 3.5;
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn bonus_for_unknown_stream_is_rejected() {
        let mut spec = standard_spec();
        let mut careers = spec.compatibility.careers().to_vec();
        careers[0].bonus.stream.insert("Arts".into(), 0.2);
        spec.compatibility = CompatibilityTable::new(careers);
        assert_eq!(
            Catalog::new(spec).unwrap_err(),
            ConfigError::UnknownStream("Arts".into())
        );
    }

    #[test]
    fn duplicate_career_is_rejected() {
        let mut spec = standard_spec();
        let mut careers = spec.compatibility.careers().to_vec();
        careers.push(careers[0].clone());
        spec.compatibility = CompatibilityTable::new(careers);
        assert!(matches!(
            Catalog::new(spec),
            Err(ConfigError::Duplicate { kind: "career", .. })
        ));
    }

    #[test]
    fn score_range_sample_stays_inside() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let range = ScoreRange::new(1.8, 3.2);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }
}
