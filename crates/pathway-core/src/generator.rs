//! Synthetic academic record generation.
//!
//! Draw order is fixed so a seeded random source reproduces the same
//! records: level, OL grades in declared subject order, stream, AL grades
//! in the stream's subject order, aptitude, GPA. Fixed parameters in a
//! [`ProfileRequest`] skip their draw.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Stream};
use crate::error::ConfigError;
use crate::model::{AcademicRecord, AlResults, EducationLevel, GradeMap};
use crate::sampler::GradeSampler;

/// Optional constraints on a generated record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    /// Fix the education level instead of drawing it.
    #[serde(default)]
    pub level: Option<EducationLevel>,
    /// Fix the stream for AL and UNI records instead of drawing it.
    #[serde(default)]
    pub stream: Option<String>,
}

impl ProfileRequest {
    pub fn at_level(level: EducationLevel) -> Self {
        Self {
            level: Some(level),
            stream: None,
        }
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }
}

/// Composes the catalog and grade sampler into complete records.
#[derive(Debug, Clone, Copy)]
pub struct ProfileGenerator<'a> {
    catalog: &'a Catalog,
    sampler: GradeSampler<'a>,
}

impl<'a> ProfileGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            sampler: GradeSampler::new(catalog),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Generate one record with every attribute drawn.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<AcademicRecord, ConfigError> {
        self.generate_with(&ProfileRequest::default(), rng)
    }

    /// Generate one record honoring `request`.
    ///
    /// An unknown requested stream fails before anything is drawn, even when
    /// the record ends up at OL and would not use it.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        request: &ProfileRequest,
        rng: &mut R,
    ) -> Result<AcademicRecord, ConfigError> {
        let fixed_stream = request
            .stream
            .as_deref()
            .map(|name| self.catalog.stream(name))
            .transpose()?;

        let level = match request.level {
            Some(level) => level,
            None => self.draw_level(rng),
        };

        let ol = self.draw_ol_grades(rng)?;

        match level {
            EducationLevel::Ol => Ok(AcademicRecord::Ordinary { ol }),
            EducationLevel::Al => {
                let al = self.draw_al(fixed_stream, rng)?;
                Ok(AcademicRecord::Advanced { ol, al })
            }
            EducationLevel::Uni => {
                let al = self.draw_al(fixed_stream, rng)?;
                let gpa = self.draw_gpa(al.aptitude, rng);
                Ok(AcademicRecord::University { ol, al, gpa })
            }
        }
    }

    fn draw_level<R: Rng + ?Sized>(&self, rng: &mut R) -> EducationLevel {
        let weights = self.catalog.level_weights();
        let u: f64 = rng.gen();
        let level_weights = EducationLevel::ALL.iter().map(|l| weights.weight(*l));
        let index = pick_index(level_weights, u);
        EducationLevel::ALL[index.min(EducationLevel::ALL.len() - 1)]
    }

    fn draw_ol_grades<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GradeMap, ConfigError> {
        let mut grades = GradeMap::new();
        for subject in self.catalog.ol_subjects() {
            let grade = self.sampler.sample_ol(&subject.name, rng)?;
            grades.insert(subject.name.clone(), grade);
        }
        Ok(grades)
    }

    fn draw_stream<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'a Stream, ConfigError> {
        let streams = self.catalog.streams();
        if streams.is_empty() {
            return Err(ConfigError::Empty("streams"));
        }
        let u: f64 = rng.gen();
        let index = pick_index(streams.iter().map(|s| s.weight), u);
        Ok(&streams[index.min(streams.len() - 1)])
    }

    fn draw_al<R: Rng + ?Sized>(
        &self,
        fixed_stream: Option<&'a Stream>,
        rng: &mut R,
    ) -> Result<AlResults, ConfigError> {
        let stream = match fixed_stream {
            Some(stream) => stream,
            None => self.draw_stream(rng)?,
        };

        let mut grades = GradeMap::new();
        for subject in &stream.subjects {
            let grade = self.sampler.sample_al(subject, rng)?;
            grades.insert(subject.clone(), grade);
        }

        let aptitude = stream.aptitude.sample(rng);

        Ok(AlResults {
            stream: stream.name.clone(),
            grades,
            aptitude,
        })
    }

    /// Draw a GPA from the tier `aptitude` falls into.
    pub fn draw_gpa<R: Rng + ?Sized>(&self, aptitude: f64, rng: &mut R) -> f64 {
        let tiers = self.catalog.gpa_tiers();
        tiers.range(tiers.tier_for(aptitude)).sample(rng)
    }
}

/// Index of the first positive weight whose running total reaches `u`, or
/// the last positive index when rounding leaves the total short.
fn pick_index(weights: impl Iterator<Item = f64>, u: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last = 0;
    for (i, w) in weights.enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last = i;
        if u <= cumulative {
            return i;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GpaTier;
    use crate::standard::{BIOLOGICAL_SCIENCE, PHYSICAL_SCIENCE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn ol_record_has_all_six_grades_and_nothing_else() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let record = generator
            .generate_with(&ProfileRequest::at_level(EducationLevel::Ol), &mut rng(1))
            .unwrap();

        assert_eq!(record.level(), EducationLevel::Ol);
        assert_eq!(record.ol_grades().len(), 6);
        assert!(record.stream().is_none());
        assert!(record.aptitude().is_none());
        assert!(record.gpa().is_none());
    }

    #[test]
    fn al_grades_cover_exactly_the_stream_subjects() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let request = ProfileRequest::at_level(EducationLevel::Al).with_stream(BIOLOGICAL_SCIENCE);

        for seed in 0..20 {
            let record = generator.generate_with(&request, &mut rng(seed)).unwrap();
            let al = record.al().unwrap();
            let keys: BTreeSet<&str> = al.grades.keys().map(String::as_str).collect();
            assert_eq!(keys, BTreeSet::from(["Biology", "Chemistry", "Physics"]));
            assert!(catalog
                .aptitude_range(BIOLOGICAL_SCIENCE)
                .unwrap()
                .contains(al.aptitude));
        }
    }

    #[test]
    fn uni_gpa_falls_in_the_tier_of_its_aptitude() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let request = ProfileRequest::at_level(EducationLevel::Uni);
        let tiers = catalog.gpa_tiers();

        for seed in 0..200 {
            let record = generator.generate_with(&request, &mut rng(seed)).unwrap();
            let aptitude = record.aptitude().unwrap();
            let gpa = record.gpa().unwrap();
            assert!(tiers.range(tiers.tier_for(aptitude)).contains(gpa));
        }
    }

    #[test]
    fn gpa_draw_uses_tier_ranges() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let tiers = catalog.gpa_tiers();
        let mut r = rng(3);

        assert!(tiers
            .range(GpaTier::Top)
            .contains(generator.draw_gpa(3.1, &mut r)));
        assert!(tiers
            .range(GpaTier::Mid)
            .contains(generator.draw_gpa(3.0, &mut r)));
        assert!(tiers
            .range(GpaTier::Standard)
            .contains(generator.draw_gpa(2.5, &mut r)));
    }

    #[test]
    fn unknown_stream_is_a_config_error() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        for level in EducationLevel::ALL {
            let request = ProfileRequest::at_level(level).with_stream("Arts");
            assert_eq!(
                generator.generate_with(&request, &mut rng(0)),
                Err(ConfigError::UnknownStream("Arts".into()))
            );
        }
    }

    #[test]
    fn same_seed_same_records() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let batch = |seed| {
            let mut r = rng(seed);
            (0..100)
                .map(|_| generator.generate(&mut r).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(batch(77), batch(77));
        assert_ne!(batch(77), batch(78));
    }

    #[test]
    fn level_and_stream_proportions_follow_weights() {
        let catalog = Catalog::standard();
        let generator = ProfileGenerator::new(&catalog);
        let mut r = rng(2024);
        let n = 20_000;
        let mut ol = 0usize;
        let mut physical = 0usize;
        let mut with_stream = 0usize;

        for _ in 0..n {
            let record = generator.generate(&mut r).unwrap();
            match record.stream() {
                None => ol += 1,
                Some(stream) => {
                    with_stream += 1;
                    if stream == PHYSICAL_SCIENCE {
                        physical += 1;
                    }
                }
            }
        }

        assert!((ol as f64 / n as f64 - 0.55).abs() < 0.02);
        assert!((physical as f64 / with_stream as f64 - 0.40).abs() < 0.03);
    }

    #[test]
    fn pick_index_falls_back_to_last() {
        assert_eq!(pick_index([0.5, 0.5].into_iter(), 0.0), 0);
        assert_eq!(pick_index([0.5, 0.5].into_iter(), 0.75), 1);
        assert_eq!(pick_index([0.3, 0.3].into_iter(), 0.99), 1);
    }

    #[test]
    fn pick_index_skips_zero_weights() {
        assert_eq!(pick_index([0.0, 1.0, 0.0].into_iter(), 0.0), 1);
        assert_eq!(pick_index([0.0, 1.0, 0.0].into_iter(), 1.5), 1);
        assert_eq!(pick_index([0.0, 0.4, 0.0, 0.6].into_iter(), 0.4), 1);
    }
}
