//! Aggregate statistics over a generated batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::ScoredProfile;
use crate::model::{EducationLevel, Grade};

/// Grade-class tallies for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "S")]
    pub s: usize,
    #[serde(rename = "F")]
    pub f: usize,
}

impl GradeCounts {
    pub fn add(&mut self, grade: Grade) {
        match grade {
            Grade::A => self.a += 1,
            Grade::B => self.b += 1,
            Grade::C => self.c += 1,
            Grade::S => self.s += 1,
            Grade::F => self.f += 1,
        }
    }

    pub fn get(&self, grade: Grade) -> usize {
        match grade {
            Grade::A => self.a,
            Grade::B => self.b,
            Grade::C => self.c,
            Grade::S => self.s,
            Grade::F => self.f,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.s + self.f
    }

    /// Fraction of draws that produced `grade`; 0 when empty.
    pub fn share(&self, grade: Grade) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.get(grade) as f64 / n as f64,
        }
    }
}

/// Per-career aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    pub career: String,
    /// Mean probability of the career across the batch.
    pub mean_probability: f64,
    /// How often the career was the most probable one.
    pub top_count: usize,
}

/// Summary of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub per_level: BTreeMap<EducationLevel, usize>,
    pub per_stream: BTreeMap<String, usize>,
    /// Careers in catalog order.
    pub careers: Vec<CareerStats>,
    pub mean_aptitude: Option<f64>,
    pub mean_gpa: Option<f64>,
    pub grade_frequencies: BTreeMap<String, GradeCounts>,
}

impl BatchStats {
    pub fn career(&self, name: &str) -> Option<&CareerStats> {
        self.careers.iter().find(|c| c.career == name)
    }
}

fn career_slot<'s>(careers: &'s mut Vec<CareerStats>, name: &str) -> &'s mut CareerStats {
    let index = match careers.iter().position(|c| c.career == name) {
        Some(index) => index,
        None => {
            careers.push(CareerStats {
                career: name.to_string(),
                ..CareerStats::default()
            });
            careers.len() - 1
        }
    };
    &mut careers[index]
}

/// Compute batch statistics from scored profiles.
pub fn compute_batch_stats(profiles: &[ScoredProfile]) -> BatchStats {
    let mut stats = BatchStats {
        total: profiles.len(),
        ..BatchStats::default()
    };

    let mut aptitudes = Vec::new();
    let mut gpas = Vec::new();

    for profile in profiles {
        let record = &profile.record;
        *stats.per_level.entry(record.level()).or_default() += 1;

        for (subject, grade) in record.ol_grades() {
            stats
                .grade_frequencies
                .entry(subject.clone())
                .or_default()
                .add(*grade);
        }

        if let Some(al) = record.al() {
            *stats.per_stream.entry(al.stream.clone()).or_default() += 1;
            aptitudes.push(al.aptitude);
            for (subject, grade) in &al.grades {
                stats
                    .grade_frequencies
                    .entry(subject.clone())
                    .or_default()
                    .add(*grade);
            }
        }

        if let Some(gpa) = record.gpa() {
            gpas.push(gpa);
        }

        // Distributions list careers in catalog order, so first sight fixes
        // the slot order.
        for entry in profile.distribution.iter() {
            career_slot(&mut stats.careers, &entry.career).mean_probability += entry.probability;
        }

        if let Some(top) = profile.distribution.top() {
            career_slot(&mut stats.careers, &top.career).top_count += 1;
        }
    }

    if !profiles.is_empty() {
        let n = profiles.len() as f64;
        for career in &mut stats.careers {
            career.mean_probability /= n;
        }
    }
    stats.mean_aptitude = mean(&aptitudes);
    stats.mean_gpa = mean(&gpas);

    stats
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
