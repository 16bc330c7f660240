//! Difficulty-skewed categorical grade sampling.
//!
//! OL grades come from a shared base shape bent by subject difficulty: the
//! A/B mass shrinks by `(1 - d)` and the C/S/F mass grows by `(1 + d)`. AL
//! grades come from hand-tuned per-subject distributions held in the
//! catalog. Both are drawn with the same cumulative walk.

use rand::Rng;

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::model::Grade;

/// Base shape over A, B, C, S, F before difficulty adjustment.
pub const BASE_SHAPE: [f64; 5] = [0.25, 0.35, 0.25, 0.10, 0.05];

/// Floor for each unnormalized class weight. At difficulty 1.0 the A/B
/// mass would otherwise vanish; every class must stay drawable.
pub const MIN_CLASS_WEIGHT: f64 = 1e-3;

/// Tolerance for hand-tuned proportions that must sum to one.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Probabilities over the five grade classes, in declared order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeDistribution {
    probs: [f64; 5],
}

impl GradeDistribution {
    /// The base shape adjusted for a subject difficulty in [0, 1].
    ///
    /// Out-of-range difficulties are clamped; NaN is treated as 0.
    pub fn for_difficulty(difficulty: f64) -> Self {
        let d = if difficulty.is_nan() {
            0.0
        } else {
            difficulty.clamp(0.0, 1.0)
        };

        let mut weights = BASE_SHAPE;
        for (i, w) in weights.iter_mut().enumerate() {
            let factor = if i < 2 { 1.0 - d } else { 1.0 + d };
            *w = (*w * factor).max(MIN_CLASS_WEIGHT);
        }
        Self::normalized(weights)
    }

    /// Validate hand-tuned proportions and normalize away rounding drift.
    pub fn from_proportions(name: &str, proportions: [f64; 5]) -> Result<Self, ConfigError> {
        let total: f64 = proportions.iter().sum();
        let well_formed = proportions.iter().all(|p| p.is_finite() && *p >= 0.0);
        if !well_formed || !total.is_finite() || (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(ConfigError::InvalidDistribution {
                name: name.to_string(),
                total,
            });
        }
        Ok(Self::normalized(proportions))
    }

    /// Divide by the total. Callers guarantee a positive finite total.
    pub(crate) fn normalized(weights: [f64; 5]) -> Self {
        let total: f64 = weights.iter().sum();
        let mut probs = weights;
        for p in &mut probs {
            *p /= total;
        }
        Self { probs }
    }

    pub fn probability(&self, grade: Grade) -> f64 {
        self.probs[usize::from(grade.rank())]
    }

    pub fn probabilities(&self) -> [f64; 5] {
        self.probs
    }

    /// Select the first class whose cumulative probability reaches `u`.
    ///
    /// Walks A, B, C, S, F in order, skipping zero-probability classes. If
    /// rounding leaves the cumulative sum short of `u`, the draw falls back
    /// to the last class with positive probability.
    pub fn pick(&self, u: f64) -> Grade {
        let mut cumulative = 0.0;
        let mut last = Grade::F;
        for (grade, p) in Grade::ALL.iter().zip(self.probs) {
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last = *grade;
            if u <= cumulative {
                return *grade;
            }
        }
        last
    }

    /// Draw one grade with a single uniform `u` in [0, 1).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Grade {
        let u: f64 = rng.gen();
        self.pick(u)
    }
}

/// Draws grades for catalog subjects.
#[derive(Debug, Clone, Copy)]
pub struct GradeSampler<'a> {
    catalog: &'a Catalog,
}

impl<'a> GradeSampler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Draw from the difficulty-adjusted shape for `subject`.
    pub fn sample_ol<R: Rng + ?Sized>(
        &self,
        subject: &str,
        rng: &mut R,
    ) -> Result<Grade, ConfigError> {
        let difficulty = self.catalog.difficulty(subject)?;
        Ok(GradeDistribution::for_difficulty(difficulty).sample(rng))
    }

    /// Draw from the hand-tuned distribution of AL `subject`.
    pub fn sample_al<R: Rng + ?Sized>(
        &self,
        subject: &str,
        rng: &mut R,
    ) -> Result<Grade, ConfigError> {
        Ok(self.catalog.al_distribution(subject)?.sample(rng))
    }
}
