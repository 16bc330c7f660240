//! Dataset report with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::ScoredProfile;
use crate::generator::ProfileRequest;
use crate::model::EducationLevel;
use crate::statistics::BatchStats;

/// A generated dataset and its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Name of the catalog the records were drawn from.
    pub catalog: String,
    pub seed: u64,
    pub count: usize,
    /// Level and stream constraints used for the batch.
    #[serde(default)]
    pub request: ProfileRequest,
    pub profiles: Vec<ScoredProfile>,
    pub stats: BatchStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl DatasetReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: DatasetReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Profiles at one education level, in batch order.
    pub fn profiles_at(&self, level: EducationLevel) -> impl Iterator<Item = &ScoredProfile> {
        self.profiles
            .iter()
            .filter(move |p| p.record.level() == level)
    }

    /// Profiles at `level` grouped by stream. OL profiles have no stream and
    /// are not returned.
    pub fn by_stream(&self, level: EducationLevel) -> BTreeMap<&str, Vec<&ScoredProfile>> {
        let mut groups: BTreeMap<&str, Vec<&ScoredProfile>> = BTreeMap::new();
        for profile in self.profiles_at(level) {
            if let Some(stream) = profile.record.stream() {
                groups.entry(stream).or_default().push(profile);
            }
        }
        groups
    }
}
