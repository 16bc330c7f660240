//! Batch generation orchestrator.
//!
//! Records are partitioned into fixed-size chunks. Chunk `k` draws from a
//! private generator seeded with [`chunk_seed`]`(seed, k)`, so the output
//! depends only on the seed and chunk size, never on parallelism or
//! completion order. Chunks run on the blocking pool under a semaphore and
//! are reassembled in chunk order. Any failed chunk fails the whole batch.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::generator::{ProfileGenerator, ProfileRequest};
use crate::model::{AcademicRecord, CareerDistribution};
use crate::report::DatasetReport;
use crate::scorer::score;
use crate::statistics::compute_batch_stats;

/// Configuration for a generation batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of records to generate.
    pub count: usize,
    /// Base seed; chunk seeds are derived from it.
    pub seed: u64,
    /// Maximum chunks generated concurrently.
    pub parallelism: usize,
    /// Records per chunk.
    pub chunk_size: usize,
    /// Constraints applied to every record.
    pub request: ProfileRequest,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            seed: 42,
            parallelism: 4,
            chunk_size: 500,
            request: ProfileRequest::default(),
        }
    }
}

/// A generated record with its distribution attached as a sibling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProfile {
    /// Position in the batch.
    pub index: usize,
    pub record: AcademicRecord,
    pub distribution: CareerDistribution,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_chunk_start(&self, chunk: usize, size: usize);
    fn on_chunk_complete(&self, chunk: usize, generated: usize);
    fn on_batch_complete(&self, total: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_chunk_start(&self, _: usize, _: usize) {}
    fn on_chunk_complete(&self, _: usize, _: usize) {}
    fn on_batch_complete(&self, _: usize, _: Duration) {}
}

/// Generates and scores batches of synthetic records.
pub struct BatchEngine {
    catalog: Arc<Catalog>,
    config: BatchConfig,
}

impl BatchEngine {
    pub fn new(catalog: Arc<Catalog>, config: BatchConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Generate, score and summarize a batch.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<DatasetReport> {
        let start = Instant::now();
        let config = &self.config;
        anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
        anyhow::ensure!(config.chunk_size >= 1, "chunk size must be at least 1");

        if let Some(stream) = &config.request.stream {
            self.catalog.stream(stream)?;
        }

        let ranges = chunk_ranges(config.count, config.chunk_size);
        let semaphore = Arc::new(Semaphore::new(config.parallelism));
        let mut futures = FuturesUnordered::new();

        for (chunk, range) in ranges.iter().cloned().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);
            let request = config.request.clone();
            let seed = chunk_seed(config.seed, chunk as u64);

            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                progress.on_chunk_start(chunk, range.len());
                tracing::debug!("chunk {chunk}: generating records {range:?}");

                let profiles = tokio::task::spawn_blocking(move || {
                    generate_chunk(&catalog, &request, seed, range)
                })
                .await
                .with_context(|| format!("generation worker for chunk {chunk} failed"))??;

                Ok::<_, anyhow::Error>((chunk, profiles))
            });
        }

        let mut chunks: Vec<Option<Vec<ScoredProfile>>> = vec![None; ranges.len()];
        while let Some(result) = futures.next().await {
            let (chunk, profiles) = match result {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("batch aborted: {e:#}");
                    return Err(e);
                }
            };
            progress.on_chunk_complete(chunk, profiles.len());
            chunks[chunk] = Some(profiles);
        }

        let profiles: Vec<ScoredProfile> = chunks.into_iter().flatten().flatten().collect();
        let elapsed = start.elapsed();
        progress.on_batch_complete(profiles.len(), elapsed);
        tracing::info!(
            "generated {} records in {} chunks ({:.1}s)",
            profiles.len(),
            ranges.len(),
            elapsed.as_secs_f64()
        );

        let stats = compute_batch_stats(&profiles);

        Ok(DatasetReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            catalog: self.catalog.name().to_string(),
            seed: config.seed,
            count: profiles.len(),
            request: config.request.clone(),
            profiles,
            stats,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Generate and score the records in `range` from one seeded generator.
pub fn generate_chunk(
    catalog: &Catalog,
    request: &ProfileRequest,
    seed: u64,
    range: Range<usize>,
) -> Result<Vec<ScoredProfile>, CoreError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let generator = ProfileGenerator::new(catalog);

    range
        .map(|index| {
            let record = generator.generate_with(request, &mut rng)?;
            let distribution = score(catalog.compatibility(), &record)?;
            Ok(ScoredProfile {
                index,
                record,
                distribution,
            })
        })
        .collect()
}

/// Generate a whole batch on the calling thread. Produces exactly what
/// [`BatchEngine::run`] produces for the same config.
pub fn generate_sequential(
    catalog: &Catalog,
    config: &BatchConfig,
) -> Result<Vec<ScoredProfile>, CoreError> {
    let mut out = Vec::with_capacity(config.count);
    let ranges = chunk_ranges(config.count, config.chunk_size.max(1));
    for (chunk, range) in ranges.into_iter().enumerate() {
        let seed = chunk_seed(config.seed, chunk as u64);
        out.extend(generate_chunk(catalog, &config.request, seed, range)?);
    }
    Ok(out)
}

/// Derive an independent seed for chunk `chunk` (SplitMix64 finalizer).
pub fn chunk_seed(seed: u64, chunk: u64) -> u64 {
    let mut z = seed.wrapping_add(chunk.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn chunk_ranges(count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(count))
        .collect()
}
