//! User configuration for the pathway CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level pathway configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayConfig {
    /// Catalog file to load instead of the built-in tables.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Base seed for batch generation.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Records per batch.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Max chunks generated concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Records per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Output directory for datasets.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_seed() -> u64 {
    42
}
fn default_count() -> usize {
    5000
}
fn default_parallelism() -> usize {
    4
}
fn default_chunk_size() -> usize {
    500
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("pathway-data")
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            seed: default_seed(),
            count: default_count(),
            parallelism: default_parallelism(),
            chunk_size: default_chunk_size(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `pathway.toml` in the current directory
/// 2. `~/.config/pathway/config.toml`
///
/// Environment variable overrides: `PATHWAY_CATALOG`, `PATHWAY_SEED`,
/// `PATHWAY_COUNT`, `PATHWAY_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<PathwayConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("pathway.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<PathwayConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => PathwayConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut PathwayConfig) -> Result<()> {
    if let Ok(catalog) = std::env::var("PATHWAY_CATALOG") {
        config.catalog = Some(PathBuf::from(catalog));
    }
    if let Ok(seed) = std::env::var("PATHWAY_SEED") {
        config.seed = seed
            .trim()
            .parse()
            .with_context(|| format!("PATHWAY_SEED is not a valid seed: '{seed}'"))?;
    }
    if let Ok(count) = std::env::var("PATHWAY_COUNT") {
        config.count = count
            .trim()
            .parse()
            .with_context(|| format!("PATHWAY_COUNT is not a valid count: '{count}'"))?;
    }
    if let Ok(dir) = std::env::var("PATHWAY_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("pathway"))
}
