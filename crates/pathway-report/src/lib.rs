//! pathway-report: Output formats for generated datasets.
//!
//! - `training`: per-level CSV tables in raw and processed encodings
//! - `markdown`: human-readable batch summary

pub mod markdown;
pub mod training;
