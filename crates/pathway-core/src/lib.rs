//! pathway-core: Synthetic academic profiles and career-compatibility scoring.
//!
//! This crate defines the catalog tables, the grade sampler, the profile
//! generator and the scoring formula that the rest of pathway builds on,
//! plus a batch engine that generates and scores records in parallel.
//!
//! ```no_run
//! use pathway_core::catalog::Catalog;
//! use pathway_core::generator::ProfileGenerator;
//! use pathway_core::scorer::score;
//! use rand::SeedableRng;
//!
//! let catalog = Catalog::standard();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let record = ProfileGenerator::new(&catalog).generate(&mut rng)?;
//! let distribution = score(catalog.compatibility(), &record)?;
//! println!("{:?}", distribution.top());
//! # Ok::<(), pathway_core::error::CoreError>(())
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod report;
pub mod sampler;
pub mod scorer;
pub mod standard;
pub mod statistics;
pub mod validation;
