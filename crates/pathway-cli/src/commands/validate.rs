//! The `pathway validate` command.

use std::path::PathBuf;

use anyhow::Result;

use super::load_catalog;
use crate::config::load_config_from;

pub fn execute(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = load_catalog(catalog_path.or(config.catalog).as_deref())?;

    println!(
        "Catalog: {} ({} subjects, {} streams, {} careers)",
        catalog.name(),
        catalog.subjects().len(),
        catalog.streams().len(),
        catalog.careers().len()
    );

    let warnings = pathway_core::parser::validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .scope
            .as_ref()
            .map(|scope| format!("  [{scope}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
