//! The `pathway init` command.

use std::path::Path;

use anyhow::{Context, Result};

use pathway_core::catalog::Catalog;
use pathway_core::parser::catalog_to_toml;

pub fn execute(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let catalog = catalog_to_toml(&Catalog::standard())?;
    let files = [
        ("pathway.toml", SAMPLE_CONFIG),
        ("catalog.toml", catalog.as_str()),
        ("record.json", EXAMPLE_RECORD),
    ];

    for (name, content) in files {
        let path = dir.join(name);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
        } else {
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Created {}", path.display());
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: pathway validate --catalog catalog.toml");
    println!("  2. Run: pathway score --input record.json --explain");
    println!("  3. Run: pathway generate --count 1000 --by-stream");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# pathway configuration

# Catalog file; the built-in tables are used when unset.
# catalog = "catalog.toml"

seed = 42
count = 5000
parallelism = 4
chunk_size = 500
output_dir = "pathway-data"
"#;

const EXAMPLE_RECORD: &str = r#"{
  "education_level": "UNI",
  "ol_grades": {
    "Maths": "A",
    "Science": "B",
    "English": "A",
    "Sinhala": "B",
    "History": "C",
    "Religion": "A"
  },
  "stream": "Physical Science",
  "al_grades": {
    "Combined_Maths": "A",
    "Physics": "B",
    "Chemistry": "B"
  },
  "aptitude": 2.8,
  "gpa": 3.5
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_core::parser::parse_catalog;
    use pathway_core::scorer::score_record;
    use pathway_core::validation::RecordInput;

    #[test]
    fn example_record_scores_against_written_catalog() {
        let dir = tempfile::tempdir().unwrap();
        execute(dir.path()).unwrap();

        let catalog = parse_catalog(&dir.path().join("catalog.toml")).unwrap();
        assert_eq!(catalog.spec(), Catalog::standard().spec());

        let input: RecordInput = serde_json::from_str(EXAMPLE_RECORD).unwrap();
        let record = input.into_record(&catalog).unwrap();
        let distribution = score_record(&catalog, &record).unwrap();
        assert!((distribution.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sample_config_parses() {
        let config: crate::config::PathwayConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config, crate::config::PathwayConfig::default());
    }

    #[test]
    fn existing_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("record.json"), "{}").unwrap();
        execute(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("record.json")).unwrap(),
            "{}"
        );
        assert!(dir.path().join("pathway.toml").exists());
    }
}
