//! The `pathway tables` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use pathway_core::catalog::{Catalog, GpaTier, SubjectLevel};
use pathway_core::model::{EducationLevel, Grade};

use super::load_catalog;
use crate::config::load_config_from;

pub fn execute(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = load_catalog(catalog_path.or(config.catalog).as_deref())?;

    println!("Catalog: {}\n", catalog.name());
    println!("{}\n", levels_table(&catalog));
    println!("{}\n", streams_table(&catalog));
    println!("{}\n", subjects_table(&catalog));
    println!("{}", careers_table(&catalog));

    Ok(())
}

fn levels_table(catalog: &Catalog) -> Table {
    let weights = catalog.level_weights();
    let tiers = catalog.gpa_tiers();

    let mut table = Table::new();
    table.set_header(vec!["Level", "Weight", "GPA"]);
    for level in EducationLevel::ALL {
        let gpa = if level == EducationLevel::Uni {
            [GpaTier::Top, GpaTier::Mid, GpaTier::Standard]
                .iter()
                .map(|t| {
                    let range = tiers.range(*t);
                    format!("{t}: {:.1}-{:.1}", range.min, range.max)
                })
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(level),
            Cell::new(format!("{:.2}", weights.weight(level))),
            Cell::new(gpa),
        ]);
    }
    table
}

fn streams_table(catalog: &Catalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Stream", "Subjects", "Weight", "Aptitude"]);
    for stream in catalog.streams() {
        table.add_row(vec![
            Cell::new(&stream.name),
            Cell::new(stream.subjects.join(", ")),
            Cell::new(format!("{:.2}", stream.weight)),
            Cell::new(format!("{:.1}-{:.1}", stream.aptitude.min, stream.aptitude.max)),
        ]);
    }
    table
}

fn subjects_table(catalog: &Catalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Subject", "Level", "Difficulty", "A/B/C/S/F"]);
    for subject in catalog.subjects() {
        let shape = match subject.level {
            SubjectLevel::Ol => None,
            SubjectLevel::Al => catalog.al_distribution(&subject.name).ok(),
        };
        let shape = match shape {
            Some(dist) => Grade::ALL
                .iter()
                .map(|g| format!("{:.2}", dist.probability(*g)))
                .collect::<Vec<_>>()
                .join("/"),
            None if subject.level == SubjectLevel::Al => "none".to_string(),
            None => "by difficulty".to_string(),
        };
        table.add_row(vec![
            Cell::new(&subject.name),
            Cell::new(subject.level),
            Cell::new(format!("{:.2}", subject.difficulty)),
            Cell::new(shape),
        ]);
    }
    table
}

fn careers_table(catalog: &Catalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Career", "Base", "Bonuses"]);
    for career in catalog.careers() {
        let bonuses = career
            .bonus
            .entries()
            .into_iter()
            .map(|(factor, weight)| format!("{factor} {weight}"))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&career.name),
            Cell::new(format!("{:.2}", career.base)),
            Cell::new(bonuses),
        ]);
    }
    table
}
