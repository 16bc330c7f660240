//! End-to-end pipeline tests: generate a dataset through the binary, then
//! read every artifact back and check it against the others.

use std::path::Path;

use assert_cmd::Command;
use pathway_core::catalog::Catalog;
use pathway_core::model::EducationLevel;
use pathway_core::report::DatasetReport;
use pathway_core::scorer::score_record;
use pathway_report::training::{header, slug};
use tempfile::TempDir;

fn generate(dir: &Path, out: &str, extra: &[&str]) -> DatasetReport {
    #[allow(deprecated)]
    Command::cargo_bin("pathway")
        .unwrap()
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("PATHWAY_SEED")
        .env_remove("PATHWAY_COUNT")
        .env_remove("PATHWAY_CATALOG")
        .env_remove("PATHWAY_OUTPUT_DIR")
        .args(["generate", "--output", out])
        .args(extra)
        .assert()
        .success();
    DatasetReport::load_json(&dir.join(out).join("report.json")).unwrap()
}

fn csv_rows(path: &Path) -> (Vec<String>, usize) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    (header, reader.records().count())
}

#[test]
fn dataset_artifacts_agree() {
    let dir = TempDir::new().unwrap();
    let report = generate(
        dir.path(),
        "data",
        &[
            "--count",
            "400",
            "--seed",
            "3",
            "--chunk-size",
            "64",
            "--by-stream",
        ],
    );
    let catalog = Catalog::standard();
    let out = dir.path().join("data");

    assert_eq!(report.profiles.len(), 400);
    assert_eq!(report.stats.total, 400);
    assert_eq!(report.catalog, "standard");

    for (i, profile) in report.profiles.iter().enumerate() {
        assert_eq!(profile.index, i);
        // The stored distribution is what scoring the stored record gives
        let rescored = score_record(&catalog, &profile.record).unwrap();
        for (stored, fresh) in profile.distribution.iter().zip(rescored.iter()) {
            assert_eq!(stored.career, fresh.career);
            assert!((stored.probability - fresh.probability).abs() < 1e-12);
        }
    }

    for level in EducationLevel::ALL {
        let expected = report.profiles_at(level).count();
        let level_slug = level.to_string().to_lowercase();
        for encoding in ["raw", "processed"] {
            let (columns, rows) = csv_rows(&out.join(format!("{level_slug}_{encoding}.csv")));
            assert_eq!(columns, header(&catalog, level));
            assert_eq!(rows, expected);
        }

        if level.has_stream() {
            for (stream, profiles) in report.by_stream(level) {
                let path = out.join(format!("{level_slug}_{}_raw.csv", slug(stream)));
                assert_eq!(csv_rows(&path).1, profiles.len());
            }
        }
    }

    let summary = std::fs::read_to_string(out.join("summary.md")).unwrap();
    assert!(summary.contains("400 records"));
}

#[test]
fn same_seed_reproduces_the_dataset() {
    let dir = TempDir::new().unwrap();
    let args = ["--count", "300", "--seed", "17", "--chunk-size", "50"];
    let serial_args = [&args[..], &["--parallelism", "1"][..]].concat();
    let parallel_args = [&args[..], &["--parallelism", "6"][..]].concat();

    let serial = generate(dir.path(), "serial", &serial_args);
    let parallel = generate(dir.path(), "parallel", &parallel_args);

    assert_eq!(serial.profiles.len(), 300);
    for (a, b) in serial.profiles.iter().zip(&parallel.profiles) {
        assert_eq!(a.record, b.record);
    }
    assert_eq!(serial.stats.per_level, parallel.stats.per_level);
    assert_eq!(serial.stats.careers, parallel.stats.careers);
}

#[test]
fn different_seeds_differ() {
    let dir = TempDir::new().unwrap();
    let a = generate(dir.path(), "a", &["--count", "50", "--seed", "1"]);
    let b = generate(dir.path(), "b", &["--count", "50", "--seed", "2"]);
    assert!(a
        .profiles
        .iter()
        .zip(&b.profiles)
        .any(|(x, y)| x.record != y.record));
}
