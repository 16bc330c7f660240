use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pathway_core::catalog::Catalog;
use pathway_core::generator::{ProfileGenerator, ProfileRequest};
use pathway_core::model::{AcademicRecord, EducationLevel};
use pathway_core::scorer::{explain, score, score_record};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn record_at(catalog: &Catalog, level: EducationLevel) -> AcademicRecord {
    let mut rng = StdRng::seed_from_u64(17);
    ProfileGenerator::new(catalog)
        .generate_with(&ProfileRequest::at_level(level), &mut rng)
        .unwrap()
}

fn bench_score(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let mut group = c.benchmark_group("score");

    for level in EducationLevel::ALL {
        let record = record_at(&catalog, level);
        group.bench_function(level.to_string(), |b| {
            b.iter(|| score(black_box(catalog.compatibility()), black_box(&record)))
        });
    }

    group.finish();
}

fn bench_score_record(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let record = record_at(&catalog, EducationLevel::Uni);
    let mut group = c.benchmark_group("score_record");

    group.bench_function("validated", |b| {
        b.iter(|| score_record(black_box(&catalog), black_box(&record)))
    });

    group.bench_function("explain", |b| {
        b.iter(|| explain(black_box(catalog.compatibility()), black_box(&record)))
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_score_record);
criterion_main!(benches);
