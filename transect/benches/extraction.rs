use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transect::{
    ExtractionConfig, GridExtractor, IdwInterpolator, PartitionStrategy, Point3, Survey,
};

/// Synthetic rolling-terrain survey: `cols` x `rows` scan grid at 10-unit
/// spacing.
fn synthetic_survey(cols: u32, rows: u32) -> Survey {
    let mut text = format!("# Grid_size: {cols}x{rows}\n");
    for row in 1..=rows {
        for col in 1..=cols {
            let x = f64::from(col - 1) * 10.0;
            let y = f64::from(row - 1) * 10.0;
            let z = 100.0 + (x * 0.05).sin() * 8.0 + (y * 0.03).cos() * 5.0;
            writeln!(text, "{x} {y} {z} {col} {row}").unwrap();
        }
    }
    Survey::from_reader(text.as_bytes()).unwrap()
}

fn config(strategy: PartitionStrategy) -> ExtractionConfig {
    ExtractionConfig {
        step: 15.0,
        tile_rows: 10,
        tile_cols: 10,
        strategy,
        ..ExtractionConfig::default()
    }
}

fn bench_single_estimate(c: &mut Criterion) {
    let idw = IdwInterpolator::default();
    let candidates: Vec<Point3> = (0..40)
        .map(|i| {
            let a = f64::from(i) * 0.7;
            Point3::new(a.cos() * 50.0, a.sin() * 50.0, 100.0 + f64::from(i % 7))
        })
        .collect();

    c.bench_function("idw_estimate_40_candidates", |b| {
        b.iter(|| {
            black_box(
                idw.estimate(black_box(3.0), black_box(-4.0), black_box(&candidates))
                    .unwrap(),
            );
        });
    });
}

fn bench_build_tiled(c: &mut Criterion) {
    let survey = synthetic_survey(100, 40);

    c.bench_function("build_tiled_4000_points", |b| {
        b.iter(|| {
            black_box(GridExtractor::new(&survey, config(PartitionStrategy::Tiling)).unwrap());
        });
    });
}

fn bench_build_indexed(c: &mut Criterion) {
    let survey = synthetic_survey(100, 40);

    c.bench_function("build_indexed_4000_points", |b| {
        b.iter(|| {
            black_box(
                GridExtractor::new(&survey, config(PartitionStrategy::SpatialIndex)).unwrap(),
            );
        });
    });
}

fn bench_extract_tiled(c: &mut Criterion) {
    let survey = synthetic_survey(100, 40);
    let extractor = GridExtractor::new(&survey, config(PartitionStrategy::Tiling)).unwrap();

    c.bench_function("extract_tiled_66x40_lattice", |b| {
        b.iter(|| {
            black_box(extractor.extract().unwrap());
        });
    });
}

fn bench_extract_indexed(c: &mut Criterion) {
    let survey = synthetic_survey(100, 40);
    let extractor = GridExtractor::new(&survey, config(PartitionStrategy::SpatialIndex)).unwrap();

    c.bench_function("extract_indexed_66x40_lattice", |b| {
        b.iter(|| {
            black_box(extractor.extract().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_single_estimate,
    bench_build_tiled,
    bench_build_indexed,
    bench_extract_tiled,
    bench_extract_indexed,
);
criterion_main!(benches);
