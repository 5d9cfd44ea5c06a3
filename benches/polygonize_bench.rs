use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::{Geometry, LineString};
use planar_polygonize::{BatchPolygonizer, Polygonizer};

/// Unit segments of an n x n grid. Every crossing is an end point, so the
/// input is already noded.
fn generate_grid(n: usize) -> Vec<Geometry<f64>> {
    let mut lines = Vec::new();
    for i in 0..=n {
        for j in 0..n {
            let (a, b) = (i as f64, j as f64);
            // Vertical
            lines.push(LineString::from(vec![(a, b), (a, b + 1.0)]).into());
            // Horizontal
            lines.push(LineString::from(vec![(b, a), (b + 1.0, a)]).into());
        }
    }
    lines
}

/// Closed squares nested around a common centre.
fn generate_nested(depth: usize) -> Vec<Geometry<f64>> {
    (0..depth)
        .map(|k| {
            let (lo, hi) = (k as f64, (2 * depth - k) as f64);
            LineString::from(vec![(lo, lo), (hi, lo), (hi, hi), (lo, hi), (lo, lo)]).into()
        })
        .collect()
}

fn bench_polygonize(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygonize");
    group.sample_size(10); // Reduce sample size for speed

    for size in [5, 10, 20].iter() {
        let lines = generate_grid(*size);
        group.bench_with_input(BenchmarkId::new("grid", size), &lines, |b, lines| {
            b.iter(|| {
                let mut poly = Polygonizer::new();
                poly.add_geometries(lines.iter().cloned());
                poly.polygonize().unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("grid_polygonal", size), &lines, |b, lines| {
            b.iter(|| {
                let mut poly = Polygonizer::new().with_extract_only_polygonal(true);
                poly.add_geometries(lines.iter().cloned());
                poly.polygonize().unwrap();
            });
        });
    }

    for depth in [10, 50].iter() {
        let squares = generate_nested(*depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &squares, |b, squares| {
            b.iter(|| {
                let mut poly = Polygonizer::new();
                poly.add_geometries(squares.iter().cloned());
                poly.polygonize().unwrap();
            });
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);

    let grid = generate_grid(10);
    group.bench_function("16_grids", |b| {
        b.iter(|| {
            let mut batch = BatchPolygonizer::new();
            for _ in 0..16 {
                batch.add_batch(grid.clone());
            }
            for result in batch.polygonize() {
                result.unwrap();
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_polygonize, bench_batch);
criterion_main!(benches);
