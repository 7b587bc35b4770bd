//! Criterion benchmarks for parcel allocation on large grids.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parcel_core::{allocate, AgentId, AgentRecord, Grid, RegionDriver, RegionInputs};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Benchmark: 1000x1000 fully cultivable grid, 10K parcels of 100 cells.
fn bench_allocate_1m_uniform(c: &mut Criterion) {
    let mask = Grid::new(1000, 1000, true);
    let ids: Vec<AgentId> = (0..10_000).collect();
    let sizes = vec![100; 10_000];

    c.bench_function("allocate_1m_uniform", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            black_box(allocate(&mask, &ids, &sizes, &mut rng).unwrap());
        });
    });
}

/// Benchmark: 500x500 grid with a sparse stripe pattern and a few very large
/// parcels, where boxes must grow far past already-claimed land.
fn bench_allocate_sparse_large_parcels(c: &mut Criterion) {
    let (w, h) = (500, 500);
    let data: Vec<bool> = (0..w * h).map(|i| (i / w) % 3 != 1 && (i % w) % 7 != 3).collect();
    let mask = Grid::from_vec(w, h, data).unwrap();
    let count = mask.count_true();
    let n = 50;
    let mut sizes = vec![count / n; n];
    sizes[0] += count % n;
    let ids: Vec<AgentId> = (0..n as AgentId).collect();

    c.bench_function("allocate_sparse_large_parcels", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            black_box(allocate(&mask, &ids, &sizes, &mut rng).unwrap());
        });
    });
}

/// Benchmark: full driver over 16 regions of 250x250 cells each.
fn bench_driver_16_regions(c: &mut Criterion) {
    let (w, h) = (1000, 1000);
    let mut regions = Grid::new(w, h, 0);
    for r in 0..h {
        for col in 0..w {
            regions.set(r, col, ((r / 250) * 4 + col / 250) as i32);
        }
    }
    let agents: Vec<AgentRecord> = (0..16)
        .flat_map(|region| {
            (0..625).map(move |k| AgentRecord { id: region * 625 + k, region, size: 100 })
        })
        .collect();
    let inputs = RegionInputs {
        cultivable: Grid::new(w, h, true),
        regions,
        study_area: Grid::new(w, h, true),
        agents,
    };
    let driver = RegionDriver::default();

    c.bench_function("driver_16_regions", |b| {
        b.iter(|| black_box(driver.delineate(&inputs).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_allocate_1m_uniform,
    bench_allocate_sparse_large_parcels,
    bench_driver_16_regions,
);
criterion_main!(benches);
