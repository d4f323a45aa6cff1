//! Benchmarks for home grid reordering and layout restore.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use handset_core::platform::MemoryStorage;
use handset_core::registry::AppId;
use handset_core::settings::SettingsStore;
use handset_core::shell::{HomeGrid, move_index, repair_order};

fn bench_move_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_index");

    for n in [14, 1_000, 10_000] {
        let label = format!("{n}");
        group.bench_function(BenchmarkId::new("front_to_back", &label), |b| {
            let mut seq: Vec<usize> = (0..n).collect();
            b.iter(|| move_index(&mut seq, 0, n - 1));
        });
        group.bench_function(BenchmarkId::new("back_to_front", &label), |b| {
            let mut seq: Vec<usize> = (0..n).collect();
            b.iter(|| move_index(&mut seq, n - 1, 0));
        });
    }

    group.finish();
}

fn bench_grid_reorder(c: &mut Criterion) {
    let moves: Vec<(usize, usize)> = (0..100).map(|i| (i % 14, (i * 7) % 14)).collect();

    c.bench_function("grid_reorder_100", |b| {
        b.iter_batched(
            || {
                let mut grid = HomeGrid::new();
                grid.set_editing(true);
                grid
            },
            |mut grid| {
                for &(from, to) in &moves {
                    grid.reorder(from, to);
                }
                grid
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    group.bench_function("repair_order", |b| {
        let noisy: Vec<AppId> = AppId::ALL.iter().rev().chain(AppId::ALL.iter()).copied().collect();
        b.iter(|| repair_order(noisy.iter().copied()));
    });

    let mut store = SettingsStore::new(Box::new(MemoryStorage::new()));
    let mut grid = HomeGrid::new();
    grid.reorder(13, 0);
    grid.persist(&mut store);
    group.bench_function("restore", |b| {
        b.iter(|| HomeGrid::restore(&store));
    });

    group.finish();
}

criterion_group!(benches, bench_move_index, bench_grid_reorder, bench_restore);
criterion_main!(benches);
