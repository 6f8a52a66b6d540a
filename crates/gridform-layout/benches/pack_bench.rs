//! Benchmarks for grid packing.
//!
//! Run with: cargo bench -p gridform-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gridform_core::InternalField;
use gridform_layout::{GridConfig, GridPacker};
use std::hint::black_box;

/// `n` fields with a repeating mix of spans and row breaks.
fn make_fields(n: usize) -> Vec<InternalField> {
    (0..n)
        .map(|i| match i % 7 {
            0 => InternalField::spacer(None),
            1 => InternalField::detached(format!("full{i}")),
            k => {
                let mut f = InternalField::detached(format!("f{i}"));
                f.size = Some([3, 4, 6, 8, 12][k % 5]);
                f
            }
        })
        .collect()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/pack");
    let packer = GridPacker::new(GridConfig::default());

    for n in [10, 50, 200, 1000] {
        let fields = make_fields(n);
        group.bench_with_input(BenchmarkId::new("mixed", n), &fields, |b, fields| {
            b.iter(|| black_box(packer.pack(fields)))
        });
    }

    group.finish();
}

fn bench_wide_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/pack_wide");
    let fields = make_fields(200);

    for columns in [12u8, 24] {
        let packer = GridPacker::new(GridConfig::with_columns(columns));
        group.bench_with_input(BenchmarkId::new("columns", columns), &fields, |b, fields| {
            b.iter(|| black_box(packer.pack(fields)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack, bench_wide_grid);
criterion_main!(benches);
