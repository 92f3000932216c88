use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dupesig::index::SignatureIndex;
use dupesig::signature::{compute_signature, quick_hash, FileSignature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// 1. Quick hash over typical window sizes
fn bench_quick_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("quick_hash");
    for size in [64usize, 512, 4096] {
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        group.bench_function(format!("{size}_bytes"), |b| {
            b.iter(|| black_box(quick_hash(black_box(&data))))
        });
    }
    group.finish();
}

// 2. Full signature computation: one open, five positioned reads
fn bench_compute_signature(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let mut group = c.benchmark_group("compute_signature");

    for size_kb in [4u64, 256, 16_384] {
        let size = size_kb * 1024;
        let path = temp_dir.path().join(format!("file_{size_kb}k.bin"));
        let content: Vec<u8> = (0..size).map(|i| (i % 239) as u8).collect();
        fs::write(&path, &content).unwrap();

        // I/O stays bounded no matter how large the file is; these should
        // all land in the same ballpark.
        group.bench_function(format!("{size_kb}KiB_file"), |b| {
            b.iter(|| black_box(compute_signature(black_box(&path), 1, size).unwrap()))
        });
    }
    group.finish();
}

// 3. Index insert/lookup throughput
fn bench_index(c: &mut Criterion) {
    fn synthetic(seed: u64) -> FileSignature {
        FileSignature {
            device: 1,
            size: 4096 + seed,
            samples: [seed as u32, (seed >> 8) as u32, (seed >> 16) as u32, !seed as u32],
            quick_hash: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        }
    }

    c.bench_function("index_insert_10k_unique", |b| {
        b.iter(|| {
            let mut index = SignatureIndex::new(4096).unwrap();
            for seed in 0..10_000 {
                index
                    .insert_or_find(synthetic(seed), Path::new("/bench"), 0)
                    .unwrap();
            }
            black_box(index.len())
        })
    });

    c.bench_function("index_refind_10k", |b| {
        let mut index = SignatureIndex::new(4096).unwrap();
        for seed in 0..10_000 {
            index
                .insert_or_find(synthetic(seed), Path::new("/bench"), 0)
                .unwrap();
        }
        b.iter(|| {
            for seed in 0..10_000 {
                let outcome = index
                    .insert_or_find(synthetic(seed), Path::new("/bench"), 0)
                    .unwrap();
                black_box(outcome.is_match());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_quick_hash,
    bench_compute_signature,
    bench_index
);
criterion_main!(benches);
