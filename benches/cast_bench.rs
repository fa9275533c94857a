// benches/cast_bench.rs
// ============================================================================
// Cast / Serializer Benchmark
// ============================================================================

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use onnx2tnn::cast::{f32_slice_to_f16_bytes, i64_slice_to_i32_saturating};
use onnx2tnn::graph::Tensor;
use onnx2tnn::serializer::{write_initializer, DstDataType, MemoryWriter};
use rand::Rng;

fn generate_random_f32(size: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen_range(-2.0..2.0)).collect()
}

fn generate_random_i64(size: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen::<i64>()).collect()
}

fn bench_casts(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cast");

    for size in [1024, 10240, 102400, 1048576].iter() {
        let floats = generate_random_f32(*size);
        let ints = generate_random_i64(*size);

        group.bench_with_input(BenchmarkId::new("f32->f16", size), &floats, |b, t| {
            b.iter(|| black_box(f32_slice_to_f16_bytes(t)))
        });

        group.bench_with_input(BenchmarkId::new("i64->i32", size), &ints, |b, t| {
            b.iter(|| black_box(i64_slice_to_i32_saturating(t)))
        });
    }

    group.finish();
}

fn bench_write_initializer(c: &mut Criterion) {
    let mut group = c.benchmark_group("WriteInitializer");

    for size in [10240, 1048576].iter() {
        let tensor = Tensor::from_f32("w", vec![*size as i64], generate_random_f32(*size));

        group.bench_with_input(BenchmarkId::new("Float", size), &tensor, |b, t| {
            b.iter(|| {
                let mut writer = MemoryWriter::new();
                write_initializer(t, &mut writer, DstDataType::Auto).unwrap();
                black_box(writer)
            })
        });

        group.bench_with_input(BenchmarkId::new("Half", size), &tensor, |b, t| {
            b.iter(|| {
                let mut writer = MemoryWriter::new();
                write_initializer(t, &mut writer, DstDataType::Half).unwrap();
                black_box(writer)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_casts, bench_write_initializer);
criterion_main!(benches);
