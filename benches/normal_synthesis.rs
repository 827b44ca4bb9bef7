use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use toon_viewer::mesh::{synthesize_normals, Geometry};

/// Height-field grid of `n` x `n` vertices, two triangles per cell
fn grid_mesh(n: u32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            let (fx, fy) = (x as f32 / n as f32, y as f32 / n as f32);
            let height = (fx * 6.0).sin() * (fy * 4.0).cos() * 0.1;
            positions.push(Vec3::new(fx, fy, height));
        }
    }

    let mut indices = Vec::with_capacity(((n - 1) * (n - 1) * 6) as usize);
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            indices.extend_from_slice(&[i, i + 1, i + n + 1, i, i + n + 1, i + n]);
        }
    }

    (positions, indices)
}

/// Benchmark: Normal synthesis over growing meshes
fn bench_synthesize_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize_normals");

    for n in [32u32, 128, 512] {
        let (positions, indices) = grid_mesh(n);
        group.bench_with_input(
            BenchmarkId::from_parameter(indices.len() / 3),
            &(positions, indices),
            |b, (positions, indices)| {
                b.iter(|| black_box(synthesize_normals(black_box(positions), black_box(indices))))
            },
        );
    }

    group.finish();
}

/// Benchmark: Full assembly (validation, synthesis, copies) of a bunny-sized mesh
fn bench_assemble_without_normals(c: &mut Criterion) {
    let (positions, indices) = grid_mesh(32);

    c.bench_function("assemble_without_normals", |b| {
        b.iter(|| black_box(Geometry::assemble(black_box(&positions), None, black_box(&indices))))
    });
}

criterion_group!(benches, bench_synthesize_normals, bench_assemble_without_normals);

criterion_main!(benches);
