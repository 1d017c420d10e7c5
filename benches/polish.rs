//! Benchmarks for the polish kernel.

use claypolish::algo::curvature::signed_curvature;
use claypolish::algo::polish::{clay_polish, PolishOptions};
use claypolish::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point3;

fn create_wavy_grid(n: usize) -> SurfaceMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Grid with a sinusoidal relief so the curvature field is non-trivial
    for j in 0..=n {
        for i in 0..=n {
            let z = (i as f64 * 0.7).sin() * (j as f64 * 0.7).cos() * 0.5;
            vertices.push(Point3::new(i as f64, j as f64, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let n = 50;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| {
            let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_curvature(c: &mut Criterion) {
    let mesh = create_wavy_grid(50);

    c.bench_function("signed_curvature_50x50", |b| {
        b.iter(|| signed_curvature(&mesh));
    });
}

fn bench_polish(c: &mut Criterion) {
    let mesh = create_wavy_grid(30);
    let options = PolishOptions::default()
        .with_strength(2.0)
        .with_iterations(5)
        .with_curvature_threshold(0.05);

    c.bench_function("clay_polish_30x30_5it", |b| {
        b.iter(|| clay_polish(&mesh, &options).unwrap());
    });
}

criterion_group!(benches, bench_mesh_construction, bench_curvature, bench_polish);
criterion_main!(benches);
