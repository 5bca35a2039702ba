use criterion::{criterion_group, criterion_main, Criterion};
use fmm2d::{Body, Complex64, Tree};

fn build_populated_tree(level: usize, n: usize) -> Tree {
    fastrand::seed(7);
    let mut tree = Tree::new(level).unwrap();
    for i in 0..n {
        let pos = Complex64::new(fastrand::f64(), fastrand::f64());
        let mass = fastrand::f64() * 1.5;
        tree.insert(Body::new(i, pos, mass)).unwrap();
    }
    tree
}

pub fn pipeline_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fmm_pipeline");
    group.sample_size(10);

    for &(level, n) in &[(7usize, 16_384usize), (9, 65_536)] {
        group.bench_function(format!("tree construction, level {level}, n={n}"), |b| {
            b.iter(|| build_populated_tree(level, n));
        });

        group.bench_function(format!("compute_com, level {level}, n={n}"), |b| {
            b.iter_batched(
                || build_populated_tree(level, n),
                |mut tree| tree.compute_com().unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("compute_u, level {level}, n={n}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = build_populated_tree(level, n);
                    tree.compute_com().unwrap();
                    tree
                },
                |mut tree| tree.compute_u().unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("downward_pass, level {level}, n={n}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = build_populated_tree(level, n);
                    tree.compute_com().unwrap();
                    tree.compute_u().unwrap();
                    tree
                },
                |mut tree| tree.downward_pass().unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("sum_direct_computation, level {level}, n={n}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = build_populated_tree(level, n);
                    tree.compute_com().unwrap();
                    tree.compute_u().unwrap();
                    tree.downward_pass().unwrap();
                    tree
                },
                |mut tree| tree.sum_direct_computation().unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
