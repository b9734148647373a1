//! Benchmarks for the quasi-Newton direction update.
//!
//! Measures the two-loop recursion for growing problem sizes and history
//! lengths, and the cost of a full update including recording.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gradopt_core::{
    core::types::DVector,
    optimization::{
        DirectionHistory, DirectionRequest, LimitedMemoryHistory, QuasiNewtonConfig,
        QuasiNewtonDirectionUpdater,
    },
};

/// Deterministic vector with entries in [-1, 1].
fn wave(n: usize, phase: f64) -> DVector<f64> {
    DVector::from_fn(n, |i, _| ((i as f64) * 0.37 + phase).sin())
}

/// History filled with `m` pairs satisfying the curvature condition.
fn filled_history(n: usize, m: usize) -> LimitedMemoryHistory<f64> {
    let mut history = LimitedMemoryHistory::new(n, m);
    for k in 0..m {
        let s = wave(n, k as f64);
        let y = &s * 2.0 + wave(n, 0.5 * k as f64) * 0.1;
        let sy = s.dot(&y);
        if let Some(slot) = history.next_update_context(1.0) {
            slot.delta_x.copy_from(&s);
            slot.delta_gradient.copy_from(&y);
            *slot.delta_x_dot_delta_gradient = sy;
            *slot.approximate_eigenvalue_scale = sy / y.norm_squared();
        }
    }
    history
}

fn bench_right_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("right_multiply");
    let updater = QuasiNewtonDirectionUpdater::<f64>::new(QuasiNewtonConfig::default());

    for &n in &[10, 100, 1000] {
        for &m in &[5, 20] {
            let history = filled_history(n, m);
            let gradient = wave(n, 3.0);
            let mut direction = DVector::zeros(n);

            group.bench_with_input(BenchmarkId::new(format!("m{m}"), n), &n, |b, _| {
                b.iter(|| {
                    updater.right_multiply(
                        black_box(&gradient),
                        &history,
                        Some(0.5),
                        &mut direction,
                    );
                    black_box(&direction);
                });
            });
        }
    }

    group.finish();
}

fn bench_next_direction(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_direction");
    let updater = QuasiNewtonDirectionUpdater::<f64>::new(QuasiNewtonConfig::default());

    for &n in &[10, 100, 1000] {
        let mut history = filled_history(n, 10);
        let previous_direction = wave(n, 1.0);
        let previous_gradient = wave(n, 2.0);
        let current_gradient = &previous_gradient + &previous_direction * 0.5;
        let mut direction = DVector::zeros(n);
        let mut scale = 1.0;

        group.bench_with_input(BenchmarkId::new("m10", n), &n, |b, _| {
            b.iter(|| {
                let request = DirectionRequest {
                    previous_direction: &previous_direction,
                    previous_step_size: 1.0,
                    current_gradient: &current_gradient,
                    previous_gradient: &previous_gradient,
                    use_approximate_eigenvalue_scaling: true,
                };
                black_box(updater.next_direction(&request, &mut history, &mut scale, &mut direction))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_right_multiply, bench_next_direction);
criterion_main!(benches);
