//! End-to-end tests: a line-search loop driving the Rosenbrock function
//! through the evaluator interface.

use approx::assert_relative_eq;
use gradopt::prelude::*;
use gradopt_core::utils::test_functions::Rosenbrock;
use pretty_assertions::assert_eq;

#[test]
fn test_rosenbrock_value_and_gradient() {
    let mut problem = GradientProblem::new(Rosenbrock::new());
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);
    let x = Rosenbrock::starting_point();
    let mut gradient = DVector::zeros(2);

    let cost = evaluator
        .evaluate(&EvaluateOptions::default(), &x, None, Some(&mut gradient), None)
        .unwrap();

    assert_relative_eq!(cost, 24.2, epsilon = 1e-12);
    assert_relative_eq!(gradient, DVector::from_vec(vec![-215.6, -88.0]), epsilon = 1e-10);
}

/// Outcome of [`minimize`].
struct Summary {
    x: DVector<f64>,
    state: LineSearchState<f64>,
    iterations: usize,
    restarts: usize,
    cost_evaluations: usize,
    gradient_evaluations: usize,
}

const SUFFICIENT_DECREASE: f64 = 1e-4;
const CURVATURE: f64 = 0.9;
const MAX_TRIALS: usize = 60;

/// L-BFGS with a weak Wolfe bisection line search, driven only through the
/// evaluator: cost and gradient, Plus, gradient norms and next direction.
///
/// The curvature condition keeps every accepted step usable as a history
/// pair, since it gives `s·y >= (c2 - 1) t d·g > 0`.
fn minimize<E: Evaluator<f64>>(evaluator: &mut E, x0: DVector<f64>, max_iterations: usize) -> Summary {
    let options = EvaluateOptions::default();
    let n = evaluator.num_effective_parameters();
    let mut history = LimitedMemoryHistory::new(n, 5);
    let mut scale = 1.0;

    let mut x = x0;
    let mut candidate = x.clone();
    let mut candidate_gradient = DVector::zeros(n);
    let mut state = LineSearchState::new(n);
    let mut previous_gradient = DVector::zeros(n);
    let mut restarts = 0;
    let mut cost_evaluations = 0;
    let mut gradient_evaluations = 1;

    state.cost = evaluator
        .evaluate(&options, &x, None, Some(&mut state.gradient), None)
        .unwrap();

    let mut iterations = 0;
    while iterations < max_iterations {
        evaluator.evaluate_gradient_norms(&x, &mut state).unwrap();
        if state.gradient_max_norm < 1e-8 {
            break;
        }
        iterations += 1;

        let previous_direction = state.search_direction.clone();
        let request = DirectionRequest {
            previous_direction: &previous_direction,
            previous_step_size: state.step_size,
            current_gradient: &state.gradient,
            previous_gradient: &previous_gradient,
            use_approximate_eigenvalue_scaling: true,
        };
        state.directional_derivative = match evaluator.next_direction(
            &request,
            &mut history,
            &mut scale,
            &mut state.search_direction,
        ) {
            Ok(dd) => dd,
            Err(_) => {
                restarts += 1;
                history.reset();
                steepest_descent(&state.gradient, &mut state.search_direction)
            }
        };

        let mut lower = 0.0;
        let mut upper = f64::INFINITY;
        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_TRIALS {
            evaluator
                .plus(&x, &(&state.search_direction * step), &mut candidate)
                .unwrap();
            cost_evaluations += 1;
            let cost = match evaluator.evaluate(&options, &candidate, None, None, None) {
                Ok(cost) => cost,
                Err(_) => {
                    upper = step;
                    step = 0.5 * (lower + upper);
                    continue;
                }
            };
            if cost > state.cost + SUFFICIENT_DECREASE * step * state.directional_derivative {
                upper = step;
            } else {
                gradient_evaluations += 1;
                let cost_with_gradient = evaluator
                    .evaluate(&options, &candidate, None, Some(&mut candidate_gradient), None)
                    .unwrap();
                assert_relative_eq!(cost_with_gradient, cost);
                if candidate_gradient.dot(&state.search_direction) < CURVATURE * state.directional_derivative {
                    lower = step;
                } else {
                    accepted = Some(cost);
                    break;
                }
            }
            step = if upper.is_finite() { 0.5 * (lower + upper) } else { 2.0 * lower };
        }

        let Some(accepted_cost) = accepted else {
            break;
        };

        state.step_size = step;
        previous_gradient.copy_from(&state.gradient);
        x.copy_from(&candidate);
        state.gradient.copy_from(&candidate_gradient);
        state.cost = accepted_cost;
    }

    Summary {
        x,
        state,
        iterations,
        restarts,
        cost_evaluations,
        gradient_evaluations,
    }
}

#[test]
fn test_lbfgs_minimizes_rosenbrock() {
    let mut problem = GradientProblem::new(QuasiNewtonFunction::new(Rosenbrock::new()));
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);

    let summary = minimize(&mut evaluator, Rosenbrock::starting_point(), 500);

    assert!(summary.iterations < 200, "did not converge");
    assert!(summary.state.gradient_max_norm < 1e-8);
    assert_relative_eq!(summary.x, DVector::from_vec(vec![1.0, 1.0]), epsilon = 1e-6);
    assert!(summary.state.cost < 1e-12);
    assert_eq!(summary.restarts, 0);

    let statistics = evaluator.statistics();
    let total = statistics[&EvaluationLabel::Total];
    let residual = statistics[&EvaluationLabel::Residual];
    let jacobian = statistics[&EvaluationLabel::Jacobian];
    assert_eq!(residual.calls, summary.cost_evaluations);
    assert_eq!(jacobian.calls, summary.gradient_evaluations);
    assert_eq!(total.calls, residual.calls + jacobian.calls);
    assert!(total.time >= residual.time + jacobian.time);
}

#[test]
fn test_ill_conditioned_quadratic_converges_without_restarts() {
    // Curvature-checked steps always yield descent directions, so an
    // ill-conditioned quadratic converges without a single restart.
    let function = QuasiNewtonFunction::new(
        QuadraticFunction::new(
            DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 4.0, 16.0, 64.0, 256.0, 1024.0])),
            DVector::zeros(6),
            0.0,
        )
        .unwrap(),
    );
    let mut problem = GradientProblem::new(function);
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);

    let summary = minimize(&mut evaluator, DVector::from_element(6, 1.0), 200);

    assert!(summary.iterations < 200, "did not converge");
    assert_eq!(summary.restarts, 0);
    assert!(summary.state.gradient_max_norm < 1e-8);
    assert_relative_eq!(summary.x, DVector::zeros(6), epsilon = 1e-7);
}

#[test]
fn test_steepest_descent_fallback_without_capability() {
    // Without the direction capability every iteration restarts.
    let mut problem = GradientProblem::new(QuadraticFunction::<f64>::simple(3));
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);

    let summary = minimize(&mut evaluator, DVector::from_vec(vec![1.0, -2.0, 3.0]), 10);

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.restarts, 1);
    assert_relative_eq!(summary.x, DVector::zeros(3), epsilon = 1e-15);
}

#[test]
fn test_rotation_fit_with_quaternion() {
    // Minimize |R(q) e_x - target|² by moving q on the unit sphere.
    #[derive(Debug)]
    struct AlignAxis {
        target: [f64; 3],
    }

    impl FirstOrderFunction<f64> for AlignAxis {
        fn evaluate(&self, q: &DVector<f64>, gradient: Option<&mut DVector<f64>>) -> Result<f64> {
            let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
            // First column of the rotation matrix of q.
            let r = [
                w * w + x * x - y * y - z * z,
                2.0 * (x * y + w * z),
                2.0 * (x * z - w * y),
            ];
            let e = [r[0] - self.target[0], r[1] - self.target[1], r[2] - self.target[2]];
            if let Some(gradient) = gradient {
                let dr = [
                    [2.0 * w, 2.0 * x, -2.0 * y, -2.0 * z],
                    [2.0 * z, 2.0 * y, 2.0 * x, 2.0 * w],
                    [-2.0 * y, 2.0 * z, -2.0 * w, 2.0 * x],
                ];
                for j in 0..4 {
                    gradient[j] = 2.0 * (0..3).map(|i| e[i] * dr[i][j]).sum::<f64>();
                }
            }
            Ok(e.iter().map(|v| v * v).sum())
        }

        fn num_parameters(&self) -> usize {
            4
        }
    }

    let target = [0.0, 0.0, 1.0];
    let function = QuasiNewtonFunction::new(AlignAxis { target });
    let (passes, _) = DerivativeChecker::check_gradient(
        function.inner(),
        &DVector::from_vec(vec![0.9, 0.1, -0.3, 0.2]),
        1e-6,
    )
    .unwrap();
    assert!(passes);

    let mut problem = GradientProblem::with_retraction(function, QuaternionRetraction::new()).unwrap();
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);
    assert_eq!(evaluator.num_effective_parameters(), 3);

    let summary = minimize(&mut evaluator, DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0]), 200);

    assert!(summary.state.cost < 1e-12);
    assert_relative_eq!(summary.x.norm(), 1.0, epsilon = 1e-12);
}
