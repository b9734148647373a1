//! Property tests for gradient problems and their evaluator.
//!
//! Verifies the algebraic properties every problem must satisfy: the
//! centering condition Plus(x, 0) = x, the identity-add fallback, and that
//! evaluating without a gradient gives the same cost.

use gradopt_core::prelude::*;
use gradopt_core::utils::test_functions::{DiagonalQuadratic, Rosenbrock};
use proptest::prelude::*;

fn vector(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, n)
}

fn point_and_delta() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..12).prop_flat_map(|n| (vector(n), vector(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_plus_zero_is_identity(x in (1usize..12).prop_flat_map(vector)) {
        let n = x.len();
        let problem = GradientProblem::new(QuadraticFunction::<f64>::simple(n));
        let x = DVector::from_vec(x);
        let mut result = DVector::zeros(n);

        problem.plus(&x, &DVector::zeros(n), &mut result).unwrap();
        prop_assert_eq!(result, x);
    }

    #[test]
    fn prop_plus_without_retraction_adds((x, delta) in point_and_delta()) {
        let n = x.len();
        let problem = GradientProblem::new(QuadraticFunction::<f64>::simple(n));
        let x = DVector::from_vec(x);
        let delta = DVector::from_vec(delta);
        let mut result = DVector::zeros(n);

        problem.plus(&x, &delta, &mut result).unwrap();
        for i in 0..n {
            prop_assert_eq!(result[i], x[i] + delta[i]);
        }
    }

    #[test]
    fn prop_cost_does_not_depend_on_gradient_request(x in -3.0f64..3.0, y in -3.0f64..3.0) {
        let mut problem = GradientProblem::new(Rosenbrock::new());
        let point = DVector::from_vec(vec![x, y]);

        let cost_only = problem.evaluate(&point, None).unwrap();
        let mut gradient = DVector::zeros(2);
        let cost = problem.evaluate(&point, Some(&mut gradient)).unwrap();
        prop_assert_eq!(cost_only, cost);
    }

    #[test]
    fn prop_evaluator_reports_one_residual(n in 1usize..50) {
        let mut problem = GradientProblem::new(QuadraticFunction::<f64>::simple(n));
        let evaluator = GradientProblemEvaluator::new(&mut problem);
        prop_assert_eq!(evaluator.num_residuals(), 1);
        prop_assert_eq!(evaluator.num_parameters(), n);
        prop_assert!(evaluator.create_jacobian().is_none());
    }

    #[test]
    fn prop_default_norms_match_gradient((x, g) in point_and_delta()) {
        let n = x.len();
        let diagonal = DVector::from_element(n, 1.0);
        let mut problem = GradientProblem::new(DiagonalQuadratic::new(diagonal));
        let evaluator = GradientProblemEvaluator::new(&mut problem);

        let mut state = LineSearchState::new(n);
        state.gradient = DVector::from_vec(g);
        evaluator
            .evaluate_gradient_norms(&DVector::from_vec(x), &mut state)
            .unwrap();

        let tolerance = 1e-9 * (1.0 + state.gradient.norm_squared());
        prop_assert!((state.gradient_squared_norm - state.gradient.norm_squared()).abs() < tolerance);
        prop_assert!((state.gradient_max_norm - state.gradient.amax()).abs() < 1e-9);
    }
}

#[test]
fn test_rosenbrock_through_evaluator() {
    let mut problem = GradientProblem::new(Rosenbrock::new());
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);
    let x = DVector::from_vec(vec![-1.2, 1.0]);
    let mut gradient = DVector::zeros(2);

    let cost = evaluator
        .evaluate(&EvaluateOptions::default(), &x, None, Some(&mut gradient), None)
        .unwrap();

    approx::assert_relative_eq!(cost, 24.2, epsilon = 1e-12);
    approx::assert_relative_eq!(gradient[0], -215.6, epsilon = 1e-10);
    approx::assert_relative_eq!(gradient[1], -88.0, epsilon = 1e-10);
}

#[test]
fn test_statistics_after_one_call_of_each_kind() {
    let mut problem = GradientProblem::new(Rosenbrock::new());
    let mut evaluator = GradientProblemEvaluator::new(&mut problem);
    let x = DVector::from_vec(vec![-1.2, 1.0]);
    let options = EvaluateOptions::default();

    evaluator.evaluate(&options, &x, None, None, None).unwrap();
    let mut gradient = DVector::zeros(2);
    evaluator
        .evaluate(&options, &x, None, Some(&mut gradient), None)
        .unwrap();

    let statistics = evaluator.statistics();
    let names: Vec<&str> = statistics.keys().map(|label| label.as_str()).collect();
    pretty_assertions::assert_eq!(
        names,
        vec!["Evaluator::Total", "Evaluator::Residual", "Evaluator::Jacobian"]
    );

    let total = statistics[&EvaluationLabel::Total];
    let residual = statistics[&EvaluationLabel::Residual];
    let jacobian = statistics[&EvaluationLabel::Jacobian];
    assert_eq!((total.calls, residual.calls, jacobian.calls), (2, 1, 1));
    assert!(total.time >= residual.time + jacobian.time);
}
