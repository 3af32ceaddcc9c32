#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::RefCell;
use std::rc::Rc;

use cpbp_core::belief::BeliefRepresentation;
use cpbp_core::constraints;
use cpbp_core::propagation::PropagationContext;
use cpbp_core::propagation::ReadDomains;
use cpbp_core::variables::TransformableVariable;
use cpbp_core::BeliefPropagationOptions;
use cpbp_core::Inconsistency;
use cpbp_core::PropagationStatus;
use cpbp_core::Solver;
use cpbp_core::SolverOptions;

#[test]
fn emptying_procedure_stops_the_fixpoint() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(0, 3);
    let y = solver.new_bounded_integer(0, 3);
    let calls = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&calls);
    let _ = solver.when_bounds_change(x, move |context: &mut PropagationContext<'_>| {
        log.borrow_mut().push('a');
        let upper_bound = context.upper_bound(&x);
        if upper_bound < 3 {
            context.remove_above(&y, -1)?;
        }
        Ok(())
    });
    let log = Rc::clone(&calls);
    let _ = solver.when_domain_change(y, move |_: &mut PropagationContext<'_>| -> PropagationStatus {
        log.borrow_mut().push('b');
        Ok(())
    });
    solver.fixed_point().expect("no bound moved yet");
    assert!(calls.borrow().is_empty());

    solver.remove(&y, 1).expect("other values remain");
    solver.remove(&x, 3).expect("other values remain");

    // `y` changed first, so its procedure runs before the failing one.
    assert_eq!(solver.fixed_point(), Err(Inconsistency::EmptyDomain));
    assert_eq!(*calls.borrow(), vec!['b', 'a']);
    assert_eq!(solver.fixed_point(), Err(Inconsistency::EmptyDomain));
    assert_eq!(*calls.borrow(), vec!['b', 'a']);
}

#[test]
fn strict_chain_is_fixed_by_propagation() {
    let mut solver = Solver::default();
    let x = [0, 1, 2].map(|_| solver.new_bounded_integer(0, 2));

    for pair in x.windows(2) {
        let _ = solver
            .add_constraint(constraints::less_or_equal(pair[0], pair[1].offset(-1)))
            .post();
    }
    solver.fixed_point().expect("0 < 1 < 2 is a solution");

    for (value, variable) in x.iter().enumerate() {
        assert!(solver.is_fixed(variable));
        assert_eq!(solver.lower_bound(variable), value as i32);
    }
}

#[test]
fn among_with_a_full_count_forces_membership() {
    let mut solver = Solver::default();
    let x = [0, 1, 2].map(|_| solver.new_bounded_integer(0, 2));
    let count = solver.new_bounded_integer(3, 3);

    let _ = solver
        .add_constraint(constraints::among(x, [1, 2], count))
        .post();
    solver.fixed_point().expect("consistent");

    for variable in &x {
        assert_eq!(solver.domain(variable), vec![1, 2]);
    }
}

#[test]
fn all_different_with_too_few_values_is_inconsistent() {
    let mut solver = Solver::default();
    let x = [0, 1, 2].map(|_| solver.new_bounded_integer(4, 5));

    let _ = solver
        .add_constraint(constraints::all_different(x))
        .post();

    assert!(solver.belief_propagation().is_err());
    assert!(solver.is_inconsistent());
}

#[test]
fn beliefs_flow_through_a_sum() {
    for belief_representation in [BeliefRepresentation::Linear, BeliefRepresentation::Log] {
        let mut solver = Solver::with_options(SolverOptions {
            belief_representation,
            ..Default::default()
        });
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);
        let total = solver.new_bounded_integer(1, 1);

        let _ = solver
            .add_constraint(constraints::sum([x, y], total))
            .post();
        let _ = solver
            .add_constraint(constraints::oracle(x, [0, 1], [0.2, 0.8]))
            .post();
        let report = solver.belief_propagation().expect("consistent");

        assert_eq!(report.iterations, 5);
        assert!((solver.probability(&x, 0) - 0.2).abs() < 1e-6);
        assert!((solver.probability(&x, 1) - 0.8).abs() < 1e-6);
        assert!((solver.probability(&y, 0) - 0.8).abs() < 1e-6);
        assert!((solver.probability(&y, 1) - 0.2).abs() < 1e-6);
    }
}

#[test]
fn convergence_threshold_ends_the_rounds_early() {
    let mut solver = Solver::with_options(SolverOptions {
        belief_propagation: BeliefPropagationOptions {
            max_iterations: 100,
            convergence_threshold: Some(1e-9),
            ..Default::default()
        },
        ..Default::default()
    });
    let x = solver.new_bounded_integer(0, 2);

    let _ = solver
        .add_constraint(constraints::oracle(x, [0, 1, 2], [0.5, 0.25, 0.25]))
        .post();
    let report = solver.belief_propagation().expect("consistent");

    assert!(report.converged);
    assert!(report.iterations < 100);
    assert!((solver.probability(&x, 0) - 0.5).abs() < 1e-9);
}

#[test]
fn weight_zero_oracle_is_neutral() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(0, 2);

    let _ = solver
        .add_constraint(constraints::oracle(x, [0, 1, 2], [0.98, 0.01, 0.01]))
        .with_weight(0.0)
        .post();
    let _ = solver.belief_propagation().expect("consistent");

    for value in 0..=2 {
        assert!((solver.probability(&x, value) - 1.0 / 3.0).abs() < 1e-9);
    }
}

#[test]
fn pruned_values_have_zero_belief() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(0, 4);
    let y = solver.new_bounded_integer(0, 2);

    let _ = solver
        .add_constraint(constraints::less_or_equal(x, y))
        .post();
    let _ = solver.belief_propagation().expect("consistent");

    assert_eq!(solver.probability(&x, 3), 0.0);
    assert_eq!(solver.probability(&x, 4), 0.0);
    let total = (0..=2).map(|value| solver.probability(&x, value)).sum::<f64>();
    assert!((total - 1.0).abs() < 1e-9);
}
