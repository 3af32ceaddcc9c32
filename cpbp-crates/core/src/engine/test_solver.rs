//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows setting
//! up specific scenarios under which to test the filtering and the messages of a propagator.
use super::State;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::belief::BeliefRepresentation;
use crate::engine::BeliefPropagationOptions;
use crate::engine::BeliefPropagationReport;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;
use crate::variables::DomainId;
use crate::variables::IntegerVariable;

/// A container for variables and propagators without a model around it.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    pub(crate) state: State,
}

impl TestSolver {
    pub(crate) fn with_representation(representation: BeliefRepresentation) -> Self {
        TestSolver {
            state: State::new(representation),
        }
    }

    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.state
            .new_interval_variable(lower_bound, upper_bound, None)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: Vec<i32>) -> DomainId {
        self.state.new_sparse_variable(values, None)
    }

    /// Adds the propagator with weight one and brings the state to a fixpoint.
    pub(crate) fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, Inconsistency>
    where
        Constructor: PropagatorConstructor,
    {
        self.new_weighted_propagator(constructor, 1.0)
    }

    pub(crate) fn new_weighted_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        weight: f64,
    ) -> Result<PropagatorId, Inconsistency>
    where
        Constructor: PropagatorConstructor,
    {
        let propagator = self.state.add_propagator(constructor, weight);
        self.state.propagate_to_fixed_point()?;
        Ok(propagator)
    }

    pub(crate) fn propagate(&mut self) -> Result<(), Inconsistency> {
        self.state.propagate_to_fixed_point()
    }

    pub(crate) fn belief_propagation(
        &mut self,
        max_iterations: usize,
    ) -> Result<BeliefPropagationReport, Inconsistency> {
        self.state.belief_propagation(&BeliefPropagationOptions {
            max_iterations,
            ..Default::default()
        })
    }

    pub(crate) fn remove(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.state
            .apply(|assignments| var.remove(assignments, value))
    }

    pub(crate) fn assign(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.state
            .apply(|assignments| var.assign(assignments, value))
    }

    pub(crate) fn set_marginals(&mut self, var: DomainId, beliefs: &[(i32, f64)]) {
        let representation = self.state.assignments.representation();
        for &(value, probability) in beliefs {
            var.set_marginal(
                &mut self.state.assignments,
                value,
                representation.from_probability(probability),
            );
        }
        var.normalize_marginals(&mut self.state.assignments);
    }

    pub(crate) fn lower_bound(&self, var: DomainId) -> i32 {
        var.lower_bound(&self.state.assignments)
    }

    pub(crate) fn upper_bound(&self, var: DomainId) -> i32 {
        var.upper_bound(&self.state.assignments)
    }

    pub(crate) fn contains(&self, var: DomainId, value: i32) -> bool {
        var.contains(&self.state.assignments, value)
    }

    /// The belief of `value` as a probability.
    pub(crate) fn probability(&self, var: DomainId, value: i32) -> f64 {
        self.state
            .assignments
            .representation()
            .to_probability(var.marginal(&self.state.assignments, value))
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lower_bound: i32, upper_bound: i32) {
        let actual_lower_bound = self.lower_bound(var);
        let actual_upper_bound = self.upper_bound(var);

        assert_eq!(
            (lower_bound, upper_bound),
            (actual_lower_bound, actual_upper_bound),
            "The expected bounds [{lower_bound}..{upper_bound}] did not match the actual bounds [{actual_lower_bound}..{actual_upper_bound}]"
        );
    }

    /// Asserts that the beliefs of `var`, as probabilities, match `expected` for the listed values.
    pub(crate) fn assert_probabilities(&self, var: DomainId, expected: &[(i32, f64)]) {
        for &(value, probability) in expected {
            let actual = self.probability(var, value);
            assert!(
                (actual - probability).abs() < 1e-6,
                "expected probability {probability} for {var} = {value}, got {actual}"
            );
        }
    }
}
