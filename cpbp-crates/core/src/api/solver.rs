use std::marker::PhantomData;

use log::debug;

use super::SolverOptions;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Random;
use crate::belief::Belief;
use crate::belief::BeliefRepresentation;
use crate::constraints::Constraint;
use crate::constraints::ConstraintPoster;
use crate::cpbp_assert_simple;
use crate::engine::notifications::DomainEvents;
use crate::engine::BeliefPropagationReport;
use crate::engine::State;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;
use crate::propagators::ProcedurePropagatorArgs;
use crate::statistics::should_log_statistics;
use crate::statistics::StatisticLogger;
use crate::variables::DomainId;
use crate::variables::IntegerVariable;

/// The main interaction point which allows the creation of variables, the addition of
/// constraints, and the computation of beliefs.
///
/// A model is solved in two explicit phases: [`Solver::fixed_point`] removes the values which are
/// inconsistent with the constraints, and [`Solver::belief_propagation`] estimates the marginal
/// probability of every remaining value. Both can be called repeatedly, e.g. after fixing a
/// variable.
///
/// Once a phase returns an [`Inconsistency`] the solver stays inconsistent; a new solver has to be
/// created for the next attempt.
///
/// # Creating Variables
/// ```rust
/// # use cpbp_core::Solver;
/// let mut solver = Solver::default();
///
/// // Interval domains
/// let x = solver.new_bounded_integer(0, 10);
/// // Named variables
/// let y = solver.new_named_integer(0, 10, "y");
/// // Domains with holes
/// let z = solver.new_sparse_integer(vec![1, 3, 7]);
///
/// assert_eq!(solver.size(&z), 3);
/// assert_eq!(solver.describe(&y), "y");
/// ```
///
/// # Beliefs
/// ```rust
/// # use cpbp_core::constraints;
/// # use cpbp_core::Solver;
/// let mut solver = Solver::default();
/// let x = solver.new_bounded_integer(0, 1);
///
/// let _ = solver
///     .add_constraint(constraints::oracle(x, [0, 1], [0.25, 0.75]))
///     .post();
/// let _ = solver.belief_propagation().expect("no inconsistency");
///
/// assert!((solver.probability(&x, 1) - 0.75).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct Solver {
    state: State,
    options: SolverOptions,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::with_options(SolverOptions::default())
    }
}

impl Solver {
    /// Creates a solver with the provided [`SolverOptions`].
    pub fn with_options(options: SolverOptions) -> Self {
        Solver {
            state: State::new(options.belief_representation),
            options,
        }
    }

    /// The representation in which the beliefs of this solver are stored.
    pub fn representation(&self) -> BeliefRepresentation {
        self.state.assignments.representation()
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }
}

/// Methods to create and describe variables.
impl Solver {
    /// Create a new integer variable with the domain `[lower_bound, upper_bound]` and uniform
    /// beliefs.
    pub fn new_bounded_integer(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.state
            .new_interval_variable(lower_bound, upper_bound, None)
    }

    /// Create a new named integer variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_named_integer(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl Into<String>,
    ) -> DomainId {
        self.state
            .new_interval_variable(lower_bound, upper_bound, Some(name.into()))
    }

    /// Create a new integer variable whose domain consists of exactly the provided values.
    pub fn new_sparse_integer(&mut self, values: impl Into<Vec<i32>>) -> DomainId {
        self.state.new_sparse_variable(values.into(), None)
    }

    /// Gives `var` a name, replacing the previous one.
    pub fn set_name(&mut self, var: DomainId, name: impl Into<String>) {
        self.state.variable_names.add_integer(var, name.into());
    }

    /// A human-readable description of `var`.
    pub fn describe(&self, var: &impl IntegerVariable) -> String {
        var.describe(&self.state.variable_names)
    }
}

/// Methods to retrieve information about variables.
impl Solver {
    pub fn lower_bound(&self, var: &impl IntegerVariable) -> i32 {
        var.lower_bound(&self.state.assignments)
    }

    pub fn upper_bound(&self, var: &impl IntegerVariable) -> i32 {
        var.upper_bound(&self.state.assignments)
    }

    pub fn size(&self, var: &impl IntegerVariable) -> usize {
        var.size(&self.state.assignments)
    }

    pub fn is_fixed(&self, var: &impl IntegerVariable) -> bool {
        var.is_fixed(&self.state.assignments)
    }

    pub fn contains(&self, var: &impl IntegerVariable, value: i32) -> bool {
        var.contains(&self.state.assignments, value)
    }

    /// The values in the domain of `var`, in ascending order.
    pub fn domain(&self, var: &impl IntegerVariable) -> Vec<i32> {
        var.iterate_domain(&self.state.assignments).collect()
    }

    /// Writes the values of `var` in ascending order into `destination`, which has to be large
    /// enough, and returns the number of values written.
    pub fn fill_array(&self, var: &impl IntegerVariable, destination: &mut [i32]) -> usize {
        var.fill_array(&self.state.assignments, destination)
    }

    /// A value of the domain of `var` chosen uniformly at random.
    pub fn random_value(&mut self, var: &impl IntegerVariable) -> i32 {
        var.random_value(
            &self.state.assignments,
            &mut self.options.random_generator,
        )
    }

    /// A value of the domain of `var` sampled according to its beliefs.
    pub fn sample_value(&mut self, var: &impl IntegerVariable) -> i32 {
        let values = self.domain(var);
        let weights = values
            .iter()
            .map(|&value| self.probability(var, value))
            .collect::<Vec<_>>();

        match self.options.random_generator.get_weighted_choice(&weights) {
            Some(index) => values[index],
            None => self.random_value(var),
        }
    }
}

/// Methods to change the domains of variables outside of propagation.
///
/// A change which empties a domain makes the solver inconsistent. The propagators watching a
/// variable only run during the next [`Solver::fixed_point`].
impl Solver {
    pub fn remove(&mut self, var: &impl IntegerVariable, value: i32) -> Result<(), EmptyDomain> {
        self.state.apply(|assignments| var.remove(assignments, value))
    }

    pub fn assign(&mut self, var: &impl IntegerVariable, value: i32) -> Result<(), EmptyDomain> {
        self.state.apply(|assignments| var.assign(assignments, value))
    }

    pub fn remove_below(
        &mut self,
        var: &impl IntegerVariable,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        self.state
            .apply(|assignments| var.remove_below(assignments, value))
    }

    pub fn remove_above(
        &mut self,
        var: &impl IntegerVariable,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        self.state
            .apply(|assignments| var.remove_above(assignments, value))
    }
}

/// Methods to read and write the beliefs of variables.
impl Solver {
    /// The belief of `value` in the representation of the solver; zero for values which are not in
    /// the domain.
    pub fn marginal(&self, var: &impl IntegerVariable, value: i32) -> Belief {
        var.marginal(&self.state.assignments, value)
    }

    /// The belief of `value` as a probability.
    pub fn probability(&self, var: &impl IntegerVariable, value: i32) -> f64 {
        self.representation()
            .to_probability(self.marginal(var, value))
    }

    /// Overwrites the belief of `value`, which has to be in the domain of `var`.
    pub fn set_marginal(&mut self, var: &impl IntegerVariable, value: i32, belief: Belief) {
        var.set_marginal(&mut self.state.assignments, value, belief);
    }

    pub fn reset_marginals(&mut self, var: &impl IntegerVariable) {
        var.reset_marginals(&mut self.state.assignments);
    }

    pub fn normalize_marginals(&mut self, var: &impl IntegerVariable) {
        var.normalize_marginals(&mut self.state.assignments);
    }

    pub fn max_marginal(&self, var: &impl IntegerVariable) -> Belief {
        var.max_marginal(&self.state.assignments)
    }

    pub fn min_marginal(&self, var: &impl IntegerVariable) -> Belief {
        var.min_marginal(&self.state.assignments)
    }

    pub fn value_with_max_marginal(&self, var: &impl IntegerVariable) -> i32 {
        var.value_with_max_marginal(&self.state.assignments)
    }

    pub fn value_with_min_marginal(&self, var: &impl IntegerVariable) -> i32 {
        var.value_with_min_marginal(&self.state.assignments)
    }

    pub fn max_marginal_regret(&self, var: &impl IntegerVariable) -> f64 {
        var.max_marginal_regret(&self.state.assignments)
    }
}

/// Methods for adding constraints and procedures.
impl Solver {
    /// Add a constraint to the solver. This returns a [`ConstraintPoster`] which enables the
    /// weight of the constraint to be set before it is posted.
    ///
    /// ```rust
    /// # use cpbp_core::constraints;
    /// # use cpbp_core::Solver;
    /// let mut solver = Solver::default();
    ///
    /// let x = solver.new_bounded_integer(0, 5);
    /// let y = solver.new_bounded_integer(3, 8);
    ///
    /// let _ = solver
    ///     .add_constraint(constraints::less_or_equal(y, x))
    ///     .post();
    /// solver.fixed_point().expect("no inconsistency");
    ///
    /// assert_eq!(solver.lower_bound(&x), 3);
    /// assert_eq!(solver.upper_bound(&y), 5);
    /// ```
    pub fn add_constraint<ConstraintType: Constraint>(
        &mut self,
        constraint: ConstraintType,
    ) -> ConstraintPoster<'_, ConstraintType> {
        ConstraintPoster::new(self, constraint)
    }

    /// Creates an instance of the propagator described by `constructor`, with the given weight,
    /// and adds it to the solver. It is enqueued and runs during the next phase.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        weight: f64,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
    {
        PropagatorHandle {
            id: self.state.add_propagator(constructor, weight),
            propagator: PhantomData,
        }
    }

    /// Get a reference to the propagator identified by the given handle.
    pub fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self.state.propagators.get_propagator(handle.id)
    }

    /// Sets the weight of a posted constraint; it takes effect from the next round of belief
    /// propagation.
    pub fn set_weight(&mut self, propagator: PropagatorId, weight: f64) {
        cpbp_assert_simple!(
            weight >= 0.0 && weight.is_finite(),
            "the weight of a constraint has to be a non-negative number, got {weight}"
        );
        self.state.propagators.set_weight(propagator, weight);
    }

    pub fn weight(&self, propagator: PropagatorId) -> f64 {
        self.state.propagators.weight(propagator)
    }

    /// Runs `procedure` during the fixpoint whenever `var` becomes fixed. Posting it does not run
    /// it; only a later mutation of `var` does.
    pub fn when_bind<Var, Procedure>(&mut self, var: Var, procedure: Procedure) -> PropagatorId
    where
        Var: IntegerVariable + 'static,
        Procedure: FnMut(&mut PropagationContext<'_>) -> PropagationStatus + 'static,
    {
        self.add_procedure(var, DomainEvents::ASSIGN, procedure)
    }

    /// Runs `procedure` during the fixpoint whenever a bound of `var` moves.
    pub fn when_bounds_change<Var, Procedure>(
        &mut self,
        var: Var,
        procedure: Procedure,
    ) -> PropagatorId
    where
        Var: IntegerVariable + 'static,
        Procedure: FnMut(&mut PropagationContext<'_>) -> PropagationStatus + 'static,
    {
        self.add_procedure(var, DomainEvents::BOUNDS, procedure)
    }

    /// Runs `procedure` during the fixpoint whenever the domain of `var` shrinks.
    pub fn when_domain_change<Var, Procedure>(
        &mut self,
        var: Var,
        procedure: Procedure,
    ) -> PropagatorId
    where
        Var: IntegerVariable + 'static,
        Procedure: FnMut(&mut PropagationContext<'_>) -> PropagationStatus + 'static,
    {
        self.add_procedure(var, DomainEvents::ANY_INT, procedure)
    }

    fn add_procedure<Var, Procedure>(
        &mut self,
        var: Var,
        events: DomainEvents,
        procedure: Procedure,
    ) -> PropagatorId
    where
        Var: IntegerVariable + 'static,
        Procedure: FnMut(&mut PropagationContext<'_>) -> PropagationStatus + 'static,
    {
        self.state.add_dormant_propagator(
            ProcedurePropagatorArgs {
                var,
                events,
                procedure: Box::new(procedure),
            },
            1.0,
        )
    }
}

/// Methods which run the engine.
impl Solver {
    /// Removes values until no propagator can remove any more.
    pub fn fixed_point(&mut self) -> PropagationStatus {
        self.state.propagate_to_fixed_point()
    }

    /// Brings the solver to a fixpoint and then runs belief propagation with the options the
    /// solver was created with.
    pub fn belief_propagation(&mut self) -> Result<BeliefPropagationReport, Inconsistency> {
        let report = self
            .state
            .belief_propagation(&self.options.belief_propagation)?;
        debug!(
            "belief propagation stopped after {} rounds (converged: {})",
            report.iterations, report.converged
        );
        Ok(report)
    }

    /// Whether a phase has found the model to be inconsistent.
    pub fn is_inconsistent(&self) -> bool {
        self.state.is_inconsistent()
    }

    /// Logs the statistics of the solver, if statistic logging is configured.
    pub fn log_statistics(&self) {
        if should_log_statistics() {
            self.state.log_statistics(StatisticLogger::new("engine"));
        }
    }
}

/// A handle to a propagator that was added to the solver.
#[derive(Debug)]
pub struct PropagatorHandle<P> {
    id: PropagatorId,
    propagator: PhantomData<P>,
}

impl<P> PropagatorHandle<P> {
    /// Get the [`PropagatorId`] of the propagator.
    pub fn propagator_id(self) -> PropagatorId {
        self.id
    }
}

impl<P> Clone for PropagatorHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PropagatorHandle<P> {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::constraints;
    use crate::engine::BeliefPropagationOptions;
    use crate::propagation::ReadDomains;
    use crate::variables::TransformableVariable;

    #[test]
    fn fixpoint_stops_at_the_first_empty_domain() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);
        let y = solver.new_bounded_integer(0, 1);
        let trace = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&trace);
        let _ = solver.when_domain_change(x, move |context: &mut PropagationContext<'_>| {
            first.borrow_mut().push("first");
            if context.is_fixed(&x) {
                let value = context.lower_bound(&x);
                context.remove(&x, value)?;
            }
            Ok(())
        });
        let second = Rc::clone(&trace);
        let _ = solver.when_domain_change(y, move |_: &mut PropagationContext<'_>| {
            second.borrow_mut().push("second");
            Ok(())
        });

        solver.fixed_point().expect("nothing is fixed yet");
        assert!(trace.borrow().is_empty());

        solver.assign(&x, 1).expect("1 is in the domain");
        solver.remove(&y, 0).expect("1 remains");

        assert_eq!(solver.fixed_point(), Err(Inconsistency::EmptyDomain));
        assert_eq!(*trace.borrow(), vec!["first"]);
        assert!(solver.is_inconsistent());
        assert_eq!(
            solver.belief_propagation().map(|_| ()),
            Err(Inconsistency::EmptyDomain)
        );
    }

    #[test]
    fn bind_procedures_wait_for_an_assignment() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 3);
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        let _ = solver.when_bind(x, move |_: &mut PropagationContext<'_>| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        solver.fixed_point().expect("consistent");
        assert_eq!(calls.get(), 0);

        solver.remove(&x, 3).expect("other values remain");
        solver.fixed_point().expect("consistent");
        assert_eq!(calls.get(), 0);

        solver.assign(&x, 1).expect("1 is in the domain");
        solver.fixed_point().expect("consistent");
        assert_eq!(calls.get(), 1);

        solver.fixed_point().expect("consistent");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn weight_zero_keeps_uniform_beliefs() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);

        let _ = solver
            .add_constraint(constraints::oracle(x, [0, 1, 2], [0.9, 0.05, 0.05]))
            .with_weight(0.0)
            .post();
        let _ = solver.belief_propagation().expect("consistent");

        for value in 0..=2 {
            assert!((solver.probability(&x, value) - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn changing_the_weight_changes_the_beliefs() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 1);

        let oracle = solver
            .add_constraint(constraints::oracle(x, [0, 1], [0.2, 0.8]))
            .post();
        let _ = solver.belief_propagation().expect("consistent");
        assert!((solver.probability(&x, 1) - 0.8).abs() < 1e-9);

        solver.set_weight(oracle, 0.0);
        assert_eq!(solver.weight(oracle), 0.0);
        let _ = solver.belief_propagation().expect("consistent");
        assert!((solver.probability(&x, 1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn both_representations_agree() {
        let probabilities = [BeliefRepresentation::Linear, BeliefRepresentation::Log].map(
            |belief_representation| {
                let mut solver = Solver::with_options(SolverOptions {
                    belief_representation,
                    belief_propagation: BeliefPropagationOptions {
                        max_iterations: 10,
                        ..Default::default()
                    },
                    ..Default::default()
                });
                let x = solver.new_bounded_integer(0, 3);
                let y = solver.new_bounded_integer(0, 3);

                let _ = solver
                    .add_constraint(constraints::less_or_equal(x, y.offset(-1)))
                    .post();
                let _ = solver
                    .add_constraint(constraints::oracle(y, [1, 2, 3], [0.5, 0.3, 0.2]))
                    .with_weight(0.5)
                    .post();
                let _ = solver.belief_propagation().expect("consistent");

                (0..=3)
                    .map(|value| solver.probability(&x, value))
                    .collect::<Vec<_>>()
            },
        );

        for (linear, log) in probabilities[0].iter().zip(&probabilities[1]) {
            assert!((linear - log).abs() < 1e-9);
        }
    }

    #[test]
    fn sampling_follows_the_beliefs() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 3);

        let _ = solver
            .add_constraint(constraints::oracle(x, [2], [1.0]))
            .post();
        let _ = solver.belief_propagation().expect("consistent");

        for _ in 0..10 {
            assert_eq!(solver.sample_value(&x), 2);
        }
        assert_eq!(solver.value_with_max_marginal(&x), 2);
        assert!((solver.max_marginal_regret(&x) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn random_values_are_in_the_domain() {
        let mut solver = Solver::default();
        let x = solver.new_sparse_integer(vec![-4, 0, 9]);

        for _ in 0..20 {
            let value = solver.random_value(&x);
            assert!(solver.contains(&x, value));
        }
    }

    #[test]
    fn names_can_be_changed() {
        let mut solver = Solver::default();
        let x = solver.new_named_integer(0, 3, "x[0]");
        assert_eq!(solver.describe(&x), "x[0]");

        solver.set_name(x, "bar");
        assert_eq!(solver.describe(&x), "bar");
        assert_eq!(solver.describe(&x.negated()), "bar's view (opposite)");
    }
}
