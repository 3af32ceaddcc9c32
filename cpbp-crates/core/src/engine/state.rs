use log::debug;

use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::belief::BeliefRepresentation;
use crate::cpbp_assert_eq_simple;
use crate::create_statistics_struct;
use crate::engine::notifications::WatchListDomainEvents;
use crate::engine::propagator_queue::PropagatorQueue;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::BeliefPropagationOptions;
use crate::engine::BeliefPropagationReport;
use crate::engine::VariableNames;
use crate::propagation::BeliefContext;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorId;
use crate::propagation::PropagatorStore;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The state of one solve: the variables with their domains and beliefs, the propagators with
/// their weights, and the worklist of the fixpoint loop.
///
/// Once the state is found to be inconsistent it stays inconsistent; every later attempt to
/// propagate returns the same [`Inconsistency`].
#[derive(Debug)]
pub struct State {
    pub(crate) assignments: Assignments,
    pub(crate) variable_names: VariableNames,
    pub(crate) propagators: PropagatorStore,
    propagator_queue: PropagatorQueue,
    watch_list: WatchListDomainEvents,
    inconsistency: Option<Inconsistency>,
    statistics: StateStatistics,
}

create_statistics_struct!(StateStatistics {
    num_propagators_called: usize,
    num_conflicts: usize,
    num_belief_propagation_iterations: usize,
});

impl Default for State {
    fn default() -> Self {
        State::new(BeliefRepresentation::default())
    }
}

impl State {
    pub(crate) fn new(representation: BeliefRepresentation) -> Self {
        State {
            assignments: Assignments::new(representation),
            variable_names: VariableNames::default(),
            propagators: PropagatorStore::default(),
            propagator_queue: PropagatorQueue::default(),
            watch_list: WatchListDomainEvents::default(),
            inconsistency: None,
            statistics: StateStatistics::default(),
        }
    }

    pub(crate) fn new_interval_variable(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: Option<String>,
    ) -> DomainId {
        let domain = self.assignments.grow(lower_bound, upper_bound);
        if let Some(name) = name {
            self.variable_names.add_integer(domain, name);
        }
        domain
    }

    pub(crate) fn new_sparse_variable(&mut self, values: Vec<i32>, name: Option<String>) -> DomainId {
        let domain = self.assignments.grow_sparse(values);
        if let Some(name) = name {
            self.variable_names.add_integer(domain, name);
        }
        domain
    }

    /// Creates the propagator of `constructor`, registers it for the events it asks for and
    /// enqueues it.
    pub(crate) fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        weight: f64,
    ) -> PropagatorId
    where
        Constructor: PropagatorConstructor,
    {
        self.insert_propagator(constructor, weight, true)
    }

    /// Like [`State::add_propagator`], but the propagator only runs once one of the events it
    /// registered for happens.
    pub(crate) fn add_dormant_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        weight: f64,
    ) -> PropagatorId
    where
        Constructor: PropagatorConstructor,
    {
        self.insert_propagator(constructor, weight, false)
    }

    fn insert_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        weight: f64,
        enqueue: bool,
    ) -> PropagatorId
    where
        Constructor: PropagatorConstructor,
    {
        let propagator_id = self.propagators.new_propagator();
        let context = PropagatorConstructorContext::new(
            &mut self.watch_list,
            &self.assignments,
            propagator_id,
        );

        let propagator = constructor.create(context);
        let priority = propagator.priority();
        debug!("adding propagator {} as {propagator_id}", propagator.name());

        let allocated_id = self.propagators.alloc(Box::new(propagator), weight);
        cpbp_assert_eq_simple!(allocated_id, propagator_id);

        if enqueue {
            self.propagator_queue
                .enqueue_propagator(propagator_id, priority);
        }

        propagator_id
    }

    /// Applies a domain mutation requested from outside of a propagator; a mutation which empties
    /// a domain makes the state inconsistent.
    pub(crate) fn apply(
        &mut self,
        mutation: impl FnOnce(&mut Assignments) -> Result<(), EmptyDomain>,
    ) -> Result<(), EmptyDomain> {
        mutation(&mut self.assignments)
            .inspect_err(|_| self.mark_inconsistent(Inconsistency::EmptyDomain))
    }

    pub(crate) fn is_inconsistent(&self) -> bool {
        self.inconsistency.is_some()
    }

    fn mark_inconsistent(&mut self, inconsistency: Inconsistency) {
        debug!("state became inconsistent: {inconsistency}");
        self.statistics.num_conflicts += 1;
        self.inconsistency = Some(inconsistency);
        self.propagator_queue.clear();
        self.assignments.clear_domain_events();
    }

    fn enqueue_affected_propagators(&mut self) {
        for (event, domain) in self.assignments.drain_domain_events() {
            for &propagator_id in self.watch_list.get_affected_propagators(event, domain) {
                let priority = self.propagators[propagator_id].priority();
                self.propagator_queue
                    .enqueue_propagator(propagator_id, priority);
            }
        }
    }

    /// Runs the enqueued propagators until none is left.
    ///
    /// The first inconsistency aborts the loop: the remaining propagators are discarded and the
    /// state is marked inconsistent.
    pub(crate) fn propagate_to_fixed_point(&mut self) -> PropagationStatus {
        if let Some(inconsistency) = self.inconsistency {
            return Err(inconsistency);
        }

        loop {
            self.enqueue_affected_propagators();

            let Some(propagator_id) = self.propagator_queue.pop() else {
                break;
            };

            self.statistics.num_propagators_called += 1;
            let context = PropagationContext::new(&mut self.assignments, propagator_id);
            let result = self.propagators[propagator_id].propagate(context);

            if let Err(inconsistency) = result {
                self.mark_inconsistent(inconsistency);
                return Err(inconsistency);
            }
        }

        Ok(())
    }

    /// Brings the state to a fixpoint and then exchanges belief messages between the propagators
    /// and the variables.
    ///
    /// Every round consists of the propagators collecting the beliefs of their variables, the
    /// beliefs being reset, the propagators sending their (weighted) messages and the beliefs being
    /// normalised.
    pub(crate) fn belief_propagation(
        &mut self,
        options: &BeliefPropagationOptions,
    ) -> Result<BeliefPropagationReport, Inconsistency> {
        self.propagate_to_fixed_point()?;

        let propagator_ids = self.propagators.keys().collect::<Vec<_>>();
        let mut report = BeliefPropagationReport::default();

        while report.iterations < options.max_iterations {
            let snapshot = self.assignments.snapshot_marginals();

            for &propagator_id in &propagator_ids {
                let context = BeliefContext::new(
                    &mut self.assignments,
                    self.propagators.weight(propagator_id),
                    options.damping,
                );
                self.propagators[propagator_id].receive_messages(context);
            }

            self.assignments.reset_all_marginals();

            for &propagator_id in &propagator_ids {
                let context = BeliefContext::new(
                    &mut self.assignments,
                    self.propagators.weight(propagator_id),
                    options.damping,
                );
                self.propagators[propagator_id].send_messages(context);
            }

            self.assignments.normalize_all_marginals();

            report.iterations += 1;
            report.max_delta = self.assignments.max_marginal_change(&snapshot);
            self.statistics.num_belief_propagation_iterations += 1;
            debug!(
                "belief propagation round {}: largest change {}",
                report.iterations, report.max_delta
            );

            if options
                .convergence_threshold
                .is_some_and(|threshold| report.max_delta < threshold)
            {
                report.converged = true;
                break;
            }
        }

        Ok(report)
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.assignments
            .num_domains()
            .log(statistic_logger.attach_to_prefix("num_variables"));
        self.propagators
            .num_propagators()
            .log(statistic_logger.attach_to_prefix("num_propagators"));
        self.statistics.log(statistic_logger);
    }
}
