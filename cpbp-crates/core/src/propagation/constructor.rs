use super::contexts::ReadDomains;
use super::Propagator;
use super::PropagatorId;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::WatchListDomainEvents;
use crate::engine::notifications::Watchers;
use crate::engine::Assignments;
use crate::variables::IntegerVariable;

/// A propagator constructor creates a fully initialized instance of a [`Propagator`].
///
/// The constructor is responsible for indicating on which events the propagator should be
/// enqueued. Additionally, the propagator can be initialized with values that come from the state
/// of the solver.
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is used when [`Propagator`]s are initialised after creation.
///
/// Propagators use it to register to domain changes of variables and to retrieve the current
/// domains of variables.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    watch_list: &'a mut WatchListDomainEvents,
    assignments: &'a Assignments,
    pub(crate) propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        watch_list: &'a mut WatchListDomainEvents,
        assignments: &'a Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            watch_list,
            assignments,
            propagator_id,
        }
    }

    /// Subscribes the propagator to the given [`DomainEvents`] of `var`.
    ///
    /// Whenever one of the events happens, the propagator is enqueued; it is never invoked
    /// directly from the mutation.
    pub fn register(&mut self, var: &impl IntegerVariable, domain_events: DomainEvents) {
        let mut watchers = Watchers::new(self.propagator_id, self.watch_list);
        var.watch_all(&mut watchers, domain_events.events());
    }

    /// Enqueue the propagator whenever `var` becomes fixed.
    pub fn propagate_on_bind(&mut self, var: &impl IntegerVariable) {
        self.register(var, DomainEvents::ASSIGN);
    }

    /// Enqueue the propagator whenever a bound of `var` moves.
    pub fn propagate_on_bound_change(&mut self, var: &impl IntegerVariable) {
        self.register(var, DomainEvents::BOUNDS);
    }

    /// Enqueue the propagator whenever the domain of `var` shrinks.
    pub fn propagate_on_domain_change(&mut self, var: &impl IntegerVariable) {
        self.register(var, DomainEvents::ANY_INT);
    }
}

impl ReadDomains for PropagatorConstructorContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}
