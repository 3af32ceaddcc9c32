use std::fmt::Debug;
use std::fmt::Formatter;

use crate::basic_types::PropagationStatus;
use crate::engine::notifications::DomainEvents;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::variables::IntegerVariable;

/// A callback which is run inside the fixpoint whenever a domain event it listens to happens.
pub(crate) type Procedure = Box<dyn FnMut(&mut PropagationContext<'_>) -> PropagationStatus>;

/// The [`PropagatorConstructor`] for the [`ProcedurePropagator`].
pub(crate) struct ProcedurePropagatorArgs<Var> {
    pub(crate) var: Var,
    pub(crate) events: DomainEvents,
    pub(crate) procedure: Procedure,
}

impl<Var: Debug> Debug for ProcedurePropagatorArgs<Var> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedurePropagatorArgs")
            .field("var", &self.var)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<Var> PropagatorConstructor for ProcedurePropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = ProcedurePropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        context.register(&self.var, self.events);

        ProcedurePropagator {
            procedure: self.procedure,
        }
    }
}

/// Runs a user-supplied [`Procedure`]; it has no influence on the beliefs.
pub(crate) struct ProcedurePropagator {
    procedure: Procedure,
}

impl Debug for ProcedurePropagator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedurePropagator").finish_non_exhaustive()
    }
}

impl Propagator for ProcedurePropagator {
    fn name(&self) -> &str {
        "Procedure"
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatus {
        (self.procedure)(&mut context)
    }
}
