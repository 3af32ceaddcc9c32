use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::BeliefContext;
use super::PropagationContext;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::propagation::MessageBuffer;
#[cfg(doc)]
use crate::propagation::PropagatorConstructorContext;

// We need to use this to cast from `Box<dyn Propagator>` to the concrete propagator; rust
// inherently does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

/// A propagator removes values from domains which will never be in any solution, or raises
/// explicit conflicts, and exchanges belief messages with the variables in its scope.
///
/// The only required functions are [`Propagator::name`] and [`Propagator::propagate`]; a
/// propagator which does not implement the message functions does not influence any belief.
pub trait Propagator: Downcast {
    /// Return the name of the propagator.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// Removes values from the domains of the variables in the scope which cannot be part of any
    /// solution given the current domains.
    ///
    /// Returns [`Result::Err`] if a domain became empty or if the propagator found the current
    /// domains to be inconsistent (see [`PropagationContext::conflict`]).
    ///
    /// Propagators are not required to propagate until a fixed point. It will be called again by
    /// the solver until no further propagations happen.
    fn propagate(&mut self, context: PropagationContext) -> PropagationStatus;

    /// Collects the current beliefs of the variables in the scope, excluding the message this
    /// propagator sent in the previous round. Typically implemented by calling
    /// [`BeliefContext::receive`] for every variable.
    fn receive_messages(&mut self, _context: BeliefContext) {}

    /// Computes, for every variable in the scope and every value in its domain, the belief
    /// supported by this propagator given the beliefs of the other variables, and sends it with
    /// [`BeliefContext::send`].
    ///
    /// Called after all beliefs were reset, so the messages sent here (together with those of
    /// the other propagators) make up the new beliefs.
    fn send_messages(&mut self, _context: BeliefContext) {}

    /// Returns the priority of the propagator represented as an integer. Lower values mean higher
    /// priority and the priority determines the order in which propagators will be asked to
    /// propagate. It is custom for simpler propagators to have lower priority values.
    ///
    /// By default the priority is set to [`Priority::VeryLow`]. It is expected that
    /// propagator implementations would set this value to some appropriate value.
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}
