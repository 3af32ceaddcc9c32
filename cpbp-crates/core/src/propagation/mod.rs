//! Contains the main building blocks for propagators.
//!
//! A [`Propagator`] takes part in the two phases of the engine:
//!
//! - During the fixpoint phase [`Propagator::propagate`] removes values which cannot be part of any
//!   solution, or reports a conflict. The propagator is enqueued whenever one of the domain events
//!   it registered for (through [`PropagatorConstructorContext`]) happens.
//! - During belief propagation [`Propagator::receive_messages`] collects, for every variable in
//!   its scope, the belief of that variable without the contribution of the propagator itself, and
//!   [`Propagator::send_messages`] sends back the beliefs the propagator supports given the other
//!   variables. The [`MessageBuffer`] and [`BeliefContext`] take care of the bookkeeping: dividing
//!   out the previously sent message, normalising and applying the weight of the propagator.

mod constructor;
mod contexts;
mod message_buffer;
mod propagator;
mod propagator_id;
mod store;

pub use constructor::PropagatorConstructor;
pub use constructor::PropagatorConstructorContext;
pub use contexts::BeliefContext;
pub use contexts::PropagationContext;
pub use contexts::ReadDomains;
pub use message_buffer::MessageBuffer;
pub use propagator::Priority;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
pub(crate) use store::PropagatorStore;
