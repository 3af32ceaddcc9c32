use super::MessageBuffer;
use super::PropagatorId;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::belief::Belief;
use crate::belief::BeliefRepresentation;
use crate::engine::Assignments;
use crate::variables::IntegerVariable;

/// Read access to the domains and beliefs of variables.
pub trait ReadDomains {
    fn assignments(&self) -> &Assignments;

    fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.assignments())
    }

    fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.assignments())
    }

    fn size<Var: IntegerVariable>(&self, var: &Var) -> usize {
        var.size(self.assignments())
    }

    fn is_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.is_fixed(self.assignments())
    }

    fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.assignments(), value)
    }

    fn iterate_domain<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.assignments())
    }

    fn marginal<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Belief {
        var.marginal(self.assignments(), value)
    }

    fn representation(&self) -> BeliefRepresentation {
        self.assignments().representation()
    }
}

/// The context in which [`crate::propagation::Propagator::propagate`] runs; it allows narrowing
/// domains.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    assignments: &'a mut Assignments,
    propagator_id: PropagatorId,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(assignments: &'a mut Assignments, propagator_id: PropagatorId) -> Self {
        PropagationContext {
            assignments,
            propagator_id,
        }
    }

    pub fn remove<Var: IntegerVariable>(&mut self, var: &Var, value: i32) -> Result<(), EmptyDomain> {
        var.remove(self.assignments, value)
    }

    pub fn assign<Var: IntegerVariable>(&mut self, var: &Var, value: i32) -> Result<(), EmptyDomain> {
        var.assign(self.assignments, value)
    }

    pub fn remove_below<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        var.remove_below(self.assignments, value)
    }

    pub fn remove_above<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        var.remove_above(self.assignments, value)
    }

    /// The inconsistency to return when the propagator detects that no solution exists.
    pub fn conflict(&self) -> Inconsistency {
        Inconsistency::Conflict(self.propagator_id)
    }
}

impl ReadDomains for PropagationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}

/// The context in which the message functions of a propagator run.
///
/// Messages are computed by propagators as (unnormalised) probabilities; the context converts them
/// to the active [`BeliefRepresentation`], applies damping and raises them to the weight of the
/// propagator.
#[derive(Debug)]
pub struct BeliefContext<'a> {
    assignments: &'a mut Assignments,
    weight: f64,
    damping: f64,
}

impl<'a> BeliefContext<'a> {
    pub(crate) fn new(assignments: &'a mut Assignments, weight: f64, damping: f64) -> Self {
        BeliefContext {
            assignments,
            weight,
            damping,
        }
    }

    /// The weight of the propagator whose messages are being exchanged.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Stores in `slot` of `buffer` the normalised belief of every value of `var`, excluding the
    /// message which was last sent through the same slot.
    pub fn receive<Var: IntegerVariable>(
        &mut self,
        buffer: &mut MessageBuffer,
        slot: usize,
        var: &Var,
    ) {
        let assignments = &*self.assignments;
        let representation = assignments.representation();

        let values = var.iterate_domain(assignments).collect::<Vec<_>>();

        buffer.clear_local(slot);
        for &value in &values {
            let sent = buffer.sent(slot, value);
            let belief = var.send_message(assignments, value, sent);
            buffer.set_local(slot, value, representation.to_probability(belief));
        }
        buffer.normalize_local(slot, &values);
    }

    /// Sends to every value of `var` the message `outside(value)`, an unnormalised probability.
    ///
    /// The messages are normalised over the domain, damped towards the previous message and raised
    /// to the weight of the propagator before they are multiplied into the beliefs of `var`; a
    /// weight of zero therefore leaves the beliefs untouched.
    pub fn send<Var: IntegerVariable>(
        &mut self,
        buffer: &mut MessageBuffer,
        slot: usize,
        var: &Var,
        outside: impl Fn(i32) -> f64,
    ) {
        let representation = self.assignments.representation();
        let values = var.iterate_domain(self.assignments).collect::<Vec<_>>();

        let mut probabilities = values
            .iter()
            .map(|&value| outside(value).max(0.0))
            .collect::<Vec<_>>();
        let total = probabilities.iter().sum::<f64>();
        if total > 0.0 && total.is_finite() {
            probabilities
                .iter_mut()
                .for_each(|probability| *probability /= total);
        } else {
            probabilities.fill(1.0 / values.len() as f64);
        }

        for (&value, &probability) in values.iter().zip(&probabilities) {
            let damped = buffer.damp(slot, value, probability, self.damping);
            let message = representation.pow(representation.from_probability(damped), self.weight);

            buffer.set_sent(slot, value, message);
            var.receive_message(self.assignments, value, message);
        }
    }
}

impl ReadDomains for BeliefContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}
