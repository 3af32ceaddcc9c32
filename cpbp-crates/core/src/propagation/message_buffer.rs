use super::ReadDomains;
use crate::belief::Belief;
use crate::cpbp_assert_moderate;
use crate::variables::IntegerVariable;

/// Per-propagator storage of the messages exchanged with the variables in its scope.
///
/// Every variable in the scope gets a slot, indexed from the lower bound the variable had when the
/// slot was created (domains only shrink afterwards). A slot stores
///
/// - the local beliefs: the normalised belief of every value without the last message sent by the
///   propagator, as probabilities;
/// - the sent messages, in the active representation, which are divided out when receiving;
/// - the previous outgoing probabilities, used for damping.
#[derive(Debug, Clone, Default)]
pub struct MessageBuffer {
    slots: Vec<MessageSlot>,
}

#[derive(Debug, Clone)]
struct MessageSlot {
    offset: i32,
    local: Vec<f64>,
    sent: Vec<Belief>,
    previous: Vec<Option<f64>>,
}

impl MessageSlot {
    fn index_of(&self, value: i32) -> usize {
        cpbp_assert_moderate!(
            value >= self.offset && ((value - self.offset) as usize) < self.local.len(),
            "{value} is outside of the values covered by the message slot"
        );
        (value - self.offset) as usize
    }
}

impl MessageBuffer {
    /// Creates a buffer with a slot for every variable in `scope`, in order.
    pub fn new<Var: IntegerVariable>(context: &impl ReadDomains, scope: &[Var]) -> Self {
        let mut buffer = MessageBuffer::default();
        for var in scope {
            let _ = buffer.add_slot(context, var);
        }
        buffer
    }

    /// Adds a slot for `var` and returns its index.
    pub fn add_slot<Var: IntegerVariable>(&mut self, context: &impl ReadDomains, var: &Var) -> usize {
        let offset = context.lower_bound(var);
        let len = (context.upper_bound(var) - offset) as usize + 1;
        let one = context.representation().one();

        self.slots.push(MessageSlot {
            offset,
            local: vec![0.0; len],
            sent: vec![one; len],
            previous: vec![None; len],
        });
        self.slots.len() - 1
    }

    /// The smallest value covered by `slot`.
    pub fn offset(&self, slot: usize) -> i32 {
        self.slots[slot].offset
    }

    /// The local probabilities of `slot`, where entry `i` belongs to value `offset(slot) + i`; values
    /// which are no longer in the domain have probability zero.
    pub fn local(&self, slot: usize) -> &[f64] {
        &self.slots[slot].local
    }

    /// The local probability of `value` in `slot`; zero for values not covered by the slot.
    pub fn local_probability(&self, slot: usize, value: i32) -> f64 {
        let slot = &self.slots[slot];
        if value < slot.offset {
            return 0.0;
        }
        slot.local
            .get((value - slot.offset) as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub(crate) fn sent(&self, slot: usize, value: i32) -> Belief {
        let slot = &self.slots[slot];
        slot.sent[slot.index_of(value)]
    }

    pub(crate) fn set_sent(&mut self, slot: usize, value: i32, message: Belief) {
        let slot = &mut self.slots[slot];
        let index = slot.index_of(value);
        slot.sent[index] = message;
    }

    pub(crate) fn clear_local(&mut self, slot: usize) {
        self.slots[slot].local.fill(0.0);
    }

    pub(crate) fn set_local(&mut self, slot: usize, value: i32, probability: f64) {
        let slot = &mut self.slots[slot];
        let index = slot.index_of(value);
        slot.local[index] = probability;
    }

    /// Normalises the local probabilities of `values`; uniform if they sum to zero.
    pub(crate) fn normalize_local(&mut self, slot: usize, values: &[i32]) {
        let slot = &mut self.slots[slot];
        let total = values
            .iter()
            .map(|&value| slot.local[slot.index_of(value)])
            .sum::<f64>();

        for &value in values {
            let index = slot.index_of(value);
            slot.local[index] = if total > 0.0 && total.is_finite() {
                slot.local[index] / total
            } else {
                1.0 / values.len() as f64
            };
        }
    }

    /// Mixes `probability` with the previous outgoing probability of `value` and remembers the
    /// result.
    pub(crate) fn damp(&mut self, slot: usize, value: i32, probability: f64, damping: f64) -> f64 {
        let slot = &mut self.slots[slot];
        let index = slot.index_of(value);

        let damped = match slot.previous[index] {
            Some(previous) if damping > 0.0 => (1.0 - damping) * probability + damping * previous,
            _ => probability,
        };
        slot.previous[index] = Some(damped);
        damped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefRepresentation;
    use crate::engine::Assignments;
    use crate::propagation::BeliefContext;
    use crate::variables::DomainId;

    struct Reader<'a>(&'a Assignments);

    impl ReadDomains for Reader<'_> {
        fn assignments(&self) -> &Assignments {
            self.0
        }
    }

    #[test]
    fn receiving_divides_out_the_sent_message() {
        let mut assignments = Assignments::new(BeliefRepresentation::Linear);
        let x: DomainId = assignments.grow(0, 1);
        let mut buffer = MessageBuffer::new(&Reader(&assignments), &[x]);

        // Another factor contributed [0.2, 0.8].
        x.reset_marginals(&mut assignments);
        x.receive_message(&mut assignments, 0, 0.2);
        x.receive_message(&mut assignments, 1, 0.8);

        let mut context = BeliefContext::new(&mut assignments, 1.0, 0.0);
        context.send(&mut buffer, 0, &x, |value| if value == 0 { 3.0 } else { 1.0 });
        x.normalize_marginals(&mut assignments);

        let mut context = BeliefContext::new(&mut assignments, 1.0, 0.0);
        context.receive(&mut buffer, 0, &x);

        assert!((buffer.local_probability(0, 0) - 0.2).abs() < 1e-9);
        assert!((buffer.local_probability(0, 1) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn zero_weight_messages_are_neutral() {
        for representation in [BeliefRepresentation::Linear, BeliefRepresentation::Log] {
            let mut assignments = Assignments::new(representation);
            let x: DomainId = assignments.grow(0, 2);
            let mut buffer = MessageBuffer::new(&Reader(&assignments), &[x]);
            let before = (0..=2)
                .map(|value| x.marginal(&assignments, value))
                .collect::<Vec<_>>();

            let mut context = BeliefContext::new(&mut assignments, 0.0, 0.0);
            context.send(&mut buffer, 0, &x, |value| if value == 0 { 0.9 } else { 0.05 });

            for value in 0..=2 {
                assert_eq!(x.marginal(&assignments, value), before[value as usize]);
            }
        }
    }

    #[test]
    fn damping_mixes_with_the_previous_message() {
        let mut assignments = Assignments::new(BeliefRepresentation::Linear);
        let x: DomainId = assignments.grow(0, 1);
        let mut buffer = MessageBuffer::new(&Reader(&assignments), &[x]);

        assert_eq!(buffer.damp(0, 0, 1.0, 0.5), 1.0);
        assert_eq!(buffer.damp(0, 0, 0.0, 0.5), 0.5);
        assert_eq!(buffer.damp(0, 1, 0.25, 0.5), 0.25);
    }

    #[test]
    fn values_outside_the_slot_have_zero_local_probability() {
        let mut assignments = Assignments::new(BeliefRepresentation::Linear);
        let x: DomainId = assignments.grow(2, 4);
        let buffer = MessageBuffer::new(&Reader(&assignments), &[x]);

        assert_eq!(buffer.offset(0), 2);
        assert_eq!(buffer.local_probability(0, 1), 0.0);
        assert_eq!(buffer.local_probability(0, 5), 0.0);
    }
}
