use enumset::EnumSet;

use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Random;
use crate::belief::Belief;
use crate::containers::StorageKey;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::variables::AffineView;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::VariableNames;

/// A structure which represents the most basic [`IntegerVariable`]; it is simply the id which
/// links to a domain (hence the name).
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct DomainId {
    pub(crate) id: u32,
}

impl DomainId {
    pub(crate) fn new(id: u32) -> Self {
        DomainId { id }
    }
}

impl IntegerVariable for DomainId {
    type AffineView = AffineView<Self>;

    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        assignments.lower_bound(*self)
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        assignments.upper_bound(*self)
    }

    fn size(&self, assignments: &Assignments) -> usize {
        assignments.size(*self)
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        assignments.contains(*self, value)
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        assignments.iterate_domain(*self)
    }

    fn remove(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignments.remove(*self, value)
    }

    fn assign(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignments.assign(*self, value)
    }

    fn remove_below(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignments.remove_below(*self, value)
    }

    fn remove_above(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        assignments.remove_above(*self, value)
    }

    fn random_value(&self, assignments: &Assignments, rng: &mut dyn Random) -> i32 {
        let index = rng.generate_usize_in_range(0..assignments.size(*self));
        assignments.value_at(*self, index)
    }

    fn marginal(&self, assignments: &Assignments, value: i32) -> Belief {
        assignments.marginal(*self, value)
    }

    fn set_marginal(&self, assignments: &mut Assignments, value: i32, belief: Belief) {
        assignments.set_marginal(*self, value, belief)
    }

    fn reset_marginals(&self, assignments: &mut Assignments) {
        assignments.reset_marginals(*self)
    }

    fn normalize_marginals(&self, assignments: &mut Assignments) {
        assignments.normalize_marginals(*self)
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        watchers.watch_all(*self, events);
    }

    fn describe(&self, names: &VariableNames) -> String {
        names
            .get_int_name(*self)
            .map_or_else(|| self.to_string(), |name| name.to_owned())
    }
}

impl TransformableVariable<AffineView<DomainId>> for DomainId {
    fn scaled(&self, scale: i32) -> AffineView<DomainId> {
        AffineView::new(*self, scale, 0)
    }

    fn offset(&self, offset: i32) -> AffineView<DomainId> {
        AffineView::new(*self, 1, offset)
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId { id: index as u32 }
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefRepresentation;

    #[test]
    fn sending_undoes_receiving_in_both_representations() {
        for representation in [BeliefRepresentation::Linear, BeliefRepresentation::Log] {
            let mut assignments = Assignments::new(representation);
            let x = assignments.grow(0, 1);
            let before = x.marginal(&assignments, 0);
            let message = representation.from_probability(0.4);

            x.receive_message(&mut assignments, 0, message);
            let combined = x.marginal(&assignments, 0);
            assert!(
                (representation.to_probability(combined) - 0.2).abs() < 1e-12,
                "{representation:?}"
            );

            let sent = x.send_message(&assignments, 0, message);
            assert!(
                (representation.to_probability(sent) - representation.to_probability(before)).abs()
                    < 1e-12,
                "{representation:?}"
            );
            assert!(
                (representation.to_probability(x.marginal(&assignments, 1)) - 0.5).abs() < 1e-12
            );
        }
    }

    #[test]
    fn a_zero_message_sends_the_belief_unchanged() {
        let mut assignments = Assignments::new(BeliefRepresentation::Log);
        let x = assignments.grow(0, 2);
        let zero = BeliefRepresentation::Log.zero();

        assert_eq!(
            x.send_message(&assignments, 1, zero),
            x.marginal(&assignments, 1)
        );
    }
}
