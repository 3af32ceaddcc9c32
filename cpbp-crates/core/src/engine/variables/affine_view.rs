use std::rc::Rc;

use enumset::EnumSet;
use itertools::Either;

use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Random;
use crate::belief::Belief;
use crate::cpbp_assert_simple;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::VariableNames;
use crate::math::num_ext::NumExt;

/// Models the constraint `y = ax + b`, by expressing the domain of `y` as a transformation of the
/// domain of `x`.
///
/// The view holds no state of its own: every query, mutation and belief operation is forwarded to
/// the inner variable at the inverted value. Belief values are transform-invariant, only the value
/// coordinate is mapped.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct AffineView<Inner> {
    inner: Inner,
    scale: i32,
    offset: i32,
    name: Option<Rc<str>>,
}

impl<Inner> AffineView<Inner> {
    pub fn new(inner: Inner, scale: i32, offset: i32) -> Self {
        assert_ne!(scale, 0, "Multiplication by zero is not invertable");
        AffineView {
            inner,
            scale,
            offset,
            name: None,
        }
    }

    /// Overrides the derived name of this view.
    pub fn with_name(mut self, name: impl Into<Rc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether `value` is the image of some integer under this view.
    fn is_image(&self, value: i32) -> bool {
        (value - self.offset) % self.scale == 0
    }

    /// Apply the inverse transformation of this view on a value, to go from the value in the domain
    /// of `self` to a value in the domain of `self.inner`.
    fn invert(&self, value: i32, rounding: Rounding) -> i32 {
        let inverted_translation = value - self.offset;

        match rounding {
            Rounding::Up => <i32 as NumExt>::div_ceil(inverted_translation, self.scale),
            Rounding::Down => <i32 as NumExt>::div_floor(inverted_translation, self.scale),
        }
    }

    fn map(&self, value: i32) -> i32 {
        self.scale * value + self.offset
    }
}

impl<View> IntegerVariable for AffineView<View>
where
    View: IntegerVariable,
{
    type AffineView = Self;

    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.upper_bound(assignments))
        } else {
            self.map(self.inner.lower_bound(assignments))
        }
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.lower_bound(assignments))
        } else {
            self.map(self.inner.upper_bound(assignments))
        }
    }

    fn size(&self, assignments: &Assignments) -> usize {
        self.inner.size(assignments)
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        self.is_image(value)
            && self
                .inner
                .contains(assignments, self.invert(value, Rounding::Up))
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        let (scale, offset) = (self.scale, self.offset);
        let values = self
            .inner
            .iterate_domain(assignments)
            .map(move |value| scale * value + offset);

        if scale > 0 {
            Either::Left(values)
        } else {
            Either::Right(values.collect::<Vec<_>>().into_iter().rev())
        }
    }

    fn fill_array(&self, assignments: &Assignments, destination: &mut [i32]) -> usize {
        let count = self.inner.fill_array(assignments, destination);
        let written = &mut destination[..count];

        for value in written.iter_mut() {
            *value = self.map(*value);
        }
        // A decreasing transform turns the ascending inner order into a descending one.
        if self.scale < 0 {
            written.reverse();
        }

        count
    }

    fn remove(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if !self.is_image(value) {
            return Ok(());
        }
        self.inner
            .remove(assignments, self.invert(value, Rounding::Up))
    }

    fn assign(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if !self.is_image(value) {
            return Err(EmptyDomain);
        }
        self.inner
            .assign(assignments, self.invert(value, Rounding::Up))
    }

    fn remove_below(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if self.scale >= 0 {
            self.inner
                .remove_below(assignments, self.invert(value, Rounding::Up))
        } else {
            self.inner
                .remove_above(assignments, self.invert(value, Rounding::Down))
        }
    }

    fn remove_above(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain> {
        if self.scale >= 0 {
            self.inner
                .remove_above(assignments, self.invert(value, Rounding::Down))
        } else {
            self.inner
                .remove_below(assignments, self.invert(value, Rounding::Up))
        }
    }

    fn random_value(&self, assignments: &Assignments, rng: &mut dyn Random) -> i32 {
        self.map(self.inner.random_value(assignments, rng))
    }

    fn marginal(&self, assignments: &Assignments, value: i32) -> Belief {
        if !self.is_image(value) {
            return assignments.representation().zero();
        }
        self.inner
            .marginal(assignments, self.invert(value, Rounding::Up))
    }

    fn set_marginal(&self, assignments: &mut Assignments, value: i32, belief: Belief) {
        cpbp_assert_simple!(
            self.is_image(value),
            "{value} is not in the image of the view"
        );
        self.inner
            .set_marginal(assignments, self.invert(value, Rounding::Up), belief)
    }

    fn reset_marginals(&self, assignments: &mut Assignments) {
        self.inner.reset_marginals(assignments)
    }

    fn normalize_marginals(&self, assignments: &mut Assignments) {
        self.inner.normalize_marginals(assignments)
    }

    fn send_message(&self, assignments: &Assignments, value: i32, incoming: Belief) -> Belief {
        cpbp_assert_simple!(
            self.is_image(value),
            "{value} is not in the image of the view"
        );
        self.inner
            .send_message(assignments, self.invert(value, Rounding::Up), incoming)
    }

    fn receive_message(&self, assignments: &mut Assignments, value: i32, belief: Belief) {
        cpbp_assert_simple!(
            self.is_image(value),
            "{value} is not in the image of the view"
        );
        self.inner
            .receive_message(assignments, self.invert(value, Rounding::Up), belief)
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, mut events: EnumSet<DomainEvent>) {
        let bound = DomainEvent::LowerBound | DomainEvent::UpperBound;
        let intersection = events.intersection(bound);
        if intersection.len() == 1 && self.scale.is_negative() {
            events = events.symmetrical_difference(bound);
        }
        self.inner.watch_all(watchers, events);
    }

    fn describe(&self, names: &VariableNames) -> String {
        if let Some(name) = &self.name {
            return name.to_string();
        }

        let inner = self.inner.describe(names);
        match (self.scale, self.offset) {
            (-1, 0) => format!("{inner}'s view (opposite)"),
            (1, offset) => format!("{inner} + {offset}"),
            (scale, 0) => format!("{scale} * ({inner})"),
            (scale, offset) => format!("{scale} * ({inner}) + {offset}"),
        }
    }
}

impl<View> TransformableVariable<AffineView<View>> for AffineView<View>
where
    View: IntegerVariable,
{
    fn scaled(&self, scale: i32) -> AffineView<View> {
        AffineView::new(self.inner.clone(), self.scale * scale, self.offset * scale)
    }

    fn offset(&self, offset: i32) -> AffineView<View> {
        AffineView::new(self.inner.clone(), self.scale, self.offset + offset)
    }
}

impl<Var: std::fmt::Debug> std::fmt::Debug for AffineView<Var> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == -1 {
            write!(f, "-")?;
        } else if self.scale != 1 {
            write!(f, "{} * ", self.scale)?;
        }

        write!(f, "({:?})", self.inner)?;

        match self.offset.cmp(&0) {
            std::cmp::Ordering::Less => write!(f, " - {}", -self.offset)?,
            std::cmp::Ordering::Equal => {}
            std::cmp::Ordering::Greater => write!(f, " + {}", self.offset)?,
        }

        Ok(())
    }
}

enum Rounding {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::belief::BeliefRepresentation;
    use crate::engine::variables::DomainId;

    #[test]
    fn scaling_an_affine_view() {
        let view = AffineView::new(DomainId::new(0), 3, 4);
        assert_eq!(3, view.scale);
        assert_eq!(4, view.offset);
        let scaled_view = view.scaled(6);
        assert_eq!(18, scaled_view.scale);
        assert_eq!(24, scaled_view.offset);
    }

    #[test]
    fn test_negated_variable_has_bounds_rounded_correctly() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(-3, 4);

        let view = domain.scaled(-2);

        assert_eq!(view.lower_bound(&assignments), -8);
        assert_eq!(view.upper_bound(&assignments), 6);

        view.remove_above(&mut assignments, -1)
            .expect("non-empty domain");

        assert_eq!(domain.lower_bound(&assignments), 1);
        assert_eq!(view.upper_bound(&assignments), -2);
    }

    #[test]
    fn fill_array_through_negation_is_ascending() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow_sparse(vec![0, 2, 5]);
        let view = domain.negated();

        let mut destination = [0; 3];
        let count = view.fill_array(&assignments, &mut destination);

        assert_eq!(count, 3);
        assert_eq!(destination, [-5, -2, 0]);
        assert_eq!(
            view.iterate_domain(&assignments).collect::<Vec<_>>(),
            vec![-5, -2, 0]
        );
    }

    #[test]
    fn removals_are_symmetric_between_view_and_base() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 5);
        let view = domain.negated();

        view.remove(&mut assignments, -3).expect("non-empty");
        assert!(!domain.contains(&assignments, 3));

        domain.remove(&mut assignments, 1).expect("non-empty");
        assert!(!view.contains(&assignments, -1));

        view.remove_below(&mut assignments, -2)
            .expect("non-empty");
        assert_eq!(domain.upper_bound(&assignments), 2);
        assert_eq!(view.lower_bound(&assignments), -2);
    }

    #[test]
    fn values_outside_the_image_are_not_contained() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 3);
        let view = domain.scaled(2).offset(1);

        assert!(view.contains(&assignments, 5));
        assert!(!view.contains(&assignments, 4));
        view.remove(&mut assignments, 4).expect("no-op");
        assert_eq!(view.size(&assignments), 4);
        assert_eq!(view.assign(&mut assignments, 4), Err(EmptyDomain));
    }

    #[test]
    fn beliefs_are_conserved_under_negation() {
        for representation in [BeliefRepresentation::Linear, BeliefRepresentation::Log] {
            let mut assignments = Assignments::new(representation);
            let domain = assignments.grow(-1, 2);
            let view = domain.negated();

            let values = domain.iterate_domain(&assignments).collect::<Vec<_>>();
            for (index, value) in values.into_iter().enumerate() {
                let belief = representation.from_probability(0.1 * (index as f64 + 1.0));
                domain.set_marginal(&mut assignments, value, belief);
            }

            for value in view.iterate_domain(&assignments) {
                assert_eq!(
                    view.marginal(&assignments, value),
                    domain.marginal(&assignments, -value)
                );
            }

            assert_eq!(view.value_with_max_marginal(&assignments), -2);
            assert_eq!(view.value_with_min_marginal(&assignments), 1);
        }
    }

    #[test]
    fn messages_are_forwarded_at_the_negated_value() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 1);
        let view = domain.negated();

        view.receive_message(&mut assignments, -1, 0.5);

        assert!((domain.marginal(&assignments, 1) - 0.25).abs() < 1e-12);
        assert!((domain.marginal(&assignments, 0) - 0.5).abs() < 1e-12);
        assert!((view.send_message(&assignments, -1, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn watching_a_negated_view_swaps_the_bound_events() {
        use crate::containers::StorageKey;
        use crate::engine::notifications::WatchListDomainEvents;
        use crate::propagation::PropagatorId;

        let mut watch_list = WatchListDomainEvents::default();
        let domain = DomainId::new(0);
        let propagator = PropagatorId::create_from_index(0);

        let mut watchers = Watchers::new(propagator, &mut watch_list);
        domain
            .negated()
            .watch_all(&mut watchers, EnumSet::only(DomainEvent::LowerBound));

        assert!(watch_list
            .get_affected_propagators(DomainEvent::LowerBound, domain)
            .is_empty());
        assert_eq!(
            watch_list.get_affected_propagators(DomainEvent::UpperBound, domain),
            &[propagator]
        );
    }

    #[test]
    fn random_values_are_mapped_through_the_view() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 2);
        let view = domain.scaled(10);

        let mut rng = TestRandom {
            usizes: vec![1],
            ..Default::default()
        };
        assert_eq!(view.random_value(&assignments, &mut rng), 10);
    }

    #[test]
    fn derived_names_reference_the_base() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 2);
        let mut names = VariableNames::default();
        names.add_integer(domain, "x".to_owned());

        assert_eq!(domain.negated().describe(&names), "x's view (opposite)");
        assert_eq!(domain.scaled(2).describe(&names), "2 * (x)");
        assert_eq!(domain.negated().with_name("y").describe(&names), "y");
        assert_eq!(format!("{:?}", domain.negated()), "-(x0)");
    }
}
