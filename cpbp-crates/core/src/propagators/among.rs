use crate::basic_types::PropagationStatus;
use crate::containers::HashSet;
use crate::math::normalize;
use crate::propagation::BeliefContext;
use crate::propagation::MessageBuffer;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::variables::IntegerVariable;

/// The [`PropagatorConstructor`] for the [`AmongPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct AmongPropagatorArgs<Var, CountVar> {
    pub(crate) x: Box<[Var]>,
    pub(crate) values: Box<[i32]>,
    pub(crate) count: CountVar,
}

impl<Var, CountVar> PropagatorConstructor for AmongPropagatorArgs<Var, CountVar>
where
    Var: IntegerVariable + 'static,
    CountVar: IntegerVariable + 'static,
{
    type PropagatorImpl = AmongPropagator<Var, CountVar>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let AmongPropagatorArgs { x, values, count } = self;

        for x_i in x.iter() {
            context.propagate_on_domain_change(x_i);
        }
        context.propagate_on_bound_change(&count);

        // Slots 0..n belong to `x`, slot n to `count`.
        let mut buffer = MessageBuffer::new(&context, &x);
        let _ = buffer.add_slot(&context, &count);

        AmongPropagator {
            x,
            values: values.iter().copied().collect(),
            count,
            buffer,
        }
    }
}

/// Propagator for the constraint `count = |{ i | x_i ∈ values }|`.
///
/// The filtering bounds `count` by the number of variables which are certainly, respectively
/// possibly, taking a value in `values`, and fixes the membership of the undecided variables once
/// `count` reaches one of these bounds. The messages are exact: they are computed from the
/// distribution of the number of members, obtained by dynamic programming over the variables.
#[derive(Debug)]
pub(crate) struct AmongPropagator<Var, CountVar> {
    x: Box<[Var]>,
    values: HashSet<i32>,
    count: CountVar,
    buffer: MessageBuffer,
}

/// How a variable relates to the value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Member,
    NonMember,
    Undecided,
}

impl<Var, CountVar> AmongPropagator<Var, CountVar>
where
    Var: IntegerVariable,
    CountVar: IntegerVariable,
{
    fn membership(&self, context: &impl ReadDomains, var: &Var) -> Membership {
        let mut any_member = false;
        let mut any_non_member = false;
        for value in context.iterate_domain(var) {
            if self.values.contains(&value) {
                any_member = true;
            } else {
                any_non_member = true;
            }
        }

        match (any_member, any_non_member) {
            (true, false) => Membership::Member,
            (false, true) => Membership::NonMember,
            _ => Membership::Undecided,
        }
    }

    /// The probability, according to the local beliefs, that `x[index]` takes a value in the set.
    fn member_probability(&self, index: usize) -> f64 {
        let offset = self.buffer.offset(index);
        self.buffer
            .local(index)
            .iter()
            .enumerate()
            .filter(|(i, _)| self.values.contains(&(offset + *i as i32)))
            .map(|(_, probability)| probability)
            .sum()
    }
}

impl<Var, CountVar> Propagator for AmongPropagator<Var, CountVar>
where
    Var: IntegerVariable + 'static,
    CountVar: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "Among"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatus {
        let memberships = self
            .x
            .iter()
            .map(|x_i| self.membership(&context, x_i))
            .collect::<Vec<_>>();

        let definite = memberships
            .iter()
            .filter(|membership| **membership == Membership::Member)
            .count() as i32;
        let possible = memberships
            .iter()
            .filter(|membership| **membership != Membership::NonMember)
            .count() as i32;

        context.remove_below(&self.count, definite)?;
        context.remove_above(&self.count, possible)?;

        let undecided = self
            .x
            .iter()
            .zip(&memberships)
            .filter(|(_, membership)| **membership == Membership::Undecided)
            .map(|(x_i, _)| x_i);

        if context.lower_bound(&self.count) == possible {
            for x_i in undecided {
                let outside = context
                    .iterate_domain(x_i)
                    .filter(|value| !self.values.contains(value))
                    .collect::<Vec<_>>();
                for value in outside {
                    context.remove(x_i, value)?;
                }
            }
        } else if context.upper_bound(&self.count) == definite {
            for x_i in undecided {
                let inside = context
                    .iterate_domain(x_i)
                    .filter(|value| self.values.contains(value))
                    .collect::<Vec<_>>();
                for value in inside {
                    context.remove(x_i, value)?;
                }
            }
        }

        Ok(())
    }

    fn receive_messages(&mut self, mut context: BeliefContext) {
        for (slot, x_i) in self.x.iter().enumerate() {
            context.receive(&mut self.buffer, slot, x_i);
        }
        context.receive(&mut self.buffer, self.x.len(), &self.count);
    }

    fn send_messages(&mut self, mut context: BeliefContext) {
        let n = self.x.len();
        let member = (0..n)
            .map(|index| self.member_probability(index))
            .collect::<Vec<_>>();

        // forward[i][c]: probability that exactly `c` of the first `i` variables are members.
        let mut forward = vec![vec![1.0]];
        for (i, &p) in member.iter().enumerate() {
            let previous = &forward[i];
            let mut next = vec![0.0; previous.len() + 1];
            for (c, &probability) in previous.iter().enumerate() {
                next[c] += probability * (1.0 - p);
                next[c + 1] += probability * p;
            }
            normalize(&mut next);
            forward.push(next);
        }

        // backward[i][c]: support of the count given that `c` of the first `i` variables are
        // members.
        let mut backward = vec![Vec::new(); n + 1];
        backward[n] = (0..=n)
            .map(|c| self.buffer.local_probability(n, c as i32))
            .collect();
        for i in (0..n).rev() {
            let p = member[i];
            let mut current = (0..=i)
                .map(|c| (1.0 - p) * backward[i + 1][c] + p * backward[i + 1][c + 1])
                .collect::<Vec<_>>();
            normalize(&mut current);
            backward[i] = current;
        }

        for (slot, x_i) in self.x.iter().enumerate() {
            let (mut with_member, mut without_member) = (0.0, 0.0);
            for (c, &probability) in forward[slot].iter().enumerate() {
                with_member += probability * backward[slot + 1][c + 1];
                without_member += probability * backward[slot + 1][c];
            }

            let values = &self.values;
            context.send(&mut self.buffer, slot, x_i, |value| {
                if values.contains(&value) {
                    with_member
                } else {
                    without_member
                }
            });
        }

        let distribution = &forward[n];
        context.send(&mut self.buffer, n, &self.count, |c| {
            usize::try_from(c)
                .ok()
                .and_then(|c| distribution.get(c))
                .copied()
                .unwrap_or(0.0)
        });
    }
}
