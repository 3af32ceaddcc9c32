use crate::basic_types::PropagationStatus;
use crate::containers::HashSet;
use crate::propagation::BeliefContext;
use crate::propagation::MessageBuffer;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::variables::IntegerVariable;

/// The [`PropagatorConstructor`] for the [`AllDifferentPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct AllDifferentPropagatorArgs<Var> {
    pub(crate) x: Box<[Var]>,
}

impl<Var> PropagatorConstructor for AllDifferentPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = AllDifferentPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        for x_i in self.x.iter() {
            context.propagate_on_domain_change(x_i);
        }

        let buffer = MessageBuffer::new(&context, &self.x);

        AllDifferentPropagator { x: self.x, buffer }
    }
}

/// Propagator for the constraint that all variables take pairwise distinct values.
///
/// The filtering removes the value of every fixed variable from the others and fails when fewer
/// values remain than there are variables. The message to value `v` of `x_i` is the probability,
/// under the local beliefs taken as independent, that no other variable takes `v`.
#[derive(Debug)]
pub(crate) struct AllDifferentPropagator<Var> {
    x: Box<[Var]>,
    buffer: MessageBuffer,
}

impl<Var: IntegerVariable + 'static> Propagator for AllDifferentPropagator<Var> {
    fn name(&self) -> &str {
        "AllDifferent"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatus {
        for (i, x_i) in self.x.iter().enumerate() {
            if !context.is_fixed(x_i) {
                continue;
            }

            let value = context.lower_bound(x_i);
            for (j, x_j) in self.x.iter().enumerate() {
                if i != j {
                    context.remove(x_j, value)?;
                }
            }
        }

        let values = self
            .x
            .iter()
            .flat_map(|x_i| context.iterate_domain(x_i))
            .collect::<HashSet<i32>>();
        if values.len() < self.x.len() {
            return Err(context.conflict());
        }

        Ok(())
    }

    fn receive_messages(&mut self, mut context: BeliefContext) {
        for (slot, x_i) in self.x.iter().enumerate() {
            context.receive(&mut self.buffer, slot, x_i);
        }
    }

    fn send_messages(&mut self, mut context: BeliefContext) {
        let n = self.x.len();

        for slot in 0..n {
            let buffer = &self.buffer;
            let outside = context
                .iterate_domain(&self.x[slot])
                .map(|value| {
                    (0..n)
                        .filter(|&other| other != slot)
                        .map(|other| 1.0 - buffer.local_probability(other, value))
                        .product::<f64>()
                })
                .collect::<Vec<_>>();

            let domain = context.iterate_domain(&self.x[slot]).collect::<Vec<_>>();
            context.send(&mut self.buffer, slot, &self.x[slot], |value| {
                domain
                    .binary_search(&value)
                    .map_or(0.0, |index| outside[index])
            });
        }
    }
}
