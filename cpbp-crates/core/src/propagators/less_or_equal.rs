use crate::basic_types::PropagationStatus;
use crate::propagation::BeliefContext;
use crate::propagation::MessageBuffer;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::variables::IntegerVariable;

const X: usize = 0;
const Y: usize = 1;

/// The [`PropagatorConstructor`] for the [`LessOrEqualPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct LessOrEqualPropagatorArgs<VX, VY> {
    pub(crate) x: VX,
    pub(crate) y: VY,
}

impl<VX, VY> PropagatorConstructor for LessOrEqualPropagatorArgs<VX, VY>
where
    VX: IntegerVariable + 'static,
    VY: IntegerVariable + 'static,
{
    type PropagatorImpl = LessOrEqualPropagator<VX, VY>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let LessOrEqualPropagatorArgs { x, y } = self;

        context.propagate_on_bound_change(&x);
        context.propagate_on_bound_change(&y);

        let mut buffer = MessageBuffer::default();
        let _ = buffer.add_slot(&context, &x);
        let _ = buffer.add_slot(&context, &y);

        LessOrEqualPropagator { x, y, buffer }
    }
}

/// Bounds-consistent propagator for `x <= y`.
///
/// The message to a value `v` of `x` is the local probability that `y >= v`, and symmetrically for
/// `y`.
#[derive(Debug)]
pub(crate) struct LessOrEqualPropagator<VX, VY> {
    x: VX,
    y: VY,
    buffer: MessageBuffer,
}

impl<VX, VY> Propagator for LessOrEqualPropagator<VX, VY>
where
    VX: IntegerVariable + 'static,
    VY: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LessOrEqual"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatus {
        let upper_bound = context.upper_bound(&self.y);
        context.remove_above(&self.x, upper_bound)?;

        let lower_bound = context.lower_bound(&self.x);
        context.remove_below(&self.y, lower_bound)?;

        Ok(())
    }

    fn receive_messages(&mut self, mut context: BeliefContext) {
        context.receive(&mut self.buffer, X, &self.x);
        context.receive(&mut self.buffer, Y, &self.y);
    }

    fn send_messages(&mut self, mut context: BeliefContext) {
        // at_least_y[i]: local probability that `y >= offset(Y) + i`.
        let y_offset = self.buffer.offset(Y);
        let mut at_least_y = self.buffer.local(Y).to_vec();
        for i in (0..at_least_y.len().saturating_sub(1)).rev() {
            at_least_y[i] += at_least_y[i + 1];
        }

        // at_most_x[i]: local probability that `x <= offset(X) + i`.
        let x_offset = self.buffer.offset(X);
        let mut at_most_x = self.buffer.local(X).to_vec();
        for i in 1..at_most_x.len() {
            at_most_x[i] += at_most_x[i - 1];
        }

        context.send(&mut self.buffer, X, &self.x, |value| {
            if value < y_offset {
                at_least_y.first().copied().unwrap_or(0.0)
            } else {
                at_least_y
                    .get((value - y_offset) as usize)
                    .copied()
                    .unwrap_or(0.0)
            }
        });

        context.send(&mut self.buffer, Y, &self.y, |value| {
            if value < x_offset {
                0.0
            } else {
                let index = ((value - x_offset) as usize).min(at_most_x.len() - 1);
                at_most_x[index]
            }
        });
    }
}
