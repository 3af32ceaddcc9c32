use crate::basic_types::PropagationStatus;
use crate::math::convolve;
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

/// The [`PropagatorConstructor`] for the [`LinearSumPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct LinearSumPropagatorArgs<Var, TotalVar> {
    pub(crate) x: Box<[Var]>,
    pub(crate) total: TotalVar,
}

impl<Var, TotalVar> PropagatorConstructor for LinearSumPropagatorArgs<Var, TotalVar>
where
    Var: IntegerVariable + 'static,
    TotalVar: IntegerVariable + 'static,
{
    type PropagatorImpl = LinearSumPropagator<Var, TotalVar>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let LinearSumPropagatorArgs { x, total } = self;

        for x_i in x.iter() {
            context.propagate_on_bound_change(x_i);
        }
        context.propagate_on_bound_change(&total);

        let mut buffer = MessageBuffer::new(&context, &x);
        let _ = buffer.add_slot(&context, &total);

        LinearSumPropagator { x, total, buffer }
    }
}

/// Propagator for the constraint `\sum x_i = total`.
///
/// Filtering enforces bounds consistency. The messages are exact: they are computed from the
/// distributions of the partial sums.
#[derive(Debug)]
pub(crate) struct LinearSumPropagator<Var, TotalVar> {
    x: Box<[Var]>,
    total: TotalVar,
    buffer: MessageBuffer,
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl<Var, TotalVar> Propagator for LinearSumPropagator<Var, TotalVar>
where
    Var: IntegerVariable + 'static,
    TotalVar: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LinearSum"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatus {
        let lower_bound_sum = self
            .x
            .iter()
            .map(|x_i| context.lower_bound(x_i) as i64)
            .sum::<i64>();
        let upper_bound_sum = self
            .x
            .iter()
            .map(|x_i| context.upper_bound(x_i) as i64)
            .sum::<i64>();

        context.remove_below(&self.total, clamp_to_i32(lower_bound_sum))?;
        context.remove_above(&self.total, clamp_to_i32(upper_bound_sum))?;

        let total_lower_bound = context.lower_bound(&self.total) as i64;
        let total_upper_bound = context.upper_bound(&self.total) as i64;

        for x_i in self.x.iter() {
            let lower_bound = context.lower_bound(x_i) as i64;
            let upper_bound = context.upper_bound(x_i) as i64;

            let others_upper_bound = upper_bound_sum - upper_bound;
            let others_lower_bound = lower_bound_sum - lower_bound;

            context.remove_below(x_i, clamp_to_i32(total_lower_bound - others_upper_bound))?;
            context.remove_above(x_i, clamp_to_i32(total_upper_bound - others_lower_bound))?;
        }

        Ok(())
    }

    fn receive_messages(&mut self, mut context: BeliefContext) {
        for (slot, x_i) in self.x.iter().enumerate() {
            context.receive(&mut self.buffer, slot, x_i);
        }
        context.receive(&mut self.buffer, self.x.len(), &self.total);
    }

    fn send_messages(&mut self, mut context: BeliefContext) {
        let n = self.x.len();

        // forward[k]: the distribution of the sum of the first `k` variables, as (offset, values).
        let mut forward = vec![(0, vec![1.0])];
        for slot in 0..n {
            let (offset, previous) = &forward[slot];
            let (offset, mut next) = convolve(
                (*offset, previous.as_slice()),
                (self.buffer.offset(slot), self.buffer.local(slot)),
            );
            normalize(&mut next);
            forward.push((offset, next));
        }

        // backward[k][i]: the support of `total` given that the first `k` variables sum to
        // `forward[k].0 + i`.
        let mut backward = vec![Vec::new(); n + 1];
        let (sum_offset, sums) = &forward[n];
        backward[n] = (0..sums.len())
            .map(|i| self.buffer.local_probability(n, sum_offset + i as i32))
            .collect();
        for slot in (0..n).rev() {
            let local = self.buffer.local(slot);
            let mut current = (0..forward[slot].1.len())
                .map(|i| {
                    local
                        .iter()
                        .enumerate()
                        .map(|(j, probability)| probability * backward[slot + 1][i + j])
                        .sum::<f64>()
                })
                .collect::<Vec<_>>();
            normalize(&mut current);
            backward[slot] = current;
        }

        for (slot, x_i) in self.x.iter().enumerate() {
            let offset = self.buffer.offset(slot);
            let partial = &forward[slot].1;
            let support = &backward[slot + 1];
            context.send(&mut self.buffer, slot, x_i, |value| {
                let j = (value - offset) as usize;
                partial
                    .iter()
                    .enumerate()
                    .map(|(i, probability)| probability * support[i + j])
                    .sum()
            });
        }

        let (sum_offset, sums) = &forward[n];
        context.send(&mut self.buffer, n, &self.total, |value| {
            usize::try_from(value - sum_offset)
                .ok()
                .and_then(|i| sums.get(i))
                .copied()
                .unwrap_or(0.0)
        });
    }
}
