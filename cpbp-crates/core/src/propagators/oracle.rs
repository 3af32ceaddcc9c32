use crate::basic_types::PropagationStatus;
use crate::containers::HashMap;
use crate::propagation::BeliefContext;
use crate::propagation::MessageBuffer;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::variables::IntegerVariable;

/// The [`PropagatorConstructor`] for the [`OraclePropagator`].
#[derive(Clone, Debug)]
pub(crate) struct OraclePropagatorArgs<Var> {
    pub(crate) x: Var,
    pub(crate) values: Box<[i32]>,
    pub(crate) probabilities: Box<[f64]>,
}

impl<Var> PropagatorConstructor for OraclePropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = OraclePropagator<Var>;

    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let OraclePropagatorArgs {
            x,
            values,
            probabilities,
        } = self;

        let mut buffer = MessageBuffer::default();
        let _ = buffer.add_slot(&context, &x);

        OraclePropagator {
            x,
            probabilities: values
                .iter()
                .copied()
                .zip(probabilities.iter().copied())
                .collect(),
            buffer,
        }
    }
}

/// Injects beliefs from an external source (e.g. a learned model) into a variable.
///
/// The oracle does not remove any values; every value of `x` receives the probability it was given,
/// values without a probability receive zero.
#[derive(Debug)]
pub(crate) struct OraclePropagator<Var> {
    x: Var,
    probabilities: HashMap<i32, f64>,
    buffer: MessageBuffer,
}

impl<Var: IntegerVariable + 'static> Propagator for OraclePropagator<Var> {
    fn name(&self) -> &str {
        "Oracle"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, _context: PropagationContext) -> PropagationStatus {
        Ok(())
    }

    fn send_messages(&mut self, mut context: BeliefContext) {
        let probabilities = &self.probabilities;
        context.send(&mut self.buffer, 0, &self.x, |value| {
            probabilities.get(&value).copied().unwrap_or(0.0)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefRepresentation;
    use crate::engine::test_solver::TestSolver;
    use crate::variables::TransformableVariable;

    #[test]
    fn oracle_does_not_filter() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 2);

        let _ = solver
            .new_propagator(OraclePropagatorArgs {
                x,
                values: [0].into(),
                probabilities: [1.0].into(),
            })
            .expect("no empty domains");

        solver.assert_bounds(x, 0, 2);
    }

    #[test]
    fn beliefs_follow_the_oracle() {
        for representation in [BeliefRepresentation::Linear, BeliefRepresentation::Log] {
            let mut solver = TestSolver::with_representation(representation);
            let x = solver.new_variable(0, 2);

            let _ = solver
                .new_propagator(OraclePropagatorArgs {
                    x,
                    values: [0, 1, 2].into(),
                    probabilities: [0.2, 0.6, 0.2].into(),
                })
                .expect("no empty domains");
            let _ = solver.belief_propagation(3).expect("no empty domains");

            solver.assert_probabilities(x, &[(0, 0.2), (1, 0.6), (2, 0.2)]);
        }
    }

    #[test]
    fn unlisted_values_get_zero_belief() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 3);

        let _ = solver
            .new_propagator(OraclePropagatorArgs {
                x,
                values: [1, 2].into(),
                probabilities: [1.0, 3.0].into(),
            })
            .expect("no empty domains");
        let _ = solver.belief_propagation(1).expect("no empty domains");

        solver.assert_probabilities(x, &[(0, 0.0), (1, 0.25), (2, 0.75), (3, 0.0)]);
    }

    #[test]
    fn oracle_on_a_view_speaks_in_view_coordinates() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);

        let _ = solver
            .new_propagator(OraclePropagatorArgs {
                x: x.negated(),
                values: [-1, 0].into(),
                probabilities: [0.9, 0.1].into(),
            })
            .expect("no empty domains");
        let _ = solver.belief_propagation(1).expect("no empty domains");

        solver.assert_probabilities(x, &[(0, 0.1), (1, 0.9)]);
    }

    #[test]
    fn zero_weight_oracle_leaves_uniform_beliefs() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 2);

        let _ = solver
            .new_weighted_propagator(
                OraclePropagatorArgs {
                    x,
                    values: [0, 1, 2].into(),
                    probabilities: [0.98, 0.01, 0.01].into(),
                },
                0.0,
            )
            .expect("no empty domains");
        let _ = solver.belief_propagation(5).expect("no empty domains");

        let third = 1.0 / 3.0;
        solver.assert_probabilities(x, &[(0, third), (1, third), (2, third)]);
    }
}
