use std::ops::Index;
use std::ops::IndexMut;

use super::Propagator;
use super::PropagatorId;
use crate::containers::KeyedVec;

/// A central store for propagators and their weights.
#[derive(Default)]
pub(crate) struct PropagatorStore {
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
    weights: KeyedVec<PropagatorId, f64>,
}

impl std::fmt::Debug for PropagatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.propagators.iter().map(|propagator| propagator.name()))
            .finish()
    }
}

impl PropagatorStore {
    pub(crate) fn new_propagator(&mut self) -> PropagatorId {
        self.propagators.next_key()
    }

    pub(crate) fn alloc(&mut self, propagator: Box<dyn Propagator>, weight: f64) -> PropagatorId {
        let _ = self.weights.push(weight);
        self.propagators.push(propagator)
    }

    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = PropagatorId> {
        self.propagators.keys()
    }

    pub(crate) fn weight(&self, propagator: PropagatorId) -> f64 {
        self.weights[propagator]
    }

    pub(crate) fn set_weight(&mut self, propagator: PropagatorId, weight: f64) {
        self.weights[propagator] = weight;
    }

    pub(crate) fn get_propagator<P: Propagator>(&self, propagator: PropagatorId) -> Option<&P> {
        self.propagators
            .get(propagator)
            .and_then(|propagator| propagator.downcast_ref())
    }
}

impl Index<PropagatorId> for PropagatorStore {
    type Output = dyn Propagator;

    fn index(&self, index: PropagatorId) -> &Self::Output {
        self.propagators[index].as_ref()
    }
}

impl IndexMut<PropagatorId> for PropagatorStore {
    fn index_mut(&mut self, index: PropagatorId) -> &mut Self::Output {
        self.propagators[index].as_mut()
    }
}
