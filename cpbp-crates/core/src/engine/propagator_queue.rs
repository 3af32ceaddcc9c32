use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::cpbp_assert_moderate;
use crate::propagation::Priority;
use crate::propagation::PropagatorId;

/// The worklist of the fixpoint loop.
///
/// Propagators are popped by priority and in FIFO order within a priority; a propagator which is
/// already enqueued is not enqueued a second time.
#[derive(Debug)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<PropagatorId>>,
    is_enqueued: KeyedVec<PropagatorId, bool>,
    present_priorities: BinaryHeap<Reverse<u32>>,
    num_enqueued: usize,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PropagatorQueue {
    pub(crate) fn new(num_priority_levels: u32) -> PropagatorQueue {
        PropagatorQueue {
            queues: vec![VecDeque::new(); num_priority_levels as usize],
            is_enqueued: KeyedVec::default(),
            present_priorities: BinaryHeap::new(),
            num_enqueued: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        let priority = priority as u32;
        cpbp_assert_moderate!((priority as usize) < self.queues.len());

        if !self.is_propagator_enqueued(propagator_id) {
            if self.queues[priority as usize].is_empty() {
                self.present_priorities.push(Reverse(priority));
            }
            self.queues[priority as usize].push_back(propagator_id);
            self.is_enqueued.accommodate(propagator_id, false);
            self.is_enqueued[propagator_id] = true;
            self.num_enqueued += 1;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let top_priority = self.present_priorities.peek()?.0 as usize;
        cpbp_assert_moderate!(!self.queues[top_priority].is_empty());

        let next_propagator_id = self.queues[top_priority].pop_front()?;
        self.is_enqueued[next_propagator_id] = false;
        self.num_enqueued -= 1;

        if self.queues[top_priority].is_empty() {
            let _ = self.present_priorities.pop();
        }

        Some(next_propagator_id)
    }

    pub(crate) fn clear(&mut self) {
        while let Some(Reverse(priority)) = self.present_priorities.pop() {
            for propagator_id in self.queues[priority as usize].drain(..) {
                self.is_enqueued[propagator_id] = false;
            }
        }
        self.num_enqueued = 0;
    }

    fn is_propagator_enqueued(&self, propagator_id: PropagatorId) -> bool {
        propagator_id.index() < self.is_enqueued.len() && self.is_enqueued[propagator_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: usize) -> PropagatorId {
        PropagatorId::create_from_index(index)
    }

    #[test]
    fn test_ordering() {
        let mut queue = PropagatorQueue::default();

        queue.enqueue_propagator(id(0), Priority::Low);
        queue.enqueue_propagator(id(1), Priority::High);
        queue.enqueue_propagator(id(2), Priority::Low);

        assert_eq!(queue.pop(), Some(id(1)));
        assert_eq!(queue.pop(), Some(id(0)));
        assert_eq!(queue.pop(), Some(id(2)));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn enqueued_propagators_are_not_duplicated() {
        let mut queue = PropagatorQueue::default();

        queue.enqueue_propagator(id(3), Priority::VeryLow);
        queue.enqueue_propagator(id(3), Priority::VeryLow);

        assert_eq!(queue.pop(), Some(id(3)));
        assert_eq!(queue.pop(), None);

        queue.enqueue_propagator(id(3), Priority::VeryLow);
        assert_eq!(queue.pop(), Some(id(3)));
    }

    #[test]
    fn clearing_discards_everything() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(id(0), Priority::High);
        queue.enqueue_propagator(id(1), Priority::Medium);

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
        queue.enqueue_propagator(id(1), Priority::Medium);
        assert_eq!(queue.pop(), Some(id(1)));
    }
}
