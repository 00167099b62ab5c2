use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::containers::HashSet;
use crate::engine::propagation::PropagatorId;

/// Propagators scheduled to run, grouped by priority. Lower priority values
/// run first; within a priority level the order is first-in first-out.
#[derive(Debug)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<PropagatorId>>,
    present_priorities: BinaryHeap<Reverse<u32>>,
    present_propagators: HashSet<PropagatorId>,
}

impl PropagatorQueue {
    pub(crate) fn new(num_priority_levels: u32) -> Self {
        PropagatorQueue {
            queues: vec![VecDeque::new(); num_priority_levels as usize],
            present_priorities: BinaryHeap::new(),
            present_propagators: HashSet::default(),
        }
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: u32) {
        debug_assert!((priority as usize) < self.queues.len());

        if !self.present_propagators.insert(propagator_id) {
            return;
        }

        if self.queues[priority as usize].is_empty() {
            self.present_priorities.push(Reverse(priority));
        }
        self.queues[priority as usize].push_back(propagator_id);
    }

    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let &Reverse(priority) = self.present_priorities.peek()?;

        let next_propagator_id = self.queues[priority as usize]
            .pop_front()
            .and_then(|id| self.present_propagators.take(&id));

        if self.queues[priority as usize].is_empty() {
            let _ = self.present_priorities.pop();
        }

        next_propagator_id
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.present_priorities.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        for queue in self.queues.iter_mut() {
            queue.clear();
        }
        self.present_priorities.clear();
        self.present_propagators.clear();
    }
}
