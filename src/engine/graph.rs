use crate::basic_types::Trail;
use crate::containers::HashSet;
use crate::engine::propagation::PropagatorId;

/// A trailed undirected graph domain over a fixed node set.
///
/// The candidate edge set only shrinks and the mandatory edge set only grows
/// as search proceeds; both moves are undone on backtracking. An edge that is
/// mandatory can no longer be removed, and an edge that was removed can no
/// longer be enforced; either attempt is a contradiction reported to the
/// caller.
#[derive(Debug)]
pub struct GraphVar {
    num_nodes: usize,
    possible: Vec<HashSet<usize>>,
    mandatory: Vec<HashSet<usize>>,
    num_possible_edges: usize,
    num_mandatory_edges: usize,
    trail: Trail<GraphChange>,
    /// Edges enforced since the observing propagator last drained them.
    enforced_delta: Vec<(usize, usize)>,
    pub(crate) watchers: Vec<PropagatorId>,
    /// Set on any edge-set change, cleared when the watchers are notified.
    pub(crate) changed: bool,
}

#[derive(Clone, Copy, Debug)]
enum GraphChange {
    RemovedPossible(usize, usize),
    AddedMandatory(usize, usize),
}

/// The contradiction raised by an edge operation that conflicts with the
/// current edge sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeConflict;

impl GraphVar {
    pub fn new(num_nodes: usize) -> Self {
        GraphVar {
            num_nodes,
            possible: vec![HashSet::default(); num_nodes],
            mandatory: vec![HashSet::default(); num_nodes],
            num_possible_edges: 0,
            num_mandatory_edges: 0,
            trail: Trail::default(),
            enforced_delta: Vec::new(),
            watchers: Vec::new(),
            changed: false,
        }
    }

    /// Seed a candidate edge. Only valid before search starts.
    pub fn add_possible_edge(&mut self, a: usize, b: usize) {
        debug_assert!(self.trail.level() == 0 && self.trail.is_empty());
        debug_assert!(a < self.num_nodes && b < self.num_nodes && a != b);

        if self.possible[a].insert(b) {
            let _ = self.possible[b].insert(a);
            self.num_possible_edges += 1;
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn contains_possible(&self, a: usize, b: usize) -> bool {
        self.possible[a].contains(&b)
    }

    pub fn contains_mandatory(&self, a: usize, b: usize) -> bool {
        self.mandatory[a].contains(&b)
    }

    pub fn num_possible_edges(&self) -> usize {
        self.num_possible_edges
    }

    pub fn num_mandatory_edges(&self) -> usize {
        self.num_mandatory_edges
    }

    /// Remove a candidate edge. Returns whether the edge sets changed.
    pub(crate) fn remove_edge(&mut self, a: usize, b: usize) -> Result<bool, EdgeConflict> {
        if self.mandatory[a].contains(&b) {
            return Err(EdgeConflict);
        }
        if !self.possible[a].remove(&b) {
            return Ok(false);
        }
        let _ = self.possible[b].remove(&a);
        self.num_possible_edges -= 1;
        self.trail.push(GraphChange::RemovedPossible(a, b));
        self.changed = true;
        Ok(true)
    }

    /// Promote a candidate edge to mandatory. Returns whether the edge sets
    /// changed.
    pub(crate) fn enforce_edge(&mut self, a: usize, b: usize) -> Result<bool, EdgeConflict> {
        if self.mandatory[a].contains(&b) {
            return Ok(false);
        }
        if !self.possible[a].contains(&b) {
            return Err(EdgeConflict);
        }
        let _ = self.mandatory[a].insert(b);
        let _ = self.mandatory[b].insert(a);
        self.num_mandatory_edges += 1;
        self.trail.push(GraphChange::AddedMandatory(a, b));
        self.enforced_delta.push((a, b));
        self.changed = true;
        Ok(true)
    }

    pub(crate) fn drain_enforced_edges(&mut self) -> Vec<(usize, usize)> {
        std::mem::take(&mut self.enforced_delta)
    }

    pub(crate) fn new_level(&mut self) {
        self.trail.new_level();
    }

    pub(crate) fn synchronise(&mut self, target_level: usize) {
        if target_level >= self.trail.level() {
            return;
        }
        let undone: Vec<GraphChange> = self.trail.synchronise(target_level).collect();
        for change in undone {
            match change {
                GraphChange::RemovedPossible(a, b) => {
                    let _ = self.possible[a].insert(b);
                    let _ = self.possible[b].insert(a);
                    self.num_possible_edges += 1;
                }
                GraphChange::AddedMandatory(a, b) => {
                    let _ = self.mandatory[a].remove(&b);
                    let _ = self.mandatory[b].remove(&a);
                    self.num_mandatory_edges -= 1;
                }
            }
        }
        self.enforced_delta.clear();
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GraphVar {
        let mut graph = GraphVar::new(3);
        graph.add_possible_edge(0, 1);
        graph.add_possible_edge(1, 2);
        graph.add_possible_edge(0, 2);
        graph
    }

    #[test]
    fn enforcing_a_candidate_edge_grows_the_mandatory_set() {
        let mut graph = triangle();

        assert!(graph.enforce_edge(0, 1).unwrap());

        assert!(graph.contains_mandatory(0, 1));
        assert!(graph.contains_mandatory(1, 0));
        assert_eq!(1, graph.num_mandatory_edges());
        assert_eq!(3, graph.num_possible_edges());
    }

    #[test]
    fn removing_a_mandatory_edge_is_a_conflict() {
        let mut graph = triangle();

        let _ = graph.enforce_edge(0, 1).unwrap();

        assert_eq!(Err(EdgeConflict), graph.remove_edge(0, 1));
    }

    #[test]
    fn enforcing_a_removed_edge_is_a_conflict() {
        let mut graph = triangle();

        let _ = graph.remove_edge(1, 2).unwrap();

        assert_eq!(Err(EdgeConflict), graph.enforce_edge(2, 1));
    }

    #[test]
    fn backtracking_restores_both_edge_sets() {
        let mut graph = triangle();

        graph.new_level();
        let _ = graph.remove_edge(0, 2).unwrap();
        let _ = graph.enforce_edge(0, 1).unwrap();

        graph.synchronise(0);

        assert!(graph.contains_possible(0, 2));
        assert!(!graph.contains_mandatory(0, 1));
        assert_eq!(3, graph.num_possible_edges());
        assert_eq!(0, graph.num_mandatory_edges());
    }
}
