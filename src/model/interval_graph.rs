use crate::containers::HashSet;
use crate::model::data::ProblemData;
use crate::model::data::RotationRule;
use crate::model::interval;

pub const NB_WEEKS_IN_YEAR: i32 = 52;

/// The intersection graph of the needs' cultivation periods.
///
/// Nodes are need indices. The plain graph connects needs whose cultivation
/// periods overlap in time; the rotation-extended variant additionally
/// connects needs whose periods overlap once extended by the return delay of
/// their species, so that rotation delays can be expressed as inequalities on
/// the extra edges.
#[derive(Debug)]
pub struct IntervalGraph {
    neighbors: Vec<HashSet<usize>>,
}

impl IntervalGraph {
    fn new(num_nodes: usize) -> Self {
        IntervalGraph {
            neighbors: vec![HashSet::default(); num_nodes],
        }
    }

    fn add_edge(&mut self, i: usize, j: usize) {
        let _ = self.neighbors[i].insert(j);
        let _ = self.neighbors[j].insert(i);
    }

    pub fn num_nodes(&self) -> usize {
        self.neighbors.len()
    }

    pub fn contains_edge(&self, i: usize, j: usize) -> bool {
        self.neighbors[i].contains(&j)
    }

    pub fn neighbors(&self, i: usize) -> &HashSet<usize> {
        &self.neighbors[i]
    }

    /// The graph as sorted adjacency lists, for the chordal algorithms.
    pub fn adjacency_lists(&self) -> Vec<Vec<usize>> {
        self.neighbors
            .iter()
            .map(|neighbors| {
                let mut adjacent: Vec<usize> = neighbors.iter().copied().collect();
                adjacent.sort_unstable();
                adjacent
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for i in 0..self.neighbors.len() {
            for &j in &self.neighbors[i] {
                if i < j {
                    edges.push((i, j));
                }
            }
        }
        edges.sort_unstable();
        edges
    }
}

/// Build the plain and rotation-extended interval graphs of the instance.
///
/// For two needs whose periods are disjoint, the rotation rule decides
/// whether their intervals are re-examined with the cultivation end pushed to
/// `begin + return_delay_years * 52`: under [`RotationRule::SameFamily`] when
/// the needs share a botanical family, under [`RotationRule::DelayMatrix`]
/// when the ordered species entry is strictly positive. Every plain edge is
/// also a rotation edge.
pub fn build_interval_graphs(data: &ProblemData) -> (IntervalGraph, IntervalGraph) {
    let n = data.needs.len();
    let mut plain = IntervalGraph::new(n);
    let mut with_rotations = IntervalGraph::new(n);

    for i in 0..n {
        for j in (i + 1)..n {
            let need_i = &data.needs[i];
            let need_j = &data.needs[j];

            if interval::intersect(need_i.begin, need_i.end, need_j.begin, need_j.end) {
                plain.add_edge(i, j);
                with_rotations.add_edge(i, j);
                continue;
            }

            let (extend_i, extend_j) = match &data.rotation {
                RotationRule::SameFamily => {
                    let same_family = need_i.family == need_j.family;
                    (same_family, same_family)
                }
                RotationRule::DelayMatrix(delays) => (
                    delays[need_i.species.0 as usize][need_j.species.0 as usize] > 0,
                    delays[need_j.species.0 as usize][need_i.species.0 as usize] > 0,
                ),
            };
            if !extend_i && !extend_j {
                continue;
            }

            let end_i = extended_end(need_i.begin, need_i.end, extend_i, need_i.return_delay_years);
            let end_j = extended_end(need_j.begin, need_j.end, extend_j, need_j.return_delay_years);
            if interval::intersect(need_i.begin, end_i, need_j.begin, end_j) {
                with_rotations.add_edge(i, j);
            }
        }
    }
    (plain, with_rotations)
}

/// The cultivation end pushed out by the return delay. The original end wins
/// when the delay is shorter than the cultivation period itself, so the
/// rotation graph always contains the plain graph.
fn extended_end(begin: i32, end: i32, extend: bool, return_delay_years: i32) -> i32 {
    if !extend {
        return end;
    }
    end.max(begin + return_delay_years * NB_WEEKS_IN_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data::tests::data_with_needs;
    use crate::model::data::tests::NeedSpec;

    #[test]
    fn overlapping_needs_are_connected_in_both_graphs() {
        let data = data_with_needs(&[
            NeedSpec::new(0, 1, 5),
            NeedSpec::new(0, 3, 8),
            NeedSpec::new(0, 10, 14),
        ]);

        let (plain, with_rotations) = build_interval_graphs(&data);

        assert!(plain.contains_edge(0, 1));
        assert!(!plain.contains_edge(0, 2));
        assert!(!plain.contains_edge(1, 2));
        assert!(with_rotations.contains_edge(0, 1));
    }

    #[test]
    fn a_return_delay_creates_a_rotation_only_edge() {
        // Same family, disjoint periods, but the one-year return delay of the
        // first need stretches over the second.
        let data = data_with_needs(&[
            NeedSpec::new(0, 1, 5).with_return_delay(1),
            NeedSpec::new(0, 20, 24),
        ]);

        let (plain, with_rotations) = build_interval_graphs(&data);

        assert!(!plain.contains_edge(0, 1));
        assert!(with_rotations.contains_edge(0, 1));
    }

    #[test]
    fn different_families_do_not_get_rotation_edges() {
        let data = data_with_needs(&[
            NeedSpec::new(0, 1, 5).with_return_delay(1),
            NeedSpec::new(1, 20, 24).with_family(1),
        ]);

        let (plain, with_rotations) = build_interval_graphs(&data);

        assert!(!plain.contains_edge(0, 1));
        assert!(!with_rotations.contains_edge(0, 1));
    }

    #[test]
    fn plain_edges_are_a_subset_of_rotation_edges() {
        let data = data_with_needs(&[
            NeedSpec::new(0, 1, 5).with_return_delay(1),
            NeedSpec::new(0, 3, 8),
            NeedSpec::new(0, 30, 34),
            NeedSpec::new(1, 10, 14).with_family(1),
        ]);

        let (plain, with_rotations) = build_interval_graphs(&data);

        for (i, j) in plain.edges() {
            assert!(with_rotations.contains_edge(i, j));
        }
    }
}
