//! Chordal graph machinery: perfect elimination orderings via maximum
//! cardinality search, the zero fill-in chordality test, and maximal-clique /
//! minimal-separator enumeration (Tarjan & Yannakakis 1984, Berry &
//! Pogorelcnik 2011).
//!
//! Graphs are given as adjacency lists indexed by node; all functions assume
//! the lists are symmetric.

/// The maximal cliques and minimal separators of a chordal graph.
#[derive(Debug)]
pub struct ChordalDecomposition {
    pub maximal_cliques: Vec<Vec<usize>>,
    pub minimal_separators: Vec<Vec<usize>>,
}

/// Compute a perfect elimination ordering with a maximum cardinality search.
///
/// Positions are filled backwards: the first vertex picked by the search ends
/// up last in the ordering. Ties on the cardinality weight go to the vertex
/// with the smallest index, which makes the ordering deterministic.
pub fn perfect_elimination_ordering(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut unordered = vec![true; n];
    let mut weight = vec![0_usize; n];
    let mut ordering = vec![0_usize; n];

    for position in (0..n).rev() {
        let v = max_cardinality_vertex(&unordered, &weight);
        for &u in &adjacency[v] {
            if unordered[u] {
                weight[u] += 1;
            }
        }
        unordered[v] = false;
        ordering[position] = v;
    }
    ordering
}

fn max_cardinality_vertex(unordered: &[bool], weight: &[usize]) -> usize {
    let mut best = usize::MAX;
    let mut best_weight = 0;
    for v in 0..unordered.len() {
        if unordered[v] && (best == usize::MAX || weight[v] > best_weight) {
            best = v;
            best_weight = weight[v];
        }
    }
    debug_assert!(best != usize::MAX, "no unordered vertex left");
    best
}

/// The zero fill-in chordality test.
pub fn is_chordal(adjacency: &[Vec<usize>]) -> bool {
    let peo = perfect_elimination_ordering(adjacency);
    let n = peo.len();
    let mut f = vec![0_usize; n];
    let mut index = vec![0_usize; n];
    let mut position = vec![0_usize; n];
    for (i, &v) in peo.iter().enumerate() {
        position[v] = i;
    }

    for i in 0..n {
        let w = peo[i];
        f[w] = w;
        index[w] = i;
        for &v in &adjacency[w] {
            if position[v] < i {
                index[v] = i;
                if f[v] == v {
                    f[v] = w;
                }
            }
        }
        for &v in &adjacency[w] {
            if position[v] < i && index[f[v]] < i {
                return false;
            }
        }
    }
    true
}

/// Enumerate the maximal cliques and minimal separators of a chordal graph
/// with the generators algorithm, interleaved with the maximum cardinality
/// search itself.
///
/// A clique is emitted whenever the search weight fails to increase: the
/// previously numbered vertex together with its already-numbered neighbors is
/// then a maximal clique, and the numbered neighbors of the current vertex
/// form a minimal separator. The vertex numbered first closes the last clique
/// after the loop.
pub fn decompose(adjacency: &[Vec<usize>]) -> ChordalDecomposition {
    let n = adjacency.len();
    let mut maximal_cliques = Vec::new();
    let mut minimal_separators = Vec::new();

    if n == 0 {
        return ChordalDecomposition {
            maximal_cliques,
            minimal_separators,
        };
    }

    let mut unnumbered = vec![true; n];
    let mut numbered = vec![false; n];
    let mut label = vec![0_usize; n];
    let mut peo = vec![0_usize; n];
    let mut lambda = 0;

    for i in (0..n).rev() {
        let x = max_cardinality_vertex(&unnumbered, &label);
        peo[i] = x;

        if i != n - 1 && label[x] <= lambda {
            let separator: Vec<usize> = adjacency[x]
                .iter()
                .copied()
                .filter(|&j| numbered[j])
                .collect();
            minimal_separators.push(separator);

            let generator = peo[i + 1];
            let mut clique = vec![generator];
            clique.extend(adjacency[generator].iter().copied().filter(|&j| numbered[j]));
            maximal_cliques.push(clique);
        }

        lambda = label[x];
        for &j in &adjacency[x] {
            if unnumbered[j] {
                label[j] += 1;
            }
        }
        numbered[x] = true;
        unnumbered[x] = false;
    }

    let mut clique = vec![peo[0]];
    clique.extend(adjacency[peo[0]].iter().copied());
    maximal_cliques.push(clique);

    ChordalDecomposition {
        maximal_cliques,
        minimal_separators,
    }
}

/// Quadratic re-derivation of the maximal cliques from the elimination
/// ordering, kept as a cross-check for [`decompose`] in tests.
pub fn maximal_cliques_slow(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let peo = perfect_elimination_ordering(adjacency);
    let mut cliques = Vec::new();

    for i in 0..peo.len() {
        let mut clique = vec![peo[i]];
        for &later in &peo[i + 1..] {
            if adjacency[peo[i]].contains(&later) {
                clique.push(later);
            }
        }
        if clique.len() >= 2 && is_maximal_clique(&clique, adjacency) {
            clique.sort_unstable();
            cliques.push(clique);
        }
    }
    cliques
}

/// Whether `clique` is a clique that no vertex outside it extends.
pub fn is_maximal_clique(clique: &[usize], adjacency: &[Vec<usize>]) -> bool {
    for &node in clique {
        for &outside in &adjacency[node] {
            if clique.contains(&outside) {
                continue;
            }
            let extends_all = clique
                .iter()
                .all(|&member| adjacency[member].contains(&outside));
            if extends_all {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut clique: Vec<usize>) -> Vec<usize> {
        clique.sort_unstable();
        clique
    }

    // 0-1-2 path plus a triangle 2-3-4.
    fn path_and_triangle() -> Vec<Vec<usize>> {
        vec![
            vec![1],
            vec![0, 2],
            vec![1, 3, 4],
            vec![2, 4],
            vec![2, 3],
        ]
    }

    #[test]
    fn a_path_with_a_triangle_is_chordal() {
        assert!(is_chordal(&path_and_triangle()));
    }

    #[test]
    fn a_four_cycle_is_not_chordal() {
        let cycle = vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![0, 2]];
        assert!(!is_chordal(&cycle));
    }

    #[test]
    fn the_elimination_ordering_is_a_permutation() {
        let peo = perfect_elimination_ordering(&path_and_triangle());
        let mut seen = peo.clone();
        seen.sort_unstable();
        assert_eq!(vec![0, 1, 2, 3, 4], seen);
    }

    #[test]
    fn every_emitted_clique_is_maximal() {
        let graph = path_and_triangle();
        let decomposition = decompose(&graph);

        for clique in &decomposition.maximal_cliques {
            assert!(is_maximal_clique(clique, &graph), "{clique:?} is not maximal");
        }
    }

    #[test]
    fn the_cliques_cover_every_edge() {
        let graph = path_and_triangle();
        let decomposition = decompose(&graph);

        for a in 0..graph.len() {
            for &b in &graph[a] {
                let covered = decomposition
                    .maximal_cliques
                    .iter()
                    .any(|clique| clique.contains(&a) && clique.contains(&b));
                assert!(covered, "edge ({a}, {b}) is not covered by any clique");
            }
        }
    }

    #[test]
    fn fast_and_slow_clique_enumeration_agree() {
        let graph = path_and_triangle();
        let mut fast: Vec<Vec<usize>> = decompose(&graph)
            .maximal_cliques
            .into_iter()
            .map(sorted)
            .filter(|c| c.len() >= 2)
            .collect();
        let mut slow: Vec<Vec<usize>> = maximal_cliques_slow(&graph).into_iter().map(sorted).collect();
        fast.sort();
        slow.sort();
        fast.dedup();
        slow.dedup();
        assert_eq!(slow, fast);
    }

    #[test]
    fn an_edgeless_graph_decomposes_into_singletons() {
        let graph = vec![vec![], vec![], vec![]];
        assert!(is_chordal(&graph));

        let decomposition = decompose(&graph);
        for clique in &decomposition.maximal_cliques {
            assert_eq!(1, clique.len());
        }
    }
}
