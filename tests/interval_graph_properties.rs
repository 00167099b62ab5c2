//! Structural properties of the interval graphs and their chordal
//! decomposition.

use agroplan::model::chordal;
use agroplan::model::data::FamilyId;
use agroplan::model::data::Need;
use agroplan::model::data::ProblemData;
use agroplan::model::data::RotationRule;
use agroplan::model::data::SpeciesId;
use agroplan::model::interval_graph::build_interval_graphs;

fn need(species: u32, begin: i32, end: i32, family: u32, return_delay: i32) -> Need {
    Need {
        species: SpeciesId(species),
        begin,
        end,
        family: FamilyId(family),
        return_delay_years: return_delay,
        forbidden_beds: Vec::new(),
        fixed_bed: None,
    }
}

fn instance(needs: Vec<Need>, rotation: RotationRule) -> ProblemData {
    let num_species = needs.iter().map(|n| n.species.0).max().unwrap_or(0) as usize + 1;
    ProblemData {
        species_names: (0..num_species).map(|s| format!("species{s}")).collect(),
        family_names: vec!["family0".to_owned(), "family1".to_owned()],
        interactions: vec![vec![0; num_species]; num_species],
        precedences: None,
        rotation,
        needs,
        groups: Vec::new(),
        num_beds: 10,
        adjacency: (1..=10)
            .map(|bed| {
                [bed - 1, bed + 1]
                    .into_iter()
                    .filter(|&b| (1..=10).contains(&b))
                    .collect()
            })
            .collect(),
    }
}

/// A deterministic batch of messy interval layouts.
fn interval_layouts() -> Vec<Vec<(i32, i32)>> {
    let mut layouts = Vec::new();
    for seed in 0..20 {
        let mut intervals = Vec::new();
        let mut state: i64 = seed * 2654435761 + 1;
        for _ in 0..8 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let begin = ((state >> 33) & 63) as i32;
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let length = ((state >> 33) & 15) as i32 + 1;
            intervals.push((begin, begin + length));
        }
        layouts.push(intervals);
    }
    layouts
}

#[test]
fn pure_interval_graphs_are_chordal() {
    for intervals in interval_layouts() {
        let needs = intervals
            .iter()
            .map(|&(begin, end)| need(0, begin, end, 0, 0))
            .collect();
        let data = instance(needs, RotationRule::SameFamily);

        let (plain, _) = build_interval_graphs(&data);

        assert!(chordal::is_chordal(&plain.adjacency_lists()));
    }
}

#[test]
fn maximal_cliques_cover_every_edge_and_are_maximal() {
    for intervals in interval_layouts() {
        let needs = intervals
            .iter()
            .map(|&(begin, end)| need(0, begin, end, 0, 0))
            .collect();
        let data = instance(needs, RotationRule::SameFamily);
        let (plain, _) = build_interval_graphs(&data);
        let adjacency = plain.adjacency_lists();

        let decomposition = chordal::decompose(&adjacency);

        for clique in &decomposition.maximal_cliques {
            assert!(chordal::is_maximal_clique(clique, &adjacency));
        }
        for (i, j) in plain.edges() {
            let covered = decomposition
                .maximal_cliques
                .iter()
                .any(|clique| clique.contains(&i) && clique.contains(&j));
            assert!(covered, "edge ({i}, {j}) is not in any maximal clique");
        }
    }
}

#[test]
fn fast_and_slow_clique_enumeration_agree() {
    for intervals in interval_layouts() {
        let needs = intervals
            .iter()
            .map(|&(begin, end)| need(0, begin, end, 0, 0))
            .collect();
        let data = instance(needs, RotationRule::SameFamily);
        let adjacency = build_interval_graphs(&data).0.adjacency_lists();

        let mut fast: Vec<Vec<usize>> = chordal::decompose(&adjacency)
            .maximal_cliques
            .into_iter()
            .filter(|clique| clique.len() >= 2)
            .map(|mut clique| {
                clique.sort_unstable();
                clique
            })
            .collect();
        fast.sort();
        fast.dedup();

        let mut slow = chordal::maximal_cliques_slow(&adjacency);
        slow.sort();

        assert_eq!(slow, fast);
    }
}

#[test]
fn the_elimination_ordering_is_deterministic() {
    let needs = vec![
        need(0, 1, 5, 0, 0),
        need(0, 3, 8, 0, 0),
        need(0, 4, 6, 0, 0),
        need(0, 10, 14, 0, 0),
        need(0, 12, 20, 0, 0),
    ];
    let data = instance(needs, RotationRule::SameFamily);
    let adjacency = build_interval_graphs(&data).0.adjacency_lists();

    let first = chordal::perfect_elimination_ordering(&adjacency);
    let second = chordal::perfect_elimination_ordering(&adjacency);

    assert_eq!(first, second);
}

#[test]
fn rotation_extension_preserves_the_plain_edges() {
    // Mixed families and delays; some pairs only connect through rotation.
    let needs = vec![
        need(0, 1, 5, 0, 1),
        need(1, 3, 8, 1, 0),
        need(0, 30, 34, 0, 1),
        need(1, 60, 64, 1, 0),
    ];
    let data = instance(needs, RotationRule::SameFamily);

    let (plain, with_rotations) = build_interval_graphs(&data);

    for (i, j) in plain.edges() {
        assert!(with_rotations.contains_edge(i, j));
    }
    // The one-year delay of need 0 reaches need 2 (same family).
    assert!(!plain.contains_edge(0, 2));
    assert!(with_rotations.contains_edge(0, 2));
    // Need 3 is of another family and out of reach.
    assert!(!with_rotations.contains_edge(0, 3));
}

#[test]
fn the_delay_matrix_rule_is_directional() {
    let needs = || vec![need(0, 1, 5, 0, 1), need(1, 30, 34, 1, 1)];

    // A delay of species 0 against species 1 stretches the earlier need over
    // the later one.
    let data = instance(needs(), RotationRule::DelayMatrix(vec![vec![0, 2], vec![0, 0]]));
    let (plain, with_rotations) = build_interval_graphs(&data);
    assert!(!plain.contains_edge(0, 1));
    assert!(with_rotations.contains_edge(0, 1));

    // The transposed entry only stretches the later need, which reaches
    // nothing.
    let data = instance(needs(), RotationRule::DelayMatrix(vec![vec![0, 0], vec![2, 0]]));
    let (_, with_rotations) = build_interval_graphs(&data);
    assert!(!with_rotations.contains_edge(0, 1));
}
