//! Encoding of precedence rules over per-bed crop sequences.
//!
//! Beds carry a sequence of crops over time. Sorting all needs by descending
//! start week turns "crop B directly precedes crop A in some bed" into a
//! statement about a contiguous slice of that order, which is what the chain
//! propagators consume.

use crate::model::data::ProblemData;

/// The constraints derived from the harmful entries of the precedence matrix.
#[derive(Debug, Default)]
pub struct PrecedenceChains {
    /// Pairs of need indices that must not share a bed at all.
    pub not_equal_pairs: Vec<(usize, usize)>,
    /// Need index sequences, later-starting first, whose endpoints may only
    /// share a bed through an intermediate occupant.
    pub chains: Vec<Vec<usize>>,
}

/// Needs ordered by descending start week. Ties keep the need order, so the
/// encoding is deterministic.
fn needs_by_descending_begin(data: &ProblemData) -> Vec<usize> {
    let mut sorted: Vec<usize> = (0..data.num_needs()).collect();
    sorted.sort_by(|&i, &j| data.needs[j].begin.cmp(&data.needs[i].begin));
    sorted
}

/// Walk every later-starting need A against all earlier-starting needs B.
///
/// While every visited B is a harmful predecessor of A, no crop can sit
/// between them and the pair simply must not share a bed. The first harmless
/// B arms chain mode: from then on a harmful B may share a bed with A only if
/// one of the needs between them (in start order) takes that bed in between.
pub fn forbidden_precedence_chains(data: &ProblemData) -> PrecedenceChains {
    if data.precedences.is_none() {
        return PrecedenceChains::default();
    }
    let sorted = needs_by_descending_begin(data);
    let mut result = PrecedenceChains::default();

    for i in 0..sorted.len() {
        let species_a = data.needs[sorted[i]].species;
        let mut armed = false;
        for j in (i + 1)..sorted.len() {
            let species_b = data.needs[sorted[j]].species;
            let entry = data.precedence(species_a, species_b).unwrap_or(0);
            if entry >= 0 {
                armed = true;
            } else if !armed {
                result.not_equal_pairs.push((sorted[i], sorted[j]));
            } else {
                result.chains.push(sorted[i..=j].to_vec());
            }
        }
    }
    result
}

/// The sequences whose endpoints realize a beneficial precedence when they
/// share a bed without an interrupting occupant. One sequence per ordered
/// pair with a precedence entry of 1, spanning all needs between them.
pub fn beneficial_precedence_chains(data: &ProblemData) -> Vec<Vec<usize>> {
    if data.precedences.is_none() {
        return Vec::new();
    }
    let sorted = needs_by_descending_begin(data);
    let mut chains = Vec::new();

    for i in 0..sorted.len() {
        let species_a = data.needs[sorted[i]].species;
        for j in (i + 1)..sorted.len() {
            let species_b = data.needs[sorted[j]].species;
            if data.precedence(species_a, species_b) == Some(1) {
                chains.push(sorted[i..=j].to_vec());
            }
        }
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data::tests::data_with_needs;
    use crate::model::data::tests::NeedSpec;

    fn with_precedences(specs: &[NeedSpec], matrix: Vec<Vec<i32>>) -> ProblemData {
        let mut data = data_with_needs(specs);
        data.precedences = Some(matrix);
        data
    }

    #[test]
    fn harmful_pairs_before_arming_become_not_equal() {
        // Species 1 must never directly precede species 0.
        let data = with_precedences(
            &[
                NeedSpec::new(1, 1, 5),
                NeedSpec::new(1, 10, 14),
                NeedSpec::new(0, 20, 24),
            ],
            vec![vec![-1, -1], vec![-1, -1]],
        );

        let chains = forbidden_precedence_chains(&data);

        // Everything is harmful, so chain mode never arms.
        assert!(chains.chains.is_empty());
        assert_eq!(vec![(2, 1), (2, 0), (1, 0)], chains.not_equal_pairs);
    }

    #[test]
    fn a_harmless_predecessor_arms_chain_mode() {
        // Species 1 is a harmless predecessor of species 0, species 2 a
        // harmful one. Need order by descending begin: 2 (species 0),
        // 1 (species 1), 0 (species 2).
        let data = with_precedences(
            &[
                NeedSpec::new(2, 1, 5),
                NeedSpec::new(1, 10, 14),
                NeedSpec::new(0, 20, 24),
            ],
            vec![
                vec![-1, 0, -1],
                vec![-1, -1, -1],
                vec![-1, -1, -1],
            ],
        );

        let chains = forbidden_precedence_chains(&data);

        assert_eq!(vec![vec![2, 1, 0]], chains.chains);
        assert!(!chains.not_equal_pairs.contains(&(2, 0)));
    }

    #[test]
    fn beneficial_entries_span_the_needs_between_them() {
        // Species 1 beneficially precedes species 0.
        let data = with_precedences(
            &[
                NeedSpec::new(1, 1, 5),
                NeedSpec::new(0, 10, 14),
                NeedSpec::new(0, 20, 24),
            ],
            vec![vec![0, 1], vec![0, 0]],
        );

        let chains = beneficial_precedence_chains(&data);

        // Need 2 over need 0 spans need 1; need 1 over need 0 is direct.
        assert_eq!(vec![vec![2, 1, 0], vec![1, 0]], chains);
    }
}
