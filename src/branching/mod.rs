//! Variable and value selection for the search loop.

use crate::engine::assignments::Assignments;
use crate::engine::variables::DomainId;

/// Chooses the next decision: an unfixed variable together with the value to
/// try first. Returning `None` means all watched variables are fixed.
pub trait Brancher {
    fn next_decision(&mut self, assignments: &Assignments) -> Option<(DomainId, i32)>;
}

/// Picks the first unfixed variable in the given order and tries its smallest
/// value.
#[derive(Debug)]
pub struct InputOrder {
    variables: Vec<DomainId>,
}

impl InputOrder {
    pub fn new(variables: Vec<DomainId>) -> Self {
        InputOrder { variables }
    }
}

impl Brancher for InputOrder {
    fn next_decision(&mut self, assignments: &Assignments) -> Option<(DomainId, i32)> {
        self.variables
            .iter()
            .copied()
            .find(|&var| !assignments.is_fixed(var))
            .map(|var| (var, assignments.lower_bound(var)))
    }
}

/// Picks the unfixed variable with the smallest domain and tries its smallest
/// value. Ties go to the variable that comes first in the given order.
#[derive(Debug)]
pub struct FirstFail {
    variables: Vec<DomainId>,
}

impl FirstFail {
    pub fn new(variables: Vec<DomainId>) -> Self {
        FirstFail { variables }
    }
}

impl Brancher for FirstFail {
    fn next_decision(&mut self, assignments: &Assignments) -> Option<(DomainId, i32)> {
        self.variables
            .iter()
            .copied()
            .filter(|&var| !assignments.is_fixed(var))
            .min_by_key(|&var| assignments.domain_size(var))
            .map(|var| (var, assignments.lower_bound(var)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_order_respects_the_given_order() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(1, 5);
        let y = assignments.grow(1, 2);

        let mut brancher = InputOrder::new(vec![x, y]);
        assert_eq!(Some((x, 1)), brancher.next_decision(&assignments));
    }

    #[test]
    fn first_fail_prefers_the_smallest_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(1, 5);
        let y = assignments.grow(1, 2);

        let mut brancher = FirstFail::new(vec![x, y]);
        assert_eq!(Some((y, 1)), brancher.next_decision(&assignments));

        assignments.make_assignment(y, 1).unwrap();
        assert_eq!(Some((x, 1)), brancher.next_decision(&assignments));

        assignments.make_assignment(x, 4).unwrap();
        assert_eq!(None, brancher.next_decision(&assignments));
    }
}
