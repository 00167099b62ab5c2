//! Conditions under which the search gives up.
//!
//! The solver polls the termination condition between propagation steps; a
//! running propagation call is never interrupted.

use std::time::Duration;
use std::time::Instant;

pub trait TerminationCondition {
    fn should_stop(&mut self) -> bool;
}

/// A wall-clock budget for the solver.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    /// Give the solver a time budget, starting now.
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            deadline: Instant::now() + budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Never stops the search; used when no timeout is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}
