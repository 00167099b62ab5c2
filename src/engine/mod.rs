//! The propagation engine: trailed integer domains, event-driven propagator
//! scheduling, and a chronological-backtracking search loop.

pub mod assignments;
pub mod graph;
pub mod propagation;
pub mod solver;
pub mod variables;

pub(crate) mod domain_events;
pub(crate) mod event_sink;
pub(crate) mod propagator_queue;
pub(crate) mod watch_list;

#[cfg(test)]
pub(crate) mod test_solver;

pub use assignments::Assignments;
pub use assignments::EmptyDomain;
pub use domain_events::DomainEvents;
pub use domain_events::IntDomainEvent;
pub use graph::GraphVar;
pub use solver::OptimisationResult;
pub use solver::SatisfactionResult;
pub use solver::Solver;
