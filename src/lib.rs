//! Constraint-based crop planning for agroecological vegetable farms.
//!
//! The library assigns crop *needs* (a species occupying a bed over a fixed
//! week interval) to physical beds. Temporal overlap between needs induces an
//! interval graph; since interval graphs are chordal, the bed-disjointness
//! requirement decomposes into one all-different constraint per maximal
//! clique. On top of that base model sit agroecology constraints (rotation
//! delays, negative interactions, species dilution, crop grouping, precedence
//! restrictions) and two optional objectives: the number of positive
//! interactions realised between adjacent beds, and the number of positive
//! precedences realised by reusing a bed.
//!
//! The propagation engine underneath ([`engine`]) is a purpose-built
//! chronological-backtracking solver over trailed integer domains, with an
//! undirected graph domain used by the graph-synchronised interaction
//! objective.

pub mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
pub mod model;
pub mod propagators;
pub mod termination;

pub use basic_types::Solution;
pub use engine::OptimisationResult;
pub use engine::SatisfactionResult;
pub use engine::Solver;
