//! The crop-planning model: problem data, interval-graph construction,
//! chordal decomposition, and the constraint model built on the engine.

pub mod chordal;
pub mod data;
pub mod interval;
pub mod interval_graph;
pub mod precedence;
pub mod problem;

pub use data::DataError;
pub use data::ProblemData;
pub use problem::CropPlanProblem;
pub use problem::ModelError;
