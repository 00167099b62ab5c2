//! Propagator implementations for the crop-planning constraints.

pub mod all_different;
pub mod bool_sum;
pub mod chain_reuse;
pub mod distance;
pub mod increasing;
pub mod interaction_gain;
pub mod interaction_gain_graph;
pub mod not_equal;
pub mod precedence_chain;
pub mod table;
