mod solution;
mod trail;

pub use solution::Solution;
pub(crate) use trail::Trail;
