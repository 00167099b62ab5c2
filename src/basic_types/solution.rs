use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;

/// A snapshot of the assigned value of every variable, taken when all domains
/// are singletons.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    values: KeyedVec<DomainId, i32>,
}

impl Solution {
    pub(crate) fn new(values: KeyedVec<DomainId, i32>) -> Self {
        Solution { values }
    }

    pub fn value(&self, domain: DomainId) -> i32 {
        self.values[domain]
    }

    pub fn num_domains(&self) -> usize {
        self.values.len()
    }
}
