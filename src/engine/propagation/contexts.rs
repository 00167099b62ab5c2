use crate::containers::KeyedVec;
use crate::engine::assignments::Assignments;
use crate::engine::assignments::EmptyDomain;
use crate::engine::graph::EdgeConflict;
use crate::engine::graph::GraphVar;
use crate::engine::variables::DomainId;
use crate::engine::variables::GraphVarId;

/// Read-only view of the domains, handed to propagators outside of
/// [`Propagator::propagate`][super::Propagator::propagate].
#[derive(Clone, Copy, Debug)]
pub struct PropagationContext<'a> {
    assignments: &'a Assignments,
    graphs: &'a KeyedVec<GraphVarId, GraphVar>,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        assignments: &'a Assignments,
        graphs: &'a KeyedVec<GraphVarId, GraphVar>,
    ) -> Self {
        PropagationContext {
            assignments,
            graphs,
        }
    }

    pub fn graph(&self, graph: GraphVarId) -> &GraphVar {
        &self.graphs[graph]
    }
}

/// Mutable view of the domains, handed to propagators during propagation.
/// All mutations are trailed and produce events.
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    assignments: &'a mut Assignments,
    graphs: &'a mut KeyedVec<GraphVarId, GraphVar>,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(
        assignments: &'a mut Assignments,
        graphs: &'a mut KeyedVec<GraphVarId, GraphVar>,
    ) -> Self {
        PropagationContextMut {
            assignments,
            graphs,
        }
    }

    pub fn set_lower_bound(&mut self, var: DomainId, bound: i32) -> Result<(), EmptyDomain> {
        self.assignments.tighten_lower_bound(var, bound)
    }

    pub fn set_upper_bound(&mut self, var: DomainId, bound: i32) -> Result<(), EmptyDomain> {
        self.assignments.tighten_upper_bound(var, bound)
    }

    pub fn remove_value(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.remove_value(var, value)
    }

    pub fn make_assignment(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.make_assignment(var, value)
    }

    pub fn graph(&self, graph: GraphVarId) -> &GraphVar {
        &self.graphs[graph]
    }

    pub fn remove_edge(
        &mut self,
        graph: GraphVarId,
        a: usize,
        b: usize,
    ) -> Result<bool, EdgeConflict> {
        self.graphs[graph].remove_edge(a, b)
    }

    pub fn enforce_edge(
        &mut self,
        graph: GraphVarId,
        a: usize,
        b: usize,
    ) -> Result<bool, EdgeConflict> {
        self.graphs[graph].enforce_edge(a, b)
    }

    pub fn drain_enforced_edges(&mut self, graph: GraphVarId) -> Vec<(usize, usize)> {
        self.graphs[graph].drain_enforced_edges()
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext {
            assignments: self.assignments,
            graphs: self.graphs,
        }
    }
}

/// Domain queries shared by the read-only and the mutable context.
pub trait ReadDomains {
    fn lower_bound(&self, var: DomainId) -> i32;

    fn upper_bound(&self, var: DomainId) -> i32;

    fn contains(&self, var: DomainId, value: i32) -> bool;

    fn is_fixed(&self, var: DomainId) -> bool;

    fn domain_size(&self, var: DomainId) -> u32;

    /// The values currently in the domain, in increasing order.
    fn domain_values(&self, var: DomainId) -> Vec<i32>;

    fn assigned_value(&self, var: DomainId) -> i32 {
        debug_assert!(self.is_fixed(var));
        self.lower_bound(var)
    }
}

macro_rules! read_domains_impl {
    ($ty:ident) => {
        impl ReadDomains for $ty<'_> {
            fn lower_bound(&self, var: DomainId) -> i32 {
                self.assignments.lower_bound(var)
            }

            fn upper_bound(&self, var: DomainId) -> i32 {
                self.assignments.upper_bound(var)
            }

            fn contains(&self, var: DomainId, value: i32) -> bool {
                self.assignments.contains(var, value)
            }

            fn is_fixed(&self, var: DomainId) -> bool {
                self.assignments.is_fixed(var)
            }

            fn domain_size(&self, var: DomainId) -> u32 {
                self.assignments.domain_size(var)
            }

            fn domain_values(&self, var: DomainId) -> Vec<i32> {
                self.assignments.domain_values(var)
            }
        }
    };
}

read_domains_impl!(PropagationContext);
read_domains_impl!(PropagationContextMut);
