//! A thin harness for testing a single propagator in isolation.

use crate::engine::graph::GraphVar;
use crate::engine::propagation::PropagationStatusCP;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::solver::Solver;
use crate::engine::variables::DomainId;
use crate::engine::variables::GraphVarId;

#[derive(Default, Debug)]
pub(crate) struct TestSolver {
    solver: Solver,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.solver.new_bounded_variable(lower_bound, upper_bound)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        self.solver.new_sparse_variable(values)
    }

    pub(crate) fn new_graph_variable(&mut self, graph: GraphVar) -> GraphVarId {
        self.solver.new_graph_variable(graph)
    }

    pub(crate) fn graph(&self, graph: GraphVarId) -> &GraphVar {
        self.solver.graph(graph)
    }

    /// Post the propagator; this runs root propagation to fixpoint.
    pub(crate) fn new_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagationStatusCP {
        self.solver.add_propagator(constructor)
    }

    /// Re-run propagation after a manual domain change.
    pub(crate) fn propagate(&mut self) -> PropagationStatusCP {
        self.solver.run_propagation()
    }

    pub(crate) fn set_lower_bound(&mut self, var: DomainId, bound: i32) -> PropagationStatusCP {
        self.solver.assignments_mut().tighten_lower_bound(var, bound)?;
        self.propagate()
    }

    pub(crate) fn set_upper_bound(&mut self, var: DomainId, bound: i32) -> PropagationStatusCP {
        self.solver.assignments_mut().tighten_upper_bound(var, bound)?;
        self.propagate()
    }

    pub(crate) fn remove(&mut self, var: DomainId, value: i32) -> PropagationStatusCP {
        self.solver.assignments_mut().remove_value(var, value)?;
        self.propagate()
    }

    pub(crate) fn assign(&mut self, var: DomainId, value: i32) -> PropagationStatusCP {
        self.solver.assignments_mut().make_assignment(var, value)?;
        self.propagate()
    }

    pub(crate) fn lower_bound(&self, var: DomainId) -> i32 {
        self.solver.assignments().lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: DomainId) -> i32 {
        self.solver.assignments().upper_bound(var)
    }

    pub(crate) fn contains(&self, var: DomainId, value: i32) -> bool {
        self.solver.assignments().contains(var, value)
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lower_bound: i32, upper_bound: i32) {
        assert_eq!(
            (lower_bound, upper_bound),
            (self.lower_bound(var), self.upper_bound(var)),
            "the bounds of {var} do not match"
        );
    }

    pub(crate) fn assert_domain(&self, var: DomainId, values: &[i32]) {
        assert_eq!(
            values.to_vec(),
            self.solver.assignments().domain_values(var),
            "the domain of {var} does not match"
        );
    }
}
