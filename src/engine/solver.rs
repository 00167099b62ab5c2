use log::debug;
use log::info;

use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::containers::KeyedVec;
use crate::engine::assignments::Assignments;
use crate::engine::graph::GraphVar;
use crate::engine::propagation::Inconsistency;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStatusCP;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::EnqueueDecision;
use crate::engine::propagation::NUM_PRIORITY_LEVELS;
use crate::engine::propagator_queue::PropagatorQueue;
use crate::engine::variables::DomainId;
use crate::engine::variables::GraphVarId;
use crate::engine::watch_list::WatchListCP;
use crate::termination::TerminationCondition;

/// The result of a satisfaction run.
#[derive(Debug)]
pub enum SatisfactionResult {
    Satisfiable(Solution),
    Unsatisfiable,
    /// The time budget ran out before a conclusion was reached.
    Unknown,
}

/// The result of a maximisation run.
#[derive(Debug)]
pub enum OptimisationResult {
    Optimal(Solution),
    /// A solution was found but optimality was not proven within the budget.
    Satisfiable(Solution),
    Unsatisfiable,
    Unknown,
}

#[derive(Debug, PartialEq, Eq)]
enum SearchOutcome {
    Feasible,
    Infeasible,
    Timeout,
}

#[derive(Default, Debug, Clone, Copy)]
struct Counters {
    num_decisions: u64,
    num_conflicts: u64,
    num_propagations: u64,
}

/// A chronological-backtracking constraint solver over trailed integer
/// domains and graph domains.
///
/// Propagators are posted up front at the root; posting triggers root-level
/// propagation. Search then interleaves branching decisions with event-driven
/// propagation to fixpoint, undoing decision levels on conflicts.
#[derive(Debug)]
pub struct Solver {
    assignments: Assignments,
    watch_list: WatchListCP,
    graphs: KeyedVec<GraphVarId, GraphVar>,
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
    queue: PropagatorQueue,
    decisions: Vec<(DomainId, i32)>,
    counters: Counters,
    /// Set once root-level propagation derives a contradiction; the instance
    /// as posted has no solution.
    root_infeasible: bool,
}

impl std::fmt::Debug for Box<dyn Propagator> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "propagator({})", self.name())
    }
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Solver {
            assignments: Assignments::default(),
            watch_list: WatchListCP::default(),
            graphs: KeyedVec::default(),
            propagators: KeyedVec::default(),
            queue: PropagatorQueue::new(NUM_PRIORITY_LEVELS),
            decisions: Vec::new(),
            counters: Counters::default(),
            root_infeasible: false,
        }
    }

    /// Create a variable with the inclusive domain `[lower_bound, upper_bound]`.
    pub fn new_bounded_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        let domain = self.assignments.grow(lower_bound, upper_bound);
        self.watch_list.grow();
        domain
    }

    /// Create a variable whose domain is exactly `values`; values may be
    /// given in any order but must be non-empty.
    pub fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        assert!(!values.is_empty(), "cannot create an empty domain");

        let lower_bound = values.iter().copied().min().unwrap_or(0);
        let upper_bound = values.iter().copied().max().unwrap_or(0);
        let domain = self.new_bounded_variable(lower_bound, upper_bound);

        for value in lower_bound..=upper_bound {
            if !values.contains(&value) {
                // The bounds are members of `values`, so this cannot fail.
                let result = self.assignments.remove_value(domain, value);
                debug_assert!(result.is_ok());
            }
        }
        // Domain setup events are not propagation events.
        let _ = self.assignments.drain_domain_events();
        domain
    }

    pub fn new_graph_variable(&mut self, graph: GraphVar) -> GraphVarId {
        self.graphs.push(graph)
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    #[cfg(test)]
    pub(crate) fn assignments_mut(&mut self) -> &mut Assignments {
        &mut self.assignments
    }

    #[cfg(test)]
    pub(crate) fn run_propagation(&mut self) -> PropagationStatusCP {
        self.propagate_to_fixpoint()
    }

    pub fn graph(&self, graph: GraphVarId) -> &GraphVar {
        &self.graphs[graph]
    }

    pub fn lower_bound(&self, var: DomainId) -> i32 {
        self.assignments.lower_bound(var)
    }

    pub fn upper_bound(&self, var: DomainId) -> i32 {
        self.assignments.upper_bound(var)
    }

    /// Post a propagator and run root-level propagation.
    ///
    /// An `Err` means the instance is already infeasible at the root; the
    /// solver remembers this and any subsequent solve reports unsatisfiable.
    pub fn add_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), Inconsistency> {
        debug_assert_eq!(0, self.assignments.get_decision_level());

        let propagator_id = PropagatorId(self.propagators.len() as u32);
        let mut context =
            PropagatorConstructorContext::new(&mut self.watch_list, &mut self.graphs, propagator_id);
        let propagator = constructor.create(&mut context);

        debug!("posting propagator '{}'", propagator.name());
        let _ = self.propagators.push(Box::new(propagator));

        let priority = self.propagators[propagator_id].priority();
        self.queue.enqueue_propagator(propagator_id, priority as u32);

        self.propagate_to_fixpoint().inspect_err(|_| {
            self.root_infeasible = true;
        })
    }

    /// Find any solution to the posted propagators.
    pub fn solve(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> SatisfactionResult {
        if self.root_infeasible {
            return SatisfactionResult::Unsatisfiable;
        }

        match self.search(brancher, termination) {
            SearchOutcome::Feasible => {
                let solution = self.extract_solution();
                self.backtrack_to_root();
                SatisfactionResult::Satisfiable(solution)
            }
            SearchOutcome::Infeasible => SatisfactionResult::Unsatisfiable,
            SearchOutcome::Timeout => SatisfactionResult::Unknown,
        }
    }

    /// Maximise `objective` by repeatedly solving with a solution-improving
    /// lower bound on the objective.
    pub fn maximise(
        &mut self,
        objective: DomainId,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> OptimisationResult {
        if self.root_infeasible {
            return OptimisationResult::Unsatisfiable;
        }

        let mut best: Option<Solution> = None;

        loop {
            match self.search(brancher, termination) {
                SearchOutcome::Feasible => {
                    let solution = self.extract_solution();
                    let objective_value = solution.value(objective);
                    info!("solution found with objective {objective_value}");
                    best = Some(solution);
                    self.backtrack_to_root();

                    // Demand strict improvement; a root conflict proves
                    // optimality of the incumbent.
                    let bound_posted = self
                        .assignments
                        .tighten_lower_bound(objective, objective_value + 1)
                        .is_ok()
                        && self.propagate_to_fixpoint().is_ok();
                    if !bound_posted {
                        break;
                    }
                }
                SearchOutcome::Infeasible => break,
                SearchOutcome::Timeout => {
                    return match best {
                        Some(solution) => OptimisationResult::Satisfiable(solution),
                        None => OptimisationResult::Unknown,
                    };
                }
            }
        }

        match best {
            Some(solution) => OptimisationResult::Optimal(solution),
            None => OptimisationResult::Unsatisfiable,
        }
    }

    pub fn log_statistics(&self) {
        info!(
            "decisions: {}, conflicts: {}, propagator runs: {}",
            self.counters.num_decisions, self.counters.num_conflicts, self.counters.num_propagations
        );
    }

    fn search(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> SearchOutcome {
        loop {
            if termination.should_stop() {
                debug!("time budget exhausted, abandoning search");
                self.backtrack_to_root();
                return SearchOutcome::Timeout;
            }

            if self.propagate_to_fixpoint().is_err() {
                self.counters.num_conflicts += 1;
                if !self.resolve_conflict() {
                    return SearchOutcome::Infeasible;
                }
                continue;
            }

            // A fixpoint without conflict: branch, or conclude.
            let decision = brancher
                .next_decision(&self.assignments)
                .or_else(|| self.first_unfixed_decision());

            match decision {
                Some((var, value)) => self.decide(var, value),
                None => {
                    self.verify_entailment_at_solution();
                    return SearchOutcome::Feasible;
                }
            }
        }
    }

    /// Undo the most recent decision and exclude the tried value. Returns
    /// false when the root is reached, meaning the search space is exhausted.
    fn resolve_conflict(&mut self) -> bool {
        loop {
            if self.assignments.get_decision_level() == 0 {
                self.root_infeasible = true;
                return false;
            }

            let Some((var, value)) = self.decisions.pop() else {
                self.root_infeasible = true;
                return false;
            };
            self.backtrack(self.assignments.get_decision_level() - 1);

            if self.assignments.remove_value(var, value).is_ok() {
                return true;
            }
            // Removing the tried value wiped the domain; the conflict moves
            // one level up.
            self.counters.num_conflicts += 1;
        }
    }

    fn decide(&mut self, var: DomainId, value: i32) {
        self.counters.num_decisions += 1;
        self.assignments.increase_decision_level();
        for graph in self.graphs.iter_mut() {
            graph.new_level();
        }
        self.decisions.push((var, value));

        // Branchers only pick values from the current domain.
        let result = self.assignments.make_assignment(var, value);
        debug_assert!(result.is_ok());
    }

    fn first_unfixed_decision(&self) -> Option<(DomainId, i32)> {
        self.assignments
            .domains()
            .find(|&domain| !self.assignments.is_fixed(domain))
            .map(|domain| (domain, self.assignments.lower_bound(domain)))
    }

    fn backtrack(&mut self, target_level: usize) {
        self.assignments.synchronise(target_level);
        for graph in self.graphs.iter_mut() {
            graph.synchronise(target_level);
        }
        self.queue.clear();

        let context = PropagationContext::new(&self.assignments, &self.graphs);
        for propagator in self.propagators.iter_mut() {
            propagator.synchronise(context);
        }
    }

    fn backtrack_to_root(&mut self) {
        if self.assignments.get_decision_level() > 0 {
            self.backtrack(0);
        }
        self.decisions.clear();
    }

    fn propagate_to_fixpoint(&mut self) -> PropagationStatusCP {
        self.notify_propagators();

        while let Some(propagator_id) = self.queue.pop() {
            self.counters.num_propagations += 1;

            let propagator = &mut self.propagators[propagator_id];
            let mut context = PropagationContextMut::new(&mut self.assignments, &mut self.graphs);
            let result = propagator.propagate(&mut context);

            if let Err(inconsistency) = result {
                debug!(
                    "conflict in propagator '{}' at level {}",
                    self.propagators[propagator_id].name(),
                    self.assignments.get_decision_level()
                );
                self.queue.clear();
                let _ = self.assignments.drain_domain_events();
                return Err(inconsistency);
            }

            self.notify_propagators();
        }
        Ok(())
    }

    fn notify_propagators(&mut self) {
        let events = self.assignments.drain_domain_events();
        for (event, domain) in events {
            let watchers = self
                .watch_list
                .get_affected_propagators(event, domain)
                .to_vec();
            for propagator_var in watchers {
                let context = PropagationContext::new(&self.assignments, &self.graphs);
                let decision = self.propagators[propagator_var.propagator].notify(
                    context,
                    propagator_var.variable,
                    event,
                );
                if decision == EnqueueDecision::Enqueue {
                    let priority = self.propagators[propagator_var.propagator].priority();
                    self.queue
                        .enqueue_propagator(propagator_var.propagator, priority as u32);
                }
            }
        }

        // Graph domains notify their watchers on any edge-set change.
        let graph_ids: Vec<GraphVarId> = self.graphs.keys().collect();
        for graph_id in graph_ids {
            if !self.graphs[graph_id].changed {
                continue;
            }
            self.graphs[graph_id].changed = false;
            let watchers = self.graphs[graph_id].watchers.clone();
            for propagator_id in watchers {
                let priority = self.propagators[propagator_id].priority();
                self.queue.enqueue_propagator(propagator_id, priority as u32);
            }
        }
    }

    fn extract_solution(&self) -> Solution {
        Solution::new(self.assignments.snapshot_values())
    }

    /// At a solution every posted propagator must report entailment; a
    /// propagator answering `False` here has a filtering bug.
    fn verify_entailment_at_solution(&self) {
        #[cfg(debug_assertions)]
        {
            use crate::engine::propagation::Entailment;

            let context = PropagationContext::new(&self.assignments, &self.graphs);
            for propagator in self.propagators.iter() {
                debug_assert!(
                    propagator.is_entailed(context) != Entailment::False,
                    "propagator '{}' is violated in a solution",
                    propagator.name()
                );
            }
        }
    }
}
