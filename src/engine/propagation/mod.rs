//! The interface between the solver and individual propagators.
//!
//! A propagator is registered through a [`PropagatorConstructor`]; during
//! construction it subscribes its variables to domain events via
//! [`PropagatorConstructorContext::register`]. When a subscribed event fires,
//! the solver calls [`Propagator::notify`], and if the propagator asks to be
//! enqueued it is scheduled according to its [`Priority`]. A scheduled
//! propagator eventually gets [`Propagator::propagate`] called with a mutable
//! context through which it reads and prunes domains.

mod contexts;

pub use contexts::PropagationContext;
pub use contexts::PropagationContextMut;
pub use contexts::ReadDomains;

use crate::containers::StorageKey;
use crate::engine::assignments::EmptyDomain;
use crate::engine::domain_events::DomainEvents;
use crate::engine::domain_events::IntDomainEvent;
use crate::engine::graph::EdgeConflict;
use crate::engine::graph::GraphVar;
use crate::engine::variables::DomainId;
use crate::engine::variables::GraphVarId;
use crate::engine::watch_list::WatchListCP;
use crate::containers::KeyedVec;

/// A propagator-local variable index; the propagator chooses these when
/// registering its variables and gets them back in [`Propagator::notify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalId(u32);

impl LocalId {
    pub const fn from(value: u32) -> Self {
        LocalId(value)
    }

    pub fn unpack(self) -> u32 {
        self.0
    }
}

/// An identifier to a propagator instance within the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropagatorId(pub(crate) u32);

impl StorageKey for PropagatorId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        PropagatorId(index as u32)
    }
}

/// A propagator and one of its local variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PropagatorVarId {
    pub(crate) propagator: PropagatorId,
    pub(crate) variable: LocalId,
}

/// Indicates whether a propagator wants to be scheduled in response to an
/// event it was notified of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    Enqueue,
    Skip,
}

/// Determines the order in which scheduled propagators run; cheap propagators
/// should be given a higher priority (lower value) than expensive ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    VeryLow = 3,
}

pub(crate) const NUM_PRIORITY_LEVELS: u32 = 4;

/// The reason a propagation run stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// An integer domain was wiped out.
    EmptyDomain,
    /// The propagator found its constraint unsatisfiable in the current state.
    Conflict,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl From<EdgeConflict> for Inconsistency {
    fn from(_: EdgeConflict) -> Self {
        Inconsistency::Conflict
    }
}

pub type PropagationStatusCP = Result<(), Inconsistency>;

/// The truth status of a constraint under the current (partial) assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entailment {
    True,
    False,
    Unknown,
}

pub trait Propagator {
    /// A human-readable identifier used in logs and failure reports.
    fn name(&self) -> &str;

    /// Prune the domains of the registered variables to a locally consistent
    /// state, or report an inconsistency.
    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP;

    fn priority(&self) -> Priority {
        Priority::High
    }

    /// Called when a subscribed event fires on one of the registered
    /// variables, before the propagator is scheduled.
    fn notify(
        &mut self,
        _context: PropagationContext<'_>,
        _local_id: LocalId,
        _event: IntDomainEvent,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Called after the solver has backtracked, so internal state mirroring
    /// the trailed domains can be reset.
    fn synchronise(&mut self, _context: PropagationContext<'_>) {}

    /// Whether the constraint is certainly satisfied, certainly violated, or
    /// still undecided under the current domains.
    fn is_entailed(&self, _context: PropagationContext<'_>) -> Entailment {
        Entailment::Unknown
    }
}

/// A builder for a propagator, given to [`Solver::add_propagator`][crate::engine::Solver::add_propagator].
pub trait PropagatorConstructor {
    type PropagatorImpl: Propagator + 'static;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl;
}

/// Context given to a [`PropagatorConstructor`] to subscribe variables to
/// domain events.
pub struct PropagatorConstructorContext<'a> {
    watch_list: &'a mut WatchListCP,
    graphs: &'a mut KeyedVec<GraphVarId, GraphVar>,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        watch_list: &'a mut WatchListCP,
        graphs: &'a mut KeyedVec<GraphVarId, GraphVar>,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            watch_list,
            graphs,
            propagator_id,
        }
    }

    /// Subscribe to `events` on `var`. Notifications carry back `local_id`.
    pub fn register(&mut self, var: DomainId, events: DomainEvents, local_id: LocalId) -> DomainId {
        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };
        self.watch_list.watch_all(var, events.int_events(), propagator_var);
        var
    }

    /// Subscribe to edge-set changes of a graph variable.
    pub fn register_graph(&mut self, graph: GraphVarId) -> GraphVarId {
        self.graphs[graph].watchers.push(self.propagator_id);
        graph
    }
}
