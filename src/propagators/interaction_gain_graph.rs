use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStatusCP;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;
use crate::engine::variables::GraphVarId;
use crate::model::interval::max_distance;
use crate::model::interval::min_distance;
use crate::propagators::interaction_gain::prune_to_adjacent_support;

/// Graph-synchronised variant of the interaction gain: a graph variable holds
/// one candidate edge per beneficial pair, and `gain` counts its edges.
///
/// Bed variables and edge sets are channelled in both directions. A pair
/// whose bound ranges drift more than one apart loses its edge, a pair forced
/// within distance one gains a mandatory edge, and a mandatory edge filters
/// both bed variables to mutually adjacent values.
#[derive(Debug)]
pub struct InteractionGainGraphArgs {
    pub graph: GraphVarId,
    pub gain: DomainId,
    /// Bed variable of each graph node.
    pub variables: Box<[DomainId]>,
    /// Beneficial pairs as node indices; these seed the candidate edges.
    pub pairs: Box<[(usize, usize)]>,
}

#[derive(Debug)]
pub struct InteractionGainGraphPropagator {
    graph: GraphVarId,
    gain: DomainId,
    variables: Box<[DomainId]>,
    pairs: Box<[(usize, usize)]>,
}

impl PropagatorConstructor for InteractionGainGraphArgs {
    type PropagatorImpl = InteractionGainGraphPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let _ = context.register_graph(self.graph);
        for (index, &variable) in self.variables.iter().enumerate() {
            let _ = context.register(variable, DomainEvents::BOUNDS, LocalId::from(index as u32));
        }
        let _ = context.register(
            self.gain,
            DomainEvents::BOUNDS,
            LocalId::from(self.variables.len() as u32),
        );
        InteractionGainGraphPropagator {
            graph: self.graph,
            gain: self.gain,
            variables: self.variables,
            pairs: self.pairs,
        }
    }
}

impl Propagator for InteractionGainGraphPropagator {
    fn name(&self) -> &str {
        "InteractionGainGraph"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        // Channel the bed variables into the edge sets.
        for &(a, b) in self.pairs.iter() {
            let va = self.variables[a];
            let vb = self.variables[b];
            let (lb_a, ub_a) = (context.lower_bound(va), context.upper_bound(va));
            let (lb_b, ub_b) = (context.lower_bound(vb), context.upper_bound(vb));
            if min_distance(lb_a, ub_a, lb_b, ub_b) > 1 {
                let _ = context.remove_edge(self.graph, a, b)?;
            } else if max_distance(lb_a, ub_a, lb_b, ub_b) <= 1 {
                let _ = context.enforce_edge(self.graph, a, b)?;
            }
        }

        // Channel newly mandatory edges back into the bed variables.
        for (a, b) in context.drain_enforced_edges(self.graph) {
            prune_to_adjacent_support(context, self.variables[a], self.variables[b])?;
        }

        let num_mandatory = context.graph(self.graph).num_mandatory_edges() as i32;
        let num_possible = context.graph(self.graph).num_possible_edges() as i32;
        context.set_lower_bound(self.gain, num_mandatory)?;
        context.set_upper_bound(self.gain, num_possible)?;

        if context.lower_bound(self.gain) == num_possible {
            for &(a, b) in self.pairs.iter() {
                if context.graph(self.graph).contains_possible(a, b) {
                    let _ = context.enforce_edge(self.graph, a, b)?;
                }
            }
        }
        if context.upper_bound(self.gain) == num_mandatory {
            for &(a, b) in self.pairs.iter() {
                if context.graph(self.graph).contains_possible(a, b)
                    && !context.graph(self.graph).contains_mandatory(a, b)
                {
                    let _ = context.remove_edge(self.graph, a, b)?;
                }
            }
        }

        // Edges enforced by the gain bounds above are picked up on the rerun
        // triggered by the graph change.
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        let graph = context.graph(self.graph);
        let decided = graph.num_possible_edges() == graph.num_mandatory_edges()
            && context.is_fixed(self.gain)
            && self.variables.iter().all(|&var| context.is_fixed(var));
        if !decided {
            return Entailment::Unknown;
        }
        for &(a, b) in self.pairs.iter() {
            let distance = (context.assigned_value(self.variables[a])
                - context.assigned_value(self.variables[b]))
            .abs();
            let has_edge = graph.contains_mandatory(a, b);
            if (distance == 1) != has_edge {
                return Entailment::False;
            }
        }
        if context.assigned_value(self.gain) == graph.num_mandatory_edges() as i32 {
            Entailment::True
        } else {
            Entailment::False
        }
    }
}
