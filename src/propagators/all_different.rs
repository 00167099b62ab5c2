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

/// Enforces that all variables take pairwise distinct values.
///
/// Filtering is value-based: an assigned value disappears from the other
/// domains, repeated until no domain changes. One instance is posted per
/// maximal clique of the interval graph.
#[derive(Debug)]
pub struct AllDifferentArgs {
    pub variables: Box<[DomainId]>,
}

#[derive(Debug)]
pub struct AllDifferentPropagator {
    variables: Box<[DomainId]>,
}

impl PropagatorConstructor for AllDifferentArgs {
    type PropagatorImpl = AllDifferentPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for (index, &variable) in self.variables.iter().enumerate() {
            let _ = context.register(variable, DomainEvents::ASSIGN, LocalId::from(index as u32));
        }
        AllDifferentPropagator {
            variables: self.variables,
        }
    }
}

impl Propagator for AllDifferentPropagator {
    fn name(&self) -> &str {
        "AllDifferent"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.variables.len() {
                if !context.is_fixed(self.variables[i]) {
                    continue;
                }
                let value = context.assigned_value(self.variables[i]);
                for j in 0..self.variables.len() {
                    if i != j && context.contains(self.variables[j], value) {
                        context.remove_value(self.variables[j], value)?;
                        changed = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.variables.iter().all(|&var| context.is_fixed(var)) {
            return Entailment::Unknown;
        }
        for i in 0..self.variables.len() {
            for j in (i + 1)..self.variables.len() {
                if context.assigned_value(self.variables[i])
                    == context.assigned_value(self.variables[j])
                {
                    return Entailment::False;
                }
            }
        }
        Entailment::True
    }
}
