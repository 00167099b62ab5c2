use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::Inconsistency;
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

/// Enforces, over a time-ordered sequence of bed variables, that the first
/// and last crop only share a bed if some crop in between also uses it.
///
/// The sequence covers a pair of needs with a harmful precedence, plus every
/// need scheduled between them. An intermediate crop on the same bed resets
/// the soil, so `seq[0] == seq[n-1]` is only allowed with such a witness.
#[derive(Debug)]
pub struct PrecedenceChainArgs {
    pub sequence: Box<[DomainId]>,
}

#[derive(Debug)]
pub struct PrecedenceChainPropagator {
    sequence: Box<[DomainId]>,
}

impl PropagatorConstructor for PrecedenceChainArgs {
    type PropagatorImpl = PrecedenceChainPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        assert!(self.sequence.len() >= 2);
        for (index, &variable) in self.sequence.iter().enumerate() {
            let _ = context.register(variable, DomainEvents::ASSIGN, LocalId::from(index as u32));
        }
        PrecedenceChainPropagator {
            sequence: self.sequence,
        }
    }
}

impl PrecedenceChainPropagator {
    fn first(&self) -> DomainId {
        self.sequence[0]
    }

    fn last(&self) -> DomainId {
        self.sequence[self.sequence.len() - 1]
    }

    fn intermediates(&self) -> &[DomainId] {
        &self.sequence[1..self.sequence.len() - 1]
    }

    /// The intermediates whose domain still contains `value`.
    fn witnesses(&self, context: &PropagationContextMut<'_>, value: i32) -> Vec<DomainId> {
        self.intermediates()
            .iter()
            .copied()
            .filter(|&var| context.contains(var, value))
            .collect()
    }
}

impl Propagator for PrecedenceChainPropagator {
    fn name(&self) -> &str {
        "PrecedenceChain"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        let first = self.first();
        let last = self.last();

        if context.is_fixed(first) && context.is_fixed(last) {
            let value = context.assigned_value(first);
            if value == context.assigned_value(last) {
                let witnesses = self.witnesses(context, value);
                match witnesses.as_slice() {
                    [] => return Err(Inconsistency::Conflict),
                    &[only] if !self
                        .intermediates()
                        .iter()
                        .any(|&var| context.is_fixed(var) && context.assigned_value(var) == value) =>
                    {
                        context.make_assignment(only, value)?;
                    }
                    _ => {}
                }
            }
            return Ok(());
        }

        // With one endpoint fixed and no possible witness left, the other
        // endpoint must avoid that bed.
        for (fixed, open) in [(first, last), (last, first)] {
            if context.is_fixed(fixed) && !context.is_fixed(open) {
                let value = context.assigned_value(fixed);
                if self.witnesses(context, value).is_empty() {
                    context.remove_value(open, value)?;
                }
            }
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.sequence.iter().all(|&var| context.is_fixed(var)) {
            return Entailment::Unknown;
        }
        let first = context.assigned_value(self.first());
        if first != context.assigned_value(self.last()) {
            return Entailment::True;
        }
        let has_witness = self
            .intermediates()
            .iter()
            .any(|&var| context.assigned_value(var) == first);
        if has_witness {
            Entailment::True
        } else {
            Entailment::False
        }
    }
}
