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

/// Channels `sum = booleans[0] + ... + booleans[n-1]` where every summand is
/// a 0-1 variable. The reuse objective counts its per-bed indicators through
/// one of these.
#[derive(Debug)]
pub struct BoolSumArgs {
    pub booleans: Box<[DomainId]>,
    pub sum: DomainId,
}

#[derive(Debug)]
pub struct BoolSumPropagator {
    booleans: Box<[DomainId]>,
    sum: DomainId,
}

impl PropagatorConstructor for BoolSumArgs {
    type PropagatorImpl = BoolSumPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for (index, &boolean) in self.booleans.iter().enumerate() {
            let _ = context.register(boolean, DomainEvents::ASSIGN, LocalId::from(index as u32));
        }
        let _ = context.register(
            self.sum,
            DomainEvents::BOUNDS,
            LocalId::from(self.booleans.len() as u32),
        );
        BoolSumPropagator {
            booleans: self.booleans,
            sum: self.sum,
        }
    }
}

impl Propagator for BoolSumPropagator {
    fn name(&self) -> &str {
        "BoolSum"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        let num_true = self
            .booleans
            .iter()
            .filter(|&&b| context.lower_bound(b) >= 1)
            .count() as i32;
        let num_possible = self
            .booleans
            .iter()
            .filter(|&&b| context.upper_bound(b) >= 1)
            .count() as i32;

        context.set_lower_bound(self.sum, num_true)?;
        context.set_upper_bound(self.sum, num_possible)?;

        // The sum bounds can in turn fix the remaining undecided summands.
        if context.lower_bound(self.sum) == num_possible {
            for &boolean in self.booleans.iter() {
                if context.upper_bound(boolean) >= 1 {
                    context.set_lower_bound(boolean, 1)?;
                }
            }
        }
        if context.upper_bound(self.sum) == num_true {
            for &boolean in self.booleans.iter() {
                if context.lower_bound(boolean) < 1 {
                    context.set_upper_bound(boolean, 0)?;
                }
            }
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.booleans.iter().all(|&b| context.is_fixed(b)) || !context.is_fixed(self.sum) {
            return Entailment::Unknown;
        }
        let total: i32 = self
            .booleans
            .iter()
            .map(|&b| context.assigned_value(b))
            .sum();
        if total == context.assigned_value(self.sum) {
            Entailment::True
        } else {
            Entailment::False
        }
    }
}
