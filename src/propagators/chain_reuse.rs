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

/// Reifies direct bed reuse over a time-ordered sequence of bed variables:
/// `indicator = 1` exactly when the first and last crop share a bed and no
/// crop in between interrupts them on it.
///
/// The reuse objective sums these indicators over all beneficial precedence
/// chains.
#[derive(Debug)]
pub struct ChainReuseArgs {
    pub sequence: Box<[DomainId]>,
    pub indicator: DomainId,
}

#[derive(Debug)]
pub struct ChainReusePropagator {
    sequence: Box<[DomainId]>,
    indicator: DomainId,
}

impl PropagatorConstructor for ChainReuseArgs {
    type PropagatorImpl = ChainReusePropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        assert!(self.sequence.len() >= 2);
        for (index, &variable) in self.sequence.iter().enumerate() {
            let _ =
                context.register(variable, DomainEvents::ANY_INT, LocalId::from(index as u32));
        }
        let _ = context.register(
            self.indicator,
            DomainEvents::ASSIGN,
            LocalId::from(self.sequence.len() as u32),
        );
        ChainReusePropagator {
            sequence: self.sequence,
            indicator: self.indicator,
        }
    }
}

impl ChainReusePropagator {
    fn first(&self) -> DomainId {
        self.sequence[0]
    }

    fn last(&self) -> DomainId {
        self.sequence[self.sequence.len() - 1]
    }

    fn intermediates(&self) -> &[DomainId] {
        &self.sequence[1..self.sequence.len() - 1]
    }

    fn witnesses(&self, context: &PropagationContextMut<'_>, value: i32) -> Vec<DomainId> {
        self.intermediates()
            .iter()
            .copied()
            .filter(|&var| context.contains(var, value))
            .collect()
    }

    fn propagate_reuse_holds(
        &self,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatusCP {
        let first = self.first();
        let last = self.last();

        context.set_lower_bound(last, context.lower_bound(first))?;
        context.set_lower_bound(first, context.lower_bound(last))?;
        context.set_upper_bound(last, context.upper_bound(first))?;
        context.set_upper_bound(first, context.upper_bound(last))?;

        for (fixed, other) in [(first, last), (last, first)] {
            if context.is_fixed(fixed) {
                let value = context.assigned_value(fixed);
                context.make_assignment(other, value)?;
                for &var in self.intermediates() {
                    context.remove_value(var, value)?;
                }
            }
        }
        Ok(())
    }

    fn propagate_reuse_fails(
        &self,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatusCP {
        let first = self.first();
        let last = self.last();

        if context.is_fixed(first) && context.is_fixed(last) {
            let value = context.assigned_value(first);
            if value == context.assigned_value(last) {
                let witnesses = self.witnesses(context, value);
                match witnesses.as_slice() {
                    [] => return Err(Inconsistency::Conflict),
                    &[only] => context.make_assignment(only, value)?,
                    _ => {}
                }
            }
            return Ok(());
        }

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

    /// True, false, or not yet decided by the current domains.
    fn reuse_status(&self, context: &PropagationContextMut<'_>) -> Entailment {
        let first = self.first();
        let last = self.last();

        if context.upper_bound(first) < context.lower_bound(last)
            || context.upper_bound(last) < context.lower_bound(first)
        {
            return Entailment::False;
        }
        if !context.is_fixed(first) || !context.is_fixed(last) {
            return Entailment::Unknown;
        }
        let value = context.assigned_value(first);
        if value != context.assigned_value(last) {
            return Entailment::False;
        }
        let interrupted = self
            .intermediates()
            .iter()
            .any(|&var| context.is_fixed(var) && context.assigned_value(var) == value);
        if interrupted {
            return Entailment::False;
        }
        if self.witnesses(context, value).is_empty() {
            Entailment::True
        } else {
            Entailment::Unknown
        }
    }
}

impl Propagator for ChainReusePropagator {
    fn name(&self) -> &str {
        "ChainReuse"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        if context.is_fixed(self.indicator) {
            if context.assigned_value(self.indicator) == 1 {
                return self.propagate_reuse_holds(context);
            }
            return self.propagate_reuse_fails(context);
        }
        match self.reuse_status(context) {
            Entailment::True => context.make_assignment(self.indicator, 1)?,
            Entailment::False => context.make_assignment(self.indicator, 0)?,
            Entailment::Unknown => {}
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.sequence.iter().all(|&var| context.is_fixed(var))
            || !context.is_fixed(self.indicator)
        {
            return Entailment::Unknown;
        }
        let first = context.assigned_value(self.first());
        let reused = first == context.assigned_value(self.last())
            && !self
                .intermediates()
                .iter()
                .any(|&var| context.assigned_value(var) == first);
        if reused == (context.assigned_value(self.indicator) == 1) {
            Entailment::True
        } else {
            Entailment::False
        }
    }
}
