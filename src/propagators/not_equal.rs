use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStatusCP;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// Enforces `x != y`.
#[derive(Debug)]
pub struct NotEqualArgs {
    pub x: DomainId,
    pub y: DomainId,
}

#[derive(Debug)]
pub struct NotEqualPropagator {
    x: DomainId,
    y: DomainId,
}

impl PropagatorConstructor for NotEqualArgs {
    type PropagatorImpl = NotEqualPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let _ = context.register(self.x, DomainEvents::ASSIGN, LocalId::from(0));
        let _ = context.register(self.y, DomainEvents::ASSIGN, LocalId::from(1));
        NotEqualPropagator {
            x: self.x,
            y: self.y,
        }
    }
}

impl Propagator for NotEqualPropagator {
    fn name(&self) -> &str {
        "NotEqual"
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        if context.is_fixed(self.x) {
            context.remove_value(self.y, context.assigned_value(self.x))?;
        }
        if context.is_fixed(self.y) {
            context.remove_value(self.x, context.assigned_value(self.y))?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if context.is_fixed(self.x) && context.is_fixed(self.y) {
            if context.assigned_value(self.x) != context.assigned_value(self.y) {
                return Entailment::True;
            }
            return Entailment::False;
        }
        Entailment::Unknown
    }
}
