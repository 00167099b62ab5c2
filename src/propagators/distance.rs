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

/// Enforces `|x - y| > threshold`; with threshold 1 this keeps two crops out
/// of the same and out of directly neighboring beds.
#[derive(Debug)]
pub struct DistanceGreaterArgs {
    pub x: DomainId,
    pub y: DomainId,
    pub threshold: i32,
}

#[derive(Debug)]
pub struct DistanceGreaterPropagator {
    x: DomainId,
    y: DomainId,
    threshold: i32,
}

impl PropagatorConstructor for DistanceGreaterArgs {
    type PropagatorImpl = DistanceGreaterPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let _ = context.register(self.x, DomainEvents::ASSIGN, LocalId::from(0));
        let _ = context.register(self.y, DomainEvents::ASSIGN, LocalId::from(1));
        DistanceGreaterPropagator {
            x: self.x,
            y: self.y,
            threshold: self.threshold,
        }
    }
}

impl DistanceGreaterPropagator {
    fn prune_around(
        &self,
        context: &mut PropagationContextMut<'_>,
        fixed: DomainId,
        other: DomainId,
    ) -> PropagationStatusCP {
        let value = context.assigned_value(fixed);
        for banned in (value - self.threshold)..=(value + self.threshold) {
            context.remove_value(other, banned)?;
        }
        Ok(())
    }
}

impl Propagator for DistanceGreaterPropagator {
    fn name(&self) -> &str {
        "DistanceGreater"
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        if context.is_fixed(self.x) {
            self.prune_around(context, self.x, self.y)?;
        }
        if context.is_fixed(self.y) {
            self.prune_around(context, self.y, self.x)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if context.is_fixed(self.x) && context.is_fixed(self.y) {
            let distance =
                (context.assigned_value(self.x) - context.assigned_value(self.y)).abs();
            if distance > self.threshold {
                return Entailment::True;
            }
            return Entailment::False;
        }
        Entailment::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn fixing_one_side_bans_the_neighborhood() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 5);
        let y = solver.new_variable(1, 5);

        solver
            .new_propagator(DistanceGreaterArgs { x, y, threshold: 1 })
            .unwrap();
        solver.assign(x, 3).unwrap();

        solver.assert_domain(y, &[1, 5]);
    }

    #[test]
    fn adjacent_singletons_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(2, 2);
        let y = solver.new_variable(3, 3);

        assert!(solver
            .new_propagator(DistanceGreaterArgs { x, y, threshold: 1 })
            .is_err());
    }
}
