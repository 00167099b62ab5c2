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

/// Enforces `variables[0] < variables[1] < ...`, used to break the symmetry
/// between the interchangeable units of a duplicate group.
#[derive(Debug)]
pub struct IncreasingArgs {
    pub variables: Box<[DomainId]>,
}

#[derive(Debug)]
pub struct IncreasingPropagator {
    variables: Box<[DomainId]>,
}

impl PropagatorConstructor for IncreasingArgs {
    type PropagatorImpl = IncreasingPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for (index, &variable) in self.variables.iter().enumerate() {
            let _ = context.register(variable, DomainEvents::BOUNDS, LocalId::from(index as u32));
        }
        IncreasingPropagator {
            variables: self.variables,
        }
    }
}

impl Propagator for IncreasingPropagator {
    fn name(&self) -> &str {
        "Increasing"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        for i in 1..self.variables.len() {
            let bound = context.lower_bound(self.variables[i - 1]) + 1;
            context.set_lower_bound(self.variables[i], bound)?;
        }
        for i in (0..self.variables.len().saturating_sub(1)).rev() {
            let bound = context.upper_bound(self.variables[i + 1]) - 1;
            context.set_upper_bound(self.variables[i], bound)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.variables.iter().all(|&var| context.is_fixed(var)) {
            return Entailment::Unknown;
        }
        let strictly_increasing = self
            .variables
            .windows(2)
            .all(|pair| context.assigned_value(pair[0]) < context.assigned_value(pair[1]));
        if strictly_increasing {
            Entailment::True
        } else {
            Entailment::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn bounds_are_squeezed_from_both_ends() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 5);
        let y = solver.new_variable(1, 5);
        let z = solver.new_variable(1, 5);

        solver
            .new_propagator(IncreasingArgs {
                variables: Box::new([x, y, z]),
            })
            .unwrap();

        solver.assert_bounds(x, 1, 3);
        solver.assert_bounds(y, 2, 4);
        solver.assert_bounds(z, 3, 5);
    }

    #[test]
    fn a_chain_longer_than_the_range_conflicts() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 2);
        let y = solver.new_variable(1, 2);
        let z = solver.new_variable(1, 2);

        assert!(solver
            .new_propagator(IncreasingArgs {
                variables: Box::new([x, y, z]),
            })
            .is_err());
    }
}
