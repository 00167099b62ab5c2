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
use crate::containers::HashMap;
use crate::containers::HashSet;

/// Forbids a set of pairs for two variables.
///
/// Dilution posts one of these per same-species overlapping pair, with the
/// forbidden pairs enumerating equal and adjacent beds.
#[derive(Debug)]
pub struct NegativeBinaryTableArgs {
    pub x: DomainId,
    pub y: DomainId,
    pub forbidden: Vec<(i32, i32)>,
}

#[derive(Debug)]
pub struct NegativeBinaryTablePropagator {
    x: DomainId,
    y: DomainId,
    forbidden_by_x: HashMap<i32, Vec<i32>>,
    forbidden_by_y: HashMap<i32, Vec<i32>>,
}

impl PropagatorConstructor for NegativeBinaryTableArgs {
    type PropagatorImpl = NegativeBinaryTablePropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let _ = context.register(self.x, DomainEvents::ASSIGN, LocalId::from(0));
        let _ = context.register(self.y, DomainEvents::ASSIGN, LocalId::from(1));

        let mut forbidden_by_x: HashMap<i32, Vec<i32>> = HashMap::default();
        let mut forbidden_by_y: HashMap<i32, Vec<i32>> = HashMap::default();
        for &(a, b) in &self.forbidden {
            forbidden_by_x.entry(a).or_default().push(b);
            forbidden_by_y.entry(b).or_default().push(a);
        }

        NegativeBinaryTablePropagator {
            x: self.x,
            y: self.y,
            forbidden_by_x,
            forbidden_by_y,
        }
    }
}

impl Propagator for NegativeBinaryTablePropagator {
    fn name(&self) -> &str {
        "NegativeBinaryTable"
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        if context.is_fixed(self.x) {
            if let Some(banned) = self.forbidden_by_x.get(&context.assigned_value(self.x)) {
                for &value in banned {
                    context.remove_value(self.y, value)?;
                }
            }
        }
        if context.is_fixed(self.y) {
            if let Some(banned) = self.forbidden_by_y.get(&context.assigned_value(self.y)) {
                for &value in banned {
                    context.remove_value(self.x, value)?;
                }
            }
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if context.is_fixed(self.x) && context.is_fixed(self.y) {
            let pair_is_forbidden = self
                .forbidden_by_x
                .get(&context.assigned_value(self.x))
                .is_some_and(|banned| banned.contains(&context.assigned_value(self.y)));
            if pair_is_forbidden {
                return Entailment::False;
            }
            return Entailment::True;
        }
        Entailment::Unknown
    }
}

/// Restricts a tuple of variables to a set of allowed assignments.
///
/// Grouping identical crops uses this with one allowed tuple per run of
/// consecutive adjacent beds. Filtering is arc-consistent: a value survives
/// only while some allowed tuple supports it within the current domains.
#[derive(Debug)]
pub struct PositiveTableArgs {
    pub variables: Box<[DomainId]>,
    pub tuples: Vec<Vec<i32>>,
}

#[derive(Debug)]
pub struct PositiveTablePropagator {
    variables: Box<[DomainId]>,
    tuples: Vec<Vec<i32>>,
}

impl PropagatorConstructor for PositiveTableArgs {
    type PropagatorImpl = PositiveTablePropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for (index, &variable) in self.variables.iter().enumerate() {
            let _ = context.register(variable, DomainEvents::ANY_INT, LocalId::from(index as u32));
        }
        PositiveTablePropagator {
            variables: self.variables,
            tuples: self.tuples,
        }
    }
}

impl PositiveTablePropagator {
    fn tuple_is_supported(&self, context: &PropagationContextMut<'_>, tuple: &[i32]) -> bool {
        self.variables
            .iter()
            .zip(tuple)
            .all(|(&var, &value)| context.contains(var, value))
    }
}

impl Propagator for PositiveTablePropagator {
    fn name(&self) -> &str {
        "PositiveTable"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        let supported: Vec<&Vec<i32>> = self
            .tuples
            .iter()
            .filter(|tuple| self.tuple_is_supported(context, tuple))
            .collect();
        if supported.is_empty() {
            return Err(Inconsistency::Conflict);
        }

        for (index, &variable) in self.variables.iter().enumerate() {
            let mut supported_values: HashSet<i32> = HashSet::default();
            for tuple in &supported {
                supported_values.insert(tuple[index]);
            }
            for value in context.domain_values(variable) {
                if !supported_values.contains(&value) {
                    context.remove_value(variable, value)?;
                }
            }
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        if !self.variables.iter().all(|&var| context.is_fixed(var)) {
            return Entailment::Unknown;
        }
        let assignment: Vec<i32> = self
            .variables
            .iter()
            .map(|&var| context.assigned_value(var))
            .collect();
        if self.tuples.contains(&assignment) {
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
    fn negative_table_prunes_pairs_of_a_fixed_value() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 3);
        let y = solver.new_variable(1, 3);

        solver
            .new_propagator(NegativeBinaryTableArgs {
                x,
                y,
                forbidden: vec![(2, 1), (2, 2)],
            })
            .unwrap();
        solver.assign(x, 2).unwrap();

        solver.assert_domain(y, &[3]);
    }

    #[test]
    fn positive_table_keeps_only_supported_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 4);
        let y = solver.new_variable(1, 4);

        solver
            .new_propagator(PositiveTableArgs {
                variables: Box::new([x, y]),
                tuples: vec![vec![1, 2], vec![2, 3], vec![3, 4]],
            })
            .unwrap();

        solver.assert_domain(x, &[1, 2, 3]);
        solver.assert_domain(y, &[2, 3, 4]);
    }

    #[test]
    fn positive_table_restores_arc_consistency_after_pruning() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 4);
        let y = solver.new_variable(1, 4);

        solver
            .new_propagator(PositiveTableArgs {
                variables: Box::new([x, y]),
                tuples: vec![vec![1, 2], vec![2, 3], vec![3, 4]],
            })
            .unwrap();
        solver.remove(y, 3).unwrap();

        solver.assert_domain(x, &[1, 3]);
        solver.assert_domain(y, &[2, 4]);
    }

    #[test]
    fn positive_table_without_supported_tuples_conflicts() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(5, 6);
        let y = solver.new_variable(5, 6);

        assert!(solver
            .new_propagator(PositiveTableArgs {
                variables: Box::new([x, y]),
                tuples: vec![vec![1, 2]],
            })
            .is_err());
    }
}
