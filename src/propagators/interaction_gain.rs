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
use crate::model::interval::max_distance;
use crate::model::interval::min_distance;
use crate::model::interval::range_intersection;

/// Bounds the number of realized positive interactions: `gain` counts the
/// pairs of beneficial crops placed on adjacent beds.
///
/// The lower bound counts pairs whose bound ranges force a distance of at
/// most one, the upper bound the pairs that can still achieve it. When the
/// demanded gain reaches that upper bound, every achievable pair is filtered
/// down to mutually adjacent values.
#[derive(Debug)]
pub struct InteractionGainArgs {
    pub gain: DomainId,
    pub pairs: Box<[(DomainId, DomainId)]>,
}

#[derive(Debug)]
pub struct InteractionGainPropagator {
    gain: DomainId,
    pairs: Box<[(DomainId, DomainId)]>,
}

impl PropagatorConstructor for InteractionGainArgs {
    type PropagatorImpl = InteractionGainPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let _ = context.register(self.gain, DomainEvents::BOUNDS, LocalId::from(0));
        for (index, &(a, b)) in self.pairs.iter().enumerate() {
            let _ = context.register(
                a,
                DomainEvents::ANY_INT,
                LocalId::from(1 + 2 * index as u32),
            );
            let _ = context.register(
                b,
                DomainEvents::ANY_INT,
                LocalId::from(2 + 2 * index as u32),
            );
        }
        InteractionGainPropagator {
            gain: self.gain,
            pairs: self.pairs,
        }
    }
}

/// Restricts `x` to values with a neighbor (`v + 1` or `v - 1`) in the domain
/// of `y`, and `y` to the neighbors collected that way.
pub(super) fn prune_to_adjacent_support(
    context: &mut PropagationContextMut<'_>,
    x: DomainId,
    y: DomainId,
) -> PropagationStatusCP {
    let mut remove_from_x = Vec::new();
    let mut keep_in_y = Vec::new();
    for v in context.domain_values(x) {
        let plus1 = context.contains(y, v + 1);
        let minus1 = context.contains(y, v - 1);
        if plus1 {
            keep_in_y.push(v + 1);
        }
        if minus1 {
            keep_in_y.push(v - 1);
        }
        if !plus1 && !minus1 {
            remove_from_x.push(v);
        }
    }
    for v in remove_from_x {
        context.remove_value(x, v)?;
    }
    for v in context.domain_values(y) {
        if !keep_in_y.contains(&v) {
            context.remove_value(y, v)?;
        }
    }
    Ok(())
}

impl InteractionGainPropagator {
    fn pair_bounds(&self, context: &PropagationContextMut<'_>) -> (i32, i32) {
        let mut lb = 0;
        let mut ub = 0;
        for &(a, b) in self.pairs.iter() {
            let (lb_a, ub_a) = (context.lower_bound(a), context.upper_bound(a));
            let (lb_b, ub_b) = (context.lower_bound(b), context.upper_bound(b));
            if max_distance(lb_a, ub_a, lb_b, ub_b) <= 1 {
                lb += 1;
                ub += 1;
            } else if min_distance(lb_a, ub_a, lb_b, ub_b) <= 1 {
                // Disjoint bound ranges at distance one realize the pair with
                // extremal values. Intersecting ranges need a supported value,
                // checked by enumerating the smaller domain.
                if range_intersection(lb_a, ub_a, lb_b, ub_b).is_none() {
                    ub += 1;
                } else {
                    let (x, y) = if context.domain_size(a) <= context.domain_size(b) {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    let supported = context
                        .domain_values(x)
                        .iter()
                        .any(|&v| context.contains(y, v + 1) || context.contains(y, v - 1));
                    if supported {
                        ub += 1;
                    }
                }
            }
        }
        (lb, ub)
    }
}

impl Propagator for InteractionGainPropagator {
    fn name(&self) -> &str {
        "InteractionGain"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        let (lb, ub) = self.pair_bounds(context);
        context.set_lower_bound(self.gain, lb)?;
        context.set_upper_bound(self.gain, ub)?;

        if context.lower_bound(self.gain) > lb && context.lower_bound(self.gain) == ub {
            // Every still achievable pair has to be realized.
            for index in 0..self.pairs.len() {
                let (a, b) = self.pairs[index];
                let (lb_a, ub_a) = (context.lower_bound(a), context.upper_bound(a));
                let (lb_b, ub_b) = (context.lower_bound(b), context.upper_bound(b));
                if min_distance(lb_a, ub_a, lb_b, ub_b) <= 1 {
                    let (x, y) = if context.domain_size(a) <= context.domain_size(b) {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    prune_to_adjacent_support(context, x, y)?;
                }
            }
            let (lb, ub) = self.pair_bounds(context);
            context.set_lower_bound(self.gain, lb)?;
            context.set_upper_bound(self.gain, ub)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext<'_>) -> Entailment {
        let all_fixed = context.is_fixed(self.gain)
            && self
                .pairs
                .iter()
                .all(|&(a, b)| context.is_fixed(a) && context.is_fixed(b));
        if !all_fixed {
            return Entailment::Unknown;
        }
        let realized = self
            .pairs
            .iter()
            .filter(|&&(a, b)| {
                (context.assigned_value(a) - context.assigned_value(b)).abs() == 1
            })
            .count() as i32;
        if context.assigned_value(self.gain) == realized {
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
    fn gain_bounds_follow_the_pair_distances() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(1, 1);
        let b = solver.new_variable(2, 2);
        let c = solver.new_variable(1, 1);
        let d = solver.new_variable(5, 9);
        let gain = solver.new_variable(0, 10);

        solver
            .new_propagator(InteractionGainArgs {
                gain,
                pairs: Box::new([(a, b), (c, d)]),
            })
            .unwrap();

        // The first pair is forced adjacent, the second is out of reach.
        solver.assert_bounds(gain, 1, 1);
    }

    #[test]
    fn an_achievable_pair_only_raises_the_upper_bound() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(1, 3);
        let b = solver.new_variable(1, 3);
        let gain = solver.new_variable(0, 10);

        solver
            .new_propagator(InteractionGainArgs {
                gain,
                pairs: Box::new([(a, b)]),
            })
            .unwrap();

        solver.assert_bounds(gain, 0, 1);
    }

    #[test]
    fn demanding_the_upper_bound_filters_to_adjacent_values() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(10, 10);
        let b = solver.new_variable(11, 11);
        let c = solver.new_variable(1, 2);
        let d = solver.new_variable(1, 4);
        let gain = solver.new_variable(0, 10);

        solver
            .new_propagator(InteractionGainArgs {
                gain,
                pairs: Box::new([(a, b), (c, d)]),
            })
            .unwrap();
        solver.set_lower_bound(gain, 2).unwrap();

        // Bed 4 has no neighbor left in the domain of c.
        solver.assert_domain(d, &[1, 2, 3]);
    }

    #[test]
    fn an_unreachable_demanded_gain_conflicts() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(1, 1);
        let b = solver.new_variable(5, 9);
        let gain = solver.new_variable(1, 10);

        assert!(solver
            .new_propagator(InteractionGainArgs {
                gain,
                pairs: Box::new([(a, b)]),
            })
            .is_err());
    }
}
