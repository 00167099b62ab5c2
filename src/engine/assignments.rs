use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::engine::domain_events::IntDomainEvent;
use crate::engine::event_sink::EventSink;
use crate::engine::variables::DomainId;

/// The error returned when a domain operation wipes out every value. The
/// caller is expected to trigger backtracking; all changes made up to the
/// failure are on the trail and will be undone with the rest of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The current domain of every integer variable, together with the trail
/// needed to restore them on backtracking.
///
/// A domain is a pair of bounds plus explicit holes over the initial range.
/// The bounds are always non-removed values while the domain is non-empty.
#[derive(Default, Debug)]
pub struct Assignments {
    trail: Trail<DomainChange>,
    domains: KeyedVec<DomainId, IntegerDomain>,
    events: EventSink,
}

#[derive(Clone, Copy, Debug)]
enum DomainChange {
    LowerBound {
        domain: DomainId,
        old_bound: i32,
        old_size: u32,
    },
    UpperBound {
        domain: DomainId,
        old_bound: i32,
        old_size: u32,
    },
    Removal {
        domain: DomainId,
        value: i32,
    },
}

#[derive(Clone, Debug)]
struct IntegerDomain {
    lower_bound: i32,
    upper_bound: i32,
    initial_lower_bound: i32,
    /// Hole flags for every value of the initial range.
    is_removed: Vec<bool>,
    /// Number of non-removed values between the bounds.
    size: u32,
}

impl IntegerDomain {
    fn new(lower_bound: i32, upper_bound: i32) -> Self {
        let width = (upper_bound - lower_bound + 1) as usize;
        IntegerDomain {
            lower_bound,
            upper_bound,
            initial_lower_bound: lower_bound,
            is_removed: vec![false; width],
            size: width as u32,
        }
    }

    fn has_hole(&self, value: i32) -> bool {
        self.is_removed[(value - self.initial_lower_bound) as usize]
    }

    fn contains(&self, value: i32) -> bool {
        value >= self.lower_bound && value <= self.upper_bound && !self.has_hole(value)
    }
}

impl Assignments {
    /// Create a new domain over the inclusive range `[lower_bound, upper_bound]`.
    pub fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        assert!(lower_bound <= upper_bound, "cannot create an empty domain");

        self.events.grow();
        self.domains.push(IntegerDomain::new(lower_bound, upper_bound))
    }

    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub fn domains(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    pub fn lower_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].lower_bound
    }

    pub fn upper_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].upper_bound
    }

    pub fn is_fixed(&self, domain: DomainId) -> bool {
        let d = &self.domains[domain];
        d.lower_bound == d.upper_bound
    }

    /// The value of a fixed domain.
    pub fn assigned_value(&self, domain: DomainId) -> i32 {
        debug_assert!(self.is_fixed(domain));
        self.domains[domain].lower_bound
    }

    pub fn contains(&self, domain: DomainId, value: i32) -> bool {
        self.domains[domain].contains(value)
    }

    pub fn domain_size(&self, domain: DomainId) -> u32 {
        self.domains[domain].size
    }

    /// The non-removed values between the bounds, in increasing order.
    pub fn domain_values(&self, domain: DomainId) -> Vec<i32> {
        let d = &self.domains[domain];
        (d.lower_bound..=d.upper_bound)
            .filter(|&value| !d.has_hole(value))
            .collect()
    }

    pub fn tighten_lower_bound(
        &mut self,
        domain: DomainId,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        let d = &mut self.domains[domain];
        if bound <= d.lower_bound {
            return Ok(());
        }

        let old_bound = d.lower_bound;
        let old_size = d.size;

        // Normalise the new bound to the next non-removed value.
        let mut new_bound = bound;
        while new_bound <= d.upper_bound && d.has_hole(new_bound) {
            new_bound += 1;
        }

        let mut lost = 0;
        let mut value = old_bound;
        while value < new_bound && value <= d.upper_bound {
            if !d.has_hole(value) {
                lost += 1;
            }
            value += 1;
        }

        d.lower_bound = new_bound;
        d.size = old_size - lost;

        self.trail.push(DomainChange::LowerBound {
            domain,
            old_bound,
            old_size,
        });
        self.events.event_occurred(IntDomainEvent::LowerBound, domain);

        if d.lower_bound > d.upper_bound {
            return Err(EmptyDomain);
        }
        if d.lower_bound == d.upper_bound {
            self.events.event_occurred(IntDomainEvent::Assign, domain);
        }
        Ok(())
    }

    pub fn tighten_upper_bound(
        &mut self,
        domain: DomainId,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        let d = &mut self.domains[domain];
        if bound >= d.upper_bound {
            return Ok(());
        }

        let old_bound = d.upper_bound;
        let old_size = d.size;

        let mut new_bound = bound;
        while new_bound >= d.lower_bound && d.has_hole(new_bound) {
            new_bound -= 1;
        }

        let mut lost = 0;
        let mut value = old_bound;
        while value > new_bound && value >= d.lower_bound {
            if !d.has_hole(value) {
                lost += 1;
            }
            value -= 1;
        }

        d.upper_bound = new_bound;
        d.size = old_size - lost;

        self.trail.push(DomainChange::UpperBound {
            domain,
            old_bound,
            old_size,
        });
        self.events.event_occurred(IntDomainEvent::UpperBound, domain);

        if d.lower_bound > d.upper_bound {
            return Err(EmptyDomain);
        }
        if d.lower_bound == d.upper_bound {
            self.events.event_occurred(IntDomainEvent::Assign, domain);
        }
        Ok(())
    }

    pub fn remove_value(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        if !self.domains[domain].contains(value) {
            return Ok(());
        }

        // A removal at either bound is a bound tightening.
        if value == self.domains[domain].lower_bound {
            self.events.event_occurred(IntDomainEvent::Removal, domain);
            return self.tighten_lower_bound(domain, value + 1);
        }
        if value == self.domains[domain].upper_bound {
            self.events.event_occurred(IntDomainEvent::Removal, domain);
            return self.tighten_upper_bound(domain, value - 1);
        }

        let d = &mut self.domains[domain];
        let index = (value - d.initial_lower_bound) as usize;
        d.is_removed[index] = true;
        d.size -= 1;

        self.trail.push(DomainChange::Removal { domain, value });
        self.events.event_occurred(IntDomainEvent::Removal, domain);
        Ok(())
    }

    pub fn make_assignment(&mut self, domain: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.tighten_lower_bound(domain, value)?;
        self.tighten_upper_bound(domain, value)
    }

    pub(crate) fn drain_domain_events(&mut self) -> Vec<(IntDomainEvent, DomainId)> {
        self.events.drain().collect()
    }

    pub(crate) fn increase_decision_level(&mut self) {
        self.trail.new_level();
    }

    pub fn get_decision_level(&self) -> usize {
        self.trail.level()
    }

    /// Undo all changes made past `target_level`.
    pub(crate) fn synchronise(&mut self, target_level: usize) {
        let undone: Vec<DomainChange> = self.trail.synchronise(target_level).collect();
        for change in undone {
            match change {
                DomainChange::LowerBound {
                    domain,
                    old_bound,
                    old_size,
                } => {
                    let d = &mut self.domains[domain];
                    d.lower_bound = old_bound;
                    d.size = old_size;
                }
                DomainChange::UpperBound {
                    domain,
                    old_bound,
                    old_size,
                } => {
                    let d = &mut self.domains[domain];
                    d.upper_bound = old_bound;
                    d.size = old_size;
                }
                DomainChange::Removal { domain, value } => {
                    let d = &mut self.domains[domain];
                    let index = (value - d.initial_lower_bound) as usize;
                    d.is_removed[index] = false;
                    d.size += 1;
                }
            }
        }
        // Events recorded by the undone level are stale.
        let _ = self.drain_domain_events();
    }

    /// The assigned value of every domain. Only meaningful when all domains
    /// are fixed.
    pub(crate) fn snapshot_values(&self) -> KeyedVec<DomainId, i32> {
        let mut values = KeyedVec::default();
        for domain in self.domains.keys() {
            let _ = values.push(self.assigned_value(domain));
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_a_fresh_domain() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 5);

        assert_eq!(1, assignments.lower_bound(domain));
        assert_eq!(5, assignments.upper_bound(domain));
        assert_eq!(5, assignments.domain_size(domain));
        assert!(!assignments.is_fixed(domain));
    }

    #[test]
    fn tightening_over_a_hole_skips_to_the_next_present_value() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 5);

        assignments.remove_value(domain, 3).unwrap();
        assignments.tighten_lower_bound(domain, 3).unwrap();

        assert_eq!(4, assignments.lower_bound(domain));
        assert_eq!(2, assignments.domain_size(domain));
    }

    #[test]
    fn removing_the_lower_bound_moves_it_up() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 5);

        assignments.remove_value(domain, 2).unwrap();
        assignments.remove_value(domain, 1).unwrap();

        assert_eq!(3, assignments.lower_bound(domain));
        assert_eq!(vec![3, 4, 5], assignments.domain_values(domain));
    }

    #[test]
    fn assigning_to_a_removed_value_fails() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 5);

        assignments.remove_value(domain, 3).unwrap();

        assert_eq!(Err(EmptyDomain), assignments.make_assignment(domain, 3));
    }

    #[test]
    fn backtracking_restores_bounds_holes_and_size() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 10);

        assignments.increase_decision_level();
        assignments.remove_value(domain, 4).unwrap();
        assignments.tighten_lower_bound(domain, 6).unwrap();
        assignments.tighten_upper_bound(domain, 8).unwrap();

        assert_eq!(3, assignments.domain_size(domain));

        assignments.synchronise(0);

        assert_eq!(1, assignments.lower_bound(domain));
        assert_eq!(10, assignments.upper_bound(domain));
        assert_eq!(10, assignments.domain_size(domain));
        assert!(assignments.contains(domain, 4));
    }

    #[test]
    fn an_assignment_produces_the_assign_event() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 3);

        assignments.make_assignment(domain, 2).unwrap();

        let events = assignments.drain_domain_events();
        assert!(events.contains(&(IntDomainEvent::Assign, domain)));
        assert!(events.contains(&(IntDomainEvent::LowerBound, domain)));
        assert!(events.contains(&(IntDomainEvent::UpperBound, domain)));
    }

    #[test]
    fn wiping_the_domain_reports_empty() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(1, 3);

        assert_eq!(Err(EmptyDomain), assignments.tighten_lower_bound(domain, 7));
    }
}
