use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A concrete change to an integer domain.
#[derive(Debug, EnumSetType)]
pub enum IntDomainEvent {
    /// The domain became a singleton.
    Assign,
    /// The lower bound increased.
    LowerBound,
    /// The upper bound decreased.
    UpperBound,
    /// A value strictly within the bounds was removed.
    Removal,
}

/// The set of domain events a propagator subscribes a variable to.
#[derive(Debug, Clone, Copy)]
pub struct DomainEvents {
    int_events: EnumSet<IntDomainEvent>,
}

impl DomainEvents {
    /// Any change to the domain.
    pub const ANY_INT: DomainEvents = DomainEvents::new(enum_set!(
        IntDomainEvent::Assign
            | IntDomainEvent::LowerBound
            | IntDomainEvent::UpperBound
            | IntDomainEvent::Removal
    ));
    /// Bound changes, including assignment.
    pub const BOUNDS: DomainEvents = DomainEvents::new(enum_set!(
        IntDomainEvent::Assign | IntDomainEvent::LowerBound | IntDomainEvent::UpperBound
    ));
    /// Assignment only.
    pub const ASSIGN: DomainEvents = DomainEvents::new(enum_set!(IntDomainEvent::Assign));

    const fn new(int_events: EnumSet<IntDomainEvent>) -> Self {
        DomainEvents { int_events }
    }

    pub(crate) fn int_events(&self) -> EnumSet<IntDomainEvent> {
        self.int_events
    }
}
