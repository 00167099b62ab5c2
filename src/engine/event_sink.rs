use enumset::EnumSet;

use super::domain_events::IntDomainEvent;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;

/// While a propagator runs, the domain changes it performs are captured here as
/// events. When the propagator finishes, the sink is drained to notify the
/// propagators that subscribe to those events.
///
/// Duplicate events for the same domain are ignored.
#[derive(Default, Debug)]
pub(crate) struct EventSink {
    present: KeyedVec<DomainId, EnumSet<IntDomainEvent>>,
    events: Vec<(IntDomainEvent, DomainId)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(&mut self, event: IntDomainEvent, domain: DomainId) {
        let elem = &mut self.present[domain];

        if elem.contains(event) {
            return;
        }

        let _ = elem.insert(event);
        self.events.push((event, domain));
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (IntDomainEvent, DomainId)> + '_ {
        self.events.drain(..).inspect(|&(event, domain)| {
            let _ = self.present[domain].remove(event);
        })
    }
}
