//! Event dispatch: the engine reports state transitions, it never
//! decides what to do about them.

use std::sync::Mutex;
use uuid::Uuid;

/// A state transition the engine reports to an injected observer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SafeModeEnabled,
    SafeModeDisabled,
    ObjectStored(Uuid),
    ObjectLoaded(Uuid),
    ObjectDeleted(Uuid),
    ObjectExpired(Uuid),
    LockTimeout(Uuid),
}

/// Observer for engine events. Constructor-injected into the façade,
/// matching the rest of the engine's dependency-injection style: no
/// process-global subscriber list.
pub trait EventSink: Send + Sync {
    fn handle(&self, event: Event);
}

/// Discards every event. The façade's default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn handle(&self, _event: Event) {}
}

/// Collects every event in order, for test assertions.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn handle(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_preserves_dispatch_order() {
        let sink = CollectingSink::new();
        sink.handle(Event::SafeModeEnabled);
        sink.handle(Event::ObjectStored(Uuid::nil()));
        assert_eq!(
            sink.events(),
            vec![Event::SafeModeEnabled, Event::ObjectStored(Uuid::nil())]
        );
    }

    #[test]
    fn noop_sink_accepts_events_without_panicking() {
        NoopSink.handle(Event::SafeModeDisabled);
    }
}
