//! The pub/sub dispatch fabric: event-type-keyed listener lists with
//! optional predicate filters.

use std::collections::HashMap;

use uamp_sim_common::{Event, EventType};

struct Listener {
    module_id: usize,
    filter: Option<Box<dyn Fn(&Event) -> bool>>,
}

/// Maps event types to the modules subscribed to them, in registration
/// order, each with an optional filter predicate.
#[derive(Default)]
pub(crate) struct Dispatcher {
    listeners: HashMap<EventType, Vec<Listener>>,
}

impl Dispatcher {
    pub fn subscribe(
        &mut self,
        event_type: EventType,
        module_id: usize,
        filter: Option<Box<dyn Fn(&Event) -> bool>>,
    ) {
        self.listeners
            .entry(event_type)
            .or_default()
            .push(Listener { module_id, filter });
    }

    /// Module ids subscribed to `event`'s type whose filter (if any)
    /// accepts it, in registration order.
    pub fn matching_listeners(&self, event: &Event) -> Vec<usize> {
        self.listeners
            .get(&event.event_type())
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| {
                        listener
                            .filter
                            .as_ref()
                            .map_or(true, |filter| filter(event))
                    })
                    .map(|listener| listener.module_id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uamp_sim_common::{EventPayload, ScreenState, Timestamp};

    fn event(payload: EventPayload) -> Event {
        Event::new(Timestamp::parse("2020-01-01T00:00:00Z").unwrap(), payload)
    }

    #[test]
    fn unfiltered_listener_always_matches() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(EventType::Screen, 0, None);
        let e = event(EventPayload::Screen {
            state: ScreenState::Off,
        });
        assert_eq!(dispatcher.matching_listeners(&e), vec![0]);
    }

    #[test]
    fn filter_excludes_non_matching_events() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(
            EventType::Screen,
            0,
            Some(Box::new(|e: &Event| {
                matches!(
                    e.payload,
                    EventPayload::Screen {
                        state: ScreenState::UserPresent
                    }
                )
            })),
        );
        let off = event(EventPayload::Screen {
            state: ScreenState::Off,
        });
        let present = event(EventPayload::Screen {
            state: ScreenState::UserPresent,
        });
        assert!(dispatcher.matching_listeners(&off).is_empty());
        assert_eq!(dispatcher.matching_listeners(&present), vec![0]);
    }

    #[test]
    fn listeners_preserve_registration_order() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.subscribe(EventType::Screen, 2, None);
        dispatcher.subscribe(EventType::Screen, 0, None);
        dispatcher.subscribe(EventType::Screen, 1, None);
        let e = event(EventPayload::Screen {
            state: ScreenState::On,
        });
        assert_eq!(dispatcher.matching_listeners(&e), vec![2, 0, 1]);
    }
}
