//! The frequency counter: a diagnostic module that tallies how many
//! times each event type was dispatched over the run, with no
//! filtering or policy of its own.

use std::collections::BTreeMap;
use std::io::Write;

use uamp_sim_common::{Event, EventType, ModuleError, SimError};
use uamp_sim_engine::{SimContext, SimModule, SimModuleType, StatsGate};

/// Tallies dispatched events by [`EventType`]. Useful on its own as a
/// sanity check on a trace, and as the simplest possible example of
/// the [`SimModule`] contract.
pub struct FrequencyCounter {
    name: String,
    gate: StatsGate,
    // BTreeMap keeps `print_stats` output in a stable, taxonomy-ish
    // order rather than hash-iteration order.
    counts: BTreeMap<EventType, u64>,
}

impl FrequencyCounter {
    pub fn new(name: impl Into<String>) -> Self {
        FrequencyCounter {
            name: name.into(),
            gate: StatsGate::default(),
            counts: BTreeMap::new(),
        }
    }

    fn count(&mut self, event: &Event) {
        if self.gate.is_collecting() {
            *self.counts.entry(event.event_type()).or_insert(0) += 1;
        }
    }
}

impl SimModule for FrequencyCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_type(&self) -> SimModuleType {
        SimModuleType::FrequencyCounter
    }

    fn build(&mut self, ctx: &mut SimContext<'_>) -> Result<(), ModuleError> {
        for &event_type in EventType::ALL {
            ctx.subscribe(event_type, None);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, _ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        self.count(event);
        Ok(())
    }

    fn enable_stats_collection(&mut self) {
        self.gate.enable();
    }

    fn disable_stats_collection(&mut self) {
        self.gate.disable();
    }

    fn print_stats(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for (event_type, count) in &self.counts {
            writeln!(out, "{}: {}", event_type.wire_name(), count)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ModuleError> {
        Ok(())
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
    fn counts_only_while_collecting() {
        let mut counter = FrequencyCounter::new("freq");
        let screen_on = event(EventPayload::Screen {
            state: ScreenState::On,
        });
        counter.count(&screen_on);
        assert!(counter.counts.is_empty());

        counter.enable_stats_collection();
        counter.count(&screen_on);
        assert_eq!(counter.counts.get(&EventType::Screen), Some(&1));
    }

    #[test]
    fn tallies_increment_per_event_type() {
        let mut counter = FrequencyCounter::new("freq");
        counter.enable_stats_collection();
        let screen = event(EventPayload::Screen {
            state: ScreenState::On,
        });
        let launch = event(EventPayload::AppLaunch {
            app_id: "com.example.app".into(),
        });
        counter.count(&screen);
        counter.count(&screen);
        counter.count(&launch);
        assert_eq!(counter.counts.get(&EventType::Screen), Some(&2));
        assert_eq!(counter.counts.get(&EventType::AppLaunch), Some(&1));
    }

    #[test]
    fn print_stats_lists_wire_names() {
        let mut counter = FrequencyCounter::new("freq");
        counter.enable_stats_collection();
        counter.count(&event(EventPayload::AppLaunch {
            app_id: "com.example.app".into(),
        }));
        let mut buf = Vec::new();
        counter.print_stats(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "app.launch: 1\n");
    }
}
