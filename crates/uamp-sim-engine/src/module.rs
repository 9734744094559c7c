//! The [`SimModule`] lifecycle contract and module type registry.

use std::io::Write;

use uamp_sim_common::{Event, ModuleError, SimError};

use crate::simulator::SimContext;

/// The kind of analysis a module performs, used to look up "the"
/// module of a given kind (e.g. whichever preload predictor is
/// registered) without knowing its configured name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimModuleType {
    PreloadPredictor,
    ReusePredictor,
    MemoryManager,
    FrequencyCounter,
}

impl SimModuleType {
    pub fn wire_name(self) -> &'static str {
        match self {
            SimModuleType::PreloadPredictor => "preload-predictor",
            SimModuleType::ReusePredictor => "reuse-predictor",
            SimModuleType::MemoryManager => "memory-manager",
            SimModuleType::FrequencyCounter => "frequency-counter",
        }
    }
}

/// Tracks whether a module is currently accumulating statistics.
///
/// Embedded by modules rather than duplicated per implementation; the
/// engine flips this once, via the warmup alarm, and leaves it alone
/// afterward.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsGate {
    collecting: bool,
}

impl StatsGate {
    pub fn enable(&mut self) {
        self.collecting = true;
    }

    pub fn disable(&mut self) {
        self.collecting = false;
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting
    }
}

/// The contract every pluggable simulation module implements:
/// `build` once at startup, any number of `handle_event`/`handle_alarm`
/// calls while the run is in progress, then `print_stats` followed by
/// `finish` exactly once at the end. Calling `finish` a second time is
/// not supported.
pub trait SimModule {
    fn name(&self) -> &str;

    fn module_type(&self) -> SimModuleType;

    /// Subscribe to events, register alarms, and perform any other
    /// one-time setup. Called once per module before the run starts.
    fn build(&mut self, ctx: &mut SimContext<'_>) -> Result<(), ModuleError>;

    /// Handle a dispatched event. The default implementation ignores
    /// every event; modules that only care about alarms need not
    /// override it.
    #[allow(unused_variables)]
    fn handle_event(&mut self, event: &Event, ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        Ok(())
    }

    /// Handle an alarm this module registered, identified by the name
    /// it was given at registration time.
    #[allow(unused_variables)]
    fn handle_alarm(&mut self, alarm_name: &str, ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        Ok(())
    }

    fn enable_stats_collection(&mut self);

    fn disable_stats_collection(&mut self);

    /// Write this module's accumulated statistics. Called once, after
    /// the run completes and before `finish`.
    fn print_stats(&self, out: &mut dyn Write) -> std::io::Result<()>;

    /// Release any resources held by the module. Called exactly once,
    /// after `print_stats`.
    fn finish(&mut self) -> Result<(), ModuleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_gate_starts_disabled() {
        let gate = StatsGate::default();
        assert!(!gate.is_collecting());
    }

    #[test]
    fn stats_gate_enable_disable() {
        let mut gate = StatsGate::default();
        gate.enable();
        assert!(gate.is_collecting());
        gate.disable();
        assert!(!gate.is_collecting());
    }

    #[test]
    fn module_type_wire_names() {
        assert_eq!(SimModuleType::PreloadPredictor.wire_name(), "preload-predictor");
        assert_eq!(SimModuleType::FrequencyCounter.wire_name(), "frequency-counter");
    }
}
