//! Module factory and top-level wiring for the `uamp-sim` binary.
//!
//! Everything here is glue: parse a config file, build a [`Simulator`],
//! construct and register the modules it names, and run it. The engine
//! itself knows nothing about `uamp-sim-config`, `uamp-sim-modules`, or
//! `clap` — this crate is where those pieces meet.

use tracing::warn;

use uamp_sim_common::{ModuleError, SimError};
use uamp_sim_config::{CliArgs, ModuleSettings, SimulatorConfig};
use uamp_sim_engine::Simulator;
use uamp_sim_modules::{FrequencyCounter, PreloadPredictor, PreloadPredictorConfig};

/// Construct the named module, or `None` if the name isn't recognized.
///
/// Matches `original_source/sim_modules/__init__.py::get_simulator_module`,
/// generalized to return a typed error for a module whose settings are
/// present but malformed rather than panicking on a bad `int()`/`float()`
/// parse the way the original does.
pub fn build_module(
    module_name: &str,
    settings: &ModuleSettings,
) -> Result<Option<Box<dyn uamp_sim_engine::SimModule>>, ModuleError> {
    match module_name {
        "preload-predictor" => {
            let interval_hours = settings
                .get("interval_time")
                .map(|v| v.parse::<u32>())
                .transpose()
                .map_err(|_| {
                    ModuleError::BuildFailed(
                        module_name.to_string(),
                        "interval_time must be a positive integer".to_string(),
                    )
                })?
                .unwrap_or(6);
            if interval_hours == 0 || 24 % interval_hours != 0 {
                return Err(ModuleError::BuildFailed(
                    module_name.to_string(),
                    format!("interval_time {interval_hours} must evenly divide 24"),
                ));
            }
            let depreciation = settings
                .get("depreciation")
                .map(|v| v.parse::<f64>())
                .transpose()
                .map_err(|_| {
                    ModuleError::BuildFailed(
                        module_name.to_string(),
                        "depreciation must be a number".to_string(),
                    )
                })?
                .unwrap_or(0.5);
            let config = PreloadPredictorConfig {
                interval_hours,
                depreciation,
            };
            Ok(Some(Box::new(PreloadPredictor::new(module_name, config))))
        }
        "frequency-counter" => Ok(Some(Box::new(FrequencyCounter::new(module_name)))),
        _ => Ok(None),
    }
}

/// Load configuration, attach the trace, and register every configured
/// module, leaving the simulator ready for [`Simulator::run`].
///
/// Mirrors `original_source/uamp_sim.py::Simulator.build`: trace is
/// attached (which adopts its start time) before modules are
/// registered, and every module's `build` runs only after all modules
/// are registered.
pub fn build_simulator(args: &CliArgs) -> Result<Simulator, SimError> {
    let config = SimulatorConfig::load(&args.sim_config)?;

    let mut sim = Simulator::new();
    sim.set_verbose(args.verbose);
    sim.set_debug_mode(args.debug);
    sim.set_warmup_period(config.warmup_period);

    let trace = uamp_sim_trace::open_trace(&args.trace)?;
    sim.attach_trace(trace)?;

    for module_name in &config.modules {
        let settings = config.settings_for(module_name);
        match build_module(module_name, &settings)? {
            Some(module) => sim.register(module, false)?,
            None => {
                warn!(module = %module_name, "no module registered for this name, skipping");
            }
        }
    }

    sim.build_modules()?;
    Ok(sim)
}

/// Build and run a simulation from parsed CLI arguments. The sole
/// entry point `main` calls.
pub fn run(args: CliArgs) -> Result<(), SimError> {
    uamp_sim_metrics::describe_metrics();
    let mut sim = build_simulator(&args)?;
    sim.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_module_rejects_unknown_name() {
        let settings = ModuleSettings::new();
        let module = build_module("not-a-real-module", &settings).unwrap();
        assert!(module.is_none());
    }

    #[test]
    fn build_module_constructs_preload_predictor_with_defaults() {
        let settings = ModuleSettings::new();
        let module = build_module("preload-predictor", &settings).unwrap();
        assert!(module.is_some());
    }

    #[test]
    fn build_module_constructs_frequency_counter() {
        let settings = ModuleSettings::new();
        let module = build_module("frequency-counter", &settings).unwrap();
        assert!(module.is_some());
    }

    #[test]
    fn build_module_rejects_interval_that_does_not_divide_a_day() {
        let mut settings = ModuleSettings::new();
        settings.insert("interval_time".to_string(), "5".to_string());
        settings.insert("depreciation".to_string(), "0.5".to_string());
        let err = build_module("preload-predictor", &settings).unwrap_err();
        assert!(matches!(err, ModuleError::BuildFailed(_, _)));
    }

    #[test]
    fn build_module_rejects_non_numeric_depreciation() {
        let mut settings = ModuleSettings::new();
        settings.insert("interval_time".to_string(), "6".to_string());
        settings.insert("depreciation".to_string(), "not-a-number".to_string());
        let err = build_module("preload-predictor", &settings).unwrap_err();
        assert!(matches!(err, ModuleError::BuildFailed(_, _)));
    }
}
