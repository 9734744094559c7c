//! Command-line arguments and INI-format simulator configuration.
//!
//! The config file's `[Simulator]` section lists which modules to
//! build and how long the warmup period lasts; any section named after
//! a module supplies that module's own settings. Everything else in
//! the file is ignored, matching the original `configparser`-based
//! loader's tolerance for extra sections.

use std::collections::HashMap;

use chrono::Duration;
use clap::Parser;
use ini::Ini;
use uamp_sim_common::ConfigError;

/// Command-line arguments accepted by the `uamp-sim` binary.
#[derive(Debug, Parser)]
#[command(name = "uamp-sim", about = "Run a trace-driven app-preloading simulation")]
pub struct CliArgs {
    /// User activity trace file (`.json`, `.json.gz`, or recognized-but-
    /// unsupported `.pkl`/`.pkl.gz`).
    #[arg(long)]
    pub trace: String,

    /// Simulator configuration file, INI format.
    #[arg(long = "sim-config", alias = "sim_config")]
    pub sim_config: String,

    /// Print every event as it executes.
    #[arg(short, long)]
    pub verbose: bool,

    /// Enter the interactive debug prompt before and during the run.
    #[arg(short = 'D', long)]
    pub debug: bool,
}

/// Per-module settings: an arbitrary string-to-string map taken from
/// that module's config section.
pub type ModuleSettings = HashMap<String, String>;

/// Parsed `[Simulator]` configuration plus any per-module sections.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub modules: Vec<String>,
    pub warmup_period: Duration,
    module_settings: HashMap<String, ModuleSettings>,
}

impl SimulatorConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Malformed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let sim_section = ini
            .section(Some("Simulator"))
            .ok_or_else(|| ConfigError::MissingKey("[Simulator]".to_string()))?;

        let modules = match sim_section.get("modules") {
            Some(s) if !s.trim().is_empty() => {
                s.split_whitespace().map(|m| m.to_string()).collect()
            }
            _ => Vec::new(),
        };

        let warmup_period = parse_warmup_setting(sim_section.get("warmup_period"))?;

        let mut module_settings = HashMap::new();
        for module_name in &modules {
            if let Some(section) = ini.section(Some(module_name.as_str())) {
                let settings: ModuleSettings = section
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                module_settings.insert(module_name.clone(), settings);
            }
        }

        Ok(SimulatorConfig {
            modules,
            warmup_period,
            module_settings,
        })
    }

    /// Settings for a given module name, or an empty map if the config
    /// file has no matching section.
    pub fn settings_for(&self, module_name: &str) -> ModuleSettings {
        self.module_settings
            .get(module_name)
            .cloned()
            .unwrap_or_default()
    }
}

/// Parse a warmup period value of the form `<N>h`. An empty or absent
/// value means no warmup.
fn parse_warmup_setting(value: Option<&str>) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::zero()),
        Some(s) if s.trim().is_empty() => Ok(Duration::zero()),
        Some(s) => {
            let trimmed = s.trim();
            let hours_str = trimmed.strip_suffix('h').ok_or_else(|| ConfigError::InvalidValue {
                key: "warmup_period".to_string(),
                value: s.to_string(),
            })?;
            let hours: i64 = hours_str.parse().map_err(|_| ConfigError::InvalidValue {
                key: "warmup_period".to_string(),
                value: s.to_string(),
            })?;
            Ok(Duration::hours(hours))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_ini(contents: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "uamp-sim-config-test-{}-{}.ini",
            std::process::id(),
            contents.len()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn parses_modules_and_warmup() {
        let path = write_temp_ini(
            "[Simulator]\nmodules = preload-predictor frequency-counter\nwarmup_period = 2h\n",
        );
        let config = SimulatorConfig::load(&path).unwrap();
        assert_eq!(config.modules, vec!["preload-predictor", "frequency-counter"]);
        assert_eq!(config.warmup_period, Duration::hours(2));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_warmup_defaults_to_zero() {
        let path = write_temp_ini("[Simulator]\nmodules = \n");
        let config = SimulatorConfig::load(&path).unwrap();
        assert!(config.modules.is_empty());
        assert_eq!(config.warmup_period, Duration::zero());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn module_section_settings_are_captured() {
        let path = write_temp_ini(
            "[Simulator]\nmodules = preload-predictor\n\n[preload-predictor]\nthreshold = 20\n",
        );
        let config = SimulatorConfig::load(&path).unwrap();
        let settings = config.settings_for("preload-predictor");
        assert_eq!(settings.get("threshold"), Some(&"20".to_string()));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_simulator_section_errors() {
        let path = write_temp_ini("[Other]\nfoo = bar\n");
        assert!(SimulatorConfig::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_warmup_format_errors() {
        let path = write_temp_ini("[Simulator]\nmodules = \nwarmup_period = 2\n");
        assert!(SimulatorConfig::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
