//! End-to-end scenarios driving the runner's config/trace wiring
//! through a real [`uamp_sim_engine::Simulator`] run, matching
//! spec.md §8's concrete end-to-end scenarios.

use std::fs;
use std::io::Write;

use uamp_sim_config::CliArgs;

fn temp_path(name: &str, ext: &str) -> String {
    std::env::temp_dir()
        .join(format!("uamp-sim-runner-test-{}-{}.{}", name, std::process::id(), ext))
        .to_string_lossy()
        .into_owned()
}

fn write_file(path: &str, contents: &str) {
    let mut file = fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

fn args_for(trace: &str, sim_config: &str) -> CliArgs {
    CliArgs {
        trace: trace.to_string(),
        sim_config: sim_config.to_string(),
        verbose: false,
        debug: false,
    }
}

#[test]
fn empty_trace_runs_to_completion_and_prints_stats_once() {
    let trace_path = temp_path("empty-trace", "json");
    let config_path = temp_path("empty-config", "ini");
    write_file(&trace_path, "[]");
    write_file(
        &config_path,
        "[Simulator]\nmodules = frequency-counter\nwarmup_period = \n",
    );

    let mut sim = uamp_sim_runner::build_simulator(&args_for(&trace_path, &config_path)).unwrap();
    let mut out = Vec::new();
    sim.run_with_output(&mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(output.matches("======== frequency-counter Stats ========").count(), 1);

    fs::remove_file(&trace_path).ok();
    fs::remove_file(&config_path).ok();
}

#[test]
fn empty_trace_with_alarm_registering_module_runs_to_completion() {
    // preload-predictor registers a periodic decay alarm during
    // `build()` (crates/uamp-sim-modules/src/preload_predictor.rs),
    // which needs a `current_time` to anchor to even though an empty
    // trace has no start time of its own.
    let trace_path = temp_path("empty-trace-preload", "json");
    let config_path = temp_path("empty-config-preload", "ini");
    write_file(&trace_path, "[]");
    write_file(
        &config_path,
        "[Simulator]\nmodules = preload-predictor\nwarmup_period = \n\n[preload-predictor]\ninterval_time = 6\ndepreciation = 0.5\n",
    );

    let mut sim = uamp_sim_runner::build_simulator(&args_for(&trace_path, &config_path)).unwrap();
    let mut out = Vec::new();
    sim.run_with_output(&mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(output.matches("======== preload-predictor Stats ========").count(), 1);

    fs::remove_file(&trace_path).ok();
    fs::remove_file(&config_path).ok();
}

#[test]
fn same_timestamp_trace_events_dispatch_in_trace_order() {
    let trace_path = temp_path("ordering-trace", "json");
    let config_path = temp_path("ordering-config", "ini");
    write_file(
        &trace_path,
        r#"[
            {"timestamp":"2020-01-01T00:00:10Z","payload":{"type":"screen","state":"on"}},
            {"timestamp":"2020-01-01T00:00:10Z","payload":{"type":"app.launch","app_id":"com.example.x"}}
        ]"#,
    );
    write_file(
        &config_path,
        "[Simulator]\nmodules = frequency-counter\nwarmup_period = \n",
    );

    let mut sim = uamp_sim_runner::build_simulator(&args_for(&trace_path, &config_path)).unwrap();
    let mut out = Vec::new();
    sim.run_with_output(&mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains("screen: 1"));
    assert!(output.contains("app.launch: 1"));

    fs::remove_file(&trace_path).ok();
    fs::remove_file(&config_path).ok();
}

#[test]
fn unknown_module_name_is_skipped_rather_than_fatal() {
    let trace_path = temp_path("unknown-module-trace", "json");
    let config_path = temp_path("unknown-module-config", "ini");
    write_file(&trace_path, "[]");
    write_file(
        &config_path,
        "[Simulator]\nmodules = not-a-real-module frequency-counter\nwarmup_period = \n",
    );

    let sim = uamp_sim_runner::build_simulator(&args_for(&trace_path, &config_path));
    assert!(sim.is_ok());

    fs::remove_file(&trace_path).ok();
    fs::remove_file(&config_path).ok();
}
