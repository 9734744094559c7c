//! The three preload-predictor end-to-end scenarios from spec.md §8:
//! a hit, a miss from the wrong app, and a miss from a late usage
//! event outside the verification window.

use std::fs;
use std::io::Write;

use uamp_sim_config::CliArgs;

fn temp_path(name: &str, ext: &str) -> String {
    std::env::temp_dir()
        .join(format!(
            "uamp-sim-runner-preload-test-{}-{}.{}",
            name,
            std::process::id(),
            ext
        ))
        .to_string_lossy()
        .into_owned()
}

fn write_file(path: &str, contents: &str) {
    let mut file = fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

/// 25 `app.activity_usage` events for app `A` at two-minute intervals
/// starting 08:00, well clear of the 20.0 preload threshold, plus a
/// `screen(user_present)` at 09:30 and a closing verification event at
/// `verify_time` for `verify_app`.
fn build_trace(verify_time: &str, verify_app: &str) -> String {
    let mut events = String::from("[");
    for minute in (0..50).step_by(2) {
        if minute > 0 {
            events.push(',');
        }
        events.push_str(&format!(
            r#"{{"timestamp":"2020-01-01T08:{minute:02}:00Z","payload":{{"type":"app.activity_usage","app_id":"A","source_class":"A.MainActivity","usage_event":"move_foreground"}}}}"#
        ));
    }
    events.push_str(&format!(
        r#",{{"timestamp":"2020-01-01T09:30:00Z","payload":{{"type":"screen","state":"user_present"}}}}"#
    ));
    events.push_str(&format!(
        r#",{{"timestamp":"{verify_time}","payload":{{"type":"app.activity_usage","app_id":"{verify_app}","source_class":"{verify_app}.MainActivity","usage_event":"move_foreground"}}}}"#
    ));
    events.push(']');
    events
}

fn preload_config() -> &'static str {
    "[Simulator]\nmodules = preload-predictor\nwarmup_period = \n\n[preload-predictor]\ninterval_time = 8\ndepreciation = 0.5\n"
}

fn run_scenario(name: &str, verify_time: &str, verify_app: &str) -> String {
    let trace_path = temp_path(name, "json");
    let config_path = temp_path(name, "ini");
    write_file(&trace_path, &build_trace(verify_time, verify_app));
    write_file(&config_path, preload_config());

    let args = CliArgs {
        trace: trace_path.clone(),
        sim_config: config_path.clone(),
        verbose: false,
        debug: false,
    };
    let mut sim = uamp_sim_runner::build_simulator(&args).unwrap();
    let mut out = Vec::new();
    sim.run_with_output(&mut out).unwrap();

    fs::remove_file(&trace_path).ok();
    fs::remove_file(&config_path).ok();
    String::from_utf8(out).unwrap()
}

#[test]
fn preload_hit_counts_correct_and_records_timeliness() {
    let output = run_scenario("hit", "2020-01-01T09:31:00Z", "A");
    assert!(output.contains("num correct: 1"), "{output}");
    assert!(output.contains("total prediction: 1"), "{output}");
    assert!(output.contains("timeliness: average - 60"), "{output}");
}

#[test]
fn preload_miss_wrong_app_does_not_count_correct() {
    let output = run_scenario("wrong-app", "2020-01-01T09:31:00Z", "B");
    assert!(output.contains("num correct: 0"), "{output}");
    assert!(output.contains("total prediction: 1"), "{output}");
}

#[test]
fn preload_miss_outside_verification_window_does_not_count_correct() {
    let output = run_scenario("late", "2020-01-01T09:36:00Z", "A");
    assert!(output.contains("num correct: 0"), "{output}");
    assert!(output.contains("total prediction: 1"), "{output}");
}
