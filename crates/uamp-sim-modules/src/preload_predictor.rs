//! The preload predictor: learns a per-hour-bucket frequency table of
//! which app is used most often, and predicts (by broadcasting a
//! [`EventPayload::PreloadApp`]) that app whenever the screen turns on
//! with the user present and the bucket's top app clears a confidence
//! threshold.

use std::io::Write;

use chrono::Duration;
use tracing::debug;

use uamp_sim_common::{AppUsageEvent, Event, EventPayload, EventType, ModuleError, ScreenState, SimError};
use uamp_sim_engine::{AlarmHandle, SimContext, SimModule, SimModuleType, StatsGate};
use uamp_sim_metrics::metric_defs;

/// A bucket's frequency table clears this value before a prediction is
/// issued for it.
pub const PRELOAD_THRESHOLD: f64 = 20.0;

/// A preload prediction is only counted correct if the matching usage
/// event arrives within this many minutes of the prediction.
pub const VERIFICATION_WINDOW_MINUTES: i64 = 5;

struct Prediction {
    app_id: String,
    timestamp: uamp_sim_common::Timestamp,
}

/// Configuration for [`PreloadPredictor`], taken from its config
/// section (`interval_time`, `depreciation`).
#[derive(Debug, Clone, Copy)]
pub struct PreloadPredictorConfig {
    /// Bucket width in hours; must evenly divide 24.
    pub interval_hours: u32,
    /// Multiplicative decay applied to every bucket on each tick.
    pub depreciation: f64,
}

/// Learns per-time-of-day app usage frequencies and preloads the most
/// likely app when the screen wakes with the user present.
pub struct PreloadPredictor {
    name: String,
    config: PreloadPredictorConfig,
    gate: StatsGate,

    // Insertion-ordered rather than a `HashMap`: §4.7 requires the
    // highest-frequency app to be picked with "ties broken by
    // first-inserted", matching the original's `max(dict, key=dict.get)`
    // over an insertion-ordered Python dict. A `HashMap`'s randomized
    // iteration order can neither preserve that tie-break nor keep runs
    // deterministic.
    buckets: Vec<Vec<(String, f64)>>,
    current_bucket: usize,

    prediction: Option<Prediction>,
    total_predictions: u64,
    correct: u64,

    num_launched: u64,
    prev_app_id: Option<String>,

    timeliness_min: f64,
    timeliness_max: f64,
    timeliness_sum: f64,
    timeliness_count: u64,

    decay_alarm: Option<AlarmHandle>,
}

impl PreloadPredictor {
    pub fn new(name: impl Into<String>, config: PreloadPredictorConfig) -> Self {
        let bucket_count = (24 / config.interval_hours).max(1) as usize;
        PreloadPredictor {
            name: name.into(),
            config,
            gate: StatsGate::default(),
            buckets: vec![Vec::new(); bucket_count],
            current_bucket: 0,
            prediction: None,
            total_predictions: 0,
            correct: 0,
            num_launched: 0,
            prev_app_id: None,
            timeliness_min: 0.0,
            timeliness_max: 0.0,
            timeliness_sum: 0.0,
            timeliness_count: 0,
            decay_alarm: None,
        }
    }

    fn bucket_for_hour(&self, hour: u32) -> usize {
        (hour / self.config.interval_hours) as usize % self.buckets.len()
    }

    /// Decays only the bucket most recently touched by `preload`/`verify`,
    /// not every bucket — matching the reference decay policy pinned by
    /// spec.md §9 (alarm-driven decay of the *current* bucket).
    fn decrement(&mut self) {
        for (_, freq) in self.buckets[self.current_bucket].iter_mut() {
            *freq *= self.config.depreciation;
        }
        metrics::counter!(metric_defs::PRELOAD_DECAY_TICKS.name).increment(1);
    }

    /// Increment `app_id`'s weight in `bucket`, appending a fresh entry
    /// at the end (preserving first-seen order) if it isn't tracked yet.
    fn bump(&mut self, bucket: usize, app_id: &str) {
        match self.buckets[bucket].iter_mut().find(|(id, _)| id == app_id) {
            Some((_, freq)) => *freq += 1.0,
            None => self.buckets[bucket].push((app_id.to_string(), 1.0)),
        }
    }

    /// The highest-weight app in `bucket`, ties broken by whichever was
    /// inserted first (only a strictly greater weight replaces the
    /// current candidate).
    fn highest(&self, bucket: usize) -> Option<(String, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (app_id, freq) in &self.buckets[bucket] {
            if best.map_or(true, |(_, best_freq)| *freq > best_freq) {
                best = Some((app_id.as_str(), *freq));
            }
        }
        best.map(|(app_id, freq)| (app_id.to_string(), freq))
    }

    fn preload(&mut self, event: &Event, ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        self.current_bucket = self.bucket_for_hour(event.timestamp.hour_of_day());
        if let Some((app_id, freq)) = self.highest(self.current_bucket) {
            if freq > PRELOAD_THRESHOLD {
                self.total_predictions += 1;
                self.prediction = Some(Prediction {
                    app_id: app_id.clone(),
                    timestamp: event.timestamp,
                });
                metrics::counter!(metric_defs::PRELOAD_PREDICTIONS.name).increment(1);
                ctx.broadcast(EventPayload::PreloadApp { app_id })?;
            }
        }
        Ok(())
    }

    fn verify(&mut self, app_id: &str, usage_event: AppUsageEvent, event: &Event) {
        let _ = usage_event;
        if self.prev_app_id.as_deref() != Some(app_id) {
            self.num_launched += 1;
        }
        self.prev_app_id = Some(app_id.to_string());

        if let Some(prediction) = &self.prediction {
            let elapsed = event.timestamp - prediction.timestamp;
            if elapsed < Duration::minutes(VERIFICATION_WINDOW_MINUTES) && prediction.app_id == app_id {
                self.correct += 1;
                metrics::counter!(metric_defs::PRELOAD_CORRECT.name).increment(1);
                let time_diff = elapsed.num_milliseconds() as f64 / 1000.0;
                if time_diff > self.timeliness_max {
                    self.timeliness_max = time_diff;
                } else if time_diff < self.timeliness_min {
                    self.timeliness_min = time_diff;
                }
                self.timeliness_sum += time_diff;
                self.timeliness_count += 1;
                self.prediction = None;
            }
        }

        self.current_bucket = self.bucket_for_hour(event.timestamp.hour_of_day());
        self.bump(self.current_bucket, app_id);
    }
}

impl SimModule for PreloadPredictor {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_type(&self) -> SimModuleType {
        SimModuleType::PreloadPredictor
    }

    fn build(&mut self, ctx: &mut SimContext<'_>) -> Result<(), ModuleError> {
        ctx.subscribe(
            EventType::Screen,
            Some(Box::new(|event: &Event| {
                matches!(
                    event.payload,
                    EventPayload::Screen {
                        state: ScreenState::UserPresent
                    }
                )
            })),
        );
        ctx.subscribe(EventType::AppActivityUsage, None);

        let period = Duration::hours(self.config.interval_hours as i64);
        self.decay_alarm = Some(ctx.register_alarm("decrement", Some(period)));
        debug!(module = %self.name, interval_hours = self.config.interval_hours, "preload predictor built");
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        match &event.payload {
            EventPayload::Screen { .. } => self.preload(event, ctx),
            EventPayload::AppActivityUsage {
                app_id,
                usage_event,
                ..
            } => {
                let app_id = app_id.clone();
                let usage_event = *usage_event;
                self.verify(&app_id, usage_event, event);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_alarm(&mut self, alarm_name: &str, _ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        if alarm_name == "decrement" {
            self.decrement();
        }
        Ok(())
    }

    fn enable_stats_collection(&mut self) {
        self.gate.enable();
    }

    fn disable_stats_collection(&mut self) {
        self.gate.disable();
    }

    fn print_stats(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "num correct: {}", self.correct)?;
        writeln!(out, "total prediction: {}", self.total_predictions)?;
        if self.total_predictions > 0 {
            writeln!(
                out,
                "accuracy: {}",
                self.correct as f64 / self.total_predictions as f64
            )?;
        } else {
            writeln!(out, "accuracy: n/a (no predictions issued)")?;
        }
        if self.num_launched > 0 {
            writeln!(
                out,
                "converge: {}",
                self.correct as f64 / self.num_launched as f64
            )?;
        } else {
            writeln!(out, "converge: n/a (no app usage observed)")?;
        }
        writeln!(out, "timeliness: min - {}", self.timeliness_min)?;
        writeln!(out, "timeliness: max - {}", self.timeliness_max)?;
        if self.timeliness_count > 0 {
            writeln!(
                out,
                "timeliness: average - {}",
                self.timeliness_sum / self.timeliness_count as f64
            )?;
        } else {
            writeln!(out, "timeliness: average - n/a (no correct predictions)")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ModuleError> {
        if let Some(alarm) = &self.decay_alarm {
            alarm.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uamp_sim_common::Timestamp;

    fn config() -> PreloadPredictorConfig {
        PreloadPredictorConfig {
            interval_hours: 6,
            depreciation: 0.5,
        }
    }

    #[test]
    fn bucket_count_divides_day() {
        let predictor = PreloadPredictor::new("preload", config());
        assert_eq!(predictor.buckets.len(), 4);
    }

    #[test]
    fn highest_breaks_ties_by_first_inserted() {
        let mut predictor = PreloadPredictor::new("preload", config());
        predictor.buckets[0].push(("first".to_string(), 30.0));
        predictor.buckets[0].push(("second".to_string(), 30.0));
        assert_eq!(predictor.highest(0), Some(("first".to_string(), 30.0)));
    }

    #[test]
    fn highest_picks_strictly_greater_weight_regardless_of_order() {
        let mut predictor = PreloadPredictor::new("preload", config());
        predictor.buckets[0].push(("low".to_string(), 5.0));
        predictor.buckets[0].push(("high".to_string(), 30.0));
        assert_eq!(predictor.highest(0), Some(("high".to_string(), 30.0)));
    }

    #[test]
    fn bucket_for_hour_wraps_by_interval() {
        let predictor = PreloadPredictor::new("preload", config());
        assert_eq!(predictor.bucket_for_hour(0), 0);
        assert_eq!(predictor.bucket_for_hour(5), 0);
        assert_eq!(predictor.bucket_for_hour(6), 1);
        assert_eq!(predictor.bucket_for_hour(23), 3);
    }

    #[test]
    fn verify_accumulates_frequency_and_counts_launch() {
        let mut predictor = PreloadPredictor::new("preload", config());
        let ts = Timestamp::parse("2020-01-01T08:00:00Z").unwrap();
        let event = Event::new(ts, EventPayload::AppActivityUsage {
            app_id: "com.example.app".into(),
            source_class: "com.example.app.MainActivity".into(),
            usage_event: AppUsageEvent::MoveForeground,
        });
        predictor.verify("com.example.app", AppUsageEvent::MoveForeground, &event);
        assert_eq!(predictor.num_launched, 1);
        assert_eq!(
            predictor.buckets[1].iter().find(|(id, _)| id == "com.example.app"),
            Some(&("com.example.app".to_string(), 1.0))
        );
    }

    #[test]
    fn repeated_same_app_does_not_recount_launch() {
        let mut predictor = PreloadPredictor::new("preload", config());
        let ts = Timestamp::parse("2020-01-01T08:00:00Z").unwrap();
        let event = Event::new(ts, EventPayload::Pseudo);
        predictor.verify("com.example.app", AppUsageEvent::MoveForeground, &event);
        predictor.verify("com.example.app", AppUsageEvent::MoveBackground, &event);
        assert_eq!(predictor.num_launched, 1);
    }

    #[test]
    fn decrement_applies_depreciation_to_current_bucket_only() {
        let mut predictor = PreloadPredictor::new("preload", config());
        predictor.buckets[0].push(("app".to_string(), 10.0));
        predictor.buckets[1].push(("other".to_string(), 10.0));
        predictor.current_bucket = 0;
        predictor.decrement();
        assert_eq!(predictor.buckets[0], vec![("app".to_string(), 5.0)]);
        assert_eq!(predictor.buckets[1], vec![("other".to_string(), 10.0)]);
    }

    #[test]
    fn verify_within_window_counts_correct() {
        let mut predictor = PreloadPredictor::new("preload", config());
        let predicted_at = Timestamp::parse("2020-01-01T08:00:00Z").unwrap();
        predictor.prediction = Some(Prediction {
            app_id: "com.example.app".into(),
            timestamp: predicted_at,
        });
        let verify_at = Timestamp::parse("2020-01-01T08:02:00Z").unwrap();
        let event = Event::new(verify_at, EventPayload::Pseudo);
        predictor.verify("com.example.app", AppUsageEvent::MoveForeground, &event);
        assert_eq!(predictor.correct, 1);
        assert!(predictor.prediction.is_none());
    }

    #[test]
    fn verify_outside_window_does_not_count_correct() {
        let mut predictor = PreloadPredictor::new("preload", config());
        let predicted_at = Timestamp::parse("2020-01-01T08:00:00Z").unwrap();
        predictor.prediction = Some(Prediction {
            app_id: "com.example.app".into(),
            timestamp: predicted_at,
        });
        let verify_at = Timestamp::parse("2020-01-01T08:10:00Z").unwrap();
        let event = Event::new(verify_at, EventPayload::Pseudo);
        predictor.verify("com.example.app", AppUsageEvent::MoveForeground, &event);
        assert_eq!(predictor.correct, 0);
        assert!(predictor.prediction.is_some());
    }
}
