//! Error types shared across the workspace.
//!
//! Each crate that can fail independently gets its own leaf error
//! enum; [`SimError`] wraps them so callers at the engine boundary can
//! propagate with a single `?` regardless of which subsystem failed.

use thiserror::Error;

/// Failures loading or validating simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("malformed config file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("missing required key `{0}` in [Simulator] section")]
    MissingKey(String),

    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },

    #[error("unknown module name `{0}`")]
    UnknownModule(String),
}

/// Failures reading or decoding a trace source.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace file not found: {0}")]
    NotFound(String),

    #[error("unsupported trace format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed trace record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("trace decompression failed: {0}")]
    Decompression(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures raised by a [`SimModule`](crate::SimModule) during its
/// lifecycle.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module `{0}` failed to build: {1}")]
    BuildFailed(String, String),

    #[error("module `{0}` has no handler for event type {1}")]
    NoHandler(String, String),

    #[error("module `{0}` is already registered")]
    AlreadyRegistered(String),

    #[error("module `{0}`: {1}")]
    Other(String, String),
}

/// Failures raised while scheduling or dispatching events.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cannot schedule an event in the past: event at {event_time}, current time {now}")]
    PastEvent { event_time: String, now: String },

    #[error("priority queue is empty")]
    EmptyQueue,

    #[error("broadcasting event with invalid timestamp: event at {event_time}, current time {now}")]
    InvalidBroadcastTime { event_time: String, now: String },

    #[error("alarm `{0}` not found")]
    AlarmNotFound(String),

    #[error("alarm `{0}` already cancelled")]
    AlarmAlreadyCancelled(String),
}

/// Failures surfaced while a handler processes an event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler for event type {event_type} failed: {reason}")]
    Failed { event_type: String, reason: String },

    #[error("handler panicked while processing event type {0}")]
    Panicked(String),
}

/// The top-level error type propagated out of the engine.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_sim_error() {
        let err: SimError = ConfigError::MissingKey("warmup_period".into()).into();
        assert!(err.to_string().contains("warmup_period"));
    }

    #[test]
    fn schedule_error_messages_are_descriptive() {
        let err = ScheduleError::EmptyQueue;
        assert_eq!(err.to_string(), "priority queue is empty");
    }
}
