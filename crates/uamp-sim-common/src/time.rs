//! Simulated timestamps and durations.
//!
//! The simulator never consults wall-clock time; every ordering
//! decision is made against [`Timestamp`] values carried by events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute point in logical simulation time.
///
/// Wraps a UTC instant with sub-second resolution. All comparisons are
/// by value; there is no notion of timezone beyond UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Construct a timestamp from a UTC `DateTime`.
    pub fn new(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }

    /// The underlying UTC `DateTime`.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse an ISO-8601 timestamp string, matching
    /// `dateutil.parser.parse` semantics used by the trace decoder.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Timestamp(dt.with_timezone(&Utc)))
    }

    /// The Unix epoch. Used as the simulator's anchor time when a
    /// trace has no events to take a start time from.
    pub fn epoch() -> Self {
        Timestamp(DateTime::from_timestamp(0, 0).expect("unix epoch is a valid timestamp"))
    }

    /// Hour of day in `[0, 24)`, used to compute preload-predictor
    /// bucket indices.
    pub fn hour_of_day(&self) -> u32 {
        use chrono::Timelike;
        self.0.hour()
    }

    /// Add a duration, returning a new timestamp.
    pub fn checked_add(&self, d: Duration) -> Option<Timestamp> {
        self.0.checked_add_signed(d).map(Timestamp)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        self.0 - rhs.0
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}
