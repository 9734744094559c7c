//! Alarms: one-shot or periodic callbacks scheduled against simulated
//! time.
//!
//! Cancellation is cooperative: cancelling an alarm flips a shared
//! flag rather than searching the queue for its entry, since the
//! queue has no efficient removal-by-key. A cancelled alarm is simply
//! skipped when it is popped and, if periodic, not re-enqueued.

use std::cell::Cell;
use std::rc::Rc;

use chrono::Duration;

/// A handle returned to the caller that registered an alarm, letting
/// it cancel future firings.
#[derive(Debug, Clone)]
pub struct AlarmHandle {
    pub(crate) cancelled: Rc<Cell<bool>>,
}

impl AlarmHandle {
    /// Prevent this alarm from firing again. Has no effect on a firing
    /// already in progress.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// What a firing alarm calls back into.
pub(crate) enum AlarmTarget {
    /// Built-in: flips every module's stats-collection gate once the
    /// warmup period has elapsed.
    EnableStatsCollection,
    /// A module-registered alarm, delivered to the module's
    /// [`crate::SimModule::handle_alarm`].
    Module { module_id: usize, alarm_name: String },
}

pub(crate) struct AlarmRecord {
    pub target: AlarmTarget,
    pub period: Option<Duration>,
    pub cancelled: Rc<Cell<bool>>,
}

impl AlarmRecord {
    pub fn new_handle() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(false))
    }
}
