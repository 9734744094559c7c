//! A stable, tiered priority queue.
//!
//! Entries are ordered first by timestamp, then by [`Tier`] (so that
//! simulator-internal events run ahead of alarms, which run ahead of
//! trace events at the same instant), then by insertion sequence (so
//! that two entries tying on both of the above still pop in the order
//! they were pushed). `std::collections::BinaryHeap` is a max-heap, so
//! every key is wrapped in `Reverse` to get min-heap behavior.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use uamp_sim_common::{ScheduleError, Timestamp};

/// Execution tier. Lower values run first among entries with equal
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Simulator = 1,
    Alarm = 5,
    Trace = 10,
}

/// A key identifying an entry's place in the queue: timestamp, tier,
/// then insertion sequence, all compared ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueKey {
    timestamp: Timestamp,
    tier: Tier,
    sequence: u64,
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.tier.cmp(&other.tier))
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Entry<T> {
    key: QueueKey,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<T> Eq for Entry<T> {}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) behaves as a min-heap.
        other.key.cmp(&self.key)
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A stable min-heap priority queue keyed by `(Timestamp, Tier, seq)`.
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        PriorityQueue {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an item at the given timestamp and tier. Ties are broken by
    /// insertion order.
    pub fn push(&mut self, timestamp: Timestamp, tier: Tier, item: T) {
        let key = QueueKey {
            timestamp,
            tier,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.heap.push(Entry { key, item });
    }

    /// Pop the earliest-ordered item.
    pub fn pop(&mut self) -> Result<T, ScheduleError> {
        self.heap
            .pop()
            .map(|entry| entry.item)
            .ok_or(ScheduleError::EmptyQueue)
    }

    /// Peek at the earliest-ordered item's timestamp without removing
    /// it.
    pub fn peek_timestamp(&self) -> Option<Timestamp> {
        self.heap.peek().map(|entry| entry.key.timestamp)
    }

    /// Peek at the earliest-ordered item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|entry| &entry.item)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
