use std::sync::atomic::{AtomicU64, Ordering};
use crossbeam_queue::ArrayQueue;

use crate::LogRecord;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Bounded MPSC hand-off between producers and the writer thread.
/// Neither side ever blocks.
pub struct RecordQueue {
    records: ArrayQueue<LogRecord>,
    dropped: AtomicU64,
}

impl RecordQueue {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        RecordQueue {
            records: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns `false` and counts a drop when the queue is full.
    pub fn try_enqueue(&self,
                       record: LogRecord
    ) -> bool {
        match self.records.push(record) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn try_dequeue(&self) -> Option<LogRecord> {
        self.records.pop()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for RecordQueue {
    fn default() -> Self {
        RecordQueue::new(DEFAULT_QUEUE_CAPACITY)
    }
}
