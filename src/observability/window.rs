//! Fixed-capacity FIFO window and a non-decreasing wall clock, shared by the
//! log and metrics stores.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Holds the most recent `capacity` items in insertion order.
#[derive(Debug)]
pub(crate) struct Window<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Window<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item on overflow.
    pub(crate) fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

/// Wall clock that never reports an instant earlier than the last one it
/// handed out, so timestamps stay ordered with insertion even if the system
/// clock steps backwards.
#[derive(Debug, Default)]
pub(crate) struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub(crate) fn now(&mut self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Clamp an externally captured instant to the clock's high-water mark.
    pub(crate) fn observe(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        let at = match self.last {
            Some(last) if last > at => last,
            _ => at,
        };
        self.last = Some(at);
        at
    }
}
