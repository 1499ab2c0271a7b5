//! Bounded activity ring buffers (§4.3): console and network entries are
//! appended as CDP events arrive and the oldest entry is dropped once the
//! buffer is full.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct RingBuffer<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Returns up to `limit` most recent entries with `timestamp >= since`
/// (when provided), in chronological order.
pub fn select<'a, T>(
    buffer: &'a RingBuffer<T>,
    since: Option<DateTime<Utc>>,
    timestamp_of: impl Fn(&T) -> DateTime<Utc>,
    limit: Option<usize>,
) -> Vec<&'a T> {
    let mut filtered: Vec<&T> = buffer
        .iter()
        .filter(|entry| since.map(|since| timestamp_of(entry) >= since).unwrap_or(true))
        .collect();
    if let Some(limit) = limit {
        if filtered.len() > limit {
            let drop = filtered.len() - limit;
            filtered.drain(0..drop);
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_dropped_when_full() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        buf.push(4);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn select_respects_limit_and_since() {
        let mut buf = RingBuffer::new(10);
        let base = Utc::now();
        for i in 0..5i64 {
            buf.push((i, base + chrono::Duration::seconds(i)));
        }
        let since = base + chrono::Duration::seconds(2);
        let picked = select(&buf, Some(since), |(_, ts)| *ts, Some(2));
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].0, 3);
        assert_eq!(picked[1].0, 4);
    }
}
