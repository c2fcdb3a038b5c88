//! Fixed-Capacity Ring Buffer Implementation

use std::num::NonZeroUsize;
use std::ops::Range;

/// Bounded FIFO history that evicts the oldest entry once full
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Storage, grows up to `capacity` then is overwritten in place
    storage: Vec<T>,
    /// Maximum number of retained items
    capacity: NonZeroUsize,
    /// Index of the oldest item once the buffer has wrapped
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity.get()),
            capacity,
            head: 0,
        }
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.storage.len() < self.capacity.get() {
            self.storage.push(item);
            return None;
        }

        let evicted = std::mem::replace(&mut self.storage[self.head], item);
        self.head = (self.head + 1) % self.capacity.get();
        Some(evicted)
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Get item by chronological index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.storage.len() {
            return None;
        }
        self.storage.get((self.head + index) % self.storage.len())
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (wrapped, front) = self.storage.split_at(self.head);
        front.iter().chain(wrapped.iter())
    }

    /// Iterate a chronological index range, clamped to the held items
    pub fn range(&self, range: Range<usize>) -> impl Iterator<Item = &T> + '_ {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        (start..end).filter_map(move |i| self.get(i))
    }

    /// The last `count` items, oldest first
    pub fn last_n(&self, count: usize) -> impl Iterator<Item = &T> + '_ {
        self.iter().skip(self.len().saturating_sub(count))
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = 0;
    }
}
