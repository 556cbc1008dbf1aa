use std::collections::{BTreeMap, HashMap};

use crate::domain::LogRecord;

/// Number of message ids remembered between polls.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Bounded set of recently shown message ids.
///
/// When full, the least recently inserted id is evicted. [`contains`]
/// does not refresh an entry, so a message that keeps reappearing will
/// eventually be evicted and shown again; that is an accepted bound.
///
/// [`contains`]: DedupCache::contains
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Record `id` as the most recent entry, evicting the oldest if needed.
    pub fn insert(&mut self, id: &str) {
        self.tick += 1;
        if let Some(previous) = self.entries.insert(id.to_string(), self.tick) {
            self.order.remove(&previous);
        }
        self.order.insert(self.tick, id.to_string());

        while self.entries.len() > self.capacity {
            match self.order.pop_first() {
                Some((_, oldest)) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Keep the records whose ids have not been seen, remembering them.
    ///
    /// Input order is preserved, and a repeated id within the same batch is
    /// only kept the first time.
    pub fn retain_unseen(&mut self, records: Vec<LogRecord>) -> Vec<LogRecord> {
        let mut fresh = Vec::with_capacity(records.len());
        for record in records {
            if !self.contains(&record.id) {
                self.insert(&record.id);
                fresh.push(record);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
