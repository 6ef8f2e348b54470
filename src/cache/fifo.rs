//! # FIFO cache
//!
//! Bounded capacity, insertion-ordered eviction (no recency tracking). A
//! single guarding mutex is sufficient since the cache is not on the
//! latency-critical path.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Mutex;

#[derive(Debug)]
pub struct FifoCache<K, V> {
    capacity: usize,
    entries: Mutex<HashMap<K, V>>,
    order: Mutex<VecDeque<K>>,
}

impl<K: Eq + Hash + Clone, V: Clone> FifoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().expect("cache mutex poisoned").get(key).cloned()
    }

    /// Insert a value, evicting the oldest entry first if at capacity.
    /// Re-inserting an existing key does not change its position.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let mut order = self.order.lock().expect("cache mutex poisoned");

        if entries.contains_key(&key) {
            entries.insert(key, value);
            return;
        }

        if entries.len() >= self.capacity {
            if let Some(oldest) = order.pop_front() {
                entries.remove(&oldest);
            }
        }

        order.push_back(key.clone());
        entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
