//! Bounded per-gateway report history.
//!
//! One insertion-ordered ring per source port, capped at the configured
//! memory depth. Only the monitor's drain routine writes here; the API
//! listener takes read snapshots. The port key set only grows — ports are
//! added on first sighting and never pruned while the monitor is alive.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

pub struct HistoryStore {
    capacity: usize,
    entries: HashMap<u16, VecDeque<Value>>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Append a payload for `port`, evicting the oldest entry once the ring
    /// exceeds capacity.
    pub fn push(&mut self, port: u16, payload: Value) {
        let ring = self.entries.entry(port).or_default();
        ring.push_back(payload);
        if ring.len() > self.capacity {
            ring.pop_front();
        }
    }

    /// Snapshot of the stored sequence for `port`, oldest first.
    /// `None` when the port has never reported.
    pub fn get(&self, port: u16) -> Option<Vec<Value>> {
        self.entries.get(&port).map(|ring| ring.iter().cloned().collect())
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_insertion_order() {
        let mut store = HistoryStore::new(16);
        for i in 0..5 {
            store.push(1337, json!(i));
        }
        let seq = store.get(1337).unwrap();
        assert_eq!(seq, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut store = HistoryStore::new(16);
        for i in 0..40 {
            store.push(1337, json!(i));
        }
        let seq = store.get(1337).unwrap();
        assert_eq!(seq.len(), 16);
        assert_eq!(seq.first(), Some(&json!(24)));
        assert_eq!(seq.last(), Some(&json!(39)));
    }

    #[test]
    fn ports_are_independent() {
        let mut store = HistoryStore::new(2);
        store.push(1337, json!("a"));
        store.push(1338, json!("b"));
        store.push(1337, json!("c"));
        store.push(1337, json!("d"));
        assert_eq!(store.get(1337).unwrap(), vec![json!("c"), json!("d")]);
        assert_eq!(store.get(1338).unwrap(), vec![json!("b")]);
    }

    #[test]
    fn unknown_port_is_none() {
        let store = HistoryStore::new(16);
        assert!(store.get(9999).is_none());
    }
}
