use std::collections::HashMap;
use std::hash::Hash;

/// Identifies one issued fetch for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket<K> {
    pub key: K,
    pub seq: u64,
}

/// Last-request-wins bookkeeping.
///
/// Every fetch takes a ticket before suspending; when it completes, its result
/// may only be applied if its ticket is still the latest issued for the key.
/// Superseded requests are never aborted, their results are dropped.
#[derive(Debug, Clone)]
pub struct RequestSequencer<K> {
    latest: HashMap<K, u64>,
}

impl<K: Clone + Eq + Hash> RequestSequencer<K> {
    pub fn new() -> Self {
        Self {
            latest: HashMap::new(),
        }
    }

    pub fn issue(&mut self, key: K) -> RequestTicket<K> {
        let seq = self.latest.entry(key.clone()).or_insert(0);
        *seq += 1;
        RequestTicket { key, seq: *seq }
    }

    pub fn is_latest(&self, ticket: &RequestTicket<K>) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.seq)
    }

    /// Latest sequence number issued for `key`, if any.
    pub fn latest(&self, key: &K) -> Option<u64> {
        self.latest.get(key).copied()
    }
}

impl<K: Clone + Eq + Hash> Default for RequestSequencer<K> {
    fn default() -> Self {
        Self::new()
    }
}
