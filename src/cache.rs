// =============================================================================
// In-process TTL Cache
// =============================================================================
//
// Time-boxed key → value store. Entries expire `ttl` after insertion; an
// expired entry is evicted on the read that discovers it and reported as a
// miss. The cache is an explicit, injectable collaborator — it is owned by
// whoever constructs it, never reached through global state.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a live entry, evicting it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some((value, inserted_at)) if inserted_at.elapsed() <= self.ttl => {
                    return Some(value.clone());
                }
                Some(_) => {} // expired — fall through to evict
                None => return None,
            }
        }

        // Re-check under the write lock: a concurrent put may have refreshed
        // the entry between the two lock acquisitions.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some((value, inserted_at)) if inserted_at.elapsed() <= self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh an entry; its TTL restarts from now.
    pub fn put(&self, key: K, value: V) {
        self.entries.write().insert(key, (value, Instant::now()));
    }

    /// Drop every expired entry. `get` already evicts lazily; this sweep
    /// exists for callers that want to bound memory between reads.
    pub fn purge_expired(&self) {
        self.entries
            .write()
            .retain(|_, (_, inserted_at)| inserted_at.elapsed() <= self.ttl);
    }

    /// Number of stored entries, including any not yet evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
