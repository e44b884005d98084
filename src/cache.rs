//! Small keyed cache with per-entry expiry.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value for `key` if present and not expired at `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&mut self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.set_until(key, value, expires_at);
    }

    pub fn set_until(&mut self, key: K, value: V, expires_at: Instant) {
        self.entries.insert(key, Entry { value, expires_at });
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry expired at `now`; returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_entries_are_invisible() {
        let mut cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.set_until("a", 1, now + Duration::from_secs(5));
        assert_eq!(cache.get_at(&"a", now), Some(1));
        assert_eq!(cache.get_at(&"a", now + Duration::from_secs(6)), None);
        assert_eq!(cache.purge_expired(now + Duration::from_secs(6)), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("k".to_string(), 7);
        assert_eq!(cache.get(&"k".to_string()), Some(7));
        assert!(cache.invalidate(&"k".to_string()));
        assert!(!cache.invalidate(&"k".to_string()));
        assert_eq!(cache.get(&"k".to_string()), None);
    }
}
