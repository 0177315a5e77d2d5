use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::{Cache, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process [Cache]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored slots, including expired ones that were not read or purged yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Drop every expired entry and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;

        if entry.is_expired(now) {
            drop(entry);
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
            return None;
        }

        Some(entry.value.clone())
    }

    fn write(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key.to_owned(), Entry { value, expires_at });
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read(key))
    }

    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.write(key, value, ttl);
        Ok(())
    }
}
