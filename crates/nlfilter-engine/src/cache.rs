//! Predicate cache store
//!
//! The orchestrator talks to an injected [`CacheStore`]; a store failure is
//! indistinguishable from a miss at this boundary, so a broken cache only
//! costs a recomputation. The bundled [`MemoryCache`] keeps validated
//! predicate lists in-process with a per-entry TTL and a capacity bound.

use async_trait::async_trait;
use moka::Expiry;
use nlfilter_predicate::Predicate;
use std::time::{Duration, Instant};

/// TTL-bounded key-value store for validated predicate lists.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the cached list, or `None` on miss (or store failure).
    async fn get(&self, key: &str) -> Option<Vec<Predicate>>;

    /// Write-through with a per-entry TTL.
    async fn put(&self, key: &str, value: Vec<Predicate>, ttl: Duration);
}

#[derive(Clone)]
struct Entry {
    predicates: Vec<Predicate>,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process cache backed by `moka`.
pub struct MemoryCache {
    inner: moka::future::Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryExpiry)
                .build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<Predicate>> {
        self.inner.get(key).await.map(|entry| entry.predicates)
    }

    async fn put(&self, key: &str, value: Vec<Predicate>, ttl: Duration) {
        self.inner
            .insert(
                key.to_string(),
                Entry {
                    predicates: value,
                    ttl,
                },
            )
            .await;
    }
}
