//! Bounded, expiring cache of per-ticker results for the web server.
//!
//! Keys are upper-cased tickers. Entries older than the TTL are dropped
//! when looked up; the least recently used entry is evicted when full.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

pub struct ResultCache<V> {
    entries: LruCache<String, (Instant, V)>,
    ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn get(&mut self, ticker: &str) -> Option<V> {
        self.get_at(ticker, Instant::now())
    }

    pub fn insert(&mut self, ticker: &str, value: V) {
        self.insert_at(ticker, value, Instant::now());
    }

    pub fn get_at(&mut self, ticker: &str, now: Instant) -> Option<V> {
        let key = normalize(ticker);
        let expired = match self.entries.get(&key) {
            Some((stored, _)) => now.saturating_duration_since(*stored) >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.pop(&key);
            return None;
        }
        self.entries.get(&key).map(|(_, v)| v.clone())
    }

    pub fn insert_at(&mut self, ticker: &str, value: V, now: Instant) {
        self.entries.put(normalize(ticker), (now, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}
