//! Time-bounded response cache shared between recognition clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use highlight_spans::RecognitionResponse;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::fingerprint::Fingerprint;

/// Cache sizing and expiry.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheConfig {
    /// How long an entry stays valid after it was stored (default: 15 minutes)
    pub ttl: Duration,

    /// Maximum number of entries before a bulk eviction (default: 100)
    pub capacity: usize,

    /// How many of the oldest entries a bulk eviction drops (default: half
    /// the capacity)
    pub evict_count: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            capacity: 100,
            evict_count: 50,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the capacity; the eviction batch follows at half of it.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self.evict_count = (self.capacity / 2).max(1);
        self
    }

    pub fn with_evict_count(mut self, evict_count: usize) -> Self {
        self.evict_count = evict_count.max(1);
        self
    }
}

/// Counters describing cache effectiveness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because they outlived the TTL.
    pub expired: u64,
    /// Entries dropped to make room for new ones.
    pub evicted: u64,
}

struct CacheEntry {
    response: RecognitionResponse,
    created_at: Instant,
    sequence: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    stats: CacheStats,
    sequence: u64,
}

impl CacheState {
    fn is_expired(entry: &CacheEntry, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) >= ttl
    }

    fn purge_expired(&mut self, ttl: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !Self::is_expired(entry, ttl, now));
        let purged = before - self.entries.len();
        self.stats.expired += purged as u64;
        purged
    }

    fn evict_oldest(&mut self, count: usize) {
        let mut by_age: Vec<_> = self
            .entries
            .iter()
            .map(|(fingerprint, entry)| (entry.created_at, entry.sequence, *fingerprint))
            .collect();
        by_age.sort_unstable();

        for (_, _, fingerprint) in by_age.into_iter().take(count) {
            self.entries.remove(&fingerprint);
            self.stats.evicted += 1;
        }
    }
}

/// A TTL-bounded map from [Fingerprint] to [RecognitionResponse].
///
/// Cloning yields another handle onto the same storage, so one cache can be
/// injected into several clients. Every operation takes the internal lock
/// once, which makes the capacity check and the trim it may trigger atomic
/// with respect to the insert that caused them.
///
/// # Examples
///
/// ```
/// use highlight_remote::{CacheConfig, Fingerprint, ResponseCache};
/// use highlight_spans::{RecognitionRequest, RecognitionResponse};
///
/// let cache = ResponseCache::new(CacheConfig::default());
/// let request = RecognitionRequest::new("Cadbury revenue");
/// let fingerprint = Fingerprint::of(&request);
///
/// cache.put(fingerprint, RecognitionResponse::empty("Cadbury revenue"));
///
/// assert!(cache.get(&fingerprint).is_some());
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Clone, Default)]
pub struct ResponseCache {
    config: CacheConfig,
    state: Arc<Mutex<CacheState>>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a response. An entry older than the TTL is evicted and
    /// reported as absent.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<RecognitionResponse> {
        let now = Instant::now();
        let mut state = self.state.lock();

        let expired = match state.entries.get(fingerprint) {
            None => {
                state.stats.misses += 1;
                trace!(%fingerprint, "Cache miss");
                return None;
            }
            Some(entry) => CacheState::is_expired(entry, self.config.ttl, now),
        };

        if expired {
            state.entries.remove(fingerprint);
            state.stats.expired += 1;
            state.stats.misses += 1;
            debug!(%fingerprint, "Cache entry expired");
            return None;
        }

        state.stats.hits += 1;
        trace!(%fingerprint, "Cache hit");
        state
            .entries
            .get(fingerprint)
            .map(|entry| entry.response.clone())
    }

    /// Store a response. When a new key would exceed the capacity, expired
    /// entries are dropped first, then the oldest survivors until
    /// `evict_count` entries are gone in total.
    pub fn put(&self, fingerprint: Fingerprint, response: RecognitionResponse) {
        let now = Instant::now();
        let mut state = self.state.lock();

        if !state.entries.contains_key(&fingerprint) && state.entries.len() >= self.config.capacity
        {
            let purged = state.purge_expired(self.config.ttl, now);
            let shortfall = self.config.evict_count.saturating_sub(purged);
            if shortfall > 0 {
                state.evict_oldest(shortfall);
            }
            debug!(
                purged,
                remaining = state.entries.len(),
                "Trimmed response cache"
            );
        }

        state.sequence += 1;
        let sequence = state.sequence;
        state.entries.insert(
            fingerprint,
            CacheEntry {
                response,
                created_at: now,
                sequence,
            },
        );
    }

    /// Drop every entry that has outlived the TTL, returning how many went.
    pub fn purge_expired(&self) -> usize {
        self.state
            .lock()
            .purge_expired(self.config.ttl, Instant::now())
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.state.lock().entries.contains_key(fingerprint)
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }
}
