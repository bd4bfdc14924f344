use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::constants::{cache, feed, storage as keys};
use crate::models::video::Video;
use crate::services::fallback::FallbackPool;
use crate::storage::StorageBackend;

/// One cached search: normalized query, opaque result payload, creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    query: String,
    results: Vec<Video>,
    timestamp: i64,
}

/// Serialized form of a user's entry set. Any version mismatch or parse
/// failure is treated as an empty store.
#[derive(Debug, Serialize, Deserialize)]
struct EntryStore {
    version: u32,
    entries: Vec<CacheEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecencyStore {
    version: u32,
    queries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: usize,
    pub recent_searches_limit: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: cache::ENTRY_TTL,
            max_entries: cache::MAX_ENTRIES,
            recent_searches_limit: cache::RECENT_SEARCHES_LIMIT,
        }
    }
}

/// Read-through cache for per-user search results plus the feed synthesis
/// that produces the initial "for you" view.
///
/// Every operation is best-effort against the storage substrate: corrupt or
/// unreadable state degrades to an empty store and failed writes are logged,
/// never surfaced. Read-modify-write sequences are serialized per user scope
/// with an in-process mutex, so two rapid searches cannot clobber each
/// other's eviction state.
pub struct PersonalizationCache {
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    pool: FallbackPool,
    settings: CacheSettings,
    rng: Mutex<StdRng>,
    scope_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PersonalizationCache {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>, pool: FallbackPool) -> Self {
        Self::with_settings(storage, clock, pool, CacheSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        storage: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        pool: FallbackPool,
        settings: CacheSettings,
    ) -> Self {
        Self {
            storage,
            clock,
            pool,
            settings,
            rng: Mutex::new(StdRng::from_os_rng()),
            scope_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the fallback sampling RNG with a seeded one, so tests can
    /// assert exact feed output.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Stores the results of a completed search and promotes the query in
    /// the recency list. Best-effort: storage failures are logged and
    /// swallowed.
    pub fn cache_search_results(&self, query: &str, results: &[Video], user_id: Option<&str>) {
        if query.trim().is_empty() {
            return;
        }

        let scope = resolve_scope(user_id);
        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let normalized = query.to_lowercase();
        let mut entries = self.load_entries(&scope);

        // Replace, never append, for a repeated query.
        entries.retain(|e| e.query != normalized);
        entries.insert(
            0,
            CacheEntry {
                query: normalized,
                results: results.to_vec(),
                timestamp: self.clock.now_millis(),
            },
        );

        if entries.len() > self.settings.max_entries {
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            entries.truncate(self.settings.max_entries);
        }

        self.persist_entries(&scope, &entries);
        self.update_recent_searches(&scope, query);
    }

    /// Returns the cached result set for `query` if present and fresh.
    ///
    /// `None` means "no cache", distinct from a cached empty result. Expired
    /// entries found along the way are pruned and the pruned set re-persisted.
    #[must_use]
    pub fn get_cached_results(&self, query: &str, user_id: Option<&str>) -> Option<Vec<Video>> {
        let scope = resolve_scope(user_id);
        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let entries = self.load_and_prune_entries(&scope);
        let normalized = query.to_lowercase();

        entries
            .into_iter()
            .find(|e| e.query == normalized)
            .map(|e| e.results)
    }

    /// The user's recent raw queries, most-recent-first. Corrupt or missing
    /// state yields an empty list.
    #[must_use]
    pub fn get_recent_searches(&self, user_id: Option<&str>) -> Vec<String> {
        let scope = resolve_scope(user_id);
        self.load_recent_searches(&scope)
    }

    /// Synthesizes the personalized home feed.
    ///
    /// Takes up to 2 results from each of the 3 most recent queries in
    /// recency order (TTL is ignored here; personalization tolerates staler
    /// data than live search), tops up from the fallback pool to 6 items,
    /// deduplicates by video id keeping first occurrence, and truncates to 6.
    /// With `force_random` or no signal at all, returns a random fallback
    /// sample instead.
    #[must_use]
    pub fn get_personalized_videos(&self, user_id: Option<&str>, force_random: bool) -> Vec<Video> {
        let scope = resolve_scope(user_id);
        let recent = self.load_recent_searches(&scope);
        let entries = self.load_entries(&scope);

        if force_random || recent.is_empty() || entries.is_empty() {
            debug!(scope = %scope, "No personalization signal, serving fallback feed");
            return self.sample_fallback(feed::RANDOM_SAMPLE_SIZE);
        }

        let mut videos: Vec<Video> = Vec::new();

        for query in recent.iter().take(feed::RECENT_QUERIES_USED) {
            let normalized = query.to_lowercase();
            if let Some(entry) = entries.iter().find(|e| e.query == normalized) {
                videos.extend(entry.results.iter().take(feed::RESULTS_PER_QUERY).cloned());
            }
        }

        let needed = feed::FEED_SIZE.saturating_sub(videos.len());
        if needed > 0 {
            videos.extend(self.sample_fallback(needed));
        }

        let mut seen = HashSet::new();
        videos.retain(|v| seen.insert(v.id.clone()));
        videos.truncate(feed::FEED_SIZE);
        videos
    }

    /// Deletes both stores for the scope. Irreversible.
    pub fn clear_user_cache(&self, user_id: Option<&str>) {
        let scope = resolve_scope(user_id);
        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        for key in [entries_key(&scope), recency_key(&scope)] {
            if let Err(e) = self.storage.remove(&key) {
                warn!("Failed to clear cache key {key}: {e}");
            }
        }
    }

    fn sample_fallback(&self, count: usize) -> Vec<Video> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.pool.sample(count, &mut *rng)
    }

    fn scope_lock(&self, scope: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .scope_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locks.entry(scope.to_string()).or_default().clone()
    }

    fn load_entries(&self, scope: &str) -> Vec<CacheEntry> {
        let key = entries_key(scope);
        let Some(raw) = self.read_raw(&key) else {
            return Vec::new();
        };

        match serde_json::from_str::<EntryStore>(&raw) {
            Ok(store) if store.version == keys::STORE_VERSION => store.entries,
            Ok(store) => {
                debug!(
                    "Ignoring entry store {key} with unknown version {}",
                    store.version
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Corrupt entry store {key}, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Loads the entry set and lazily drops everything past TTL, re-persisting
    /// when anything was removed.
    fn load_and_prune_entries(&self, scope: &str) -> Vec<CacheEntry> {
        let mut entries = self.load_entries(scope);
        let before = entries.len();
        let now = self.clock.now_millis();
        let ttl_millis = i64::try_from(self.settings.ttl.as_millis()).unwrap_or(i64::MAX);

        entries.retain(|e| now - e.timestamp < ttl_millis);

        if entries.len() != before {
            debug!(
                scope = %scope,
                expired = before - entries.len(),
                "Pruned expired cache entries"
            );
            self.persist_entries(scope, &entries);
        }
        entries
    }

    fn persist_entries(&self, scope: &str, entries: &[CacheEntry]) {
        let store = EntryStore {
            version: keys::STORE_VERSION,
            entries: entries.to_vec(),
        };
        self.write_raw(&entries_key(scope), &store);
    }

    fn update_recent_searches(&self, scope: &str, query: &str) {
        let mut recent = self.load_recent_searches(scope);

        recent.retain(|q| !q.eq_ignore_ascii_case(query));
        recent.insert(0, query.to_string());
        recent.truncate(self.settings.recent_searches_limit);

        let store = RecencyStore {
            version: keys::STORE_VERSION,
            queries: recent,
        };
        self.write_raw(&recency_key(scope), &store);
    }

    fn load_recent_searches(&self, scope: &str) -> Vec<String> {
        let key = recency_key(scope);
        let Some(raw) = self.read_raw(&key) else {
            return Vec::new();
        };

        match serde_json::from_str::<RecencyStore>(&raw) {
            Ok(store) if store.version == keys::STORE_VERSION => store.queries,
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("Corrupt recency store {key}, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Storage read failed for {key}, treating as empty: {e}");
                None
            }
        }
    }

    fn write_raw<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize store {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.storage.set(key, &serialized) {
            warn!("Storage write failed for {key}: {e}");
        }
    }
}

/// Missing or empty identity resolves to the anonymous namespace.
fn resolve_scope(user_id: Option<&str>) -> String {
    match user_id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => keys::ANONYMOUS_SCOPE.to_string(),
    }
}

fn entries_key(scope: &str) -> String {
    format!("{}{scope}", keys::ENTRIES_KEY_PREFIX)
}

fn recency_key(scope: &str) -> String {
    format!("{}{scope}", keys::RECENCY_KEY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    fn test_cache() -> PersonalizationCache {
        PersonalizationCache::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::new(1_000_000)),
            FallbackPool::demo(),
        )
        .with_rng_seed(1)
    }

    fn video(id: &str) -> Video {
        Video::new(id, format!("video {id}"), "", "channel", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let cache = test_cache();
        cache.cache_search_results("Lofi Beats", &[video("a")], None);

        let hit = cache.get_cached_results("lofi beats", None);
        assert_eq!(hit.unwrap()[0].id, "a");
    }

    #[test]
    fn cached_empty_result_is_distinct_from_miss() {
        let cache = test_cache();
        cache.cache_search_results("nothing here", &[], None);

        assert_eq!(cache.get_cached_results("nothing here", None), Some(vec![]));
        assert_eq!(cache.get_cached_results("never searched", None), None);
    }

    #[test]
    fn empty_query_is_ignored() {
        let cache = test_cache();
        cache.cache_search_results("   ", &[video("a")], None);

        assert!(cache.get_recent_searches(None).is_empty());
    }

    #[test]
    fn empty_user_id_resolves_to_anonymous() {
        let cache = test_cache();
        cache.cache_search_results("cats", &[video("a")], Some(""));

        assert!(cache.get_cached_results("cats", None).is_some());
    }

    #[test]
    fn recency_keeps_original_casing() {
        let cache = test_cache();
        cache.cache_search_results("Synthwave Mix", &[video("a")], None);

        assert_eq!(cache.get_recent_searches(None), vec!["Synthwave Mix"]);
    }
}
