//! Size-bounded LRU cache with per-entry TTL and single-flight misses
//! (spec §4.4). `lru` provides the bounded ordering; TTL and single-flight
//! are layered on top with a `tokio::sync::Mutex` (the whole cache is one
//! logical shard — fine at the scale this server operates at).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use glob::Pattern;
use lru::LruCache;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

pub struct Cache {
    default_ttl: Duration,
    store: Mutex<LruCache<String, Entry>>,
    inflight: Mutex<HashMap<String, Arc<Notify>>>,
    stats: Mutex<CacheStats>,
}

impl Cache {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        let cap = std::num::NonZeroUsize::new(max_size).unwrap_or(std::num::NonZeroUsize::MIN);
        Self {
            default_ttl,
            store: Mutex::new(LruCache::new(cap)),
            inflight: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut store = self.store.lock().await;
        let mut stats = self.stats.lock().await;
        match store.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                stats.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                store.pop(key);
                stats.misses += 1;
                stats.evictions += 1;
                None
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        let mut store = self.store.lock().await;
        let evicted = store.put(
            key.to_string(),
            Entry {
                value,
                expires_at,
            },
        );
        drop(store);
        if evicted.is_some() {
            let mut stats = self.stats.lock().await;
            stats.evictions += 1;
        }
    }

    pub async fn invalidate(&self, key: &str) {
        let mut store = self.store.lock().await;
        store.pop(key);
    }

    /// Invalidates every key matching `glob`, e.g. `hosts:*{host_name}*`.
    pub async fn invalidate_pattern(&self, glob: &str) {
        let Ok(pattern) = Pattern::new(glob) else {
            return;
        };
        let mut store = self.store.lock().await;
        let matching: Vec<String> = store
            .iter()
            .filter(|(k, _)| pattern.matches(k))
            .map(|(k, _)| k.clone())
            .collect();
        for key in matching {
            store.pop(&key);
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let stats = self.stats.lock().await;
        let store = self.store.lock().await;
        CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            size: store.len(),
        }
    }

    pub async fn clear(&self) {
        let mut store = self.store.lock().await;
        store.clear();
    }

    /// Fetches `key`, collapsing concurrent misses for the same key into a
    /// single call to `fetch` (single-flight, spec §4.4, §8). The first
    /// caller to observe a miss performs the fetch and wakes everyone else
    /// waiting on the same key.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let mut inflight = self.inflight.lock().await;
        let existing = inflight.get(key).cloned();

        let Some(notify) = existing else {
            inflight.insert(key.to_string(), Arc::new(Notify::new()));
            drop(inflight);

            let result = fetch().await;
            // Populate the cache (on success) BEFORE waking followers, so
            // a woken follower's re-check of `self.get` always observes
            // the leader's value instead of racing it into a redundant
            // fetch.
            if let Ok(value) = &result {
                self.set(key, value.clone(), ttl).await;
            }
            let mut inflight = self.inflight.lock().await;
            if let Some(notify) = inflight.remove(key) {
                notify.notify_waiters();
            }
            return result;
        };
        drop(inflight);

        // Register as a waiter and re-check the cache before awaiting:
        // `enable()` makes this follower visible to `notify_waiters()`
        // immediately, closing the gap between releasing `inflight` above
        // and the `.await` below where a leader racing ahead of us could
        // otherwise call `notify_waiters()` against nobody (a lost
        // wakeup, since `notify_waiters` stores no permit for latecomers).
        let notified = notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        notified.await;
        // The leader has populated the cache (or failed, in which case we
        // simply re-fetch ourselves to surface the error).
        if let Some(cached) = self.get(key).await {
            Ok(cached)
        } else {
            let value = fetch().await?;
            self.set(key, value.clone(), ttl).await;
            Ok(value)
        }
    }
}

pub fn cache_key(prefix: &str, parts: &[(&str, &str)]) -> String {
    let mut key = prefix.to_string();
    for (name, value) in parts {
        key.push(':');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn reads_within_ttl_return_set_value() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache.set("k", Value::String("v".into()), None).await;
        assert_eq!(cache.get("k").await, Some(Value::String("v".into())));
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = Cache::new(10, Duration::from_millis(5));
        cache.set("k", Value::String("v".into()), None).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn invalidate_pattern_clears_matching_keys() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache.set("hosts:list:a", Value::Null, None).await;
        cache.set("hosts:list:b", Value::Null, None).await;
        cache.set("services:list:a", Value::Null, None).await;
        cache.invalidate_pattern("hosts:*").await;
        assert_eq!(cache.get("hosts:list:a").await, None);
        assert_eq!(cache.get("hosts:list:b").await, None);
        assert!(cache.get("services:list:a").await.is_some());
    }

    #[tokio::test]
    async fn concurrent_misses_fetch_upstream_exactly_once() {
        let cache = Arc::new(Cache::new(10, Duration::from_secs(60)));
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("k", None, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, std::convert::Infallible>(Value::String("v".into()))
                    })
                    .await
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn late_follower_past_the_leaders_notify_does_not_hang() {
        // Regression for a lost-wakeup: a follower that only starts
        // waiting after the leader has already fetched and notified must
        // still observe the cached value via its pre-wait re-check, not
        // hang on a `Notified` registered too late to catch the wake.
        let cache = Arc::new(Cache::new(10, Duration::from_secs(60)));

        let leader = cache.clone();
        leader
            .get_or_fetch("k", None, || async move { Ok::<_, std::convert::Infallible>(Value::String("v".into())) })
            .await
            .expect("leader fetch succeeds");

        // By now the leader has already set the cache, removed the
        // inflight entry, and called notify_waiters with no one
        // registered. A follower arriving now must take the plain cache
        // hit path and never touch the (gone) inflight entry or hang.
        let result = tokio::time::timeout(
            Duration::from_millis(200),
            cache.get_or_fetch("k", None, || async move {
                panic!("must not re-fetch: the leader's value is already cached")
            }),
        )
        .await
        .expect("follower must not hang")
        .expect("follower observes the leader's cached value");
        assert_eq!(result, Value::String("v".into()));
    }

    #[tokio::test]
    async fn clear_then_read_refetches() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache.set("k", Value::String("v".into()), None).await;
        cache.clear().await;
        assert_eq!(cache.get("k").await, None);
    }
}
