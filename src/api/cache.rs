//! Query cache shared by the resource queries.
//!
//! Entries are keyed by resource + selector. A hit is served while the entry
//! is younger than the staleness window. Past the window the old value is
//! still served and a refresh runs in the background, at most one per entry.
//! An invalidated entry is never served: the next read waits for a refetch.
//! Eviction (capacity / idle time) is left to moka.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use moka::future::Cache;
use strum_macros::{AsRefStr, Display};
use tokio::time::Instant;
use tracing::warn;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Employees,
    Payrolls,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: Resource,
    parts: Vec<String>,
}

impl QueryKey {
    pub fn new<I, S>(resource: Resource, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Key for the unfiltered list of a resource.
    pub fn list(resource: Resource) -> Self {
        Self::new(resource, ["list"])
    }

    pub fn entity(resource: Resource, id: impl std::fmt::Display) -> Self {
        Self::new(resource, ["id".to_string(), id.to_string()])
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// True when `self` falls under `prefix` (same resource, leading parts equal).
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.resource == prefix.resource && self.parts.starts_with(&prefix.parts)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource)?;
        for part in &self.parts {
            write!(f, "/{}", part)?;
        }
        Ok(())
    }
}

#[derive(Clone)]
struct CachedQuery {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: Arc<AtomicBool>,
    refreshing: Arc<AtomicBool>,
}

impl CachedQuery {
    fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.is_invalidated() && self.fetched_at.elapsed() < stale_time
    }

    /// Claims the single background refresh slot for this entry.
    fn begin_refresh(&self) -> bool {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, CachedQuery>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(max_capacity: u64, stale_time: Duration, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_idle(ttl)
                .build(),
            stale_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Returns the cached value when fresh. A stale value is returned as is
    /// while `fetcher` refreshes it on a spawned task. With no usable entry,
    /// or after invalidation, `fetcher` runs in the foreground. Errors are
    /// not cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(entry) = self.inner.get(&key).await {
            if !entry.is_invalidated() {
                if let Some(value) = entry.value.downcast_ref::<T>() {
                    if entry.is_fresh(self.stale_time) {
                        log::debug!("query cache hit: {}", key);
                    } else if entry.begin_refresh() {
                        log::debug!("query cache stale, refreshing in background: {}", key);
                        self.spawn_refresh(key, entry.clone(), fetcher());
                    }
                    return Ok(value.clone());
                }
            }
        }

        log::debug!("query cache miss: {}", key);
        let value = fetcher().await?;
        self.store(key, value.clone()).await;
        Ok(value)
    }

    fn spawn_refresh<T, Fut>(&self, key: QueryKey, entry: CachedQuery, refresh: Fut)
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            match refresh.await {
                // An invalidation that landed meanwhile wins over this result.
                Ok(value) if !entry.is_invalidated() => cache.store(key, value).await,
                Ok(_) => log::debug!("discarding refresh of invalidated query: {}", key),
                Err(e) => warn!(error = %e, query = %key, "background refresh failed"),
            }
            entry.refreshing.store(false, Ordering::Release);
        });
    }

    /// Last value seen for `key`, fresh or not.
    pub async fn peek<T: Clone + Send + Sync + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.inner
            .get(key)
            .await
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        self.inner
            .get(key)
            .await
            .is_some_and(|entry| entry.is_fresh(self.stale_time))
    }

    pub async fn store<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.inner
            .insert(
                key,
                CachedQuery {
                    value: Arc::new(value),
                    fetched_at: Instant::now(),
                    invalidated: Arc::new(AtomicBool::new(false)),
                    refreshing: Arc::new(AtomicBool::new(false)),
                },
            )
            .await;
    }

    /// Marks `key` and everything under it stale. Values stay readable via
    /// [`QueryCache::peek`] until replaced or evicted.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut marked = 0;
        for (key, entry) in self.inner.iter() {
            if key.starts_with(prefix) {
                entry.invalidated.store(true, Ordering::Release);
                marked += 1;
            }
        }
        log::info!("invalidated {} cached queries under {}", marked, prefix);
        marked
    }

    /// Marks every cached query of `resource` stale.
    pub fn invalidate_resource(&self, resource: Resource) -> usize {
        self.invalidate(&QueryKey::new(resource, Vec::<String>::new()))
    }

    /// Drops everything, e.g. when the session ends.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(1_000, Duration::from_secs(30), Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use std::sync::atomic::AtomicUsize;

    async fn counted(cache: &QueryCache, key: QueryKey, calls: &Arc<AtomicUsize>) -> Vec<u32> {
        let calls = Arc::clone(calls);
        cache
            .fetch(key, || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) as u32;
                Ok(vec![n])
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn stale_hits_serve_old_value_and_refresh_in_background() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::list(Resource::Employees);

        assert_eq!(counted(&cache, key.clone(), &calls).await, vec![0]);
        assert_eq!(counted(&cache, key.clone(), &calls).await, vec![0]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(!cache.is_fresh(&key).await);
        assert_eq!(counted(&cache, key.clone(), &calls).await, vec![0]);
        // A second stale read while the refresh is pending spawns nothing.
        counted(&cache, key.clone(), &calls).await;

        // Lets the spawned refresh finish.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_fresh(&key).await);
        assert_eq!(counted(&cache, key.clone(), &calls).await, vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_background_refresh_keeps_old_value() {
        let cache = QueryCache::default();
        let key = QueryKey::list(Resource::Summary);
        cache.fetch(key.clone(), || async { Ok(1u8) }).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        let served: u8 = cache
            .fetch(key.clone(), || async {
                Err(ClientError::Transport { message: "down".into(), payload: None })
            })
            .await
            .unwrap();
        assert_eq!(served, 1);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.peek::<u8>(&key).await, Some(1));
        assert!(!cache.is_fresh(&key).await);

        // The slot is free again, so the next stale read retries.
        cache.fetch(key.clone(), || async { Ok(2u8) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.peek::<u8>(&key).await, Some(2));
    }

    #[tokio::test]
    async fn invalidation_forces_refetch_and_keeps_peek() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let list = QueryKey::list(Resource::Employees);
        let one = QueryKey::entity(Resource::Employees, 4);
        let other = QueryKey::list(Resource::Payrolls);

        counted(&cache, list.clone(), &calls).await;
        counted(&cache, one.clone(), &calls).await;
        counted(&cache, other.clone(), &calls).await;

        assert_eq!(cache.invalidate_resource(Resource::Employees), 2);
        assert!(!cache.is_fresh(&list).await);
        assert!(!cache.is_fresh(&one).await);
        assert!(cache.is_fresh(&other).await);
        assert_eq!(cache.peek::<Vec<u32>>(&list).await, Some(vec![0]));

        assert_eq!(counted(&cache, list.clone(), &calls).await, vec![3]);
        assert!(cache.is_fresh(&list).await);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::default();
        let key = QueryKey::list(Resource::Summary);

        let failed: Result<u8> = cache
            .fetch(key.clone(), || async { Err(ClientError::Transport { message: "down".into(), payload: None }) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.peek::<u8>(&key).await, None);

        let ok = cache.fetch(key, || async { Ok(7u8) }).await.unwrap();
        assert_eq!(ok, 7);
    }

    #[test]
    fn key_prefixes() {
        let ym = QueryKey::new(Resource::Payrolls, ["employee", "3", "ym", "2024-02"]);
        assert!(ym.starts_with(&QueryKey::new(Resource::Payrolls, ["employee"])));
        assert!(!ym.starts_with(&QueryKey::new(Resource::Summary, Vec::<String>::new())));
        assert_eq!(ym.to_string(), "payrolls/employee/3/ym/2024-02");
    }
}
