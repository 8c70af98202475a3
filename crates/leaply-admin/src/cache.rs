//! Keyed query cache with tag-based invalidation.
//!
//! Every list the admin panel shows is fetched through [`EntityCache::fetch`]
//! under a [`QueryKey`] (entity kind plus optional filter parameters). The
//! cache:
//!
//! - serves fresh entries without a request;
//! - serves entries older than `stale_time` immediately and revalidates them
//!   in the background;
//! - awaits a fetch for misses and for entries a mutation has invalidated;
//! - shares one in-flight request between concurrent callers of a key.
//!
//! After a successful mutation, [`EntityCache::invalidate`] marks every key
//! tagged with the entity kind (filtered variants included) and broadcasts a
//! [`CacheEvent`] so open list views reload. Each entry carries a generation
//! counter; a response that started before an invalidation is handed to its
//! caller but never written back.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::{Mutex, broadcast};

use crate::error::{AdminError, Result};
use crate::model::EntityKind;

/// Default buffer size for the event channel.
const DEFAULT_EVENT_CAPACITY: usize = 64;

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue>>>;

/// Identifies one cached query: entity kind plus filter parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: EntityKind,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    /// The unfiltered list of `kind`.
    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

/// Notifications for subscribed views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Keys tagged with `kind` were marked stale.
    Invalidated { kind: EntityKind, keys: usize },
    /// A fetch for `key` completed and was stored.
    Updated(QueryKey),
}

/// Configuration for the entity cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched result counts as fresh (default: 0, always revalidate).
    pub stale_time: Duration,

    /// Event channel buffer; slow subscribers lose the oldest events.
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

#[derive(Default)]
struct Entry {
    data: Option<CachedValue>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    generation: u64,
    in_flight: Option<SharedFetch>,
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    /// Tag registry: entity kind → keys that hold results of that kind.
    tags: HashMap<EntityKind, HashSet<QueryKey>>,
}

impl State {
    fn entry(&mut self, key: &QueryKey) -> &mut Entry {
        self.tags.entry(key.kind).or_default().insert(key.clone());
        self.entries.entry(key.clone()).or_default()
    }
}

/// Freshness of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Older than `stale_time`; served while revalidating.
    Stale,
    /// Marked by a mutation; the next read waits for a fetch.
    Invalidated,
}

/// In-memory store of query results. Cloning shares the same store.
#[derive(Clone)]
pub struct EntityCache {
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<CacheEvent>,
    config: CacheConfig,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl EntityCache {
    pub fn new(config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            state: Arc::new(Mutex::new(State::default())),
            events,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Receive invalidation and update events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Return the result for `key`, fetching with `fetcher` when needed.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when there is no usable cached result. Prior
    /// data stays in the cache but is not returned once invalidated.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock().await;
            let entry = state.entry(&key);

            let usable = if entry.invalidated {
                None
            } else {
                entry.data.clone()
            };

            if let Some(data) = usable {
                if self.is_fresh(entry) {
                    tracing::trace!(%key, "cache hit");
                } else if entry.in_flight.is_none() {
                    tracing::debug!(%key, "serving stale result, revalidating");
                    let fut = self.start_fetch(entry, &key, fetcher);
                    let key = key.clone();
                    tokio::spawn(async move {
                        if let Err(e) = fut.await {
                            tracing::warn!(%key, error = %e, "background revalidation failed");
                        }
                    });
                }
                return downcast(&key, data);
            }

            match entry.in_flight.clone() {
                Some(fut) => {
                    tracing::trace!(%key, "joining in-flight fetch");
                    fut
                }
                None => {
                    tracing::debug!(%key, "cache miss");
                    self.start_fetch(entry, &key, fetcher)
                }
            }
        };

        let data = pending.await?;
        downcast(&key, data)
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry
            .fetched_at
            .is_some_and(|at| at.elapsed() < self.config.stale_time)
    }

    fn start_fetch<T, F, Fut>(&self, entry: &mut Entry, key: &QueryKey, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let generation = entry.generation;
        let request = fetcher();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let key = key.clone();

        let fut = async move {
            let result = request.await.map(|v| Arc::new(v) as CachedValue);

            let mut state = state.lock().await;
            if let Some(entry) = state.entries.get_mut(&key) {
                if entry.generation != generation {
                    tracing::debug!(%key, "discarding response issued before invalidation");
                    return result;
                }
                entry.in_flight = None;
                if let Ok(data) = &result {
                    entry.data = Some(data.clone());
                    entry.fetched_at = Some(Instant::now());
                    entry.invalidated = false;
                    let _ = events.send(CacheEvent::Updated(key.clone()));
                }
            }
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(fut.clone());
        fut
    }

    /// Mark every key tagged with `kind` stale. Returns how many were marked.
    pub async fn invalidate(&self, kind: EntityKind) -> usize {
        let count = {
            let mut state = self.state.lock().await;
            let State { entries, tags } = &mut *state;
            let keys = tags.get(&kind).map(|keys| keys.iter()).into_iter().flatten();

            let mut count = 0;
            for key in keys {
                if let Some(entry) = entries.get_mut(key) {
                    mark_invalidated(entry);
                    count += 1;
                }
            }
            count
        };

        tracing::debug!(%kind, keys = count, "invalidated cached queries");
        let _ = self.events.send(CacheEvent::Invalidated { kind, keys: count });
        count
    }

    /// Mark a single key stale.
    pub async fn invalidate_key(&self, key: &QueryKey) -> bool {
        let found = {
            let mut state = self.state.lock().await;
            match state.entries.get_mut(key) {
                Some(entry) => {
                    mark_invalidated(entry);
                    true
                }
                None => false,
            }
        };
        if found {
            let _ = self.events.send(CacheEvent::Invalidated {
                kind: key.kind,
                keys: 1,
            });
        }
        found
    }

    /// Cached result for `key`, regardless of freshness. Never fetches.
    pub async fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let state = self.state.lock().await;
        let data = state.entries.get(key)?.data.clone()?;
        data.downcast::<T>().ok()
    }

    /// Seed `key` with a known result.
    pub async fn set<T: Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        let mut state = self.state.lock().await;
        let entry = state.entry(&key);
        entry.generation += 1;
        entry.in_flight = None;
        entry.data = Some(Arc::new(data) as CachedValue);
        entry.fetched_at = Some(Instant::now());
        entry.invalidated = false;
    }

    pub async fn freshness(&self, key: &QueryKey) -> Option<Freshness> {
        let state = self.state.lock().await;
        let entry = state.entries.get(key)?;
        entry.data.as_ref()?;
        Some(if entry.invalidated {
            Freshness::Invalidated
        } else if self.is_fresh(entry) {
            Freshness::Fresh
        } else {
            Freshness::Stale
        })
    }

    /// Keys currently registered under `kind`.
    pub async fn keys_for(&self, kind: EntityKind) -> Vec<QueryKey> {
        let state = self.state.lock().await;
        let mut keys: Vec<_> = state
            .tags
            .get(&kind)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Drop every entry and tag.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.tags.clear();
        tracing::debug!("cleared entity cache");
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

fn mark_invalidated(entry: &mut Entry) {
    entry.invalidated = true;
    entry.generation += 1;
    entry.in_flight = None;
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: CachedValue) -> Result<Arc<T>> {
    data.downcast::<T>().map_err(|_| {
        AdminError::Decode(format!(
            "cached value for {key} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetcher(
        counter: &Arc<AtomicUsize>,
        value: Vec<&'static str>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Vec<&'static str>>> {
        let counter = Arc::clone(counter);
        move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    fn long_lived() -> EntityCache {
        EntityCache::new(CacheConfig::new().with_stale_time(Duration::from_secs(60)))
    }

    #[test]
    fn test_query_key_display() {
        let key = QueryKey::all(EntityKind::Program).with_param("universityId", "abc");
        assert_eq!(key.to_string(), "programs?universityId=abc");
        assert_eq!(key.param("universityId"), Some("abc"));
        assert_eq!(QueryKey::all(EntityKind::User).to_string(), "users");
    }

    #[tokio::test]
    async fn test_fresh_hit_does_not_refetch() {
        let cache = long_lived();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::all(EntityKind::University);

        let first = cache
            .fetch(key.clone(), counting_fetcher(&calls, vec!["a"]))
            .await
            .unwrap();
        let second = cache
            .fetch(key.clone(), counting_fetcher(&calls, vec!["b"]))
            .await
            .unwrap();

        assert_eq!(*first, vec!["a"]);
        assert_eq!(*second, vec!["a"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.freshness(&key).await, Some(Freshness::Fresh));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_deduplicated() {
        let cache = long_lived();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::all(EntityKind::User);

        let (a, b) = tokio::join!(
            cache.fetch(key.clone(), counting_fetcher(&calls, vec!["x"])),
            cache.fetch(key.clone(), counting_fetcher(&calls, vec!["y"])),
        );

        assert_eq!(*a.unwrap(), vec!["x"]);
        assert_eq!(*b.unwrap(), vec!["x"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_covers_filtered_keys() {
        let cache = long_lived();
        let calls = Arc::new(AtomicUsize::new(0));
        let all = QueryKey::all(EntityKind::Program);
        let filtered = QueryKey::all(EntityKind::Program).with_param("universityId", "u1");
        let other = QueryKey::all(EntityKind::User);

        cache.set(all.clone(), vec!["p1"]).await;
        cache.set(filtered.clone(), vec!["p1"]).await;
        cache.set(other.clone(), vec!["u"]).await;

        assert_eq!(cache.invalidate(EntityKind::Program).await, 2);
        assert_eq!(cache.freshness(&all).await, Some(Freshness::Invalidated));
        assert_eq!(cache.freshness(&filtered).await, Some(Freshness::Invalidated));
        assert_eq!(cache.freshness(&other).await, Some(Freshness::Fresh));

        let refreshed = cache
            .fetch(filtered.clone(), counting_fetcher(&calls, vec!["p1", "p2"]))
            .await
            .unwrap();
        assert_eq!(*refreshed, vec!["p1", "p2"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.keys_for(EntityKind::Program).await, vec![all, filtered]);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_prior_data_but_reports_error() {
        let cache = long_lived();
        let key = QueryKey::all(EntityKind::University);
        cache.set(key.clone(), vec!["old"]).await;
        cache.invalidate(EntityKind::University).await;

        let err = cache
            .fetch::<Vec<&str>, _, _>(key.clone(), || async {
                Err(AdminError::Network("connection refused".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Network(_)));

        assert_eq!(*cache.peek::<Vec<&str>>(&key).await.unwrap(), vec!["old"]);
        assert_eq!(cache.freshness(&key).await, Some(Freshness::Invalidated));
    }

    #[tokio::test]
    async fn test_response_started_before_invalidation_is_not_stored() {
        let cache = long_lived();
        let key = QueryKey::all(EntityKind::Program);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(key, move || async move {
                        let _ = release_rx.await;
                        Ok(vec!["before-delete"])
                    })
                    .await
            })
        };

        // Let the slow fetch register itself before invalidating.
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(EntityKind::Program).await;
        let _ = release_tx.send(());

        let stale = slow.await.unwrap().unwrap();
        assert_eq!(*stale, vec!["before-delete"]);
        assert!(cache.peek::<Vec<&str>>(&key).await.is_none());

        let fresh = cache
            .fetch(key.clone(), || async { Ok(vec!["after-delete"]) })
            .await
            .unwrap();
        assert_eq!(*fresh, vec!["after-delete"]);
    }

    #[tokio::test]
    async fn test_stale_entry_served_while_revalidating() {
        let cache = EntityCache::new(CacheConfig::new());
        let key = QueryKey::all(EntityKind::User);
        let mut events = cache.subscribe();

        cache.set(key.clone(), vec!["v1"]).await;
        assert_eq!(cache.freshness(&key).await, Some(Freshness::Stale));

        let served = cache
            .fetch(key.clone(), || async { Ok(vec!["v2"]) })
            .await
            .unwrap();
        assert_eq!(*served, vec!["v1"]);

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, CacheEvent::Updated(key.clone()));
        assert_eq!(*cache.peek::<Vec<&str>>(&key).await.unwrap(), vec!["v2"]);
    }

    #[tokio::test]
    async fn test_invalidate_broadcasts_event() {
        let cache = long_lived();
        let mut events = cache.subscribe();
        cache.set(QueryKey::all(EntityKind::User), vec![1u8]).await;

        cache.invalidate(EntityKind::User).await;
        assert_eq!(
            events.recv().await.unwrap(),
            CacheEvent::Invalidated {
                kind: EntityKind::User,
                keys: 1
            }
        );
    }

    #[tokio::test]
    async fn test_type_mismatch_is_an_error() {
        let cache = long_lived();
        let key = QueryKey::all(EntityKind::User);
        cache.set(key.clone(), 42u32).await;
        let err = cache
            .fetch::<String, _, _>(key, || async { Ok(String::new()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Decode(_)));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = long_lived();
        cache.set(QueryKey::all(EntityKind::User), ()).await;
        assert_eq!(cache.len().await, 1);
        cache.clear().await;
        assert!(cache.is_empty().await);
        assert!(cache.keys_for(EntityKind::User).await.is_empty());
    }
}
