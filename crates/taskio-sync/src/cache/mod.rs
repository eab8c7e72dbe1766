//! Query Cache
//!
//! Keyed cache of fetched collections (task pages, comment lists, the
//! current user) with staleness, prefix invalidation, subscriptions and
//! request de-duplication.
//!
//! The cache is single-threaded: handles are cheap `Rc` clones, no borrow
//! is held across an `.await` and subscriber callbacks run after the
//! internal borrow is released, so a callback may call back into the cache.

mod key;

pub use key::{KeyPart, QueryKey};

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{debug, warn};

use crate::error::ApiResult;

/// Lifecycle of a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Fresh,
    Stale,
    Fetching,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: QueryKey,
    pub value: V,
    pub fetched_at: DateTime<Utc>,
    pub state: EntryState,
}

/// Delivered to subscribers
#[derive(Debug)]
pub enum CacheEvent<'a, V> {
    /// A value was stored or spliced for `key`.
    Updated { key: &'a QueryKey, value: &'a V },
    /// `key` was marked stale (or its in-flight fetch was superseded).
    Invalidated { key: &'a QueryKey },
}

impl<V> CacheEvent<'_, V> {
    pub fn key(&self) -> &QueryKey {
        match self {
            CacheEvent::Updated { key, .. } | CacheEvent::Invalidated { key } => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<V> = Rc<dyn Fn(&CacheEvent<'_, V>)>;
type SharedFetch<V> = Shared<LocalBoxFuture<'static, ApiResult<V>>>;

enum Filter {
    Exact(QueryKey),
    Prefix(QueryKey),
}

impl Filter {
    fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Filter::Exact(k) => k == key,
            Filter::Prefix(prefix) => key.starts_with(prefix),
        }
    }
}

struct Subscriber<V> {
    id: SubscriptionId,
    filter: Filter,
    callback: Callback<V>,
}

struct InFlight<V> {
    seq: u64,
    future: SharedFetch<V>,
}

struct CacheInner<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    inflight: HashMap<QueryKey, InFlight<V>>,
    subscribers: Vec<Subscriber<V>>,
    next_subscription: u64,
    next_fetch: u64,
    generation: u64,
}

/// Shared handle to one cache. Cloning shares the same storage.
pub struct QueryCache<V> {
    inner: Rc<RefCell<CacheInner<V>>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: Clone + 'static> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                entries: HashMap::new(),
                inflight: HashMap::new(),
                subscribers: Vec::new(),
                next_subscription: 0,
                next_fetch: 0,
                generation: 0,
            })),
        }
    }

    // ========================
    // Reads
    // ========================

    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry<V>> {
        self.inner.borrow().entries.get(key).cloned()
    }

    pub fn value(&self, key: &QueryKey) -> Option<V> {
        self.inner.borrow().entries.get(key).map(|e| e.value.clone())
    }

    pub fn state(&self, key: &QueryKey) -> Option<EntryState> {
        self.inner.borrow().entries.get(key).map(|e| e.state)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.borrow().inflight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped by [`clear`](Self::clear). Lets a pending mutation detect that
    /// the session it started in is gone.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    fn fresh_value(&self, key: &QueryKey) -> Option<V> {
        let inner = self.inner.borrow();
        inner
            .entries
            .get(key)
            .filter(|e| e.state == EntryState::Fresh)
            .map(|e| e.value.clone())
    }

    // ========================
    // Writes
    // ========================

    /// Replace the value for `key` and mark it fresh.
    pub fn put(&self, key: QueryKey, value: V) {
        self.inner.borrow_mut().entries.insert(
            key.clone(),
            CacheEntry {
                key: key.clone(),
                value: value.clone(),
                fetched_at: Utc::now(),
                state: EntryState::Fresh,
            },
        );
        self.emit(&CacheEvent::Updated { key: &key, value: &value });
    }

    /// Edit a cached value in place. Returns `false` if nothing is cached.
    pub fn modify(&self, key: &QueryKey, f: impl FnOnce(&mut V)) -> bool {
        let value = {
            let mut inner = self.inner.borrow_mut();
            let Some(entry) = inner.entries.get_mut(key) else {
                return false;
            };
            f(&mut entry.value);
            entry.value.clone()
        };
        self.emit(&CacheEvent::Updated { key, value: &value });
        true
    }

    pub fn remove(&self, key: &QueryKey) -> Option<V> {
        let mut inner = self.inner.borrow_mut();
        inner.inflight.remove(key);
        inner.entries.remove(key).map(|e| e.value)
    }

    /// Mark every entry under `prefix` stale. In-flight fetches under the
    /// prefix are superseded: their results are handed to whoever awaits
    /// them but not stored. Returns the affected keys.
    pub fn invalidate(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        let keys = {
            let mut inner = self.inner.borrow_mut();
            let mut keys = Vec::new();
            for (key, entry) in inner.entries.iter_mut() {
                if key.starts_with(prefix) {
                    entry.state = EntryState::Stale;
                    keys.push(key.clone());
                }
            }
            let superseded: Vec<QueryKey> = inner
                .inflight
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            for key in superseded {
                inner.inflight.remove(&key);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        };
        debug!("invalidated {} entries under {}", keys.len(), prefix);
        for key in &keys {
            self.emit(&CacheEvent::Invalidated { key });
        }
        keys
    }

    /// Drop everything (sign-out). Subscriptions survive and receive an
    /// `Invalidated` event for each dropped key; pending fetches and
    /// mutations from before the clear can no longer write.
    pub fn clear(&self) {
        let dropped = {
            let mut inner = self.inner.borrow_mut();
            let mut dropped: Vec<QueryKey> = inner.entries.drain().map(|(key, _)| key).collect();
            for (key, _) in inner.inflight.drain() {
                if !dropped.contains(&key) {
                    dropped.push(key);
                }
            }
            inner.generation += 1;
            debug!("cache cleared (generation {})", inner.generation);
            dropped
        };
        for key in &dropped {
            self.emit(&CacheEvent::Invalidated { key });
        }
    }

    // ========================
    // Fetching
    // ========================

    /// Serve a fresh cached value, otherwise fetch. Concurrent callers for
    /// the same key share one request.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<V>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ApiResult<V>> + 'static,
    {
        if let Some(value) = self.fresh_value(&key) {
            debug!("cache hit {}", key);
            return Ok(value);
        }
        self.join_or_start(key, fetcher).await
    }

    /// Always go to the network (still de-duplicated).
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<V>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ApiResult<V>> + 'static,
    {
        self.join_or_start(key, fetcher).await
    }

    fn join_or_start<F, Fut>(&self, key: QueryKey, fetcher: F) -> SharedFetch<V>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ApiResult<V>> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        if let Some(inflight) = inner.inflight.get(&key) {
            debug!("joining in-flight fetch for {}", key);
            return inflight.future.clone();
        }

        inner.next_fetch += 1;
        let seq = inner.next_fetch;
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.state = EntryState::Fetching;
        }
        debug!("fetching {} (#{})", key, seq);

        let weak = Rc::downgrade(&self.inner);
        let task_key = key.clone();
        let future = async move {
            let result = fetcher().await;
            if let Some(inner) = weak.upgrade() {
                QueryCache { inner }.settle(&task_key, seq, &result);
            }
            result
        }
        .boxed_local()
        .shared();

        inner.inflight.insert(
            key,
            InFlight {
                seq,
                future: future.clone(),
            },
        );
        future
    }

    fn settle(&self, key: &QueryKey, seq: u64, result: &ApiResult<V>) {
        let current = {
            let mut inner = self.inner.borrow_mut();
            match inner.inflight.get(key) {
                Some(inflight) if inflight.seq == seq => {
                    inner.inflight.remove(key);
                    true
                }
                _ => false,
            }
        };
        if !current {
            debug!("dropping superseded result for {} (#{})", key, seq);
            return;
        }
        match result {
            Ok(value) => self.put(key.clone(), value.clone()),
            Err(err) => {
                warn!("fetch for {} failed: {}", key, err);
                if let Some(entry) = self.inner.borrow_mut().entries.get_mut(key) {
                    entry.state = EntryState::Stale;
                }
            }
        }
    }

    // ========================
    // Subscriptions
    // ========================

    /// Called on every `put`/`modify`/invalidation of exactly `key`.
    pub fn subscribe(&self, key: QueryKey, callback: impl Fn(&CacheEvent<'_, V>) + 'static) -> SubscriptionId {
        self.add_subscriber(Filter::Exact(key), Rc::new(callback))
    }

    /// Called for every key under `prefix`.
    pub fn subscribe_prefix(
        &self,
        prefix: QueryKey,
        callback: impl Fn(&CacheEvent<'_, V>) + 'static,
    ) -> SubscriptionId {
        self.add_subscriber(Filter::Prefix(prefix), Rc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != id);
        inner.subscribers.len() != before
    }

    fn add_subscriber(&self, filter: Filter, callback: Callback<V>) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.subscribers.push(Subscriber { id, filter, callback });
        id
    }

    fn emit(&self, event: &CacheEvent<'_, V>) {
        let callbacks: Vec<Callback<V>> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.filter.matches(event.key()))
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}
