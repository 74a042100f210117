//! Cached queries
//!
//! Every remote read goes through [`QueryClient::fetch`]: results are cached
//! under an ordered [`QueryKey`], served from cache while fresh, and retried
//! with exponential backoff on failure. Views get a [`QueryState`] back and
//! can [`QueryClient::subscribe`] to hear about updates and invalidations.

mod key;

pub use key::QueryKey;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::error::QueryError;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Per-query behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result is served without refetching
    pub stale_time: Duration,
    /// Extra attempts after the first failure
    pub retries: u32,
    /// Base delay, doubled per attempt and capped at 30 s
    pub retry_delay: Duration,
    /// Disabled queries never call their fetcher
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

/// What a view sees for one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<QueryError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        QueryState {
            data: self.data.map(f),
            is_loading: self.is_loading,
            error: self.error,
        }
    }

    /// Collapse into a `Result`, preferring the error when one is present
    pub fn into_result(self) -> Result<Option<T>, QueryError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

/// Cache notifications, replacing implicit re-rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    Updated(QueryKey),
    Failed(QueryKey),
    Invalidated(QueryKey),
    Removed(QueryKey),
}

#[derive(Default)]
struct Entry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    error: Option<QueryError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    fetching: bool,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated
            && self.data.is_some()
            && self
                .updated_at
                .map(|at| at.elapsed() < stale_time)
                .unwrap_or(false)
    }

    fn typed<T: Clone + 'static>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|d| d.downcast_ref::<T>())
            .cloned()
    }
}

/// Query cache shared by every view
pub struct QueryClient {
    entries: RwLock<HashMap<QueryKey, Entry>>,
    defaults: QueryOptions,
    events: broadcast::Sender<QueryEvent>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl QueryClient {
    pub fn new(defaults: QueryOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            defaults,
            events,
        }
    }

    pub fn defaults(&self) -> QueryOptions {
        self.defaults
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: QueryEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Fetch with the client's default options
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        self.fetch_with(key, self.defaults, fetcher).await
    }

    /// Serve fresh cached data, otherwise run `fetcher` with retries and cache the outcome
    pub async fn fetch_with<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QueryState<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        if !options.enabled {
            return QueryState::idle();
        }

        let previous = {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(key.clone()).or_default();
            if entry.is_fresh(options.stale_time) {
                if let Some(data) = entry.typed::<T>() {
                    debug!(%key, "query served from cache");
                    return QueryState::success(data);
                }
            }
            entry.fetching = true;
            entry.typed::<T>()
        };

        let mut attempt = 0;
        let outcome = loop {
            match fetcher().await {
                Ok(data) => break Ok(data),
                Err(err) if attempt < options.retries => {
                    let delay = options.backoff(attempt);
                    warn!(%key, attempt = attempt + 1, error = %err, ?delay, "query failed; retrying");
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(err) => break Err(err),
            }
        };

        let mut entries = self.entries.write().await;
        let entry = entries.entry(key.clone()).or_default();
        entry.fetching = false;

        match outcome {
            Ok(data) => {
                entry.data = Some(Arc::new(data.clone()));
                entry.error = None;
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
                drop(entries);
                self.emit(QueryEvent::Updated(key));
                QueryState::success(data)
            }
            Err(err) => {
                entry.error = Some(err.clone());
                drop(entries);
                self.emit(QueryEvent::Failed(key));
                QueryState {
                    data: previous,
                    is_loading: false,
                    error: Some(err),
                }
            }
        }
    }

    /// Current cached state without fetching
    pub async fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => QueryState {
                data: entry.typed::<T>(),
                is_loading: entry.fetching,
                error: entry.error.clone(),
            },
            None => QueryState::idle(),
        }
    }

    /// Seed or overwrite cached data
    pub async fn set_data<T: Clone + Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(key.clone()).or_default();
            entry.data = Some(Arc::new(data));
            entry.error = None;
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
        }
        self.emit(QueryEvent::Updated(key));
    }

    /// Mark every entry under `prefix` stale; the next fetch goes to the network.
    /// Returns the number of entries touched.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let touched: Vec<QueryKey> = {
            let mut entries = self.entries.write().await;
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    key.clone()
                })
                .collect()
        };
        debug!(%prefix, count = touched.len(), "queries invalidated");
        let count = touched.len();
        for key in touched {
            self.emit(QueryEvent::Invalidated(key));
        }
        count
    }

    /// Drop every entry under `prefix`
    pub async fn remove(&self, prefix: &QueryKey) -> usize {
        let removed: Vec<QueryKey> = {
            let mut entries = self.entries.write().await;
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };
        let count = removed.len();
        for key in removed {
            self.emit(QueryEvent::Removed(key));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> QueryOptions {
        QueryOptions {
            retry_delay: Duration::ZERO,
            ..QueryOptions::default()
        }
    }

    #[tokio::test]
    async fn fresh_data_is_served_from_cache() {
        let client = QueryClient::new(fast());
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let key = QueryKey::new("txVolume").with("WEEK_1");

        for _ in 0..3 {
            let state = client
                .fetch(key.clone(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, QueryError>(42u64)
                })
                .await;
            assert_eq!(state.data, Some(42));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_retry_twice_then_surface() {
        let client = QueryClient::new(fast());
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let state: QueryState<u64> = client
            .fetch(QueryKey::new("topUsers"), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::new("Failed to fetch top users").into())
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(
            state.error.map(|e| e.to_string()).as_deref(),
            Some("Failed to fetch top users")
        );
    }

    #[tokio::test]
    async fn retry_recovers_on_second_attempt() {
        let client = QueryClient::new(fast());
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let state = client
            .fetch(QueryKey::new("flaky"), move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(QueryError::UnexpectedFormat)
                } else {
                    Ok("ok".to_string())
                }
            })
            .await;

        assert_eq!(state.data.as_deref(), Some("ok"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_refetch_for_prefix_only() {
        let client = QueryClient::new(fast());
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let client = &client;
        let saved = QueryKey::new("savedContracts");
        let single = QueryKey::new("savedContract").with("C1");

        let fetch = move |key: QueryKey| async move {
            client
                .fetch(key, move || async move {
                    Ok::<_, QueryError>(calls.fetch_add(1, Ordering::SeqCst))
                })
                .await
        };

        fetch(saved.clone()).await;
        fetch(single.clone()).await;
        assert_eq!(client.invalidate(&saved).await, 1);

        assert_eq!(fetch(saved.clone()).await.data, Some(2));
        assert_eq!(fetch(single.clone()).await.data, Some(1));
    }

    #[tokio::test]
    async fn disabled_query_never_fetches() {
        let client = QueryClient::new(fast());
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let state: QueryState<u32> = client
            .fetch_with(
                QueryKey::new("savedContract").with(""),
                fast().enabled(false),
                move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            )
            .await;
        assert_eq!(state, QueryState::idle());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn subscribers_hear_updates_and_invalidations() {
        let client = QueryClient::new(fast());
        let mut events = client.subscribe();
        let key = QueryKey::new("userProfile");

        client.set_data(key.clone(), 1u8).await;
        client.invalidate(&key).await;

        assert_eq!(events.recv().await.unwrap(), QueryEvent::Updated(key.clone()));
        assert_eq!(events.recv().await.unwrap(), QueryEvent::Invalidated(key));
    }

    #[tokio::test]
    async fn remove_drops_only_entries_under_prefix() {
        let client = QueryClient::new(fast());
        let single = QueryKey::new("savedContract").with("C1");
        let list = QueryKey::new("savedContracts");
        client.set_data(single.clone(), 1u8).await;
        client.set_data(list.clone(), 2u8).await;
        let mut events = client.subscribe();

        assert_eq!(client.remove(&QueryKey::new("savedContract")).await, 1);
        assert_eq!(events.recv().await.unwrap(), QueryEvent::Removed(single.clone()));
        assert!(events.try_recv().is_err());

        let gone: QueryState<u8> = client.peek(&single).await;
        assert_eq!(gone, QueryState::idle());
        let kept: QueryState<u8> = client.peek(&list).await;
        assert_eq!(kept.data, Some(2));

        assert_eq!(client.remove(&QueryKey::new("savedContract")).await, 0);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_previous_data() {
        let client = QueryClient::new(QueryOptions {
            retries: 0,
            ..fast()
        });
        let key = QueryKey::new("allTxFees");
        client.set_data(key.clone(), 7u64).await;
        client.invalidate(&key).await;

        let state: QueryState<u64> = client
            .fetch(key.clone(), || async { Err(QueryError::UnexpectedFormat) })
            .await;
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error, Some(QueryError::UnexpectedFormat));

        let peeked: QueryState<u64> = client.peek(&key).await;
        assert_eq!(peeked.error, Some(QueryError::UnexpectedFormat));
        assert!(!peeked.is_loading);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let opts = QueryOptions::default();
        assert_eq!(opts.backoff(0), Duration::from_millis(1000));
        assert_eq!(opts.backoff(1), Duration::from_millis(2000));
        assert_eq!(opts.backoff(10), MAX_RETRY_DELAY);
    }
}
