//! Client-side state stores
//!
//! Each store holds one slice of shared UI state with a getter, a setter and
//! explicit subscription. Nothing is persisted; state lives as long as the
//! process.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::api::{SavedContract, UserProfile};
use crate::types::{Limit, TimeRange};

/// Single mutable slice with change notification
#[derive(Debug, Clone)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Receiver that sees the current value and every later change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Same as [`Store::subscribe`], as a `Stream`
    pub fn watch(&self) -> WatchStream<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Selected time range; defaults to one week
pub type TimeRangeStore = Store<TimeRange>;
/// Result limit for tables; defaults to 10
pub type LimitStore = Store<Limit>;
/// Last fetched saved-contracts list, most recently updated first
pub type SavedContractsStore = Store<Vec<SavedContract>>;
/// Profile of the signed-in user, once fetched
pub type ProfileStore = Store<Option<UserProfile>>;

/// All stores for one session
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub time_range: TimeRangeStore,
    pub limit: LimitStore,
    pub saved_contracts: SavedContractsStore,
    pub profile: ProfileStore,
}
