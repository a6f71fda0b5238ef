pub mod clock;
pub mod game;
pub mod game_list;
pub mod summary;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};

use crate::{dao::game_store::GameStore, error::ServiceError};

/// Handle shared by every service call.
pub type SharedState = Arc<AppState>;

/// Storage handle plus the bookkeeping that keeps read-modify-write cycles safe.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    degraded: watch::Sender<bool>,
    record_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new() -> SharedState {
        let (degraded, _rx) = watch::channel(true);
        Arc::new(Self {
            game_store: RwLock::new(None),
            degraded,
            record_locks: DashMap::new(),
        })
    }

    /// Construct a state with `store` already installed.
    pub fn with_store(store: Arc<dyn GameStore>) -> SharedState {
        let (degraded, _rx) = watch::channel(false);
        Arc::new(Self {
            game_store: RwLock::new(Some(store)),
            degraded,
            record_locks: DashMap::new(),
        })
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the game store, failing while degraded.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Serialize read-modify-write cycles on one stored record.
    ///
    /// Holders of the returned guard are the only writer of `key` within this process.
    pub async fn lock_record(&self, key: &str) -> RecordGuard<'_> {
        let lock = self
            .record_locks
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        RecordGuard {
            key: key.to_owned(),
            locks: &self.record_locks,
            guard: Some(lock.lock_owned().await),
        }
    }
}

/// Exclusive hold on one record key. The key's entry is dropped with the last holder.
pub struct RecordGuard<'a> {
    key: String,
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone of the mutex, so the entry survives while anyone queues on it.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
