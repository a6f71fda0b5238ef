use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    error::ServiceError,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend, then keep it healthy.
///
/// The shared state stays in degraded mode whenever no healthy store is installed. Never returns.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                info!(storage = %store.describe(), "storage connection established; leaving degraded mode");
                state.set_game_store(store.clone()).await;
                delay = INITIAL_DELAY;

                supervise(&state, store.as_ref()).await;

                state.clear_game_store().await;
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll `store` until it fails and cannot be reconnected.
async fn supervise(state: &SharedState, store: &dyn GameStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded() {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false);
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        let mut reconnect_delay = INITIAL_DELAY;
        let mut reconnected = false;
        for attempt in 0..MAX_RECONNECT_ATTEMPTS {
            match store.try_reconnect().await {
                Ok(()) => {
                    info!(attempt, "storage reconnection succeeded after health check failure");
                    reconnected = true;
                    break;
                }
                Err(err) => {
                    if attempt == 0 {
                        warn!(attempt, error = %err, "storage reconnect failed; entering degraded mode");
                        state.update_degraded(true);
                    } else {
                        warn!(attempt, error = %err, "storage reconnect attempt failed");
                    }
                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                }
            }
        }

        if !reconnected {
            warn!("exhausted storage reconnect attempts; staying in degraded mode");
            return;
        }
        state.update_degraded(false);
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Wait until the state leaves degraded mode, for at most `limit`.
pub async fn wait_for_storage(state: &SharedState, limit: Duration) -> Result<(), ServiceError> {
    let mut watcher = state.degraded_watcher();
    match timeout(limit, watcher.wait_for(|degraded| !degraded)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) | Err(_) => Err(ServiceError::Degraded),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{dao::game_store::memory::MemoryGameStore, state::AppState};

    #[tokio::test]
    async fn installs_the_connected_store() {
        let state = AppState::new();
        let handle = tokio::spawn(run(state.clone(), || async {
            Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(MemoryGameStore::default()))
        }));

        wait_for_storage(&state, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(state.game_store().await.is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn stays_degraded_while_connecting_fails() {
        let state = AppState::new();
        let handle = tokio::spawn(run(state.clone(), || async {
            Err::<Arc<dyn GameStore>, _>(StorageError::unavailable(
                "unreachable".into(),
                io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
            ))
        }));

        let result = wait_for_storage(&state, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ServiceError::Degraded)));
        assert!(state.is_degraded());
        handle.abort();
    }
}
