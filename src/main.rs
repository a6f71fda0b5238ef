//! Scoresheet binary: connects storage, seeds the demo games and prints requested game sheets.

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use icehockey_scoresheet::{
    config::{AppConfig, StorageBackend},
    dao::{
        game_store::{GameStore, memory::MemoryGameStore},
        storage::StorageError,
    },
    services::{game_service, health_service, storage_supervisor},
    state::AppState,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STORAGE_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let state = AppState::new();

    tokio::spawn(spawn_supervisor(state.clone(), config.storage));
    storage_supervisor::wait_for_storage(&state, STORAGE_STARTUP_TIMEOUT)
        .await
        .with_context(|| format!("{} storage did not become available", config.storage))?;

    if config.seed_demo_games {
        let seeded = game_service::seed_demo_games(&state)
            .await
            .context("seeding demo games")?;
        info!(seeded, "demo seed finished");
    }

    let health = health_service::health_status(&state).await;
    info!(status = %health.status, storage = ?health.storage, "health");

    let mut failures = 0;
    for code in env::args().skip(1) {
        match game_service::get_game(&state, &code).await {
            Ok(sheet) => {
                let json = serde_json::to_string_pretty(&sheet).context("rendering game sheet")?;
                println!("{json}");
            }
            Err(err) => {
                error!(game = %code, error = %err, "cannot load game");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} game(s) could not be loaded");
    }
    Ok(())
}

async fn spawn_supervisor(state: icehockey_scoresheet::state::SharedState, backend: StorageBackend) {
    match backend {
        StorageBackend::Memory => {
            let store = MemoryGameStore::default();
            storage_supervisor::run(state, move || {
                let store = store.clone();
                async move { Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store)) }
            })
            .await
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use icehockey_scoresheet::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

            storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoGameStore::connect(config).await?;
                Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
            })
            .await
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use icehockey_scoresheet::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

            storage_supervisor::run(state, || async {
                let config = CouchConfig::from_env()?;
                let store = CouchGameStore::connect(config).await?;
                Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
            })
            .await
        }
        #[allow(unreachable_patterns)]
        other => {
            error!(storage = %other, "storage backend not compiled into this binary");
        }
    }
}

/// Configure tracing subscribers, `info` unless `RUST_LOG` says otherwise.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
