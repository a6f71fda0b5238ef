//! In-process store keeping every document as serialized JSON, so reads never alias writes.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use serde::{Serialize, de::DeserializeOwned};

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameListEntity},
    storage::{StorageError, StorageResult},
};

/// [`GameStore`] kept in process memory. Clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    games: Arc<DashMap<String, Vec<u8>>>,
    lists: Arc<DashMap<String, Vec<u8>>>,
}

fn encode<T: Serialize>(id: &str, value: &T) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| StorageError::Serialization {
        id: id.to_owned(),
        source,
    })
}

fn decode<T: DeserializeOwned>(id: &str, bytes: Option<Vec<u8>>) -> StorageResult<Option<T>> {
    bytes
        .map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|source| StorageError::Serialization {
                id: id.to_owned(),
                source,
            })
        })
        .transpose()
}

impl GameStore for MemoryGameStore {
    fn describe(&self) -> String {
        "in-memory store".to_owned()
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let result = encode(&game.id, &game).map(|bytes| {
            self.games.insert(game.id.clone(), bytes);
        });
        Box::pin(future::ready(result))
    }

    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let bytes = self.games.get(id).map(|entry| entry.value().clone());
        Box::pin(future::ready(decode(id, bytes)))
    }

    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.games.remove(id).is_some();
        Box::pin(future::ready(Ok(removed)))
    }

    fn save_list(&self, list: GameListEntity) -> BoxFuture<'static, StorageResult<()>> {
        let result = encode(&list.id, &list).map(|bytes| {
            self.lists.insert(list.id.clone(), bytes);
        });
        Box::pin(future::ready(result))
    }

    fn find_list(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameListEntity>>> {
        let bytes = self.lists.get(id).map(|entry| entry.value().clone());
        Box::pin(future::ready(decode(id, bytes)))
    }

    fn delete_list(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.lists.remove(id).is_some();
        Box::pin(future::ready(Ok(removed)))
    }

    fn is_empty(&self) -> BoxFuture<'static, StorageResult<bool>> {
        Box::pin(future::ready(Ok(self.games.is_empty())))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}
