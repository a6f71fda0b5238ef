#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameEntity, GameListEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the document store holding games and game lists.
///
/// Records are read and written whole; there is no field-level update.
pub trait GameStore: Send + Sync {
    /// Short human-readable description of the backend, for logs.
    fn describe(&self) -> String;
    /// Insert or replace a game document.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a game document by code.
    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Delete a game document, returning whether it existed.
    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>>;
    /// Insert or replace a game list document.
    fn save_list(&self, list: GameListEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a game list document by code.
    fn find_list(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameListEntity>>>;
    /// Delete a game list document, returning whether it existed.
    fn delete_list(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>>;
    /// Whether no game has been stored yet.
    fn is_empty(&self) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap round-trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
