use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use tracing::info;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, MongoListDocument, doc_id},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameListEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const LIST_COLLECTION_NAME: &str = "lists";

/// MongoDB-backed [`GameStore`]: one document per game in `games`, one per list in `lists`.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        info!(database = %self.config.database_name, "MongoDB connection re-established");
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"title": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_title_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "title",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn list_collection(&self) -> Collection<MongoListDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoListDocument>(LIST_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id.clone();
        let document: MongoGameDocument = game.into();
        let collection = self.collection().await;
        collection
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    async fn find_game(&self, id: String) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn delete_game(&self, id: String) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn save_list(&self, list: GameListEntity) -> MongoResult<()> {
        let id = list.id.clone();
        let document: MongoListDocument = list.into();
        let collection = self.list_collection().await;
        collection
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveList { id, source })?;
        Ok(())
    }

    async fn find_list(&self, id: String) -> MongoResult<Option<GameListEntity>> {
        let collection = self.list_collection().await;
        let document = collection
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadList { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn delete_list(&self, id: String) -> MongoResult<bool> {
        let collection = self.list_collection().await;
        let result = collection
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::DeleteList { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn is_empty(&self) -> MongoResult<bool> {
        let collection = self.collection().await;
        let count = collection
            .estimated_document_count()
            .await
            .map_err(|source| MongoDaoError::CountGames { source })?;
        Ok(count == 0)
    }
}

impl GameStore for MongoGameStore {
    fn describe(&self) -> String {
        format!("MongoDB database `{}`", self.inner.config.database_name)
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn save_list(&self, list: GameListEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_list(list).await.map_err(Into::into) })
    }

    fn find_list(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<GameListEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.find_list(id).await.map_err(Into::into) })
    }

    fn delete_list(&self, id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.delete_list(id).await.map_err(Into::into) })
    }

    fn is_empty(&self) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.is_empty().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
