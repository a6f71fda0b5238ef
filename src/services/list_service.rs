use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::game_store::GameStore,
    dto::list::{ListSheet, ListedGame, NewListRequest},
    error::ServiceError,
    services::codes::{confirm_matches, normalize_code, unused_code},
    state::{
        SharedState,
        game::{Game, GameError},
        game_list::GameList,
    },
};

/// Create an empty game list under a freshly generated code.
pub async fn create_list(
    state: &SharedState,
    request: NewListRequest,
) -> Result<ListSheet, ServiceError> {
    request.validate()?;
    let store = state.require_game_store().await?;

    let code = unused_code(|code| store.find_list(code)).await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let list = GameList::new(code, request.name.trim());
    store.save_list(list.clone().into()).await?;
    info!(list = %list.id, name = %list.name, "game list created");

    build_sheet(store.as_ref(), list).await
}

/// Load a list together with the current score of every listed game.
pub async fn get_list(state: &SharedState, code: &str) -> Result<ListSheet, ServiceError> {
    let code = normalize_code(code);
    let store = state.require_game_store().await?;
    let Some(entity) = store.find_list(&code).await? else {
        return Err(ServiceError::NotFound(format!("game list `{code}` not found")));
    };
    build_sheet(store.as_ref(), entity.into()).await
}

/// Append an existing game to a list.
pub async fn add_game_to_list(
    state: &SharedState,
    list_code: &str,
    game_code: &str,
) -> Result<ListSheet, ServiceError> {
    let game_code = normalize_code(game_code);
    let store = state.require_game_store().await?;
    if store.find_game(&game_code).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game `{game_code}` not found")));
    }

    mutate_list(state, list_code, "add_game", |list| {
        list.add_game(game_code.clone())
    })
    .await
}

/// Lock a list so no more games can be added.
pub async fn lock_list(
    state: &SharedState,
    code: &str,
    key: &str,
) -> Result<ListSheet, ServiceError> {
    mutate_list(state, code, "lock_list", |list| list.lock(key)).await
}

/// Unlock a list when `key` matches.
pub async fn unlock_list(
    state: &SharedState,
    code: &str,
    key: &str,
) -> Result<ListSheet, ServiceError> {
    mutate_list(state, code, "unlock_list", |list| list.unlock(key)).await
}

/// Delete a list (never its games). `confirm` must repeat the list code.
pub async fn delete_list(state: &SharedState, code: &str, confirm: &str) -> Result<(), ServiceError> {
    let code = normalize_code(code);
    if !confirm_matches(&code, confirm) {
        return Err(ServiceError::Conflict(format!(
            "confirmation does not match game list `{code}`"
        )));
    }

    let store = state.require_game_store().await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let Some(entity) = store.find_list(&code).await? else {
        return Err(ServiceError::NotFound(format!("game list `{code}` not found")));
    };
    GameList::from(entity).ensure_unlocked()?;

    if store.delete_list(&code).await? {
        info!(list = %code, "game list deleted");
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("game list `{code}` not found")))
    }
}

async fn mutate_list<F>(
    state: &SharedState,
    code: &str,
    action: &'static str,
    apply: F,
) -> Result<ListSheet, ServiceError>
where
    F: FnOnce(&mut GameList) -> Result<(), GameError>,
{
    let code = normalize_code(code);
    let store = state.require_game_store().await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let Some(entity) = store.find_list(&code).await? else {
        return Err(ServiceError::NotFound(format!("game list `{code}` not found")));
    };
    let mut list = GameList::from(entity);

    if let Err(err) = apply(&mut list) {
        warn!(list = %code, action, error = %err, "game list change rejected");
        return Err(err.into());
    }

    store.save_list(list.clone().into()).await?;
    build_sheet(store.as_ref(), list).await
}

async fn build_sheet(store: &dyn GameStore, list: GameList) -> Result<ListSheet, ServiceError> {
    let mut games = Vec::with_capacity(list.games.len());
    let mut missing = Vec::new();

    for game_code in &list.games {
        match store.find_game(game_code).await? {
            Some(entity) => games.push(ListedGame::from(&Game::from(entity))),
            None => {
                warn!(list = %list.id, game = %game_code, "listed game no longer exists");
                missing.push(game_code.clone());
            }
        }
    }

    let locked = list.is_locked();
    Ok(ListSheet {
        id: list.id,
        name: list.name,
        locked,
        games,
        missing,
    })
}

fn record_key(code: &str) -> String {
    format!("list:{code}")
}
