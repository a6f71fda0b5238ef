use crate::{
    dao::models::GameListEntity,
    state::game::{GameError, LockKey},
};

/// Named collection of game codes, e.g. a tournament or a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameList {
    /// Unique list code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Member game codes in the order they were added.
    pub games: Vec<String>,
    lock: LockKey,
}

impl GameList {
    /// Create an empty, unlocked list.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            games: Vec::new(),
            lock: LockKey::default(),
        }
    }

    /// Append a game code. Codes already listed are left where they are.
    pub fn add_game(&mut self, game_id: impl Into<String>) -> Result<(), GameError> {
        self.lock.ensure_unlocked(&self.id)?;
        let game_id = game_id.into();
        if !self.games.contains(&game_id) {
            self.games.push(game_id);
        }
        Ok(())
    }

    /// Whether the list refuses mutation.
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Fail when the list is locked.
    pub fn ensure_unlocked(&self) -> Result<(), GameError> {
        self.lock.ensure_unlocked(&self.id)
    }

    /// Lock the list with `key`.
    pub fn lock(&mut self, key: &str) -> Result<(), GameError> {
        self.lock.lock(&self.id, key)
    }

    /// Unlock the list when `key` matches.
    pub fn unlock(&mut self, key: &str) -> Result<(), GameError> {
        self.lock.unlock(key)
    }
}

impl From<GameListEntity> for GameList {
    fn from(entity: GameListEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            games: entity.games,
            lock: LockKey::new(entity.locked_with),
        }
    }
}

impl From<GameList> for GameListEntity {
    fn from(list: GameList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            games: list.games,
            locked_with: list.lock.as_str().to_owned(),
        }
    }
}
