use serde::{Deserialize, Serialize};

use crate::dao::models::{GameEntity, GameListEntity};

/// Document id prefix of games.
pub const GAME_PREFIX: &str = "game::";
/// Document id prefix of game lists.
pub const LIST_PREFIX: &str = "list::";
/// Upper bound appended to a prefix for `_all_docs` range queries.
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[allow(dead_code)]
    pub id: String,
}

/// Minimal projection used to learn the current revision of a document.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameEntity,
}

impl From<(GameEntity, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameEntity, Option<String>)) -> Self {
        Self {
            id: game_doc_id(&game.id),
            rev,
            game,
        }
    }
}

impl From<CouchGameDocument> for GameEntity {
    fn from(doc: CouchGameDocument) -> Self {
        doc.game
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchListDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub list: GameListEntity,
}

impl From<(GameListEntity, Option<String>)> for CouchListDocument {
    fn from((list, rev): (GameListEntity, Option<String>)) -> Self {
        Self {
            id: list_doc_id(&list.id),
            rev,
            list,
        }
    }
}

impl From<CouchListDocument> for GameListEntity {
    fn from(doc: CouchListDocument) -> Self {
        doc.list
    }
}

/// CouchDB document id of a game code.
pub fn game_doc_id(id: &str) -> String {
    format!("{GAME_PREFIX}{id}")
}

/// CouchDB document id of a list code.
pub fn list_doc_id(id: &str) -> String {
    format!("{LIST_PREFIX}{id}")
}
