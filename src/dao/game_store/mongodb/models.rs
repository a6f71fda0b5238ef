use std::collections::BTreeMap;

use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::dao::models::{EventEntity, GameEntity, GameListEntity};

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    game_date: String,
    home_team: String,
    away_team: String,
    #[serde(default)]
    venue: String,
    #[serde(default)]
    competition: String,
    period: u32,
    #[serde(default)]
    events: Vec<EventEntity>,
    #[serde(default)]
    locked_with: String,
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    home_players: BTreeMap<u32, String>,
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    away_players: BTreeMap<u32, String>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            game_date: value.game_date,
            home_team: value.home_team,
            away_team: value.away_team,
            venue: value.venue,
            competition: value.competition,
            period: value.period,
            events: value.events,
            locked_with: value.locked_with,
            home_players: value.home_players,
            away_players: value.away_players,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            game_date: value.game_date,
            home_team: value.home_team,
            away_team: value.away_team,
            venue: value.venue,
            competition: value.competition,
            period: value.period,
            events: value.events,
            locked_with: value.locked_with,
            home_players: value.home_players,
            away_players: value.away_players,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoListDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    games: Vec<String>,
    #[serde(default)]
    locked_with: String,
}

impl From<GameListEntity> for MongoListDocument {
    fn from(value: GameListEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            games: value.games,
            locked_with: value.locked_with,
        }
    }
}

impl From<MongoListDocument> for GameListEntity {
    fn from(value: MongoListDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            games: value.games,
            locked_with: value.locked_with,
        }
    }
}

/// `_id` filter for one document.
pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}
