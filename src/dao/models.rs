use std::{collections::BTreeMap, time::SystemTime};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use uuid::Uuid;

/// Aggregate game document persisted by the storage layer.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Game code, primary key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Date as entered by the scorekeeper.
    #[serde(default)]
    pub game_date: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Venue, possibly empty.
    #[serde(default)]
    pub venue: String,
    /// Competition, possibly empty.
    #[serde(default)]
    pub competition: String,
    /// Highest period seen.
    pub period: u32,
    /// Logged events in insertion order.
    #[serde(default)]
    pub events: Vec<EventEntity>,
    /// Lock key, empty when unlocked.
    #[serde(default)]
    pub locked_with: String,
    /// Home roster keyed by player number (string keys on disk).
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub home_players: BTreeMap<u32, String>,
    /// Away roster keyed by player number (string keys on disk).
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub away_players: BTreeMap<u32, String>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last time the document was written.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Whether any stored event still lacks an id and needs one written back.
    pub fn has_events_without_id(&self) -> bool {
        self.events.iter().any(|event| event.id.is_none())
    }
}

/// Flat representation of a goal or penalty inside a [`GameEntity`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEntity {
    /// Stable event identifier. Absent in documents written before ids existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Period (1-based).
    pub period: u32,
    /// Countdown clock reading, `MM:SS`.
    pub clock_time: String,
    /// Cumulative game time, `MM:SS`.
    pub game_time: String,
    /// "Goal" or "Penalty".
    pub event_type: String,
    /// "Home" or "Away".
    pub home_away: String,
    /// Category tag.
    #[serde(default)]
    pub category: String,
    /// Scoring or penalised player.
    pub player: u32,
    /// First assist, 0 when none.
    #[serde(default)]
    pub assist1: u32,
    /// Second assist, 0 when none.
    #[serde(default)]
    pub assist2: u32,
    /// Penalty minutes, 0 for goals.
    #[serde(default)]
    pub minutes: u32,
}

/// Game list document persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameListEntity {
    /// List code, primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Member game codes.
    #[serde(default)]
    pub games: Vec<String>,
    /// Lock key, empty when unlocked.
    #[serde(default)]
    pub locked_with: String,
}
