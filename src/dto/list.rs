use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{dto::validation::validate_not_blank, state::game::Game};

/// Payload used to create a game list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewListRequest {
    /// Display name, e.g. "Spring cup".
    #[validate(custom(function = "validate_not_blank"), length(max = 128))]
    pub name: String,
}

/// Score line of one game inside a list.
#[derive(Debug, Clone, Serialize)]
pub struct ListedGame {
    /// Game code.
    pub id: String,
    /// Game title.
    pub title: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Current home score.
    pub home_goals: u32,
    /// Current away score.
    pub away_goals: u32,
    /// Whether the game is locked.
    pub locked: bool,
}

impl From<&Game> for ListedGame {
    fn from(game: &Game) -> Self {
        let summary = game.summarise();
        Self {
            id: game.id.clone(),
            title: game.title.clone(),
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            home_goals: summary.home_goals,
            away_goals: summary.away_goals,
            locked: game.is_locked(),
        }
    }
}

/// Read model of a game list.
#[derive(Debug, Clone, Serialize)]
pub struct ListSheet {
    /// List code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the list refuses changes.
    pub locked: bool,
    /// Score lines in the order the games were added.
    pub games: Vec<ListedGame>,
    /// Codes listed but no longer present in storage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}
