use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        validation::{validate_clock_time, validate_not_blank},
    },
    state::{
        clock::EventTime,
        game::{Event, EventKind, Game, Side},
        summary::GameSummary,
    },
};

/// Payload used to open a new scoresheet.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGameRequest {
    /// Home team name.
    #[validate(custom(function = "validate_not_blank"), length(max = 64))]
    pub home_team: String,
    /// Away team name.
    #[validate(custom(function = "validate_not_blank"), length(max = 64))]
    pub away_team: String,
    /// `YYYY-MM-DD`; anything else is kept verbatim in the title.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub game_date: String,
    /// Rink, optional.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub venue: String,
    /// League or tournament, optional.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub competition: String,
}

/// A goal as typed by the scorekeeper.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoalInput {
    /// Period (1-based).
    #[validate(range(min = 1))]
    pub period: u32,
    /// Countdown clock reading, `MM:SS`.
    #[validate(custom(function = "validate_clock_time"))]
    pub clock_time: String,
    /// Scoring team.
    pub side: Side,
    /// Scorer's number.
    #[validate(range(max = 99))]
    pub player: u32,
    /// Zero or absent means no assist.
    #[serde(default)]
    #[validate(range(max = 99))]
    pub assist1: Option<u32>,
    /// Second assist, same rules as `assist1`.
    #[serde(default)]
    #[validate(range(max = 99))]
    pub assist2: Option<u32>,
    /// "Even", "PP", "SH", ...
    #[serde(default)]
    #[validate(length(max = 32))]
    pub category: String,
}

/// A penalty as typed by the scorekeeper.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PenaltyInput {
    /// Period (1-based).
    #[validate(range(min = 1))]
    pub period: u32,
    /// Countdown clock reading, `MM:SS`.
    #[validate(custom(function = "validate_clock_time"))]
    pub clock_time: String,
    /// Penalised team.
    pub side: Side,
    /// Penalised player's number.
    #[validate(range(max = 99))]
    pub player: u32,
    /// Penalty minutes.
    #[validate(range(min = 1, max = 25))]
    pub minutes: u32,
    /// Infraction, e.g. "Trip".
    #[serde(default)]
    #[validate(length(max = 32))]
    pub category: String,
}

/// Roster entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayerInput {
    /// Team the player belongs to.
    pub side: Side,
    /// Jersey number.
    #[validate(range(max = 99))]
    pub number: u32,
    /// Display name.
    #[validate(custom(function = "validate_not_blank"), length(max = 64))]
    pub name: String,
}

/// One logged event as shown on the scoresheet.
#[derive(Debug, Clone, Serialize)]
pub struct EventLine {
    /// Id accepted by id-based removal.
    pub id: Uuid,
    /// `"<game time> <side> <type>"`, also accepted by label-based removal.
    pub label: String,
    /// Period (1-based).
    pub period: u32,
    /// Countdown clock reading.
    pub clock_time: EventTime,
    /// Cumulative game time.
    pub game_time: EventTime,
    /// Team credited.
    pub side: Side,
    /// "Goal" or "Penalty".
    pub event_type: &'static str,
    /// Scorer or penalised player.
    pub player: u32,
    /// Roster name of `player`, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    /// First assist of a goal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist1: Option<u32>,
    /// Second assist of a goal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist2: Option<u32>,
    /// Minutes of a penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    /// Category tag.
    pub category: String,
}

impl EventLine {
    fn from_event(event: &Event, roster: &BTreeMap<u32, String>) -> Self {
        let (assist1, assist2, minutes) = match event.kind {
            EventKind::Goal { assist1, assist2 } => (assist1, assist2, None),
            EventKind::Penalty { minutes } => (None, None, Some(minutes)),
        };
        Self {
            id: event.id,
            label: event.label(),
            period: event.period,
            clock_time: event.clock_time,
            game_time: event.game_time,
            side: event.side,
            event_type: event.type_name(),
            player: event.player,
            player_name: roster.get(&event.player).cloned(),
            assist1,
            assist2,
            minutes,
            category: event.category.clone(),
        }
    }
}

/// Read model of a game: metadata, chronologically sorted events and the derived summary.
#[derive(Debug, Clone, Serialize)]
pub struct GameSheet {
    /// Game code.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Date as entered.
    pub game_date: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Venue, possibly empty.
    pub venue: String,
    /// Competition, possibly empty.
    pub competition: String,
    /// Highest period seen.
    pub period: u32,
    /// Whether the game refuses changes.
    pub locked: bool,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last change.
    pub updated_at: String,
    /// Events sorted by game time.
    pub events: Vec<EventLine>,
    /// Scoreboard derived from `events`.
    pub summary: GameSummary,
    /// Home roster.
    pub home_players: BTreeMap<u32, String>,
    /// Away roster.
    pub away_players: BTreeMap<u32, String>,
}

impl From<Game> for GameSheet {
    fn from(mut game: Game) -> Self {
        game.sort_events();
        let summary = game.summarise();
        let events = game
            .events()
            .iter()
            .map(|event| EventLine::from_event(event, game.roster(event.side)))
            .collect();
        let locked = game.is_locked();

        Self {
            id: game.id,
            title: game.title,
            game_date: game.game_date,
            home_team: game.home_team,
            away_team: game.away_team,
            venue: game.venue,
            competition: game.competition,
            period: game.period,
            locked,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
            events,
            summary,
            home_players: game.home_players,
            away_players: game.away_players,
        }
    }
}
