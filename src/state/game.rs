use std::{collections::BTreeMap, fmt, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::{EventEntity, GameEntity},
    state::{
        clock::{EventTime, clock_to_game_time},
        summary::{GameSummary, summarise},
    },
};

const GOAL: &str = "Goal";
const PENALTY: &str = "Penalty";
const DELETED: &str = "DELETED";

const DATE_INPUT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATE_TITLE: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:short] [year]");

/// Failures raised by mutations of a game or game list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The record carries a lock key and refuses mutation.
    #[error("`{0}` is locked")]
    Locked(String),
    /// No event matched the requested id or label.
    #[error("no event `{event}` in game `{game}`")]
    EventNotFound {
        /// Code of the game that was searched.
        game: String,
        /// Id or label the caller asked for.
        event: String,
    },
    /// Periods are 1-based.
    #[error("invalid period {0}: periods start at 1")]
    InvalidPeriod(u32),
    /// Locking requires a non-blank key.
    #[error("lock key must not be empty")]
    EmptyLockKey,
    /// The presented key does not match the stored one.
    #[error("unlock key does not match")]
    UnlockKeyMismatch,
}

/// Reasons a stored event cannot be turned back into an [`Event`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoredEventError {
    /// Tombstone left behind by older removal logic.
    #[error("event was marked deleted")]
    Deleted,
    /// The side is neither home nor away.
    #[error(transparent)]
    Side(#[from] UnknownSide),
    /// Stored period is 0.
    #[error("invalid period 0: periods start at 1")]
    ZeroPeriod,
    /// The event type is neither goal nor penalty.
    #[error("unknown event type `{0}`")]
    UnknownType(String),
}

/// Team an event is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Home team.
    #[serde(alias = "home", alias = "HOME")]
    Home,
    /// Away team.
    #[serde(alias = "away", alias = "AWAY")]
    Away,
}

/// Raised when a side name is neither home nor away.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown side `{0}`")]
pub struct UnknownSide(pub String);

impl Side {
    /// Display name, also used in event labels and stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = UnknownSide;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            s if s.eq_ignore_ascii_case("home") => Ok(Side::Home),
            s if s.eq_ignore_ascii_case("away") => Ok(Side::Away),
            other => Err(UnknownSide(other.to_owned())),
        }
    }
}

/// Kind-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A goal with up to two assisting players.
    Goal {
        /// Primary assist.
        assist1: Option<u32>,
        /// Secondary assist.
        assist2: Option<u32>,
    },
    /// A penalty and the minutes it carries.
    Penalty {
        /// Penalty minutes awarded.
        minutes: u32,
    },
}

/// A logged goal or penalty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Stable identifier assigned at creation.
    pub id: Uuid,
    /// Period the event happened in (1-based).
    pub period: u32,
    /// Countdown clock reading when the event happened.
    pub clock_time: EventTime,
    /// Cumulative game time derived from `period` and `clock_time`.
    pub game_time: EventTime,
    /// Team the event is credited to.
    pub side: Side,
    /// Scoring or penalised player number.
    pub player: u32,
    /// Free-form category tag ("Even", "PP", "Trip", ...).
    pub category: String,
    /// Goal or penalty details.
    pub kind: EventKind,
}

impl Event {
    /// Build a goal, stamping its game time.
    pub fn goal(
        period: u32,
        clock_time: EventTime,
        side: Side,
        player: u32,
        assist1: Option<u32>,
        assist2: Option<u32>,
        category: impl Into<String>,
    ) -> Self {
        Self::build(
            period,
            clock_time,
            side,
            player,
            category.into(),
            EventKind::Goal {
                assist1: assist1.filter(|&n| n > 0),
                assist2: assist2.filter(|&n| n > 0),
            },
        )
    }

    /// Build a penalty, stamping its game time.
    pub fn penalty(
        period: u32,
        clock_time: EventTime,
        side: Side,
        player: u32,
        minutes: u32,
        category: impl Into<String>,
    ) -> Self {
        Self::build(
            period,
            clock_time,
            side,
            player,
            category.into(),
            EventKind::Penalty { minutes },
        )
    }

    fn build(
        period: u32,
        clock_time: EventTime,
        side: Side,
        player: u32,
        category: String,
        kind: EventKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            clock_time,
            game_time: clock_to_game_time(period, clock_time),
            side,
            player,
            category,
            kind,
        }
    }

    /// "Goal" or "Penalty".
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::Goal { .. } => GOAL,
            EventKind::Penalty { .. } => PENALTY,
        }
    }

    /// Human-readable label `"<game time> <side> <type>"`, e.g. `"01:30 Home Goal"`.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.game_time, self.side, self.type_name())
    }

    /// Non-zero assisting player numbers of a goal.
    pub fn assists(&self) -> impl Iterator<Item = u32> {
        let (first, second) = match self.kind {
            EventKind::Goal { assist1, assist2 } => (assist1, assist2),
            EventKind::Penalty { .. } => (None, None),
        };
        first.into_iter().chain(second).filter(|&n| n > 0)
    }
}

/// Opaque key that, while non-empty, forbids mutation of its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockKey(String);

impl LockKey {
    /// Wrap a stored key; an empty string means unlocked.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Whether a key is set.
    pub fn is_locked(&self) -> bool {
        !self.0.is_empty()
    }

    /// The stored key (empty when unlocked).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fail with [`GameError::Locked`] naming `code` when a key is set.
    pub fn ensure_unlocked(&self, code: &str) -> Result<(), GameError> {
        if self.is_locked() {
            return Err(GameError::Locked(code.to_owned()));
        }
        Ok(())
    }

    /// Set the key. Surrounding whitespace is ignored.
    pub fn lock(&mut self, code: &str, key: &str) -> Result<(), GameError> {
        self.ensure_unlocked(code)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(GameError::EmptyLockKey);
        }
        self.0 = key.to_owned();
        Ok(())
    }

    /// Clear the key when `key` matches. Unlocking an unlocked record is a no-op.
    pub fn unlock(&mut self, key: &str) -> Result<(), GameError> {
        if !self.is_locked() {
            return Ok(());
        }
        if self.0 != key.trim() {
            return Err(GameError::UnlockKeyMismatch);
        }
        self.0.clear();
        Ok(())
    }
}

/// A scored game and its event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Unique game code.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Date as entered (`YYYY-MM-DD` when well-formed).
    pub game_date: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Venue, if known.
    pub venue: String,
    /// Competition or league, if known.
    pub competition: String,
    /// Highest period seen so far.
    pub period: u32,
    events: Vec<Event>,
    unreadable: Vec<EventEntity>,
    lock: LockKey,
    /// Home roster, player number to name.
    pub home_players: BTreeMap<u32, String>,
    /// Away roster, player number to name.
    pub away_players: BTreeMap<u32, String>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
}

impl Game {
    /// Create an empty, unlocked game in period 1 with a title derived from the teams and date.
    pub fn new(
        id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        game_date: impl Into<String>,
    ) -> Self {
        let home_team = home_team.into();
        let away_team = away_team.into();
        let game_date = game_date.into();
        let now = SystemTime::now();
        Self {
            id: id.into(),
            title: game_title(&home_team, &away_team, &game_date),
            game_date,
            home_team,
            away_team,
            venue: String::new(),
            competition: String::new(),
            period: 1,
            events: Vec::new(),
            unreadable: Vec::new(),
            lock: LockKey::default(),
            home_players: BTreeMap::new(),
            away_players: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Events in their current storage order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether the game currently refuses mutation.
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Append an event and raise the period counter if needed.
    pub fn add_event(&mut self, event: Event) -> Result<&Event, GameError> {
        self.lock.ensure_unlocked(&self.id)?;
        if event.period == 0 {
            return Err(GameError::InvalidPeriod(event.period));
        }

        self.period = self.period.max(event.period);
        self.events.push(event);
        Ok(&self.events[self.events.len() - 1])
    }

    /// Log a goal at `clock_time` of `period`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_goal(
        &mut self,
        period: u32,
        clock_time: EventTime,
        side: Side,
        player: u32,
        assist1: Option<u32>,
        assist2: Option<u32>,
        category: impl Into<String>,
    ) -> Result<&Event, GameError> {
        self.add_event(Event::goal(
            period, clock_time, side, player, assist1, assist2, category,
        ))
    }

    /// Log a penalty at `clock_time` of `period`.
    pub fn add_penalty(
        &mut self,
        period: u32,
        clock_time: EventTime,
        side: Side,
        player: u32,
        minutes: u32,
        category: impl Into<String>,
    ) -> Result<&Event, GameError> {
        self.add_event(Event::penalty(
            period, clock_time, side, player, minutes, category,
        ))
    }

    /// Order events by game time. Events sharing a game time keep their relative order.
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(|event| event.game_time);
    }

    /// Remove the event with `id`, leaving every other event untouched and in order.
    pub fn remove_event(&mut self, id: Uuid) -> Result<Event, GameError> {
        self.lock.ensure_unlocked(&self.id)?;
        let position = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| GameError::EventNotFound {
                game: self.id.clone(),
                event: id.to_string(),
            })?;
        Ok(self.events.remove(position))
    }

    /// Remove the first event whose [`Event::label`] equals `label`.
    pub fn remove_event_matching(&mut self, label: &str) -> Result<Event, GameError> {
        self.lock.ensure_unlocked(&self.id)?;
        let id = self
            .events
            .iter()
            .find(|event| event.label() == label)
            .map(|event| event.id)
            .ok_or_else(|| GameError::EventNotFound {
                game: self.id.clone(),
                event: label.to_owned(),
            })?;
        self.remove_event(id)
    }

    /// Lock the game with `key`.
    pub fn lock(&mut self, key: &str) -> Result<(), GameError> {
        self.lock.lock(&self.id, key)
    }

    /// Unlock the game when `key` matches.
    pub fn unlock(&mut self, key: &str) -> Result<(), GameError> {
        self.lock.unlock(key)
    }

    /// Add or rename a roster entry.
    pub fn add_player(
        &mut self,
        side: Side,
        number: u32,
        name: impl Into<String>,
    ) -> Result<(), GameError> {
        self.lock.ensure_unlocked(&self.id)?;
        self.roster_mut(side).insert(number, name.into());
        Ok(())
    }

    /// Roster of one side.
    pub fn roster(&self, side: Side) -> &BTreeMap<u32, String> {
        match side {
            Side::Home => &self.home_players,
            Side::Away => &self.away_players,
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut BTreeMap<u32, String> {
        match side {
            Side::Home => &mut self.home_players,
            Side::Away => &mut self.away_players,
        }
    }

    /// Team name of one side.
    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Aggregate the current event log.
    pub fn summarise(&self) -> GameSummary {
        summarise(&self.events)
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }

    /// Fail when the game is locked.
    pub fn ensure_unlocked(&self) -> Result<(), GameError> {
        self.lock.ensure_unlocked(&self.id)
    }
}

/// `"Blues @ Reds, 27 May 2024"`, or `"Blues @ Reds on <date>"` when the date is not ISO.
pub fn game_title(home_team: &str, away_team: &str, game_date: &str) -> String {
    match Date::parse(game_date.trim(), DATE_INPUT)
        .ok()
        .and_then(|date| date.format(DATE_TITLE).ok())
    {
        Some(date) => format!("{away_team} @ {home_team}, {date}"),
        None => format!("{away_team} @ {home_team} on {game_date}"),
    }
}

impl From<Event> for EventEntity {
    fn from(event: Event) -> Self {
        let (assist1, assist2, minutes) = match event.kind {
            EventKind::Goal { assist1, assist2 } => {
                (assist1.unwrap_or(0), assist2.unwrap_or(0), 0)
            }
            EventKind::Penalty { minutes } => (0, 0, minutes),
        };
        let event_type = event.type_name().to_owned();
        Self {
            id: Some(event.id),
            period: event.period,
            clock_time: event.clock_time.to_string(),
            game_time: event.game_time.to_string(),
            event_type,
            home_away: event.side.as_str().to_owned(),
            category: event.category,
            player: event.player,
            assist1,
            assist2,
            minutes,
        }
    }
}

impl TryFrom<EventEntity> for Event {
    type Error = StoredEventError;

    fn try_from(entity: EventEntity) -> Result<Self, Self::Error> {
        let event_type = entity.event_type.trim();
        if event_type.eq_ignore_ascii_case(DELETED) {
            return Err(StoredEventError::Deleted);
        }
        let kind = if event_type.eq_ignore_ascii_case(GOAL) {
            EventKind::Goal {
                assist1: Some(entity.assist1).filter(|&n| n > 0),
                assist2: Some(entity.assist2).filter(|&n| n > 0),
            }
        } else if event_type.eq_ignore_ascii_case(PENALTY) {
            EventKind::Penalty {
                minutes: entity.minutes,
            }
        } else {
            return Err(StoredEventError::UnknownType(event_type.to_owned()));
        };
        let side = entity.home_away.parse::<Side>()?;
        if entity.period == 0 {
            return Err(StoredEventError::ZeroPeriod);
        }

        Ok(Self {
            id: entity.id.unwrap_or_else(Uuid::new_v4),
            period: entity.period,
            clock_time: EventTime::parse_lossy(&entity.clock_time),
            game_time: EventTime::parse_lossy(&entity.game_time),
            side,
            player: entity.player,
            category: entity.category,
            kind,
        })
    }
}

/// Events that fail to convert are kept aside and written back untouched on the next save.
/// Only deletion tombstones are dropped.
impl From<GameEntity> for Game {
    fn from(entity: GameEntity) -> Self {
        let game_id = entity.id;
        let mut events = Vec::with_capacity(entity.events.len());
        let mut unreadable = Vec::new();
        for stored in entity.events {
            match Event::try_from(stored.clone()) {
                Ok(event) => events.push(event),
                Err(StoredEventError::Deleted) => {
                    debug!(game = %game_id, event = ?stored.id, "dropping deleted event marker");
                }
                Err(reason) => {
                    warn!(game = %game_id, event = ?stored.id, %reason, "keeping unreadable stored event aside");
                    unreadable.push(stored);
                }
            }
        }
        let period = events
            .iter()
            .map(|event| event.period)
            .fold(entity.period.max(1), u32::max);

        Self {
            id: game_id,
            title: entity.title,
            game_date: entity.game_date,
            home_team: entity.home_team,
            away_team: entity.away_team,
            venue: entity.venue,
            competition: entity.competition,
            period,
            events,
            unreadable,
            lock: LockKey::new(entity.locked_with),
            home_players: entity.home_players,
            away_players: entity.away_players,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<Game> for GameEntity {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            title: game.title,
            game_date: game.game_date,
            home_team: game.home_team,
            away_team: game.away_team,
            venue: game.venue,
            competition: game.competition,
            period: game.period,
            events: game
                .events
                .into_iter()
                .map(EventEntity::from)
                .chain(game.unreadable)
                .collect(),
            locked_with: game.lock.as_str().to_owned(),
            home_players: game.home_players,
            away_players: game.away_players,
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> EventTime {
        raw.parse().unwrap()
    }

    fn sample_game() -> Game {
        let mut game = Game::new("CODE1", "Reds", "Blues", "2024-05-27");
        game.add_penalty(2, t("14:25"), Side::Away, 50, 2, "Slash")
            .unwrap();
        game.add_goal(1, t("18:30"), Side::Home, 41, Some(89), Some(93), "Even")
            .unwrap();
        game.add_penalty(2, t("3:45"), Side::Home, 41, 2, "Trip")
            .unwrap();
        game.add_goal(3, t("18:30"), Side::Away, 98, None, None, "PP")
            .unwrap();
        game
    }

    fn snapshot(game: &Game) -> Vec<Event> {
        game.events().to_vec()
    }

    #[test]
    fn sample_game_has_four_events() {
        let game = sample_game();
        assert_eq!(game.events().len(), 4);
        assert_eq!(game.title, "Blues @ Reds, 27 May 2024");
        assert_eq!(game.period, 3);
    }

    #[test]
    fn title_falls_back_to_raw_date() {
        assert_eq!(
            game_title("Reds", "Blues", "next tuesday"),
            "Blues @ Reds on next tuesday"
        );
        assert_eq!(game_title("Reds", "Blues", "2024-01-05"), "Blues @ Reds, 5 Jan 2024");
    }

    #[test]
    fn add_goal_stamps_game_time() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        let event = game
            .add_goal(1, t("15:00"), Side::Home, 25, Some(12), Some(95), "Even")
            .unwrap()
            .clone();
        assert_eq!(game.events().len(), 1);
        assert_eq!(event.game_time.to_string(), "05:00");
        assert_eq!(event.assists().collect::<Vec<_>>(), vec![12, 95]);
    }

    #[test]
    fn add_penalty_stamps_game_time() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        game.period = 2;
        game.add_penalty(2, t("12:30"), Side::Away, 7, 2, "Slash")
            .unwrap();
        assert_eq!(game.events()[0].game_time.to_string(), "27:30");
        assert_eq!(game.events()[0].label(), "27:30 Away Penalty");
    }

    #[test]
    fn later_period_raises_counter_earlier_does_not() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        game.add_goal(3, t("10:00"), Side::Home, 9, None, None, "Even")
            .unwrap();
        assert_eq!(game.period, 3);
        game.add_goal(2, t("10:00"), Side::Home, 9, None, None, "Even")
            .unwrap();
        assert_eq!(game.period, 3);
        game.add_goal(3, t("01:00"), Side::Away, 4, None, None, "Even")
            .unwrap();
        assert_eq!(game.period, 3);
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        let err = game
            .add_goal(0, t("10:00"), Side::Home, 9, None, None, "Even")
            .unwrap_err();
        assert_eq!(err, GameError::InvalidPeriod(0));
        assert!(game.events().is_empty());
    }

    #[test]
    fn zero_assists_are_dropped() {
        let event = Event::goal(1, t("10:00"), Side::Home, 9, Some(0), Some(7), "Even");
        assert_eq!(event.assists().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn sort_orders_by_game_time() {
        let mut game = sample_game();
        game.sort_events();
        let labels = game.events().iter().map(Event::label).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "01:30 Home Goal",
                "25:35 Away Penalty",
                "36:15 Home Penalty",
                "41:30 Away Goal",
            ]
        );
    }

    #[test]
    fn remove_by_id_keeps_other_events_in_order() {
        let mut game = sample_game();
        let before = snapshot(&game);
        let removed = game.remove_event(before[1].id).unwrap();

        assert_eq!(removed, before[1]);
        let expected = vec![before[0].clone(), before[2].clone(), before[3].clone()];
        assert_eq!(snapshot(&game), expected);
    }

    #[test]
    fn remove_by_label_removes_exactly_one() {
        let mut game = sample_game();
        let before = snapshot(&game);
        let removed = game.remove_event_matching("36:15 Home Penalty").unwrap();

        assert_eq!(removed, before[2]);
        assert_eq!(game.events().len(), 3);
        assert!(game.events().iter().all(|e| e.label() != "36:15 Home Penalty"));
    }

    #[test]
    fn duplicate_labels_remove_first_match_only() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        let first = game
            .add_goal(1, t("10:00"), Side::Home, 9, None, None, "Even")
            .unwrap()
            .id;
        let second = game
            .add_goal(1, t("10:00"), Side::Home, 11, None, None, "PP")
            .unwrap()
            .id;

        game.remove_event_matching("10:00 Home Goal").unwrap();
        assert_eq!(game.events().len(), 1);
        assert_eq!(game.events()[0].id, second);
        assert_ne!(game.events()[0].id, first);
    }

    #[test]
    fn unknown_event_is_an_error_and_leaves_events_alone() {
        let mut game = sample_game();
        let before = snapshot(&game);

        let err = game.remove_event_matching("00:00 Home Goal").unwrap_err();
        assert!(matches!(err, GameError::EventNotFound { .. }));
        let err = game.remove_event(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, GameError::EventNotFound { .. }));

        assert_eq!(snapshot(&game), before);
    }

    #[test]
    fn locked_game_rejects_removal() {
        let mut game = sample_game();
        game.lock("secret123").unwrap();
        let before = snapshot(&game);

        let err = game.remove_event_matching("01:30 Home Goal").unwrap_err();
        assert_eq!(err, GameError::Locked("CODE1".into()));
        let err = game.remove_event(before[0].id).unwrap_err();
        assert_eq!(err, GameError::Locked("CODE1".into()));

        assert_eq!(snapshot(&game), before);
    }

    #[test]
    fn locked_game_rejects_new_events_and_players() {
        let mut game = sample_game();
        game.lock("secret123").unwrap();

        assert!(
            game.add_goal(1, t("01:00"), Side::Home, 1, None, None, "Even")
                .is_err()
        );
        assert!(game.add_player(Side::Home, 41, "Smith").is_err());
        assert_eq!(game.events().len(), 4);
        assert!(game.home_players.is_empty());
    }

    #[test]
    fn lock_and_unlock_cycle() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        assert_eq!(game.lock("   "), Err(GameError::EmptyLockKey));
        game.lock(" key ").unwrap();
        assert!(game.is_locked());
        assert_eq!(game.lock("other"), Err(GameError::Locked("G".into())));
        assert_eq!(game.unlock("wrong"), Err(GameError::UnlockKeyMismatch));
        game.unlock("key").unwrap();
        assert!(!game.is_locked());
        game.unlock("anything").unwrap();
    }

    #[test]
    fn roster_entries_can_be_renamed() {
        let mut game = Game::new("G", "Reds", "Blues", "");
        game.add_player(Side::Away, 98, "Jones").unwrap();
        game.add_player(Side::Away, 98, "Jonas").unwrap();
        assert_eq!(game.roster(Side::Away).get(&98).map(String::as_str), Some("Jonas"));
        assert!(game.roster(Side::Home).is_empty());
    }

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("home".parse::<Side>(), Ok(Side::Home));
        assert_eq!(" AWAY ".parse::<Side>(), Ok(Side::Away));
        assert!("visitors".parse::<Side>().is_err());
    }

    #[test]
    fn entity_round_trip_preserves_events() {
        let mut game = sample_game();
        game.lock("secret123").unwrap();
        let restored = Game::from(GameEntity::from(game.clone()));
        assert_eq!(restored, game);
    }

    #[test]
    fn deleted_markers_are_dropped_and_unreadable_events_kept() {
        let game = sample_game();
        let mut entity = GameEntity::from(game);
        entity.events[0].event_type = "DELETED".into();
        entity.events[1].home_away = String::new();
        let unreadable = entity.events[1].clone();

        let restored = Game::from(entity);
        assert_eq!(restored.events().len(), 2);

        let written = GameEntity::from(restored);
        assert_eq!(written.events.len(), 3);
        assert!(written.events.contains(&unreadable));
        assert!(written.events.iter().all(|e| e.event_type != "DELETED"));
    }

    #[test]
    fn stored_event_types_ignore_case() {
        let mut entity = GameEntity::from(sample_game());
        entity.events[0].event_type = "penalty".into();
        entity.events[1].event_type = " GOAL ".into();

        let restored = Game::from(entity);
        assert_eq!(restored.events().len(), 4);
        assert_eq!(restored.events()[0].type_name(), "Penalty");
        assert_eq!(restored.events()[1].type_name(), "Goal");
    }

    #[test]
    fn stored_event_errors_are_typed() {
        let mut entity = EventEntity::from(Event::goal(1, t("10:00"), Side::Home, 9, None, None, "Even"));
        entity.event_type = "Fight".into();
        assert_eq!(
            Event::try_from(entity.clone()),
            Err(StoredEventError::UnknownType("Fight".into()))
        );
        entity.event_type = "Goal".into();
        entity.home_away = "visitors".into();
        assert_eq!(
            Event::try_from(entity.clone()),
            Err(StoredEventError::Side(UnknownSide("visitors".into())))
        );
        entity.home_away = "Home".into();
        entity.period = 0;
        assert_eq!(Event::try_from(entity), Err(StoredEventError::ZeroPeriod));
    }

    #[test]
    fn missing_event_ids_are_assigned_once_and_written_back() {
        let mut entity = GameEntity::from(sample_game());
        entity.events[2].id = None;
        assert!(entity.has_events_without_id());

        let restored = Game::from(entity);
        let assigned = restored.events()[2].id;
        let written = GameEntity::from(restored);
        assert!(!written.has_events_without_id());
        assert_eq!(written.events[2].id, Some(assigned));
    }
}
