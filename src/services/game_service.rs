use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::game::{GameSheet, GoalInput, NewGameRequest, PenaltyInput, PlayerInput},
    error::ServiceError,
    services::codes::{confirm_matches, normalize_code, unused_code},
    state::{
        SharedState,
        clock::EventTime,
        game::{Game, GameError, Side},
    },
};

/// Open a new, empty scoresheet under a freshly generated code.
pub async fn create_game(
    state: &SharedState,
    request: NewGameRequest,
) -> Result<GameSheet, ServiceError> {
    request.validate()?;
    let store = state.require_game_store().await?;

    let code = unused_code(|code| store.find_game(code)).await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let mut game = Game::new(
        code,
        request.home_team.trim(),
        request.away_team.trim(),
        request.game_date.trim(),
    );
    game.venue = request.venue.trim().to_owned();
    game.competition = request.competition.trim().to_owned();

    store.save_game(game.clone().into()).await?;
    info!(game = %game.id, title = %game.title, "game created");

    Ok(game.into())
}

/// Load a game, sort its events chronologically and summarise it.
pub async fn get_game(state: &SharedState, code: &str) -> Result<GameSheet, ServiceError> {
    let game = load_game(state, &normalize_code(code)).await?;
    debug!(game = %game.id, events = game.events().len(), "summarising game");
    Ok(game.into())
}

/// Log a goal.
pub async fn add_goal(
    state: &SharedState,
    code: &str,
    input: GoalInput,
) -> Result<GameSheet, ServiceError> {
    input.validate()?;
    let clock_time = parse_clock(&input.clock_time)?;
    let game = mutate_game(state, code, "add_goal", |game| {
        game.add_goal(
            input.period,
            clock_time,
            input.side,
            input.player,
            input.assist1,
            input.assist2,
            input.category,
        )
        .map(|_| ())
    })
    .await?;
    Ok(game.into())
}

/// Log a penalty.
pub async fn add_penalty(
    state: &SharedState,
    code: &str,
    input: PenaltyInput,
) -> Result<GameSheet, ServiceError> {
    input.validate()?;
    let clock_time = parse_clock(&input.clock_time)?;
    let game = mutate_game(state, code, "add_penalty", |game| {
        game.add_penalty(
            input.period,
            clock_time,
            input.side,
            input.player,
            input.minutes,
            input.category,
        )
        .map(|_| ())
    })
    .await?;
    Ok(game.into())
}

/// Remove one event by its id.
pub async fn remove_event(
    state: &SharedState,
    code: &str,
    event_id: Uuid,
) -> Result<GameSheet, ServiceError> {
    let game = mutate_game(state, code, "remove_event", |game| {
        game.remove_event(event_id).map(|_| ())
    })
    .await?;
    Ok(game.into())
}

/// Remove the first event whose label (`"01:30 Home Goal"`) equals `label`.
pub async fn remove_event_matching(
    state: &SharedState,
    code: &str,
    label: &str,
) -> Result<GameSheet, ServiceError> {
    let game = mutate_game(state, code, "remove_event_matching", |game| {
        game.remove_event_matching(label.trim()).map(|_| ())
    })
    .await?;
    Ok(game.into())
}

/// Lock a game with `key`. Locked games refuse every change until unlocked.
pub async fn lock_game(
    state: &SharedState,
    code: &str,
    key: &str,
) -> Result<GameSheet, ServiceError> {
    let game = mutate_game(state, code, "lock_game", |game| game.lock(key)).await?;
    Ok(game.into())
}

/// Unlock a game when `key` matches the one it was locked with.
pub async fn unlock_game(
    state: &SharedState,
    code: &str,
    key: &str,
) -> Result<GameSheet, ServiceError> {
    let game = mutate_game(state, code, "unlock_game", |game| game.unlock(key)).await?;
    Ok(game.into())
}

/// Add a player to a roster, or rename the player already wearing that number.
pub async fn add_player(
    state: &SharedState,
    code: &str,
    input: PlayerInput,
) -> Result<GameSheet, ServiceError> {
    input.validate()?;
    let game = mutate_game(state, code, "add_player", |game| {
        game.add_player(input.side, input.number, input.name.trim())
    })
    .await?;
    Ok(game.into())
}

/// Delete a game. `confirm` must repeat the game code; locked games are kept.
pub async fn delete_game(state: &SharedState, code: &str, confirm: &str) -> Result<(), ServiceError> {
    let code = normalize_code(code);
    if !confirm_matches(&code, confirm) {
        return Err(ServiceError::Conflict(format!(
            "confirmation does not match game `{code}`"
        )));
    }

    let store = state.require_game_store().await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let Some(entity) = store.find_game(&code).await? else {
        return Err(ServiceError::NotFound(format!("game `{code}` not found")));
    };
    Game::from(entity).ensure_unlocked()?;

    if store.delete_game(&code).await? {
        info!(game = %code, "game deleted");
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("game `{code}` not found")))
    }
}

/// Write the demo games when the store holds no game yet. Returns how many were written.
pub async fn seed_demo_games(state: &SharedState) -> Result<usize, ServiceError> {
    let store = state.require_game_store().await?;
    if !store.is_empty().await? {
        debug!("store already holds games; skipping demo seed");
        return Ok(0);
    }

    let games = demo_games()?;
    let count = games.len();
    for game in games {
        info!(game = %game.id, title = %game.title, "seeding demo game");
        store.save_game(game.into()).await?;
    }
    Ok(count)
}

/// `CODE1`, a finished sample game, and `CODE2`, a locked one.
pub fn demo_games() -> Result<Vec<Game>, GameError> {
    let mut first = Game::new("CODE1", "Reds", "Blues", "2024-05-27");
    first.add_penalty(2, EventTime::new(14, 25), Side::Away, 50, 2, "Slash")?;
    first.add_goal(
        1,
        EventTime::new(18, 30),
        Side::Home,
        41,
        Some(89),
        Some(93),
        "Even",
    )?;
    first.add_penalty(2, EventTime::new(3, 45), Side::Home, 41, 2, "Trip")?;
    first.add_goal(3, EventTime::new(18, 30), Side::Away, 98, None, None, "PP")?;

    let mut second = Game::new("CODE2", "Greens", "Greys", "");
    second.title = "Locked Game".to_owned();
    second.add_goal(
        1,
        EventTime::new(18, 30),
        Side::Home,
        41,
        Some(89),
        Some(93),
        "Even",
    )?;
    second.lock("secret123")?;

    Ok(vec![first, second])
}

/// Load a game. Events stored without an id get one assigned and written back, so the ids
/// handed out in a [`GameSheet`] stay valid for [`remove_event`].
pub(crate) async fn load_game(state: &SharedState, code: &str) -> Result<Game, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(entity) = store.find_game(code).await? else {
        return Err(ServiceError::NotFound(format!("game `{code}` not found")));
    };
    if !entity.has_events_without_id() {
        return Ok(entity.into());
    }

    let _guard = state.lock_record(&record_key(code)).await;
    let Some(entity) = store.find_game(code).await? else {
        return Err(ServiceError::NotFound(format!("game `{code}` not found")));
    };
    let backfill = entity.has_events_without_id();
    let game = Game::from(entity);
    if backfill {
        store.save_game(game.clone().into()).await?;
        info!(game = %code, "assigned ids to stored events");
    }
    Ok(game)
}

/// Load, apply and save one game while holding its record lock.
async fn mutate_game<F>(
    state: &SharedState,
    code: &str,
    action: &'static str,
    apply: F,
) -> Result<Game, ServiceError>
where
    F: FnOnce(&mut Game) -> Result<(), GameError>,
{
    let code = normalize_code(code);
    let store = state.require_game_store().await?;
    let _guard = state.lock_record(&record_key(&code)).await;

    let Some(entity) = store.find_game(&code).await? else {
        return Err(ServiceError::NotFound(format!("game `{code}` not found")));
    };
    let mut game = Game::from(entity);

    if let Err(err) = apply(&mut game) {
        warn!(game = %code, action, error = %err, "game change rejected");
        return Err(err.into());
    }

    game.touch();
    store.save_game(game.clone().into()).await?;
    debug!(game = %code, action, events = game.events().len(), "game saved");
    Ok(game)
}

fn parse_clock(raw: &str) -> Result<EventTime, ServiceError> {
    raw.parse::<EventTime>()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))
}

fn record_key(code: &str) -> String {
    format!("game:{code}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::GameEntity,
        },
        state::{AppState, summary::PeriodBucket},
    };

    fn state() -> SharedState {
        AppState::with_store(Arc::new(MemoryGameStore::default()))
    }

    fn new_game() -> NewGameRequest {
        NewGameRequest {
            home_team: "Reds".into(),
            away_team: "Blues".into(),
            game_date: "2024-05-27".into(),
            venue: "Main rink".into(),
            competition: String::new(),
        }
    }

    fn goal(period: u32, clock_time: &str, side: Side, player: u32) -> GoalInput {
        GoalInput {
            period,
            clock_time: clock_time.into(),
            side,
            player,
            assist1: None,
            assist2: None,
            category: "Even".into(),
        }
    }

    #[test]
    fn demo_games_match_the_sample_sheet() {
        let games = demo_games().unwrap();
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.title, "Blues @ Reds, 27 May 2024");
        assert_eq!(first.events().len(), 4);
        assert!(!first.is_locked());
        let summary = first.summarise();
        assert_eq!((summary.home_goals, summary.away_goals), (1, 1));

        let second = &games[1];
        assert_eq!(second.title, "Locked Game");
        assert!(second.is_locked());
    }

    #[tokio::test]
    async fn create_then_score() {
        let state = state();
        let sheet = create_game(&state, new_game()).await.unwrap();
        assert_eq!(sheet.title, "Blues @ Reds, 27 May 2024");
        assert_eq!(sheet.venue, "Main rink");
        assert_eq!(sheet.period, 1);
        assert!(sheet.events.is_empty());

        let sheet = add_goal(&state, &sheet.id, goal(2, "12:30", Side::Away, 19))
            .await
            .unwrap();
        assert_eq!(sheet.period, 2);
        assert_eq!(sheet.events[0].label, "27:30 Away Goal");
        assert_eq!(sheet.summary.period(PeriodBucket::P2).away_goals, 1);

        let reloaded = get_game(&state, &sheet.id.to_lowercase()).await.unwrap();
        assert_eq!(reloaded.events.len(), 1);
    }

    #[tokio::test]
    async fn invalid_clock_is_rejected_before_loading() {
        let state = state();
        let result = add_goal(&state, "NOPE", goal(1, "25:00", Side::Home, 9)).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = state();
        let result = add_goal(&state, "NOPE", goal(1, "10:00", Side::Home, 9)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn locked_game_keeps_its_events() {
        let state = state();
        seed_demo_games(&state).await.unwrap();

        let result = add_goal(&state, "CODE2", goal(1, "10:00", Side::Home, 9)).await;
        assert!(matches!(result, Err(ServiceError::Locked(code)) if code == "CODE2"));
        let result = remove_event_matching(&state, "CODE2", "01:30 Home Goal").await;
        assert!(matches!(result, Err(ServiceError::Locked(_))));
        assert_eq!(get_game(&state, "CODE2").await.unwrap().events.len(), 1);

        let result = unlock_game(&state, "CODE2", "wrong").await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        let sheet = unlock_game(&state, "CODE2", "secret123").await.unwrap();
        assert!(!sheet.locked);
        let sheet = remove_event_matching(&state, "CODE2", "01:30 Home Goal")
            .await
            .unwrap();
        assert!(sheet.events.is_empty());
    }

    #[tokio::test]
    async fn remove_by_id_and_missing_label() {
        let state = state();
        seed_demo_games(&state).await.unwrap();

        let sheet = get_game(&state, "CODE1").await.unwrap();
        let target = sheet.events[1].clone();
        assert_eq!(target.label, "25:35 Away Penalty");

        let sheet = remove_event(&state, "CODE1", target.id).await.unwrap();
        let labels = sheet.events.iter().map(|e| e.label.as_str()).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["01:30 Home Goal", "36:15 Home Penalty", "41:30 Away Goal"]
        );

        let result = remove_event_matching(&state, "CODE1", "99:99 Home Goal").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert_eq!(get_game(&state, "CODE1").await.unwrap().events.len(), 3);
    }

    #[tokio::test]
    async fn seed_runs_only_on_empty_store() {
        let state = state();
        assert_eq!(seed_demo_games(&state).await.unwrap(), 2);
        assert_eq!(seed_demo_games(&state).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn roster_names_show_on_the_sheet() {
        let state = state();
        seed_demo_games(&state).await.unwrap();
        let input = PlayerInput {
            side: Side::Home,
            number: 41,
            name: " Smith ".into(),
        };
        let sheet = add_player(&state, "CODE1", input).await.unwrap();
        assert_eq!(sheet.home_players.get(&41).map(String::as_str), Some("Smith"));
        assert_eq!(sheet.events[0].player_name.as_deref(), Some("Smith"));
    }

    #[tokio::test]
    async fn delete_requires_confirmation_and_unlocked_game() {
        let state = state();
        seed_demo_games(&state).await.unwrap();

        let result = delete_game(&state, "CODE1", "CODE2").await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        let result = delete_game(&state, "CODE2", "code2").await;
        assert!(matches!(result, Err(ServiceError::Locked(_))));

        delete_game(&state, "CODE1", " code1 ").await.unwrap();
        assert!(matches!(
            get_game(&state, "CODE1").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            delete_game(&state, "CODE1", "CODE1").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn degraded_state_refuses_work() {
        let state = AppState::new();
        assert!(matches!(
            get_game(&state, "CODE1").await,
            Err(ServiceError::Degraded)
        ));
        assert!(matches!(
            create_game(&state, new_game()).await,
            Err(ServiceError::Degraded)
        ));
    }

    async fn seeded_store() -> (SharedState, MemoryGameStore) {
        let store = MemoryGameStore::default();
        let state = AppState::with_store(Arc::new(store.clone()));
        seed_demo_games(&state).await.unwrap();
        (state, store)
    }

    #[tokio::test]
    async fn changes_keep_unreadable_stored_events() {
        let (state, store) = seeded_store().await;
        let mut entity = store.find_game("CODE1").await.unwrap().unwrap();
        entity.events[0].event_type = "penalty".into();
        entity.events[1].event_type = "Fight".into();
        let unreadable = entity.events[1].clone();
        store.save_game(entity).await.unwrap();

        add_goal(&state, "CODE1", goal(3, "05:00", Side::Home, 9))
            .await
            .unwrap();

        let stored = store.find_game("CODE1").await.unwrap().unwrap();
        assert_eq!(stored.events.len(), 5);
        assert!(stored.events.contains(&unreadable));
        let penalties = stored
            .events
            .iter()
            .filter(|e| e.event_type == "Penalty")
            .count();
        assert_eq!(penalties, 2);
    }

    #[tokio::test]
    async fn event_ids_missing_in_storage_are_persisted_on_read() {
        let (state, store) = seeded_store().await;
        let mut entity: GameEntity = store.find_game("CODE1").await.unwrap().unwrap();
        for event in &mut entity.events {
            event.id = None;
        }
        store.save_game(entity).await.unwrap();

        let sheet = get_game(&state, "CODE1").await.unwrap();
        let stored = store.find_game("CODE1").await.unwrap().unwrap();
        assert!(!stored.has_events_without_id());
        let ids = |events: &[crate::dto::game::EventLine]| events.iter().map(|e| e.id).collect::<Vec<_>>();
        let again = get_game(&state, "CODE1").await.unwrap();
        assert_eq!(ids(&again.events), ids(&sheet.events));

        let target = sheet.events[0].id;
        let sheet = remove_event(&state, "CODE1", target).await.unwrap();
        assert_eq!(sheet.events.len(), 3);
    }
}
