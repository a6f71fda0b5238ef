//! Scoreboard aggregation over an unordered event log.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::state::game::{Event, EventKind, Side};

/// Columns of the period breakdown. Every period after the third folds into [`Overtime`].
///
/// [`Overtime`]: PeriodBucket::Overtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodBucket {
    /// First period.
    P1,
    /// Second period.
    P2,
    /// Third period.
    P3,
    /// Period 4 and beyond.
    Overtime,
    /// All periods together.
    Total,
}

impl PeriodBucket {
    /// Buckets in display order.
    pub const ALL: [PeriodBucket; 5] = [
        PeriodBucket::P1,
        PeriodBucket::P2,
        PeriodBucket::P3,
        PeriodBucket::Overtime,
        PeriodBucket::Total,
    ];

    /// Bucket a 1-based period is counted in.
    pub fn for_period(period: u32) -> Self {
        match period {
            ..=1 => PeriodBucket::P1,
            2 => PeriodBucket::P2,
            3 => PeriodBucket::P3,
            _ => PeriodBucket::Overtime,
        }
    }

    /// Column heading.
    pub fn title(self) -> &'static str {
        match self {
            PeriodBucket::P1 => "P1",
            PeriodBucket::P2 => "P2",
            PeriodBucket::P3 => "P3",
            PeriodBucket::Overtime => "OT",
            PeriodBucket::Total => "Total",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-player tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Goals scored.
    pub goals: u32,
    /// Assists credited.
    pub assists: u32,
    /// Penalty minutes.
    pub minutes: u32,
}

/// Goals and penalty minutes for both sides within one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// Which bucket these numbers belong to.
    pub bucket: PeriodBucket,
    /// Column heading ("P1" ... "Total").
    pub title: &'static str,
    /// Home goals.
    pub home_goals: u32,
    /// Away goals.
    pub away_goals: u32,
    /// Home penalty minutes.
    pub home_penalties: u32,
    /// Away penalty minutes.
    pub away_penalties: u32,
}

impl PeriodSummary {
    fn empty(bucket: PeriodBucket) -> Self {
        Self {
            bucket,
            title: bucket.title(),
            home_goals: 0,
            away_goals: 0,
            home_penalties: 0,
            away_penalties: 0,
        }
    }

    fn add_goal(&mut self, side: Side) {
        match side {
            Side::Home => self.home_goals = self.home_goals.saturating_add(1),
            Side::Away => self.away_goals = self.away_goals.saturating_add(1),
        }
    }

    fn add_penalty(&mut self, side: Side, minutes: u32) {
        match side {
            Side::Home => self.home_penalties = self.home_penalties.saturating_add(minutes),
            Side::Away => self.away_penalties = self.away_penalties.saturating_add(minutes),
        }
    }
}

/// Scoreboard derived from a game's events. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Total home goals.
    pub home_goals: u32,
    /// Total away goals.
    pub away_goals: u32,
    /// One entry per [`PeriodBucket`], in [`PeriodBucket::ALL`] order.
    pub periods: Vec<PeriodSummary>,
    /// Home player tallies keyed by number.
    pub home_players: BTreeMap<u32, PlayerSummary>,
    /// Away player tallies keyed by number.
    pub away_players: BTreeMap<u32, PlayerSummary>,
}

impl Default for GameSummary {
    fn default() -> Self {
        Self {
            home_goals: 0,
            away_goals: 0,
            periods: PeriodBucket::ALL.map(PeriodSummary::empty).to_vec(),
            home_players: BTreeMap::new(),
            away_players: BTreeMap::new(),
        }
    }
}

impl GameSummary {
    /// Breakdown for one bucket.
    pub fn period(&self, bucket: PeriodBucket) -> &PeriodSummary {
        &self.periods[bucket.index()]
    }

    /// Tallies of one side's players.
    pub fn players(&self, side: Side) -> &BTreeMap<u32, PlayerSummary> {
        match side {
            Side::Home => &self.home_players,
            Side::Away => &self.away_players,
        }
    }

    fn player_mut(&mut self, side: Side, number: u32) -> &mut PlayerSummary {
        let players = match side {
            Side::Home => &mut self.home_players,
            Side::Away => &mut self.away_players,
        };
        players.entry(number).or_default()
    }

    fn buckets_mut(&mut self, period: u32) -> [&mut PeriodSummary; 2] {
        let bucket = PeriodBucket::for_period(period).index();
        let total = PeriodBucket::Total.index();
        let (head, tail) = self.periods.split_at_mut(total);
        [&mut head[bucket], &mut tail[0]]
    }

    fn record(&mut self, event: &Event) {
        match event.kind {
            EventKind::Goal { .. } => {
                let goals = match event.side {
                    Side::Home => &mut self.home_goals,
                    Side::Away => &mut self.away_goals,
                };
                *goals = goals.saturating_add(1);
                for bucket in self.buckets_mut(event.period) {
                    bucket.add_goal(event.side);
                }
                let scorer = self.player_mut(event.side, event.player);
                scorer.goals = scorer.goals.saturating_add(1);
                for assist in event.assists() {
                    let helper = self.player_mut(event.side, assist);
                    helper.assists = helper.assists.saturating_add(1);
                }
            }
            EventKind::Penalty { minutes } => {
                for bucket in self.buckets_mut(event.period) {
                    bucket.add_penalty(event.side, minutes);
                }
                let player = self.player_mut(event.side, event.player);
                player.minutes = player.minutes.saturating_add(minutes);
            }
        }
    }
}

/// Aggregate goals, assists and penalty minutes in a single pass. Event order is irrelevant.
///
/// Tallies saturate at `u32::MAX`.
pub fn summarise<'a>(events: impl IntoIterator<Item = &'a Event>) -> GameSummary {
    let mut summary = GameSummary::default();
    for event in events {
        summary.record(event);
    }
    summary
}
