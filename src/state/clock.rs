//! Conversions between the period countdown clock and cumulative game time.
//!
//! The scoreboard clock counts down from `20:00` to `00:00` inside each period, while game
//! time counts up from the opening face-off and is only used to order events. Both are
//! rendered as zero-padded `MM:SS`; game time minutes keep growing past 59.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of a single period, in seconds.
pub const PERIOD_SECONDS: u32 = 20 * 60;

/// A `MM:SS` reading, stored as a whole number of seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTime {
    seconds: u32,
}

/// Reasons a strict `MM:SS` parse can fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockParseError {
    /// The input is not two `:`-separated groups of digits.
    #[error("`{0}` is not a MM:SS time")]
    Malformed(String),
    /// The seconds group is 60 or more.
    #[error("seconds out of range in `{0}`")]
    SecondsOutOfRange(String),
}

impl EventTime {
    /// `00:00`.
    pub const ZERO: EventTime = EventTime { seconds: 0 };

    /// Build a time from its minutes and seconds components.
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self::from_seconds(minutes.saturating_mul(60).saturating_add(seconds))
    }

    /// Build a time from a total number of seconds.
    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    /// Total number of seconds represented by this reading.
    pub const fn as_seconds(self) -> u32 {
        self.seconds
    }

    /// Minutes component (not wrapped at 60).
    pub const fn minutes(self) -> u32 {
        self.seconds / 60
    }

    /// Seconds component, always below 60.
    pub const fn seconds(self) -> u32 {
        self.seconds % 60
    }

    /// Parse `MM:SS`, degrading every unreadable component to zero instead of failing.
    ///
    /// A missing seconds group counts as zero seconds, and a seconds group of 60 or more is
    /// carried into the minutes.
    pub fn parse_lossy(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ':');
        let minutes = parts.next().map(lossy_component).unwrap_or(0);
        let seconds = parts.next().map(lossy_component).unwrap_or(0);
        Self::new(minutes, seconds)
    }
}

fn lossy_component(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

impl FromStr for EventTime {
    type Err = ClockParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || ClockParseError::Malformed(raw.to_owned());
        let (minutes, seconds) = raw.trim().split_once(':').ok_or_else(malformed)?;

        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(minutes) || !is_digits(seconds) || seconds.len() > 2 {
            return Err(malformed());
        }

        let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
        let seconds: u32 = seconds.parse().map_err(|_| malformed())?;
        if seconds >= 60 {
            return Err(ClockParseError::SecondsOutOfRange(raw.to_owned()));
        }

        Ok(Self::new(minutes, seconds))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

impl Serialize for EventTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&raw))
    }
}

/// Convert a countdown clock reading in `period` (1-based) into cumulative game time.
///
/// A reading above `20:00` is treated as the start of the period.
pub fn clock_to_game_time(period: u32, clock_time: EventTime) -> EventTime {
    let elapsed_in_period = PERIOD_SECONDS.saturating_sub(clock_time.as_seconds());
    let completed_periods = PERIOD_SECONDS.saturating_mul(period.saturating_sub(1));
    EventTime::from_seconds(completed_periods.saturating_add(elapsed_in_period))
}

/// Convert cumulative game time back into `(clock_time, period)`.
///
/// An exact period boundary maps to `20:00` of the following period.
pub fn game_to_clock_time(game_time: EventTime) -> (EventTime, u32) {
    let total = game_time.as_seconds();
    let period = total / PERIOD_SECONDS + 1;
    let remaining = PERIOD_SECONDS - total % PERIOD_SECONDS;
    (EventTime::from_seconds(remaining), period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> EventTime {
        raw.parse().unwrap()
    }

    fn assert_game_time(period: u32, clock: &str, expected: &str) {
        assert_eq!(
            clock_to_game_time(period, t(clock)).to_string(),
            expected,
            "period {period}, clock {clock}"
        );
    }

    fn assert_clock_time(game: &str, expected_period: u32, expected_clock: &str) {
        let (clock, period) = game_to_clock_time(t(game));
        assert_eq!(period, expected_period, "game time {game}");
        assert_eq!(clock.to_string(), expected_clock, "game time {game}");
    }

    #[test]
    fn parses_minutes_and_seconds() {
        let time = t("12:34");
        assert_eq!(time.minutes(), 12);
        assert_eq!(time.seconds(), 34);
        assert_eq!(time.to_string(), "12:34");
    }

    #[test]
    fn clock_to_game_time_examples() {
        assert_game_time(1, "20:00", "00:00");
        assert_game_time(1, "19:45", "00:15");
        assert_game_time(1, "18:30", "01:30");
        assert_game_time(1, "15:00", "05:00");
        assert_game_time(1, "06:12", "13:48");
        assert_game_time(1, "00:01", "19:59");
        assert_game_time(2, "19:45", "20:15");
        assert_game_time(2, "19:23", "20:37");
        assert_game_time(2, "12:30", "27:30");
        assert_game_time(3, "00:01", "59:59");
    }

    #[test]
    fn game_to_clock_time_examples() {
        assert_clock_time("00:00", 1, "20:00");
        assert_clock_time("00:01", 1, "19:59");
        assert_clock_time("15:00", 1, "05:00");
        assert_clock_time("20:37", 2, "19:23");
        assert_clock_time("23:49", 2, "16:11");
        assert_clock_time("25:52", 2, "14:08");
        assert_clock_time("30:21", 2, "09:39");
        assert_clock_time("36:27", 2, "03:33");
        assert_clock_time("38:15", 2, "01:45");
        assert_clock_time("39:35", 2, "00:25");
        assert_clock_time("48:02", 3, "11:58");
        assert_clock_time("54:51", 3, "05:09");
        assert_clock_time("55:00", 3, "05:00");
        assert_clock_time("59:59", 3, "00:01");
    }

    #[test]
    fn round_trips_every_clock_reading_inside_a_period() {
        for period in 1..=5 {
            for seconds in 1..=PERIOD_SECONDS {
                let clock = EventTime::from_seconds(seconds);
                let game = clock_to_game_time(period, clock);
                assert_eq!(game_to_clock_time(game), (clock, period));
            }
        }
    }

    #[test]
    fn period_end_is_the_next_period_start() {
        let end_of_first = clock_to_game_time(1, t("00:00"));
        let start_of_second = clock_to_game_time(2, t("20:00"));
        assert_eq!(end_of_first, start_of_second);
        assert_eq!(end_of_first.to_string(), "20:00");
        assert_eq!(game_to_clock_time(end_of_first), (t("20:00"), 2));
    }

    #[test]
    fn game_minutes_do_not_roll_over() {
        assert_game_time(4, "00:30", "79:30");
        assert_game_time(6, "10:00", "110:00");
        assert_clock_time("110:00", 6, "10:00");
    }

    #[test]
    fn lossy_parse_defaults_to_zero() {
        assert_eq!(EventTime::parse_lossy("ab:cd"), EventTime::ZERO);
        assert_eq!(EventTime::parse_lossy(""), EventTime::ZERO);
        assert_eq!(EventTime::parse_lossy("7"), EventTime::new(7, 0));
        assert_eq!(EventTime::parse_lossy("3:45"), EventTime::new(3, 45));
        assert_eq!(EventTime::parse_lossy("x:45"), EventTime::new(0, 45));
    }

    #[test]
    fn strict_parse_rejects_garbage() {
        assert!(matches!(
            "12".parse::<EventTime>(),
            Err(ClockParseError::Malformed(_))
        ));
        assert!(matches!(
            "1a:00".parse::<EventTime>(),
            Err(ClockParseError::Malformed(_))
        ));
        assert!(matches!(
            "-1:00".parse::<EventTime>(),
            Err(ClockParseError::Malformed(_))
        ));
        assert!(matches!(
            "10:75".parse::<EventTime>(),
            Err(ClockParseError::SecondsOutOfRange(_))
        ));
        assert_eq!("3:05".parse::<EventTime>(), Ok(EventTime::new(3, 5)));
    }

    #[test]
    fn serializes_as_padded_string() {
        let json = serde_json::to_string(&EventTime::new(5, 7)).unwrap();
        assert_eq!(json, "\"05:07\"");
        let back: EventTime = serde_json::from_str("\"61:02\"").unwrap();
        assert_eq!(back, EventTime::new(61, 2));
    }
}
