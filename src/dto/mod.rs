use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Game commands and the scoresheet read model.
pub mod game;
/// Health report.
pub mod health;
/// Game list commands and read model.
pub mod list;
/// Custom validators shared by the command payloads.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
