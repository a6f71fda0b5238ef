//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::clock::{EventTime, PERIOD_SECONDS};

/// Validates a countdown clock reading: strict `MM:SS`, seconds below 60, at most `20:00`.
///
/// # Examples
///
/// ```ignore
/// validate_clock_time("18:30") // Ok
/// validate_clock_time("20:00") // Ok
/// validate_clock_time("20:01") // Err - longer than a period
/// validate_clock_time("5:75")  // Err - seconds out of range
/// ```
pub fn validate_clock_time(raw: &str) -> Result<(), ValidationError> {
    let time = raw.parse::<EventTime>().map_err(|parse_err| {
        let mut err = ValidationError::new("clock_time_format");
        err.message = Some(parse_err.to_string().into());
        err
    })?;

    if time.as_seconds() > PERIOD_SECONDS {
        let mut err = ValidationError::new("clock_time_range");
        err.message = Some(format!("clock time {time} exceeds the 20:00 period length").into());
        return Err(err);
    }

    Ok(())
}

/// Rejects strings made only of whitespace.
pub fn validate_not_blank(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}
