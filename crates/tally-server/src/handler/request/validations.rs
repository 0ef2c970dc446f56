//! Request validation utilities.

use jiff::Timestamp;
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use validator::{ValidateEmail, ValidationError};

pub fn validation_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_owned().into());
    error
}

/// Accepts a valid email address, or an empty string meaning "clear it".
pub fn is_email_or_empty(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(validation_error("email", "must be a valid email address"))
    }
}

/// Rejects strings that are empty after trimming.
pub fn is_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(validation_error("blank", "must not be blank"))
    } else {
        Ok(())
    }
}

/// Parses an expense date.
///
/// Accepts, in order: an RFC 3339 timestamp (`2024-01-01T10:00:00Z`), a civil
/// datetime (`2024-01-01T10:00:00`) or a civil date (`2024-01-01`). Civil
/// values are read as UTC.
pub fn parse_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Some(timestamp);
    }

    if let Ok(datetime) = raw.parse::<DateTime>() {
        return datetime.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
    }

    raw.parse::<Date>()
        .ok()
        .and_then(|date| date.to_zoned(TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
}

/// Validator form of [`parse_date`].
pub fn is_date(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() || parse_date(raw).is_some() {
        Ok(())
    } else {
        Err(validation_error(
            "date",
            "must be an RFC 3339 timestamp, a datetime or a YYYY-MM-DD date",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let timestamp = parse_date("2024-01-01T10:00:00+02:00").unwrap();
        assert_eq!(timestamp.to_string(), "2024-01-01T08:00:00Z");
    }

    #[test]
    fn parses_civil_datetime_as_utc() {
        let timestamp = parse_date("2024-01-01T10:30:00").unwrap();
        assert_eq!(timestamp.to_string(), "2024-01-01T10:30:00Z");
    }

    #[test]
    fn parses_civil_date_as_utc_midnight() {
        let timestamp = parse_date("2024-01-01").unwrap();
        assert_eq!(timestamp.to_string(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
        assert!(is_date("01/02/2024").is_err());
    }

    #[test]
    fn blank_dates_pass_validation() {
        assert!(is_date("").is_ok());
        assert!(is_date("  ").is_ok());
    }

    #[test]
    fn email_or_empty() {
        assert!(is_email_or_empty("").is_ok());
        assert!(is_email_or_empty("alice@example.com").is_ok());
        assert!(is_email_or_empty("alice").is_err());
    }
}
