use crate::config::{MAX_DURATION_MS, MIN_DURATION_MS};
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for duration parsing
static TIME_MIN_SEC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)m\s*(\d+)s$").unwrap());
static TIME_COLON_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());
static TIME_SEC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,3}))?s$").unwrap());
static TIME_COLON_MSEC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2})\.(\d{1,3})$").unwrap());

/// Time parsing error types for better error handling
#[derive(Debug, PartialEq, Eq)]
pub enum TimeParseError {
    EmptyInput,
    InvalidFormat(String),
    InvalidMinutes,
    InvalidSeconds(u64),
    TooLarge,
}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeParseError::EmptyInput => write!(f, "Time cannot be empty"),
            TimeParseError::InvalidFormat(hint) => write!(f, "Invalid time format. {}", hint),
            TimeParseError::InvalidMinutes => write!(f, "Invalid minutes value"),
            TimeParseError::InvalidSeconds(s) => write!(f, "Invalid seconds: {} (must be 0-59)", s),
            TimeParseError::TooLarge => write!(f, "Time is too large"),
        }
    }
}

impl std::error::Error for TimeParseError {}

fn parse_number(digits: &str, err: TimeParseError) -> Result<u64, TimeParseError> {
    digits.parse::<u64>().map_err(|_| err)
}

/// Scale a 1-3 digit fraction to milliseconds ("5" -> 500, "05" -> 50).
fn fraction_to_ms(digits: &str) -> u64 {
    let value: u64 = digits.parse().unwrap_or(0);
    match digits.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    }
}

fn minutes_seconds(minutes: u64, seconds: u64) -> Result<u64, TimeParseError> {
    if seconds > 59 {
        return Err(TimeParseError::InvalidSeconds(seconds));
    }
    minutes
        .checked_mul(60_000)
        .and_then(|m| m.checked_add(seconds * 1_000))
        .ok_or(TimeParseError::TooLarge)
}

/// Parse a duration string to milliseconds.
///
/// Supported formats:
/// - Pure number: "4000" (milliseconds)
/// - Seconds: "4s" or "4.5s"
/// - Minutes and seconds: "1m 30s" or "1m30s"
/// - Colon format: "0:40" (minutes:seconds)
/// - Minutes:seconds.milliseconds: "0:04.500"
pub fn parse_duration_ms(input: &str) -> Result<u32, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::EmptyInput);
    }

    let total: u64 = if trimmed.chars().all(|c| c.is_ascii_digit()) {
        parse_number(trimmed, TimeParseError::TooLarge)?
    } else if let Some(captures) = TIME_COLON_MSEC_REGEX.captures(trimmed) {
        let minutes = parse_number(&captures[1], TimeParseError::InvalidMinutes)?;
        let seconds = parse_number(&captures[2], TimeParseError::InvalidSeconds(0))?;
        minutes_seconds(minutes, seconds)?
            .checked_add(fraction_to_ms(&captures[3]))
            .ok_or(TimeParseError::TooLarge)?
    } else if let Some(captures) = TIME_MIN_SEC_REGEX.captures(trimmed) {
        let minutes = parse_number(&captures[1], TimeParseError::InvalidMinutes)?;
        let seconds = parse_number(&captures[2], TimeParseError::InvalidSeconds(0))?;
        minutes_seconds(minutes, seconds)?
    } else if let Some(captures) = TIME_COLON_REGEX.captures(trimmed) {
        let minutes = parse_number(&captures[1], TimeParseError::InvalidMinutes)?;
        let seconds = parse_number(&captures[2], TimeParseError::InvalidSeconds(0))?;
        minutes_seconds(minutes, seconds)?
    } else if let Some(captures) = TIME_SEC_REGEX.captures(trimmed) {
        let seconds = parse_number(&captures[1], TimeParseError::TooLarge)?;
        let fraction = captures.get(2).map(|m| fraction_to_ms(m.as_str())).unwrap_or(0);
        seconds
            .checked_mul(1_000)
            .and_then(|ms| ms.checked_add(fraction))
            .ok_or(TimeParseError::TooLarge)?
    } else {
        return Err(TimeParseError::InvalidFormat(
            "Use: 4000, 4s, 4.5s, 1m30s, 0:40 or 0:04.500".to_string(),
        ));
    };

    u32::try_from(total).map_err(|_| TimeParseError::TooLarge)
}

/// Parse and range-check one of the duration fields.
pub fn validate_duration(input: &str, field_name: &str) -> Result<u32, String> {
    let ms = parse_duration_ms(input).map_err(|e| format!("{}: {}", field_name, e))?;
    if ms < MIN_DURATION_MS {
        return Err(format!("{} must be at least {} ms", field_name, MIN_DURATION_MS));
    }
    if ms > MAX_DURATION_MS {
        return Err(format!("{} cannot exceed {} ms", field_name, MAX_DURATION_MS));
    }
    Ok(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        assert_eq!(parse_duration_ms("4000"), Ok(4_000));
        assert_eq!(parse_duration_ms(" 40s "), Ok(40_000));
        assert_eq!(parse_duration_ms("4.5s"), Ok(4_500));
        assert_eq!(parse_duration_ms("1m 30s"), Ok(90_000));
        assert_eq!(parse_duration_ms("1m30s"), Ok(90_000));
        assert_eq!(parse_duration_ms("0:40"), Ok(40_000));
        assert_eq!(parse_duration_ms("0:04.5"), Ok(4_500));
        assert_eq!(parse_duration_ms("1:02.250"), Ok(62_250));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_duration_ms(""), Err(TimeParseError::EmptyInput));
        assert_eq!(parse_duration_ms("0:75"), Err(TimeParseError::InvalidSeconds(75)));
        assert_eq!(parse_duration_ms("99999999999"), Err(TimeParseError::TooLarge));
        assert_eq!(
            parse_duration_ms("307445734561825:51.999"),
            Err(TimeParseError::TooLarge)
        );
        assert!(matches!(
            parse_duration_ms("soon"),
            Err(TimeParseError::InvalidFormat(_))
        ));
        assert!(parse_duration_ms("-4000").is_err());
    }

    #[test]
    fn duration_fields_are_range_checked() {
        assert_eq!(validate_duration("10s", "Defuse time"), Ok(10_000));
        assert_eq!(
            validate_duration("0", "Plant time"),
            Err("Plant time must be at least 100 ms".to_string())
        );
        assert_eq!(
            validate_duration("11m 0s", "Bomb timer"),
            Err("Bomb timer cannot exceed 600000 ms".to_string())
        );
        assert_eq!(
            validate_duration("x", "Bomb timer"),
            Err("Bomb timer: Invalid time format. Use: 4000, 4s, 4.5s, 1m30s, 0:40 or 0:04.500".to_string())
        );
    }
}
