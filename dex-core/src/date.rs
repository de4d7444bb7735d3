//! Due-date helpers
//!
//! Parsing accepts the forms people type for a due date:
//! - ISO dates: "2026-01-25"
//! - Human dates: "Jan 25", "January 25 2026", "01/25/2026"
//! - Relative: "today", "tomorrow", "monday", "next friday"
//! - Offset: "in 3 days", "in 2 weeks", or a bare day count "10"
//!
//! Every function takes `today` explicitly so results are reproducible.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::error::{DexError, Result};

/// Days from today used when a task is created without a due date.
pub const DEFAULT_DUE_HORIZON_DAYS: u64 = 365;

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Due date used when none was given.
pub fn default_due(today: NaiveDate, horizon_days: u64) -> NaiveDate {
    today
        .checked_add_days(Days::new(horizon_days))
        .unwrap_or(NaiveDate::MAX)
}

/// Signed number of days from `today` until `due`. Negative means overdue.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    due.signed_duration_since(today).num_days()
}

/// Parse a due date relative to `today`.
pub fn parse_due(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    if let Some(date) = try_parse_relative(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_weekday(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_offset(&input, today) {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return Ok(date);
    }

    let with_year = ["%b %d %Y", "%B %d %Y", "%m/%d/%Y", "%d %b %Y", "%d %B %Y"];
    for format in &with_year {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            return Ok(date);
        }
    }

    // chrono cannot parse a date without a year, so borrow the current one
    let without_year = ["%b %d", "%B %d", "%m/%d"];
    for format in &without_year {
        let dated = format!("{} {}", input, today.year());
        let format = format!("{} %Y", format);
        if let Ok(date) = NaiveDate::parse_from_str(&dated, &format) {
            if date < today {
                return date
                    .with_year(today.year() + 1)
                    .ok_or_else(|| DexError::validation("due", format!("'{}' has no next occurrence", input)));
            }
            return Ok(date);
        }
    }

    Err(DexError::validation(
        "due",
        format!(
            "could not parse '{}'; try 'tomorrow', 'Jan 25', '2026-01-25', 'next monday', 'in 3 days'",
            input
        ),
    ))
}

fn try_parse_relative(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    match input {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => None,
    }
}

fn try_parse_weekday(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let weekday_str = input.strip_prefix("next ").unwrap_or(input);

    let target = match weekday_str {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };

    // Next occurrence, never today
    let days = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let days = if days == 0 { 7 } else { days as u64 };

    today.checked_add_days(Days::new(days))
}

fn try_parse_offset(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Ok(days) = input.parse::<u64>() {
        return today.checked_add_days(Days::new(days));
    }

    let rest = input.strip_prefix("in ")?.trim();
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }

    let num: u64 = parts[0].parse().ok()?;
    match parts[1] {
        "day" | "days" => today.checked_add_days(Days::new(num)),
        "week" | "weeks" => today.checked_add_days(Days::new(num.checked_mul(7)?)),
        _ => None,
    }
}

/// Short human description of a due date, e.g. "Tomorrow" or "Overdue (3 days ago)".
pub fn format_due(due: NaiveDate, today: NaiveDate) -> String {
    match days_until(due, today) {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=6 => due.format("%a %b %d").to_string(),
        7..=365 => due.format("%b %d").to_string(),
        diff if diff < 0 => format!("Overdue ({} days ago)", -diff),
        _ => due.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // A Wednesday
    const Y: i32 = 2026;

    fn wed() -> NaiveDate {
        date(Y, 10, 14)
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(parse_due("today", wed()).unwrap(), wed());
        assert_eq!(parse_due("Tomorrow", wed()).unwrap(), date(Y, 10, 15));
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_due("2024-03-01", wed()).unwrap(), date(2024, 3, 1));
    }

    #[test]
    fn test_parse_weekday_never_today() {
        assert_eq!(parse_due("friday", wed()).unwrap(), date(Y, 10, 16));
        assert_eq!(parse_due("wednesday", wed()).unwrap(), date(Y, 10, 21));
        assert_eq!(parse_due("next mon", wed()).unwrap(), date(Y, 10, 19));
    }

    #[test]
    fn test_parse_offsets() {
        assert_eq!(parse_due("in 3 days", wed()).unwrap(), date(Y, 10, 17));
        assert_eq!(parse_due("in 2 weeks", wed()).unwrap(), date(Y, 10, 28));
        assert_eq!(parse_due("10", wed()).unwrap(), date(Y, 10, 24));
    }

    #[test]
    fn test_parse_huge_offsets_are_rejected() {
        assert!(matches!(
            parse_due("in 3000000000000000000 weeks", wed()),
            Err(DexError::Validation { .. })
        ));
        assert!(parse_due("in 18446744073709551615 days", wed()).is_err());
        assert!(parse_due("18446744073709551615", wed()).is_err());
    }

    #[test]
    fn test_parse_month_day_rolls_to_next_year() {
        assert_eq!(parse_due("Dec 25", wed()).unwrap(), date(Y, 12, 25));
        assert_eq!(parse_due("Jan 5", wed()).unwrap(), date(Y + 1, 1, 5));
        assert_eq!(parse_due("January 5 2030", wed()).unwrap(), date(2030, 1, 5));
    }

    #[test]
    fn test_parse_garbage_is_validation_error() {
        assert!(matches!(
            parse_due("whenever", wed()),
            Err(DexError::Validation { .. })
        ));
    }

    #[test]
    fn test_default_due_horizon() {
        assert_eq!(
            default_due(wed(), DEFAULT_DUE_HORIZON_DAYS),
            date(Y + 1, 10, 14)
        );
    }

    #[test]
    fn test_days_until_sign() {
        assert_eq!(days_until(date(Y, 10, 20), wed()), 6);
        assert_eq!(days_until(date(Y, 10, 10), wed()), -4);
    }

    #[test]
    fn test_format_due() {
        assert_eq!(format_due(wed(), wed()), "Today");
        assert_eq!(format_due(date(Y, 10, 15), wed()), "Tomorrow");
        assert_eq!(format_due(date(Y, 10, 11), wed()), "Overdue (3 days ago)");
    }
}
