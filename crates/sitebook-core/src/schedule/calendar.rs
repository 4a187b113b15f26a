//! Qualifying-day arithmetic and date input parsing.
//!
//! Weekdays use the Monday=0 .. Sunday=6 numbering throughout.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Display format for schedule dates (`06/04/2024`).
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Which calendar days do not count toward a phase's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipRule {
    /// Saturday (5) and Sunday (6) are excluded.
    Weekends,
    /// Only Sunday (6) is excluded.
    Sundays,
}

impl SkipRule {
    pub fn excludes(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_monday();
        match self {
            Self::Weekends => weekday >= 5,
            Self::Sundays => weekday == 6,
        }
    }
}

/// Advance from `from` until `days` qualifying days have been counted.
///
/// The starting day itself is never evaluated; counting begins the day after.
/// Returns `None` only if the walk runs past the last representable date.
pub fn advance_qualifying_days(from: NaiveDate, days: u32, rule: SkipRule) -> Option<NaiveDate> {
    let mut cursor = from;
    let mut counted = 0;
    while counted < days {
        cursor = cursor.succ_opt()?;
        if rule.excludes(cursor) {
            continue;
        }
        counted += 1;
    }
    Some(cursor)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date {0:?} (expected YYYY-MM-DD or MM/DD/YYYY)")]
pub struct DateParseError(pub String);

/// Parse a start date entered as `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT))
        .map_err(|_| DateParseError(input.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekend_rule_excludes_saturday_and_sunday() {
        // 2024-06-07 is a Friday.
        assert!(!SkipRule::Weekends.excludes(date(2024, 6, 7)));
        assert!(SkipRule::Weekends.excludes(date(2024, 6, 8)));
        assert!(SkipRule::Weekends.excludes(date(2024, 6, 9)));
        assert!(!SkipRule::Weekends.excludes(date(2024, 6, 10)));
    }

    #[test]
    fn sunday_rule_keeps_saturday() {
        assert!(!SkipRule::Sundays.excludes(date(2024, 6, 8)));
        assert!(SkipRule::Sundays.excludes(date(2024, 6, 9)));
    }

    #[test]
    fn advance_skips_excluded_days() {
        // Friday + 1 weekday lands on Monday.
        assert_eq!(
            advance_qualifying_days(date(2024, 6, 7), 1, SkipRule::Weekends),
            Some(date(2024, 6, 10))
        );
        // Friday + 2 Sunday-excluded days: Saturday counts, Sunday doesn't.
        assert_eq!(
            advance_qualifying_days(date(2024, 6, 7), 2, SkipRule::Sundays),
            Some(date(2024, 6, 10))
        );
    }

    #[test]
    fn excluded_start_day_is_not_evaluated() {
        // Starting on a Sunday: Monday is the first day counted.
        assert_eq!(
            advance_qualifying_days(date(2024, 6, 9), 1, SkipRule::Sundays),
            Some(date(2024, 6, 10))
        );
    }

    #[test]
    fn advance_past_last_date_is_none() {
        assert_eq!(
            advance_qualifying_days(NaiveDate::MAX, 1, SkipRule::Sundays),
            None
        );
    }

    #[test]
    fn parse_accepts_both_formats() {
        assert_eq!(parse_date("2024-06-03").unwrap(), date(2024, 6, 3));
        assert_eq!(parse_date("06/03/2024").unwrap(), date(2024, 6, 3));
        assert_eq!(parse_date(" 2024-06-03 ").unwrap(), date(2024, 6, 3));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            parse_date("2024-02-30"),
            Err(DateParseError("2024-02-30".to_owned()))
        );
        assert!(parse_date("next monday").is_err());
    }
}
