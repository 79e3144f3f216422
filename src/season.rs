//! Season-string helpers.
//!
//! A season is identified by the year it starts in `YYYY-YY` form (the
//! season tipping off in October 2024 is `"2024-25"`). Seasons roll over in
//! October: January through September belong to the season that started the
//! previous calendar year.

use time::{Date, OffsetDateTime};

const SEASON_START_MONTH: u8 = 10;

/// Returns the season containing the given date.
///
/// # Examples
///
/// ```
/// use courtside::season::season_for_date;
/// use time::macros::date;
///
/// assert_eq!(season_for_date(date!(2024 - 11 - 15)), "2024-25");
/// assert_eq!(season_for_date(date!(2025 - 03 - 15)), "2024-25");
/// assert_eq!(season_for_date(date!(2025 - 10 - 15)), "2025-26");
/// ```
pub fn season_for_date(date: Date) -> String {
    let year = date.year();
    let start_year = if u8::from(date.month()) >= SEASON_START_MONTH {
        year
    } else {
        year - 1
    };
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

/// Returns the season containing today (UTC).
pub fn current_season() -> String {
    season_for_date(OffsetDateTime::now_utc().date())
}

/// Extracts the start year from a `YYYY-YY` season string.
///
/// Returns `None` when the string is not in season format.
pub fn season_start_year(season: &str) -> Option<i32> {
    let (start, rest) = season.split_once('-')?;
    if start.len() != 4 || rest.len() != 2 {
        return None;
    }
    rest.parse::<u8>().ok()?;
    start.parse().ok()
}

/// Converts a season string to the season-id form some endpoints use,
/// e.g. `"2024-25"` → `"22024"` (the `2` prefix marks the regular season).
pub fn season_id(season: &str) -> Option<String> {
    Some(format!("2{}", season_start_year(season)?))
}
