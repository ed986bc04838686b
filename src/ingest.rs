//! Positional row normalization and date parsing for the community export.
//!
//! Columns are addressed by position only. Every positional index lives in
//! [`col`], so moving to header-based lookup only touches this module.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::models::{MemberMetrics, MemberRow};

/// First cell of the secondary header row the export tool emits.
pub const HEADER_SENTINEL: &str = "--";

pub const DEFAULT_ROLE: &str = "Member";

pub mod col {
    pub const AVATAR_URL: usize = 0;
    pub const NAME: usize = 1;
    pub const ROLE: usize = 2;
    pub const JOIN_DATE: usize = 3;
    pub const LAST_VISIT: usize = 4;
    pub const CURRENT_STREAK: usize = 5;
    pub const MAX_STREAK: usize = 6;
    pub const POST_CLICKS: usize = 7;
    pub const TOTAL_CONTRIBUTIONS: usize = 8;
    pub const VISITS: usize = 9;
    pub const PUBLISHED_POSTS: usize = 10;
    pub const COMMENTS: usize = 11;
    pub const CHEERS: usize = 12;
    pub const VOTES: usize = 13;
    pub const RSVPS: usize = 14;
    pub const SHARES: usize = 15;
    pub const MESSAGES_SENT: usize = 16;
    pub const COURSES_STARTED: usize = 17;
    pub const COURSES_COMPLETED: usize = 18;
    pub const LESSONS_STARTED: usize = 19;
    pub const LESSONS_COMPLETED: usize = 20;
}

/// Converts one row of cells into a [`MemberRow`].
///
/// Returns `None` for the sentinel header row and for rows without a name.
/// Numeric cells never fail; see [`parse_count`].
pub fn normalize_row(cells: &[&str]) -> Option<MemberRow> {
    let cell = |index: usize| cells.get(index).copied();

    if cell(col::AVATAR_URL) == Some(HEADER_SENTINEL) {
        return None;
    }

    let name = cell(col::NAME).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let role = match cell(col::ROLE).map(str::trim) {
        Some(role) if !role.is_empty() => role.to_string(),
        _ => DEFAULT_ROLE.to_string(),
    };

    let count = |index: usize| parse_count(cell(index));
    let metrics = MemberMetrics {
        post_clicks: count(col::POST_CLICKS),
        total_contributions: count(col::TOTAL_CONTRIBUTIONS),
        visits: count(col::VISITS),
        published_posts: count(col::PUBLISHED_POSTS),
        comments: count(col::COMMENTS),
        cheers: count(col::CHEERS),
        votes: count(col::VOTES),
        rsvps: count(col::RSVPS),
        shares: count(col::SHARES),
        messages_sent: count(col::MESSAGES_SENT),
        courses_started: count(col::COURSES_STARTED),
        courses_completed: count(col::COURSES_COMPLETED),
        lessons_started: count(col::LESSONS_STARTED),
        lessons_completed: count(col::LESSONS_COMPLETED),
        current_streak: count(col::CURRENT_STREAK),
        max_streak: count(col::MAX_STREAK),
    };

    Some(MemberRow {
        name: name.to_string(),
        role,
        join_date: cell(col::JOIN_DATE).unwrap_or_default().to_string(),
        last_visit: cell(col::LAST_VISIT).unwrap_or_default().to_string(),
        metrics,
    })
}

/// Reads a counter cell such as `"1,204"`.
///
/// Thousands separators are stripped, then the leading run of digits is
/// read. Anything else (absent, empty, signed, overflowing) reads as 0.
pub fn parse_count(cell: Option<&str>) -> u64 {
    let Some(raw) = cell else {
        return 0;
    };
    let stripped: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let digits_end = stripped
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stripped.len());

    stripped[..digits_end].parse().unwrap_or(0)
}

/// Parses a `YYYY-MM-DD` date into midnight UTC.
///
/// Returns `None` when the input is empty, a component is not an integer, or
/// the calendar date does not exist.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut parts = input.split('-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Canonical ISO 8601 form used in the dashboard payload.
pub fn to_iso(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
