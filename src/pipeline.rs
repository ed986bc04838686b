use std::io::Read;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::error::DashboardError;
use crate::ingest;
use crate::models::{Dashboard, Member, MemberRow};
use crate::scoring;
use crate::summary;

/// Date gate, scoring and categorization for one normalized row.
///
/// Returns `None` when either date is invalid; such rows are dropped.
pub fn score_row(row: MemberRow, now: DateTime<Utc>) -> Option<Member> {
    let (Some(joined_at), Some(last_visit_at)) = (
        ingest::parse_date(&row.join_date),
        ingest::parse_date(&row.last_visit),
    ) else {
        warn!(member = %row.name, join_date = %row.join_date, last_visit = %row.last_visit,
            "invalid date for member, dropping row");
        return None;
    };

    let chi_score = scoring::chi_score(&row.metrics);
    let category = scoring::categorize(chi_score);

    Some(Member {
        join_date: ingest::to_iso(&joined_at),
        last_visit: ingest::to_iso(&last_visit_at),
        current_streak: row.metrics.current_streak,
        max_streak: row.metrics.max_streak,
        chi_score,
        category,
        category_color: category.color(),
        scores: scoring::member_scores(&row.metrics, last_visit_at, now),
        metrics: row.metrics,
        joined_at,
        last_visit_at,
        name: row.name,
        role: row.role,
    })
}

/// Runs every record through the pipeline and builds the dashboard.
///
/// A single stream error aborts the whole run.
pub fn build_dashboard<I>(records: I, now: DateTime<Utc>) -> Result<Dashboard, DashboardError>
where
    I: IntoIterator<Item = csv::Result<StringRecord>>,
{
    let mut members = Vec::new();
    let mut skipped = 0usize;
    let mut dropped = 0usize;

    for record in records {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();

        let Some(row) = ingest::normalize_row(&cells) else {
            debug!(first_cell = cells.first().copied().unwrap_or_default(), "skipping row");
            skipped += 1;
            continue;
        };

        match score_row(row, now) {
            Some(member) => members.push(member),
            None => dropped += 1,
        }
    }

    // Stable, so equal scores keep their row order.
    members.sort_by(|a, b| b.chi_score.cmp(&a.chi_score));

    let summary = summary::summarize(&members, now);
    debug_assert_eq!(summary.category_distribution.total(), members.len());
    info!(
        members = members.len(),
        skipped,
        dropped,
        churn_rate = summary.key_metrics.churn_rate,
        "finished reading CSV"
    );

    Ok(Dashboard {
        members,
        key_metrics: summary.key_metrics,
        category_distribution: summary.category_distribution,
    })
}

/// Decodes CSV text (header line first) and runs the pipeline over it.
pub fn read_dashboard<R: Read>(reader: R, now: DateTime<Utc>) -> Result<Dashboard, DashboardError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    build_dashboard(csv_reader.records(), now)
}

/// Highest-scoring members; `members` is already sorted.
pub fn top_members(members: &[Member], limit: usize) -> &[Member] {
    &members[..limit.min(members.len())]
}
