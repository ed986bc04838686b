use chrono::{DateTime, Duration, Utc};

use crate::models::{Category, CategoryDistribution, KeyMetrics, Member};

/// Window used for both "new member" and "churned member".
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ACTIVITY_WINDOW_DAYS)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub key_metrics: KeyMetrics,
    pub category_distribution: CategoryDistribution,
}

#[derive(Default)]
struct Tally {
    total: usize,
    new: usize,
    at_risk: usize,
    churned: usize,
    distribution: CategoryDistribution,
}

/// Folds one run's members into the dashboard aggregates.
pub fn summarize(members: &[Member], now: DateTime<Utc>) -> Summary {
    let cutoff = window_start(now);

    let tally = members.iter().fold(Tally::default(), |mut tally, member| {
        tally.total += 1;
        if member.joined_at > cutoff {
            tally.new += 1;
        }
        if member.category == Category::AtRisk {
            tally.at_risk += 1;
        }
        if member.last_visit_at < cutoff {
            tally.churned += 1;
        }
        tally.distribution.record(member.category);
        tally
    });

    Summary {
        key_metrics: KeyMetrics {
            total_members: tally.total,
            new_members: tally.new,
            at_risk_members: tally.at_risk,
            churn_rate: churn_rate(tally.churned, tally.total),
        },
        category_distribution: tally.distribution,
    }
}

/// Whole-number percentage of churned members; 0 when there are no members.
pub fn churn_rate(churned: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * churned as f64 / total as f64).round() as u32
}
