use chrono::{DateTime, Utc};

use crate::models::{Category, MemberMetrics, MemberScores};

const SECONDS_PER_DAY: i64 = 86_400;

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Whole days elapsed between `at` and `now`, rounded down.
pub fn days_since(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - at).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn recency_score(last_visit: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    clamp_score(100.0 - 2.0 * days_since(last_visit, now) as f64)
}

/// Per-factor breakdown shown next to each member.
///
/// These weights are not the ones behind [`chi_score`]; both read the same
/// counters with different groupings.
pub fn member_scores(
    metrics: &MemberMetrics,
    last_visit: DateTime<Utc>,
    now: DateTime<Utc>,
) -> MemberScores {
    let m = metrics;
    MemberScores {
        recency: recency_score(last_visit, now),
        engagement: clamp_score(
            0.2 * m.post_clicks as f64
                + 0.5 * m.total_contributions as f64
                + 0.3 * m.visits as f64,
        ),
        consumption: clamp_score(
            1.0 * m.published_posts as f64 + 0.4 * m.comments as f64 + 0.2 * m.cheers as f64,
        ),
        participation: clamp_score(
            0.2 * m.votes as f64
                + 0.5 * m.rsvps as f64
                + 0.8 * m.shares as f64
                + 0.3 * m.messages_sent as f64,
        ),
        streak: clamp_score(m.current_streak as f64 * 10.0),
    }
}

/// Ten-term engagement used by the composite score.
pub fn composite_engagement(metrics: &MemberMetrics) -> f64 {
    let m = metrics;
    clamp_score(
        0.2 * m.post_clicks as f64
            + 0.5 * m.total_contributions as f64
            + 0.3 * m.visits as f64
            + 1.0 * m.published_posts as f64
            + 0.4 * m.comments as f64
            + 0.2 * m.cheers as f64
            + 0.2 * m.votes as f64
            + 0.5 * m.rsvps as f64
            + 0.8 * m.shares as f64
            + 0.3 * m.messages_sent as f64,
    )
}

pub fn learning_score(metrics: &MemberMetrics) -> f64 {
    let m = metrics;
    clamp_score(
        10.0 * m.courses_started as f64
            + 20.0 * m.courses_completed as f64
            + 2.0 * m.lessons_started as f64
            + 5.0 * m.lessons_completed as f64,
    )
}

/// Composite Health Index, 0-100. Does not depend on recency or streak.
pub fn chi_score(metrics: &MemberMetrics) -> u32 {
    let blended = 0.7 * composite_engagement(metrics) + 0.3 * learning_score(metrics);
    // Non-negative, so `round` is round-half-up here.
    blended.round() as u32
}

pub fn categorize(chi_score: u32) -> Category {
    match chi_score {
        80.. => Category::Advocate,
        60..=79 => Category::AllStar,
        40..=59 => Category::Average,
        _ => Category::AtRisk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap()
    }

    fn midnight_days_ago(days: i64) -> DateTime<Utc> {
        now().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc() - Duration::days(days)
    }

    #[test]
    fn recency_decays_two_points_per_day() {
        assert_eq!(recency_score(midnight_days_ago(0), now()), 100.0);
        assert_eq!(recency_score(midnight_days_ago(10), now()), 80.0);
        assert_eq!(recency_score(midnight_days_ago(49), now()), 2.0);
        assert_eq!(recency_score(midnight_days_ago(50), now()), 0.0);
        assert_eq!(recency_score(midnight_days_ago(400), now()), 0.0);
    }

    #[test]
    fn future_visits_clamp_to_full_recency() {
        let tomorrow = now() + Duration::days(3);
        assert_eq!(days_since(tomorrow, now()), -3);
        assert_eq!(recency_score(tomorrow, now()), 100.0);
    }

    #[test]
    fn composite_example_lands_at_risk() {
        let metrics = MemberMetrics {
            total_contributions: 10,
            published_posts: 2,
            ..MemberMetrics::default()
        };
        assert!((composite_engagement(&metrics) - 7.0).abs() < 1e-9);
        assert_eq!(learning_score(&metrics), 0.0);
        assert_eq!(chi_score(&metrics), 5);

        let category = categorize(chi_score(&metrics));
        assert_eq!(category, Category::AtRisk);
        assert_eq!(category.color(), "#F44336");
    }

    #[test]
    fn breakdown_and_composite_weigh_counters_differently() {
        // Published posts feed consumption in the breakdown but engagement in
        // the composite.
        let metrics = MemberMetrics {
            published_posts: 50,
            ..MemberMetrics::default()
        };
        let scores = member_scores(&metrics, midnight_days_ago(0), now());
        assert_eq!(scores.engagement, 0.0);
        assert_eq!(scores.consumption, 50.0);
        assert_eq!(composite_engagement(&metrics), 50.0);
        assert_eq!(chi_score(&metrics), 35);
    }

    #[test]
    fn ten_days_idle_member_has_recency_eighty_only_in_breakdown() {
        let metrics = MemberMetrics::default();
        let scores = member_scores(&metrics, midnight_days_ago(10), now());
        assert_eq!(scores.recency, 80.0);
        assert_eq!(scores.streak, 0.0);
        assert_eq!(chi_score(&metrics), 0);
    }

    #[test]
    fn every_factor_stays_within_bounds() {
        let saturated = MemberMetrics {
            post_clicks: 10_000,
            total_contributions: 10_000,
            visits: 10_000,
            published_posts: 10_000,
            comments: 10_000,
            cheers: 10_000,
            votes: 10_000,
            rsvps: 10_000,
            shares: 10_000,
            messages_sent: 10_000,
            courses_started: 10_000,
            courses_completed: 10_000,
            lessons_started: 10_000,
            lessons_completed: 10_000,
            current_streak: 10_000,
            max_streak: 10_000,
        };
        for metrics in [MemberMetrics::default(), saturated] {
            let s = member_scores(&metrics, midnight_days_ago(5), now());
            for value in [s.recency, s.engagement, s.consumption, s.participation, s.streak] {
                assert!((0.0..=100.0).contains(&value));
            }
            assert!(chi_score(&metrics) <= 100);
        }
        assert_eq!(chi_score(&saturated), 100);
    }

    #[test]
    fn streak_caps_at_ten_days() {
        let metrics = MemberMetrics {
            current_streak: 4,
            ..MemberMetrics::default()
        };
        assert_eq!(member_scores(&metrics, now(), now()).streak, 40.0);

        let metrics = MemberMetrics {
            current_streak: 11,
            ..MemberMetrics::default()
        };
        assert_eq!(member_scores(&metrics, now(), now()).streak, 100.0);
    }

    #[test]
    fn chi_score_rounds_half_up() {
        let metrics = MemberMetrics {
            lessons_started: 1,
            ..MemberMetrics::default()
        };
        assert!((learning_score(&metrics) - 2.0).abs() < 1e-9);
        assert_eq!(chi_score(&metrics), 1);

        // 0.3 * 5 = 1.5
        let metrics = MemberMetrics {
            lessons_completed: 1,
            ..MemberMetrics::default()
        };
        assert_eq!(chi_score(&metrics), 2);
    }

    #[test]
    fn categories_partition_the_score_range() {
        for score in 0..=100u32 {
            let expected = if score >= 80 {
                Category::Advocate
            } else if score >= 60 {
                Category::AllStar
            } else if score >= 40 {
                Category::Average
            } else {
                Category::AtRisk
            };
            assert_eq!(categorize(score), expected, "score {score}");
        }
        assert_eq!(categorize(79), Category::AllStar);
        assert_eq!(categorize(80), Category::Advocate);
        assert_eq!(categorize(40), Category::Average);
        assert_eq!(categorize(39), Category::AtRisk);
    }

    #[test]
    fn colors_follow_categories() {
        assert_eq!(Category::Advocate.color(), "#8A2BE2");
        assert_eq!(Category::AllStar.color(), "#4CAF50");
        assert_eq!(Category::Average.color(), "#FFC107");
        assert_eq!(Category::AtRisk.color(), "#F44336");
    }
}
