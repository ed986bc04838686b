use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Category, Dashboard, Member};
use crate::pipeline::top_members;
use crate::summary;

const TOP_ENGAGEMENT: usize = 5;

pub fn at_risk_members(members: &[Member]) -> Vec<&Member> {
    members
        .iter()
        .filter(|member| member.category == Category::AtRisk)
        .collect()
}

pub fn build_report(dashboard: &Dashboard, now: DateTime<Utc>, limit: usize) -> String {
    let metrics = &dashboard.key_metrics;
    let mut output = String::new();

    let _ = writeln!(output, "# Community Health Report");
    let _ = writeln!(
        output,
        "Generated {} (activity window since {})",
        now.date_naive(),
        summary::window_start(now).date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    let _ = writeln!(output, "- Total Members: {}", metrics.total_members);
    let _ = writeln!(output, "- New Members: {}", metrics.new_members);
    let _ = writeln!(output, "- At Risk: {}", metrics.at_risk_members);
    let _ = writeln!(output, "- Churn Rate: {}%", metrics.churn_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Distribution");
    for category in Category::ALL {
        let _ = writeln!(
            output,
            "- {} ({}): {}",
            category,
            category.color(),
            dashboard.category_distribution.get(category)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Engagement Scores");
    let top = top_members(&dashboard.members, TOP_ENGAGEMENT);
    if top.is_empty() {
        let _ = writeln!(output, "No members in this upload.");
    } else {
        for member in top {
            let _ = writeln!(
                output,
                "- {} ({}) CHI {} [{}]",
                member.name, member.role, member.chi_score, member.category
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## At Risk Members");
    let at_risk = at_risk_members(&dashboard.members);
    if at_risk.is_empty() {
        let _ = writeln!(output, "No members are at risk.");
    } else {
        for member in at_risk.iter().take(limit) {
            let _ = writeln!(
                output,
                "- {} CHI {}, last visit {}",
                member.name,
                member.chi_score,
                member.last_visit_at.date_naive()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Factor Breakdown");
    let breakdown = top_members(&dashboard.members, limit);
    if breakdown.is_empty() {
        let _ = writeln!(output, "No members in this upload.");
    } else {
        let _ = writeln!(
            output,
            "| Member | CHI | Recency | Engagement | Consumption | Participation | Streak |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|");
        for member in breakdown {
            let s = &member.scores;
            let _ = writeln!(
                output,
                "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |",
                member.name,
                member.chi_score,
                s.recency,
                s.engagement,
                s.consumption,
                s.participation,
                s.streak
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::read_dashboard;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn report_lists_metrics_and_rosters() {
        let text = "Avatar,Name,Role,Join Date,Last Visit,Current Streak,Max Streak,Post Clicks,Total Contributions\n\
                    a.png,Avery Lee,Host,2024-05-25,2024-05-31,1,1,0,200\n\
                    b.png,Jules Moreno,Member,2023-01-01,2024-01-01,0,0,0,0\n";
        let dashboard = read_dashboard(text.as_bytes(), now()).unwrap();
        let report = build_report(&dashboard, now(), 10);

        assert!(report.contains("- Total Members: 2"));
        assert!(report.contains("- Churn Rate: 50%"));
        assert!(report.contains("- All Star (#4CAF50): 1"));
        assert!(report.contains("- Advocate (#8A2BE2): 0"));
        assert!(report.contains("- Avery Lee (Host) CHI 70 [All Star]"));
        assert!(report.contains("- Jules Moreno CHI 0, last visit 2024-01-01"));
        assert!(report.contains("| Avery Lee | 70 | 98.0 | 100.0 | 0.0 | 0.0 | 10.0 |"));
    }

    #[test]
    fn empty_dashboard_renders_placeholders() {
        let dashboard = read_dashboard("Avatar,Name\n".as_bytes(), now()).unwrap();
        let report = build_report(&dashboard, now(), 10);

        assert!(report.contains("- Total Members: 0"));
        assert!(report.contains("- Churn Rate: 0%"));
        assert!(report.contains("No members are at risk."));
        assert!(report.contains("No members in this upload."));
    }
}
