use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw activity counters for one member, as read from a single CSV row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMetrics {
    pub post_clicks: u64,
    pub total_contributions: u64,
    pub visits: u64,
    pub published_posts: u64,
    pub comments: u64,
    pub cheers: u64,
    pub votes: u64,
    pub rsvps: u64,
    pub shares: u64,
    pub messages_sent: u64,
    pub courses_started: u64,
    pub courses_completed: u64,
    pub lessons_started: u64,
    pub lessons_completed: u64,
    pub current_streak: u64,
    pub max_streak: u64,
}

/// Per-factor breakdown, each value in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemberScores {
    pub recency: f64,
    pub engagement: f64,
    pub consumption: f64,
    pub participation: f64,
    pub streak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Advocate,
    #[serde(rename = "All Star")]
    AllStar,
    Average,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Advocate,
        Category::AllStar,
        Category::Average,
        Category::AtRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Advocate => "Advocate",
            Category::AllStar => "All Star",
            Category::Average => "Average",
            Category::AtRisk => "At Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Category::Advocate => "#8A2BE2",
            Category::AllStar => "#4CAF50",
            Category::Average => "#FFC107",
            Category::AtRisk => "#F44336",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and activity fields of a row that passed the normalizer gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub name: String,
    pub role: String,
    pub join_date: String,
    pub last_visit: String,
    pub metrics: MemberMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub role: String,
    pub join_date: String,
    pub last_visit: String,
    pub current_streak: u64,
    pub max_streak: u64,
    pub chi_score: u32,
    pub category: Category,
    pub category_color: &'static str,
    pub scores: MemberScores,
    pub metrics: MemberMetrics,
    #[serde(skip)]
    pub joined_at: DateTime<Utc>,
    #[serde(skip)]
    pub last_visit_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_members: usize,
    pub new_members: usize,
    pub at_risk_members: usize,
    pub churn_rate: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDistribution {
    #[serde(rename = "Advocate")]
    pub advocate: usize,
    #[serde(rename = "All Star")]
    pub all_star: usize,
    #[serde(rename = "Average")]
    pub average: usize,
    #[serde(rename = "At Risk")]
    pub at_risk: usize,
}

impl CategoryDistribution {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Advocate => self.advocate,
            Category::AllStar => self.all_star,
            Category::Average => self.average,
            Category::AtRisk => self.at_risk,
        }
    }

    pub fn record(&mut self, category: Category) {
        match category {
            Category::Advocate => self.advocate += 1,
            Category::AllStar => self.all_star += 1,
            Category::Average => self.average += 1,
            Category::AtRisk => self.at_risk += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.advocate + self.all_star + self.average + self.at_risk
    }
}

/// Everything the dashboard renders for one upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub members: Vec<Member>,
    pub key_metrics: KeyMetrics,
    pub category_distribution: CategoryDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailurePayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
