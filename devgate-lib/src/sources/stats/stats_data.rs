use serde::{Deserialize, Serialize};

/// Summary analytics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub public_repo_count: u64,
    pub followers: u64,
    pub following: u64,

    /// At most three languages, most frequent first
    pub top_languages: Vec<String>,
    pub profile: Profile,
    pub contribution_summary: ContributionSummary,
}

/// Public profile fields, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub html_url: Option<String>,
}

/// Approximate commit counts per calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    /// Oldest month first, ending with the current month
    pub months: Vec<MonthlyContribution>,
    pub total: u64,

    /// Number of repositories whose commits were counted
    pub sampled_repositories: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyContribution {
    /// `YYYY-MM`
    pub month: String,
    pub count: u64,
}
