//! Summary analytics derived from a user's GitHub activity.
//!
//! The contribution timeline is an approximation: it counts commits authored by the
//! user in a small sample of their most recently active repositories.

mod contribution_summary;
mod languages;
mod provider;
mod stats_data;

pub use contribution_summary::{CONTRIBUTION_MONTHS, summarize_contributions};
pub use languages::top_languages;
pub use provider::Provider;
pub use stats_data::{ContributionSummary, MonthlyContribution, Profile, StatsSnapshot};
