use super::contribution_summary::window_start;
use super::{Profile, StatsSnapshot, summarize_contributions, top_languages};
use crate::sources::github::{self, CommitEntry, Repository, UserProfile};
use crate::sources::{SourceError, timestamp};
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::join_all;

const LOG_TARGET: &str = "     stats";
const TOP_LANGUAGE_COUNT: usize = 3;
const COMMITS_PER_PAGE: &str = "100";

/// Computes a [`StatsSnapshot`] from the GitHub API.
#[derive(Debug, Clone)]
pub struct Provider {
    github: github::Provider,
    sample_size: usize,
}

impl Provider {
    /// `sample_size` is the number of recently active repositories whose commits are counted.
    #[must_use]
    pub fn new(github: github::Provider, sample_size: usize) -> Self {
        Self { github, sample_size }
    }

    pub async fn fetch_stats(&self, username: &str) -> Result<StatsSnapshot, SourceError> {
        let (profile, repos) = tokio::join!(self.fetch_profile(username), self.github.list_repositories(username));
        let profile = profile?;
        let repos = repos?;

        let top_languages = top_languages(repos.iter().filter_map(|r| r.language.as_deref()), TOP_LANGUAGE_COUNT);

        let now = Utc::now();
        let since = window_start(now);
        let sample = most_recently_active(&repos, self.sample_size, now);

        let commit_dates = join_all(sample.iter().map(|repo| self.fetch_commit_dates(repo, username, since))).await;
        let sampled = commit_dates.iter().filter(|dates| dates.is_some()).count();
        let contribution_summary = summarize_contributions(commit_dates.into_iter().flatten().flatten(), sampled, now);

        log::info!(
            target: LOG_TARGET,
            "Counted {} commit(s) across {sampled} sampled repositories for '{username}'",
            contribution_summary.total
        );

        Ok(StatsSnapshot {
            public_repo_count: profile.public_repos,
            followers: profile.followers,
            following: profile.following,
            top_languages,
            profile: Profile {
                login: profile.login,
                name: profile.name,
                avatar_url: profile.avatar_url,
                bio: profile.bio,
                location: profile.location,
                company: profile.company,
                blog: profile.blog,
                html_url: profile.html_url,
            },
            contribution_summary,
        })
    }

    async fn fetch_profile(&self, username: &str) -> Result<UserProfile, SourceError> {
        let client = self.github.client();
        let url = client.endpoint(&["users", username], &[]);
        let _permit = self.github.throttler().acquire().await.map_err(SourceError::unavailable)?;
        Ok(client.get_json::<UserProfile>(&url, &format!("GitHub user '{username}'")).await?.data)
    }

    /// One page of commits authored by `username` since `since`. Failures yield `None`.
    async fn fetch_commit_dates(&self, repo: &Repository, username: &str, since: DateTime<Utc>) -> Option<Vec<DateTime<Utc>>> {
        let throttler = self.github.throttler();
        if throttler.is_paused() {
            log::debug!(target: LOG_TARGET, "Skipping commits for '{}' while rate limited", repo.name);
            return None;
        }

        let client = self.github.client();
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = client.endpoint(
            &["repos", repo.owner.login.as_str(), repo.name.as_str(), "commits"],
            &[("author", username), ("since", since.as_str()), ("per_page", COMMITS_PER_PAGE)],
        );
        let subject = format!("repository '{}/{}'", repo.owner.login, repo.name);

        let _permit = throttler.acquire().await.ok()?;
        match client.get_json::<Vec<CommitEntry>>(&url, &subject).await {
            Ok(resp) => Some(
                resp.data
                    .iter()
                    .filter_map(|c| c.date())
                    .filter_map(timestamp::parse)
                    .collect(),
            ),
            Err(e) => {
                // empty repositories answer 409, which lands here as well
                log::debug!(target: LOG_TARGET, "Could not fetch commits for {subject}: {e}");
                None
            }
        }
    }
}

/// The `count` repositories with the most recent activity (last push, else last update).
fn most_recently_active(repos: &[Repository], count: usize, now: DateTime<Utc>) -> Vec<&Repository> {
    let mut ranked: Vec<(&Repository, DateTime<Utc>)> = repos
        .iter()
        .map(|repo| {
            let active_at = repo
                .pushed_at
                .as_deref()
                .and_then(timestamp::parse)
                .or_else(|| repo.updated_at.as_deref().and_then(timestamp::parse))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            (repo, active_at.min(now))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(count).map(|(repo, _)| repo).collect()
}
