use super::api_types::{Repository, Topics};
use crate::sources::client::ApiClient;
use crate::sources::throttler::Throttler;
use crate::sources::{Project, Source, SourceError, normalize_stack, timestamp};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::Arc;

const LOG_TARGET: &str = "    github";
const MAX_LISTING_PAGES: u32 = 10;

/// How long to hold off enrichment when a rate limit carries no reset time.
const DEFAULT_RATE_LIMIT_PAUSE_SECS: i64 = 60;

/// Fetches a user's public repositories and enriches them with topics.
#[derive(Debug, Clone)]
pub struct Provider {
    client: ApiClient,
    throttler: Arc<Throttler>,
    per_page: u8,
}

impl Provider {
    /// `per_page` is clamped to the range GitHub accepts (1..=100).
    #[must_use]
    pub fn new(client: ApiClient, throttler: Arc<Throttler>, per_page: u8) -> Self {
        Self {
            client,
            throttler,
            per_page: per_page.clamp(1, 100),
        }
    }

    #[must_use]
    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub(crate) fn throttler(&self) -> &Arc<Throttler> {
        &self.throttler
    }

    /// Fetch and normalize all public repositories of `username`.
    ///
    /// Topic enrichment failures never fail the call; affected projects fall back to
    /// their primary language as the only stack entry.
    pub async fn fetch_projects(&self, username: &str) -> Result<Vec<Project>, SourceError> {
        let repos = self.list_repositories(username).await?;
        log::info!(target: LOG_TARGET, "Found {} repositories for GitHub user '{username}'", repos.len());

        let topics = self.fetch_all_topics(&repos).await;
        let now = Utc::now();

        Ok(repos
            .into_iter()
            .zip(topics)
            .map(|(repo, topics)| normalize(repo, topics, now))
            .collect())
    }

    /// List repositories, most recently updated first, following pagination links.
    pub(crate) async fn list_repositories(&self, username: &str) -> Result<Vec<Repository>, SourceError> {
        let per_page = self.per_page.to_string();
        let subject = format!("GitHub user '{username}'");

        let mut all_repos = Vec::new();
        let mut page_num = 1u32;

        loop {
            let page = page_num.to_string();
            let url = self.client.endpoint(
                &["users", username, "repos"],
                &[("per_page", per_page.as_str()), ("sort", "updated"), ("page", page.as_str())],
            );

            let resp = {
                let _permit = self.throttler.acquire().await.map_err(SourceError::unavailable)?;
                self.client.get_json::<Vec<Repository>>(&url, &subject).await?
            };

            let page_len = resp.data.len();
            all_repos.extend(resp.data);

            if !resp.has_next_page || page_len == 0 {
                break;
            }

            page_num += 1;
            if page_num > MAX_LISTING_PAGES {
                log::debug!(
                    target: LOG_TARGET,
                    "Reached maximum page limit ({MAX_LISTING_PAGES}) for '{username}', stopping pagination after {} repositories",
                    all_repos.len()
                );
                break;
            }
        }

        Ok(all_repos)
    }

    /// Fetch topics for every repository, preserving listing order.
    async fn fetch_all_topics(&self, repos: &[Repository]) -> Vec<Option<Vec<String>>> {
        join_all(repos.iter().map(|repo| self.fetch_topics(repo))).await
    }

    async fn fetch_topics(&self, repo: &Repository) -> Option<Vec<String>> {
        if self.throttler.is_paused() {
            return None;
        }

        let _permit = match self.throttler.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not acquire request slot for '{}': {e:#}", repo.name);
                return None;
            }
        };

        // Another request may have hit the rate limit while this one waited
        if self.throttler.is_paused() {
            return None;
        }

        let url = self.client.endpoint(&["repos", repo.owner.login.as_str(), repo.name.as_str(), "topics"], &[]);
        let subject = format!("repository '{}/{}'", repo.owner.login, repo.name);

        match self.client.get_json::<Topics>(&url, &subject).await {
            Ok(resp) => Some(resp.data.names),
            Err(SourceError::RateLimited(reset_at)) => {
                let resume_at = reset_at.unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(DEFAULT_RATE_LIMIT_PAUSE_SECS));
                if self.throttler.pause_until(resume_at) {
                    log::warn!(
                        target: LOG_TARGET,
                        "Hit GitHub rate limit while fetching topics, skipping enrichment until {}",
                        resume_at.with_timezone(&chrono::Local).format("%T")
                    );
                }
                None
            }
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not fetch topics for {subject}: {e}");
                None
            }
        }
    }
}

/// Map a repository plus its (optional) topics onto a [`Project`].
pub(crate) fn normalize(repo: Repository, topics: Option<Vec<String>>, now: DateTime<Utc>) -> Project {
    let stack = normalize_stack(repo.language.into_iter().chain(topics.unwrap_or_default()));

    Project {
        id: repo.id.to_string(),
        title: repo.name,
        description: repo.description.unwrap_or_default(),
        link: repo.html_url,
        image_url: String::new(),
        stack,
        source: Source::Github,
        created_at: timestamp::parse_or(repo.created_at.as_deref(), now),
        updated_at: timestamp::parse_or(repo.updated_at.as_deref(), now),
        stars: Some(repo.stargazers_count),
        forks: Some(repo.forks_count),
        is_private: Some(repo.private),
    }
}
