use super::cache::cache_key;
use super::client::ApiClient;
use super::manual::{ManualStore, MemoryStore};
use super::project::dedup_by_id;
use super::stats::StatsSnapshot;
use super::throttler::Throttler;
use super::{AggregateError, Cache, Identity, Project, Source, SourceError, SourceFailure, devto, github, manual, sort_by_recency, stats};
use crate::Result;
use chrono::Utc;
use core::time::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

const LOG_TARGET: &str = " collector";

/// Tunables for the [`Collector`].
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub github_api_url: String,
    pub devto_api_url: String,

    /// Items per page for listing requests (1..=100)
    pub per_page: u8,

    /// Maximum number of concurrent GitHub requests
    pub enrichment_concurrency: usize,

    /// Number of repositories sampled for the contribution summary
    pub contribution_sample_size: usize,
    pub request_timeout: Duration,

    /// Retries for transport errors and 5xx responses
    pub max_retries: usize,

    /// Longest rate-limit reset the collector is willing to wait for before retrying once
    pub rate_limit_max_wait: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            devto_api_url: "https://dev.to/api".to_string(),
            per_page: 100,
            enrichment_concurrency: 8,
            contribution_sample_size: 5,
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            rate_limit_max_wait: Duration::from_secs(10),
        }
    }
}

/// The merged result of one aggregation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    /// Most recently updated first
    pub projects: Vec<Project>,

    /// Sources that failed while others succeeded
    pub partial_failures: Vec<SourceFailure>,
}

/// Gathers projects from every source configured for an identity.
#[derive(Debug)]
pub struct Collector<S = MemoryStore> {
    github: github::Provider,
    devto: devto::Provider,
    manual: Option<manual::Provider<S>>,
    stats: stats::Provider,
    cache: Cache,
    rate_limit_max_wait: Duration,
}

impl Collector<MemoryStore> {
    /// Create a collector without a manual project store.
    ///
    /// The GitHub token, when given, is sent with every GitHub request and is never logged.
    pub fn new(settings: &CollectorSettings, github_token: Option<&str>, cache: Cache) -> Result<Self> {
        let github_client = ApiClient::new(
            github_token,
            &settings.github_api_url,
            settings.request_timeout,
            settings.max_retries,
        )?;
        let devto_client = ApiClient::new(None, &settings.devto_api_url, settings.request_timeout, settings.max_retries)?;

        let github = github::Provider::new(
            github_client,
            Throttler::new(settings.enrichment_concurrency),
            settings.per_page,
        );

        Ok(Self {
            stats: stats::Provider::new(github.clone(), settings.contribution_sample_size),
            github,
            devto: devto::Provider::new(devto_client, settings.per_page),
            manual: None,
            cache,
            rate_limit_max_wait: settings.rate_limit_max_wait,
        })
    }
}

impl<S: ManualStore> Collector<S> {
    /// Attach the store that holds manually curated projects.
    #[must_use]
    pub fn with_manual_store<T: ManualStore>(self, store: Arc<T>) -> Collector<T> {
        Collector {
            github: self.github,
            devto: self.devto,
            manual: Some(manual::Provider::new(store)),
            stats: self.stats,
            cache: self.cache,
            rate_limit_max_wait: self.rate_limit_max_wait,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Collect, merge, and order the projects of `identity` from all its sources.
    ///
    /// A source is only queried when the identity has an account there (or, for the manual
    /// source, when a store is attached). Sources that fail are reported in
    /// [`Aggregate::partial_failures`]; the call only fails when every queried source failed.
    pub async fn aggregate(&self, identity: &Identity) -> core::result::Result<Aggregate, AggregateError> {
        log::info!(target: LOG_TARGET, "Aggregating projects for user '{identity}'");

        let (github, devto, manual) = tokio::join!(
            self.github_projects(identity),
            self.devto_projects(identity),
            self.manual_projects(identity),
        );

        let outcomes: Vec<_> = [(Source::Github, github), (Source::Devto, devto), (Source::Manual, manual)]
            .into_iter()
            .filter_map(|(source, outcome)| outcome.map(|outcome| (source, outcome)))
            .collect();

        let attempted = outcomes.len();
        let mut projects = Vec::new();
        let mut failures = Vec::new();

        for (source, outcome) in outcomes {
            match outcome {
                Ok(source_projects) => {
                    log::debug!(target: LOG_TARGET, "{source} contributed {} project(s)", source_projects.len());
                    projects.extend(source_projects);
                }
                Err(error) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch {source} projects for '{identity}': {error}");
                    failures.push(SourceFailure { source, error });
                }
            }
        }

        if attempted > 0 && failures.len() == attempted {
            return Err(AggregateError::AllSourcesUnavailable(failures));
        }

        sort_by_recency(&mut projects);

        Ok(Aggregate {
            projects,
            partial_failures: failures,
        })
    }

    /// Compute summary analytics for the GitHub account of `identity`.
    pub async fn fetch_stats(&self, identity: &Identity) -> core::result::Result<StatsSnapshot, SourceError> {
        let Some(username) = identity.github_username() else {
            return Err(SourceError::NotFound(format!("GitHub account for user '{identity}'")));
        };

        self.cached_fetch(cache_key("stats", username), Some(self.github.throttler().as_ref()), || self.stats.fetch_stats(username))
            .await
    }

    /// Drop every cached entry for `identity` so the next call refetches.
    pub fn invalidate(&self, identity: &Identity) {
        let mut keys = vec![manual_cache_key(identity)];
        if let Some(username) = identity.github_username() {
            keys.push(cache_key(Source::Github.as_str(), username));
            keys.push(cache_key("stats", username));
        }
        if let Some(username) = identity.devto_username() {
            keys.push(cache_key(Source::Devto.as_str(), username));
        }

        let removed = keys.iter().filter(|key| self.cache.invalidate(key)).count();
        log::debug!(target: LOG_TARGET, "Invalidated {removed} cache entries for user '{identity}'");
    }

    async fn github_projects(&self, identity: &Identity) -> Option<core::result::Result<Vec<Project>, SourceError>> {
        let username = identity.github_username()?;
        let key = cache_key(Source::Github.as_str(), username);
        Some(
            self.cached_fetch(key, Some(self.github.throttler().as_ref()), || async move {
                self.github.fetch_projects(username).await.map(dedup_by_id)
            })
            .await,
        )
    }

    async fn devto_projects(&self, identity: &Identity) -> Option<core::result::Result<Vec<Project>, SourceError>> {
        let username = identity.devto_username()?;
        let key = cache_key(Source::Devto.as_str(), username);
        Some(self.cached_fetch(key, None, || async move { self.devto.fetch_projects(username).await.map(dedup_by_id) }).await)
    }

    async fn manual_projects(&self, identity: &Identity) -> Option<core::result::Result<Vec<Project>, SourceError>> {
        let provider = self.manual.as_ref()?;
        let user_id = identity.user_id();
        Some(self.cached_fetch(manual_cache_key(identity), None, || async move { provider.fetch_projects(user_id).await.map(dedup_by_id) }).await)
    }

    /// Serve `key` from the cache, or fetch it and populate the cache on success.
    ///
    /// A result fetched while `throttler` was paused is returned but not cached, since optional
    /// enrichment was skipped for it.
    async fn cached_fetch<T, F, Fut>(
        &self,
        key: String,
        throttler: Option<&Throttler>,
        fetch: F,
    ) -> core::result::Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = core::result::Result<T, SourceError>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(hit);
        }

        let paused_before = throttler.is_some_and(Throttler::is_paused);
        let pauses_before = throttler.map(Throttler::pause_count);

        let value = self.retry_after_short_rate_limit(&key, fetch).await?;

        let degraded = throttler.is_some_and(|t| paused_before || t.is_paused() || Some(t.pause_count()) != pauses_before);
        if degraded {
            log::debug!(target: LOG_TARGET, "Not caching '{key}': fetched while rate limited");
        } else if let Err(e) = self.cache.set(&key, &value) {
            log::warn!(target: LOG_TARGET, "Could not cache '{key}': {e:#}");
        }

        Ok(value)
    }

    /// Run `fetch`; if it is rate limited with a reset close enough, wait for the reset and try once more.
    async fn retry_after_short_rate_limit<T, F, Fut>(&self, key: &str, fetch: F) -> core::result::Result<T, SourceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = core::result::Result<T, SourceError>>,
    {
        match fetch().await {
            Err(SourceError::RateLimited(Some(reset_at))) => {
                let wait = (reset_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                if wait > self.rate_limit_max_wait {
                    return Err(SourceError::RateLimited(Some(reset_at)));
                }

                log::info!(target: LOG_TARGET, "Rate limited while fetching '{key}', retrying in {}s", wait.as_secs());
                tokio::time::sleep(wait).await;
                fetch().await
            }
            other => other,
        }
    }
}

fn manual_cache_key(identity: &Identity) -> String {
    format!("{}/{}", Source::Manual.as_str(), identity.user_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> Collector {
        Collector::new(&CollectorSettings::default(), None, Cache::default()).unwrap()
    }

    #[tokio::test]
    async fn test_identity_without_sources_yields_empty_result() {
        let aggregate = collector().aggregate(&Identity::new("u1")).await.unwrap();
        assert!(aggregate.projects.is_empty());
        assert!(aggregate.partial_failures.is_empty());
    }

    #[tokio::test]
    async fn test_stats_require_github_account() {
        let err = collector().fetch_stats(&Identity::new("u1")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cached_entries_are_served_without_fetching() {
        let collector = collector();
        let identity = Identity::new("u1").with_github("octocat");
        let cached = vec![Project {
            id: "1".to_string(),
            title: "cached".to_string(),
            description: String::new(),
            link: String::new(),
            image_url: String::new(),
            stack: Vec::new(),
            source: Source::Github,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            stars: Some(0),
            forks: Some(0),
            is_private: Some(false),
        }];
        collector.cache().set("github/octocat", &cached).unwrap();

        let aggregate = collector.aggregate(&identity).await.unwrap();
        assert_eq!(aggregate.projects, cached);

        collector.invalidate(&identity);
        assert!(collector.cache().is_empty());
    }

    #[test]
    fn test_default_settings() {
        let settings = CollectorSettings::default();
        assert_eq!(settings.per_page, 100);
        assert_eq!(settings.enrichment_concurrency, 8);
        assert_eq!(settings.rate_limit_max_wait, Duration::from_secs(10));
    }
}
