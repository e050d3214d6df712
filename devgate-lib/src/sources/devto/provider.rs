use super::article::Article;
use crate::sources::client::ApiClient;
use crate::sources::{Project, Source, SourceError, normalize_stack, timestamp};
use chrono::{DateTime, Utc};

const LOG_TARGET: &str = "     devto";

/// Fetches a user's published dev.to articles.
#[derive(Debug, Clone)]
pub struct Provider {
    client: ApiClient,
    per_page: u8,
}

impl Provider {
    #[must_use]
    pub fn new(client: ApiClient, per_page: u8) -> Self {
        Self {
            client,
            per_page: per_page.clamp(1, 100),
        }
    }

    pub async fn fetch_projects(&self, username: &str) -> Result<Vec<Project>, SourceError> {
        let per_page = self.per_page.to_string();
        let url = self
            .client
            .endpoint(&["articles"], &[("username", username), ("per_page", per_page.as_str())]);

        let resp = self
            .client
            .get_json::<Vec<Article>>(&url, &format!("dev.to user '{username}'"))
            .await?;

        log::info!(target: LOG_TARGET, "Found {} articles for dev.to user '{username}'", resp.data.len());

        let now = Utc::now();
        Ok(resp.data.into_iter().map(|article| normalize(article, now)).collect())
    }
}

pub(crate) fn normalize(article: Article, now: DateTime<Utc>) -> Project {
    let created_at = timestamp::parse_or(article.published_at.as_deref(), now);
    let updated_at = article
        .edited_at
        .as_deref()
        .and_then(timestamp::parse)
        .unwrap_or(created_at);

    Project {
        id: article.id.to_string(),
        title: article.title,
        description: article.description.unwrap_or_default(),
        link: article.url,
        image_url: article.cover_image.unwrap_or_default(),
        stack: normalize_stack(article.tag_list),
        source: Source::Devto,
        created_at,
        updated_at,
        stars: None,
        forks: None,
        is_private: None,
    }
}
