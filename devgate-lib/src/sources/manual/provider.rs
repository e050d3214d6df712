use super::raw_project::resolve_or;
use super::{ManualStore, RawManualProject};
use crate::sources::{Project, Source, SourceError, normalize_stack};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const LOG_TARGET: &str = "    manual";

/// Reads manually curated projects from a [`ManualStore`].
#[derive(Debug)]
pub struct Provider<S> {
    store: Arc<S>,
}

impl<S> Clone for Provider<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ManualStore> Provider<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch and normalize the projects stored for `user_id`.
    pub async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>, SourceError> {
        let raw = self
            .store
            .list_projects(user_id)
            .await
            .map_err(SourceError::unavailable)?;

        log::debug!(target: LOG_TARGET, "Found {} manual project(s) for user '{user_id}'", raw.len());

        let now = Utc::now();
        Ok(raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| normalize(raw, index, now))
            .collect())
    }
}

/// Records without an id get a positional one so they stay addressable.
pub(crate) fn normalize(raw: RawManualProject, index: usize, now: DateTime<Utc>) -> Project {
    let id = match raw.id.trim() {
        "" => format!("manual-{index}"),
        id => id.to_string(),
    };

    Project {
        id,
        title: raw.title,
        description: raw.description.unwrap_or_default(),
        link: raw.link,
        image_url: raw.image_url.unwrap_or_default(),
        stack: normalize_stack(raw.stack),
        source: Source::Manual,
        created_at: resolve_or(raw.created_at.as_ref(), now),
        updated_at: resolve_or(raw.updated_at.as_ref(), now),
        stars: None,
        forks: None,
        is_private: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::manual::{MemoryStore, StoreTimestamp};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn test_normalize_keeps_stored_fields() {
        let raw = RawManualProject {
            id: "p1".to_string(),
            title: "Home lab".to_string(),
            description: Some("racks".to_string()),
            link: "https://example.com".to_string(),
            image_url: None,
            stack: vec!["Nix".to_string(), "nix".to_string(), String::new()],
            created_at: Some(StoreTimestamp::Millis(1_704_067_200_000)),
            updated_at: Some(StoreTimestamp::Native {
                seconds: 1_706_745_600,
                nanoseconds: 0,
            }),
        };

        let project = normalize(raw, 0, now());
        assert_eq!(project.id, "p1");
        assert_eq!(project.description, "racks");
        assert_eq!(project.image_url, "");
        assert_eq!(project.stack, vec!["Nix"]);
        assert_eq!(project.source, Source::Manual);
        assert_eq!(project.created_at.timestamp(), 1_704_067_200);
        assert_eq!(project.updated_at.timestamp(), 1_706_745_600);
    }

    #[test]
    fn test_normalize_fills_missing_id_and_timestamps() {
        let raw = RawManualProject {
            updated_at: Some(StoreTimestamp::Text("not a date".to_string())),
            ..RawManualProject::default()
        };

        let project = normalize(raw, 3, now());
        assert_eq!(project.id, "manual-3");
        assert_eq!(project.created_at, now());
        assert_eq!(project.updated_at, now());
    }

    #[tokio::test]
    async fn test_fetch_projects_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "u1",
            vec![RawManualProject {
                id: "x".to_string(),
                ..RawManualProject::default()
            }],
        );

        let provider = Provider::new(store);
        let projects = provider.fetch_projects("u1").await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].source, Source::Manual);
        assert!(provider.fetch_projects("u2").await.unwrap().is_empty());
    }
}
