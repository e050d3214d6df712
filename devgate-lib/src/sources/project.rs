use chrono::{DateTime, Utc};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString, IntoStaticStr};

const LOG_TARGET: &str = "   project";

/// Where a project record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    /// Public repositories on GitHub
    Github,

    /// Articles published on dev.to
    Devto,

    /// Projects curated by the user
    Manual,
}

impl Source {
    /// The wire name of the source (`github`, `devto`, `manual`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A project normalized from any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier, unique within its source
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image_url: String,

    /// Technology tags, primary language first
    pub stack: Vec<String>,
    pub source: Source,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // GitHub only

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// Build a technology stack from raw tags.
///
/// Entries are trimmed, empty entries are dropped, and later duplicates (compared
/// case-insensitively) are removed so the first spelling wins.
pub fn normalize_stack<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref().trim();
            if tag.is_empty() || !seen.insert(tag.to_lowercase()) {
                return None;
            }
            Some(tag.to_string())
        })
        .collect()
}

/// Most recently updated first, ties broken by `(source, id)`.
fn recency_order(a: &Project, b: &Project) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.source.as_str().cmp(b.source.as_str()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort projects so the most recently updated come first.
///
/// The ordering is total, so the result does not depend on the input order.
pub fn sort_by_recency(projects: &mut [Project]) {
    projects.sort_by(recency_order);
}

/// Drop projects whose id already appeared earlier in the same batch.
pub(crate) fn dedup_by_id(projects: Vec<Project>) -> Vec<Project> {
    let mut seen = HashSet::with_capacity(projects.len());
    projects
        .into_iter()
        .filter(|p| {
            let fresh = seen.insert(p.id.clone());
            if !fresh {
                log::debug!(target: LOG_TARGET, "Dropping duplicate {} project '{}'", p.source, p.id);
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn project(source: Source, id: &str, updated_secs: i64) -> Project {
        let ts = DateTime::from_timestamp(updated_secs, 0).unwrap();
        Project {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            link: String::new(),
            image_url: String::new(),
            stack: Vec::new(),
            source,
            created_at: ts,
            updated_at: ts,
            stars: None,
            forks: None,
            is_private: None,
        }
    }

    #[test]
    fn test_source_wire_names() {
        assert_eq!(Source::Github.as_str(), "github");
        assert_eq!(Source::Devto.as_str(), "devto");
        assert_eq!(Source::Manual.to_string(), "manual");
        assert_eq!(Source::from_str("devto").unwrap(), Source::Devto);
        assert_eq!(serde_json::to_string(&Source::Github).unwrap(), r#""github""#);
    }

    #[test]
    fn test_normalize_stack_language_first() {
        let stack = normalize_stack(["Rust", "cli", "async"]);
        assert_eq!(stack, vec!["Rust", "cli", "async"]);
    }

    #[test]
    fn test_normalize_stack_drops_empty_and_duplicates() {
        let stack = normalize_stack(["Rust", "", "  ", "rust", "wasm", "wasm", " cli "]);
        assert_eq!(stack, vec!["Rust", "wasm", "cli"]);
    }

    #[test]
    fn test_normalize_stack_empty() {
        assert!(normalize_stack(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_sort_by_recency_newest_first() {
        let mut projects = vec![
            project(Source::Github, "a", 100),
            project(Source::Devto, "b", 300),
            project(Source::Manual, "c", 200),
        ];
        sort_by_recency(&mut projects);
        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_recency_tie_break_is_deterministic() {
        let mut forward = vec![
            project(Source::Manual, "1", 100),
            project(Source::Github, "2", 100),
            project(Source::Github, "10", 100),
            project(Source::Devto, "9", 100),
        ];
        let mut backward: Vec<_> = forward.iter().rev().cloned().collect();

        sort_by_recency(&mut forward);
        sort_by_recency(&mut backward);
        assert_eq!(forward, backward);

        let keys: Vec<_> = forward.iter().map(|p| (p.source.as_str(), p.id.as_str())).collect();
        assert_eq!(keys, vec![("devto", "9"), ("github", "10"), ("github", "2"), ("manual", "1")]);

        for pair in forward.windows(2) {
            assert_ne!(recency_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_dedup_by_id_keeps_first() {
        let mut first = project(Source::Manual, "x", 100);
        first.title = "first".to_string();
        let mut second = project(Source::Manual, "x", 200);
        second.title = "second".to_string();

        let result = dedup_by_id(vec![first, second, project(Source::Manual, "y", 50)]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].title, "first");
        assert_eq!(result[1].id, "y");
    }

    #[test]
    fn test_log_target_is_aligned() {
        assert_eq!(LOG_TARGET.trim_start(), "project");
        assert_eq!(LOG_TARGET.len(), " collector".len());
    }

    #[test]
    fn test_project_serializes_camel_case() {
        let mut p = project(Source::Github, "42", 0);
        p.stars = Some(7);
        p.is_private = Some(false);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["isPrivate"], false);
        assert_eq!(json["stars"], 7);
        assert_eq!(json["updatedAt"], "1970-01-01T00:00:00Z");
        assert!(json.get("forks").is_none());
    }

    #[test]
    fn test_project_round_trips_through_json() {
        let p = project(Source::Devto, "7", 1_700_000_000);
        let back: Project = serde_json::from_value(serde_json::to_value(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
