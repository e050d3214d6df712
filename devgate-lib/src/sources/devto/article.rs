use serde::{Deserialize, Deserializer};

/// An article as returned by `GET /articles?username=...`
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub edited_at: Option<String>,
}

/// The listing endpoint returns tags as an array, while single-article endpoints use a
/// comma-separated string. Accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Option::<TagList>::deserialize(deserializer)?;
    Ok(match tags {
        Some(TagList::List(tags)) => tags,
        Some(TagList::Joined(joined)) => joined.split(',').map(|t| t.trim().to_string()).collect(),
        None => Vec::new(),
    })
}
