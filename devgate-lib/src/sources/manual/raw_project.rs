use crate::sources::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A manual project exactly as the store keeps it.
///
/// Every field is optional on the wire; missing values default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawManualProject {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub image_url: Option<String>,
    pub stack: Vec<String>,
    pub created_at: Option<StoreTimestamp>,
    pub updated_at: Option<StoreTimestamp>,
}

/// A timestamp in one of the representations the store may hand back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreTimestamp {
    /// Document-store native form: `{ "seconds": .., "nanoseconds": .. }`
    Native {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },

    /// RFC 3339 text
    Text(String),

    /// Milliseconds since the Unix epoch
    Millis(i64),

    /// Anything else; never resolves to a time
    Other(serde_json::Value),
}

impl StoreTimestamp {
    #[must_use]
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Native { seconds, nanoseconds } => timestamp::from_epoch_parts(*seconds, *nanoseconds),
            Self::Text(text) => timestamp::parse(text),
            Self::Millis(millis) => timestamp::from_epoch_millis(*millis),
            Self::Other(_) => None,
        }
    }
}

/// Resolve an optional stored timestamp, substituting `now` when absent or unusable.
pub(crate) fn resolve_or(ts: Option<&StoreTimestamp>, now: DateTime<Utc>) -> DateTime<Utc> {
    ts.and_then(StoreTimestamp::resolve).unwrap_or(now)
}
