mod api_types;
mod provider;

pub(crate) use api_types::{CommitEntry, Repository, UserProfile};
pub use provider::Provider;
