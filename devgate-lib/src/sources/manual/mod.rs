//! Projects curated by hand and kept in a first-party store.
//!
//! The durable storage engine is not part of this crate; it is reached through the
//! [`ManualStore`] trait. Two implementations ship with the crate: [`MemoryStore`] for
//! embedding and tests, and [`JsonFileStore`] which reads a JSON document from disk.

mod provider;
mod raw_project;
mod store;

pub use provider::Provider;
pub use raw_project::{RawManualProject, StoreTimestamp};
pub use store::{JsonFileStore, ManualStore, MemoryStore};
