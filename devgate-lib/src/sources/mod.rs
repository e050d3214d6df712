//! Project collection and aggregation
//!
//! This module gathers "project" records about a developer from several external
//! sources and folds them into a single, consistently ordered list:
//! - **GitHub**: public repositories, enriched with per-repository topics
//! - **dev.to**: published articles
//! - **Manual store**: projects the user curated by hand
//!
//! # Implementation Model
//!
//! Every source is wrapped by a provider that performs exactly one normalization pass
//! into [`Project`]. Providers report failures through [`SourceError`], which lets the
//! [`Collector`] degrade gracefully: a failing source is recorded as a
//! [`SourceFailure`] while the remaining sources still contribute their projects.
//!
//! The [`Collector`] queries the sources concurrently, consults a shared [`Cache`] to
//! avoid re-hitting rate-limited upstreams, and sorts the merged result by recency.
//! Summary analytics (top languages, an approximate contribution timeline) are produced
//! separately by the [`stats`] provider.

mod cache;
mod client;
mod collector;
pub mod devto;
pub mod github;
mod identity;
pub mod manual;
mod project;
mod resilient_http;
mod source_error;
pub mod stats;
mod throttler;
mod timestamp;

pub use cache::{Cache, DEFAULT_MAX_AGE};
pub use client::ApiClient;
pub use collector::{Aggregate, Collector, CollectorSettings};
pub use identity::Identity;
pub use project::{Project, Source, normalize_stack, sort_by_recency};
pub use source_error::{AggregateError, SourceError, SourceFailure};
pub use throttler::Throttler;
