#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for devgate
//!
//! This library gathers a developer's projects from several independent sources,
//! normalizes them into one schema, and derives summary analytics from their
//! code-hosting activity.
//!
//! # Module Organization
//!
//! - [`sources`]: Source adapters, caching, and aggregation
//! - [`session`]: Identity/session collaborator contract
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod session;
pub mod sources;

pub use crate::commands::{Host, run};
