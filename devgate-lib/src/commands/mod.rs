//! Command-line interface for devgate
//!
//! This module implements the CLI commands on top of [`crate::sources`]. It handles
//! argument parsing, configuration management, and rendering results for the host.
//!
//! ## Commands
//!
//! - **projects**: Aggregate a user's projects from GitHub, dev.to and the manual store,
//!   then print them newest first as JSON. Sources that fail are reported on the error
//!   stream; the command only fails when every queried source failed.
//! - **stats**: Print profile figures, top languages and a monthly contribution summary
//!   for a GitHub account.
//! - **init**: Generate a default configuration file
//! - **validate**: Check configuration file syntax and value ranges
//!
//! All output goes through the [`Host`] trait so commands can be exercised in tests
//! without touching the process's stdout, stderr or exit code.

mod common;
mod config;
mod host;
mod init;
mod projects;
mod run;
mod stats;
mod validate;

#[cfg(debug_assertions)]
pub use config::Config;

pub use host::Host;
pub use init::{InitArgs, init_config};
pub use projects::{ProjectsArgs, list_projects};
pub use run::run;
pub use stats::{StatsArgs, show_stats};
pub use validate::{ValidateArgs, validate_config};
