//! Command dispatch logic for devgate

use super::{InitArgs, ProjectsArgs, StatsArgs, ValidateArgs, init_config, list_projects, show_stats, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "devgate", author, version, long_about = None)]
#[command(about = "Aggregate a developer's projects and activity from GitHub, dev.to and curated entries")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: DevgateSubcommand,
}

#[derive(Subcommand, Debug)]
enum DevgateSubcommand {
    /// Aggregate projects from all configured sources
    Projects(Box<ProjectsArgs>),
    /// Compute summary analytics for a GitHub account
    Stats(Box<StatsArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        DevgateSubcommand::Projects(projects_args) => list_projects(host, projects_args).await,
        DevgateSubcommand::Stats(stats_args) => show_stats(host, stats_args).await,
        DevgateSubcommand::Init(init_args) => init_config(host, init_args),
        DevgateSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
