use super::Host;
use super::common::{Common, CommonArgs, write_json};
use crate::Result;
use crate::sources::Identity;
use clap::Parser;
use ohno::app_err;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// GitHub account to summarize
    #[arg(long, value_name = "USER")]
    pub github: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Compute summary analytics for a GitHub account and print them as JSON
pub async fn show_stats<H: Host>(host: &mut H, args: &StatsArgs) -> Result<()> {
    let common = Common::new(&args.common)?;
    let identity = Identity::new(&args.github).with_github(&args.github);

    match common.collector.fetch_stats(&identity).await {
        Ok(snapshot) => write_json(host.output(), &snapshot),
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Could not compute stats: {}", e.user_message());
            host.exit(1);
            Err(app_err!("fetching stats for '{}': {e}", args.github))
        }
    }
}
