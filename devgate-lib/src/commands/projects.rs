use super::Host;
use super::common::{Common, CommonArgs, write_json};
use crate::Result;
use crate::sources::manual::{JsonFileStore, ManualStore};
use crate::sources::{Collector, Identity};
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::app_err;
use std::io::Write;
use std::sync::Arc;

#[derive(Parser, Debug)]
pub struct ProjectsArgs {
    /// Identifier of the user whose projects are aggregated
    #[arg(long, value_name = "ID", default_value = "local")]
    pub user_id: String,

    /// GitHub account to list repositories from
    #[arg(long, value_name = "USER")]
    pub github: Option<String>,

    /// dev.to account to list articles from
    #[arg(long, value_name = "USER")]
    pub devto: Option<String>,

    /// JSON file holding manually curated projects, keyed by user id
    #[arg(long, value_name = "PATH")]
    pub manual_store: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ProjectsArgs {
    fn identity(&self) -> Identity {
        let mut identity = Identity::new(&self.user_id);
        if let Some(user) = &self.github {
            identity = identity.with_github(user);
        }
        if let Some(user) = &self.devto {
            identity = identity.with_devto(user);
        }
        identity
    }
}

/// Aggregate the projects of one user and print them as JSON
pub async fn list_projects<H: Host>(host: &mut H, args: &ProjectsArgs) -> Result<()> {
    let common = Common::new(&args.common)?;
    let identity = args.identity();

    match &args.manual_store {
        Some(path) => {
            let collector = common.collector.with_manual_store(Arc::new(JsonFileStore::new(path.as_std_path())));
            report(host, &collector, &identity).await
        }
        None => report(host, &common.collector, &identity).await,
    }
}

async fn report<H: Host, S: ManualStore>(host: &mut H, collector: &Collector<S>, identity: &Identity) -> Result<()> {
    match collector.aggregate(identity).await {
        Ok(aggregate) => {
            for failure in &aggregate.partial_failures {
                let _ = writeln!(host.error(), "⚠️ {} projects unavailable: {}", failure.source, failure.error.user_message());
            }
            write_json(host.output(), &aggregate.projects)
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ No data available");
            for cause in e.causes() {
                let _ = writeln!(host.error(), "  {}: {}", cause.source, cause.error.user_message());
            }
            host.exit(1);
            Err(app_err!("{e}"))
        }
    }
}
