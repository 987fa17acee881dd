//! Command-line surface of `helios-bootstrap`

use crate::bootstrap::{BootstrapReport, bootstrap};
use crate::error::Result;
use clap::Parser;
use helios_common::{NamespaceGenerator, NamespaceId};
use helios_zookeeper::ConnectConfig;
use std::time::Duration;

const DESCRIPTION: &str = "\
Bootstraps a new Helios cluster.

Bootstrapping populates ZooKeeper with the basic data structures Helios needs to \
function. They are created in a new namespace with a randomly generated name (a UUID \
string) to avoid conflicts and to allow many Helios clusters to coexist in a single \
ZooKeeper cluster.";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "helios-bootstrap", version, about = "Bootstraps a new Helios cluster", long_about = DESCRIPTION)]
pub struct Cli {
    /// ZooKeeper node endpoints to connect to
    #[arg(value_name = "ZOOKEEPER-ENDPOINT", required = true, num_args = 1..)]
    pub hosts: Vec<String>,

    /// ZooKeeper connection timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub timeout: u64,

    /// Bootstrap this namespace instead of a freshly generated one
    #[arg(long, value_name = "ID", value_parser = parse_namespace)]
    pub namespace: Option<NamespaceId>,

    /// Print the bootstrap report as JSON instead of the bare namespace id
    #[arg(long)]
    pub json: bool,
}

fn parse_namespace(s: &str) -> std::result::Result<NamespaceId, String> {
    NamespaceId::parse(s).map_err(|e| e.to_string())
}

impl Cli {
    pub fn connect_config(&self) -> ConnectConfig {
        ConnectConfig::new(self.hosts.iter().cloned())
            .with_timeout(Duration::from_secs(self.timeout))
    }

    /// The namespace to bootstrap: the requested one or a new random id
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
            .clone()
            .unwrap_or_else(NamespaceGenerator::generate)
    }

    /// Render a successful report for stdout
    pub fn render(&self, report: &BootstrapReport) -> serde_json::Result<String> {
        if self.json {
            serde_json::to_string_pretty(report)
        } else {
            Ok(report.namespace.to_string())
        }
    }
}

/// Connect, bootstrap, and release the session
pub async fn run(cli: &Cli) -> Result<BootstrapReport> {
    let config = cli.connect_config();
    let store = helios_zookeeper::connect(&config).await?;

    let report = bootstrap(&store, &cli.namespace()).await;

    // Dropping the client closes the session
    drop(store);
    report
}
