//! `helios-bootstrap`: create a new Helios namespace in ZooKeeper

use clap::Parser;
use helios_bootstrap::{Cli, logging, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let report = match run(&cli).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli.render(&report) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Couldn't render the bootstrap report: {}", err);
            ExitCode::FAILURE
        }
    }
}
