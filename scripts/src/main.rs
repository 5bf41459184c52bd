use std::process::ExitCode;

use clap::Parser;
use scripts::cli::Cli;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().pretty().init();

    match Cli::parse().run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_configuration() {
                error!("{}; no transaction was submitted", e);
            } else {
                error!("{}", e);
            }
            if let Some(hint) = e.hint() {
                error!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}
