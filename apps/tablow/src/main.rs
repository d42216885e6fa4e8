//! Tablow binary entry point.

use clap::Parser;
use std::process::ExitCode;
use tablow::cli::{Cli, Command, cmd_plan, cmd_serve};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tablow=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Plan { query } => cmd_plan(&query).map(|plan| print!("{plan}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
