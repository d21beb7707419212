mod auth;
mod cli;
mod config;
mod context;
mod error;
mod output;
mod providers;
mod report;
mod wait;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting deploywait");

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            error!("{message}");
            if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
                println!("{}", output::github_error_command(&message));
            }
            ExitCode::FAILURE
        }
    }
}
