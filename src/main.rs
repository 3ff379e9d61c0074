mod activation;
mod cli;
mod commands;
mod config;
mod docker;
mod error;
mod process;
mod project;
mod prompt;
mod registry;
mod setup;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::ConfigStore;
use prompt::TerminalPrompter;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ARM_CLI_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "arm_cli=debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::from_env();
    let mut config = store.load();
    let loaded = config.clone();

    let mut prompter = TerminalPrompter::new(config.settings.page_size());
    let result = commands::dispatch(cli.command, &store, &mut config, &mut prompter).await;

    if config != loaded {
        if let Err(e) = store.save(&config) {
            if result.is_ok() {
                return Err(e.into());
            }
            eprintln!("Error: {e}");
        }
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
