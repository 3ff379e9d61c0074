use crate::cli::SystemCommand;
use crate::config::{resolve_data_dir, GlobalConfig};
use crate::prompt::Prompter;
use crate::setup::{self, StepOutcome};
use anyhow::{anyhow, bail, Result};
use tracing::debug;

pub async fn run(command: SystemCommand, config: &GlobalConfig, prompter: &mut dyn Prompter) -> Result<()> {
    match command {
        SystemCommand::Setup { yes, skip_data } => setup_host(config, prompter, yes, skip_data).await,
    }
}

fn record(step: &'static str, result: Result<StepOutcome>, failed: &mut Vec<&'static str>) {
    match result {
        Ok(outcome) => debug!(step, ?outcome, "setup step finished"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            failed.push(step);
        }
    }
}

async fn setup_host(
    config: &GlobalConfig,
    prompter: &mut dyn Prompter,
    force: bool,
    skip_data: bool,
) -> Result<()> {
    let mut failed = Vec::new();

    record("X11 access", setup::setup_xhost(prompter, force).await, &mut failed);

    if !skip_data {
        let root = config.settings.data_root();
        record(
            "data directories",
            setup::setup_data_directories(prompter, &root, force).await,
            &mut failed,
        );
    }

    let shell = setup::detect_shell();
    let shell_result = dirs::home_dir()
        .ok_or_else(|| anyhow!("cannot determine the home directory"))
        .and_then(|home| {
            setup::setup_shell(prompter, &shell, &home.join(".bashrc"), &resolve_data_dir(), force)
        });
    record("shell completion", shell_result, &mut failed);

    if !failed.is_empty() {
        bail!("setup incomplete: {} failed", failed.join(", "));
    }
    Ok(())
}
