//! Command handlers. Each takes the loaded config by reference; `main`
//! persists it afterwards if it changed.

mod config_cmd;
mod container;
mod projects;
mod self_update;
mod system;

use crate::cli::Command;
use crate::config::{ConfigStore, GlobalConfig};
use crate::prompt::Prompter;
use anyhow::Result;

pub async fn dispatch(
    command: Command,
    store: &ConfigStore,
    config: &mut GlobalConfig,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    match command {
        Command::Projects(cmd) => projects::run(cmd, config, prompter).await,
        Command::Container(cmd) => container::run(cmd, prompter).await,
        Command::System(cmd) => system::run(cmd, config, prompter).await,
        Command::Config(cmd) => config_cmd::run(cmd, store, config, prompter),
        Command::SelfCmd(cmd) => self_update::run(cmd).await,
    }
}
