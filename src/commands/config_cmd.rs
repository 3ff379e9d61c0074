use crate::activation::{self, ActiveState};
use crate::cli::ConfigCommand;
use crate::config::{ConfigStore, GlobalConfig};
use crate::prompt::{Prompt, Prompter};
use anyhow::{bail, Result};

pub fn run(
    command: ConfigCommand,
    store: &ConfigStore,
    config: &mut GlobalConfig,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            show(store, config);
            Ok(())
        }
        ConfigCommand::SetPageSize { size } => set_page_size(config, size),
        ConfigCommand::Interactive => interactive(config, prompter),
    }
}

fn show(store: &ConfigStore, config: &GlobalConfig) {
    println!("Current CLI Configuration:");
    println!("  Page Size: {}", config.settings.page_size());
    println!("  Data Root: {}", config.settings.data_root().display());
    println!(
        "  Active Project: {}",
        if config.has_active() { config.active_project.as_str() } else { "None" }
    );
    println!("  Available Projects: {}", config.available_projects.len());
    println!("  Config File: {}", store.path().display());

    if let ActiveState::Dangling { error, .. } = activation::diagnose(config) {
        eprintln!("Note: the active project could not be loaded: {error}");
    }
}

fn set_page_size(config: &mut GlobalConfig, size: usize) -> Result<()> {
    if size < 1 {
        bail!("Page size must be at least 1");
    }
    let old = config.settings.page_size();
    config.settings.page_size = Some(size);
    println!("Page size updated: {old} → {size}");
    Ok(())
}

fn validate_page_size(value: &str) -> Result<(), String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err("Please enter a positive number".to_string()),
    }
}

fn interactive(config: &mut GlobalConfig, prompter: &mut dyn Prompter) -> Result<()> {
    let current = config.settings.page_size();
    let answer = prompter.text(
        "Enter page size (number of items shown in menus)",
        &current.to_string(),
        validate_page_size,
    )?;

    let Prompt::Answered(value) = answer else {
        println!("Configuration cancelled.");
        return Ok(());
    };
    let size: usize = value.trim().parse()?;
    if size == current {
        println!("No changes made.");
    } else {
        config.settings.page_size = Some(size);
        println!("Page size updated to: {size}");
    }
    Ok(())
}
