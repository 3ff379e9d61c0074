use crate::activation::{self, ActiveState, Activation};
use crate::cli::ProjectsCommand;
use crate::config::GlobalConfig;
use crate::error::ArmError;
use crate::process;
use crate::project::{self, ProjectConfig, DESCRIPTOR_FILE};
use crate::prompt::{Prompt, Prompter};
use crate::registry;
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

const INIT_HINT: &str = "No projects available. Use 'arm-cli projects init <path>' to add a project.";

pub async fn run(
    command: ProjectsCommand,
    config: &mut GlobalConfig,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    match command {
        ProjectsCommand::Init { path, name } => init(config, &path, name),
        ProjectsCommand::Activate { project } => activate(config, prompter, project),
        ProjectsCommand::Deactivate => {
            deactivate(config);
            Ok(())
        }
        ProjectsCommand::List => {
            list(config);
            Ok(())
        }
        ProjectsCommand::Info => {
            info(config);
            Ok(())
        }
        ProjectsCommand::Remove { project, yes } => remove(config, prompter, project, yes),
        ProjectsCommand::Cd { print } => cd(config, print).await,
    }
}

fn valid_project_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._-]*$").expect("valid regex"))
        .is_match(name)
}

fn print_available(config: &GlobalConfig) {
    println!("\nAvailable projects:");
    let entries = registry::list(config);
    if entries.is_empty() {
        println!("  {INIT_HINT}");
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, entry.name, entry.path.display());
    }
}

/// Lets the user pick a registered project; `None` when there is nothing to
/// pick or the prompt was cancelled.
fn pick_project(
    config: &GlobalConfig,
    prompter: &mut dyn Prompter,
    message: &str,
) -> Result<Option<String>> {
    let entries = registry::list(config);
    if entries.is_empty() {
        println!("{INIT_HINT}");
        return Ok(None);
    }

    let choices: Vec<String> = entries
        .iter()
        .map(|e| {
            if registry::is_active(config, e) {
                format!("{} *", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect();
    let default = entries
        .iter()
        .position(|e| registry::is_active(config, e))
        .unwrap_or(0);

    match prompter.select(message, &choices, default)? {
        Prompt::Answered(idx) => Ok(entries.get(idx).map(|e| e.name.clone())),
        Prompt::Cancelled => {
            println!("Cancelled.");
            Ok(None)
        }
    }
}

fn init(config: &mut GlobalConfig, path: &Path, name: Option<String>) -> Result<()> {
    if let Some(name) = &name {
        if !valid_project_name(name) {
            bail!(
                "Invalid project name '{name}': use letters, digits, spaces, '.', '_' or '-', \
                 starting with a letter or digit"
            );
        }
    }

    fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))?;
    let dir = fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))?;
    let name = name.unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    let descriptor = dir.join(DESCRIPTOR_FILE);
    if let Some(other) = registry::find(config, &name).filter(|e| e.path != descriptor) {
        return Err(ArmError::DuplicateName {
            name,
            existing: other.path.clone(),
        }
        .into());
    }

    let created = !descriptor.exists();
    let project = project::init_from_template(&dir, &name)?;
    if let Err(err) = registry::add(config, &descriptor, &project.name) {
        // A descriptor written for a rejected registration must not outlive it.
        if created {
            fs::remove_file(&descriptor)
                .with_context(|| format!("removing {}", descriptor.display()))?;
        }
        return Err(err.into());
    }
    println!("Registered project: {}", project.name);
    println!("Descriptor: {}", descriptor.display());

    report_activation(activation::activate(config, &project.name)?)
}

fn activate(
    config: &mut GlobalConfig,
    prompter: &mut dyn Prompter,
    project: Option<String>,
) -> Result<()> {
    let name = match project {
        Some(name) => name,
        None => match pick_project(config, prompter, "Select a project to activate")? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    match activation::activate(config, &name) {
        Ok(activation) => report_activation(activation),
        Err(err @ ArmError::NotFound { .. }) => {
            println!("Project '{name}' not found in available projects");
            print_available(config);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn report_activation(activation: Activation) -> Result<()> {
    match activation.project {
        Ok(project) => {
            println!("Activated project: {}", project.name);
            match &project.project_directory {
                Some(dir) => println!("Project directory: {}", dir.display()),
                None => println!("Project directory: (not configured)"),
            }
            Ok(())
        }
        Err(err) => {
            println!("Activated project: {}", activation.entry.name);
            Err(anyhow!(err).context(format!(
                "Project descriptor for '{}' could not be loaded",
                activation.entry.name
            )))
        }
    }
}

fn deactivate(config: &mut GlobalConfig) {
    if !config.has_active() {
        println!("No active project configured.");
        return;
    }
    activation::deactivate(config);
    println!("Project deactivated. No project is active now.");
}

fn list(config: &GlobalConfig) {
    let entries = registry::list(config);
    if entries.is_empty() {
        println!("{INIT_HINT}");
        return;
    }
    println!("Available projects:");
    for entry in entries {
        let marker = if registry::is_active(config, entry) { "*" } else { " " };
        println!("{marker} {} ({})", entry.name, entry.path.display());
    }
}

fn print_project(project: &ProjectConfig) {
    println!("Active Project: {}", project.name);
    if let Some(description) = &project.description {
        println!("Description: {description}");
    }
    if let Some(dir) = &project.project_directory {
        println!("Project Directory: {}", dir.display());
    }
    if let Some(compose) = &project.docker_compose_file {
        println!("Docker Compose File: {}", compose.display());
        if let Some(resolved) = project.compose_file_path().filter(|r| r != compose) {
            println!("  (resolves to {})", resolved.display());
        }
    }
    if let Some(data) = &project.data_directory {
        println!("Data Directory: {}", data.display());
    }
}

fn info(config: &GlobalConfig) {
    match activation::diagnose(config) {
        ActiveState::Active(project) => print_project(&project),
        ActiveState::Inactive => println!("No active project configured."),
        ActiveState::Dangling { path, error } => {
            println!("No active project configured.");
            eprintln!(
                "Note: the active project points at {}, which could not be loaded: {error}",
                path.display()
            );
        }
    }
}

fn remove(
    config: &mut GlobalConfig,
    prompter: &mut dyn Prompter,
    project: Option<String>,
    yes: bool,
) -> Result<()> {
    let name = match project {
        Some(name) => name,
        None => match pick_project(config, prompter, "Select a project to remove")? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    let Some(entry) = registry::find(config, &name).cloned() else {
        println!("Project '{name}' not found in available projects");
        print_available(config);
        return Err(ArmError::NotFound {
            what: "project",
            name,
        }
        .into());
    };

    if !yes {
        let question = format!(
            "Remove project '{}' from the registry? Its descriptor at {} is kept.",
            entry.name,
            entry.path.display()
        );
        if !matches!(prompter.confirm(&question, false)?, Prompt::Answered(true)) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let was_active = registry::is_active(config, &entry);
    registry::remove(config, &entry.name);
    println!("Removed project: {}", entry.name);
    if was_active {
        println!("No project is active now.");
    }
    Ok(())
}

async fn cd(config: &GlobalConfig, print: bool) -> Result<()> {
    let Some(project) = activation::resolve_active(config) else {
        bail!("No active project configured");
    };

    let dir = project
        .project_directory
        .ok_or_else(|| anyhow!("No project directory configured for '{}'", project.name))?;
    if !dir.is_dir() {
        bail!("Project directory does not exist: {}", dir.display());
    }

    if print {
        println!("{}", dir.display());
        return Ok(());
    }

    println!("Changed to project directory: {}", dir.display());
    if std::io::stdin().is_terminal() {
        let shell = std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/bin/bash".to_string());
        println!("Starting {shell}; exit it to return.");
        process::run_in::<&str>(Some(dir.as_path()), &shell, &[]).await?;
    }
    Ok(())
}
