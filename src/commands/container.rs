use crate::cli::ContainerCommand;
use crate::config::resolve_docker_binary;
use crate::docker::{self, DockerClient, RunningContainer};
use crate::prompt::{Prompt, Prompter};
use anyhow::{Context, Result};

pub async fn run(command: ContainerCommand, prompter: &mut dyn Prompter) -> Result<()> {
    match command {
        ContainerCommand::List => list().await,
        ContainerCommand::Attach { container } => attach(prompter, container).await,
        ContainerCommand::Stop { container } => stop(prompter, container).await,
    }
}

async fn list() -> Result<()> {
    let containers = DockerClient::connect()?.running_containers().await?;
    if containers.is_empty() {
        println!("No running containers found.");
    }
    for c in &containers {
        println!("{}: {}", c.short_id(), c.name);
    }
    Ok(())
}

/// Picks a running container by prompt. `None` when there is nothing
/// running or the user backs out.
fn choose(
    containers: &[RunningContainer],
    prompter: &mut dyn Prompter,
    message: &str,
) -> Result<Option<String>> {
    if containers.is_empty() {
        println!("No running containers found.");
        return Ok(None);
    }
    let labels: Vec<String> = containers.iter().map(RunningContainer::label).collect();
    match prompter.select(message, &labels, 0)? {
        Prompt::Answered(idx) => Ok(containers.get(idx).map(|c| c.name.clone())),
        Prompt::Cancelled => {
            println!("No container selected.");
            Ok(None)
        }
    }
}

async fn attach(prompter: &mut dyn Prompter, container: Option<String>) -> Result<()> {
    let name = match container {
        Some(name) => name,
        None => {
            let running = DockerClient::connect()?.running_containers().await?;
            match choose(&running, prompter, "Select a container to attach to")? {
                Some(name) => name,
                None => return Ok(()),
            }
        }
    };

    println!("Attaching to {name}...");
    docker::exec_shell(&resolve_docker_binary(), &name)
        .await
        .context("Error attaching to container")
}

async fn stop(prompter: &mut dyn Prompter, container: Option<String>) -> Result<()> {
    let client = DockerClient::connect()?;
    let name = match container {
        Some(name) => name,
        None => {
            let running = client.running_containers().await?;
            match choose(&running, prompter, "Select a container to stop")? {
                Some(name) => name,
                None => return Ok(()),
            }
        }
    };

    println!("Stopping {name}...");
    client.stop(&name).await?;
    println!("Container {name} stopped successfully.");
    Ok(())
}
