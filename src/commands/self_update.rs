use crate::cli::SelfCommand;
use crate::error::ArmError;
use crate::process;
use anyhow::Result;
use std::path::Path;

const CRATE_NAME: &str = "arm-cli";

pub async fn run(command: SelfCommand) -> Result<()> {
    match command {
        SelfCommand::Update { source } => match source {
            Some(path) => install_from_source(&path).await,
            None => install_from_registry().await,
        },
    }
}

async fn install_from_source(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ArmError::NotFound {
            what: "source path",
            name: path.display().to_string(),
        }
        .into());
    }

    println!("Installing {CRATE_NAME} from source at {}...", path.display());
    let source = path.to_string_lossy();
    process::run("cargo", &["install", "--path", &*source, "--force"]).await?;
    println!("{CRATE_NAME} installed from source at {} successfully!", path.display());
    Ok(())
}

async fn install_from_registry() -> Result<()> {
    println!("Updating {CRATE_NAME} from crates.io...");
    process::run("cargo", &["install", CRATE_NAME, "--force"]).await?;
    println!("{CRATE_NAME} updated successfully!");
    Ok(())
}
